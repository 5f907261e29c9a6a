//! Raw acquisition buffers and their packed binary form.
//!
//! A buffer is the ordered list of `(index, value)` firings read out for one
//! event. The same index may appear several times.

use crate::error::WireError;
use serde::{Deserialize, Serialize};

/// One raw `(index, value)` firing as read from the acquisition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFiring {
    pub index: u32,
    pub value: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEventBuffer {
    entries: Vec<RawFiring>,
}

/// Packed little-endian pair layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// `u16` index followed by `u16` value.
    Pairs16,
    /// `u32` index followed by `u32` value.
    Pairs32,
}

impl WireFormat {
    pub fn pair_size(self) -> usize {
        match self {
            WireFormat::Pairs16 => 4,
            WireFormat::Pairs32 => 8,
        }
    }
}

impl RawEventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, u64)>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(index, value)| RawFiring { index, value })
                .collect(),
        }
    }

    /// Decode a packed buffer. Trailing bytes that do not form a whole pair
    /// make the buffer invalid.
    pub fn from_bytes(bytes: &[u8], format: WireFormat) -> Result<Self, WireError> {
        let pair_size = format.pair_size();
        if bytes.len() % pair_size != 0 {
            return Err(WireError::Truncated {
                len: bytes.len(),
                pair_size,
            });
        }
        let entries = bytes
            .chunks_exact(pair_size)
            .map(|chunk| match format {
                WireFormat::Pairs16 => RawFiring {
                    index: u16::from_le_bytes([chunk[0], chunk[1]]) as u32,
                    value: u16::from_le_bytes([chunk[2], chunk[3]]) as u64,
                },
                WireFormat::Pairs32 => RawFiring {
                    index: u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]),
                    value: u32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]) as u64,
                },
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn push(&mut self, index: u32, value: u64) {
        self.entries.push(RawFiring { index, value });
    }

    pub fn entries(&self) -> &[RawFiring] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A raw buffer tagged with its event number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub number: u64,
    pub buffer: RawEventBuffer,
}

impl RawEvent {
    pub fn new(number: u64, buffer: RawEventBuffer) -> Self {
        Self { number, buffer }
    }
}
