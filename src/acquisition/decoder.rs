//! Turns one raw buffer into the multiset of fired channels.
//!
//! Every accepted firing is kept individually in the [`FiredList`]; the
//! "last value wins" view lives in the per-event [`ChannelState`] owned by
//! the caller. Unknown indices and over-width values are skipped and
//! reported as [`DecodeAnomaly`] entries, never as errors.

use super::buffer::RawEventBuffer;
use super::registry::ParameterRegistry;
use log::debug;
use serde::Serialize;

/// One accepted firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Firing {
    pub index: u32,
    pub value: u64,
}

/// Fired channels of one event in buffer order; an index may repeat.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FiredList {
    firings: Vec<Firing>,
}

impl FiredList {
    pub fn iter(&self) -> impl Iterator<Item = &Firing> {
        self.firings.iter()
    }

    pub fn len(&self) -> usize {
        self.firings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.firings.is_empty()
    }

    /// All values recorded for `index`, in buffer order.
    pub fn occurrences(&self, index: u32) -> impl Iterator<Item = u64> + '_ {
        self.firings
            .iter()
            .filter(move |f| f.index == index)
            .map(|f| f.value)
    }

    pub fn count(&self, index: u32) -> usize {
        self.occurrences(index).count()
    }

    fn push(&mut self, index: u32, value: u64) {
        self.firings.push(Firing { index, value });
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DecodeAnomaly {
    UnknownChannelIndex { index: u32 },
    MalformedValue { index: u32, value: u64, bit_width: u8 },
}

/// Per-event decode problems, surfaced on the event record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeFlags {
    pub unknown_index: usize,
    pub malformed_values: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<DecodeAnomaly>,
}

impl DecodeFlags {
    pub fn is_malformed(&self) -> bool {
        self.malformed_values > 0
    }

    pub fn is_clean(&self) -> bool {
        self.unknown_index == 0 && self.malformed_values == 0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedEvent {
    pub fired: FiredList,
    pub flags: DecodeFlags,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ChannelSlot {
    last_value: u64,
    fired: bool,
}

/// Per-event channel cache: which channels fired and their last value.
///
/// Owned by the per-event context rather than the registry so the registry
/// stays read-only while events are decoded.
#[derive(Clone, Debug, Default)]
pub struct ChannelState {
    slots: Vec<ChannelSlot>,
    touched: Vec<u32>,
}

impl ChannelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every fired flag and prepares room for `slot_count` channels.
    pub fn reset(&mut self, slot_count: usize) {
        if self.slots.len() < slot_count {
            self.slots.resize(slot_count, ChannelSlot::default());
        }
        for index in self.touched.drain(..) {
            self.slots[index as usize] = ChannelSlot::default();
        }
    }

    fn mark(&mut self, index: u32, value: u64) {
        let slot = &mut self.slots[index as usize];
        if !slot.fired {
            self.touched.push(index);
        }
        slot.fired = true;
        slot.last_value = value;
    }

    pub fn fired(&self, index: u32) -> bool {
        self.slots
            .get(index as usize)
            .map(|s| s.fired)
            .unwrap_or(false)
    }

    /// Last accepted value of `index` in the current event.
    pub fn last_value(&self, index: u32) -> Option<u64> {
        self.slots
            .get(index as usize)
            .filter(|s| s.fired)
            .map(|s| s.last_value)
    }

    /// Indices fired in the current event, in first-firing order.
    pub fn fired_indices(&self) -> &[u32] {
        &self.touched
    }
}

pub struct AcquisitionDecoder<'a> {
    registry: &'a ParameterRegistry,
}

impl<'a> AcquisitionDecoder<'a> {
    pub fn new(registry: &'a ParameterRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ParameterRegistry {
        self.registry
    }

    /// Decode one buffer. `state` is reset before the first lookup.
    pub fn decode(&self, buffer: &RawEventBuffer, state: &mut ChannelState) -> DecodedEvent {
        state.reset(self.registry.slot_count());
        let mut out = DecodedEvent::default();

        for raw in buffer.entries() {
            let Some(param) = self.registry.lookup(raw.index) else {
                debug!("decode: unknown acquisition index {} skipped", raw.index);
                out.flags.unknown_index += 1;
                out.flags
                    .anomalies
                    .push(DecodeAnomaly::UnknownChannelIndex { index: raw.index });
                continue;
            };
            if !param.accepts(raw.value) {
                debug!(
                    "decode: value {} of '{}' exceeds {} bits",
                    raw.value, param.name, param.bit_width
                );
                out.flags.malformed_values += 1;
                out.flags.anomalies.push(DecodeAnomaly::MalformedValue {
                    index: raw.index,
                    value: raw.value,
                    bit_width: param.bit_width,
                });
                continue;
            }
            out.fired.push(raw.index, raw.value);
            state.mark(raw.index, raw.value);
        }
        out
    }
}
