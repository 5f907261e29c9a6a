//! Catalogue of acquisition parameters addressed by their stable index.
//!
//! The index space is sparse but bounded by `max_index`, so parameters live
//! in a slot vector indexed by position. The registry is filled once while
//! loading the run configuration and is only read afterwards.

use crate::error::ConfigError;
use serde::Serialize;
use std::collections::HashMap;

/// Largest bit width accepted for a raw acquisition value.
pub const MAX_BIT_WIDTH: u8 = 32;

/// Default upper bound on acquisition indices (16-bit parameter numbers).
pub const DEFAULT_MAX_INDEX: u32 = u16::MAX as u32;

/// One named acquisition channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionParameter {
    pub name: String,
    pub index: u32,
    pub bit_width: u8,
}

impl AcquisitionParameter {
    /// Exclusive upper bound on raw values, `2^bit_width`.
    pub fn value_limit(&self) -> u64 {
        1u64 << self.bit_width
    }

    /// True when `value` fits in the declared width.
    pub fn accepts(&self, value: u64) -> bool {
        value < self.value_limit()
    }
}

#[derive(Clone, Debug)]
pub struct ParameterRegistry {
    max_index: u32,
    slots: Vec<Option<AcquisitionParameter>>,
    by_name: HashMap<String, u32>,
}

impl Default for ParameterRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INDEX)
    }
}

impl ParameterRegistry {
    pub fn new(max_index: u32) -> Self {
        Self {
            max_index,
            slots: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn max_index(&self) -> u32 {
        self.max_index
    }

    /// Number of registered parameters.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Length of the slot vector; per-event channel state is sized to this.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Register `name` at `index` with a declared bit width.
    ///
    /// Re-registering the same name at the same index with the same width is
    /// a no-op. A different name at an occupied index is `DuplicateIndex`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        index: u32,
        bit_width: u8,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if index > self.max_index {
            return Err(ConfigError::IndexOutOfRange {
                index,
                max_index: self.max_index,
            });
        }
        if bit_width == 0 || bit_width > MAX_BIT_WIDTH {
            return Err(ConfigError::InvalidBitWidth { name, bit_width });
        }

        let slot = index as usize;
        if let Some(Some(existing)) = self.slots.get(slot) {
            if existing.name != name {
                return Err(ConfigError::DuplicateIndex {
                    index,
                    existing: existing.name.clone(),
                    name,
                });
            }
            if existing.bit_width != bit_width {
                return Err(ConfigError::ConflictingWidth {
                    name,
                    existing: existing.bit_width,
                    requested: bit_width,
                });
            }
            return Ok(());
        }
        if let Some(&other) = self.by_name.get(&name) {
            return Err(ConfigError::DuplicateName {
                name,
                existing: other,
                index,
            });
        }

        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        self.by_name.insert(name.clone(), index);
        self.slots[slot] = Some(AcquisitionParameter {
            name,
            index,
            bit_width,
        });
        Ok(())
    }

    /// Parameter registered at `index`, or `None` for unknown indices.
    pub fn lookup(&self, index: u32) -> Option<&AcquisitionParameter> {
        self.slots.get(index as usize).and_then(|slot| slot.as_ref())
    }

    pub fn lookup_name(&self, name: &str) -> Option<&AcquisitionParameter> {
        self.by_name.get(name).and_then(|&index| self.lookup(index))
    }

    /// Registered parameters in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = &AcquisitionParameter> {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }
}
