//! Acquisition side of the pipeline.
//!
//! - [`registry`] – the catalogue of named channels and their bit widths.
//! - [`buffer`] – raw per-event `(index, value)` buffers and packed wire forms.
//! - [`decoder`] – decoding a buffer into the fired-channel multiset.

pub mod buffer;
pub mod decoder;
pub mod registry;

pub use buffer::{RawEvent, RawEventBuffer, RawFiring, WireFormat};
pub use decoder::{
    AcquisitionDecoder, ChannelState, DecodeAnomaly, DecodeFlags, DecodedEvent, FiredList, Firing,
};
pub use registry::{AcquisitionParameter, ParameterRegistry};
