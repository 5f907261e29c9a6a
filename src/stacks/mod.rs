//! Detector stacks ("telescopes" in the physical sense) and candidate building.
//!
//! - [`types`] – stack/layer definitions, calibrations and candidates.
//! - [`builder`] – grouping fired channels into [`ParticleCandidate`]s.
//!
//! A stack fires as soon as one of its layers has a usable signal; partial
//! stacks still yield a candidate so identification can fall back to the
//! layers that are present.

pub mod builder;
pub mod types;

pub use builder::{Multiplicity, StackBuildOutput, StackBuilder};
pub use types::{
    Calibration, ChannelBinding, LayerDefinition, LayerSignal, ParticleCandidate, SignalCombine,
    StackDefinition,
};
