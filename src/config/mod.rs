//! Run configuration: serde model and validation into a [`RunSetup`].
//!
//! The JSON layout mirrors the pipeline: acquisition parameters, stacks with
//! their calibrated layers, identification grids and contours, and the
//! telescopes binding them to stacks. Names are resolved and every binding is
//! checked here, so a run never starts on an inconsistent configuration.
//!
//! [`RunSetup`]: crate::pipeline::RunSetup

pub mod run;

pub use run::{
    load_config, ChannelConfig, ContourConfig, GridConfig, LayerConfig, LineConfig,
    ParameterConfig, RunConfig, StackConfig, TelescopeConfig,
};
