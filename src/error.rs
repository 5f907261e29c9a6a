//! Error types for configuration loading, wire decoding and event persistence.
//!
//! Only configuration problems abort a run. Per-firing and per-candidate
//! anomalies are reported through counters and flags on the event record.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Duplicate acquisition index {index}: already registered as '{existing}', cannot register '{name}'")]
    DuplicateIndex {
        index: u32,
        existing: String,
        name: String,
    },

    #[error("Duplicate acquisition parameter name '{name}' (indices {existing} and {index})")]
    DuplicateName {
        name: String,
        existing: u32,
        index: u32,
    },

    #[error("Parameter '{name}' already registered with {existing} bits, not {requested}")]
    ConflictingWidth {
        name: String,
        existing: u8,
        requested: u8,
    },

    #[error("Acquisition index {index} exceeds registry bound {max_index}")]
    IndexOutOfRange { index: u32, max_index: u32 },

    #[error("Invalid bit width {bit_width} for parameter '{name}' (expected 1..=32)")]
    InvalidBitWidth { name: String, bit_width: u8 },

    #[error("Unknown acquisition parameter '{0}'")]
    UnknownParameter(String),

    #[error("Duplicate stack identifier '{0}'")]
    DuplicateStack(String),

    #[error("Telescope binding refers to unknown or already bound stack '{0}'")]
    UnknownStack(String),

    #[error("Stack '{0}' declares no layers")]
    EmptyStack(String),

    #[error("Stack '{stack}' declares layer '{layer}' twice")]
    DuplicateLayer { stack: String, layer: String },

    #[error("Duplicate identification grid '{0}'")]
    DuplicateGrid(String),

    #[error("Duplicate identification contour '{0}'")]
    DuplicateContour(String),

    #[error("Duplicate telescope name '{0}'")]
    DuplicateTelescope(String),

    #[error("Telescope '{telescope}' gamma code {rule} conflicts with its fast-slow grid's {grid}")]
    ConflictingGammaCode {
        telescope: String,
        rule: i32,
        grid: i32,
    },

    #[error("Stack '{0}' has no identification telescope bound")]
    MissingTelescope(String),

    #[error("Telescope '{telescope}' refers to layer '{layer}' absent from stack '{stack}'")]
    UnknownLayer {
        telescope: String,
        stack: String,
        layer: String,
    },

    #[error("Telescope '{telescope}' refers to unknown grid '{grid}'")]
    MissingGrid { telescope: String, grid: String },

    #[error("Telescope '{telescope}' refers to unknown contour '{contour}'")]
    MissingContour { telescope: String, contour: String },

    #[error("Invalid identification grid '{name}': {reason}")]
    InvalidGrid { name: String, reason: String },

    #[error("Invalid identification contour '{name}': {reason}")]
    InvalidContour { name: String, reason: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WireError {
    #[error("Truncated event buffer: {len} bytes is not a multiple of the {pair_size}-byte pair size")]
    Truncated { len: usize, pair_size: usize },
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Event sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Event sink serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
