#![doc = include_str!("../README.md")]

pub mod acquisition;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod identification;
pub mod io;
pub mod pipeline;
pub mod stacks;

// --- High-level re-exports -------------------------------------------------

pub use crate::acquisition::{ParameterRegistry, RawEvent, RawEventBuffer};
pub use crate::config::{load_config, RunConfig};
pub use crate::diagnostics::{RunCounters, RunReport};
pub use crate::error::{ConfigError, SinkError, WireError};
pub use crate::identification::{IdentificationResult, IdentificationTelescope};
pub use crate::pipeline::{EventRecord, PipelineOrchestrator, RunSetup};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use particle_id::prelude::*;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let setup = load_config(Path::new("run.json"))?.build()?;
/// let events = vec![RawEvent::new(1, RawEventBuffer::from_pairs([(7, 120), (42, 300)]))];
///
/// let mut sink = MemorySink::new();
/// let report = PipelineOrchestrator::new(&setup).run(events, &mut sink, None)?;
/// println!("identified={} refused={}", report.counters.identified, report.counters.refused.len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::acquisition::{RawEvent, RawEventBuffer};
    pub use crate::config::load_config;
    pub use crate::pipeline::{EventSink, MemorySink, PipelineOrchestrator, RunSetup};
    pub use crate::{EventRecord, IdentificationResult, RunReport};
}
