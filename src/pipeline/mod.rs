//! Per-event reduction pipeline.
//!
//! Modules
//! - [`setup`] – validated, immutable run configuration ([`RunSetup`]).
//! - [`orchestrator`] – the event loop ([`PipelineOrchestrator`]).
//! - [`record`] – output records handed to persistence.
//! - [`sink`] – the persistence collaborator seam ([`EventSink`]).
//!
//! Events of one run are processed strictly in order. Independent runs can
//! be reduced side by side with [`process_runs`], which uses Rayon when the
//! `parallel` feature is enabled.

pub mod orchestrator;
pub mod record;
pub mod setup;
pub mod sink;

pub use orchestrator::PipelineOrchestrator;
pub use record::{EventRecord, EventStatus, ParticleRecord};
pub use setup::{RefusalThresholds, RunSetup};
pub use sink::{EventSink, JsonLinesSink, MemorySink};

use crate::acquisition::RawEvent;
use crate::diagnostics::RunReport;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Events of one run.
#[derive(Clone, Debug)]
pub struct RunInput {
    pub run_number: u32,
    pub events: Vec<RawEvent>,
}

#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub run_number: u32,
    pub records: Vec<EventRecord>,
    pub report: RunReport,
}

fn process_run(setup: &RunSetup, run: &RunInput) -> RunOutcome {
    let mut orchestrator = PipelineOrchestrator::new(setup);
    let records = run
        .events
        .iter()
        .map(|event| orchestrator.process_event(event))
        .collect();
    RunOutcome {
        run_number: run.run_number,
        records,
        report: orchestrator.finish(),
    }
}

/// Reduce several independent runs sharing one setup. Outcomes are returned
/// in input order whatever the execution order.
pub fn process_runs(setup: &RunSetup, runs: &[RunInput]) -> Vec<RunOutcome> {
    #[cfg(feature = "parallel")]
    {
        runs.par_iter().map(|run| process_run(setup, run)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        runs.iter().map(|run| process_run(setup, run)).collect()
    }
}
