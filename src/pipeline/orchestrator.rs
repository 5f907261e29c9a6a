//! Event loop driving decode → group → identify for one run.
//!
//! Typical usage:
//! ```no_run
//! use particle_id::pipeline::{MemorySink, PipelineOrchestrator, RunSetup};
//! use particle_id::acquisition::RawEvent;
//!
//! # fn example(setup: &RunSetup, events: Vec<RawEvent>) {
//! let mut sink = MemorySink::new();
//! let report = PipelineOrchestrator::new(setup)
//!     .run(events, &mut sink, None)
//!     .expect("memory sink never fails");
//! println!("{}", report.summary());
//! # }
//! ```

use super::record::{EventRecord, EventStatus, ParticleRecord};
use super::setup::RunSetup;
use super::sink::EventSink;
use crate::acquisition::{AcquisitionDecoder, ChannelState, RawEvent};
use crate::diagnostics::{RunCounters, RunReport, TimingBreakdown};
use crate::error::SinkError;
use crate::identification::{quality, Identification, IdentificationResult};
use crate::stacks::ParticleCandidate;
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

const STAGE_DECODE: &str = "decode";
const STAGE_BUILD: &str = "build";
const STAGE_IDENTIFY: &str = "identify";
const STAGE_SINK: &str = "sink";

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Per-run driver. Holds only the per-event channel cache and run counters;
/// everything else is borrowed read-only from the [`RunSetup`].
pub struct PipelineOrchestrator<'s> {
    setup: &'s RunSetup,
    decoder: AcquisitionDecoder<'s>,
    channels: ChannelState,
    counters: RunCounters,
    timings: TimingBreakdown,
    last_event: Option<u64>,
}

impl<'s> PipelineOrchestrator<'s> {
    pub fn new(setup: &'s RunSetup) -> Self {
        Self {
            setup,
            decoder: AcquisitionDecoder::new(setup.registry()),
            channels: ChannelState::new(),
            counters: RunCounters::default(),
            timings: TimingBreakdown::default(),
            last_event: None,
        }
    }

    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    /// Last-value view of the channels fired in the most recent event.
    pub fn channels(&self) -> &ChannelState {
        &self.channels
    }

    /// Process one event into its output record. Never fails: decode and
    /// identification problems are reported on the record.
    pub fn process_event(&mut self, event: &RawEvent) -> EventRecord {
        if let Some(prev) = self.last_event {
            if event.number <= prev {
                warn!(
                    "event number {} does not follow {}; keeping input order",
                    event.number, prev
                );
            }
        }
        self.last_event = Some(event.number);

        let t0 = Instant::now();
        let decoded = self.decoder.decode(&event.buffer, &mut self.channels);
        self.timings.record(STAGE_DECODE, elapsed_ms(t0));

        let t0 = Instant::now();
        let built = self.setup.builder().build_candidates(&decoded.fired);
        self.timings.record(STAGE_BUILD, elapsed_ms(t0));

        let t0 = Instant::now();
        let mut particles = Vec::with_capacity(built.candidates.len());
        for candidate in built.candidates {
            let id = self.identify_candidate(&candidate);
            if id.gamma_override {
                self.counters.gamma_overrides += 1;
            }
            particles.push(ParticleRecord {
                stack_id: candidate.stack_id,
                kind: candidate.kind,
                complete: candidate.complete,
                signals: candidate.signals,
                unusable_layers: candidate.unusable_layers,
                identification: id.result,
            });
        }
        self.timings.record(STAGE_IDENTIFY, elapsed_ms(t0));

        let identified = particles
            .iter()
            .filter(|p| p.identification.id_ok)
            .count();
        let status = EventStatus::from_counts(particles.len(), identified);
        let refused = identified < self.setup.thresholds().min_identified;

        let c = &mut self.counters;
        c.events += 1;
        c.firings += decoded.fired.len() as u64;
        c.unknown_index += decoded.flags.unknown_index as u64;
        c.malformed_values += decoded.flags.malformed_values as u64;
        c.candidates += particles.len() as u64;
        c.identified += identified as u64;
        c.unidentified += (particles.len() - identified) as u64;
        if refused {
            warn!(
                "event {} refused: {}/{} identified",
                event.number,
                identified,
                particles.len()
            );
            c.refused.push(event.number);
        }

        EventRecord {
            event_number: event.number,
            status,
            refused,
            decode: decoded.flags,
            multiplicity: built.multiplicity,
            particles,
        }
    }

    /// Try the stack's telescopes in order. The first identified result
    /// wins; otherwise the first attempted one is kept. A candidate no
    /// telescope can read is marked `NO_SIGNAL` without classification.
    fn identify_candidate(&self, candidate: &ParticleCandidate) -> Identification {
        let mut first: Option<Identification> = None;
        for telescope in self.setup.telescopes(candidate.stack_index) {
            let Some((x, y)) = telescope.signals(candidate) else {
                continue;
            };
            let id = telescope.identify_traced(x, y);
            if id.result.id_ok {
                return id;
            }
            first.get_or_insert(id);
        }
        first.unwrap_or_else(|| Identification {
            result: IdentificationResult::unidentified(quality::NO_SIGNAL),
            gamma_override: false,
        })
    }

    /// Run every event through the pipeline into `sink`, in input order.
    ///
    /// `stop` is checked between events; once set, the run ends with
    /// `stopped_early`. Only a sink failure aborts the run.
    pub fn run<I, S>(
        mut self,
        events: I,
        sink: &mut S,
        stop: Option<&AtomicBool>,
    ) -> Result<RunReport, SinkError>
    where
        I: IntoIterator<Item = RawEvent>,
        S: EventSink + ?Sized,
    {
        info!("reduction run started");
        let run_start = Instant::now();
        let mut stopped_early = false;

        for event in events {
            if stop.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                info!("stop requested before event {}", event.number);
                stopped_early = true;
                break;
            }
            let record = self.process_event(&event);
            let t0 = Instant::now();
            sink.write(&record)?;
            self.timings.record(STAGE_SINK, elapsed_ms(t0));
        }
        sink.flush()?;

        let mut report = self.finish();
        report.stopped_early = stopped_early;
        report.timings.total_ms = elapsed_ms(run_start);
        info!(
            "reduction run finished: {} events, {} refused",
            report.counters.events,
            report.counters.refused_count()
        );
        Ok(report)
    }

    /// Consume the orchestrator and return what it accumulated.
    pub fn finish(self) -> RunReport {
        RunReport {
            counters: self.counters,
            timings: self.timings,
            stopped_early: false,
        }
    }
}
