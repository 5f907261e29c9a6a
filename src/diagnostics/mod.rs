//! Diagnostics surface of a reduction run.
//!
//! [`RunReport`] is what a finished (or stopped) run hands back: counters of
//! decode anomalies, identification outcomes and refused events, plus the
//! per-stage timing totals.

pub mod counters;
pub mod timing;

pub use counters::RunCounters;
pub use timing::{StageTiming, TimingBreakdown};

use serde::Serialize;

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub counters: RunCounters,
    pub timings: TimingBreakdown,
    /// The run was stopped between events before its input was exhausted.
    pub stopped_early: bool,
}

impl RunReport {
    /// Multi-line human readable summary.
    pub fn summary(&self) -> String {
        let c = &self.counters;
        let mut out = String::new();
        out.push_str("Run summary\n");
        out.push_str(&format!("  events: {}\n", c.events));
        out.push_str(&format!(
            "  firings: {} (unknown index: {}, malformed: {})\n",
            c.firings, c.unknown_index, c.malformed_values
        ));
        out.push_str(&format!(
            "  candidates: {} identified: {} ({:.1}%) unidentified: {}\n",
            c.candidates,
            c.identified,
            100.0 * c.identified_fraction(),
            c.unidentified
        ));
        out.push_str(&format!("  gamma overrides: {}\n", c.gamma_overrides));
        out.push_str(&format!("  refused events: {}\n", c.refused_count()));
        for stage in &self.timings.stages {
            out.push_str(&format!(
                "  {:<10} {:>9.3} ms ({:.4} ms/event)\n",
                stage.label,
                stage.elapsed_ms,
                stage.mean_ms()
            ));
        }
        if self.stopped_early {
            out.push_str("  stopped early\n");
        }
        out
    }
}
