use serde::Serialize;

/// Run-level counters exposed for external reporting.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCounters {
    pub events: u64,
    pub firings: u64,
    pub unknown_index: u64,
    pub malformed_values: u64,
    pub candidates: u64,
    pub identified: u64,
    pub unidentified: u64,
    pub gamma_overrides: u64,
    /// Event numbers that failed the refusal thresholds, in run order.
    pub refused: Vec<u64>,
}

impl RunCounters {
    pub fn refused_count(&self) -> usize {
        self.refused.len()
    }

    /// Fraction of candidates identified, 0 when there were none.
    pub fn identified_fraction(&self) -> f64 {
        if self.candidates == 0 {
            0.0
        } else {
            self.identified as f64 / self.candidates as f64
        }
    }
}
