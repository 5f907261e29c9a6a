use serde::{Deserialize, Serialize};

/// Accumulated wall time of one pipeline stage over a run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
    pub calls: u64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            elapsed_ms: 0.0,
            calls: 0,
        }
    }

    pub fn mean_ms(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.elapsed_ms / self.calls as f64
        }
    }
}

/// Per-stage timing totals, in first-seen stage order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    /// Adds `elapsed_ms` to the stage named `label`, creating it if needed.
    pub fn record(&mut self, label: &str, elapsed_ms: f64) {
        let idx = match self.stages.iter().position(|s| s.label == label) {
            Some(i) => i,
            None => {
                self.stages.push(StageTiming::new(label));
                self.stages.len() - 1
            }
        };
        let stage = &mut self.stages[idx];
        stage.elapsed_ms += elapsed_ms;
        stage.calls += 1;
    }

    pub fn stage(&self, label: &str) -> Option<&StageTiming> {
        self.stages.iter().find(|s| s.label == label)
    }
}
