use serde::{Deserialize, Serialize};

/// Raw-to-energy calibration of one acquisition channel.
///
/// The calibrated value is `poly(raw - pedestal)` with `coefficients` in
/// ascending powers. Raw values at or below the pedestal are not usable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub pedestal: f64,
    pub coefficients: Vec<f64>,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            pedestal: 0.0,
            coefficients: vec![0.0, 1.0],
        }
    }
}

impl Calibration {
    pub fn linear(pedestal: f64, gain: f64) -> Self {
        Self {
            pedestal,
            coefficients: vec![0.0, gain],
        }
    }

    pub fn apply(&self, raw: u64) -> Option<f64> {
        let x = raw as f64 - self.pedestal;
        if x <= 0.0 {
            return None;
        }
        let value = self
            .coefficients
            .iter()
            .rev()
            .fold(0.0f64, |acc, &c| acc * x + c);
        value.is_finite().then_some(value)
    }
}

/// How several usable firings of one layer merge into its signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCombine {
    #[default]
    Sum,
    Last,
    Max,
}

impl SignalCombine {
    pub fn merge(self, current: Option<f64>, value: f64) -> f64 {
        match (self, current) {
            (_, None) => value,
            (SignalCombine::Sum, Some(acc)) => acc + value,
            (SignalCombine::Last, Some(_)) => value,
            (SignalCombine::Max, Some(acc)) => acc.max(value),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChannelBinding {
    pub index: u32,
    pub calibration: Calibration,
}

/// One detector layer of a stack, fed by one or more channels.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerDefinition {
    pub id: String,
    pub channels: Vec<ChannelBinding>,
    pub combine: SignalCombine,
}

/// Ordered layers able to intercept one particle.
#[derive(Clone, Debug, PartialEq)]
pub struct StackDefinition {
    pub id: String,
    /// Stack type used for multiplicity bookkeeping.
    pub kind: String,
    pub layers: Vec<LayerDefinition>,
}

impl StackDefinition {
    pub fn layer_position(&self, layer: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.id == layer)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSignal {
    pub layer: String,
    pub energy: f64,
}

/// Calibrated signals of one stack in one event, in stack layer order.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticleCandidate {
    /// Position of the stack in configuration order.
    #[serde(skip)]
    pub stack_index: usize,
    pub stack_id: String,
    pub kind: String,
    pub signals: Vec<LayerSignal>,
    /// Layers that fired without any usable firing (at or below pedestal).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unusable_layers: Vec<String>,
    /// True when every layer of the stack fired.
    pub complete: bool,
}

impl ParticleCandidate {
    pub fn signal(&self, layer: &str) -> Option<f64> {
        self.signals
            .iter()
            .find(|s| s.layer == layer)
            .map(|s| s.energy)
    }

    pub fn has_signal(&self) -> bool {
        !self.signals.is_empty()
    }
}
