use crate::acquisition::DecodeFlags;
use crate::identification::IdentificationResult;
use crate::stacks::{LayerSignal, Multiplicity};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Every candidate was identified.
    Identified,
    /// Some candidates were identified.
    Partial,
    /// Candidates exist but none was identified.
    Unidentified,
    /// No stack fired.
    NoCandidates,
}

impl EventStatus {
    pub fn from_counts(candidates: usize, identified: usize) -> Self {
        match (candidates, identified) {
            (0, _) => EventStatus::NoCandidates,
            (n, k) if k >= n => EventStatus::Identified,
            (_, 0) => EventStatus::Unidentified,
            _ => EventStatus::Partial,
        }
    }
}

/// One candidate with its identification, as handed to persistence.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticleRecord {
    pub stack_id: String,
    pub kind: String,
    pub complete: bool,
    pub signals: Vec<LayerSignal>,
    /// Layers that fired without a usable signal.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unusable_layers: Vec<String>,
    pub identification: IdentificationResult,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub event_number: u64,
    pub status: EventStatus,
    /// The event failed the run's refusal thresholds.
    pub refused: bool,
    pub decode: DecodeFlags,
    pub multiplicity: Multiplicity,
    pub particles: Vec<ParticleRecord>,
}

impl EventRecord {
    pub fn identified(&self) -> usize {
        self.particles
            .iter()
            .filter(|p| p.identification.id_ok)
            .count()
    }
}
