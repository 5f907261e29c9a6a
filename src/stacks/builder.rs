//! Grouping of fired channels into per-stack particle candidates.
//!
//! The builder precomputes, for every acquisition index, the `(stack, layer,
//! channel)` slots it feeds. Building candidates is then a single pass over
//! the fired list followed by a walk over the stacks in configuration order.

use super::types::{LayerSignal, ParticleCandidate, StackDefinition};
use crate::acquisition::FiredList;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug)]
struct Route {
    stack: usize,
    layer: usize,
    channel: usize,
}

/// Candidate counts per stack kind for one event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Multiplicity {
    by_kind: BTreeMap<String, usize>,
}

impl Multiplicity {
    pub fn get(&self, kind: &str) -> usize {
        self.by_kind.get(kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.by_kind.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.by_kind.iter().map(|(k, &v)| (k.as_str(), v))
    }

    fn add(&mut self, kind: &str) {
        *self.by_kind.entry(kind.to_string()).or_insert(0) += 1;
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct LayerAccumulator {
    fired: bool,
    energy: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct StackBuildOutput {
    pub candidates: Vec<ParticleCandidate>,
    pub multiplicity: Multiplicity,
}

#[derive(Clone, Debug)]
pub struct StackBuilder {
    stacks: Vec<StackDefinition>,
    routes: Vec<Vec<Route>>,
}

impl StackBuilder {
    pub fn new(stacks: Vec<StackDefinition>) -> Self {
        let mut routes: Vec<Vec<Route>> = Vec::new();
        for (si, stack) in stacks.iter().enumerate() {
            for (li, layer) in stack.layers.iter().enumerate() {
                for (ci, channel) in layer.channels.iter().enumerate() {
                    let slot = channel.index as usize;
                    if routes.len() <= slot {
                        routes.resize_with(slot + 1, Vec::new);
                    }
                    routes[slot].push(Route {
                        stack: si,
                        layer: li,
                        channel: ci,
                    });
                }
            }
        }
        Self { stacks, routes }
    }

    pub fn stacks(&self) -> &[StackDefinition] {
        &self.stacks
    }

    pub fn stack(&self, id: &str) -> Option<&StackDefinition> {
        self.stacks.iter().find(|s| s.id == id)
    }

    /// Build one candidate per stack with at least one fired layer.
    ///
    /// A layer counts as fired when any of its channels appears in `fired`,
    /// even if no firing gives a usable calibrated value; such layers are
    /// listed in [`ParticleCandidate::unusable_layers`].
    pub fn build_candidates(&self, fired: &FiredList) -> StackBuildOutput {
        let mut signals: Vec<Vec<LayerAccumulator>> = self
            .stacks
            .iter()
            .map(|s| vec![LayerAccumulator::default(); s.layers.len()])
            .collect();

        for firing in fired.iter() {
            let Some(routes) = self.routes.get(firing.index as usize) else {
                continue;
            };
            for route in routes {
                let layer = &self.stacks[route.stack].layers[route.layer];
                let acc = &mut signals[route.stack][route.layer];
                acc.fired = true;
                let calibration = &layer.channels[route.channel].calibration;
                if let Some(energy) = calibration.apply(firing.value) {
                    acc.energy = Some(layer.combine.merge(acc.energy, energy));
                }
            }
        }

        let mut out = StackBuildOutput::default();
        let per_stack = self.stacks.iter().zip(signals).enumerate();
        for (stack_index, (stack, layer_signals)) in per_stack {
            let mut fired_layers = 0;
            let mut collected = Vec::new();
            let mut unusable_layers = Vec::new();
            for (layer, acc) in stack.layers.iter().zip(layer_signals) {
                if !acc.fired {
                    continue;
                }
                fired_layers += 1;
                match acc.energy {
                    Some(energy) => collected.push(LayerSignal {
                        layer: layer.id.clone(),
                        energy,
                    }),
                    None => unusable_layers.push(layer.id.clone()),
                }
            }
            if fired_layers == 0 {
                continue;
            }
            let complete = fired_layers == stack.layers.len();
            if !complete {
                debug!(
                    "stack '{}' partial: {}/{} layers fired",
                    stack.id,
                    fired_layers,
                    stack.layers.len()
                );
            }
            if !unusable_layers.is_empty() {
                debug!(
                    "stack '{}': no usable signal on {:?}",
                    stack.id, unusable_layers
                );
            }
            out.multiplicity.add(&stack.kind);
            out.candidates.push(ParticleCandidate {
                stack_index,
                stack_id: stack.id.clone(),
                kind: stack.kind.clone(),
                signals: collected,
                unusable_layers,
                complete,
            });
        }
        out
    }
}
