//! Immutable per-run configuration consumed by the orchestrator.

use crate::acquisition::ParameterRegistry;
use crate::error::ConfigError;
use crate::identification::IdentificationTelescope;
use crate::stacks::{StackBuilder, StackDefinition};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Minimal quality an event must reach to stay off the refused list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefusalThresholds {
    /// Minimum number of identified candidates per event.
    pub min_identified: usize,
}

impl Default for RefusalThresholds {
    fn default() -> Self {
        Self { min_identified: 1 }
    }
}

/// Registry, stacks and telescopes of one run, validated together.
///
/// Built once before the event loop and only read afterwards; it can be
/// shared by reference between independent runs.
#[derive(Clone, Debug)]
pub struct RunSetup {
    registry: ParameterRegistry,
    builder: StackBuilder,
    /// Telescopes per stack, aligned with the builder's stack order.
    telescopes: Vec<Vec<IdentificationTelescope>>,
    thresholds: RefusalThresholds,
}

impl RunSetup {
    /// Validates and assembles a run configuration.
    ///
    /// `bindings` lists, per stack id, the telescopes to try in order.
    pub fn new(
        registry: ParameterRegistry,
        stacks: Vec<StackDefinition>,
        mut bindings: Vec<(String, Vec<IdentificationTelescope>)>,
        thresholds: RefusalThresholds,
    ) -> Result<Self, ConfigError> {
        let mut names = HashSet::new();
        for tel in bindings.iter().flat_map(|(_, list)| list) {
            if !names.insert(tel.name()) {
                return Err(ConfigError::DuplicateTelescope(tel.name().to_string()));
            }
        }

        let mut seen = HashSet::new();
        let mut telescopes = Vec::with_capacity(stacks.len());
        for stack in &stacks {
            if !seen.insert(stack.id.as_str()) {
                return Err(ConfigError::DuplicateStack(stack.id.clone()));
            }
            if stack.layers.is_empty() {
                return Err(ConfigError::EmptyStack(stack.id.clone()));
            }
            let mut layer_ids = HashSet::new();
            for layer in &stack.layers {
                if !layer_ids.insert(layer.id.as_str()) {
                    return Err(ConfigError::DuplicateLayer {
                        stack: stack.id.clone(),
                        layer: layer.id.clone(),
                    });
                }
            }
            for channel in stack.layers.iter().flat_map(|l| &l.channels) {
                if registry.lookup(channel.index).is_none() {
                    return Err(ConfigError::UnknownParameter(format!(
                        "index {} (stack '{}')",
                        channel.index, stack.id
                    )));
                }
            }

            let bound = bindings
                .iter()
                .position(|(id, _)| *id == stack.id)
                .map(|pos| bindings.swap_remove(pos).1)
                .unwrap_or_default();
            if bound.is_empty() {
                return Err(ConfigError::MissingTelescope(stack.id.clone()));
            }
            for tel in &bound {
                let grid_code = tel.grid().and_then(|g| g.kind().gamma_code());
                if let (Some(rule), Some(grid)) = (tel.gamma_rule(), grid_code) {
                    if rule.gamma_code != grid {
                        return Err(ConfigError::ConflictingGammaCode {
                            telescope: tel.name().to_string(),
                            rule: rule.gamma_code,
                            grid,
                        });
                    }
                }
                for layer in [tel.x_layer(), tel.y_layer()] {
                    if stack.layer_position(layer).is_none() {
                        return Err(ConfigError::UnknownLayer {
                            telescope: tel.name().to_string(),
                            stack: stack.id.clone(),
                            layer: layer.to_string(),
                        });
                    }
                }
            }
            telescopes.push(bound);
        }
        if let Some((id, _)) = bindings.first() {
            return Err(ConfigError::UnknownStack(id.clone()));
        }

        Ok(Self {
            registry,
            builder: StackBuilder::new(stacks),
            telescopes,
            thresholds,
        })
    }

    pub fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    pub fn builder(&self) -> &StackBuilder {
        &self.builder
    }

    pub fn thresholds(&self) -> RefusalThresholds {
        self.thresholds
    }

    /// Telescopes bound to the stack at `stack_index`.
    pub fn telescopes(&self, stack_index: usize) -> &[IdentificationTelescope] {
        self.telescopes
            .get(stack_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
