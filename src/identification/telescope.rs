//! Identification telescope: contours, grid and the gamma relabelling rule.
//!
//! Decision order for a point `(x, y)`:
//! 1. contours by ascending priority; the first accepting contour wins;
//! 2. otherwise the grid, when the point lies in its domain;
//! 3. otherwise the point is out of range.
//!
//! The gamma rule is then applied to whatever came out of 1–3, including
//! unidentified results.

use super::classify::{Classification, Classify};
use super::contour::IdentificationContour;
use super::grid::IdentificationGrid;
use super::result::{quality, IdentificationResult, GAMMA_LINE};
use crate::stacks::ParticleCandidate;
use serde::{Deserialize, Serialize};

/// Relabels gamma candidates as `Z=0, A=1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaRule {
    /// Quality code designating a gamma candidate.
    pub gamma_code: i32,
    /// Generic quality code that means gamma when the matching cut is
    /// named `gamma_line`.
    pub generic_code: Option<i32>,
}

impl GammaRule {
    pub fn matches(&self, result: &IdentificationResult) -> bool {
        if result.id_quality == self.gamma_code {
            return true;
        }
        self.generic_code == Some(result.id_quality)
            && result.rejecting_cut.as_deref() == Some(GAMMA_LINE)
    }

    fn apply(&self, result: &mut IdentificationResult) {
        result.id_ok = true;
        result.id_code = 0;
        result.id_quality = self.gamma_code;
        result.z = 0;
        result.a = 1;
        result.a_real = None;
    }
}

/// Result together with whether the gamma rule rewrote it.
#[derive(Clone, Debug, PartialEq)]
pub struct Identification {
    pub result: IdentificationResult,
    pub gamma_override: bool,
}

#[derive(Clone, Debug)]
pub struct IdentificationTelescope {
    name: String,
    id_code: i32,
    x_layer: String,
    y_layer: String,
    contours: Vec<IdentificationContour>,
    grid: Option<IdentificationGrid>,
    gamma: Option<GammaRule>,
}

impl IdentificationTelescope {
    /// `x_layer` and `y_layer` name the stack layers feeding the two axes.
    pub fn new(
        name: impl Into<String>,
        id_code: i32,
        x_layer: impl Into<String>,
        y_layer: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            id_code,
            x_layer: x_layer.into(),
            y_layer: y_layer.into(),
            contours: Vec::new(),
            grid: None,
            gamma: None,
        }
    }

    /// Installs the grid. A fast-slow grid brings its gamma code with it
    /// unless a rule was already set; `RunSetup::new` rejects a rule whose
    /// gamma code differs from the grid's.
    pub fn with_grid(mut self, grid: IdentificationGrid) -> Self {
        if self.gamma.is_none() {
            self.gamma = grid.kind().gamma_code().map(|gamma_code| GammaRule {
                gamma_code,
                generic_code: None,
            });
        }
        self.grid = Some(grid);
        self
    }

    /// Adds contours; evaluation order is ascending priority, ties keep
    /// insertion order.
    pub fn with_contours<I>(mut self, contours: I) -> Self
    where
        I: IntoIterator<Item = IdentificationContour>,
    {
        self.contours.extend(contours);
        self.contours.sort_by_key(|c| c.priority());
        self
    }

    pub fn with_gamma_rule(mut self, rule: GammaRule) -> Self {
        self.gamma = Some(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_code(&self) -> i32 {
        self.id_code
    }

    pub fn x_layer(&self) -> &str {
        &self.x_layer
    }

    pub fn y_layer(&self) -> &str {
        &self.y_layer
    }

    pub fn gamma_rule(&self) -> Option<GammaRule> {
        self.gamma
    }

    pub fn contours(&self) -> &[IdentificationContour] {
        &self.contours
    }

    pub fn grid(&self) -> Option<&IdentificationGrid> {
        self.grid.as_ref()
    }

    /// The `(x, y)` pair for this telescope, when the candidate has both.
    pub fn signals(&self, candidate: &ParticleCandidate) -> Option<(f64, f64)> {
        Some((
            candidate.signal(&self.x_layer)?,
            candidate.signal(&self.y_layer)?,
        ))
    }

    pub fn identify(&self, x: f64, y: f64) -> IdentificationResult {
        self.identify_traced(x, y).result
    }

    pub fn identify_traced(&self, x: f64, y: f64) -> Identification {
        let mut result = self.classify_point(x, y);
        let gamma_override = match self.gamma {
            Some(rule) if rule.matches(&result) => {
                rule.apply(&mut result);
                true
            }
            _ => false,
        };
        Identification {
            result,
            gamma_override,
        }
    }

    fn classify_point(&self, x: f64, y: f64) -> IdentificationResult {
        let mut result = IdentificationResult::unidentified(quality::OUT_OF_RANGE);
        result.id_code = self.id_code;
        result.telescope = Some(self.name.clone());

        if let Some(contour) = self.contours.iter().find(|c| c.test_point(x, y)) {
            result.id_ok = true;
            result.id_quality = contour.quality_code();
            result.rejecting_cut = Some(contour.name().to_string());
            if let Some(za) = contour.assignment() {
                result.z = za.z;
                result.a = za.a;
            }
            return result;
        }

        if let Some(Classification::Line(m)) = self.grid.as_ref().map(|g| g.classify(x, y)) {
            result.id_ok = true;
            result.id_quality = if m.edge {
                quality::GRID_EDGE
            } else {
                quality::GRID_IDENTIFIED
            };
            result.z = m.z;
            result.a = m.a;
            result.a_real = Some(m.a_real);
        }
        result
    }
}
