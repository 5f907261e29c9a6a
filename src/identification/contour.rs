//! Closed identification regions ("cuts").
//!
//! An inclusive contour accepts points inside its polygon; an exclusive
//! contour accepts points outside. Membership uses the even-odd crossing
//! rule with a half-open convention on horizontal edges.

use super::classify::{Classification, Classify};
use crate::error::ConfigError;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Charge and mass written into the result when a contour matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZaAssignment {
    pub z: i32,
    pub a: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IdentificationContour {
    name: String,
    points: Vec<Point2<f64>>,
    exclusive: bool,
    quality_code: i32,
    /// Lower values are evaluated first.
    priority: i32,
    assign: Option<ZaAssignment>,
}

impl IdentificationContour {
    pub fn new(
        name: impl Into<String>,
        points: Vec<Point2<f64>>,
        exclusive: bool,
        quality_code: i32,
        priority: i32,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if points.len() < 3 {
            return Err(ConfigError::InvalidContour {
                name,
                reason: format!("{} vertices, need at least 3", points.len()),
            });
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(ConfigError::InvalidContour {
                name,
                reason: "non-finite vertex".to_string(),
            });
        }
        Ok(Self {
            name,
            points,
            exclusive,
            quality_code,
            priority,
            assign: None,
        })
    }

    pub fn with_assignment(mut self, assign: ZaAssignment) -> Self {
        self.assign = Some(assign);
        self
    }

    pub fn quality_code(&self) -> i32 {
        self.quality_code
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    pub fn assignment(&self) -> Option<ZaAssignment> {
        self.assign
    }

    /// Even-odd polygon membership; the closing edge is implied.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let n = self.points.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (pi, pj) = (self.points[i], self.points[j]);
            if (pi.y > y) != (pj.y > y) {
                let x_cross = pi.x + (y - pi.y) * (pj.x - pi.x) / (pj.y - pi.y);
                if x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Acceptance test honouring the exclusive flag.
    pub fn test_point(&self, x: f64, y: f64) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        self.contains(x, y) != self.exclusive
    }
}

impl Classify for IdentificationContour {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, x: f64, y: f64) -> Classification {
        Classification::Region {
            accepted: self.test_point(x, y),
        }
    }
}
