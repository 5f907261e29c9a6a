//! Identification grids: ordered families of (Z, A) lines.
//!
//! At a given abscissa only lines whose x-range covers it take part; they
//! are ranked by their ordinate there. A point is placed between the two
//! bracketing lines, giving a fractional rank `k + t`. Points beyond the
//! extreme lines are accepted within half the neighbouring spacing and are
//! flagged as edge matches.

use super::classify::{Classification, Classify};
use crate::error::ConfigError;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq)]
pub struct IdentificationLine {
    pub z: i32,
    pub a: i32,
    points: Vec<Point2<f64>>,
}

impl IdentificationLine {
    /// Builds a line from vertices; vertices are sorted by x and must have
    /// distinct abscissae.
    pub fn new(z: i32, a: i32, mut points: Vec<Point2<f64>>) -> Result<Self, String> {
        if points.len() < 2 {
            return Err(format!("line Z={z} A={a} needs at least 2 points"));
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(format!("line Z={z} A={a} has non-finite points"));
        }
        points.sort_by(|p, q| p.x.total_cmp(&q.x));
        if points.windows(2).any(|w| w[1].x <= w[0].x) {
            return Err(format!("line Z={z} A={a} has repeated abscissae"));
        }
        Ok(Self { z, a, points })
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.points[0].x, self.points[self.points.len() - 1].x)
    }

    /// Ordinate of the polyline at `x`, or `None` outside its range.
    pub fn y_at(&self, x: f64) -> Option<f64> {
        let (x0, x1) = self.x_range();
        if !(x0..=x1).contains(&x) {
            return None;
        }
        let i = self.points.partition_point(|p| p.x <= x);
        if i >= self.points.len() {
            return Some(self.points[self.points.len() - 1].y);
        }
        let (p, q) = (self.points[i - 1], self.points[i]);
        let t = (x - p.x) / (q.x - p.x);
        Some(p.y + t * (q.y - p.y))
    }
}

/// Mapping from the interpolated mass to an integer A.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// A of the nearest line.
    #[default]
    NearestLine,
    /// Interpolated A rounded to the nearest integer.
    Nearest,
    /// Interpolated A rounded down.
    Floor,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridKind {
    /// Energy loss versus residual energy.
    #[default]
    #[serde(rename = "delta_e")]
    DeltaEE,
    /// Fast versus slow scintillation components; carries the quality code
    /// designating gamma candidates.
    FastSlow { gamma_code: i32 },
}

impl GridKind {
    pub fn gamma_code(&self) -> Option<i32> {
        match self {
            GridKind::FastSlow { gamma_code } => Some(*gamma_code),
            GridKind::DeltaEE => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridMatch {
    /// Index of the nearest line in configuration order.
    pub nearest_line: usize,
    /// Rank among the lines covering x, plus the interpolation fraction.
    pub fractional: f64,
    pub z: i32,
    pub a_real: f64,
    pub a: i32,
    /// Point lies beyond the outermost line, inside the tolerance band.
    pub edge: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IdentificationGrid {
    name: String,
    kind: GridKind,
    lines: Vec<IdentificationLine>,
    rounding: Rounding,
    edge_tolerance: f64,
}

impl IdentificationGrid {
    pub fn new(
        name: impl Into<String>,
        kind: GridKind,
        lines: Vec<IdentificationLine>,
        rounding: Rounding,
        edge_tolerance: f64,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if lines.is_empty() {
            return Err(ConfigError::InvalidGrid {
                name,
                reason: "grid has no lines".to_string(),
            });
        }
        if !edge_tolerance.is_finite() || edge_tolerance < 0.0 {
            return Err(ConfigError::InvalidGrid {
                name,
                reason: format!("edge tolerance {edge_tolerance} must be finite and >= 0"),
            });
        }
        Ok(Self {
            name,
            kind,
            lines,
            rounding,
            edge_tolerance,
        })
    }

    pub fn kind(&self) -> GridKind {
        self.kind
    }

    pub fn lines(&self) -> &[IdentificationLine] {
        &self.lines
    }

    fn round_mass(&self, nearest: &IdentificationLine, a_real: f64) -> i32 {
        match self.rounding {
            Rounding::NearestLine => nearest.a,
            Rounding::Nearest => a_real.round() as i32,
            Rounding::Floor => a_real.floor() as i32,
        }
    }

    fn locate(&self, x: f64, y: f64) -> Option<GridMatch> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let mut covering: Vec<(usize, f64)> = self
            .lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| line.y_at(x).map(|yl| (i, yl)))
            .collect();
        if covering.is_empty() {
            return None;
        }
        covering.sort_by(|p, q| p.1.total_cmp(&q.1));
        let n = covering.len();

        if n == 1 {
            let (idx, yl) = covering[0];
            if (y - yl).abs() > self.edge_tolerance {
                return None;
            }
            let line = &self.lines[idx];
            return Some(GridMatch {
                nearest_line: idx,
                fractional: 0.0,
                z: line.z,
                a_real: line.a as f64,
                a: self.round_mass(line, line.a as f64),
                edge: y != yl,
            });
        }

        let (y_lo, y_hi) = (covering[0].1, covering[n - 1].1);
        let (k, t, edge) = if y < y_lo {
            let d = covering[1].1 - y_lo;
            if d <= 0.0 || y < y_lo - 0.5 * d {
                return None;
            }
            (0, (y - y_lo) / d, true)
        } else if y > y_hi {
            let d = y_hi - covering[n - 2].1;
            if d <= 0.0 || y > y_hi + 0.5 * d {
                return None;
            }
            (n - 2, 1.0 + (y - y_hi) / d, true)
        } else {
            let k = covering
                .partition_point(|c| c.1 <= y)
                .saturating_sub(1)
                .min(n - 2);
            let d = covering[k + 1].1 - covering[k].1;
            let t = if d > 0.0 { (y - covering[k].1) / d } else { 0.0 };
            (k, t, false)
        };

        let fractional = k as f64 + t;
        let rank = (fractional.round().max(0.0) as usize).min(n - 1);
        let nearest_line = covering[rank].0;
        let nearest = &self.lines[nearest_line];
        let (lo, hi) = (&self.lines[covering[k].0], &self.lines[covering[k + 1].0]);
        // Mass is only interpolated between isotopes of one element.
        let a_real = if lo.z == hi.z {
            lo.a as f64 + t * (hi.a - lo.a) as f64
        } else {
            nearest.a as f64
        };

        Some(GridMatch {
            nearest_line,
            fractional,
            z: nearest.z,
            a_real,
            a: self.round_mass(nearest, a_real),
            edge,
        })
    }
}

impl Classify for IdentificationGrid {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, x: f64, y: f64) -> Classification {
        match self.locate(x, y) {
            Some(m) => Classification::Line(m),
            None => Classification::OutOfRange,
        }
    }
}
