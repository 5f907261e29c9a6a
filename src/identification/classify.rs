use super::grid::GridMatch;
use serde::Serialize;

/// Outcome of asking a classifier about one point of the signal plane.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Classification {
    /// A grid placed the point between (or on) its lines.
    Line(GridMatch),
    /// A contour accepted or refused the point.
    Region { accepted: bool },
    /// The point lies outside the classifier's domain.
    OutOfRange,
}

impl Classification {
    pub fn is_match(&self) -> bool {
        match self {
            Classification::Line(_) => true,
            Classification::Region { accepted } => *accepted,
            Classification::OutOfRange => false,
        }
    }
}

/// Shared capability of grids and contours.
pub trait Classify {
    fn name(&self) -> &str;
    fn classify(&self, x: f64, y: f64) -> Classification;
}
