//! Charge/mass identification over the calibrated signal plane.
//!
//! - [`grid`] – families of (Z, A) lines classified by nearest-line
//!   interpolation.
//! - [`contour`] – named inclusive/exclusive regions with quality codes.
//! - [`classify`] – the [`Classify`] capability shared by both.
//! - [`telescope`] – priority-ordered decision procedure and gamma rule.
//! - [`result`] – [`IdentificationResult`] and built-in quality codes.
//!
//! Grids and contours are immutable once built and can be shared read-only
//! between runs.

pub mod classify;
pub mod contour;
pub mod grid;
pub mod result;
pub mod telescope;

pub use classify::{Classification, Classify};
pub use contour::{IdentificationContour, ZaAssignment};
pub use grid::{GridKind, GridMatch, IdentificationGrid, IdentificationLine, Rounding};
pub use result::{quality, IdentificationResult, GAMMA_LINE};
pub use telescope::{GammaRule, Identification, IdentificationTelescope};
