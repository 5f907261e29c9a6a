use serde::Serialize;

/// Built-in identification quality codes. Contours carry their own codes,
/// which are free integers chosen by the configuration.
pub mod quality {
    /// Point placed between two grid lines.
    pub const GRID_IDENTIFIED: i32 = 0;
    /// Point beyond the outermost grid line but inside the tolerance band.
    pub const GRID_EDGE: i32 = 1;
    /// No contour accepted the point and no grid covers it.
    pub const OUT_OF_RANGE: i32 = 8;
    /// No telescope of the stack had both of its signals.
    pub const NO_SIGNAL: i32 = 14;
}

/// Name of the contour whose match marks a gamma under the generic code.
pub const GAMMA_LINE: &str = "gamma_line";

/// Typed outcome of identifying one candidate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IdentificationResult {
    #[serde(rename = "IDOK")]
    pub id_ok: bool,
    #[serde(rename = "IDcode")]
    pub id_code: i32,
    #[serde(rename = "IDquality")]
    pub id_quality: i32,
    #[serde(rename = "Z")]
    pub z: i32,
    #[serde(rename = "A")]
    pub a: i32,
    #[serde(rename = "RejectingCutName", skip_serializing_if = "Option::is_none")]
    pub rejecting_cut: Option<String>,
    /// Interpolated mass from a grid match.
    #[serde(rename = "Areal", skip_serializing_if = "Option::is_none")]
    pub a_real: Option<f64>,
    /// Telescope that produced the result.
    #[serde(rename = "telescope", skip_serializing_if = "Option::is_none")]
    pub telescope: Option<String>,
}

impl IdentificationResult {
    /// Unidentified result carrying `quality`.
    pub fn unidentified(quality: i32) -> Self {
        Self {
            id_ok: false,
            id_code: 0,
            id_quality: quality,
            z: 0,
            a: 0,
            rejecting_cut: None,
            a_real: None,
            telescope: None,
        }
    }

    pub fn is_gamma(&self, gamma_code: i32) -> bool {
        self.id_ok && self.z == 0 && self.a == 1 && self.id_quality == gamma_code
    }
}
