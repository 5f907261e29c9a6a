use crate::acquisition::registry::DEFAULT_MAX_INDEX;
use crate::acquisition::ParameterRegistry;
use crate::error::ConfigError;
use crate::identification::{
    GammaRule, GridKind, IdentificationContour, IdentificationGrid, IdentificationLine,
    IdentificationTelescope, Rounding, ZaAssignment,
};
use crate::pipeline::{RefusalThresholds, RunSetup};
use crate::stacks::{
    Calibration, ChannelBinding, LayerDefinition, SignalCombine, StackDefinition,
};
use log::debug;
use nalgebra::Point2;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterConfig {
    pub name: String,
    pub index: u32,
    pub bit_width: u8,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelConfig {
    pub parameter: String,
    #[serde(default)]
    pub calibration: Calibration,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    pub id: String,
    pub channels: Vec<ChannelConfig>,
    #[serde(default)]
    pub combine: SignalCombine,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackConfig {
    pub id: String,
    /// Defaults to the stack id.
    #[serde(default)]
    pub kind: Option<String>,
    pub layers: Vec<LayerConfig>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    pub z: i32,
    pub a: i32,
    pub points: Vec<[f64; 2]>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub name: String,
    #[serde(default)]
    pub kind: GridKind,
    #[serde(default)]
    pub rounding: Rounding,
    #[serde(default = "default_edge_tolerance")]
    pub edge_tolerance: f64,
    pub lines: Vec<LineConfig>,
}

fn default_edge_tolerance() -> f64 {
    1.0
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContourConfig {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    #[serde(default)]
    pub exclusive: bool,
    pub quality: i32,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub assign: Option<ZaAssignment>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelescopeConfig {
    pub name: String,
    pub stack: String,
    #[serde(default)]
    pub id_code: i32,
    /// Layer feeding the horizontal axis.
    pub x: String,
    /// Layer feeding the vertical axis.
    pub y: String,
    #[serde(default)]
    pub grid: Option<String>,
    #[serde(default)]
    pub contours: Vec<String>,
    #[serde(default)]
    pub gamma: Option<GammaRule>,
}

/// Whole run configuration as read from JSON.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    #[serde(default = "default_max_index")]
    pub max_index: u32,
    pub parameters: Vec<ParameterConfig>,
    pub stacks: Vec<StackConfig>,
    #[serde(default)]
    pub grids: Vec<GridConfig>,
    #[serde(default)]
    pub contours: Vec<ContourConfig>,
    pub telescopes: Vec<TelescopeConfig>,
    #[serde(default)]
    pub thresholds: RefusalThresholds,
}

fn default_max_index() -> u32 {
    DEFAULT_MAX_INDEX
}

fn to_points(points: &[[f64; 2]]) -> Vec<Point2<f64>> {
    points.iter().map(|p| Point2::new(p[0], p[1])).collect()
}

impl GridConfig {
    pub fn build(&self) -> Result<IdentificationGrid, ConfigError> {
        let lines = self
            .lines
            .iter()
            .map(|l| IdentificationLine::new(l.z, l.a, to_points(&l.points)))
            .collect::<Result<Vec<_>, String>>()
            .map_err(|reason| ConfigError::InvalidGrid {
                name: self.name.clone(),
                reason,
            })?;
        IdentificationGrid::new(
            self.name.clone(),
            self.kind,
            lines,
            self.rounding,
            self.edge_tolerance,
        )
    }
}

impl ContourConfig {
    pub fn build(&self) -> Result<IdentificationContour, ConfigError> {
        let contour = IdentificationContour::new(
            self.name.clone(),
            to_points(&self.points),
            self.exclusive,
            self.quality,
            self.priority,
        )?;
        Ok(match self.assign {
            Some(za) => contour.with_assignment(za),
            None => contour,
        })
    }
}

impl RunConfig {
    pub fn build_registry(&self) -> Result<ParameterRegistry, ConfigError> {
        let mut registry = ParameterRegistry::new(self.max_index);
        for p in &self.parameters {
            registry.register(p.name.clone(), p.index, p.bit_width)?;
        }
        Ok(registry)
    }

    fn build_stack(
        registry: &ParameterRegistry,
        stack: &StackConfig,
    ) -> Result<StackDefinition, ConfigError> {
        let layers = stack
            .layers
            .iter()
            .map(|layer| {
                let channels = layer
                    .channels
                    .iter()
                    .map(|ch| {
                        let param = registry
                            .lookup_name(&ch.parameter)
                            .ok_or_else(|| ConfigError::UnknownParameter(ch.parameter.clone()))?;
                        Ok::<_, ConfigError>(ChannelBinding {
                            index: param.index,
                            calibration: ch.calibration.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>, ConfigError>>()?;
                Ok::<_, ConfigError>(LayerDefinition {
                    id: layer.id.clone(),
                    channels,
                    combine: layer.combine,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(StackDefinition {
            id: stack.id.clone(),
            kind: stack.kind.clone().unwrap_or_else(|| stack.id.clone()),
            layers,
        })
    }

    fn build_telescope(
        &self,
        tel: &TelescopeConfig,
        grids: &HashMap<&str, IdentificationGrid>,
        contours: &HashMap<&str, IdentificationContour>,
    ) -> Result<IdentificationTelescope, ConfigError> {
        let mut telescope = IdentificationTelescope::new(
            tel.name.clone(),
            tel.id_code,
            tel.x.clone(),
            tel.y.clone(),
        );
        if let Some(rule) = tel.gamma {
            telescope = telescope.with_gamma_rule(rule);
        }
        if let Some(grid_name) = &tel.grid {
            let grid = grids
                .get(grid_name.as_str())
                .ok_or_else(|| ConfigError::MissingGrid {
                    telescope: tel.name.clone(),
                    grid: grid_name.clone(),
                })?;
            telescope = telescope.with_grid(grid.clone());
        }
        let selected = tel
            .contours
            .iter()
            .map(|name| {
                contours
                    .get(name.as_str())
                    .cloned()
                    .ok_or_else(|| ConfigError::MissingContour {
                        telescope: tel.name.clone(),
                        contour: name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(telescope.with_contours(selected))
    }

    /// Validate the configuration and assemble the immutable run setup.
    pub fn build(&self) -> Result<RunSetup, ConfigError> {
        let registry = self.build_registry()?;
        let stacks = self
            .stacks
            .iter()
            .map(|s| Self::build_stack(&registry, s))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let mut grids = HashMap::new();
        for g in &self.grids {
            if grids.insert(g.name.as_str(), g.build()?).is_some() {
                return Err(ConfigError::DuplicateGrid(g.name.clone()));
            }
        }
        let mut contours = HashMap::new();
        for c in &self.contours {
            if contours.insert(c.name.as_str(), c.build()?).is_some() {
                return Err(ConfigError::DuplicateContour(c.name.clone()));
            }
        }

        let mut bindings: Vec<(String, Vec<IdentificationTelescope>)> = Vec::new();
        for tel in &self.telescopes {
            let built = self.build_telescope(tel, &grids, &contours)?;
            match bindings.iter_mut().find(|(stack, _)| *stack == tel.stack) {
                Some((_, list)) => list.push(built),
                None => bindings.push((tel.stack.clone(), vec![built])),
            }
        }

        debug!(
            "configuration: {} parameters, {} stacks, {} telescopes",
            registry.len(),
            stacks.len(),
            self.telescopes.len()
        );
        RunSetup::new(registry, stacks, bindings, self.thresholds)
    }
}

pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "maxIndex": 1024,
        "parameters": [
            { "name": "SI_1", "index": 7, "bitWidth": 14 },
            { "name": "CSI_1_R", "index": 42, "bitWidth": 10 }
        ],
        "stacks": [
            { "id": "m1", "kind": "si_csi", "layers": [
                { "id": "si", "channels": [ { "parameter": "SI_1" } ] },
                { "id": "csi", "channels": [ { "parameter": "CSI_1_R",
                    "calibration": { "pedestal": 10.0, "coefficients": [0.0, 0.5] } } ] }
            ] }
        ],
        "grids": [
            { "name": "g", "rounding": "nearest", "lines": [
                { "z": 1, "a": 1, "points": [[0, 10], [1000, 10]] },
                { "z": 2, "a": 4, "points": [[0, 40], [1000, 40]] }
            ] }
        ],
        "contours": [
            { "name": "gamma_line", "quality": 2, "points": [[0, 0], [50, 0], [50, 5], [0, 5]] }
        ],
        "telescopes": [
            { "name": "m1_si_csi", "stack": "m1", "idCode": 2, "x": "csi", "y": "si",
              "grid": "g", "contours": ["gamma_line"],
              "gamma": { "gammaCode": 10, "genericCode": 2 } }
        ]
    }"#;

    fn parse(text: &str) -> RunConfig {
        serde_json::from_str(text).expect("valid config json")
    }

    #[test]
    fn builds_setup_from_json() {
        let setup = parse(CONFIG).build().unwrap();
        assert_eq!(setup.registry().len(), 2);
        let stack = &setup.builder().stacks()[0];
        assert_eq!(stack.kind, "si_csi");
        assert_eq!(stack.layers[1].channels[0].index, 42);
        let tels = setup.telescopes(0);
        assert_eq!(tels.len(), 1);
        assert_eq!(
            tels[0].gamma_rule(),
            Some(GammaRule {
                gamma_code: 10,
                generic_code: Some(2)
            })
        );
        assert_eq!(setup.thresholds().min_identified, 1);
    }

    #[test]
    fn duplicate_registry_index_is_fatal() {
        let text = CONFIG.replace(r#""index": 42"#, r#""index": 7"#);
        assert!(matches!(
            parse(&text).build(),
            Err(ConfigError::DuplicateIndex { index: 7, .. })
        ));
    }

    #[test]
    fn unknown_parameter_in_stack_is_fatal() {
        let text = CONFIG.replace(r#""parameter": "SI_1""#, r#""parameter": "SI_9""#);
        assert!(matches!(
            parse(&text).build(),
            Err(ConfigError::UnknownParameter(name)) if name == "SI_9"
        ));
    }

    #[test]
    fn missing_grid_binding_is_fatal() {
        let text = CONFIG.replace(r#""grid": "g""#, r#""grid": "nope""#);
        assert!(matches!(
            parse(&text).build(),
            Err(ConfigError::MissingGrid { .. })
        ));
    }

    #[test]
    fn stack_without_telescope_is_fatal() {
        let text = CONFIG.replace(r#""stack": "m1""#, r#""stack": "m2""#);
        assert!(matches!(
            parse(&text).build(),
            Err(ConfigError::MissingTelescope(id)) if id == "m1"
        ));
    }

    #[test]
    fn telescope_layer_must_exist_in_stack() {
        let text = CONFIG.replace(r#""x": "csi""#, r#""x": "csi_fast""#);
        assert!(matches!(
            parse(&text).build(),
            Err(ConfigError::UnknownLayer { .. })
        ));
    }

    #[test]
    fn gamma_rule_must_agree_with_fast_slow_grid() {
        let fast_slow = |code: i32| {
            CONFIG.replace(
                r#"{ "name": "g", "rounding""#,
                &format!(
                    r#"{{ "name": "g", "kind": {{ "type": "fast_slow", "gamma_code": {code} }}, "rounding""#
                ),
            )
        };
        assert!(matches!(
            parse(&fast_slow(11)).build(),
            Err(ConfigError::ConflictingGammaCode { rule: 10, grid: 11, .. })
        ));

        let setup = parse(&fast_slow(10)).build().unwrap();
        assert_eq!(
            setup.telescopes(0)[0].gamma_rule(),
            Some(GammaRule {
                gamma_code: 10,
                generic_code: Some(2)
            })
        );
    }

    #[test]
    fn duplicate_names_are_fatal() {
        let text = CONFIG.replacen(
            r#""grids": ["#,
            r#""grids": [ { "name": "g", "lines": [ { "z": 1, "a": 1, "points": [[0, 1], [9, 1]] } ] },"#,
            1,
        );
        assert!(matches!(
            parse(&text).build(),
            Err(ConfigError::DuplicateGrid(name)) if name == "g"
        ));

        let text = CONFIG.replacen(
            r#""contours": ["#,
            r#""contours": [ { "name": "gamma_line", "quality": 3, "points": [[0, 0], [1, 0], [1, 1]] },"#,
            1,
        );
        assert!(matches!(
            parse(&text).build(),
            Err(ConfigError::DuplicateContour(name)) if name == "gamma_line"
        ));

        let text = CONFIG.replace(
            r#""telescopes": ["#,
            r#""telescopes": [ { "name": "m1_si_csi", "stack": "m1", "x": "csi", "y": "si" },"#,
        );
        assert!(matches!(
            parse(&text).build(),
            Err(ConfigError::DuplicateTelescope(name)) if name == "m1_si_csi"
        ));

        let text = CONFIG.replace(r#"{ "id": "csi", "channels""#, r#"{ "id": "si", "channels""#);
        assert!(matches!(
            parse(&text).build(),
            Err(ConfigError::DuplicateLayer { layer, .. }) if layer == "si"
        ));
    }

    #[test]
    fn missing_config_file_reports_io_error() {
        let err = load_config(Path::new("/nonexistent/run.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
