use particle_id::acquisition::{RawEvent, RawEventBuffer};
use particle_id::config::RunConfig;
use particle_id::pipeline::RunSetup;

/// Two modules: `m1` (si, csi, csi_fast) with a ΔE–E telescope followed by a
/// fast–slow one, and `m2` (si, csi) with a ΔE–E telescope only.
pub const RUN_CONFIG: &str = r#"{
    "maxIndex": 4096,
    "parameters": [
        { "name": "SI_1", "index": 7, "bitWidth": 14 },
        { "name": "CSI_1_R", "index": 42, "bitWidth": 10 },
        { "name": "CSI_1_L", "index": 43, "bitWidth": 12 },
        { "name": "SI_2", "index": 100, "bitWidth": 14 },
        { "name": "CSI_2_R", "index": 101, "bitWidth": 12 }
    ],
    "stacks": [
        { "id": "m1", "kind": "si_csi", "layers": [
            { "id": "si", "channels": [ { "parameter": "SI_1" } ] },
            { "id": "csi", "channels": [ { "parameter": "CSI_1_R" } ] },
            { "id": "csi_fast", "channels": [ { "parameter": "CSI_1_L" } ] }
        ] },
        { "id": "m2", "kind": "si_csi", "layers": [
            { "id": "si", "channels": [ { "parameter": "SI_2" } ] },
            { "id": "csi", "channels": [ { "parameter": "CSI_2_R" } ] }
        ] }
    ],
    "grids": [
        { "name": "de_e", "lines": [
            { "z": 1, "a": 1, "points": [[0, 50], [2000, 50]] },
            { "z": 2, "a": 4, "points": [[0, 150], [2000, 150]] },
            { "z": 3, "a": 7, "points": [[0, 300], [2000, 300]] }
        ] },
        { "name": "fast_slow", "kind": { "type": "fast_slow", "gamma_code": 10 }, "lines": [
            { "z": 1, "a": 1, "points": [[0, 100], [2000, 100]] },
            { "z": 1, "a": 2, "points": [[0, 200], [2000, 200]] }
        ] }
    ],
    "contours": [
        { "name": "gammas", "quality": 10, "points": [[0, 0], [1100, 0], [1100, 5], [0, 5]] }
    ],
    "telescopes": [
        { "name": "m1_si_csi", "stack": "m1", "idCode": 2, "x": "csi", "y": "si", "grid": "de_e" },
        { "name": "m1_csi", "stack": "m1", "idCode": 3, "x": "csi", "y": "csi_fast",
          "grid": "fast_slow", "contours": ["gammas"] },
        { "name": "m2_si_csi", "stack": "m2", "idCode": 2, "x": "csi", "y": "si", "grid": "de_e" }
    ]
}"#;

pub fn run_config() -> RunConfig {
    serde_json::from_str(RUN_CONFIG).expect("synthetic config parses")
}

pub fn run_setup() -> RunSetup {
    run_config().build().expect("synthetic config is valid")
}

pub fn event(number: u64, pairs: &[(u32, u64)]) -> RawEvent {
    RawEvent::new(number, RawEventBuffer::from_pairs(pairs.iter().copied()))
}
