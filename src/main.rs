use particle_id::acquisition::{ParameterRegistry, RawEvent, RawEventBuffer};
use particle_id::identification::{
    GridKind, IdentificationGrid, IdentificationLine, IdentificationTelescope, Rounding,
};
use particle_id::pipeline::{PipelineOrchestrator, RefusalThresholds, RunSetup};
use particle_id::stacks::{
    Calibration, ChannelBinding, LayerDefinition, SignalCombine, StackDefinition,
};
use nalgebra::Point2;

fn main() {
    env_logger::init();
    // Demo stub: one two-layer stack, a two-line grid and a single event.
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn layer(id: &str, index: u32) -> LayerDefinition {
    LayerDefinition {
        id: id.to_string(),
        channels: vec![ChannelBinding {
            index,
            calibration: Calibration::linear(0.0, 1.0),
        }],
        combine: SignalCombine::Sum,
    }
}

fn run() -> Result<(), String> {
    let mut registry = ParameterRegistry::new(1024);
    registry.register("SI", 7, 14).map_err(|e| e.to_string())?;
    registry.register("CSI", 42, 10).map_err(|e| e.to_string())?;

    let line = |z, a, y| {
        IdentificationLine::new(z, a, vec![Point2::new(0.0, y), Point2::new(1000.0, y)])
    };
    let lines = vec![line(1, 1, 50.0)?, line(2, 4, 150.0)?];
    let grid =
        IdentificationGrid::new("demo", GridKind::DeltaEE, lines, Rounding::NearestLine, 1.0)
            .map_err(|e| e.to_string())?;
    let telescope = IdentificationTelescope::new("si_csi", 2, "csi", "si").with_grid(grid);

    let stacks = vec![StackDefinition {
        id: "module_1".into(),
        kind: "si_csi".into(),
        layers: vec![layer("si", 7), layer("csi", 42)],
    }];
    let setup = RunSetup::new(
        registry,
        stacks,
        vec![("module_1".into(), vec![telescope])],
        RefusalThresholds::default(),
    )
    .map_err(|e| e.to_string())?;

    let event = RawEvent::new(1, RawEventBuffer::from_pairs([(7, 120), (7, 5), (42, 300)]));
    let mut orchestrator = PipelineOrchestrator::new(&setup);
    let record = orchestrator.process_event(&event);
    for p in &record.particles {
        let id = &p.identification;
        println!(
            "stack={} IDOK={} Z={} A={} quality={}",
            p.stack_id, id.id_ok, id.z, id.a, id.id_quality
        );
    }
    print!("{}", orchestrator.finish().summary());
    Ok(())
}
