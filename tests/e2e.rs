mod common;

use common::synthetic_run::{event, run_setup};
use particle_id::acquisition::{AcquisitionDecoder, ChannelState, DecodeAnomaly};
use particle_id::identification::quality;
use particle_id::pipeline::{
    process_runs, EventStatus, JsonLinesSink, MemorySink, PipelineOrchestrator, RunInput,
};
use std::sync::atomic::{AtomicBool, Ordering};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn repeated_and_malformed_firings_in_one_buffer() {
    init_logger();
    let setup = run_setup();
    let decoder = AcquisitionDecoder::new(setup.registry());
    let mut state = ChannelState::new();

    let raw = event(1, &[(7, 120), (7, 5), (42, 3000)]);
    let decoded = decoder.decode(&raw.buffer, &mut state);

    assert_eq!(decoded.fired.occurrences(7).collect::<Vec<_>>(), vec![120, 5]);
    assert_eq!(decoded.fired.count(42), 0);
    assert_eq!(decoded.fired.len(), 2);
    assert!(decoded.flags.is_malformed());
    assert_eq!(
        decoded.flags.anomalies,
        vec![DecodeAnomaly::MalformedValue {
            index: 42,
            value: 3000,
            bit_width: 10
        }]
    );
}

#[test]
fn malformed_event_is_still_emitted_and_refused() {
    init_logger();
    let setup = run_setup();
    let mut orch = PipelineOrchestrator::new(&setup);

    let record = orch.process_event(&event(1, &[(7, 120), (7, 5), (42, 3000)]));

    assert_eq!(record.decode.malformed_values, 1);
    assert_eq!(record.particles.len(), 1);
    let p = &record.particles[0];
    assert_eq!(p.stack_id, "m1");
    assert!(!p.complete);
    assert_eq!(p.signals.len(), 1);
    assert_eq!(p.signals[0].energy, 125.0);
    // Only the silicon fired: no telescope has both of its signals.
    assert!(!p.identification.id_ok);
    assert_eq!(p.identification.id_quality, quality::NO_SIGNAL);
    assert_eq!(record.status, EventStatus::Unidentified);
    assert!(record.refused);
    assert_eq!(orch.counters().refused, vec![1]);
}

#[test]
fn stack_firing_only_at_pedestal_is_kept_as_no_signal() {
    init_logger();
    let setup = run_setup();
    let mut orch = PipelineOrchestrator::new(&setup);

    // Default pedestal is 0: a zero raw value fires the channel without a signal.
    let record = orch.process_event(&event(4, &[(100, 0), (101, 0)]));

    assert_eq!(record.multiplicity.get("si_csi"), 1);
    assert_eq!(record.particles.len(), 1);
    let p = &record.particles[0];
    assert_eq!(p.stack_id, "m2");
    assert!(p.complete);
    assert!(p.signals.is_empty());
    assert_eq!(p.unusable_layers, vec!["si".to_string(), "csi".to_string()]);
    assert!(!p.identification.id_ok);
    assert_eq!(p.identification.id_quality, quality::NO_SIGNAL);
    assert_eq!(record.status, EventStatus::Unidentified);
    assert!(record.refused);
}

#[test]
fn complete_stack_identified_by_first_telescope() {
    let setup = run_setup();
    let mut orch = PipelineOrchestrator::new(&setup);

    let record = orch.process_event(&event(5, &[(7, 200), (42, 500)]));

    assert_eq!(record.status, EventStatus::Identified);
    assert!(!record.refused);
    let id = &record.particles[0].identification;
    assert!(id.id_ok);
    assert_eq!((id.id_code, id.id_quality, id.z, id.a), (2, quality::GRID_IDENTIFIED, 2, 4));
    assert_eq!(id.telescope.as_deref(), Some("m1_si_csi"));
}

#[test]
fn partial_stack_falls_back_to_fast_slow_and_gamma_is_relabelled() {
    let setup = run_setup();
    let mut orch = PipelineOrchestrator::new(&setup);

    let record = orch.process_event(&event(9, &[(42, 400), (43, 3)]));

    let p = &record.particles[0];
    assert!(!p.complete);
    let id = &p.identification;
    assert!(id.id_ok);
    assert_eq!((id.id_code, id.id_quality, id.z, id.a), (0, 10, 0, 1));
    assert_eq!(id.rejecting_cut.as_deref(), Some("gammas"));
    assert_eq!(orch.counters().gamma_overrides, 1);
}

#[test]
fn run_preserves_order_and_counts_everything() {
    init_logger();
    let setup = run_setup();
    let events = vec![
        event(1, &[(7, 200), (42, 500), (100, 5000), (101, 100)]),
        event(2, &[]),
        event(3, &[(9, 1), (100, 80), (101, 700)]),
    ];
    let mut sink = MemorySink::new();
    let report = PipelineOrchestrator::new(&setup)
        .run(events, &mut sink, None)
        .unwrap();

    let numbers: Vec<u64> = sink.records.iter().map(|r| r.event_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);

    let first = &sink.records[0];
    assert_eq!(first.status, EventStatus::Partial);
    assert_eq!(first.multiplicity.get("si_csi"), 2);
    let m2 = &first.particles[1];
    assert!(!m2.identification.id_ok);
    assert_eq!(m2.identification.id_quality, quality::OUT_OF_RANGE);

    assert_eq!(sink.records[1].status, EventStatus::NoCandidates);
    assert!(sink.records[1].refused);
    assert_eq!(sink.records[2].decode.unknown_index, 1);
    assert_eq!(sink.records[2].status, EventStatus::Identified);

    let c = &report.counters;
    assert_eq!(c.events, 3);
    assert_eq!(c.candidates, 3);
    assert_eq!(c.identified, 2);
    assert_eq!(c.unidentified, 1);
    assert_eq!(c.unknown_index, 1);
    assert_eq!(c.refused, vec![2]);
    assert!(!report.stopped_early);
    assert!(report.timings.stage("identify").is_some());
}

#[test]
fn stop_flag_ends_run_between_events() {
    let setup = run_setup();
    let stop = AtomicBool::new(false);
    let events = (1..=5u64).map(|n| {
        if n == 3 {
            stop.store(true, Ordering::Relaxed);
        }
        event(n, &[(7, 200), (42, 500)])
    });
    let mut sink = MemorySink::new();
    let report = PipelineOrchestrator::new(&setup)
        .run(events, &mut sink, Some(&stop))
        .unwrap();

    assert!(report.stopped_early);
    assert_eq!(report.counters.events, 2);
    assert_eq!(sink.records.len(), 2);
}

#[test]
fn json_lines_sink_writes_one_record_per_line() {
    let setup = run_setup();
    let events = vec![event(1, &[(7, 200), (42, 500)]), event(2, &[(42, 400), (43, 3)])];
    let mut sink = JsonLinesSink::new(Vec::new());
    PipelineOrchestrator::new(&setup)
        .run(events, &mut sink, None)
        .unwrap();
    assert_eq!(sink.written(), 2);

    let text = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["eventNumber"], 1);
    let id = &lines[1]["particles"][0]["identification"];
    assert_eq!(id["IDOK"], true);
    assert_eq!(id["IDcode"], 0);
    assert_eq!(id["Z"], 0);
    assert_eq!(id["A"], 1);
    assert_eq!(id["RejectingCutName"], "gammas");
}

#[test]
fn independent_runs_share_one_setup() {
    let setup = run_setup();
    let runs = vec![
        RunInput {
            run_number: 101,
            events: vec![event(1, &[(7, 200), (42, 500)])],
        },
        RunInput {
            run_number: 102,
            events: vec![event(1, &[]), event(2, &[(100, 80), (101, 700)])],
        },
    ];
    let outcomes = process_runs(&setup, &runs);

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].run_number, 101);
    assert_eq!(outcomes[0].report.counters.identified, 1);
    assert_eq!(outcomes[1].run_number, 102);
    assert_eq!(outcomes[1].records.len(), 2);
    assert_eq!(outcomes[1].report.counters.refused, vec![1]);
}
