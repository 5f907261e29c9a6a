use particle_id::acquisition::RawEvent;
use particle_id::config::load_config;
use particle_id::io::{create_output_file, read_json_file, write_json_file};
use particle_id::pipeline::{JsonLinesSink, MemorySink, PipelineOrchestrator};
use particle_id::RunReport;
use std::env;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

struct Args {
    config: PathBuf,
    events: PathBuf,
    records_out: Option<PathBuf>,
    report_out: Option<PathBuf>,
}

fn usage() -> String {
    "Usage: reduce_demo <config.json> <events.json> [--records-out PATH] [--report-out PATH]"
        .to_string()
}

fn parse_args() -> Result<Args, String> {
    let mut args = env::args().skip(1);
    let config = args.next().map(PathBuf::from).ok_or_else(usage)?;
    let events = args.next().map(PathBuf::from).ok_or_else(usage)?;
    let mut parsed = Args {
        config,
        events,
        records_out: None,
        report_out: None,
    };
    while let Some(flag) = args.next() {
        let value = args
            .next()
            .map(PathBuf::from)
            .ok_or_else(|| format!("Missing value for {flag}\n{}", usage()))?;
        match flag.as_str() {
            "--records-out" => parsed.records_out = Some(value),
            "--report-out" => parsed.report_out = Some(value),
            other => return Err(format!("Unknown option {other}\n{}", usage())),
        }
    }
    Ok(parsed)
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let setup = load_config(&args.config)
        .and_then(|cfg| cfg.build())
        .map_err(|e| e.to_string())?;
    let events: Vec<RawEvent> = read_json_file(&args.events)?;
    println!("Loaded {} events from {}", events.len(), args.events.display());

    let orchestrator = PipelineOrchestrator::new(&setup);
    let report: RunReport = match &args.records_out {
        Some(path) => {
            let file = create_output_file(path)?;
            let mut sink = JsonLinesSink::new(BufWriter::new(file));
            let report = orchestrator
                .run(events, &mut sink, None)
                .map_err(|e| e.to_string())?;
            println!("Wrote {} records to {}", sink.written(), path.display());
            report
        }
        None => {
            let mut sink = MemorySink::new();
            let report = orchestrator
                .run(events, &mut sink, None)
                .map_err(|e| e.to_string())?;
            print_records(&sink);
            report
        }
    };

    print!("\n{}", report.summary());
    if let Some(path) = &args.report_out {
        write_json_file(Path::new(path), &report)?;
        println!("JSON report written to {}", path.display());
    }
    Ok(())
}

fn print_records(sink: &MemorySink) {
    for record in &sink.records {
        println!(
            "event {:>8} {:?}{}",
            record.event_number,
            record.status,
            if record.refused { " (refused)" } else { "" }
        );
        for p in &record.particles {
            let id = &p.identification;
            println!(
                "    {:<12} IDOK={} IDcode={} IDquality={} Z={} A={}{}",
                p.stack_id,
                id.id_ok,
                id.id_code,
                id.id_quality,
                id.z,
                id.a,
                id.rejecting_cut
                    .as_deref()
                    .map(|c| format!(" cut={c}"))
                    .unwrap_or_default()
            );
        }
    }
}
