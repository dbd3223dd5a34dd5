use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use crossbeam_channel::bounded;
use gesture_cursor::{
    GestureEvent, GesturePipeline, PipelineConfig,
    pipeline::{self, FrameDelivery, SourceStream, SubprocessSource},
};
use serde::Serialize;

#[derive(Serialize)]
struct EventLine<'a> {
    timestamp_ms: u64,
    #[serde(flatten)]
    event: &'a GestureEvent,
}

struct Args {
    config: Option<String>,
    input: String,
    detector: Option<(String, Vec<String>)>,
    delivery: FrameDelivery,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        config: None,
        input: "-".to_string(),
        detector: None,
        delivery: FrameDelivery::InOrder,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => parsed.config = Some(args.next().context("--config needs a path")?),
            "--input" => parsed.input = args.next().context("--input needs a path or -")?,
            "--latest-only" => parsed.delivery = FrameDelivery::LatestOnly,
            "--detector" => {
                let program = args.next().context("--detector needs a command")?;
                // everything after the command belongs to it
                parsed.detector = Some((program, args.by_ref().collect()));
            }
            "-h" | "--help" => {
                println!(
                    "usage: gesture-cursor [--config FILE] [--input FILE|-] [--latest-only] \
                     [--detector CMD ARGS...]"
                );
                std::process::exit(0);
            }
            other => bail!("unknown argument {other}"),
        }
    }

    Ok(parsed)
}

fn main() -> Result<()> {
    env_logger::init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => {
            let config = PipelineConfig::from_file(path)?;
            log::info!("loaded config from {path}");
            config
        }
        None => PipelineConfig::default(),
    };
    let gestures = GesturePipeline::new(&config)?;

    let frame_queue = match args.delivery {
        FrameDelivery::InOrder => 64,
        FrameDelivery::LatestOnly => 1,
    };
    let (frame_tx, frame_rx) = bounded(frame_queue);
    let (output_tx, output_rx) = bounded(64);

    let source: SourceStream = match args.detector {
        Some((program, detector_args)) => {
            let detector = SubprocessSource::spawn(&program, &detector_args)?;
            pipeline::start_source(detector, frame_tx, args.delivery)
        }
        None => {
            let input = pipeline::open_input(&args.input)?;
            pipeline::start_source(input, frame_tx, args.delivery)
        }
    };
    let worker = pipeline::start_pipeline(gestures, frame_rx, output_tx, args.delivery);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for output in output_rx {
        for event in &output.events {
            let line = EventLine {
                timestamp_ms: output.timestamp_ms,
                event,
            };
            serde_json::to_writer(&mut out, &line).context("failed to encode event")?;
            writeln!(out).context("failed to write event")?;
        }
    }
    out.flush()?;

    if worker.join().is_err() {
        log::error!("gesture pipeline thread panicked");
    }
    source.join();

    Ok(())
}
