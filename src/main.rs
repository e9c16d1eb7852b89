use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use colortrack::{
    Annotator, CaptureFailurePolicy, DebugDirSink, FrameSink, ImageSequence, NullSink, Pipeline,
    TrackerConfig,
};
use colortrack::pipeline::DEFAULT_MAX_CONSECUTIVE_FAILURES;

#[derive(Parser)]
#[command(name = "colortrack")]
#[command(about = "Track the topmost object of a given color across a stream of frames")]
struct Cli {
    /// Frame image files or directories of frames, processed in order
    #[arg(value_name = "FRAMES", required = true)]
    inputs: Vec<PathBuf>,

    /// JSON tracker configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON band file, re-read whenever it changes
    #[arg(long, value_name = "FILE")]
    band_file: Option<PathBuf>,

    #[arg(long)]
    low_h: Option<u8>,
    #[arg(long)]
    high_h: Option<u8>,
    #[arg(long)]
    low_s: Option<u8>,
    #[arg(long)]
    high_s: Option<u8>,
    #[arg(long)]
    low_v: Option<u8>,
    #[arg(long)]
    high_v: Option<u8>,

    /// File receiving x, y and candidate count of each selection
    #[arg(short, long, value_name = "FILE", default_value = "data.txt")]
    output: PathBuf,

    /// Save masks and annotated frames to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// TrueType/OpenType font for on-frame text. Without it the coordinate
    /// labels, direction hint and noise warning are not drawn; markers are
    /// always drawn
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Stop after this many capture attempts (skipped frames included)
    #[arg(long)]
    max_frames: Option<u64>,

    /// Restart from the first frame after the last one
    #[arg(long = "loop")]
    loop_frames: bool,

    /// Log unreadable frames and continue instead of exiting
    #[arg(long)]
    skip_capture_failures: bool,

    /// With --skip-capture-failures, give up after this many failures in a row
    #[arg(long, default_value_t = DEFAULT_MAX_CONSECUTIVE_FAILURES)]
    max_consecutive_failures: u32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };
    apply_band_overrides(&mut config, &args);
    info!(band = ?config.band, "starting tracker");

    let mut source = ImageSequence::from_inputs(&args.inputs, &config.capture)?
        .looping(args.loop_frames);

    let mut annotator = Annotator::new(config.guidance.clone());
    if let Some(font) = &args.font {
        annotator = annotator.with_font_file(font)?;
    }

    let policy = if args.skip_capture_failures {
        CaptureFailurePolicy::Skip
    } else {
        CaptureFailurePolicy::FailFast
    };

    let mut pipeline = Pipeline::new(&config)
        .with_annotator(annotator)
        .with_output(args.output.clone())
        .with_failure_policy(policy)
        .with_max_frames(args.max_frames)
        .with_max_consecutive_failures(args.max_consecutive_failures);
    if let Some(band_file) = &args.band_file {
        pipeline = pipeline.with_band_file(band_file.clone());
    }

    let mut sink: Box<dyn FrameSink> = match args.debug_out {
        Some(dir) => Box::new(DebugDirSink::new(dir)?),
        None => Box::new(NullSink),
    };

    let summary = pipeline.run(&mut source, sink.as_mut())?;

    println!("\n=== Tracking Results ===");
    println!("Frames processed: {}", summary.frames);
    println!("Frames with a selection: {}", summary.reported);
    println!("Noisy frames: {}", summary.noisy);
    println!("Frames without candidates: {}", summary.empty);
    if summary.capture_failures > 0 {
        println!("Skipped frames: {}", summary.capture_failures);
    }
    match summary.last_report {
        Some(report) => println!(
            "Last selection: ({}, {}) of {} candidate(s), written to {}",
            report.x,
            report.y,
            report.count,
            args.output.display()
        ),
        None => println!("No object detected."),
    }

    Ok(())
}

fn apply_band_overrides(config: &mut TrackerConfig, args: &Cli) {
    let band = &mut config.band;
    if let Some(v) = args.low_h {
        band.low_h = v;
    }
    if let Some(v) = args.high_h {
        band.high_h = v;
    }
    if let Some(v) = args.low_s {
        band.low_s = v;
    }
    if let Some(v) = args.high_s {
        band.high_s = v;
    }
    if let Some(v) = args.low_v {
        band.low_v = v;
    }
    if let Some(v) = args.high_v {
        band.high_v = v;
    }
}
