use anyhow::{bail, Context, Result};
use clap::Parser;
use plank_coach::analysis::scoring::PoseScorer;
use plank_coach::app::cli::{Cli, Commands, ConfigAction};
use plank_coach::app::config::Config;
use plank_coach::coaching::CoachingRunner;
use plank_coach::feedback::TracingSpeech;
use plank_coach::pose::frame_buffer::FrameRingBuffer;
use plank_coach::pose::LandmarkFrame;
use plank_coach::session::store::InMemorySessionStore;
use plank_coach::telemetry::NullChannel;
use plank_coach::time::TimestampMs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("plank_coach=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("plank_coach=info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Replay { input, output } => run_replay(&config, &input, output.as_deref()),
        Commands::Analyze { input } => run_analyze(&config, &input),
        Commands::Init { force } => run_init(force),
        Commands::Config { action } => run_config(&config, action),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Config::load_or_default().context("Failed to load configuration"),
    }
}

fn run_replay(config: &Config, input: &Path, output: Option<&Path>) -> Result<()> {
    let contents = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let frames: Vec<LandmarkFrame> =
        serde_json::from_str(&contents).context("Invalid landmark stream")?;
    if frames.is_empty() {
        bail!("Landmark stream is empty");
    }

    info!(frames = frames.len(), "replaying landmark stream");
    let mut runner = CoachingRunner::new(
        config.clone(),
        TracingSpeech::default(),
        NullChannel,
        InMemorySessionStore::new(),
    );

    // Frames flow through the same lock-free intake a live pose engine
    // would use: a feeder thread stands in for the engine callback.
    let buffer = FrameRingBuffer::new();
    let (mut producer, mut consumer) = buffer.split();
    let feeder = std::thread::spawn(move || {
        for frame in frames {
            while !producer.has_capacity() {
                std::thread::yield_now();
            }
            producer.push(frame);
        }
    });

    let mut last_ts = TimestampMs::from_millis(0);
    loop {
        match consumer.pop() {
            Some(frame) => {
                last_ts = frame.timestamp_ms;
                runner.on_frame(&frame, frame.timestamp_ms);
            }
            None if feeder.is_finished() => break,
            None => std::thread::yield_now(),
        }
    }
    feeder
        .join()
        .map_err(|_| anyhow::anyhow!("frame feeder thread panicked"))?;

    // Let any pending deadline fire, then close out the session
    runner.poll(last_ts);
    if runner.phase().is_in_progress() {
        runner.stop(last_ts);
    }

    let report = match runner.last_report() {
        Some(report) => report.clone(),
        None => bail!("No session was identified in the stream"),
    };

    println!("Session report");
    println!("  Variant:         {}", report.variant);
    println!("  Duration:        {}s", report.duration_secs);
    println!("  Body alignment:  {}", report.body_alignment_score);
    println!("  Knee position:   {}", report.knee_position_score);
    println!("  Shoulder stack:  {}", report.shoulder_stack_score);
    println!("  Overall:         {}", report.overall_score);
    println!("  Samples:         {}", report.sample_count);

    if let Some(path) = output {
        fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn run_analyze(config: &Config, input: &Path) -> Result<()> {
    let contents = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let frame: LandmarkFrame = serde_json::from_str(&contents).context("Invalid frame file")?;

    let result = PoseScorer::new(config).analyze(&frame);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_init(force: bool) -> Result<()> {
    let path = config_path()?;
    if path.exists() && !force {
        bail!(
            "Configuration already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    Config::default().save(&path)?;
    println!("Configuration written to {}", path.display());
    Ok(())
}

fn run_config(config: &Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
        ConfigAction::Reset { force } => {
            let path = config_path()?;
            if path.exists() && !force {
                bail!("Refusing to reset without --force");
            }
            Config::default().save(&path)?;
            println!("Configuration reset at {}", path.display());
            Ok(())
        }
    }
}

fn config_path() -> Result<PathBuf> {
    Config::default_path().context("Could not determine configuration path")
}
