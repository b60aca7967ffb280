//! mask_live - live surveillance loop on a synthetic camera
//!
//! This binary:
//! 1. Pulls frames from a `stub://` source
//! 2. Runs the stub detector and drops detections under the threshold
//! 3. Annotates each frame and draws the info panel
//! 4. Appends violations to the in-memory log
//! 5. Writes periodic snapshots, the last frame and the violation CSV

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use mask_witness::{
    ClassCounts, DashboardConfig, DetectorBackend, Frame, FrameAnnotator, OverlayScratch,
    StubBackend, SyntheticConfig, SyntheticSource, ViolationLog,
};

const HEALTH_LOG_INTERVAL: Duration = Duration::from_secs(5);
const RECENT_ROWS: usize = 10;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Synthetic camera url.
    #[arg(long, default_value = "stub://front_camera")]
    url: String,
    #[arg(long, default_value_t = 640)]
    width: u32,
    #[arg(long, default_value_t = 480)]
    height: u32,
    /// Stop after this many frames (0 runs until Ctrl-C).
    #[arg(long, default_value_t = 100)]
    frames: u64,
    /// Target frames per second.
    #[arg(long, default_value_t = 10)]
    fps: u32,
    /// Save every Nth annotated frame (0 disables snapshots).
    #[arg(long, default_value_t = 0)]
    snapshot_every: u64,
    /// Output directory for snapshots, the last frame and the CSV.
    #[arg(long, default_value = "live_out")]
    out: PathBuf,
    /// Dashboard config file (JSON or TOML).
    #[arg(long, env = "MASK_WITNESS_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if args.fps == 0 {
        return Err(anyhow!("fps must be >= 1"));
    }

    let config = DashboardConfig::load_from(args.config.as_deref())?;
    let annotator = FrameAnnotator::from_config(&config)?;
    let filter = config.detection_filter();
    let mut violations = ViolationLog::new(config.violation.clone());

    let mut source = SyntheticSource::new(SyntheticConfig {
        url: args.url.clone(),
        width: args.width,
        height: args.height,
        channel_order: config.channel_order,
        frame_limit: (args.frames > 0).then_some(args.frames),
    })?;
    source.connect()?;

    let mut detector = StubBackend::with_classes(config.classes.clone())?;
    detector.warm_up()?;

    fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create output directory {}", args.out.display()))?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("failed to install Ctrl-C handler")?;
    }

    log::info!(
        "mask_live running: {} at {} fps, threshold {:.2}, detector {}",
        args.url,
        args.fps,
        config.confidence_threshold,
        detector.name()
    );

    let frame_budget = Duration::from_secs_f64(1.0 / args.fps as f64);
    let mut scratch = OverlayScratch::new();
    let mut last_frame: Option<Frame> = None;
    let mut last_tick = Instant::now();
    let mut last_health_log = Instant::now();
    let mut measured_fps = 0.0f64;
    let mut frame_index = 0u64;

    while running.load(Ordering::SeqCst) {
        let started = Instant::now();
        let Some(mut frame) = source.next_frame()? else {
            log::info!("source exhausted");
            break;
        };
        frame_index += 1;

        let detections = filter.apply(detector.detect(&frame)?);
        let counts = ClassCounts::tally(&detections);

        annotator.annotate_in_place(&mut frame, &detections, &mut scratch);
        annotator.draw_info_panel(&mut frame, measured_fps, &counts);
        violations.record_now(&detections);

        if args.snapshot_every > 0 && frame_index % args.snapshot_every == 0 {
            let path = args.out.join(format!("frame_{frame_index:06}.png"));
            frame
                .to_rgb_image()
                .save(&path)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        last_frame = Some(frame);

        if last_health_log.elapsed() >= HEALTH_LOG_INTERVAL {
            log::info!(
                "frames={} fps={:.1} people={} compliant={} violations_logged={}",
                frame_index,
                measured_fps,
                counts.total(),
                counts.get(&config.safe_label),
                violations.len()
            );
            last_health_log = Instant::now();
        }

        if let Some(remaining) = frame_budget.checked_sub(started.elapsed()) {
            std::thread::sleep(remaining);
        }
        let elapsed = last_tick.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            measured_fps = 1.0 / elapsed;
        }
        last_tick = Instant::now();
    }

    if let Some(frame) = &last_frame {
        let path = args.out.join("last_frame.png");
        frame
            .to_rgb_image()
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("last annotated frame written to {}", path.display());
    }

    let csv_path = args.out.join("mask_violations.csv");
    fs::write(&csv_path, violations.to_csv())
        .with_context(|| format!("failed to write {}", csv_path.display()))?;

    for row in violations.tail(RECENT_ROWS) {
        log::info!("{} {} {:.2}", row.timestamp, row.event, row.confidence);
    }
    for (event, count) in violations.event_counts() {
        log::info!("event '{}': {}", event, count);
    }
    log::info!(
        "processed {} frames, {} violations logged to {}",
        source.stats().frames_generated,
        violations.len(),
        csv_path.display()
    );
    Ok(())
}
