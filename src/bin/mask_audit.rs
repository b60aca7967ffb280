//! mask_audit - batch audit: annotate images from their detection sidecars
//!
//! For every image the tool reads `<stem>.json` (next to the image, or in
//! `--detections`), drops detections under the configured confidence
//! threshold, draws the overlay and writes the result to `--out`.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use mask_witness::ui::Ui;
use mask_witness::{
    ClassCounts, DashboardConfig, DetectionSidecar, FileSource, FrameAnnotator, ViolationLog,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Images, or directories of images, to audit.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Directory holding `<image stem>.json` sidecars (defaults to each image's directory).
    #[arg(long)]
    detections: Option<PathBuf>,
    /// Output directory for annotated images.
    #[arg(long, default_value = "audit_out")]
    out: PathBuf,
    /// Dashboard config file (JSON or TOML).
    #[arg(long, env = "MASK_WITNESS_CONFIG")]
    config: Option<PathBuf>,
    /// Draw the summary bar on each image.
    #[arg(long)]
    info_panel: bool,
    /// Write the violation table to this CSV file.
    #[arg(long)]
    violations_csv: Option<PathBuf>,
    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let ui = Ui::from_args(Some(&args.ui), std::io::stderr().is_terminal());

    let config = DashboardConfig::load_from(args.config.as_deref())?;
    let annotator = FrameAnnotator::from_config(&config)?;
    let filter = config.detection_filter();
    let mut violations = ViolationLog::new(config.violation.clone());

    let mut source = {
        let _stage = ui.stage("collect images");
        FileSource::from_inputs(&args.inputs, config.channel_order)?
    };
    if source.is_empty() {
        return Err(anyhow!("no images found in the given inputs"));
    }
    fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create output directory {}", args.out.display()))?;

    let mut progress = ui.progress("annotate", source.len() as u64);
    let mut total_detections = 0usize;

    while let Some((path, frame)) = source.next_frame()? {
        let sidecar = sidecar_path(&path, args.detections.as_deref());
        let detections = filter.apply(load_sidecar(&sidecar)?.detections);
        total_detections += detections.len();

        let mut annotated = annotator.annotate(&frame, &detections);
        if args.info_panel {
            let counts = ClassCounts::tally(&detections);
            annotator.draw_info_panel(&mut annotated, 0.0, &counts);
        }
        violations.record_now(&detections);

        let name = path
            .file_name()
            .ok_or_else(|| anyhow!("image path has no file name: {}", path.display()))?;
        let out_path = args.out.join(name);
        annotated
            .to_rgb_image()
            .save(&out_path)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        log::debug!(
            "{}: {} detections -> {}",
            path.display(),
            detections.len(),
            out_path.display()
        );
        progress.advance(&name.to_string_lossy());
    }
    drop(progress);

    if let Some(csv_path) = &args.violations_csv {
        fs::write(csv_path, violations.to_csv())
            .with_context(|| format!("failed to write {}", csv_path.display()))?;
        log::info!("violation table written to {}", csv_path.display());
    }

    let stats = source.stats();
    log::info!(
        "audited {} images: {} detections, {} violations",
        stats.frames_read,
        total_detections,
        violations.len()
    );
    Ok(())
}

/// `<stem>.json` in `detections_dir`, or next to the image.
fn sidecar_path(image: &Path, detections_dir: Option<&Path>) -> PathBuf {
    let file_name = image.with_extension("json");
    match (detections_dir, file_name.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => file_name,
    }
}

/// A missing sidecar means no detections for that image.
fn load_sidecar(path: &Path) -> Result<DetectionSidecar> {
    if !path.exists() {
        log::warn!("no detection sidecar at {}", path.display());
        return Ok(DetectionSidecar::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read sidecar {}", path.display()))?;
    DetectionSidecar::from_json(&raw).with_context(|| format!("invalid sidecar {}", path.display()))
}
