use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use railgaps::{FrameScanController, ImageSequence, RoiBand, ScanConfig};

#[derive(Parser)]
#[command(name = "railgaps")]
#[command(about = "Detect rail joint gaps in frames captured along a rail line")]
struct Cli {
    /// Directory holding the frames as image files (read in name order)
    #[arg(value_name = "FRAMES_DIR")]
    frames_dir: PathBuf,

    /// JSON file with scan settings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Save stage images of every detection to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long, value_name = "N")]
    max_frames: Option<usize>,

    /// Column band to analyze, overrides the config file
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    roi: Option<Vec<u32>>,

    /// Calibration factor used to print gaps in millimetres
    #[arg(long, value_name = "MM")]
    mm_per_pixel: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "railgaps=debug" } else { "railgaps=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };
    if let Some(roi) = &args.roi {
        config = config.with_roi(RoiBand::new(roi[0], roi[1]));
    }
    if args.max_frames.is_some() {
        config = config.with_max_frames(args.max_frames);
    }

    let mut controller = FrameScanController::new(config).context("invalid scan settings")?;
    if let Some(debug_dir) = args.debug_out {
        controller = controller.with_debug(debug_dir)?;
    }

    let mut source = ImageSequence::open(&args.frames_dir)
        .with_context(|| format!("cannot read frames from {}", args.frames_dir.display()))?;

    let mut count = 0usize;
    let summary = controller.run(&mut source, |result| {
        count += 1;
        match args.mm_per_pixel {
            Some(scale) => println!(
                "{}; frame: {}; gap: {} px ({:.1} mm)",
                count,
                result.frame_index,
                result.gap_width,
                result.gap_mm(scale)
            ),
            None => println!("{}; frame: {}; gap: {} px", count, result.frame_index, result.gap_width),
        }
    })?;

    println!("\n=== Rail Gap Scan Results ===");
    println!("Frames read:     {}", summary.frames_read);
    println!("Warmup skipped:  {}", summary.frames_warmup);
    println!("Analyzed:        {}", summary.frames_analyzed);
    println!("Rejected:        {}", summary.frames_rejected);
    println!("Corrupt:         {}", summary.frames_corrupt);
    println!("Gaps detected:   {}", summary.detections.len());
    if summary.detections.is_empty() {
        println!("No gaps detected.");
    }

    Ok(())
}
