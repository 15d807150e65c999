//! kbm-track CLI: calibrate against captured frames, inspect template regions.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use kbm_track::{
    CalibrationReport, FrameSource, ImageFileSource, KbmTrackConfig, KbmTracker, Recalibration,
};
use log::LevelFilter;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "kbm-track")]
#[command(about = "Calibrate a webcam view of a keyboard/mouse-pad template and map its key regions")]
#[command(version)]
struct Cli {
    /// Log verbosity (off, error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calibrate from frame images taken as one batch.
    Calibrate {
        /// JSON config (see `init-config`).
        #[arg(long)]
        config: PathBuf,

        /// Frame images.
        #[arg(required = true)]
        frames: Vec<PathBuf>,

        /// Write the rectified last frame here (overrides the config).
        #[arg(long)]
        rectified: Option<PathBuf>,

        /// Draw the region grid on the rectified frame.
        #[arg(long)]
        overlay: bool,

        /// Write the JSON report here (overrides the config); stdout otherwise.
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Extract the template's region grid.
    Regions {
        #[arg(long)]
        config: PathBuf,

        /// Write the template with the grid drawn on it.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Write a config with default values.
    InitConfig { path: PathBuf },
}

fn init_logging(level: LevelFilter) {
    #[cfg(feature = "tracing")]
    {
        kbm_track::init_tracing(false, level);
        let _ = tracing_log::LogTracer::init();
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = kbm_track::init_with_level(level);
    }
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Commands::Calibrate {
            config,
            frames,
            rectified,
            overlay,
            report,
        } => run_calibrate(&config, &frames, rectified, overlay, report),
        Commands::Regions { config, output } => run_regions(&config, output),
        Commands::InitConfig { path } => run_init_config(&path),
    }
}

fn run_calibrate(
    config_path: &Path,
    frame_paths: &[PathBuf],
    rectified: Option<PathBuf>,
    overlay: bool,
    report_path: Option<PathBuf>,
) -> CliResult<()> {
    let cfg = KbmTrackConfig::load_json(config_path)?;
    let mut tracker = KbmTracker::from_config(&cfg)?;

    let mut source = ImageFileSource::new(frame_paths.iter().cloned());
    let frames: Vec<_> = std::iter::from_fn(|| source.next_frame()).collect();
    log::info!("{} of {} frames readable", frames.len(), frame_paths.len());

    let template = tracker.template();
    let mut report = CalibrationReport::new(
        config_path,
        frame_paths,
        (template.width(), template.height()),
        tracker.grid(),
    );

    match tracker.recalibrate(&frames) {
        Recalibration::Updated => {
            if let Some(calibration) = tracker.state().calibration() {
                report.set_calibration(calibration);
            }
        }
        Recalibration::KeptPrevious { reason } => report.set_error(&reason),
    }

    let rectified_path = rectified.or_else(|| cfg.rectified_path.as_ref().map(PathBuf::from));
    if let (Some(path), Some(last)) = (rectified_path, frames.last()) {
        let view = if overlay {
            tracker.project_with_overlay(last)
        } else {
            tracker.project(last)
        };
        if let Some(view) = view {
            view.save(&path)?;
            log::info!("rectified frame written to {}", path.display());
            report.rectified_path = Some(path.to_string_lossy().into_owned());
        }
    }

    match report_path.or_else(|| cfg.report_path.as_ref().map(PathBuf::from)) {
        Some(path) => {
            report.write_json(&path)?;
            log::info!("report written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn run_regions(config_path: &Path, output: Option<PathBuf>) -> CliResult<()> {
    let cfg = KbmTrackConfig::load_json(config_path)?;
    let tracker = KbmTracker::from_config(&cfg)?;

    for (row, boxes) in tracker.grid().rows().iter().enumerate() {
        let label = kbm_track::RegionId::new(row, 0)
            .label()
            .and_then(|l| l.chars().next())
            .unwrap_or('?');
        println!("row {label}: {} regions", boxes.len());
    }
    println!("total: {} regions", tracker.grid().len());

    if let Some(path) = output {
        let annotated = tracker
            .projector()
            .draw_region_overlay(tracker.template().image());
        annotated.save(&path)?;
        log::info!("region overlay written to {}", path.display());
    }
    Ok(())
}

fn run_init_config(path: &Path) -> CliResult<()> {
    KbmTrackConfig::default().write_json(path)?;
    println!("wrote default config to {}", path.display());
    Ok(())
}
