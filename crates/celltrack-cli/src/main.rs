//! celltrack CLI: segment, track and measure migrating cells in time-lapse stacks.

use std::fs::File;
use std::path::{Path, PathBuf};

use celltrack::{
    compute_kinematics, write_rows, AnnotationFrame, CellTracker, FrameRegions, FrameSource,
    ImageSequence, KinematicsConfig, ResultRow, ResultSink, SegmentConfig, SeedPoint, Track,
    TrackKinematics, TrackSummary,
};
use clap::{Args, Parser, Subcommand, ValueEnum};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "celltrack")]
#[command(about = "Track migrating cells in phase-contrast time-lapse stacks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment every frame, follow the seeded cells and compute kinematics.
    Track(CliTrackArgs),

    /// Segment every frame and report candidate regions only.
    Segment(CliSegmentArgs),

    /// Recompute kinematics from previously exported tracks.
    Kinematics(CliKinematicsArgs),
}

#[derive(Debug, Clone, Args)]
struct CliFramesArgs {
    /// A directory of PNG/TIFF frames (name order), or the frame files in order.
    #[arg(long, num_args = 1.., required = true)]
    frames: Vec<PathBuf>,
}

impl CliFramesArgs {
    fn open(&self) -> CliResult<ImageSequence> {
        let sequence = match self.frames.as_slice() {
            [dir] if dir.is_dir() => ImageSequence::from_dir(dir).map_err(|e| -> CliError {
                format!("Failed to list frames in {}: {}", dir.display(), e).into()
            })?,
            files => ImageSequence::from_paths(files.to_vec()),
        };
        tracing::info!("Frame stack: {} frames", sequence.frame_count());
        Ok(sequence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Args)]
struct CliTrackArgs {
    #[command(flatten)]
    frames: CliFramesArgs,

    /// Pipeline configuration (JSON).
    #[arg(long)]
    config: PathBuf,

    /// Seed points as a JSON array of [x, y] pairs.
    #[arg(long)]
    seeds: Option<PathBuf>,

    /// A single seed point "x,y"; may be repeated. Appended after --seeds.
    #[arg(long = "seed", value_parser = parse_seed)]
    seed: Vec<SeedPoint>,

    /// Path to write the results.
    #[arg(long)]
    out: PathBuf,

    /// Output format of --out.
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    format: ExportFormat,

    /// Path to write per-frame track overlays (JSON).
    #[arg(long)]
    annotations: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliSegmentArgs {
    #[command(flatten)]
    frames: CliFramesArgs,

    /// Segmentation configuration (JSON): a full pipeline config, of which
    /// only the segmentation section is read, or a bare segmentation section.
    #[arg(long)]
    config: PathBuf,

    /// Path to write the per-frame regions (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Directory to write the final binary mask of each frame (PNG).
    #[arg(long)]
    mask_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliKinematicsArgs {
    /// Tracks exported by `track --format json`, or a bare JSON array of tracks.
    #[arg(long)]
    tracks: PathBuf,

    /// Time between consecutive frames.
    #[arg(long)]
    frame_interval: f64,

    /// Physical length of one pixel.
    #[arg(long)]
    pixel_size: f64,

    /// Path to write the results.
    #[arg(long)]
    out: PathBuf,

    /// Output format of --out.
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    format: ExportFormat,
}

fn parse_seed(s: &str) -> Result<SeedPoint, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got \"{}\"", s))?;
    let x: f64 = x
        .trim()
        .parse()
        .map_err(|e| format!("invalid seed x \"{}\": {}", x.trim(), e))?;
    let y: f64 = y
        .trim()
        .parse()
        .map_err(|e| format!("invalid seed y \"{}\": {}", y.trim(), e))?;
    Ok(SeedPoint::new(x, y))
}

/// JSON document written by `track` and `kinematics`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct TrackReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    frame_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_size: Option<[u32; 2]>,
    tracks: Vec<Track>,
    #[serde(default)]
    rows: Vec<ResultRow>,
    #[serde(default)]
    summaries: Vec<TrackSummary>,
}

/// Result sink backed by a CSV file; header comes from [`ResultRow`]'s fields.
struct CsvSink(csv::Writer<File>);

impl ResultSink for CsvSink {
    fn write_row(&mut self, row: &ResultRow) -> Result<(), CliError> {
        self.0.serialize(row)?;
        Ok(())
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Track(args) => run_track(&args),
        Commands::Segment(args) => run_segment(&args),
        Commands::Kinematics(args) => run_kinematics(&args),
    }
}

fn write_results(
    out: &Path,
    format: ExportFormat,
    report: &TrackReport,
    kinematics: &[TrackKinematics],
) -> CliResult<()> {
    match format {
        ExportFormat::Json => {
            let json = serde_json::to_string_pretty(report)?;
            std::fs::write(out, &json)?;
        }
        ExportFormat::Csv => {
            let mut sink = CsvSink(csv::Writer::from_path(out)?);
            let n = write_rows(kinematics, &mut sink)?;
            sink.0.flush()?;
            tracing::debug!("{} CSV rows", n);
        }
    }
    tracing::info!("Results written to {}", out.display());
    Ok(())
}

fn log_summaries(summaries: &[TrackSummary]) {
    for s in summaries {
        tracing::info!(
            "track {}: length={:.2} net={:.2} v={:.3} directionality={:.3}",
            s.track_id,
            s.path_length,
            s.net_displacement,
            s.mean_velocity,
            s.directionality,
        );
    }
}

// ── track ──────────────────────────────────────────────────────────────

fn load_seeds(args: &CliTrackArgs) -> CliResult<Vec<SeedPoint>> {
    let mut seeds: Vec<SeedPoint> = match &args.seeds {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| -> CliError {
                format!("Failed to read seeds {}: {}", path.display(), e).into()
            })?;
            serde_json::from_str(&text)?
        }
        None => Vec::new(),
    };
    seeds.extend(args.seed.iter().copied());
    if seeds.is_empty() {
        return Err("no seed points; pass --seeds FILE or --seed x,y".into());
    }
    Ok(seeds)
}

fn run_track(args: &CliTrackArgs) -> CliResult<()> {
    let tracker = CellTracker::from_json_file(&args.config)?;
    let seeds = load_seeds(args)?;
    let stack = args.frames.open()?;
    tracing::info!("Tracking {} seeded cells", seeds.len());

    let mut overlays: Vec<AnnotationFrame> = Vec::new();
    let result = if args.annotations.is_some() {
        tracker.track_with_annotations(&stack, &seeds, &mut overlays)?
    } else {
        tracker.track(&stack, &seeds)?
    };

    let summaries = result.summaries();
    log_summaries(&summaries);

    let report = TrackReport {
        frame_count: Some(result.frame_count),
        image_size: Some(result.image_size),
        rows: result.rows(),
        tracks: result.tracks,
        summaries,
    };
    write_results(&args.out, args.format, &report, &result.kinematics)?;

    if let Some(path) = &args.annotations {
        let json = serde_json::to_string_pretty(&overlays)?;
        std::fs::write(path, &json)?;
        tracing::info!("Annotations written to {}", path.display());
    }
    Ok(())
}

// ── segment ────────────────────────────────────────────────────────────

/// Segmentation settings from either a full pipeline config or a bare
/// `SegmentConfig` document.
fn load_segment_config(path: &Path) -> CliResult<SegmentConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| -> CliError {
        format!("Failed to read config {}: {}", path.display(), e).into()
    })?;
    let mut value: serde_json::Value = serde_json::from_str(&text)?;
    let section = if value.get("segmentation").is_some() {
        value["segmentation"].take()
    } else {
        value
    };
    let config: SegmentConfig = serde_json::from_value(section)?;
    config.validate()?;
    Ok(config)
}

fn run_segment(args: &CliSegmentArgs) -> CliResult<()> {
    let config = load_segment_config(&args.config)?;
    let stack = args.frames.open()?;

    let frames: Vec<FrameRegions> = match &args.mask_dir {
        None => celltrack::detect_stack(&stack, &config)?,
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let mut frames = Vec::with_capacity(stack.frame_count());
            for (regions, mask) in celltrack::segment_stack(&stack, &config)? {
                let path = dir.join(format!("mask_{:04}.png", regions.frame));
                mask.to_luma8().save(&path)?;
                frames.push(regions);
            }
            tracing::info!("Masks written to {}", dir.display());
            frames
        }
    };
    for f in &frames {
        tracing::info!("frame {}: {} regions", f.frame, f.regions.len());
    }

    let json = serde_json::to_string_pretty(&frames)?;
    std::fs::write(&args.out, &json)?;
    tracing::info!("Regions written to {}", args.out.display());
    Ok(())
}

// ── kinematics ─────────────────────────────────────────────────────────

fn load_tracks(path: &Path) -> CliResult<Vec<Track>> {
    let text = std::fs::read_to_string(path).map_err(|e| -> CliError {
        format!("Failed to read tracks {}: {}", path.display(), e).into()
    })?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    let tracks = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        serde_json::from_value::<TrackReport>(value)?.tracks
    };
    Ok(tracks)
}

fn run_kinematics(args: &CliKinematicsArgs) -> CliResult<()> {
    let config = KinematicsConfig {
        frame_interval: args.frame_interval,
        pixel_size: args.pixel_size,
    };
    config.validate()?;
    let tracks = load_tracks(&args.tracks)?;
    tracing::info!("Loaded {} tracks", tracks.len());

    let kinematics = compute_kinematics(&tracks, &config);
    let summaries: Vec<TrackSummary> = kinematics.iter().map(TrackKinematics::summary).collect();
    log_summaries(&summaries);

    let report = TrackReport {
        frame_count: None,
        image_size: None,
        rows: celltrack::result_rows(&kinematics),
        tracks,
        summaries,
    };
    write_results(&args.out, args.format, &report, &kinematics)
}
