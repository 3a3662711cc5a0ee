use aspect_resize::config::{self, CONFIG_FILE_NAME, ResizerConfig};
use aspect_resize::executor::{BatchReport, ProgressObserver, ResizeExecutor, ResizeOptions};
use aspect_resize::imaging::{RustBackend, compute_fit_size};
use aspect_resize::ratio::{Ratio, RatioError, RatioPreset, RatioSelection};
use aspect_resize::{output, scan};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aspect-resize")]
#[command(about = "Crop images and animated GIFs to a fixed aspect ratio")]
#[command(long_about = "\
Crop images and animated GIFs to a fixed aspect ratio

Each image is cropped to the largest rectangle of the target ratio that fits
inside it, never upscaled and never padded. Results are written next to the
source:

  photos/dawn.jpg   →  photos/dawn_resized.jpg
  clips/wave.gif    →  clips/wave_resized.gif   (all frames and timings kept)

Existing outputs are overwritten. A file that cannot be read or is too small
for the ratio is reported and skipped; the rest of the batch still runs.

Ratios: 1:1, 4:3, 16:9 (default), or any WIDTH:HEIGHT of positive integers.

Run 'aspect-resize gen-config' to generate a documented aspect-resize.toml.")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct ResizeArgs {
    /// Image files or directories of images
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Target ratio as WIDTH:HEIGHT, e.g. 16:9
    #[arg(long, conflicts_with_all = ["width", "height"])]
    ratio: Option<String>,

    /// Custom ratio width (use with --height)
    #[arg(long, requires = "height")]
    width: Option<String>,

    /// Custom ratio height (use with --width)
    #[arg(long, requires = "width")]
    height: Option<String>,

    /// Config file [default: ./aspect-resize.toml if present]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Walk directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Print the batch report as JSON instead of progress lines
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Crop images to the target ratio
    Resize(ResizeArgs),
    /// Show the size an image of WIDTHxHEIGHT would be cropped to
    Plan {
        /// Target ratio as WIDTH:HEIGHT
        #[arg(long, default_value = "16:9")]
        ratio: String,
        /// Source size, e.g. 1920x1080
        size: String,
    },
    /// Print a stock aspect-resize.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Resize(args) => run_resize(&args)?,
        Command::Plan { ratio, size } => {
            let ratio = parse_ratio_arg(&ratio)?;
            let (width, height) = parse_size(&size)?;
            let fit = compute_fit_size(width, height, ratio)?;
            println!(
                "{}x{} at {} \u{2192} {}x{}",
                width, height, ratio, fit.width, fit.height
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays the progress display.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_resize(args: &ResizeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args.config.as_deref())?;
    let ratio = resolve_ratio(args, &config)?;
    let batch = scan::collect_batch(&args.paths, args.recursive, &config.resize.suffix);
    let total = batch.len();

    let backend = RustBackend::with_gif_speed(config.gif_speed());
    let executor = ResizeExecutor::new(backend, ResizeOptions::from_config(&config));
    debug!(suffix = %executor.options().suffix, %ratio, total, "starting run");
    let handle = executor.start(batch, ratio)?;

    // First Ctrl-C finishes the current file, then stops the batch
    let cancel = handle.cancel_flag();
    if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
        warn!(error = %e, "could not install Ctrl-C handler");
    }

    if !args.json {
        println!("{}", output::format_started(total, ratio));
    }
    let mut observer = TerminalObserver::new(total, args.json);
    let report = handle
        .drive(&mut observer)
        .ok_or("resize worker stopped before completing the batch")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::report_json(&report))?
        );
    }
    Ok(())
}

/// An explicit `--config` must exist; the implicit one is optional.
fn load_config(explicit: Option<&Path>) -> Result<ResizerConfig, Box<dyn std::error::Error>> {
    let path = match explicit {
        Some(path) if !path.exists() => {
            return Err(format!("config file not found: {}", path.display()).into());
        }
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(CONFIG_FILE_NAME),
    };
    debug!(path = %path.display(), "loading config");
    Ok(config::load_config(&path)?)
}

/// Command-line ratio wins over the config file's.
fn resolve_ratio(args: &ResizeArgs, config: &ResizerConfig) -> Result<Ratio, RatioError> {
    match (&args.ratio, &args.width, &args.height) {
        (_, Some(width), Some(height)) => RatioSelection::Custom {
            width: width.clone(),
            height: height.clone(),
        }
        .resolve(),
        (Some(ratio), _, _) => parse_ratio_arg(ratio),
        _ => Ok(config.resize.ratio),
    }
}

fn parse_ratio_arg(raw: &str) -> Result<Ratio, RatioError> {
    match RatioPreset::from_label(raw) {
        Some(preset) => RatioSelection::Preset(preset).resolve(),
        None => raw.parse(),
    }
}

/// Parse `WIDTHxHEIGHT`.
fn parse_size(raw: &str) -> Result<(u32, u32), String> {
    let invalid = || format!("invalid size {raw:?}: expected WIDTHxHEIGHT, e.g. 1920x1080");
    let (w, h) = raw.split_once(['x', 'X']).ok_or_else(invalid)?;
    let width = w.trim().parse().map_err(|_| invalid())?;
    let height = h.trim().parse().map_err(|_| invalid())?;
    Ok((width, height))
}

/// Prints one line per processed file, or stays quiet for `--json`.
struct TerminalObserver {
    total: usize,
    completed: usize,
    quiet: bool,
}

impl TerminalObserver {
    fn new(total: usize, quiet: bool) -> Self {
        Self {
            total,
            completed: 0,
            quiet,
        }
    }
}

impl ProgressObserver for TerminalObserver {
    fn on_progress(&mut self, percent: u8) {
        debug!(percent, "progress");
    }

    fn on_complete(&mut self, report: &BatchReport) {
        if self.quiet {
            return;
        }
        for line in output::format_summary(report) {
            println!("{}", line);
        }
    }

    fn on_file_error(&mut self, path: &Path, message: &str) {
        self.completed += 1;
        if !self.quiet {
            println!(
                "{}",
                output::format_file_failed(self.completed, self.total, path, message)
            );
        }
    }

    fn on_file_done(&mut self, source: &Path, output: &Path) {
        self.completed += 1;
        if !self.quiet {
            println!(
                "{}",
                output::format_file_done(self.completed, self.total, source, output)
            );
        }
    }
}
