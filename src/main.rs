//! Command-line front end for alpha-refine
//!
//! Refines the alpha channel of images produced by a background-removal
//! model and writes the result as PNG.
//!
//! # Usage
//!
//! ```bash
//! alpha-refine input.png                      # writes input_processed.png
//! alpha-refine input.png out.png --preset clean
//! alpha-refine shots/ refined/ --batch -t 20
//! alpha-refine input.png --stats
//! ```
//!
//! Options are resolved in the order preset, config file, explicit flags;
//! later sources override earlier ones.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use alpha_refine::{alpha_distribution, Pipeline, PipelineConfig, Preset};
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use tracing::{error, info, warn};

/// Extensions accepted as input, compared case-insensitively
const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "webp", "tiff", "tif"];

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "alpha-refine", version)]
#[command(about = "Solidify and clean up the alpha channel of background-removal output")]
struct Args {
    /// Input image, or input directory with --batch
    input: PathBuf,

    /// Output PNG, or output directory with --batch
    output: Option<PathBuf>,

    /// Alpha values below this are discarded as noise
    #[arg(short = 't', long)]
    noise_threshold: Option<u8>,

    /// Regions smaller than this fraction of the image are fragments
    #[arg(long)]
    min_region_fraction: Option<f64>,

    /// Remove ambiguous pixels instead of solidifying them
    #[arg(long)]
    no_preserve: bool,

    /// Boundary smoothing radius, 0 disables smoothing
    #[arg(long)]
    smoothing_radius: Option<u32>,

    /// Luminosity above which halo pixels next to the background are removed
    #[arg(long)]
    white_threshold: Option<u8>,

    /// Always keep the largest region
    #[arg(long)]
    keep_largest: bool,

    /// Named starting configuration
    #[arg(long, value_enum)]
    preset: Option<PresetArg>,

    /// TOML file with pipeline options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Treat INPUT and OUTPUT as directories
    #[arg(long)]
    batch: bool,

    /// Print the alpha distribution of INPUT and exit
    #[arg(long)]
    stats: bool,

    /// Log run statistics
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PresetArg {
    Preserve,
    Clean,
    Strict,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Preserve => Self::Preserve,
            PresetArg::Clean => Self::Clean,
            PresetArg::Strict => Self::Strict,
        }
    }
}

/// Options read from `--config`; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    preset: Option<Preset>,
    noise_threshold: Option<u8>,
    min_region_fraction: Option<f64>,
    preserve_elements: Option<bool>,
    smoothing_radius: Option<u32>,
    white_luminosity_threshold: Option<u8>,
    keep_largest_region: Option<bool>,
    verbose: Option<bool>,
}

impl ConfigFile {
    fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(value) = self.noise_threshold {
            config.noise_threshold = value;
        }
        if let Some(value) = self.min_region_fraction {
            config.min_region_fraction = value;
        }
        if let Some(value) = self.preserve_elements {
            config.preserve_elements = value;
        }
        if let Some(value) = self.smoothing_radius {
            config.smoothing_radius = value;
        }
        if let Some(value) = self.white_luminosity_threshold {
            config.white_luminosity_threshold = value;
        }
        if let Some(value) = self.keep_largest_region {
            config.keep_largest_region = value;
        }
        if let Some(value) = self.verbose {
            config.verbose = value;
        }
        config
    }
}

impl Args {
    fn resolve_config(&self) -> Result<PipelineConfig> {
        let file = match &self.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        let preset = self
            .preset
            .map(Preset::from)
            .or(file.preset)
            .unwrap_or_default();
        let mut config = file.apply(PipelineConfig::from_preset(preset));

        if let Some(value) = self.noise_threshold {
            config.noise_threshold = value;
        }
        if let Some(value) = self.min_region_fraction {
            config.min_region_fraction = value;
        }
        if self.no_preserve {
            config.preserve_elements = false;
        }
        if let Some(value) = self.smoothing_radius {
            config.smoothing_radius = value;
        }
        if let Some(value) = self.white_threshold {
            config.white_luminosity_threshold = value;
        }
        if self.keep_largest {
            config.keep_largest_region = true;
        }
        if self.verbose {
            config.verbose = true;
        }

        Ok(config)
    }
}

/// Installs a `tracing` subscriber filtered by `RUST_LOG`, falling back to `default_level`
fn init_tracing(default_level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// `dir/name.ext` -> `dir/name<suffix>`
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}{suffix}"))
}

fn process_file(pipeline: &Pipeline, input: &Path, output: &Path) -> Result<()> {
    if !is_supported(input) {
        bail!("unsupported input format: {}", input.display());
    }

    let image =
        image::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let refinement = pipeline
        .run_dynamic(&image)
        .with_context(|| format!("failed to refine {}", input.display()))?;

    refinement
        .image
        .save_with_format(output, image::ImageFormat::Png)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        input = %input.display(),
        output = %output.display(),
        "{}",
        refinement.statistics
    );
    Ok(())
}

fn process_directory(pipeline: &Pipeline, input: &Path, output: &Path) -> Result<usize> {
    fs::create_dir_all(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    let mut files: Vec<PathBuf> = fs::read_dir(input)
        .with_context(|| format!("failed to read directory {}", input.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && is_supported(path))
        .collect();
    files.sort();

    if files.is_empty() {
        bail!("no supported images found in {}", input.display());
    }

    let mut succeeded = 0;
    for file in &files {
        let Some(stem) = file.file_stem() else {
            continue;
        };
        let target = output.join(format!("{}.png", stem.to_string_lossy()));
        match process_file(pipeline, file, &target) {
            Ok(()) => succeeded += 1,
            Err(err) => error!("{err:#}"),
        }
    }

    let failed = files.len() - succeeded;
    if failed > 0 {
        warn!(succeeded, failed, "batch finished with failures");
    } else {
        info!(succeeded, "batch finished");
    }
    Ok(succeeded)
}

fn print_stats(input: &Path) -> Result<()> {
    let image =
        image::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    if !image.color().has_alpha() {
        bail!("{} has no alpha channel", input.display());
    }

    let distribution = alpha_distribution(&image.to_rgba8());
    let total = distribution.total().max(1) as f64;

    println!("{} ({}x{})", input.display(), image.width(), image.height());
    for (label, count) in distribution.rows() {
        println!(
            "  alpha {label:>7}: {count:>10} ({:5.1}%)",
            count as f64 / total * 100.0
        );
    }
    Ok(())
}

fn run(args: &Args) -> Result<bool> {
    if args.stats {
        print_stats(&args.input)?;
        return Ok(true);
    }

    let pipeline = Pipeline::new(args.resolve_config()?).context("invalid configuration")?;

    if args.batch {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| with_suffix(&args.input, "_processed"));
        let succeeded = process_directory(&pipeline, &args.input, &output)?;
        return Ok(succeeded > 0);
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| with_suffix(&args.input, "_processed.png"));
    process_file(&pipeline, &args.input, &output)?;
    Ok(true)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.quiet {
        "warn"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    init_tracing(level);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
