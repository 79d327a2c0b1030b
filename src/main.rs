//! # Watermarking Command-Line Tool
//!
//! Thin wrapper around the wavemark library for one-off and batch use.
//!
//! ## Usage
//!
//! ```bash
//! wavemark embed host.png pattern.png marked.png --alpha 0.02
//! wavemark extract marked.png recovered.png --reference host.png
//! wavemark detect pattern.png recovered.png --json
//! wavemark generate pattern.png --cell 8
//! wavemark batch photos/ pattern.png marked/ --threads 4
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use image::GrayImage;
use log::{error, info, LevelFilter};

use wavemark::core::file_ops::FileScanner;
use wavemark::utils::ParallelProcessor;
use wavemark::{Algorithm, DetectorParams, DwtParams, PatternGenerator, WaveMarkError};

#[derive(Parser, Debug)]
#[command(name = "wavemark", version, about = "Frequency-domain image watermarking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Embed a watermark pattern into a host image
    Embed {
        /// Host image to watermark
        host: PathBuf,
        /// Watermark pattern image
        pattern: PathBuf,
        /// Where to write the watermarked image
        output: PathBuf,
        #[command(flatten)]
        dwt: DwtArgs,
    },
    /// Recover a watermark pattern from a watermarked image
    Extract {
        /// Image suspected to carry a watermark
        candidate: PathBuf,
        /// Where to write the recovered pattern
        output: PathBuf,
        /// Original host image (required for the DWT scheme)
        #[arg(short, long)]
        reference: Option<PathBuf>,
        /// Width of the recovered pattern
        #[arg(long, default_value_t = 64)]
        width: u32,
        /// Height of the recovered pattern
        #[arg(long, default_value_t = 64)]
        height: u32,
        #[command(flatten)]
        dwt: DwtArgs,
    },
    /// Score a recovered pattern against the expected watermark
    Detect {
        /// The pattern that was embedded
        target: PathBuf,
        /// The recovered pattern to score
        candidate: PathBuf,
        /// Correlation above this counts as a detection
        #[arg(short, long, default_value_t = 0.7)]
        threshold: f64,
        /// Print the result as JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Generate a watermark pattern image
    ///
    /// Defaults to a checkerboard; `--from-image` and `--noise-seed`
    /// select the other sources, in that order of precedence.
    Generate {
        /// Where to write the pattern
        output: PathBuf,
        /// Derive the pattern from an existing image
        #[arg(long)]
        from_image: Option<PathBuf>,
        /// Seed for a reproducible random noise pattern
        #[arg(long)]
        noise_seed: Option<u64>,
        /// Checkerboard cell size in pixels
        #[arg(long, default_value_t = 8)]
        cell: u32,
        /// Pattern width
        #[arg(long, default_value_t = 64)]
        width: u32,
        /// Pattern height
        #[arg(long, default_value_t = 64)]
        height: u32,
    },
    /// Watermark every image under a directory tree
    Batch {
        /// Directory to scan for images
        input_dir: PathBuf,
        /// Watermark pattern image
        pattern: PathBuf,
        /// Directory mirroring the input tree with watermarked copies
        output_dir: PathBuf,
        /// Worker thread count (defaults to the number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,
        #[command(flatten)]
        dwt: DwtArgs,
    },
}

/// Embedding options shared by the embed, extract and batch subcommands.
#[derive(Args, Debug)]
struct DwtArgs {
    /// Watermarking scheme: dwt or lsb
    #[arg(short, long, default_value = "dwt")]
    algorithm: Algorithm,

    /// Embedding strength
    #[arg(long)]
    alpha: Option<f64>,

    /// Wavelet decomposition depth
    #[arg(long)]
    levels: Option<usize>,

    /// Low-pass filter the watermarked output
    #[arg(long)]
    smooth: bool,

    /// JSON file with full DWT parameters; individual flags override it
    #[arg(short, long)]
    params: Option<PathBuf>,
}

impl DwtArgs {
    /// Merge the parameter file (if given) with the flag overrides.
    fn resolve(&self) -> Result<DwtParams, WaveMarkError> {
        let mut params = match &self.params {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                serde_json::from_str(&text).map_err(|e| {
                    WaveMarkError::InvalidConfig(format!("{}: {}", path.display(), e))
                })?
            }
            None => DwtParams::default(),
        };
        if let Some(alpha) = self.alpha {
            params.alpha = alpha;
        }
        if let Some(levels) = self.levels {
            params.levels = levels;
        }
        if self.smooth {
            params.smooth_output = true;
        }
        params.validate()?;
        Ok(params)
    }
}

/// Initialize the logging system with level and message formatting.
///
/// Logs are printed to stderr with INFO level by default.
/// Format: `[LEVEL] message`
fn init_logger() {
    Builder::new()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter_level(LevelFilter::Info)
        .init();
}

fn load_gray(path: &Path) -> Result<GrayImage, WaveMarkError> {
    let img = image::open(path)
        .map_err(|e| WaveMarkError::ImageProcessing(format!("{}: {}", path.display(), e)))?;
    Ok(img.to_luma8())
}

fn save_gray(img: &GrayImage, path: &Path) -> Result<(), WaveMarkError> {
    img.save(path)
        .map_err(|e| WaveMarkError::ImageProcessing(format!("{}: {}", path.display(), e)))
}

fn run(cli: Cli) -> Result<(), WaveMarkError> {
    match cli.command {
        Command::Embed {
            host,
            pattern,
            output,
            dwt,
        } => {
            let params = dwt.resolve()?;
            let host_img = load_gray(&host)?;
            let pattern_img = load_gray(&pattern)?;
            let marked = wavemark::embed(&host_img, &pattern_img, dwt.algorithm, &params)?;
            save_gray(&marked, &output)?;
            info!(
                "Embedded {} into {} -> {}",
                pattern.display(),
                host.display(),
                output.display()
            );
        }
        Command::Extract {
            candidate,
            output,
            reference,
            width,
            height,
            dwt,
        } => {
            let params = dwt.resolve()?;
            let candidate_img = load_gray(&candidate)?;
            let reference_img = match &reference {
                Some(path) => Some(load_gray(path)?),
                None => None,
            };
            let recovered = wavemark::extract(
                &candidate_img,
                reference_img.as_ref(),
                (width, height),
                dwt.algorithm,
                &params,
            )?;
            save_gray(&recovered, &output)?;
            info!(
                "Extracted watermark from {} -> {}",
                candidate.display(),
                output.display()
            );
        }
        Command::Detect {
            target,
            candidate,
            threshold,
            json,
        } => {
            let target_img = load_gray(&target)?;
            let candidate_img = load_gray(&candidate)?;
            let detection =
                wavemark::detect(&target_img, &candidate_img, &DetectorParams { threshold })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&detection)?);
            } else {
                info!("correlation = {:.4}", detection.score);
                println!(
                    "{}",
                    if detection.detected {
                        "detected"
                    } else {
                        "not detected"
                    }
                );
            }
        }
        Command::Generate {
            output,
            from_image,
            noise_seed,
            cell,
            width,
            height,
        } => {
            let pattern = if let Some(src) = &from_image {
                let img = image::open(src).map_err(|e| {
                    WaveMarkError::ImageProcessing(format!("{}: {}", src.display(), e))
                })?;
                PatternGenerator::from_image(&img, width, height)?
            } else if let Some(seed) = noise_seed {
                PatternGenerator::noise(width, height, seed)?
            } else {
                PatternGenerator::checkerboard(width, height, cell)?
            };
            save_gray(&pattern, &output)?;
            info!("Generated {}x{} pattern -> {}", width, height, output.display());
        }
        Command::Batch {
            input_dir,
            pattern,
            output_dir,
            threads,
            dwt,
        } => {
            let params = dwt.resolve()?;
            let pattern_img = load_gray(&pattern)?;
            let scanner = FileScanner::new();
            let images = scanner.scan(&input_dir)?;
            if images.is_empty() {
                info!("No images found under {}", input_dir.display());
                return Ok(());
            }
            let processor = threads
                .map(ParallelProcessor::with_threads)
                .unwrap_or_default();
            let done = processor.process_batch(
                &images,
                &pattern_img,
                dwt.algorithm,
                &params,
                &output_dir,
            )?;
            info!("Watermarked {} image(s) -> {}", done, output_dir.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
