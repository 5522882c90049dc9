//! CLI binary for mediaforge.
//!
//! A thin shim over the library crate for previewing what the app would
//! do: resolve a job descriptor from files and flags, project a GIF export
//! size, or show the merged configuration. It never invokes a converter —
//! the backend lives in the desktop shell.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use mediaforge::{
    estimate, AppConfig, ArchiveFormat, ConfigStore, DroppedFile, GifOptions, ImageFormat,
    JobBuilder, JsonConfigFile, PageMode, ToolKind, ToolOptions,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "mediaforge",
    version,
    about = "Preview MediaForge conversion jobs without running them"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a job descriptor and print it as JSON.
    Plan(PlanArgs),
    /// Project the output size of a GIF export.
    Estimate(EstimateArgs),
    /// Inspect the merged configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct PlanArgs {
    #[command(subcommand)]
    job: PlanJob,
}

#[derive(Subcommand)]
enum PlanJob {
    /// PDF pages → raster images.
    PdfToImage {
        /// Input PDF files, in conversion order.
        files: Vec<PathBuf>,
        /// Output format: jpg, png, or webp.
        #[arg(long, default_value = "png")]
        format: String,
        /// Rasterization DPI (snapped to 72/150/300/600).
        #[arg(long)]
        dpi: Option<u32>,
        /// Page selector, e.g. "1-3, 5". Omit for all pages.
        #[arg(long)]
        pages: Option<String>,
    },
    /// PDF pages → SVG.
    PdfToSvg {
        files: Vec<PathBuf>,
        #[arg(long)]
        pages: Option<String>,
    },
    /// Merge PDFs into one document.
    PdfMerge {
        files: Vec<PathBuf>,
        #[arg(long, default_value = "merged")]
        output_name: String,
    },
    /// Split one PDF after the given pages.
    PdfSplit {
        file: PathBuf,
        /// Pages to split after, e.g. "3, 6".
        #[arg(long)]
        at: String,
    },
    /// Extract pages of one PDF into a new document.
    PdfExtract {
        file: PathBuf,
        #[arg(long)]
        pages: String,
        #[arg(long, default_value = "extracted")]
        output_name: String,
    },
    /// Pack files into an archive.
    Compress {
        files: Vec<PathBuf>,
        /// Archive format: zip or 7z.
        #[arg(long, default_value = "zip")]
        format: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long, default_value = "archive")]
        output_name: String,
    },
    /// Unpack archives.
    Extract {
        files: Vec<PathBuf>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Video clip → GIF.
    VideoToGif {
        file: PathBuf,
        #[arg(long, default_value_t = 0.0)]
        start: f64,
        #[arg(long, default_value_t = 60.0)]
        end: f64,
        #[arg(long, default_value_t = 480)]
        width: u32,
        #[arg(long, default_value_t = 270)]
        height: u32,
        #[arg(long, default_value_t = 15)]
        fps: u32,
        #[arg(long, default_value_t = 3)]
        quality: u32,
        #[arg(long, default_value = "output")]
        output_name: String,
    },
}

#[derive(Args)]
struct EstimateArgs {
    #[arg(long, default_value_t = 480)]
    width: u32,
    #[arg(long, default_value_t = 270)]
    height: u32,
    #[arg(long, default_value_t = 15)]
    fps: u32,
    #[arg(long, default_value_t = 0.0)]
    start: f64,
    #[arg(long, default_value_t = 60.0)]
    end: f64,
}

#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the merged configuration as JSON.
    Show,
    /// Print the path of the settings file.
    Path,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Plan(args) => plan(args.job),
        Command::Estimate(args) => {
            let e = estimate(args.width, args.height, args.fps, args.start, args.end);
            println!("{}", serde_json::to_string_pretty(&e)?);
            Ok(())
        }
        Command::Config(args) => config(args.action),
    }
}

fn plan(job: PlanJob) -> Result<()> {
    let config = load_config();
    let (kind, files, options) = match job {
        PlanJob::PdfToImage {
            files,
            format,
            dpi,
            pages,
        } => (
            ToolKind::PdfConvert,
            files,
            ToolOptions::PdfToImage {
                format: parse_image_format(&format)?,
                dpi: dpi.unwrap_or(config.default_pdf_dpi),
                pages: page_mode(pages),
            },
        ),
        PlanJob::PdfToSvg { files, pages } => (
            ToolKind::PdfConvert,
            files,
            ToolOptions::PdfToSvg {
                pages: page_mode(pages),
            },
        ),
        PlanJob::PdfMerge { files, output_name } => (
            ToolKind::PdfOperations,
            files,
            ToolOptions::PdfMerge { output_name },
        ),
        PlanJob::PdfSplit { file, at } => (
            ToolKind::PdfOperations,
            vec![file],
            ToolOptions::PdfSplit { split_points: at },
        ),
        PlanJob::PdfExtract {
            file,
            pages,
            output_name,
        } => (
            ToolKind::PdfOperations,
            vec![file],
            ToolOptions::PdfExtract { pages, output_name },
        ),
        PlanJob::Compress {
            files,
            format,
            password,
            output_name,
        } => (
            ToolKind::ArchiveCompress,
            files,
            ToolOptions::ArchiveCompress {
                format: parse_archive_format(&format)?,
                password,
                output_name,
            },
        ),
        PlanJob::Extract { files, password } => (
            ToolKind::ArchiveExtract,
            files,
            ToolOptions::ArchiveExtract { password },
        ),
        PlanJob::VideoToGif {
            file,
            start,
            end,
            width,
            height,
            fps,
            quality,
            output_name,
        } => (
            ToolKind::VideoToGif,
            vec![file],
            ToolOptions::VideoToGif(GifOptions {
                start_time: start,
                end_time: end,
                width,
                height,
                fps,
                quality,
                output_name,
            }),
        ),
    };

    let mut queue = mediaforge::FileQueue::new(kind);
    let offered = files.len();
    let candidates: Vec<DroppedFile> = files
        .into_iter()
        .map(|path| {
            let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            DroppedFile::new(path, size)
        })
        .collect();
    let accepted = queue.add(candidates).len();
    if accepted < offered {
        eprintln!(
            "note: {} of {} files rejected by the extension filter",
            offered - accepted,
            offered
        );
    }

    let descriptor = JobBuilder::build(&queue, options, &config)
        .context("job did not validate")?;
    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(())
}

fn config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(&load_config())?);
        }
        ConfigAction::Path => match JsonConfigFile::at_default_location() {
            Some(file) => println!("{}", file.path().display()),
            None => bail!("no configuration directory on this platform"),
        },
    }
    Ok(())
}

fn load_config() -> AppConfig {
    match JsonConfigFile::at_default_location() {
        Some(file) => ConfigStore::load(Box::new(file)).current().clone(),
        None => AppConfig::default(),
    }
}

fn page_mode(pages: Option<String>) -> PageMode {
    match pages {
        Some(selector) => PageMode::Select(selector),
        None => PageMode::All,
    }
}

fn parse_image_format(s: &str) -> Result<ImageFormat> {
    match s.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Ok(ImageFormat::Jpg),
        "png" => Ok(ImageFormat::Png),
        "webp" => Ok(ImageFormat::Webp),
        other => bail!("unknown image format '{other}' (expected jpg, png, or webp)"),
    }
}

fn parse_archive_format(s: &str) -> Result<ArchiveFormat> {
    match s.to_ascii_lowercase().as_str() {
        "zip" => Ok(ArchiveFormat::Zip),
        "7z" => Ok(ArchiveFormat::SevenZ),
        other => bail!("unknown archive format '{other}' (expected zip or 7z)"),
    }
}
