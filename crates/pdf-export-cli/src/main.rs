mod desktop;
mod logger;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use desktop::SystemOpener;
use logger::StderrLogger;
use pdf_export::{ExportKind, ExportOptions, ExportOutcome, Exporter, Graph, MarginPolicy};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "photopdf", about = "Export photo graphs to PDF or ZIP archives", version)]
struct Cli {
    /// JSON options file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble one PDF with a page per photo
    Pdf {
        /// Input graph (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Ask for the output file even when one is given
        #[arg(long)]
        prompt: bool,

        /// Page margins
        #[arg(long, value_enum)]
        margins: Option<MarginsArg>,

        /// Open the PDF when done
        #[arg(long)]
        open: bool,
    },

    /// Bundle photos, per-item PDFs and metadata into a ZIP archive
    Archive {
        /// Input graph (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output ZIP file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum concurrent photo copies
        #[arg(long)]
        concurrency: Option<usize>,

        /// Photo folder inside the archive
        #[arg(long)]
        images_dir: Option<PathBuf>,

        /// Name of the metadata file
        #[arg(long)]
        metadata_file: Option<String>,

        /// Top-level folder of the archive (default: archive file name)
        #[arg(long)]
        root_folder: Option<String>,

        /// Page margins of the per-item PDFs
        #[arg(long, value_enum)]
        margins: Option<MarginsArg>,

        /// Show the archive in its folder when done
        #[arg(long)]
        open: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MarginsArg {
    Uniform,
    OrientationAware,
}

impl From<MarginsArg> for MarginPolicy {
    fn from(arg: MarginsArg) -> Self {
        match arg {
            MarginsArg::Uniform => Self::Uniform,
            MarginsArg::OrientationAware => Self::OrientationAware,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    StderrLogger::new(cli.verbose).init()?;

    let mut options = match &cli.config {
        Some(path) => ExportOptions::load(path)
            .await
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => ExportOptions::default(),
    };

    let (kind, input) = match cli.command {
        Commands::Pdf {
            input,
            output,
            prompt,
            margins,
            open,
        } => {
            options.destination = output.or(options.destination);
            options.prompt |= prompt;
            if let Some(margins) = margins {
                options.margin_policy = margins.into();
            }
            options.open_after_export = open;
            (ExportKind::Pdf, input)
        }

        Commands::Archive {
            input,
            output,
            concurrency,
            images_dir,
            metadata_file,
            root_folder,
            margins,
            open,
        } => {
            options.destination = output.or(options.destination);
            if let Some(concurrency) = concurrency {
                options.archive.concurrency = concurrency;
            }
            if let Some(images_dir) = images_dir {
                options.archive.images_dir = images_dir;
            }
            if let Some(metadata_file) = metadata_file {
                options.archive.metadata_file = metadata_file;
            }
            if root_folder.is_some() {
                options.archive.root_folder = root_folder;
            }
            if let Some(margins) = margins {
                options.margin_policy = margins.into();
            }
            options.open_after_export = open;
            (ExportKind::Archive, input)
        }
    };

    let graph = Graph::load(&input)
        .await
        .with_context(|| format!("Failed to read graph {}", input.display()))?;
    let base_dir = input.parent().unwrap_or(Path::new(".")).to_owned();

    let opener = SystemOpener;
    let exporter = Exporter::new(options)
        .with_base_dir(base_dir)
        .with_opener(&opener);
    #[cfg(feature = "dialog")]
    let dialog = desktop::NativeDialog;
    #[cfg(feature = "dialog")]
    let exporter = exporter.with_dialog(&dialog);

    match exporter.export(kind, &graph).await? {
        None => println!("Export cancelled"),
        Some(ExportOutcome::Pdf { path, report }) => {
            if report.passthrough {
                println!("Copied source PDF → {}", path.display());
            } else {
                println!("Wrote {} page(s) → {}", report.pages, path.display());
            }
            print_skipped(report.skipped.len());
        }
        Some(ExportOutcome::Archive { path, report }) => {
            println!(
                "Archived {} photo(s), {} document(s) → {}",
                report.copied,
                report.documents.len(),
                path.display()
            );
            print_skipped(report.skipped.len());
        }
    }

    Ok(())
}

fn print_skipped(count: usize) {
    if count > 0 {
        println!("  Skipped photos: {}", count);
    }
}
