use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use wallpost::imaging::{InputFormat, RustBackend};
use wallpost::process::{BatchOptions, FileReport};
use wallpost::{config, intake, output, process, scan};

/// Shared flags for commands that produce a batch report.
#[derive(clap::Args, Clone)]
struct ReportArgs {
    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
#[command(name = "wallpost")]
#[command(about = "Normalize photos into platform-sized JPEGs with an EXIF caption")]
#[command(long_about = "\
Normalize photos into platform-sized JPEGs with an EXIF caption

Each file is treated like an upload to a messaging platform: the MIME type
comes from the extension and the declared size from the filesystem.

  - Not an accepted image type      → ignored
  - Over limits.reject_bytes        → messages.too_large
  - Over limits.compress_bytes      → downscaled to 1/2, 1/4, 1/8 until it fits
  - Otherwise                       → re-encoded as JPEG at full resolution

Every rendition gets a caption:

  Original resolution: 6000x4000 | Canon Canon EOS R5 | ISO 400 | 50mm | f/2.8 | 1/500s

Logging goes to stderr; set RUST_LOG=debug to see every encode attempt.

Run 'wallpost gen-config' to generate a documented wallpost.toml.")]
#[command(version)]
struct Cli {
    /// Config file (stock defaults when absent)
    #[arg(long, default_value = "wallpost.toml", global = true)]
    config: PathBuf,

    /// Output directory for renditions
    #[arg(short, long, default_value = "wallpost-out", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize the given files
    Process {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Normalize every file under a directory
    Scan {
        dir: PathBuf,
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Print the caption for a file without encoding it
    Caption { file: PathBuf },
    /// Print a stock wallpost.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Process { files, report } => {
            let config = config::load_config(&cli.config)?;
            run_batch(files, &cli.output, &config, report.json)?;
        }
        Command::Scan { dir, report } => {
            let config = config::load_config(&cli.config)?;
            let files = scan::scan(dir, Some(cli.output.as_path()))?;
            if files.is_empty() {
                tracing::warn!(dir = %dir.display(), "no files found");
            }
            run_batch(&files, &cli.output, &config, report.json)?;
        }
        Command::Caption { file } => {
            let format = file
                .extension()
                .and_then(|e| e.to_str())
                .and_then(InputFormat::mime_for_extension)
                .and_then(InputFormat::from_mime)
                .ok_or_else(|| format!("unsupported file type: {}", file.display()))?;
            let bytes = std::fs::read(file)?;
            let caption = intake::describe(&RustBackend::new(), &bytes, format)?;
            output::print_caption(file, &caption);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Process files on the rayon pool and print the report.
///
/// Text output streams one entry per file as it finishes; JSON output is
/// printed once at the end, in input order.
fn run_batch(
    files: &[PathBuf],
    output_dir: &Path,
    config: &config::Config,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    init_thread_pool(&config.processing);
    let policy = config.intake_policy()?;
    let options = BatchOptions {
        timeout_secs: config.processing.timeout_secs,
    };

    if json {
        let reports = process::process(files, output_dir, &policy, &options, None)?;
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    let (tx, rx) = std::sync::mpsc::channel::<FileReport>();
    let printer = std::thread::spawn(move || {
        for report in rx {
            output::print_report(&report);
        }
    });
    let reports = process::process(files, output_dir, &policy, &options, Some(tx))?;
    printer
        .join()
        .map_err(|_| "report printer thread panicked")?;
    output::print_summary(&reports);
    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; users can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
