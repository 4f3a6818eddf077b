//! CLI binary for swiftconvert.
//!
//! A thin shim over the library crate that maps CLI flags onto an
//! `OperationSession`, runs one attempt and reports the result.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use swiftconvert::session::{FAILURE_MESSAGE, PROCESSING_MESSAGE};
use swiftconvert::{
    ArtifactDownloader, CandidateFile, ClientConfig, CompatibilityMatrix, Completion, Format,
    Operation, OperationClient, OperationSession, RotationAngle,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a Word document to PDF (target inferred from the extension)
  swiftconvert convert report.docx

  # Convert a PDF to PNG images
  swiftconvert convert --to png slides.pdf -o out/

  # Merge several PDFs, in the order given
  swiftconvert merge cover.pdf body.pdf appendix.pdf

  # Rotate every page 180°
  swiftconvert rotate --angle 180 scan.pdf

  # Reorder pages
  swiftconvert reorder --order 1,3,2,4-last deck.pdf

  # Show which conversions the service accepts
  swiftconvert --list-formats

TOOLS:
  convert          FROM → TO (see --list-formats)       saves .<to>
  merge            two or more files into one PDF        saves .pdf
  split            one PDF into pages                    saves .zip
  compress         shrink a PDF                          saves .pdf
  extract-text     text content of a PDF                 saves .pdf
  extract-images   embedded images of a PDF              saves .zip
  rotate           rotate pages by 90, 180 or 270        saves .pdf
  reorder          new page order, e.g. 1,3,2,4-last     saves .pdf

  Every tool except merge uses only the first file given.
  Files larger than the size limit (default 20 MB) are rejected before
  anything is sent.

ENVIRONMENT VARIABLES:
  SWIFTCONVERT_SERVER      Base URL of the processing service
  SWIFTCONVERT_OUTPUT_DIR  Directory for saved results
  SWIFTCONVERT_TIMEOUT     Request timeout in seconds
  SWIFTCONVERT_MAX_SIZE_MB Per-file size limit in MB
  RUST_LOG                 Log filter, overrides --verbose/--quiet
"#;

/// Run document tools on a SwiftConvert processing service.
#[derive(Parser, Debug)]
#[command(
    name = "swiftconvert",
    version,
    about = "Convert, merge, split, compress, extract, rotate and reorder documents",
    long_about = "Upload documents to a SwiftConvert processing service and save the result. \
The service performs the transformation; this tool validates the selection, builds the \
request and writes the returned file to disk.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Tool to run.
    #[arg(value_enum, required_unless_present = "list_formats")]
    tool: Option<ToolArg>,

    /// Input files. Only merge uses more than the first.
    #[arg(required_unless_present = "list_formats")]
    files: Vec<PathBuf>,

    /// Convert: source format (default: inferred from the file extension).
    #[arg(long)]
    from: Option<String>,

    /// Convert: target format (default: first declared target for the source).
    #[arg(long)]
    to: Option<String>,

    /// Rotate: clockwise angle.
    #[arg(long, value_parser = ["90", "180", "270"])]
    angle: Option<String>,

    /// Reorder: page order expression, passed to the service as-is.
    #[arg(long)]
    order: Option<String>,

    /// Base URL of the processing service.
    #[arg(long, env = "SWIFTCONVERT_SERVER", default_value = swiftconvert::config::DEFAULT_BASE_URL)]
    server: String,

    /// Directory to save the result in.
    #[arg(short, long, env = "SWIFTCONVERT_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Request timeout in seconds (default: none).
    #[arg(long, env = "SWIFTCONVERT_TIMEOUT")]
    timeout: Option<u64>,

    /// Per-file size limit in MB.
    #[arg(long, env = "SWIFTCONVERT_MAX_SIZE_MB", default_value_t = 20)]
    max_size_mb: u64,

    /// Print the supported conversions and exit.
    #[arg(long)]
    list_formats: bool,

    /// Print the final session state as JSON.
    #[arg(long)]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ToolArg {
    Convert,
    Merge,
    Split,
    Compress,
    ExtractText,
    ExtractImages,
    Rotate,
    Reorder,
}

impl From<ToolArg> for Operation {
    fn from(v: ToolArg) -> Self {
        match v {
            ToolArg::Convert => Operation::Convert,
            ToolArg::Merge => Operation::Merge,
            ToolArg::Split => Operation::Split,
            ToolArg::Compress => Operation::Compress,
            ToolArg::ExtractText => Operation::ExtractText,
            ToolArg::ExtractImages => Operation::ExtractImages,
            ToolArg::Rotate => Operation::Rotate,
            ToolArg::Reorder => Operation::Reorder,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers the in-flight wait; keep INFO logs out of its way.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.list_formats {
        return list_formats(cli.json);
    }

    let Some(tool) = cli.tool else {
        bail!("no tool given");
    };
    let operation = Operation::from(tool);
    let config = build_config(&cli)?;

    // ── Stage the selection ──────────────────────────────────────────────
    let mut session = OperationSession::new(&config);
    session.select_tool(operation);

    let mut candidates = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        candidates.push(
            CandidateFile::from_path(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
        );
    }
    if !operation.accepts_multiple() && cli.files.len() > 1 && !cli.quiet {
        eprintln!(
            "{}",
            dim(&format!(
                "note: {} uses only the first file; ignoring {} more",
                operation,
                cli.files.len() - 1
            ))
        );
    }

    if let Err(e) = session.select_files(candidates) {
        bail!(
            "{}\n{}",
            session.status_message().unwrap_or(FAILURE_MESSAGE),
            e
        );
    }

    apply_parameters(&cli, &mut session)?;

    // ── Run the attempt ──────────────────────────────────────────────────
    let client = OperationClient::new(&config).context("Invalid client configuration")?;
    let downloader = ArtifactDownloader::new(&config.output_dir);

    let spinner = show_progress.then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix(operation.label());
        bar.set_message(format!(
            "{} ({})",
            PROCESSING_MESSAGE,
            session.selection_summary().unwrap_or_default()
        ));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let completion = session.run(&client, &downloader).await;

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(session.state()).context("Failed to serialise state")?
        );
    }

    match completion {
        Some(Completion::Saved(saved)) => {
            if !cli.quiet && !cli.json {
                eprintln!(
                    "{}  {}  {}",
                    green("✔"),
                    bold(&saved.path.display().to_string()),
                    dim(&swiftconvert::files::format_megabytes(saved.size)),
                );
            }
            Ok(())
        }
        Some(Completion::Failed(e)) => {
            if !cli.quiet && !cli.json {
                eprintln!("{}  {}", red("✘"), FAILURE_MESSAGE);
            }
            Err(e).context(format!("{} failed", operation.label()))
        }
        Some(Completion::Superseded) | None => bail!("nothing was sent"),
    }
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder()
        .base_url(cli.server.clone())
        .output_dir(cli.output_dir.clone())
        .max_file_size(cli.max_size_mb.saturating_mul(1024 * 1024));

    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }

    builder.build().context("Invalid configuration")
}

/// Push `--from/--to/--angle/--order` into the session.
///
/// Runs after files are staged so explicit flags win over the conversion
/// inferred from the file extension.
fn apply_parameters(cli: &Cli, session: &mut OperationSession) -> Result<()> {
    let from = cli.from.as_deref().map(str::parse::<Format>).transpose()?;
    let to = cli.to.as_deref().map(str::parse::<Format>).transpose()?;

    match (from, to) {
        (Some(from), Some(to)) => session.set_conversion(from, to)?,
        (Some(from), None) => session.set_source_format(from)?,
        (None, Some(to)) => {
            let from = session.parameters().conversion.from;
            session.set_conversion(from, to)?;
        }
        (None, None) => {}
    }

    if let Some(ref angle) = cli.angle {
        session.set_angle(angle.parse::<RotationAngle>()?);
    }
    if let Some(ref order) = cli.order {
        session.set_page_order(order.clone());
    }
    Ok(())
}

/// Print the compatibility matrix, one source per line.
fn list_formats(json: bool) -> Result<()> {
    let matrix = CompatibilityMatrix::standard();

    if json {
        let pairs: Vec<_> = matrix.pairs().collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&pairs).context("Failed to serialise matrix")?
        );
        return Ok(());
    }

    println!("{:<6}  {}", bold("FROM"), bold("TO (first is default)"));
    for source in matrix.source_formats() {
        let targets: Vec<String> = matrix
            .target_formats(source)
            .into_iter()
            .map(|f| f.to_string())
            .collect();
        println!("{:<6}  {}", source, targets.join(", "));
    }
    Ok(())
}
