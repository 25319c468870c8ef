//! mdhtml CLI - Markdown to HTML conversion tool
//!
//! A command-line tool for rendering Markdown files the way the editor
//! preview renders them.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use mdhtml::{render_batch, try_render_batch, Mdhtml, RenderOptions, Stage};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Markdown to HTML conversion
#[derive(Parser)]
#[command(
    name = "mdhtml",
    version,
    about = "Convert Markdown documents to HTML",
    long_about = "mdhtml - fail-open Markdown to HTML conversion.\n\n\
                  Renders Markdown with the same pipeline the editor preview uses.\n\n\
                  Usage:\n  \
                  mdhtml <file>              Write <file>.html next to the input\n  \
                  mdhtml <file> <output>     Write to the given file\n  \
                  mdhtml html <file>         Print HTML to stdout\n  \
                  mdhtml trace <file>        Show each transformer's output"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file path (for default conversion)
    #[arg(global = false)]
    input: Option<PathBuf>,

    /// Output file path (for default conversion)
    #[arg(global = false)]
    output: Option<PathBuf>,

    /// Load render options from a JSON file
    #[arg(long, global = true, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Fail on the first transformer fault instead of skipping it
    #[arg(long, global = true)]
    strict: bool,

    /// Disable a transformer (repeatable), e.g. --disable table
    #[arg(long, global = true, value_name = "STAGE")]
    disable: Vec<Stage>,

    /// Wrap the output in a complete HTML page
    #[arg(long, global = true)]
    standalone: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document to HTML
    #[command(visible_alias = "render")]
    Html {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert many documents in parallel
    Batch {
        /// Input file paths
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (default: next to each input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the output of every transformer as JSON
    Trace {
        /// Input file path
        input: PathBuf,

        /// Only show this transformer
        #[arg(long)]
        stage: Option<Stage>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// --verbose enables DEBUG, otherwise RUST_LOG or WARN.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = load_options(cli.config.as_deref(), cli.strict, &cli.disable)?;
    let renderer = Mdhtml::with_options(options);
    debug!(options = ?renderer.options(), "render options");

    // Handle default command (mdhtml <file> [output])
    let Some(command) = cli.command else {
        if let Some(input) = cli.input {
            return run_convert(&renderer, &input, cli.output.as_ref(), cli.standalone);
        }
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Html { input, output } => {
            let html = render_document(&renderer, &input, cli.standalone)?;
            write_output(output.as_ref(), &html)?;

            if let Some(path) = output {
                println!(
                    "{} Converted to HTML: {}",
                    "✓".green().bold(),
                    path.display()
                );
            }
        }

        Commands::Batch { inputs, output } => {
            run_batch(&renderer, &inputs, output.as_deref(), cli.standalone)?;
        }

        Commands::Trace {
            input,
            stage,
            compact,
        } => {
            let markdown = read_markdown(&input)?;
            let reports: Vec<_> = renderer
                .trace(&markdown)
                .into_iter()
                .filter(|report| stage.map_or(true, |s| s == report.stage))
                .collect();

            let faults = reports.iter().filter(|r| r.is_fault()).count();
            let json = if compact {
                serde_json::to_string(&reports)?
            } else {
                serde_json::to_string_pretty(&reports)?
            };
            write_output(None, &json)?;

            if faults > 0 {
                eprintln!(
                    "{} {} transformer(s) failed and were skipped",
                    "!".yellow().bold(),
                    faults
                );
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Builds render options from the config file and command-line flags.
/// Flags override the file.
fn load_options(
    config: Option<&Path>,
    strict: bool,
    disable: &[Stage],
) -> Result<RenderOptions, Box<dyn std::error::Error>> {
    let mut options = match config {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            RenderOptions::from_json_file(path)?
        }
        None => RenderOptions::default(),
    };

    if strict {
        options = options.with_strict_errors();
    }
    for stage in disable {
        options = options.without_stage(*stage);
    }
    Ok(options)
}

/// Run the default convert command - writes one HTML file
fn run_convert(
    renderer: &Mdhtml,
    input: &Path,
    output: Option<&PathBuf>,
    standalone: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = create_spinner("Rendering document...");

    let output_path = match output {
        Some(p) => p.clone(),
        None => default_output_path(input, None),
    };

    let html = render_document(renderer, input, standalone)?;
    fs::write(&output_path, &html)?;

    pb.finish_and_clear();

    println!("{}", "Conversion Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Input".bold(), input.display());
    println!("{}: {}", "Output".bold(), output_path.display());
    println!("{}: {} bytes", "Size".bold(), html.len());

    Ok(())
}

fn run_batch(
    renderer: &Mdhtml,
    inputs: &[PathBuf],
    output_dir: Option<&Path>,
    standalone: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = output_dir {
        fs::create_dir_all(dir)?;
    }

    let documents = inputs
        .iter()
        .map(|path| read_markdown(path))
        .collect::<Result<Vec<_>, _>>()?;

    let pb = create_spinner(&format!("Rendering {} documents...", documents.len()));
    let rendered = if renderer.options().is_strict() {
        try_render_batch(&documents, renderer.options())
    } else {
        Ok(render_batch(&documents, renderer.options()))
    };
    pb.finish_and_clear();
    let rendered = rendered?;

    let bar = ProgressBar::new(inputs.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap(),
    );

    for (input, body) in inputs.iter().zip(rendered) {
        let path = default_output_path(input, output_dir);
        let html = if standalone {
            standalone_page(&page_title(input), &body)
        } else {
            body
        };
        bar.set_message(path.display().to_string());
        fs::write(&path, html)?;
        bar.inc(1);
    }
    bar.finish_and_clear();

    println!(
        "{} Converted {} documents",
        "✓".green().bold(),
        inputs.len()
    );
    Ok(())
}

fn read_markdown(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let bytes = fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(String::from_utf8(bytes).map_err(mdhtml::Error::from)?)
}

fn render_document(
    renderer: &Mdhtml,
    input: &Path,
    standalone: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let markdown = read_markdown(input)?;
    let body = renderer.try_render(&markdown)?;
    Ok(if standalone {
        standalone_page(&page_title(input), &body)
    } else {
        body
    })
}

/// `<dir>/<stem>.html`, where `<dir>` defaults to the input's directory.
fn default_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let dir = output_dir.unwrap_or_else(|| input.parent().unwrap_or(Path::new(".")));
    dir.join(format!("{}.html", stem))
}

fn page_title(input: &Path) -> String {
    input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn standalone_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        html_escape::encode_text(title),
        body
    )
}

fn print_version() {
    println!("{} {}", "mdhtml".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Fail-open Markdown to HTML conversion");
    println!();
    let stages: Vec<&str> = Stage::ALL.iter().map(|s| s.name()).collect();
    println!("Transformers: {}", stages.join(", "));
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
