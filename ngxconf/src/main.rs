//! ngxconf - check, format and dump nginx-style configuration files
//!
//! This is the main entry point for the ngxconf CLI.

use anyhow::Context;
use ariadne::{Color, IndexType, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};
use ngxconf_config::{encode_with_options, Config, Entry, FormatOptions, JsonAdapter, ParseError};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ngxconf - nginx configuration checker and formatter
#[derive(Parser)]
#[command(name = "ngxconf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with formatter and parser options
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a configuration file parses
    Check {
        /// Path to the configuration file
        #[arg(default_value = "nginx.conf")]
        file: PathBuf,
    },

    /// Re-indent a configuration file
    Fmt {
        /// Path to the configuration file
        #[arg(default_value = "nginx.conf")]
        file: PathBuf,

        /// Indentation per nesting level (overrides the options file)
        #[arg(long)]
        indent: Option<String>,

        /// Rewrite the file in place instead of printing it
        #[arg(short, long)]
        write: bool,
    },

    /// Print the parsed tree as JSON
    Dump {
        /// Path to the configuration file
        #[arg(default_value = "nginx.conf")]
        file: PathBuf,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `fmt` and `dump` output stays clean
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    let options = match &cli.config {
        Some(path) => {
            tracing::info!("Loading options from {}", path.display());
            Config::load(path)?
        }
        None => Config::default(),
    };

    match cli.command {
        Commands::Check { file } => {
            tracing::info!("Checking config: {}", file.display());
            load(&file, &options)?;
            println!("✅ Configuration '{}' is valid!", file.display());
        }

        Commands::Fmt { file, indent, write } => {
            let doc = load(&file, &options)?;
            let format = indent.map(FormatOptions::with_indent).unwrap_or(options.format);
            let text = encode_with_options(&doc, &format);

            if write {
                std::fs::write(&file, text)
                    .with_context(|| format!("Failed to write {}", file.display()))?;
                tracing::info!("Formatted {}", file.display());
            } else {
                print!("{}", text);
            }
        }

        Commands::Dump { file, pretty } => {
            let doc = load(&file, &options)?;
            println!("{}", JsonAdapter::serialize(&doc, pretty)?);
        }

        Commands::Version => {
            println!("ngxconf v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Read and parse `path`, exiting with a diagnostic on syntax errors
fn load(path: &Path, options: &Config) -> anyhow::Result<Entry> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let source = String::from_utf8_lossy(&bytes);

    match ngxconf_config::parse_with_options(&source, &options.parse) {
        Ok(doc) => Ok(doc),
        Err(e) => {
            report(path, &source, &e);
            std::process::exit(1);
        }
    }
}

fn report(path: &Path, source: &str, error: &ParseError) {
    let id = path.display().to_string();
    let span = error.span();
    let start = span.start.min(source.len());
    let end = span.end.min(source.len()).max(start);

    let printed = Report::build(ReportKind::Error, (id.clone(), start..end))
        .with_config(ariadne::Config::default().with_index_type(IndexType::Byte))
        .with_message(&error.message)
        .with_label(
            Label::new((id.clone(), start..end))
                .with_message(error.to_string())
                .with_color(Color::Red),
        )
        .finish()
        .eprint((id, Source::from(source)));

    if printed.is_err() {
        eprintln!("❌ {}: {}", path.display(), error);
    }
}
