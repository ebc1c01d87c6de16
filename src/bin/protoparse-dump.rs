//! Dump the AST of one or more `.proto` files as JSON.
//!
//! Usage: protoparse-dump [--strict] [--max-depth N] [--compact] <FILE>...

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use protoparse::{parse_file_with, ParseError, ParseMode, ParseOptions};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "protoparse-dump", about = "Print the position-annotated AST of .proto files")]
struct Args {
    /// Schema files to parse
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Reject unrecognized top-level statements
    #[arg(long)]
    strict: bool,

    /// Maximum message nesting depth
    #[arg(long, default_value_t = ParseOptions::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,
}

/// `path:line:column: message`, the form editors jump to.
fn diagnostic(path: &Path, err: &ParseError) -> String {
    format!("{}:{err}", path.display())
}

fn dump(path: &Path, options: &ParseOptions, compact: bool) -> anyhow::Result<bool> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    debug!(path = %path.display(), bytes = text.len(), "parsing");

    let file = match parse_file_with(&text, options.clone()) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("{}", diagnostic(path, &e));
            return Ok(false);
        }
    };

    let json = if compact {
        serde_json::to_string(&file)?
    } else {
        serde_json::to_string_pretty(&file)?
    };
    println!("{json}");
    Ok(true)
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let options = ParseOptions {
        mode: if args.strict {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        },
        max_depth: args.max_depth,
    };

    let mut ok = true;
    for path in &args.files {
        ok &= dump(path, &options, args.compact)?;
    }

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
