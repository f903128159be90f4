//! Random log generator.
//!
//! Reads YAML patterns from a directory and writes randomly generated log lines
//! at a fixed rate to files or stdout.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

use rlog_generator::cli::{self, Overrides, RunRequest};
use rlog_generator::exit_codes;
use rlog_generator::logging;
use rlog_generator::providers::Registry;

#[derive(Parser)]
#[command(
    name = "rlog-generator",
    version,
    about = "Random log generator driven by YAML patterns"
)]
struct Cli {
    /// Config file (default: ./rlog.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Diagnostic log filter, e.g. `info` or `rlog_generator=debug`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write `rlog.toml` and an example pattern if missing.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
    /// Generate logs for every enabled pattern.
    Run {
        #[arg(long)]
        patterns: Option<PathBuf>,
        /// Maximum number of patterns generating at once.
        #[arg(long)]
        max_concurrency: Option<usize>,
        /// Stop every pattern after this many seconds.
        #[arg(long)]
        duration: Option<u64>,
        /// Only run the named pattern (repeatable).
        #[arg(long = "only", value_name = "NAME")]
        only: Vec<String>,
        /// Write a JSON run summary to this file.
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// List patterns with their rate and output.
    List {
        #[arg(long)]
        patterns: Option<PathBuf>,
    },
    /// Check every pattern file and report all problems.
    Validate {
        #[arg(long)]
        patterns: Option<PathBuf>,
    },
    /// Print sample lines from one pattern without pacing.
    Sample {
        name: String,
        #[arg(short = 'n', long, default_value_t = 10)]
        count: u64,
        #[arg(long)]
        patterns: Option<PathBuf>,
    },
    /// List the functions usable as `func_<name>` in pattern fields.
    Providers,
}

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            err.print()?;
            return Ok(parse_exit_code(err.kind()));
        }
    };
    logging::init(cli.log_level.as_deref())?;
    let registry = Registry::builtin();
    let config = cli.config.as_deref();
    let mut stdout = std::io::stdout();

    match cli.command {
        Command::Init { force } => {
            let root = std::env::current_dir()?;
            for path in cli::init_workspace(&root, force)? {
                println!("init: wrote {}", path.display());
            }
        }
        Command::Run {
            patterns,
            max_concurrency,
            duration,
            only,
            summary,
        } => {
            let overrides = Overrides {
                patterns_dir: patterns,
                max_concurrency,
            };
            let cfg = cli::resolve_config(config, &overrides)?;
            let request = RunRequest {
                only,
                duration: duration.map(Duration::from_secs),
                summary_path: summary,
            };
            let summary = cli::run_generator(&cfg, &registry, &request)?;
            if summary.has_failures() {
                return Ok(exit_codes::FAILED);
            }
        }
        Command::List { patterns } => {
            let cfg = cli::resolve_config(config, &patterns_only(patterns))?;
            cli::list_patterns(&cfg, &mut stdout)?;
        }
        Command::Validate { patterns } => {
            let cfg = cli::resolve_config(config, &patterns_only(patterns))?;
            cli::validate_patterns(&cfg, &registry, &mut stdout)?;
        }
        Command::Sample {
            name,
            count,
            patterns,
        } => {
            let cfg = cli::resolve_config(config, &patterns_only(patterns))?;
            cli::sample_pattern(&cfg, &registry, &name, count, &mut stdout)?;
        }
        Command::Providers => cli::list_providers(&registry, &mut stdout)?,
    }
    Ok(exit_codes::OK)
}

/// `--help` and `--version` succeed; any other parse failure is a usage error.
fn parse_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit_codes::OK,
        _ => exit_codes::INVALID,
    }
}

fn patterns_only(patterns: Option<PathBuf>) -> Overrides {
    Overrides {
        patterns_dir: patterns,
        max_concurrency: None,
    }
}
