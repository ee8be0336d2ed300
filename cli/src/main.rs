//! Assemble, check and compare saved rotations from the command line.
//!
//! Usage: `apl resolve <rotation> [--scale FILE] [--max-depth N]`
//!        `apl check <rotation>...`
//!        `apl compare <a> <b>`
//!
//! Rotations are read as JSON, or as SCALE when the file ends in `.scale`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use apl_core::limits::MAX_GROUP_DEPTH;
use apl_core::{assemble_with, is_equal_rotation, Assembly, ResolveConfig, Rotation};
use clap::{Parser, Subcommand};
use parity_scale_codec::Encode;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "apl")]
#[command(about = "Action priority list rotation tools")]
struct Args {
    /// Log assembly stages and expansions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a rotation and print the resolved form as JSON
    Resolve {
        rotation: PathBuf,

        /// Also write the resolved rotation SCALE-encoded to this file
        #[arg(long)]
        scale: Option<PathBuf>,

        /// Maximum group nesting depth
        #[arg(long = "max-depth", default_value_t = MAX_GROUP_DEPTH)]
        max_depth: u32,
    },
    /// Assemble rotations in parallel and report their diagnostics
    Check {
        #[arg(required = true)]
        rotations: Vec<PathBuf>,
    },
    /// Exit 0 if two rotations are equal, 1 otherwise
    Compare { a: PathBuf, b: PathBuf },
}

/// Route the core's `log` records and our own events to stderr.
///
/// `--verbose` shows everything; otherwise `RUST_LOG` applies, defaulting to
/// warnings and errors.
fn init_logging(verbose: bool) {
    let _ = LogTracer::init();
    let filter = if verbose {
        EnvFilter::new("trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load(path: &Path) -> Result<Rotation, String> {
    let parsed = if path.extension().map_or(false, |ext| ext == "scale") {
        let bytes = fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        Rotation::from_scale(&bytes)
    } else {
        let json = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        Rotation::from_json(&json)
    };
    parsed.map_err(|e| format!("{}: {}", path.display(), e))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport {
    path: String,
    runnable: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl CheckReport {
    fn new(path: &Path, assembly: &Assembly) -> Self {
        Self {
            path: path.display().to_string(),
            runnable: !assembly.has_hard_errors(),
            errors: assembly.errors().map(|d| d.to_string()).collect(),
            warnings: assembly.warnings().map(|d| d.to_string()).collect(),
        }
    }
}

fn resolve(path: &Path, scale: Option<&Path>, max_depth: u32) -> Result<bool, String> {
    let rotation = load(path)?;
    let config = ResolveConfig {
        max_group_depth: max_depth,
        ..Default::default()
    };
    let assembly = assemble_with(&rotation, &config);
    for diagnostic in &assembly.diagnostics {
        if diagnostic.is_hard() {
            error!("{}", diagnostic);
        } else {
            warn!("{}", diagnostic);
        }
    }

    let json = serde_json::to_string_pretty(&assembly.resolved).map_err(|e| e.to_string())?;
    println!("{}", json);

    if let Some(out) = scale {
        fs::write(out, assembly.resolved.encode())
            .map_err(|e| format!("Failed to write {}: {}", out.display(), e))?;
        info!("Wrote resolved rotation to {}", out.display());
    }
    Ok(!assembly.has_hard_errors())
}

fn check_reports(paths: &[PathBuf]) -> Result<Vec<CheckReport>, String> {
    let config = ResolveConfig::default();
    paths
        .par_iter()
        .map(|path| -> Result<CheckReport, String> {
            let rotation = load(path)?;
            Ok(CheckReport::new(path, &assemble_with(&rotation, &config)))
        })
        .collect()
}

fn check(paths: &[PathBuf]) -> Result<bool, String> {
    let reports = check_reports(paths)?;
    let json = serde_json::to_string_pretty(&reports).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(reports.iter().all(|r| r.runnable))
}

fn verdict(equal: bool) -> &'static str {
    if equal {
        "equal"
    } else {
        "different"
    }
}

fn compare(a: &Path, b: &Path) -> Result<bool, String> {
    let equal = is_equal_rotation(&load(a)?, &load(b)?);
    println!("{}", verdict(equal));
    Ok(equal)
}

fn run(command: &Command) -> Result<bool, String> {
    match command {
        Command::Resolve {
            rotation,
            scale,
            max_depth,
        } => resolve(rotation, scale.as_deref(), *max_depth),
        Command::Check { rotations } => check(rotations),
        Command::Compare { a, b } => compare(a, b),
    }
}

/// 0 on success, 1 for hard errors or a mismatch, 2 when a file could not be used
fn exit_code(result: &Result<bool, String>) -> i32 {
    match result {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(_) => 2,
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = run(&args.command);
    if let Err(e) = &result {
        error!("{}", e);
    }
    process::exit(exit_code(&result));
}
