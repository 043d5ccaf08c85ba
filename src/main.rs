//! csdoc: generate reference pages from C# XML documentation comments.
//!
//! Supports two modes:
//!
//! - **stdin mode**: `csdoc < Widget.cs`
//! - **file mode**: `csdoc -o docs src/ tests/Helpers.cs 'shared/**/*.cs'`

mod comment;
mod error;
mod model;
mod render;
mod snippet;
mod syntax;
mod toc;
mod walker;

use anyhow::{Context, Result};
use clap::Parser;
use render::Renderer;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walker::{FailurePolicy, Walker};

#[derive(Parser)]
#[command(
    name = "csdoc",
    about = "Generate Markdown or HTML reference pages from C# documentation comments"
)]
struct Cli {
    /// Input files, directories or glob patterns. If omitted, reads from stdin.
    inputs: Vec<String>,

    /// Output directory (required when inputs are given, unless --print)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: markdown (default), html
    #[arg(short = 'f', long, default_value = "markdown")]
    format: String,

    /// Write every page to stdout instead of the output directory
    #[arg(long)]
    print: bool,

    /// Fail a source file on the first malformed documentation comment
    #[arg(long)]
    strict: bool,

    /// Log progress (overridden by CSDOC_LOG)
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn policy(&self) -> FailurePolicy {
        if self.strict {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Isolate
        }
    }
}

/// One source file to document and the page name it produces.
#[derive(Debug, PartialEq, Eq)]
struct Unit {
    path: PathBuf,
    name: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let renderer = render::create_renderer(&cli.format)?;
    let walker = Walker::new(renderer.as_ref(), cli.policy());

    if cli.inputs.is_empty() {
        return stdin_mode(&walker);
    }

    file_mode(&cli, &walker, renderer.as_ref())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env("CSDOC_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// stdin mode: read one source unit, write the page to stdout.
fn stdin_mode(walker: &Walker) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let tree = syntax::parse(&input);
    let page = walker.document(&tree).context("failed to document stdin")?;
    print!("{}", page);
    Ok(())
}

/// file mode: document every unit independently, then report failures.
fn file_mode(cli: &Cli, walker: &Walker, renderer: &dyn Renderer) -> Result<()> {
    let output_dir = if cli.print {
        None
    } else {
        let dir = cli
            .output
            .as_deref()
            .context("--output is required when inputs are given (or use --print)")?;
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
        Some(dir)
    };

    let units = expand_inputs(&cli.inputs)?;
    let total = units.len();
    let mut failed = 0usize;

    for (i, unit) in units.iter().enumerate() {
        match document_unit(walker, unit) {
            Ok(page) => {
                match output_dir {
                    Some(dir) => {
                        let out_path =
                            dir.join(format!("{}.{}", unit.name, renderer.file_extension()));
                        fs::write(&out_path, &page)
                            .with_context(|| format!("failed to write {}", out_path.display()))?;
                    }
                    None => print!("{}", page),
                }
                tracing::info!("completed {} ({}/{})", unit.name, i + 1, total);
            }
            Err(e) => {
                failed += 1;
                tracing::error!("skipping {}: {:#}", unit.path.display(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} source files could not be documented", failed, total);
    }
    Ok(())
}

fn document_unit(walker: &Walker, unit: &Unit) -> Result<String> {
    let content = fs::read_to_string(&unit.path)
        .with_context(|| format!("failed to read {}", unit.path.display()))?;
    let tree = syntax::parse(&content);
    Ok(walker.document(&tree)?)
}

/// Directories never scanned for sources.
const SKIPPED_DIRS: &[&str] = &["bin", "obj"];

/// Expand files, directories and glob patterns into source units.
fn expand_inputs(patterns: &[String]) -> Result<Vec<Unit>> {
    let mut units = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            units.push(file_unit(path));
            continue;
        }
        // Directories are scanned recursively for *.cs
        if path.is_dir() {
            let dir_pattern = format!("{}/**/*.cs", pattern.trim_end_matches('/'));
            for found in glob::glob(&dir_pattern)
                .with_context(|| format!("invalid directory path: {}", pattern))?
                .filter_map(|r| r.ok())
                .filter(|p| p.is_file())
            {
                match found.strip_prefix(path) {
                    Ok(relative) if is_skipped(relative) => {}
                    Ok(relative) => units.push(Unit {
                        name: relative_name(relative),
                        path: found.clone(),
                    }),
                    Err(_) => units.push(file_unit(&found)),
                }
            }
            continue;
        }
        // Try as glob
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            tracing::warn!("no files matched: {}", pattern);
        }
        units.extend(matches.iter().map(|p| file_unit(p)));
    }
    // Sort for deterministic output
    units.sort_by(|a, b| a.path.cmp(&b.path));
    units.dedup_by(|a, b| a.path == b.path);
    disambiguate(&mut units)?;
    Ok(units)
}

/// Give units that would write the same page a name built from their whole
/// path. Fails if names still collide.
fn disambiguate(units: &mut [Unit]) -> Result<()> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for unit in units.iter() {
        *counts.entry(unit.name.clone()).or_default() += 1;
    }
    for unit in units.iter_mut() {
        if counts.get(&unit.name).copied().unwrap_or(0) > 1 {
            let qualified = relative_name(&unit.path);
            tracing::debug!("{} shares page name {}, using {}", unit.path.display(), unit.name, qualified);
            unit.name = qualified;
        }
    }

    let mut seen = HashSet::new();
    for unit in units.iter() {
        if !seen.insert(unit.name.as_str()) {
            anyhow::bail!("more than one input maps to the page name {}", unit.name);
        }
    }
    Ok(())
}

fn file_unit(path: &Path) -> Unit {
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    Unit {
        path: path.to_path_buf(),
        name,
    }
}

fn is_skipped(relative: &Path) -> bool {
    relative.parent().is_some_and(|dir| {
        dir.components().any(|c| match c {
            Component::Normal(part) => part.to_str().is_some_and(|p| SKIPPED_DIRS.contains(&p)),
            _ => false,
        })
    })
}

/// Page name for a file found under a directory input.
/// "Models/User.cs" → "Models.User"
fn relative_name(relative: &Path) -> String {
    relative
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(".")
}
