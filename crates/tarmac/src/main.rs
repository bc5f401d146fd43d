//! The Tarmac formatter CLI.
//!
//! `tarmac <paths>` formats Erlang-style source files in place.
//! Directories are searched recursively for `.erl` and `.hrl` files.
//!
//! Options:
//! - `--check` - Exit 1 if any file would change; modify nothing
//! - `--json`  - Report errors as JSON objects, one per line
//!
//! A file the formatter cannot handle safely -- it does not tokenize, does
//! not parse, or reformatting would change what it means -- is reported
//! and left untouched.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

#[derive(Parser)]
#[command(name = "tarmac", version, about = "An Erlang code formatter that rolls source flat")]
struct Cli {
    /// Files or directories to format
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Check if files are formatted (exit 1 if not, don't modify)
    #[arg(long)]
    check: bool,

    /// Output errors as JSON (one object per line)
    #[arg(long)]
    json: bool,
}

/// Statistics from a format run.
struct FmtStats {
    /// Total number of files processed.
    total: usize,
    /// Number of files that were not already formatted (check mode).
    unformatted: usize,
    /// Number of files that could not be formatted.
    failed: usize,
}

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(stats) => {
            if stats.failed > 0 {
                eprintln!("{} file(s) could not be formatted", stats.failed);
                process::exit(1);
            }
            if cli.check {
                if stats.unformatted > 0 {
                    eprintln!("{} file(s) would be reformatted", stats.unformatted);
                    process::exit(1);
                }
                eprintln!("{} file(s) already formatted", stats.total);
            } else {
                eprintln!("Formatted {} file(s)", stats.total);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

/// Format (or check) every source file under the given paths.
fn run(cli: &Cli) -> Result<FmtStats, String> {
    let mut files = Vec::new();
    for path in &cli.paths {
        collect_source_files(path, &mut files)?;
    }
    files.sort();
    if files.is_empty() {
        return Err("no .erl or .hrl files found".to_string());
    }

    let mut stats = FmtStats {
        total: 0,
        unformatted: 0,
        failed: 0,
    };

    for file in &files {
        let source = std::fs::read_to_string(file)
            .map_err(|e| format!("Failed to read '{}': {}", file.display(), e))?;
        stats.total += 1;

        match tarmac_fmt::format_code_with_path(&source, &file.display().to_string()) {
            Ok(formatted) => {
                if formatted != source {
                    if cli.check {
                        eprintln!("  would reformat: {}", file.display());
                        stats.unformatted += 1;
                    } else {
                        std::fs::write(file, &formatted)
                            .map_err(|e| format!("Failed to write '{}': {}", file.display(), e))?;
                    }
                }
            }
            Err(e) => {
                stats.failed += 1;
                report_error(cli, file, &e);
            }
        }
    }

    Ok(stats)
}

/// Report one file error, human-readable or as a JSON object.
fn report_error(cli: &Cli, file: &Path, err: &tarmac_fmt::FormatError) {
    if cli.json {
        let msg = serde_json::json!({
            "severity": "error",
            "file": file.display().to_string(),
            "message": err.to_string(),
        });
        eprintln!("{}", msg);
    } else {
        eprintln!("{}: {}", file.display(), err);
    }
}

/// Collect source files from a path. A file is taken as-is if it has a
/// source extension; a directory is walked recursively.
fn collect_source_files(path: &Path, files: &mut Vec<PathBuf>) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("Path '{}' does not exist", path.display()));
    }

    if path.is_file() {
        if has_source_extension(path) {
            files.push(path.to_path_buf());
            return Ok(());
        }
        return Err(format!("'{}' is not a .erl or .hrl file", path.display()));
    }

    if path.is_dir() {
        collect_recursive(path, files)
            .map_err(|e| format!("Failed to walk directory '{}': {}", path.display(), e))?;
        return Ok(());
    }

    Err(format!("'{}' is not a file or directory", path.display()))
}

/// Recursively collect source files, skipping hidden directories.
fn collect_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let entry_path = entry.path();
        let hidden = entry_path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if hidden {
            continue;
        }
        if entry_path.is_dir() {
            collect_recursive(&entry_path, files)?;
        } else if has_source_extension(&entry_path) {
            files.push(entry_path);
        }
    }
    Ok(())
}

fn has_source_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("erl") | Some("hrl")
    )
}
