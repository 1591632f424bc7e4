//! Command-line interface for the vouch analyzer
//!
//! Provides commands: check, facts

use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::analysis::facts::FactStore;
use crate::analysis::Pass;
use crate::diagnostics::DiagnosticBag;
use crate::sema::PackageInfo;
use crate::syntax::{self, File};

/// vouch - checks that documented error codes match reality
#[derive(Parser, Debug)]
#[command(name = "vouch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output diagnostics as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze Vo source files or directories
    Check {
        /// Files or directories to analyze; directories are walked
        /// recursively and each directory forms one package
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Fact store to load before and save after the run, so separate
        /// runs compose across package boundaries
        #[arg(long)]
        facts: Option<PathBuf>,
    },

    /// Dump the contents of a fact store
    Facts {
        /// Fact store file to read
        file: PathBuf,
    },
}

impl Cli {
    /// Run the CLI
    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let cli = Cli::parse();

        match cli.command {
            Command::Check { paths, facts } => run_check(&paths, facts.as_deref(), cli.json),
            Command::Facts { file } => run_facts(&file),
        }
    }
}

fn run_check(
    paths: &[PathBuf],
    facts_path: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut facts = match facts_path {
        Some(path) if path.exists() => FactStore::load(path)?,
        _ => FactStore::new(),
    };

    // Each directory is one package; packages are analyzed in sorted
    // directory order, so runs are deterministic.
    let mut packages: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for path in paths {
        if path.is_file() && path.extension().is_some_and(|ext| ext == "vo") {
            let parent = path.parent().unwrap_or(Path::new(".")).to_path_buf();
            packages.entry(parent).or_default().push(path.clone());
        } else if path.is_dir() {
            for entry in walkdir(path)? {
                if entry.extension().is_some_and(|ext| ext == "vo") {
                    let parent = entry.parent().unwrap_or(Path::new(".")).to_path_buf();
                    packages.entry(parent).or_default().push(entry);
                }
            }
        }
    }

    let mut total_errors = 0;
    let mut total_warnings = 0;
    let mut files_checked = 0;

    for (dir, mut file_paths) in packages {
        file_paths.sort();
        files_checked += file_paths.len();

        tracing::debug!("analyzing package directory {}", dir.display());

        let mut sources = Vec::new();
        let mut files: Vec<File> = Vec::new();
        let mut parse_diags = DiagnosticBag::new();
        for file_path in &file_paths {
            let source = std::fs::read_to_string(file_path)
                .map_err(|e| format!("failed to read {:?}: {}", file_path, e))?;
            match syntax::parse_source(&source, file_path) {
                Ok(file) => files.push(file),
                Err(diags) => parse_diags.merge(diags),
            }
            sources.push((file_path.clone(), source));
        }

        let mut diags = parse_diags;
        if !files.is_empty() {
            let info = PackageInfo::resolve(&files);
            let pass_diags = Pass::new(&files, &info, &mut facts).run();
            diags.merge(pass_diags);
        }
        diags.sort_by_position();

        total_errors += diags.error_count();
        total_warnings += diags.warning_count();
        display_diagnostics(&diags, &sources, json);
    }

    if let Some(path) = facts_path {
        facts.save(path)?;
    }

    if total_errors > 0 {
        eprintln!(
            "\nChecked {} file(s), found {} error(s), {} warning(s)",
            files_checked, total_errors, total_warnings
        );
        std::process::exit(1);
    } else if total_warnings > 0 {
        println!(
            "Checked {} file(s), no errors ({} warning(s))",
            files_checked, total_warnings
        );
    } else {
        println!("Checked {} file(s), no errors found", files_checked);
    }

    Ok(())
}

fn display_diagnostics(diags: &DiagnosticBag, sources: &[(PathBuf, String)], json: bool) {
    for diag in diags.diagnostics() {
        if json {
            println!("{}", diag.to_json());
        } else {
            let source = sources
                .iter()
                .find(|(path, _)| *path == diag.span.file)
                .map(|(_, source)| source.as_str())
                .unwrap_or("");
            eprintln!("{}", diag.to_human_readable(source));
        }
    }
}

fn run_facts(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = FactStore::load(file)?;
    for (key, fact) in store.function_code_entries() {
        println!("{}: {}", key, fact);
    }
    for (key, fact) in store.error_type_entries() {
        println!("{}: {}", key, fact);
    }
    Ok(())
}

/// Recursively collect the files under a directory, in sorted order
fn walkdir(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files = Vec::new();
    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            files.extend(walkdir(&path)?);
        } else {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
