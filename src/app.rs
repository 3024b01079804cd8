// Declare modules
pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod gosyntax;
pub mod models;
pub mod package;
pub mod scanner;
pub mod writer;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::path::{Component, Path, PathBuf};

use self::cli::Cli;
use self::config::resolve_config;
use self::formatter::OutputGenerator;
use self::models::{Package, RuntimeConfig};
use self::package::{join_import_path, resolve_package};
use self::scanner::Scanner;
use self::writer::write_output;

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    // 1. Parse Args
    let args = Cli::parse();

    // 2. Identify the current package
    let current_dir = env::current_dir().context("Unable to obtain current working directory")?;
    let package = resolve_package(&current_dir).context("Failed to import current package")?;
    log::info!("Identified current package as: {}", package.name);
    log::info!("Determined current import path: {}", package.import_path);

    // 3. Resolve Configuration
    let config = resolve_config(args)?;

    // 4. Scan, render and format
    let source = generate(&current_dir, &package, &config)?;

    // 5. Write output
    write_output(&current_dir.join(&config.output), source.as_bytes())?;

    Ok(())
}

/// Produces the formatted Go source for `config.folders`, in argument order.
pub fn generate(current_dir: &Path, package: &Package, config: &RuntimeConfig) -> Result<String> {
    let scanner = Scanner::new(config)?;

    log::info!("Finding sub-packages to import:");
    let mut entries = Vec::new();
    for folder in &config.folders {
        let folder = relative_folder(folder);
        let import_path = join_import_path(&package.import_path, &slash_folder(&folder));
        entries.extend(scanner.scan(&current_dir.join(&folder), &import_path)?);
    }

    let raw = OutputGenerator::generate_source(&package.name, &entries);
    OutputGenerator::format_source(&raw).context("Failed to format source, internal error")
}

/// Folder arguments always live under the working directory; a leading root
/// or drive prefix is dropped so `/plugins` means `./plugins`.
fn relative_folder(folder: &str) -> PathBuf {
    Path::new(folder)
        .components()
        .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir))
        .collect()
}

fn slash_folder(folder: &Path) -> String {
    folder
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
