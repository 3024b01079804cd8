use std::path::PathBuf;

pub const DEFAULT_OUTPUT: &str = "subtree_imports.go";

/// Represents the final configuration after merging presets and CLI args.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub output: PathBuf,
    pub recursive: bool,
    pub folders: Vec<String>,
    pub exclude: Vec<String>,
}

/// The Go package in the working directory, which the generated file joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub import_path: String,
}

/// Represents a single sub-folder discovered during the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub import_path: String,
    pub path: PathBuf,
    pub depth: usize,
}
