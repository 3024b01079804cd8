use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "go-import-subtree",
    version,
    about = "Creates a go file with side-effect imports for all sub-folders in a folder.",
    after_help = "Report bugs to https://github.com/jonasfj/go-import-subtree/issues"
)]
pub struct Cli {
    /// Import sub-trees recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Output file to write import statements to [default: subtree_imports.go]
    #[arg(short, long, value_name = "file")]
    pub output: Option<PathBuf>,

    /// Glob patterns for sub-folders to skip, relative to each folder (e.g. 'testdata', '**/internal')
    #[arg(short, long, value_name = "glob")]
    pub exclude: Vec<String>,

    /// Use a predefined set of options from presets.toml
    #[arg(long)]
    pub preset: Option<String>,

    /// Folders whose sub-folders should be imported
    #[arg(value_name = "folder", required = true)]
    pub folders: Vec<String>,
}
