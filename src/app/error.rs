use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read presets at {path:?}")]
    ReadPresets {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse presets at {path:?}")]
    ParsePresets {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("No preset named {0:?}")]
    UnknownPreset(String),
    #[error("Invalid glob pattern: {pattern}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Couldn't read {path:?}")]
    ReadPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no buildable Go source files in {0:?}")]
    NoGoFiles(PathBuf),
    #[error("found packages {first} ({first_file}) and {second} ({second_file}) in {dir:?}")]
    MultiplePackages {
        dir: PathBuf,
        first: String,
        first_file: String,
        second: String,
        second_file: String,
    },
    #[error("{0:?}: expected 'package' clause")]
    MissingPackageClause(PathBuf),
    #[error("{0:?}: go.mod has no module directive")]
    MissingModuleDirective(PathBuf),
    #[error("{0:?} is not inside a Go module or a GOPATH source root")]
    NoImportPath(PathBuf),

    #[error("Couldn't list contents of folder: {folder:?}")]
    ListFolder {
        folder: PathBuf,
        #[source]
        source: ignore::Error,
    },
    #[error("Couldn't list contents of folder: {0:?}: not a directory")]
    NotADirectory(PathBuf),
    #[error("Path is not valid UTF-8: {0:?}")]
    NonUtf8Path(PathBuf),

    #[error("{line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Failed to write output file {path:?}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
