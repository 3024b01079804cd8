use crate::app::error::{Error, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Creates or truncates `path` and writes `contents`; new files get mode 0644.
pub fn write_output(path: &Path, contents: &[u8]) -> Result<()> {
    let write_error = |source| Error::WriteOutput {
        path: path.to_path_buf(),
        source,
    };

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    let mut file = options.open(path).map_err(write_error)?;
    file.write_all(contents).map_err(write_error)?;
    Ok(())
}
