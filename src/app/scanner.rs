use crate::app::error::{Error, Result};
use crate::app::models::{ImportEntry, RuntimeConfig};
use crate::app::package::join_import_path;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};
use pathdiff::diff_paths;
use std::path::Path;

pub struct Scanner {
    recursive: bool,
    exclude_set: GlobSet,
}

impl Scanner {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        Ok(Self {
            recursive: config.recursive,
            exclude_set: build_globset(&config.exclude)?,
        })
    }

    /// Lists the sub-folders of `folder` depth-first, parents before children,
    /// siblings by name. Each becomes an import path under `import_path`.
    pub fn scan(&self, folder: &Path, import_path: &str) -> Result<Vec<ImportEntry>> {
        let mut entries = Vec::new();

        // Every filter off: hidden and gitignored folders are still packages.
        let exclude_set = self.exclude_set.clone();
        let root = folder.to_path_buf();
        let walker = WalkBuilder::new(folder)
            .standard_filters(false)
            .follow_links(false)
            .max_depth(if self.recursive { None } else { Some(1) })
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| !is_excluded(&exclude_set, &root, entry))
            .build();

        for result in walker {
            let entry = result.map_err(|source| Error::ListFolder {
                folder: folder.to_path_buf(),
                source,
            })?;
            if let Some(processed) = self.process_entry(folder, import_path, &entry)? {
                log::info!("{}", processed.import_path);
                entries.push(processed);
            }
        }

        Ok(entries)
    }

    fn process_entry(
        &self,
        folder: &Path,
        import_path: &str,
        entry: &DirEntry,
    ) -> Result<Option<ImportEntry>> {
        if entry.depth() == 0 {
            // The folder itself must be listable, even through a symlink.
            if !entry.path().is_dir() {
                return Err(Error::NotADirectory(folder.to_path_buf()));
            }
            return Ok(None);
        }

        // Files and symlinks are not packages.
        if !entry.file_type().is_some_and(|t| t.is_dir()) {
            return Ok(None);
        }

        let relative = relative_slash_path(folder, entry.path())?;
        Ok(Some(ImportEntry {
            import_path: join_import_path(import_path, &relative),
            path: entry.path().to_path_buf(),
            depth: entry.depth(),
        }))
    }
}

fn is_excluded(exclude_set: &GlobSet, root: &Path, entry: &DirEntry) -> bool {
    if entry.depth() == 0 || exclude_set.is_empty() {
        return false;
    }
    let Some(relative) = diff_paths(entry.path(), root) else {
        return false;
    };
    let excluded = exclude_set.is_match(&relative);
    if excluded {
        log::debug!("Excluding {}", relative.display());
    }
    excluded
}

fn relative_slash_path(root: &Path, path: &Path) -> Result<String> {
    let relative = diff_paths(path, root).ok_or_else(|| Error::NonUtf8Path(path.to_path_buf()))?;
    let parts = relative
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .ok_or_else(|| Error::NonUtf8Path(path.to_path_buf()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}

/// Helper to build efficient glob sets
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).map_err(|source| Error::InvalidGlob {
            pattern: pat.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| Error::InvalidGlob {
        pattern: patterns.join(", "),
        source,
    })
}
