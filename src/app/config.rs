use crate::app::cli::Cli;
use crate::app::error::{Error, Result};
use crate::app::models::{RuntimeConfig, DEFAULT_OUTPUT};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Deserialize, Debug)]
struct PresetsFile {
    #[serde(flatten)]
    presets: HashMap<String, PresetConfig>,
}

#[derive(Deserialize, Debug, Clone, Default)]
struct PresetConfig {
    output: Option<PathBuf>,
    recursive: Option<bool>,
    exclude: Option<Vec<String>>,
}

fn presets_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(
        home.join(".config")
            .join("go-import-subtree")
            .join("presets.toml"),
    )
}

fn load_presets_file(config_path: &Path) -> Result<HashMap<String, PresetConfig>> {
    if !config_path.exists() {
        return Ok(HashMap::new());
    }

    let content = fs::read_to_string(config_path).map_err(|source| Error::ReadPresets {
        path: config_path.to_path_buf(),
        source,
    })?;

    let parsed: PresetsFile = toml::from_str(&content).map_err(|source| Error::ParsePresets {
        path: config_path.to_path_buf(),
        source,
    })?;

    Ok(parsed.presets)
}

fn merge_vecs(preset_vec: Option<Vec<String>>, cli_vec: Vec<String>) -> Vec<String> {
    let mut combined = preset_vec.unwrap_or_default();
    combined.extend(cli_vec);
    // Deduplicate while keeping order
    let mut seen = std::collections::HashSet::new();
    combined.retain(|item| seen.insert(item.clone()));
    combined
}

/// Merges CLI args with the preset named by `--preset`, if any.
pub fn resolve_config(cli: Cli) -> Result<RuntimeConfig> {
    // Without --preset the config file is never read.
    let presets = match (cli.preset.is_some(), presets_path()) {
        (true, Some(path)) => load_presets_file(&path)?,
        (true, None) => {
            log::debug!("No home directory, skipping presets");
            HashMap::new()
        }
        (false, _) => HashMap::new(),
    };
    apply_presets(cli, &presets)
}

fn apply_presets(cli: Cli, presets: &HashMap<String, PresetConfig>) -> Result<RuntimeConfig> {
    let preset = match cli.preset.as_deref() {
        Some(name) => presets
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownPreset(name.to_string()))?,
        None => PresetConfig::default(),
    };

    Ok(RuntimeConfig {
        output: cli
            .output
            .or(preset.output)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
        recursive: cli.recursive || preset.recursive.unwrap_or(false),
        folders: cli.folders,
        exclude: merge_vecs(preset.exclude, cli.exclude),
    })
}
