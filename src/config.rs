use indexmap::IndexMap;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory and the user config dir.
pub const CONFIG_FILE_NAME: &str = "markit.toml";

/// Sections whose name starts with this prefix are loaded but never selectable.
pub const HIDDEN_PREFIX: char = '_';

/// Errors raised while locating or parsing the converter configuration.
///
/// All of them are fatal: without converter definitions there is nothing to run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No configuration file found (searched: {})", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("Failed to read config file at {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to parse config {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Section [{section}] in {origin} is missing the required key '{key}'")]
    MissingKey {
        origin: String,
        section: String,
        key: &'static str,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One section of the configuration document, as written by the user.
#[derive(Debug, Default, Deserialize)]
pub struct RawSection {
    pub extension: Option<String>,
    pub command: Option<String>,
    pub first: Option<String>,
    pub also: Option<String>,
}

/// Parse a configuration document into its sections, keeping document order.
pub fn parse_sections(text: &str, origin: &str) -> Result<IndexMap<String, RawSection>, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::Parse {
        origin: origin.to_string(),
        message: e.message().to_string(),
    })
}

/// Split a whitespace-delimited command string into tokens.
pub fn split_command(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Split a `;`-delimited list of commands. Empty entries are dropped.
pub fn split_command_list(value: &str) -> Vec<Vec<String>> {
    value
        .split(';')
        .map(split_command)
        .filter(|tokens| !tokens.is_empty())
        .collect()
}

/// Candidate configuration paths, most specific first.
///
/// An explicit path short-circuits discovery entirely.
pub fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }

    let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];

    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("markit").join(CONFIG_FILE_NAME));
    }

    // Installed layout: <prefix>/bin/markit next to <prefix>/config/markit.toml
    if let Ok(exe) = std::env::current_exe() {
        if let Some(bin_dir) = exe.parent() {
            candidates.push(bin_dir.join("..").join("config").join(CONFIG_FILE_NAME));
        }
    }

    candidates
}

/// Resolve the configuration file to load.
pub fn locate(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let candidates = candidate_paths(explicit);

    match candidates.iter().find(|path| path.is_file()) {
        Some(found) => {
            log::debug!("Using configuration {}", found.display());
            Ok(found.clone())
        }
        None => Err(ConfigError::NotFound {
            searched: candidates,
        }),
    }
}
