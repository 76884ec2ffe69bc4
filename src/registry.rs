use crate::config::{self, ConfigError, HIDDEN_PREFIX};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

/// One output format and the external commands that produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterSpec {
    pub name: String,
    /// Output suffix, without the leading dot
    pub extension: String,
    /// Tokens appended after the fixed converter prefix
    pub main_command: Vec<String>,
    /// Run before the main command; the last one's stdout is piped into it
    pub pre_commands: Vec<Vec<String>>,
    /// Run after the main command with `{outfile}` substituted
    pub post_commands: Vec<Vec<String>>,
}

impl ConverterSpec {
    pub fn is_hidden(&self) -> bool {
        is_hidden_name(&self.name)
    }

    /// Display label, e.g. `pdf` -> `Pdf`, `html-slides` -> `Html-Slides`.
    pub fn title(&self) -> String {
        title_case(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Enabled(ConverterSpec),
    Disabled,
}

impl Entry {
    pub fn spec(&self) -> Option<&ConverterSpec> {
        match self {
            Entry::Enabled(spec) => Some(spec),
            Entry::Disabled => None,
        }
    }
}

/// All converters known from configuration, in configuration order.
///
/// Entries are never removed: deselected converters are flipped to
/// [`Entry::Disabled`] so the set of known names stays stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: IndexMap<String, Entry>,
}

impl Registry {
    /// Load converter definitions from a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let registry = Self::from_toml_str(&text, &path.display().to_string())
            .with_context(|| format!("Invalid converter configuration: {}", path.display()))?;

        log::debug!(
            "Loaded {} converters from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Parse converter definitions from an in-memory document.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let sections = config::parse_sections(text, origin)?;
        let mut entries = IndexMap::with_capacity(sections.len());

        for (name, section) in sections {
            let extension = section.extension.ok_or_else(|| ConfigError::MissingKey {
                origin: origin.to_string(),
                section: name.clone(),
                key: "extension",
            })?;
            let command = section.command.ok_or_else(|| ConfigError::MissingKey {
                origin: origin.to_string(),
                section: name.clone(),
                key: "command",
            })?;

            let spec = ConverterSpec {
                name: name.clone(),
                extension,
                main_command: config::split_command(&command),
                pre_commands: section
                    .first
                    .as_deref()
                    .map(config::split_command_list)
                    .unwrap_or_default(),
                post_commands: section
                    .also
                    .as_deref()
                    .map(config::split_command_list)
                    .unwrap_or_default(),
            };
            entries.insert(name, Entry::Enabled(spec));
        }

        Ok(Self { entries })
    }

    pub fn from_specs(specs: impl IntoIterator<Item = ConverterSpec>) -> Self {
        let entries = specs
            .into_iter()
            .map(|spec| (spec.name.clone(), Entry::Enabled(spec)))
            .collect();
        Self { entries }
    }

    /// Number of sections, hidden and disabled ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// Names a user may pass on the command line, in configuration order.
    pub fn selectable_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|name| !is_hidden_name(name))
    }

    pub fn sorted_selectable_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.selectable_names().collect();
        names.sort_unstable();
        names
    }

    pub fn is_selectable(&self, name: &str) -> bool {
        !is_hidden_name(name) && self.entries.contains_key(name)
    }

    /// Mark a converter as not taking part in this run.
    pub fn disable(&mut self, name: &str) {
        if let Some(entry) = self.entries.get_mut(name) {
            *entry = Entry::Disabled;
        }
    }

    /// Converters that will run, in configuration order.
    pub fn active(&self) -> impl Iterator<Item = &ConverterSpec> {
        self.entries
            .values()
            .filter_map(Entry::spec)
            .filter(|spec| !spec.is_hidden())
    }
}

pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with(HIDDEN_PREFIX)
}

fn title_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut word_start = true;

    for ch in name.chars() {
        if ch.is_alphabetic() {
            if word_start {
                result.extend(ch.to_uppercase());
            } else {
                result.extend(ch.to_lowercase());
            }
            word_start = false;
        } else {
            result.push(ch);
            word_start = true;
        }
    }

    result
}
