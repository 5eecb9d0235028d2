use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use toml::Value;

use crate::error::{RelocateError, Result};
use crate::version::VersionId;

/// Persisted fields this tool reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    /// Directory containing one subdirectory per installed version
    Nodes,
    /// Version recorded by the previous successful run
    Last,
}

impl ConfigField {
    pub fn key(self) -> &'static str {
        match self {
            ConfigField::Nodes => "nodes",
            ConfigField::Last => "last",
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The persisted record.
///
/// Fields are kept as raw TOML values so a malformed entry can be reported
/// as it was written. Keys this tool does not know about survive a rewrite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nodes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last: Option<Value>,
    #[serde(flatten)]
    extra: toml::Table,
}

impl Config {
    pub fn get(&self, field: ConfigField) -> Option<&Value> {
        match field {
            ConfigField::Nodes => self.nodes.as_ref(),
            ConfigField::Last => self.last.as_ref(),
        }
    }

    pub fn set(&mut self, field: ConfigField, value: impl Into<String>) {
        let value = Some(Value::String(value.into()));
        match field {
            ConfigField::Nodes => self.nodes = value,
            ConfigField::Last => self.last = value,
        }
    }

    pub fn contains(&self, field: ConfigField) -> bool {
        self.get(field).is_some()
    }

    /// Expanded, absolute `nodes` directory.
    ///
    /// `~` and `$VAR` references are expanded first; anything that is not a
    /// non-empty string, or does not expand to an absolute path, is rejected.
    pub fn nodes(&self, source: &Path) -> Result<PathBuf> {
        let raw = self.non_empty_str(ConfigField::Nodes, source)?;
        let expanded = shellexpand::full(raw)
            .map_err(|_| invalid_field(ConfigField::Nodes, self.get(ConfigField::Nodes), source))?;
        let nodes = PathBuf::from(expanded.into_owned());
        if !nodes.is_absolute() {
            return Err(invalid_field(
                ConfigField::Nodes,
                self.get(ConfigField::Nodes),
                source,
            ));
        }
        Ok(nodes)
    }

    /// `last` as a version id; must be a non-empty, well-formed name.
    pub fn last(&self, source: &Path) -> Result<VersionId> {
        let raw = self.non_empty_str(ConfigField::Last, source)?;
        VersionId::parse(raw)
            .map_err(|_| invalid_field(ConfigField::Last, self.get(ConfigField::Last), source))
    }

    fn non_empty_str(&self, field: ConfigField, source: &Path) -> Result<&str> {
        match self.get(field) {
            Some(Value::String(value)) if !value.is_empty() => Ok(value),
            other => Err(invalid_field(field, other, source)),
        }
    }
}

fn invalid_field(field: ConfigField, value: Option<&Value>, source: &Path) -> RelocateError {
    RelocateError::InvalidConfigField {
        field,
        value: value.map_or_else(|| "<missing>".to_string(), Value::to_string),
        path: source.to_path_buf(),
    }
}

/// Whole-file storage for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Create an empty config file if none exists yet.
    ///
    /// Returns `true` when a file was created.
    pub fn bootstrap(&self) -> Result<bool> {
        if self.exists() {
            return Ok(false);
        }
        tracing::info!(path = %self.path.display(), "config not found, creating an empty one");
        self.save(&Config::default())?;
        Ok(true)
    }

    /// Read and parse the file. Unreadable content is a format error, only
    /// failing to read the bytes at all is reported as I/O.
    pub fn load(&self) -> Result<Config> {
        let bytes = fs::read(&self.path)
            .map_err(|source| RelocateError::io("read config", &self.path, source))?;
        let contents = String::from_utf8(bytes).map_err(|err| self.invalid_format(err))?;
        toml::from_str(&contents).map_err(|err| self.invalid_format(err))
    }

    fn invalid_format(&self, reason: impl fmt::Display) -> RelocateError {
        RelocateError::InvalidConfigFormat {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| RelocateError::io("create config directory", parent, source))?;
        }

        let contents = toml::to_string_pretty(config).map_err(|err| self.invalid_format(err))?;
        fs::write(&self.path, contents)
            .map_err(|source| RelocateError::io("write config", &self.path, source))
    }
}
