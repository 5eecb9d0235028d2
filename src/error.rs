use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigField;

/// Everything that can stop a relocation.
///
/// Validation variants are raised before the filesystem is touched. Only
/// `MoveFailed` and `Io` can happen once the staging directory exists.
#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("wrong new Node version format (\"{value}\")")]
    InvalidVersionFormat { value: String },

    #[error("wrong config format (in {path:?}): {reason}")]
    InvalidConfigFormat { path: PathBuf, reason: String },

    #[error("wrong \"{field}\" value (in {path:?}): {value}")]
    InvalidConfigField {
        field: ConfigField,
        value: String,
        path: PathBuf,
    },

    #[error(
        "staging directory already exists ({path:?}, nodes from {config:?}); \
         recover the interrupted run by hand"
    )]
    StagingConflict { path: PathBuf, config: PathBuf },

    #[error("version \"{version}\" is not installed under {nodes:?} (last version in {config:?})")]
    SourceNotInstalled {
        version: String,
        nodes: PathBuf,
        config: PathBuf,
    },

    #[error("{path:?} already exists in the new version, refusing to overwrite it")]
    DestinationOccupied { path: PathBuf },

    #[error("failed to move {from:?} into {to:?}; staging directory left at {staging:?}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        staging: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to {action} {path:?}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RelocateError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = RelocateError> = std::result::Result<T, E>;
