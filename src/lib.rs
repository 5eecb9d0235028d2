// Public API
pub mod cli;
pub mod commands;

// Core domain types
mod config;
mod error;
mod layout;
mod mover;
mod relocator;
mod request;
mod ui;
mod util;
mod version;

// Re-export main types
pub use config::{Config, ConfigField, ConfigStore};
pub use error::{RelocateError, Result};
pub use layout::{InstallationState, NodesLayout, VersionDir, STAGING_DIR};
pub use mover::{FileMover, FsMover};
pub use relocator::{Decision, NoOp, Outcome, Phase, Relocation, RelocationPlan, Relocator};
pub use request::{usage, Request};
pub use version::VersionId;
