use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Move global npm packages to a freshly installed Node.js version
///
/// After nvm installs a new Node.js version, run `fix-nvm-update <new-version>`
/// to move every globally installed package (and its `bin` entries) from the
/// previously recorded version into the new one. Each version keeps its own
/// bundled `npm` and `node`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, disable_help_flag = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/fix-nvm-update/config.toml)
    #[arg(short, long, value_name = "FILE", env = "FIX_NVM_UPDATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print usage
    #[arg(short = 'h', long = "help", action = ArgAction::SetTrue)]
    pub help: bool,

    /// Directory name of the newly installed Node.js version (e.g. v20.11.1)
    ///
    /// Unknown options land here too and are rejected as version names.
    #[arg(value_name = "NEW_VERSION", allow_hyphen_values = true)]
    pub versions: Vec<String>,
}
