use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

const APP_DIR: &str = env!("CARGO_PKG_NAME");
const CONFIG_FILE: &str = "config.toml";

/// Get the XDG config directory for fix-nvm-update
///
/// Returns `$XDG_CONFIG_HOME/fix-nvm-update` or `~/.config/fix-nvm-update` if not set
pub fn config_dir() -> Result<PathBuf> {
    let base = match non_empty_var("XDG_CONFIG_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => home_dir()?.join(".config"),
    };

    Ok(base.join(APP_DIR))
}

/// Default location of the persisted config file
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Directory holding one subdirectory per installed Node.js version
///
/// Follows nvm's layout: `$NVM_DIR/versions/node`, or `~/.nvm/versions/node`
/// when `NVM_DIR` is not set. A relative `NVM_DIR` is resolved against the
/// working directory, since the result is persisted.
pub fn nvm_nodes_dir() -> Result<PathBuf> {
    let nvm_dir = match non_empty_var("NVM_DIR") {
        Some(dir) => absolute(Path::new(&dir))?,
        None => home_dir()?.join(".nvm"),
    };

    Ok(nvm_dir.join("versions").join("node"))
}

/// Get the home directory
pub fn home_dir() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .context("Failed to get home directory")
        .map(|bd| bd.home_dir().to_path_buf())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().context("Failed to get current directory")?;
    Ok(cwd.join(path))
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_dir() {
        let dir = config_dir().unwrap();
        assert!(dir.ends_with("fix-nvm-update"));
    }

    #[test]
    fn test_config_file() {
        let file = config_file().unwrap();
        assert!(file.ends_with("fix-nvm-update/config.toml"));
    }

    /// Run `f` with `NVM_DIR` set (or removed), restoring it afterwards.
    fn with_nvm_dir<T>(value: Option<&str>, f: impl FnOnce() -> T) -> T {
        let saved = env::var_os("NVM_DIR");
        match value {
            Some(value) => env::set_var("NVM_DIR", value),
            None => env::remove_var("NVM_DIR"),
        }
        let result = f();
        match saved {
            Some(saved) => env::set_var("NVM_DIR", saved),
            None => env::remove_var("NVM_DIR"),
        }
        result
    }

    #[test]
    #[serial]
    fn test_nvm_nodes_dir_from_nvm_dir() {
        let dir = with_nvm_dir(Some("/opt/nvm"), || nvm_nodes_dir().unwrap());
        assert_eq!(dir, PathBuf::from("/opt/nvm/versions/node"));
    }

    #[test]
    #[serial]
    fn test_nvm_nodes_dir_resolves_relative_nvm_dir() {
        let dir = with_nvm_dir(Some("rel/nvm"), || nvm_nodes_dir().unwrap());
        assert!(dir.is_absolute());
        assert_eq!(dir, env::current_dir().unwrap().join("rel/nvm/versions/node"));
    }

    #[test]
    #[serial]
    fn test_nvm_nodes_dir_defaults_under_home() {
        let dir = with_nvm_dir(None, || nvm_nodes_dir().unwrap());
        assert_eq!(dir, home_dir().unwrap().join(".nvm/versions/node"));
    }

    #[test]
    fn test_home_dir() {
        let dir = home_dir().unwrap();
        assert!(dir.is_absolute());
    }
}
