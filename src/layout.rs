use std::path::{Path, PathBuf};

use crate::mover::FileMover;
use crate::version::VersionId;

/// Scratch directory created next to the version directories during a move.
pub const STAGING_DIR: &str = "__TMP_NODE";

/// Package directory bundled with every Node.js version.
pub const NPM: &str = "npm";
/// Node.js executable in a version's `bin` directory.
pub const NODE: &str = "node";

/// Entries that stay with their version in `lib/node_modules`.
pub const PINNED_PACKAGES: &[&str] = &[NPM];
/// Entries that stay with their version in `bin`.
pub const PINNED_BINARIES: &[&str] = &[NPM, NODE];

/// The directory containing one subdirectory per installed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodesLayout {
    root: PathBuf,
}

impl NodesLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn staging(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    pub fn version(&self, version: &VersionId) -> VersionDir {
        VersionDir {
            root: self.root.join(version.as_str()),
        }
    }
}

/// One installed version: `<nodes>/<version>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDir {
    root: PathBuf,
}

impl VersionDir {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<version>/lib/node_modules`
    pub fn modules(&self) -> PathBuf {
        self.root.join("lib").join("node_modules")
    }

    /// `<version>/bin`
    pub fn bin(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn installation<F: FileMover + ?Sized>(&self, fs: &F) -> InstallationState {
        let modules = self.modules();
        let bin = self.bin();
        InstallationState {
            modules_dir: fs.is_dir(&modules),
            bin_dir: fs.is_dir(&bin),
            npm_package: fs.is_dir(&modules.join(NPM)),
            npm_binary: fs.is_file(&bin.join(NPM)),
            node_binary: fs.is_file(&bin.join(NODE)),
        }
    }
}

/// What a version directory looks like on disk right now. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstallationState {
    pub modules_dir: bool,
    pub bin_dir: bool,
    pub npm_package: bool,
    pub npm_binary: bool,
    pub node_binary: bool,
}

impl InstallationState {
    pub fn is_complete(&self) -> bool {
        self.modules_dir && self.bin_dir && self.npm_package && self.npm_binary && self.node_binary
    }

    /// Names of the pieces that are missing, for diagnostics.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (self.modules_dir, "lib/node_modules"),
            (self.bin_dir, "bin"),
            (self.npm_package, "lib/node_modules/npm"),
            (self.npm_binary, "bin/npm"),
            (self.node_binary, "bin/node"),
        ]
        .into_iter()
        .filter(|(present, _)| !present)
        .map(|(_, name)| name)
        .collect()
    }
}
