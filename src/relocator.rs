use std::fmt;
use std::path::{Path, PathBuf};
use toml::Value;

use crate::config::{Config, ConfigField, ConfigStore};
use crate::error::{RelocateError, Result};
use crate::layout::{NodesLayout, PINNED_BINARIES, PINNED_PACKAGES};
use crate::mover::{FileMover, FsMover};
use crate::request::Request;
use crate::version::VersionId;

/// Where an invocation currently is.
///
/// Checking states may exit early to `UsageShown`, `NoOp` or `Failed`.
/// Once `Moving` is entered the only ways out are `UpdatingConfig` or
/// `Failed`, the latter leaving a partial move behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    ValidatingArgs,
    LoadingConfig,
    CheckingVersions,
    CheckingInstallation,
    Moving,
    UpdatingConfig,
    Done,
    UsageShown,
    NoOp,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Start => "start",
            Phase::ValidatingArgs => "validating-args",
            Phase::LoadingConfig => "loading-config",
            Phase::CheckingVersions => "checking-versions",
            Phase::CheckingInstallation => "checking-installation",
            Phase::Moving => "moving",
            Phase::UpdatingConfig => "updating-config",
            Phase::Done => "done",
            Phase::UsageShown => "usage-shown",
            Phase::NoOp => "no-op",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Successful endings that do not move anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoOp {
    /// No `last` was recorded; the target is now the baseline.
    FirstRun { recorded: VersionId },
    /// The target already is `last`.
    SameVersion { version: VersionId },
    /// nvm has not finished installing the target yet.
    TargetNotInstalled {
        version: VersionId,
        missing: Vec<&'static str>,
    },
}

impl fmt::Display for NoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoOp::FirstRun { recorded } => {
                write!(f, "no last version recorded, recorded \"{recorded}\" as last")
            }
            NoOp::SameVersion { version } => write!(f, "\"{version}\" is not a new version"),
            NoOp::TargetNotInstalled { version, missing } => write!(
                f,
                "new version \"{version}\" not yet installed (missing {})",
                missing.join(", ")
            ),
        }
    }
}

/// Result of a completed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub from: VersionId,
    pub to: VersionId,
    /// Package directories that landed in the new `lib/node_modules`
    pub packages: Vec<String>,
    /// Entries that landed in the new `bin`
    pub binaries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    UsageShown,
    NoOp(NoOp),
    Moved(Relocation),
}

/// Everything checked; ready to move. Carries the loaded config so it can
/// be written back once the move is done.
#[derive(Debug, Clone)]
pub struct RelocationPlan {
    config: Config,
    layout: NodesLayout,
    from: VersionId,
    to: VersionId,
}

impl RelocationPlan {
    pub fn from(&self) -> &VersionId {
        &self.from
    }

    pub fn to(&self) -> &VersionId {
        &self.to
    }

    pub fn staging(&self) -> PathBuf {
        self.layout.staging()
    }
}

#[derive(Debug, Clone)]
pub enum Decision {
    NoOp(NoOp),
    Move(RelocationPlan),
}

/// Moves global packages from the previously recorded Node.js version to a
/// new one, keeping each version's own `npm` (and `node` binary) in place.
pub struct Relocator<M: FileMover = FsMover> {
    store: ConfigStore,
    fs: M,
    default_nodes: PathBuf,
    phase: Phase,
}

impl Relocator<FsMover> {
    pub fn new(store: ConfigStore, default_nodes: impl Into<PathBuf>) -> Self {
        Self::with_mover(store, FsMover, default_nodes)
    }
}

impl<M: FileMover> Relocator<M> {
    pub fn with_mover(store: ConfigStore, fs: M, default_nodes: impl Into<PathBuf>) -> Self {
        Self {
            store,
            fs,
            default_nodes: default_nodes.into(),
            phase: Phase::Start,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn run(&mut self, request: &Request) -> Result<Outcome> {
        match request {
            Request::Usage => {
                self.enter(Phase::UsageShown);
                Ok(Outcome::UsageShown)
            }
            Request::Relocate(target) => self.relocate(target),
        }
    }

    pub fn relocate(&mut self, target: &str) -> Result<Outcome> {
        match self.plan(target)? {
            Decision::NoOp(reason) => Ok(Outcome::NoOp(reason)),
            Decision::Move(plan) => self.execute(plan).map(Outcome::Moved),
        }
    }

    /// Run every check. The only writes are config bootstrapping, defaulting
    /// `nodes`, and recording `last` on a first run.
    pub fn plan(&mut self, target: &str) -> Result<Decision> {
        let result = self.check(target);
        match &result {
            Ok(Decision::NoOp(reason)) => {
                tracing::debug!(%reason, "nothing to move");
                self.enter(Phase::NoOp);
            }
            Ok(Decision::Move(_)) => {}
            Err(_) => self.enter(Phase::Failed),
        }
        result
    }

    /// Perform the staged move and record the new version.
    pub fn execute(&mut self, plan: RelocationPlan) -> Result<Relocation> {
        let staging = plan.staging();
        let result = self.move_and_record(plan);
        if let Err(err) = &result {
            self.enter(Phase::Failed);
            if self.fs.exists(&staging) {
                tracing::warn!(
                    staging = %staging.display(),
                    error = %err,
                    "relocation aborted part way; staging directory left for manual recovery"
                );
            }
        }
        result
    }

    fn check(&mut self, target: &str) -> Result<Decision> {
        self.enter(Phase::ValidatingArgs);
        let to = VersionId::parse(target)?;

        self.enter(Phase::LoadingConfig);
        let mut config = self.load_config()?;
        let nodes = config.nodes(self.store.path())?;

        self.enter(Phase::CheckingVersions);
        if !config.contains(ConfigField::Last) {
            config.set(ConfigField::Last, to.as_str());
            self.store.save(&config)?;
            tracing::info!(
                last = %to,
                path = %self.store.path().display(),
                "recorded first version"
            );
            return Ok(Decision::NoOp(NoOp::FirstRun { recorded: to }));
        }

        if config.get(ConfigField::Last).and_then(Value::as_str) == Some(to.as_str()) {
            return Ok(Decision::NoOp(NoOp::SameVersion { version: to }));
        }

        let from = config.last(self.store.path())?;
        let layout = NodesLayout::new(nodes);

        self.enter(Phase::CheckingInstallation);
        let staging = layout.staging();
        if self.fs.exists(&staging) {
            return Err(RelocateError::StagingConflict {
                path: staging,
                config: self.store.path().to_path_buf(),
            });
        }

        let source = layout.version(&from);
        if !source.installation(&self.fs).is_complete() {
            return Err(RelocateError::SourceNotInstalled {
                version: from.to_string(),
                nodes: layout.root().to_path_buf(),
                config: self.store.path().to_path_buf(),
            });
        }

        let target_state = layout.version(&to).installation(&self.fs);
        if !target_state.is_complete() {
            return Ok(Decision::NoOp(NoOp::TargetNotInstalled {
                version: to,
                missing: target_state.missing(),
            }));
        }

        let dest = layout.version(&to);
        self.ensure_vacant(&source.modules(), &dest.modules(), PINNED_PACKAGES)?;
        self.ensure_vacant(&source.bin(), &dest.bin(), PINNED_BINARIES)?;

        Ok(Decision::Move(RelocationPlan {
            config,
            layout,
            from,
            to,
        }))
    }

    fn load_config(&self) -> Result<Config> {
        self.store.bootstrap()?;
        let mut config = self.store.load()?;

        if !config.contains(ConfigField::Nodes) {
            let nodes = self.default_nodes.to_string_lossy().into_owned();
            tracing::info!(nodes = %nodes, "no nodes directory configured, using nvm default");
            config.set(ConfigField::Nodes, nodes);
            self.store.save(&config)?;
        }

        Ok(config)
    }

    /// Fail before any mutation if an entry that will move would clash with
    /// a directory in the destination. Plain files and symlinks are replaced
    /// by the move.
    fn ensure_vacant(&self, source: &Path, dest: &Path, pinned: &[&str]) -> Result<()> {
        let entries = self
            .fs
            .children(source)
            .map_err(|err| RelocateError::io("list", source, err))?;

        for entry in entries {
            let Some(name) = entry.file_name() else {
                continue;
            };
            if pinned.iter().any(|p| name == *p) {
                continue;
            }
            let occupied = dest.join(name);
            let clashes = self.fs.is_dir(&occupied) || self.fs.is_dir(&entry);
            if self.fs.exists(&occupied) && clashes {
                return Err(RelocateError::DestinationOccupied { path: occupied });
            }
        }
        Ok(())
    }

    fn move_and_record(&mut self, mut plan: RelocationPlan) -> Result<Relocation> {
        self.enter(Phase::Moving);
        let staging = plan.staging();
        self.fs
            .create_dir(&staging)
            .map_err(|err| RelocateError::io("create staging directory", &staging, err))?;
        tracing::info!(staging = %staging.display(), "created staging directory");

        let source = plan.layout.version(&plan.from);
        let dest = plan.layout.version(&plan.to);
        let packages = self.shuffle(&source.modules(), &dest.modules(), &staging, PINNED_PACKAGES)?;
        let binaries = self.shuffle(&source.bin(), &dest.bin(), &staging, PINNED_BINARIES)?;

        self.enter(Phase::UpdatingConfig);
        plan.config.set(ConfigField::Last, plan.to.as_str());
        self.store.save(&plan.config)?;
        tracing::info!(last = %plan.to, "recorded new version as last");

        self.fs
            .remove_dir(&staging)
            .map_err(|err| RelocateError::io("remove staging directory", &staging, err))?;
        tracing::info!(staging = %staging.display(), "removed staging directory");

        self.enter(Phase::Done);
        Ok(Relocation {
            from: plan.from,
            to: plan.to,
            packages,
            binaries,
        })
    }

    /// Three moves through `staging`: everything out of `source`, the pinned
    /// entries back into `source`, the rest into `dest`.
    fn shuffle(
        &self,
        source: &Path,
        dest: &Path,
        staging: &Path,
        pinned: &[&str],
    ) -> Result<Vec<String>> {
        for entry in self.list(source, staging)? {
            self.move_entry(&entry, staging, staging)?;
        }

        for name in pinned {
            self.move_entry(&staging.join(name), source, staging)?;
        }

        let mut moved = Vec::new();
        for entry in self.list(staging, staging)? {
            let target = self.move_entry(&entry, dest, staging)?;
            if let Some(name) = target.file_name() {
                moved.push(name.to_string_lossy().into_owned());
            }
        }
        Ok(moved)
    }

    fn list(&self, dir: &Path, staging: &Path) -> Result<Vec<PathBuf>> {
        self.fs
            .children(dir)
            .map_err(|source| RelocateError::MoveFailed {
                from: dir.to_path_buf(),
                to: staging.to_path_buf(),
                staging: staging.to_path_buf(),
                source,
            })
    }

    fn move_entry(&self, entry: &Path, dest: &Path, staging: &Path) -> Result<PathBuf> {
        let target = self
            .fs
            .move_into(entry, dest)
            .map_err(|source| RelocateError::MoveFailed {
                from: entry.to_path_buf(),
                to: dest.to_path_buf(),
                staging: staging.to_path_buf(),
                source,
            })?;
        tracing::debug!(from = %entry.display(), to = %target.display(), "moved");
        Ok(target)
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(from = %self.phase, to = %phase, "phase");
        self.phase = phase;
    }
}
