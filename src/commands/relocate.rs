use crate::mover::FileMover;
use crate::relocator::{Decision, Relocation};
use crate::request::{self, Request};
use crate::ui::{self, Progress};
use crate::Relocator;
use anyhow::Result;

pub fn execute<M: FileMover>(relocator: &mut Relocator<M>, request: &Request) -> Result<()> {
    let target = match request {
        Request::Usage => {
            relocator.run(request)?;
            ui::plain(request::usage());
            return Ok(());
        }
        Request::Relocate(target) => target,
    };

    let plan = match relocator.plan(target)? {
        Decision::NoOp(reason) => {
            ui::info(reason);
            return Ok(());
        }
        Decision::Move(plan) => plan,
    };

    let progress = Progress::new(
        "Relocating",
        format!("global packages from {} to {}", plan.from(), plan.to()),
    );
    match relocator.execute(plan) {
        Ok(relocation) => {
            progress.success("Relocated", Some(summary(&relocation)));
            report(&relocation);
            Ok(())
        }
        Err(err) => {
            // main prints the error itself.
            progress.fail("Failed");
            Err(err.into())
        }
    }
}

fn summary(relocation: &Relocation) -> String {
    format!(
        "({} package(s), {} bin entr{})",
        relocation.packages.len(),
        relocation.binaries.len(),
        if relocation.binaries.len() == 1 { "y" } else { "ies" }
    )
}

fn report(relocation: &Relocation) {
    if !relocation.packages.is_empty() {
        ui::status("Packages", relocation.packages.join(", "));
    }
    if !relocation.binaries.is_empty() {
        ui::status("Binaries", relocation.binaries.join(", "));
    }
    ui::success("Last", format!("recorded {} as last version", relocation.to));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigStore, FsMover, RelocateError};
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Every move fails; everything else hits the real filesystem.
    struct StuckMover;

    impl FileMover for StuckMover {
        fn exists(&self, path: &Path) -> bool {
            FsMover.exists(path)
        }

        fn is_dir(&self, path: &Path) -> bool {
            FsMover.is_dir(path)
        }

        fn is_file(&self, path: &Path) -> bool {
            FsMover.is_file(path)
        }

        fn create_dir(&self, path: &Path) -> io::Result<()> {
            FsMover.create_dir(path)
        }

        fn remove_dir(&self, path: &Path) -> io::Result<()> {
            FsMover.remove_dir(path)
        }

        fn children(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
            FsMover.children(dir)
        }

        fn move_into(&self, _entry: &Path, _dest_dir: &Path) -> io::Result<PathBuf> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    fn install(root: &Path) {
        fs::create_dir_all(root.join("lib/node_modules/npm")).unwrap();
        fs::create_dir_all(root.join("bin")).unwrap();
        fs::write(root.join("bin/npm"), "").unwrap();
        fs::write(root.join("bin/node"), "").unwrap();
    }

    #[test]
    fn failed_move_is_returned_for_the_caller_to_report() {
        let temp = TempDir::new().unwrap();
        let nodes = temp.path().join("nodes");
        install(&nodes.join("A"));
        install(&nodes.join("B"));
        let config = temp.path().join("config.toml");
        fs::write(&config, format!("nodes = {:?}\nlast = \"A\"\n", nodes)).unwrap();
        let mut relocator = Relocator::with_mover(ConfigStore::new(&config), StuckMover, &nodes);

        let err = execute(&mut relocator, &Request::Relocate("B".to_string())).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RelocateError>(),
            Some(RelocateError::MoveFailed { .. })
        ));
        assert_eq!(err.chain().count(), 2);
        assert!(nodes.join("__TMP_NODE").is_dir());
    }
}
