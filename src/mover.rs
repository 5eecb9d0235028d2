use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Filesystem operations the relocator needs.
///
/// Everything is blocking and runs strictly in sequence.
pub trait FileMover {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> io::Result<()>;

    /// Immediate children of `dir`, sorted by name, hidden entries included.
    fn children(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Move `entry` into `dest_dir`, keeping its file name.
    ///
    /// An existing file or symlink of that name is replaced. Directories are
    /// never replaced, nor replace anything.
    fn move_into(&self, entry: &Path, dest_dir: &Path) -> io::Result<PathBuf>;
}

/// [`FileMover`] backed by `std::fs` renames.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMover;

impl FileMover for FsMover {
    fn exists(&self, path: &Path) -> bool {
        // Dangling symlinks count as present.
        path.symlink_metadata().is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }

    fn children(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .map(|entry| entry.map(walkdir::DirEntry::into_path).map_err(io::Error::from))
            .collect()
    }

    fn move_into(&self, entry: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
        let name = entry.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", entry.display()),
            )
        })?;
        let target = dest_dir.join(name);

        // rename(2) replaces files and symlinks in place, but would also
        // swap out an empty directory.
        if self.exists(&target) && (self.is_dir(&target) || self.is_dir(entry)) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", target.display()),
            ));
        }

        fs::rename(entry, &target)?;
        Ok(target)
    }
}
