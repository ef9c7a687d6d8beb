//! Move files to the recoverable trash location.
//!
//! Windows hands the path to `SHFileOperationW(FO_DELETE)` with
//! `FOF_ALLOWUNDO`, i.e. the Recycle Bin.  Other hosts use the freedesktop
//! home trash: the file goes to `Trash/files/` and a matching
//! `Trash/info/<name>.trashinfo` records where it came from.  Files on
//! another filesystem are copied into the trash and then deleted.

use std::path::Path;

use crate::errors::FileRemoveError;

/// UI behaviour for [`remove_to_trash`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoveOptions {
    /// Ask the user before deleting.
    pub confirm: bool,
    /// Show the shell's progress dialog.
    pub show_progress: bool,
}

/// Move `path` to the trash.
pub fn remove_to_trash(path: &Path, options: RemoveOptions) -> Result<(), FileRemoveError> {
    if std::fs::symlink_metadata(path).is_err() {
        return Err(FileRemoveError::NotFound(path.to_path_buf()));
    }
    platform::remove(path, options)?;
    log::debug!("{} moved to trash", path.display());
    Ok(())
}

#[cfg(windows)]
mod platform {
    use std::os::windows::ffi::OsStrExt;
    use std::path::Path;

    use windows::core::PCWSTR;
    use windows::Win32::UI::Shell::{SHFileOperationW, SHFILEOPSTRUCTW};

    use super::RemoveOptions;
    use crate::errors::FileRemoveError;

    const FO_DELETE: u32 = 0x0003;
    const FOF_SILENT: u16 = 0x0004;
    const FOF_NOCONFIRMATION: u16 = 0x0010;
    const FOF_ALLOWUNDO: u16 = 0x0040;
    const FOF_NOERRORUI: u16 = 0x0400;

    pub(super) fn operation_flags(options: RemoveOptions) -> u16 {
        let mut flags = FOF_ALLOWUNDO;
        if !options.confirm {
            flags |= FOF_NOCONFIRMATION;
        }
        if !options.show_progress {
            flags |= FOF_SILENT | FOF_NOERRORUI;
        }
        flags
    }

    pub(super) fn remove(path: &Path, options: RemoveOptions) -> Result<(), FileRemoveError> {
        let absolute = std::path::absolute(path).map_err(|e| FileRemoveError::OperationFailed {
            code: e.raw_os_error().unwrap_or(-1),
            message: format!("{}: {e}", path.display()),
        })?;
        // pFrom is a list of paths terminated by an extra NUL.
        let mut from: Vec<u16> = absolute.as_os_str().encode_wide().collect();
        from.extend_from_slice(&[0, 0]);

        let mut op = SHFILEOPSTRUCTW {
            wFunc: FO_DELETE,
            pFrom: PCWSTR(from.as_ptr()),
            fFlags: operation_flags(options),
            ..Default::default()
        };

        let rc = unsafe { SHFileOperationW(&mut op) };
        if rc != 0 {
            return Err(FileRemoveError::OperationFailed {
                code: rc,
                message: format!("SHFileOperationW failed for {}", absolute.display()),
            });
        }
        if op.fAnyOperationsAborted.as_bool() {
            return Err(FileRemoveError::OperationFailed {
                code: 0,
                message: format!("deletion of {} was cancelled", absolute.display()),
            });
        }
        Ok(())
    }
}

#[cfg(not(windows))]
mod platform {
    use std::path::Path;

    use super::{HomeTrash, RemoveOptions};
    use crate::errors::FileRemoveError;

    pub(super) fn remove(path: &Path, _options: RemoveOptions) -> Result<(), FileRemoveError> {
        HomeTrash::from_env()?.trash(path).map(|_| ())
    }
}

#[cfg(not(windows))]
pub use home::HomeTrash;

#[cfg(not(windows))]
mod home {
    use std::fs::{self, File, OpenOptions};
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};

    use chrono::Local;

    use crate::errors::FileRemoveError;
    use crate::uri::percent_encode_path;

    /// `rename(2)` across filesystems; 18 on Linux, macOS and the BSDs.
    const EXDEV: i32 = 18;

    /// A freedesktop trash directory (`files/` + `info/`).
    #[derive(Debug, Clone)]
    pub struct HomeTrash {
        root: PathBuf,
    }

    fn io_failure(path: &Path, err: io::Error) -> FileRemoveError {
        FileRemoveError::OperationFailed {
            code: err.raw_os_error().unwrap_or(-1),
            message: format!("{}: {err}", path.display()),
        }
    }

    impl HomeTrash {
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self { root: root.into() }
        }

        /// `$XDG_DATA_HOME/Trash`.
        pub fn from_env() -> Result<Self, FileRemoveError> {
            dirs::data_dir()
                .map(|d| Self::new(d.join("Trash")))
                .ok_or_else(|| FileRemoveError::TrashUnavailable("no XDG data directory".into()))
        }

        pub fn files_dir(&self) -> PathBuf {
            self.root.join("files")
        }

        pub fn info_dir(&self) -> PathBuf {
            self.root.join("info")
        }

        /// Move `path` into the trash, returning its new location.
        pub fn trash(&self, path: &Path) -> Result<PathBuf, FileRemoveError> {
            let source_path = std::path::absolute(path).map_err(|e| io_failure(path, e))?;
            let base = source_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| FileRemoveError::OperationFailed {
                    code: -1,
                    message: format!("{} has no file name", source_path.display()),
                })?;

            let (files, info) = (self.files_dir(), self.info_dir());
            fs::create_dir_all(&files).map_err(|e| io_failure(&files, e))?;
            fs::create_dir_all(&info).map_err(|e| io_failure(&info, e))?;

            let contents = format!(
                "[Trash Info]\nPath={}\nDeletionDate={}\n",
                percent_encode_path(&source_path),
                Local::now().format("%Y-%m-%dT%H:%M:%S")
            );

            let (name, info_path) =
                claim_name(&info, &base, |file| file.write_all(contents.as_bytes()))?;

            let dest = files.join(&name);
            if let Err(e) = move_into(&source_path, &dest) {
                // The info file stays only when something landed in files/.
                if fs::symlink_metadata(&dest).is_err() {
                    let _ = fs::remove_file(&info_path);
                }
                return Err(io_failure(&source_path, e));
            }
            Ok(dest)
        }
    }

    /// Claim a free `<base>[_n]` name by creating its info file exclusively,
    /// then fill it with `write`.  A file that fails to fill is removed.
    pub(super) fn claim_name(
        info: &Path,
        base: &str,
        write: impl Fn(&mut File) -> io::Result<()>,
    ) -> Result<(String, PathBuf), FileRemoveError> {
        let mut n = 0u32;
        loop {
            let name = if n == 0 { base.to_owned() } else { format!("{base}_{n}") };
            let info_path = info.join(format!("{name}.trashinfo"));
            match OpenOptions::new().write(true).create_new(true).open(&info_path) {
                Ok(mut file) => {
                    if let Err(e) = write(&mut file) {
                        drop(file);
                        let _ = fs::remove_file(&info_path);
                        return Err(io_failure(&info_path, e));
                    }
                    return Ok((name, info_path));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(io_failure(&info_path, e)),
            }
        }
    }

    /// `rename`, falling back to copy and delete when `dest` is on another
    /// filesystem.
    pub(super) fn move_into(source: &Path, dest: &Path) -> io::Result<()> {
        match fs::rename(source, dest) {
            Err(e) if e.raw_os_error() == Some(EXDEV) => {
                log::debug!("{} is on another device, copying into trash", source.display());
                move_across_devices(source, dest)
            }
            other => other,
        }
    }

    pub(super) fn move_across_devices(source: &Path, dest: &Path) -> io::Result<()> {
        let is_dir = fs::symlink_metadata(source)?.is_dir();
        if let Err(e) = copy_tree(source, dest) {
            let _ = remove_tree(dest);
            return Err(e);
        }
        if is_dir {
            // A partial removal keeps the complete copy in the trash.
            fs::remove_dir_all(source)
        } else {
            fs::remove_file(source).inspect_err(|_| {
                let _ = fs::remove_file(dest);
            })
        }
    }

    fn copy_tree(source: &Path, dest: &Path) -> io::Result<()> {
        let meta = fs::symlink_metadata(source)?;
        let kind = meta.file_type();
        if kind.is_symlink() {
            #[cfg(unix)]
            return std::os::unix::fs::symlink(fs::read_link(source)?, dest);
        }
        if kind.is_dir() {
            fs::create_dir(dest)?;
            for entry in fs::read_dir(source)? {
                let entry = entry?;
                copy_tree(&entry.path(), &dest.join(entry.file_name()))?;
            }
            fs::set_permissions(dest, meta.permissions())
        } else {
            fs::copy(source, dest).map(|_| ())
        }
    }

    fn remove_tree(path: &Path) -> io::Result<()> {
        if fs::symlink_metadata(path)?.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        match remove_to_trash(&missing, RemoveOptions::default()) {
            Err(FileRemoveError::NotFound(p)) => assert_eq!(p, missing),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(windows)]
    #[test]
    fn test_operation_flags() {
        let silent = platform::operation_flags(RemoveOptions::default());
        assert_eq!(silent, 0x0040 | 0x0010 | 0x0004 | 0x0400);
        let interactive = platform::operation_flags(RemoveOptions {
            confirm: true,
            show_progress: true,
        });
        assert_eq!(interactive, 0x0040);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_home_trash_moves_file_and_writes_info() {
        let dir = tempfile::tempdir().unwrap();
        let trash = HomeTrash::new(dir.path().join("Trash"));
        let victim = dir.path().join("report final.txt");
        std::fs::write(&victim, b"data").unwrap();

        let dest = trash.trash(&victim).unwrap();

        assert!(!victim.exists());
        assert_eq!(std::fs::read(&dest).unwrap(), b"data");
        let info =
            std::fs::read_to_string(trash.info_dir().join("report final.txt.trashinfo")).unwrap();
        assert!(info.starts_with("[Trash Info]\n"));
        assert!(info.contains("report%20final.txt\n"));
        assert!(info.contains("DeletionDate="));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_home_trash_suffixes_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let trash = HomeTrash::new(dir.path().join("Trash"));

        for _ in 0..3 {
            let victim = dir.path().join("a.txt");
            std::fs::write(&victim, b"x").unwrap();
            trash.trash(&victim).unwrap();
        }

        for name in ["a.txt", "a.txt_1", "a.txt_2"] {
            assert!(trash.files_dir().join(name).is_file(), "{name}");
            assert!(trash.info_dir().join(format!("{name}.trashinfo")).is_file());
        }
    }

    #[cfg(not(windows))]
    #[test]
    fn test_failed_info_write_releases_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = home::claim_name(dir.path(), "a.txt", |_| {
            Err(std::io::Error::new(std::io::ErrorKind::WriteZero, "disk full"))
        })
        .unwrap_err();

        assert!(matches!(err, FileRemoveError::OperationFailed { .. }));
        assert!(!dir.path().join("a.txt.trashinfo").exists());
        let (name, _) = home::claim_name(dir.path(), "a.txt", |_| Ok(())).unwrap();
        assert_eq!(name, "a.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_move_across_devices_copies_tree() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("project");
        std::fs::create_dir_all(source.join("src")).unwrap();
        std::fs::write(source.join("src/main.rs"), b"fn main() {}").unwrap();
        std::os::unix::fs::symlink("src/main.rs", source.join("entry")).unwrap();
        let dest = dir.path().join("trashed");

        home::move_across_devices(&source, &dest).unwrap();

        assert!(!source.exists());
        assert_eq!(std::fs::read(dest.join("src/main.rs")).unwrap(), b"fn main() {}");
        assert_eq!(
            std::fs::read_link(dest.join("entry")).unwrap(),
            std::path::Path::new("src/main.rs")
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_home_trash_on_other_filesystem() {
        use std::os::unix::fs::MetadataExt;

        // tmpfs; skipped when missing or on the same device as the file.
        let Ok(shm) = tempfile::tempdir_in("/dev/shm") else {
            return;
        };
        let home = tempfile::tempdir_in(std::env::current_dir().unwrap()).unwrap();
        let shm_dev = std::fs::metadata(shm.path()).unwrap().dev();
        if std::fs::metadata(home.path()).unwrap().dev() == shm_dev {
            return;
        }

        let trash = HomeTrash::new(shm.path().join("Trash"));
        let victim = home.path().join("doc.txt");
        std::fs::write(&victim, b"notes").unwrap();

        let dest = trash.trash(&victim).unwrap();

        assert!(!victim.exists());
        assert_eq!(std::fs::read(dest).unwrap(), b"notes");
        assert!(trash.info_dir().join("doc.txt.trashinfo").is_file());
    }
}
