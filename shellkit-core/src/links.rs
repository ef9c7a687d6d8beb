//! Named shortcuts inside a folder (desktop, startup, links).
//!
//! A shortcut called `name` lives at `<folder>/<name><LINK_EXTENSION>`.
//! Startup entries are looked up in both the per-user and the all-users
//! startup folder; the Explorer `Links` folder sits under the user profile.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::errors::{ShellKitError, ShortcutError};
use crate::folders::{system_folder_path, SystemFolder};
use crate::shortcut::{
    PlatformShell, ShellLinkFactory, ShortcutRequest, ShortcutService, LINK_EXTENSION,
};

/// Arguments passed to programs launched from a startup entry.
pub const STARTUP_ARGUMENTS: &str = "--minimized";

/// Shortcut helpers bound to one directory.
#[derive(Debug, Clone)]
pub struct FolderShortcuts<F = PlatformShell> {
    dir: PathBuf,
    service: ShortcutService<F>,
}

impl FolderShortcuts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            service: ShortcutService::new(),
        }
    }

    /// Bind to the current location of a well-known folder.
    pub fn for_folder(folder: SystemFolder) -> Result<Self, ShellKitError> {
        Ok(Self::new(system_folder_path(folder, false)?))
    }
}

impl<F: ShellLinkFactory> FolderShortcuts<F> {
    pub fn with_service(dir: impl Into<PathBuf>, service: ShortcutService<F>) -> Self {
        Self {
            dir: dir.into(),
            service,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn link_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}{LINK_EXTENSION}"))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.link_path(name).exists()
    }

    /// Create (or replace) shortcut `name` pointing at `target`.
    pub fn create(
        &self,
        name: &str,
        target: &Path,
        description: Option<&str>,
    ) -> Result<PathBuf, ShellKitError> {
        self.create_with(name, target, |request| match description {
            Some(text) => request.description(text),
            None => request,
        })
    }

    /// Create (or replace) shortcut `name`, letting `configure` fill in the
    /// optional fields of the request before it is written.
    pub fn create_with(
        &self,
        name: &str,
        target: &Path,
        configure: impl FnOnce(ShortcutRequest) -> ShortcutRequest,
    ) -> Result<PathBuf, ShellKitError> {
        let target = std::path::absolute(target)
            .map_err(|e| ShellKitError::Io(target.to_path_buf(), e))?;
        let request = configure(ShortcutRequest::new(
            target.to_string_lossy(),
            self.link_path(name),
        ));
        self.service.create_shortcut(&request)?;
        Ok(request.link_file_path)
    }

    /// Shortcut to `target` named after its last path component.
    ///
    /// Returns `None` without writing anything when the folder is missing.
    pub fn link_to(&self, target: &Path) -> Result<Option<PathBuf>, ShellKitError> {
        if !self.dir.is_dir() {
            log::warn!("shortcut folder {} does not exist", self.dir.display());
            return Ok(None);
        }
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ShortcutError::invalid_request(format!("{} has no file name", target.display()))
            })?;
        self.create(&name, target, Some(&name)).map(Some)
    }

    /// Remove shortcut `name`.  Returns whether a file was deleted.
    pub fn remove(&self, name: &str) -> Result<bool, ShellKitError> {
        let link = self.link_path(name);
        match fs::remove_file(&link) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ShellKitError::Io(link, e)),
        }
    }
}

/// Startup entries in the per-user and all-users startup folders.
#[derive(Debug, Clone)]
pub struct StartupShortcuts<F = PlatformShell> {
    user: FolderShortcuts<F>,
    common: FolderShortcuts<F>,
}

impl StartupShortcuts {
    pub fn new() -> Result<Self, ShellKitError> {
        Ok(Self {
            user: FolderShortcuts::for_folder(SystemFolder::Startup)?,
            common: FolderShortcuts::for_folder(SystemFolder::CommonStartup)?,
        })
    }
}

impl<F: ShellLinkFactory> StartupShortcuts<F> {
    pub fn with_folders(user: FolderShortcuts<F>, common: FolderShortcuts<F>) -> Self {
        Self { user, common }
    }

    /// Start `executable` minimized at login, from its own directory.  The
    /// entry goes into the per-user folder.
    pub fn enable(
        &self,
        name: &str,
        executable: &Path,
        description: Option<&str>,
    ) -> Result<PathBuf, ShellKitError> {
        if !executable.is_file() {
            return Err(ShellKitError::Io(
                executable.to_path_buf(),
                io::Error::new(io::ErrorKind::NotFound, "executable not found"),
            ));
        }
        let executable = std::path::absolute(executable)
            .map_err(|e| ShellKitError::Io(executable.to_path_buf(), e))?;
        let working_dir = executable.parent().map(|p| p.to_string_lossy().into_owned());

        log::info!("creating startup entry {name} -> {}", executable.display());
        self.user.create_with(name, &executable, |mut request| {
            request.arguments = Some(STARTUP_ARGUMENTS.to_owned());
            request.description = description.map(str::to_owned);
            request.working_directory = working_dir;
            request
        })
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.user.exists(name) || self.common.exists(name)
    }

    /// Remove `name` from both startup folders.  Returns whether anything
    /// was deleted.  The all-users folder is often read-only; a permission
    /// failure there is logged and skipped.
    pub fn disable(&self, name: &str) -> Result<bool, ShellKitError> {
        let removed_user = self.user.remove(name)?;
        let removed_common = match self.common.remove(name) {
            Ok(removed) => removed,
            Err(ShellKitError::Io(path, e)) if e.kind() == io::ErrorKind::PermissionDenied => {
                log::warn!("cannot remove {}: {e}", path.display());
                false
            }
            Err(e) => return Err(e),
        };
        Ok(removed_user || removed_common)
    }
}

/// Create desktop shortcut `name` pointing at `target`.
pub fn create_desktop_shortcut(name: &str, target: &Path) -> Result<PathBuf, ShellKitError> {
    log::debug!("creating desktop shortcut {name} -> {}", target.display());
    FolderShortcuts::for_folder(SystemFolder::Desktop)?.create(name, target, Some(name))
}

pub fn remove_desktop_shortcut(name: &str) -> Result<bool, ShellKitError> {
    FolderShortcuts::for_folder(SystemFolder::Desktop)?.remove(name)
}

pub fn is_desktop_shortcut(name: &str) -> bool {
    FolderShortcuts::for_folder(SystemFolder::Desktop)
        .map(|f| f.exists(name))
        .unwrap_or(false)
}

/// Add (`enabled`) or remove the startup entry `name` for `executable`.
pub fn set_startup(name: &str, executable: &Path, enabled: bool) -> Result<(), ShellKitError> {
    let startup = StartupShortcuts::new()?;
    if enabled {
        startup.enable(name, executable, None)?;
    } else {
        startup.disable(name)?;
    }
    Ok(())
}

pub fn has_startup(name: &str) -> bool {
    StartupShortcuts::new()
        .map(|s| s.is_enabled(name))
        .unwrap_or(false)
}

/// The Explorer `Links` folder, `<profile>/Links`.
pub fn links_folder() -> Result<FolderShortcuts, ShellKitError> {
    Ok(FolderShortcuts::new(
        system_folder_path(SystemFolder::Profile, false)?.join("Links"),
    ))
}

/// Add a `Links` shortcut to `target`, named after it.  `None` when the
/// folder does not exist on this host.
pub fn create_links_shortcut(target: &Path) -> Result<Option<PathBuf>, ShellKitError> {
    links_folder()?.link_to(target)
}

pub fn remove_links_shortcut(name: &str) -> Result<bool, ShellKitError> {
    links_folder()?.remove(name)
}

pub fn is_links_shortcut(name: &str) -> bool {
    links_folder().map(|f| f.exists(name)).unwrap_or(false)
}
