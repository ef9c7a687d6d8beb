//! Well-known shell folders.
//!
//! Windows resolves folders by CSIDL through `SHGetFolderPathW`.  Other
//! hosts map the same ids onto the XDG user directories via `dirs`; there
//! the current and default locations are the same.

use std::path::PathBuf;

use crate::errors::ShellKitError;

/// Folders addressable by their CSIDL id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemFolder {
    Desktop,
    Personal,
    Favorites,
    Startup,
    StartMenu,
    MyMusic,
    MyVideo,
    CommonStartup,
    AppData,
    LocalAppData,
    CommonAppData,
    Windows,
    MyPictures,
    Profile,
}

const ALL: [SystemFolder; 14] = [
    SystemFolder::Desktop,
    SystemFolder::Personal,
    SystemFolder::Favorites,
    SystemFolder::Startup,
    SystemFolder::StartMenu,
    SystemFolder::MyMusic,
    SystemFolder::MyVideo,
    SystemFolder::CommonStartup,
    SystemFolder::AppData,
    SystemFolder::LocalAppData,
    SystemFolder::CommonAppData,
    SystemFolder::Windows,
    SystemFolder::MyPictures,
    SystemFolder::Profile,
];

impl SystemFolder {
    pub fn csidl(self) -> i32 {
        match self {
            SystemFolder::Desktop => 0x0000,
            SystemFolder::Personal => 0x0005,
            SystemFolder::Favorites => 0x0006,
            SystemFolder::Startup => 0x0007,
            SystemFolder::StartMenu => 0x000B,
            SystemFolder::MyMusic => 0x000D,
            SystemFolder::MyVideo => 0x000E,
            SystemFolder::CommonStartup => 0x0018,
            SystemFolder::AppData => 0x001A,
            SystemFolder::LocalAppData => 0x001C,
            SystemFolder::CommonAppData => 0x0023,
            SystemFolder::Windows => 0x0024,
            SystemFolder::MyPictures => 0x0027,
            SystemFolder::Profile => 0x0028,
        }
    }

    pub fn from_csidl(id: i32) -> Option<Self> {
        ALL.into_iter().find(|f| f.csidl() == id)
    }

    /// Parse a case-insensitive name such as `desktop` or `local_app_data`.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        ALL.into_iter()
            .find(|f| format!("{f:?}").to_ascii_lowercase() == key)
    }
}

/// Resolve `folder` on this host.
///
/// `default_path` asks for the folder's default location instead of the
/// current (possibly redirected) one.
pub fn system_folder_path(
    folder: SystemFolder,
    default_path: bool,
) -> Result<PathBuf, ShellKitError> {
    let path = platform::folder_path(folder, default_path)?;
    log::debug!("{folder:?} resolved to {}", path.display());
    Ok(path)
}

#[cfg(windows)]
mod platform {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use std::path::PathBuf;

    use windows::Win32::Foundation::{HANDLE, HWND, MAX_PATH};
    use windows::Win32::UI::Shell::SHGetFolderPathW;

    use super::SystemFolder;
    use crate::errors::ShellKitError;

    const SHGFP_TYPE_CURRENT: u32 = 0;
    const SHGFP_TYPE_DEFAULT: u32 = 1;

    pub(super) fn folder_path(
        folder: SystemFolder,
        default_path: bool,
    ) -> Result<PathBuf, ShellKitError> {
        let flags = if default_path {
            SHGFP_TYPE_DEFAULT
        } else {
            SHGFP_TYPE_CURRENT
        };
        let mut buf = [0u16; MAX_PATH as usize];
        unsafe {
            SHGetFolderPathW(HWND::default(), folder.csidl(), HANDLE::default(), flags, &mut buf)
        }
        .map_err(|e| ShellKitError::FolderError(format!("SHGetFolderPathW({folder:?}): {e}")))?;

        let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
        Ok(PathBuf::from(OsString::from_wide(&buf[..len])))
    }
}

#[cfg(not(windows))]
mod platform {
    use std::path::PathBuf;

    use super::SystemFolder;
    use crate::errors::ShellKitError;

    pub(super) fn folder_path(
        folder: SystemFolder,
        _default_path: bool,
    ) -> Result<PathBuf, ShellKitError> {
        let resolved = match folder {
            SystemFolder::Desktop => dirs::desktop_dir(),
            SystemFolder::Personal => dirs::document_dir(),
            SystemFolder::Favorites => dirs::home_dir().map(|h| h.join(".local/share/favorites")),
            SystemFolder::Startup => dirs::config_dir().map(|c| c.join("autostart")),
            SystemFolder::StartMenu => dirs::data_dir().map(|d| d.join("applications")),
            SystemFolder::MyMusic => dirs::audio_dir(),
            SystemFolder::MyVideo => dirs::video_dir(),
            SystemFolder::MyPictures => dirs::picture_dir(),
            SystemFolder::Profile => dirs::home_dir(),
            SystemFolder::AppData => dirs::config_dir(),
            SystemFolder::LocalAppData => dirs::data_local_dir(),
            SystemFolder::CommonStartup => Some(PathBuf::from("/etc/xdg/autostart")),
            SystemFolder::CommonAppData => Some(PathBuf::from("/usr/local/share")),
            SystemFolder::Windows => None,
        };
        resolved.ok_or_else(|| {
            ShellKitError::FolderError(format!("{folder:?} has no location on this host"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csidl_round_trip_for_every_folder() {
        for folder in ALL {
            assert_eq!(SystemFolder::from_csidl(folder.csidl()), Some(folder));
        }
        assert_eq!(SystemFolder::from_csidl(0x7FFF), None);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(SystemFolder::from_name("desktop"), Some(SystemFolder::Desktop));
        assert_eq!(SystemFolder::from_name("local_app_data"), Some(SystemFolder::LocalAppData));
        assert_eq!(SystemFolder::from_name("Common-Startup"), Some(SystemFolder::CommonStartup));
        assert_eq!(SystemFolder::from_name("attic"), None);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_windows_folder_has_no_portable_location() {
        assert!(matches!(
            system_folder_path(SystemFolder::Windows, false),
            Err(ShellKitError::FolderError(_))
        ));
    }
}
