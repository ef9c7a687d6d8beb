//! `IShellLinkW` / `IPersistFile` backend.
//!
//! Each [`ComShellLink`] owns its COM apartment guard, so the interface
//! pointers are released before `CoUninitialize` runs (fields drop in
//! declaration order).

use std::path::Path;

use windows::core::{Interface, HSTRING};
use windows::Win32::Foundation::TRUE;
use windows::Win32::System::Com::{CoCreateInstance, IPersistFile, CLSCTX_INPROC_SERVER};
use windows::Win32::UI::Shell::{IShellLinkW, ShellLink as CLSID_SHELL_LINK};

use crate::com::{Apartment, ComGuard};
use crate::errors::ShortcutError;
use crate::shortcut::{ShellLink, ShellLinkFactory};

/// Factory producing COM shell-link objects on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComShellFactory;

impl ShellLinkFactory for ComShellFactory {
    type Link = ComShellLink;

    fn acquire(&self) -> Result<ComShellLink, ShortcutError> {
        let com = ComGuard::init(Apartment::SingleThreaded)
            .map_err(|e| ShortcutError::PlatformUnavailable(e.to_string()))?;

        let link: IShellLinkW =
            unsafe { CoCreateInstance(&CLSID_SHELL_LINK, None, CLSCTX_INPROC_SERVER) }.map_err(
                |e| ShortcutError::PlatformUnavailable(format!("CoCreateInstance(ShellLink): {e}")),
            )?;

        Ok(ComShellLink { link, _com: com })
    }
}

/// Live `IShellLinkW` instance.
pub struct ComShellLink {
    link: IShellLinkW,
    _com: ComGuard,
}

fn rejected(field: &'static str, err: windows::core::Error) -> ShortcutError {
    ShortcutError::FieldRejected {
        field,
        code: err.code().0,
        message: err.message(),
    }
}

impl ShellLink for ComShellLink {
    fn set_path(&mut self, target: &str) -> Result<(), ShortcutError> {
        unsafe { self.link.SetPath(&HSTRING::from(target)) }.map_err(|e| rejected("target_path", e))
    }

    fn set_arguments(&mut self, arguments: &str) -> Result<(), ShortcutError> {
        unsafe { self.link.SetArguments(&HSTRING::from(arguments)) }
            .map_err(|e| rejected("arguments", e))
    }

    fn set_description(&mut self, description: &str) -> Result<(), ShortcutError> {
        unsafe { self.link.SetDescription(&HSTRING::from(description)) }
            .map_err(|e| rejected("description", e))
    }

    fn set_working_directory(&mut self, dir: &str) -> Result<(), ShortcutError> {
        unsafe { self.link.SetWorkingDirectory(&HSTRING::from(dir)) }
            .map_err(|e| rejected("working_directory", e))
    }

    fn save(&mut self, link_file_path: &Path) -> Result<(), ShortcutError> {
        let persist: IPersistFile = self.link.cast().map_err(|e| {
            ShortcutError::PlatformUnavailable(format!("QueryInterface(IPersistFile): {e}"))
        })?;

        unsafe { persist.Save(&HSTRING::from(link_file_path.as_os_str()), TRUE) }.map_err(|e| {
            ShortcutError::PersistenceFailed {
                code: e.code().0,
                message: format!("{}: {}", link_file_path.display(), e.message()),
            }
        })
    }
}
