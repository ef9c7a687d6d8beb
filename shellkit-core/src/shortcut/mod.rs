//! Shortcut (shell link) creation.
//!
//! [`ShortcutService`] turns a [`ShortcutRequest`] into a link file on disk.
//! The platform part sits behind [`ShellLinkFactory`]: on Windows it is the
//! `IShellLinkW` / `IPersistFile` COM pair, elsewhere a freedesktop
//! `.desktop` entry writer.  Every handle the factory hands out is released
//! by `Drop`, so all exit paths clean up.
//!
//! ```no_run
//! use shellkit_core::shortcut::{create_shortcut, ShortcutRequest};
//!
//! let request = ShortcutRequest::new(r"C:\Apps\editor.exe", r"C:\Users\me\Desktop\Editor.lnk")
//!     .arguments("--minimized")
//!     .working_directory(r"C:\Apps");
//! create_shortcut(&request)?;
//! # Ok::<(), shellkit_core::errors::ShortcutError>(())
//! ```

#[cfg(windows)]
pub mod com_link;
pub mod desktop_entry;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ShortcutError;

/// Extension used for shortcut files created by the folder helpers.
#[cfg(windows)]
pub const LINK_EXTENSION: &str = ".lnk";

/// Extension used for shortcut files created by the folder helpers.  Desktop
/// environments and autostart only pick up `*.desktop` entries.
#[cfg(not(windows))]
pub const LINK_EXTENSION: &str = ".desktop";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Everything needed to write one shortcut.
///
/// Optional fields left as `None` are never touched on the link object, so
/// the platform defaults apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutRequest {
    pub target_path: String,
    pub link_file_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
}

impl ShortcutRequest {
    pub fn new(target_path: impl Into<String>, link_file_path: impl Into<PathBuf>) -> Self {
        Self {
            target_path: target_path.into(),
            link_file_path: link_file_path.into(),
            arguments: None,
            description: None,
            working_directory: None,
        }
    }

    pub fn arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn working_directory(mut self, dir: impl Into<String>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Check the mandatory fields.
    pub fn validate(&self) -> Result<(), ShortcutError> {
        if self.target_path.is_empty() {
            return Err(ShortcutError::invalid_request("target_path is empty"));
        }
        if self.link_file_path.as_os_str().is_empty() {
            return Err(ShortcutError::invalid_request("link_file_path is empty"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Platform seam
// ---------------------------------------------------------------------------

/// An in-memory shell-link object, populated field by field and then saved.
///
/// Implementations release their platform resources in `Drop`.
pub trait ShellLink {
    fn set_path(&mut self, target: &str) -> Result<(), ShortcutError>;
    fn set_arguments(&mut self, arguments: &str) -> Result<(), ShortcutError>;
    fn set_description(&mut self, description: &str) -> Result<(), ShortcutError>;
    fn set_working_directory(&mut self, dir: &str) -> Result<(), ShortcutError>;

    /// Persist the link. Either the whole file is written or nothing changes.
    fn save(&mut self, link_file_path: &Path) -> Result<(), ShortcutError>;
}

/// Hands out fresh [`ShellLink`] objects.
pub trait ShellLinkFactory {
    type Link: ShellLink;

    /// Fails with [`ShortcutError::PlatformUnavailable`] when the shell
    /// subsystem cannot be reached.
    fn acquire(&self) -> Result<Self::Link, ShortcutError>;
}

/// The host's native shell-link facility.
#[cfg(windows)]
pub type PlatformShell = com_link::ComShellFactory;

/// The host's native shell-link facility.
#[cfg(not(windows))]
pub type PlatformShell = desktop_entry::DesktopEntryFactory;

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Creates shortcut files through a [`ShellLinkFactory`].
#[derive(Debug, Clone, Default)]
pub struct ShortcutService<F = PlatformShell> {
    factory: F,
}

impl ShortcutService<PlatformShell> {
    pub fn new() -> Self {
        Self {
            factory: PlatformShell::default(),
        }
    }
}

impl<F: ShellLinkFactory> ShortcutService<F> {
    pub fn with_factory(factory: F) -> Self {
        Self { factory }
    }

    /// Write the shortcut described by `request`.
    ///
    /// A single attempt is made; any failure is returned to the caller.
    pub fn create_shortcut(&self, request: &ShortcutRequest) -> Result<(), ShortcutError> {
        request.validate()?;

        let mut link = self.factory.acquire()?;
        log::debug!(
            "shell link acquired for {}",
            request.link_file_path.display()
        );

        link.set_path(&request.target_path)?;
        if let Some(arguments) = &request.arguments {
            link.set_arguments(arguments)?;
        }
        if let Some(description) = &request.description {
            link.set_description(description)?;
        }
        if let Some(dir) = &request.working_directory {
            link.set_working_directory(dir)?;
        }

        link.save(&request.link_file_path)?;
        log::debug!(
            "shortcut {} -> {} saved",
            request.link_file_path.display(),
            request.target_path
        );
        Ok(())
    }
}

/// Create a shortcut with the host's native facility.
pub fn create_shortcut(request: &ShortcutRequest) -> Result<(), ShortcutError> {
    ShortcutService::new().create_shortcut(request)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;

    use super::*;
    use crate::shortcut::desktop_entry::DesktopEntryFactory;

    /// Records every call so tests can check which steps ran.
    #[derive(Default)]
    struct RecordingFactory {
        unavailable: bool,
        reject_arguments: bool,
        calls: Rc<RefCell<Vec<String>>>,
    }

    struct RecordingLink {
        reject_arguments: bool,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl ShellLink for RecordingLink {
        fn set_path(&mut self, target: &str) -> Result<(), ShortcutError> {
            self.calls.borrow_mut().push(format!("path={target}"));
            Ok(())
        }
        fn set_arguments(&mut self, arguments: &str) -> Result<(), ShortcutError> {
            if self.reject_arguments {
                return Err(ShortcutError::FieldRejected {
                    field: "arguments",
                    code: -2147024809,
                    message: "The parameter is incorrect.".into(),
                });
            }
            self.calls.borrow_mut().push(format!("arguments={arguments}"));
            Ok(())
        }
        fn set_description(&mut self, description: &str) -> Result<(), ShortcutError> {
            self.calls.borrow_mut().push(format!("description={description}"));
            Ok(())
        }
        fn set_working_directory(&mut self, dir: &str) -> Result<(), ShortcutError> {
            self.calls.borrow_mut().push(format!("workdir={dir}"));
            Ok(())
        }
        fn save(&mut self, link_file_path: &Path) -> Result<(), ShortcutError> {
            self.calls
                .borrow_mut()
                .push(format!("save={}", link_file_path.display()));
            Ok(())
        }
    }

    impl Drop for RecordingLink {
        fn drop(&mut self) {
            self.calls.borrow_mut().push("release".into());
        }
    }

    impl ShellLinkFactory for RecordingFactory {
        type Link = RecordingLink;

        fn acquire(&self) -> Result<RecordingLink, ShortcutError> {
            if self.unavailable {
                return Err(ShortcutError::PlatformUnavailable(
                    "CoInitializeEx failed: HRESULT 0x8000FFFF".into(),
                ));
            }
            self.calls.borrow_mut().push("acquire".into());
            Ok(RecordingLink {
                reject_arguments: self.reject_arguments,
                calls: Rc::clone(&self.calls),
            })
        }
    }

    fn desktop_service() -> ShortcutService<DesktopEntryFactory> {
        ShortcutService::with_factory(DesktopEntryFactory)
    }

    #[test]
    fn test_validate_rejects_empty_target() {
        let req = ShortcutRequest::new("", "/desktop/Editor.lnk");
        assert!(matches!(req.validate(), Err(ShortcutError::InvalidRequest(_))));
    }

    #[test]
    fn test_validate_rejects_empty_link_path() {
        let req = ShortcutRequest::new("/apps/editor", "");
        assert!(matches!(req.validate(), Err(ShortcutError::InvalidRequest(_))));
    }

    #[test]
    fn test_request_deserializes_without_optionals() {
        let req: ShortcutRequest = serde_json::from_str(
            r#"{"target_path":"/apps/editor","link_file_path":"/desktop/Editor.lnk"}"#,
        )
        .unwrap();
        assert_eq!(req, ShortcutRequest::new("/apps/editor", "/desktop/Editor.lnk"));
    }

    #[test]
    fn test_populates_only_present_fields_in_order() {
        let factory = RecordingFactory::default();
        let calls = Rc::clone(&factory.calls);
        let service = ShortcutService::with_factory(factory);

        let req = ShortcutRequest::new("/apps/editor", "/desktop/Editor.lnk").description("Editor");
        service.create_shortcut(&req).unwrap();

        assert_eq!(
            *calls.borrow(),
            vec![
                "acquire",
                "path=/apps/editor",
                "description=Editor",
                "save=/desktop/Editor.lnk",
                "release",
            ]
        );
    }

    #[test]
    fn test_invalid_request_never_acquires() {
        let factory = RecordingFactory::default();
        let calls = Rc::clone(&factory.calls);
        let service = ShortcutService::with_factory(factory);

        let err = service
            .create_shortcut(&ShortcutRequest::new("", "/desktop/Editor.lnk"))
            .unwrap_err();
        assert!(matches!(err, ShortcutError::InvalidRequest(_)));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_platform_unavailable_before_population() {
        let factory = RecordingFactory {
            unavailable: true,
            ..Default::default()
        };
        let calls = Rc::clone(&factory.calls);
        let service = ShortcutService::with_factory(factory);

        let err = service
            .create_shortcut(&ShortcutRequest::new("/apps/editor", "/desktop/Editor.lnk"))
            .unwrap_err();
        match err {
            ShortcutError::PlatformUnavailable(msg) => assert!(msg.contains("0x8000FFFF")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_rejected_field_releases_link_without_saving() {
        let factory = RecordingFactory {
            reject_arguments: true,
            ..Default::default()
        };
        let calls = Rc::clone(&factory.calls);
        let service = ShortcutService::with_factory(factory);

        let req = ShortcutRequest::new("/apps/editor", "/desktop/Editor.lnk").arguments("--x");
        let err = service.create_shortcut(&req).unwrap_err();
        assert!(matches!(err, ShortcutError::FieldRejected { field: "arguments", .. }));
        assert_eq!(*calls.borrow(), vec!["acquire", "path=/apps/editor", "release"]);
    }

    #[test]
    fn test_minimal_request_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("Editor.lnk");

        desktop_service()
            .create_shortcut(&ShortcutRequest::new("/apps/editor", &link))
            .unwrap();

        assert!(link.is_file());
    }

    #[test]
    fn test_optional_fields_in_any_combination() {
        let dir = tempfile::tempdir().unwrap();
        let service = desktop_service();

        for mask in 0..8u8 {
            let link = dir.path().join(format!("combo-{mask}.lnk"));
            let mut req = ShortcutRequest::new("/apps/editor", &link);
            if mask & 1 != 0 {
                req = req.arguments("--new-window");
            }
            if mask & 2 != 0 {
                req = req.description("Text editor");
            }
            if mask & 4 != 0 {
                req = req.working_directory("/apps");
            }
            service.create_shortcut(&req).unwrap();
            assert!(link.is_file(), "mask {mask}");
        }
    }

    #[test]
    fn test_empty_target_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("Editor.lnk");

        let err = desktop_service()
            .create_shortcut(&ShortcutRequest::new("", &link))
            .unwrap_err();

        assert!(matches!(err, ShortcutError::InvalidRequest(_)));
        assert!(!link.exists());
    }

    #[test]
    fn test_second_call_overwrites_first() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("Editor.lnk");
        let service = desktop_service();

        service
            .create_shortcut(&ShortcutRequest::new("/apps/editor", &link).description("first"))
            .unwrap();
        service
            .create_shortcut(&ShortcutRequest::new("/apps/editor", &link).description("second"))
            .unwrap();

        let content = fs::read_to_string(&link).unwrap();
        assert!(content.contains("Comment=second"));
        assert!(!content.contains("Comment=first"));
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temporary file left behind");
    }

    #[test]
    fn test_unwritable_location_is_persistence_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"plain file").unwrap();
        let link = blocker.join("Editor.lnk");

        let err = desktop_service()
            .create_shortcut(&ShortcutRequest::new("/apps/editor", &link))
            .unwrap_err();

        assert!(matches!(err, ShortcutError::PersistenceFailed { .. }));
        assert!(!link.exists());
        assert_eq!(fs::read(&blocker).unwrap(), b"plain file");
    }

    #[test]
    fn test_failed_save_leaves_prior_entry_untouched() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory squatting on the link path cannot be replaced.
        let link = dir.path().join("Editor.lnk");
        fs::create_dir(&link).unwrap();
        fs::write(link.join("keep.txt"), b"prior").unwrap();

        let err = desktop_service()
            .create_shortcut(&ShortcutRequest::new("/apps/editor", &link))
            .unwrap_err();

        assert!(matches!(err, ShortcutError::PersistenceFailed { .. }));
        assert_eq!(fs::read(link.join("keep.txt")).unwrap(), b"prior");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temporary file left behind");
    }
}
