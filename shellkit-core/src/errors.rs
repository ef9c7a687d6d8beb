//! Error types for `shellkit_core`.
//!
//! Each service reports through its own `thiserror` enum so callers can
//! match on the failure kind.  [`ShellKitError`] aggregates them for code
//! that drives several services (the worker, the FFI layer).  PyO3
//! conversion is handled in the `shellkit-pyo3` crate, keeping this crate
//! PyO3-free.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of [`crate::shortcut::ShortcutService::create_shortcut`].
#[derive(Debug, Error)]
pub enum ShortcutError {
    /// A mandatory request field is missing or empty.
    #[error("InvalidRequest: {0}")]
    InvalidRequest(String),

    /// The shell-link facility could not be initialised or instantiated.
    #[error("PlatformUnavailable: {0}")]
    PlatformUnavailable(String),

    /// The shell-link object refused a field value.
    #[error("FieldRejected: {field} (0x{code:08X}): {message}")]
    FieldRejected {
        field: &'static str,
        code: i32,
        message: String,
    },

    /// Writing the link file failed.
    #[error("PersistenceFailed (0x{code:08X}): {message}")]
    PersistenceFailed { code: i32, message: String },
}

impl ShortcutError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Build a `PersistenceFailed` from an I/O error, keeping the OS code.
    pub fn persistence(err: &std::io::Error, path: &std::path::Path) -> Self {
        Self::PersistenceFailed {
            code: err.raw_os_error().unwrap_or(-1),
            message: format!("{}: {err}", path.display()),
        }
    }
}

/// Failure of [`crate::trash::remove_to_trash`].
#[derive(Debug, Error)]
pub enum FileRemoveError {
    #[error("NotFound: {}", .0.display())]
    NotFound(PathBuf),

    /// No trash location exists for this user or volume.
    #[error("TrashUnavailable: {0}")]
    TrashUnavailable(String),

    #[error("OperationFailed (code {code}): {message}")]
    OperationFailed { code: i32, message: String },
}

/// Failure of [`crate::mail::send_mail`].
#[derive(Debug, Error)]
pub enum MailError {
    #[error("InvalidMessage: {0}")]
    InvalidMessage(String),

    /// No default mail client is registered.
    #[error("ClientUnavailable: {0}")]
    ClientUnavailable(String),

    /// The user dismissed the compose dialog.
    #[error("Cancelled")]
    Cancelled,

    #[error("SendFailed (code {code}): {message}")]
    SendFailed { code: i32, message: String },
}

/// Top-level error type for the `shellkit_core` library.
#[derive(Debug, Error)]
pub enum ShellKitError {
    #[error(transparent)]
    Shortcut(#[from] ShortcutError),

    #[error(transparent)]
    Remove(#[from] FileRemoveError),

    #[error(transparent)]
    Mail(#[from] MailError),

    /// Well-known folder lookup failure.
    #[error("FolderError: {0}")]
    FolderError(String),

    /// COM / Win32 error outside a more specific service.
    #[error("ComError: {0}")]
    ComError(String),

    #[error("I/O error while accessing {}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
}

/// Convert a `windows::core::Error` (COM / Win32 HRESULT failure) into a
/// `ShellKitError::ComError`.
#[cfg(windows)]
impl From<windows::core::Error> for ShellKitError {
    fn from(err: windows::core::Error) -> Self {
        ShellKitError::ComError(format!("Windows COM error: {err}"))
    }
}
