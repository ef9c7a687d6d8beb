//! `shellkit` -- Thin PyO3 wrappers around `shellkit_core`.
//!
//! Each function releases the GIL via `py.allow_threads()` and converts
//! the Rust result to Python objects.  All logic lives in `shellkit_core`.
//!
//! ```python
//! import shellkit
//!
//! shellkit.create_shortcut(r"C:\Apps\editor.exe", r"C:\Users\me\Desktop\Editor.lnk",
//!                          arguments="--minimized", working_directory=r"C:\Apps")
//! for address, mask in shellkit.list_interfaces():
//!     print(address, mask)
//! ```

use std::path::PathBuf;

use pyo3::exceptions::{PyFileNotFoundError, PyOSError, PyValueError};
use pyo3::prelude::*;

use shellkit_core::errors::{FileRemoveError, MailError, ShellKitError, ShortcutError};
use shellkit_core::folders::SystemFolder;
use shellkit_core::mail::MailMessage;
use shellkit_core::shortcut::ShortcutRequest;
use shellkit_core::trash::RemoveOptions;

// ---------------------------------------------------------------------------
// Error conversion helper
// ---------------------------------------------------------------------------

fn to_py_err(e: impl Into<ShellKitError>) -> PyErr {
    let e = e.into();
    let msg = e.to_string();
    match e {
        ShellKitError::Shortcut(ShortcutError::InvalidRequest(_))
        | ShellKitError::Mail(MailError::InvalidMessage(_)) => PyValueError::new_err(msg),
        ShellKitError::Remove(FileRemoveError::NotFound(_)) => PyFileNotFoundError::new_err(msg),
        _ => PyOSError::new_err(msg),
    }
}

// ---------------------------------------------------------------------------
// Shortcuts
// ---------------------------------------------------------------------------

/// Create a shortcut at `link_path` launching `target`.
#[pyfunction]
#[pyo3(signature = (target, link_path, arguments=None, description=None, working_directory=None))]
fn create_shortcut(
    py: Python<'_>,
    target: String,
    link_path: PathBuf,
    arguments: Option<String>,
    description: Option<String>,
    working_directory: Option<String>,
) -> PyResult<()> {
    let mut request = ShortcutRequest::new(target, link_path);
    request.arguments = arguments;
    request.description = description;
    request.working_directory = working_directory;

    py.allow_threads(move || shellkit_core::shortcut::create_shortcut(&request))
        .map_err(to_py_err)
}

// ---------------------------------------------------------------------------
// Trash, interfaces, mail, folders
// ---------------------------------------------------------------------------

/// Move a file to the trash / Recycle Bin.
#[pyfunction]
#[pyo3(signature = (path, confirm=false, show_progress=false))]
fn remove_to_trash(
    py: Python<'_>,
    path: PathBuf,
    confirm: bool,
    show_progress: bool,
) -> PyResult<()> {
    let options = RemoveOptions {
        confirm,
        show_progress,
    };
    py.allow_threads(move || shellkit_core::trash::remove_to_trash(&path, options))
        .map_err(to_py_err)
}

/// List `(address, mask)` tuples for local interfaces.
#[pyfunction]
fn list_interfaces(py: Python<'_>) -> Vec<(String, String)> {
    py.allow_threads(shellkit_core::netif::list_interfaces)
        .into_iter()
        .map(|a| (a.address, a.mask))
        .collect()
}

/// Open the default mail client with a prepared message.
#[pyfunction]
#[pyo3(signature = (to, subject="", body="", files=Vec::new()))]
fn send_mail(
    py: Python<'_>,
    to: String,
    subject: &str,
    body: &str,
    files: Vec<PathBuf>,
) -> PyResult<()> {
    let message = MailMessage {
        files,
        to,
        subject: subject.to_owned(),
        body: body.to_owned(),
    };
    py.allow_threads(move || shellkit_core::mail::send_mail(&message))
        .map_err(to_py_err)
}

/// Resolve a well-known folder by name (`"desktop"`) or CSIDL id.
#[pyfunction]
#[pyo3(signature = (folder, default_path=false))]
fn system_folder_path(
    py: Python<'_>,
    folder: &Bound<'_, PyAny>,
    default_path: bool,
) -> PyResult<PathBuf> {
    let resolved = if let Ok(id) = folder.extract::<i32>() {
        SystemFolder::from_csidl(id)
    } else {
        SystemFolder::from_name(&folder.extract::<String>()?)
    };
    let folder = resolved.ok_or_else(|| PyValueError::new_err(format!("unknown folder {folder}")))?;

    py.allow_threads(move || shellkit_core::folders::system_folder_path(folder, default_path))
        .map_err(to_py_err)
}

// ---------------------------------------------------------------------------
// Module registration
// ---------------------------------------------------------------------------

/// Register the `shellkit` Python module.
#[pymodule]
fn shellkit(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(create_shortcut, m)?)?;
    m.add_function(wrap_pyfunction!(remove_to_trash, m)?)?;
    m.add_function(wrap_pyfunction!(list_interfaces, m)?)?;
    m.add_function(wrap_pyfunction!(send_mail, m)?)?;
    m.add_function(wrap_pyfunction!(system_folder_path, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("__doc__", "Native desktop-shell helpers: shortcuts, trash, interfaces, mail.")?;

    Ok(())
}
