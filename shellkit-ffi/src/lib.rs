//! C ABI DLL for shellkit -- loadable by JNI bridges, C#, ctypes, or any
//! FFI consumer.
//!
//! All exported functions follow the convention:
//! - Return `i32` status code: `SHELLKIT_OK=0`, negative on failure
//! - String outputs allocated by Rust, freed via `shellkit_free_string()`
//! - Last error retrievable via `shellkit_last_error()`
//! - Optional string parameters may be null

use std::cell::RefCell;
use std::ffi::{c_char, CStr, CString};
use std::path::PathBuf;
use std::ptr;

use shellkit_core::errors::{FileRemoveError, MailError, ShellKitError, ShortcutError};
use shellkit_core::folders::{system_folder_path, SystemFolder};
use shellkit_core::mail::{send_mail, MailMessage};
use shellkit_core::shortcut::{create_shortcut, ShortcutRequest};
use shellkit_core::trash::{remove_to_trash, RemoveOptions};

pub const SHELLKIT_OK: i32 = 0;
pub const SHELLKIT_ERROR: i32 = -1;
pub const SHELLKIT_INVALID_REQUEST: i32 = -2;
pub const SHELLKIT_PLATFORM_UNAVAILABLE: i32 = -3;
pub const SHELLKIT_PERSISTENCE_FAILED: i32 = -4;
pub const SHELLKIT_NOT_FOUND: i32 = -5;
pub const SHELLKIT_CLIENT_UNAVAILABLE: i32 = -6;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Record `err` and map it to a status code.
fn fail(err: ShellKitError) -> i32 {
    set_last_error(&err.to_string());
    match err {
        ShellKitError::Shortcut(ShortcutError::InvalidRequest(_))
        | ShellKitError::Mail(MailError::InvalidMessage(_)) => SHELLKIT_INVALID_REQUEST,
        ShellKitError::Shortcut(ShortcutError::PlatformUnavailable(_)) => {
            SHELLKIT_PLATFORM_UNAVAILABLE
        }
        ShellKitError::Shortcut(ShortcutError::PersistenceFailed { .. }) => {
            SHELLKIT_PERSISTENCE_FAILED
        }
        ShellKitError::Remove(FileRemoveError::NotFound(_)) => SHELLKIT_NOT_FOUND,
        ShellKitError::Mail(MailError::ClientUnavailable(_)) => SHELLKIT_CLIENT_UNAVAILABLE,
        _ => SHELLKIT_ERROR,
    }
}

/// Read an optional UTF-8 C string.
///
/// # Safety
///
/// `ptr` must be null or a valid null-terminated C string.
unsafe fn opt_str(ptr: *const c_char, name: &str) -> Result<Option<String>, String> {
    if ptr.is_null() {
        return Ok(None);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(|s| Some(s.to_owned()))
        .map_err(|e| format!("{name}: invalid UTF-8: {e}"))
}

/// Hand `value` to the caller through `out`.
///
/// # Safety
///
/// `out` must be a valid, non-null pointer.
unsafe fn write_out(out: *mut *mut c_char, value: String) -> i32 {
    match CString::new(value) {
        Ok(cstr) => {
            unsafe { *out = cstr.into_raw() };
            SHELLKIT_OK
        }
        Err(e) => {
            set_last_error(&format!("CString conversion failed: {e}"));
            SHELLKIT_ERROR
        }
    }
}

/// Retrieve the last error message (thread-local).
///
/// Returns a pointer valid until the next shellkit_* call on this thread.
/// Returns null if no error has occurred.
#[no_mangle]
pub extern "C" fn shellkit_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Free a string previously allocated by a shellkit_* function.
///
/// # Safety
///
/// `ptr` must be a pointer returned by a shellkit_* function or null.
#[no_mangle]
pub unsafe extern "C" fn shellkit_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

/// Create a shortcut at `link_path` launching `target`.
///
/// A null `target` or `link_path` is reported as an invalid request, the
/// same as an empty string.
///
/// # Safety
///
/// Every non-null pointer must be a valid null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn shellkit_create_shortcut(
    target: *const c_char,
    link_path: *const c_char,
    arguments: *const c_char,
    description: *const c_char,
    working_directory: *const c_char,
) -> i32 {
    let fields = (|| -> Result<ShortcutRequest, String> {
        let target = unsafe { opt_str(target, "target") }?.unwrap_or_default();
        let link_path = unsafe { opt_str(link_path, "link_path") }?.unwrap_or_default();
        let mut request = ShortcutRequest::new(target, link_path);
        request.arguments = unsafe { opt_str(arguments, "arguments") }?;
        request.description = unsafe { opt_str(description, "description") }?;
        request.working_directory = unsafe { opt_str(working_directory, "working_directory") }?;
        Ok(request)
    })();

    let request = match fields {
        Ok(r) => r,
        Err(msg) => return fail(ShortcutError::InvalidRequest(msg).into()),
    };
    match create_shortcut(&request) {
        Ok(()) => SHELLKIT_OK,
        Err(e) => fail(e.into()),
    }
}

/// Move `path` to the trash / Recycle Bin.
///
/// # Safety
///
/// `path` must be a valid null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn shellkit_remove_to_trash(
    path: *const c_char,
    confirm: bool,
    show_progress: bool,
) -> i32 {
    let path = match unsafe { opt_str(path, "path") } {
        Ok(Some(p)) => PathBuf::from(p),
        Ok(None) => {
            set_last_error("path is null");
            return SHELLKIT_ERROR;
        }
        Err(msg) => {
            set_last_error(&msg);
            return SHELLKIT_ERROR;
        }
    };
    let options = RemoveOptions {
        confirm,
        show_progress,
    };
    match remove_to_trash(&path, options) {
        Ok(()) => SHELLKIT_OK,
        Err(e) => fail(e.into()),
    }
}

/// List interface `(address, mask)` pairs as a JSON array of objects.
///
/// # Safety
///
/// `out_json` must be a valid pointer to a `*mut c_char`.
/// On success, `*out_json` is set to a heap-allocated JSON C string.
/// Caller must free with `shellkit_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn shellkit_list_interfaces(out_json: *mut *mut c_char) -> i32 {
    if out_json.is_null() {
        set_last_error("out_json is null");
        return SHELLKIT_ERROR;
    }

    let interfaces = shellkit_core::netif::list_interfaces();
    match serde_json::to_string(&interfaces) {
        Ok(json) => unsafe { write_out(out_json, json) },
        Err(e) => {
            set_last_error(&format!("JSON serialization failed: {e}"));
            SHELLKIT_ERROR
        }
    }
}

/// Open the default mail client with a prepared message.
///
/// # Safety
///
/// `to`, `subject` and `body` must be null or valid null-terminated UTF-8
/// C strings.  `files` must point to `file_count` such strings (or be null
/// when `file_count` is 0).
#[no_mangle]
pub unsafe extern "C" fn shellkit_send_mail(
    to: *const c_char,
    subject: *const c_char,
    body: *const c_char,
    files: *const *const c_char,
    file_count: usize,
) -> i32 {
    if files.is_null() && file_count > 0 {
        set_last_error("files is null");
        return SHELLKIT_ERROR;
    }

    let message = (|| -> Result<MailMessage, String> {
        let file_ptrs: &[*const c_char] = if file_count == 0 {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(files, file_count) }
        };
        let mut paths = Vec::with_capacity(file_count);
        for (i, &p) in file_ptrs.iter().enumerate() {
            match unsafe { opt_str(p, "files") }? {
                Some(s) => paths.push(PathBuf::from(s)),
                None => return Err(format!("files[{i}] is null")),
            }
        }
        Ok(MailMessage {
            files: paths,
            to: unsafe { opt_str(to, "to") }?.unwrap_or_default(),
            subject: unsafe { opt_str(subject, "subject") }?.unwrap_or_default(),
            body: unsafe { opt_str(body, "body") }?.unwrap_or_default(),
        })
    })();

    let message = match message {
        Ok(m) => m,
        Err(msg) => return fail(MailError::InvalidMessage(msg).into()),
    };
    match send_mail(&message) {
        Ok(()) => SHELLKIT_OK,
        Err(e) => fail(e.into()),
    }
}

/// Resolve a well-known folder by CSIDL id.
///
/// # Safety
///
/// `out_path` must be a valid pointer to a `*mut c_char`.
/// Caller must free the result with `shellkit_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn shellkit_system_folder_path(
    csidl: i32,
    default_path: bool,
    out_path: *mut *mut c_char,
) -> i32 {
    if out_path.is_null() {
        set_last_error("out_path is null");
        return SHELLKIT_ERROR;
    }
    let Some(folder) = SystemFolder::from_csidl(csidl) else {
        set_last_error(&format!("unknown CSIDL 0x{csidl:04X}"));
        return SHELLKIT_ERROR;
    };
    match system_folder_path(folder, default_path) {
        Ok(path) => unsafe { write_out(out_path, path.to_string_lossy().into_owned()) },
        Err(e) => fail(e),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    fn last_error() -> String {
        let p = shellkit_last_error();
        assert!(!p.is_null());
        unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned()
    }

    #[test]
    fn test_create_shortcut_null_target_is_invalid() {
        let link = c("/desktop/Editor.lnk");
        let rc = unsafe {
            shellkit_create_shortcut(
                ptr::null(),
                link.as_ptr(),
                ptr::null(),
                ptr::null(),
                ptr::null(),
            )
        };
        assert_eq!(rc, SHELLKIT_INVALID_REQUEST);
        assert!(last_error().starts_with("InvalidRequest"));
    }

    #[test]
    fn test_create_shortcut_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let link_path = dir.path().join("Editor.lnk");
        let target = c("/apps/editor");
        let link = c(link_path.to_str().unwrap());
        let desc = c("Editor");

        let rc = unsafe {
            shellkit_create_shortcut(
                target.as_ptr(),
                link.as_ptr(),
                ptr::null(),
                desc.as_ptr(),
                ptr::null(),
            )
        };
        assert_eq!(rc, SHELLKIT_OK);
        assert!(link_path.is_file());
    }

    #[test]
    fn test_remove_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = c(dir.path().join("gone.txt").to_str().unwrap());
        let rc = unsafe { shellkit_remove_to_trash(missing.as_ptr(), false, false) };
        assert_eq!(rc, SHELLKIT_NOT_FOUND);
    }

    #[test]
    fn test_list_interfaces_returns_json_array() {
        let mut out: *mut c_char = ptr::null_mut();
        let rc = unsafe { shellkit_list_interfaces(&mut out) };
        assert_eq!(rc, SHELLKIT_OK);
        let json = unsafe { CStr::from_ptr(out) }.to_string_lossy().into_owned();
        unsafe { shellkit_free_string(out) };
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.is_array());
    }

    #[test]
    fn test_null_out_pointers_are_rejected() {
        assert_eq!(unsafe { shellkit_list_interfaces(ptr::null_mut()) }, SHELLKIT_ERROR);
        assert_eq!(
            unsafe { shellkit_system_folder_path(0, false, ptr::null_mut()) },
            SHELLKIT_ERROR
        );
    }

    #[test]
    fn test_unknown_csidl() {
        let mut out: *mut c_char = ptr::null_mut();
        let rc = unsafe { shellkit_system_folder_path(0x7FFF, false, &mut out) };
        assert_eq!(rc, SHELLKIT_ERROR);
        assert!(out.is_null());
        assert!(last_error().contains("0x7FFF"));
    }

    #[test]
    fn test_send_mail_null_file_entry() {
        let to = c("ops@example.com");
        let files = [ptr::null::<c_char>()];
        let rc = unsafe {
            shellkit_send_mail(to.as_ptr(), ptr::null(), ptr::null(), files.as_ptr(), 1)
        };
        assert_eq!(rc, SHELLKIT_INVALID_REQUEST);
        assert!(last_error().contains("files[0]"));
    }
}
