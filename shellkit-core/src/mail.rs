//! Hand a prepared message to the default mail client.
//!
//! Windows goes through Simple MAPI (`MAPISendMail` from `MAPI32.DLL`) with
//! the compose dialog shown, so the user may log in and edit before
//! sending.  Other hosts delegate to `xdg-email`.

use std::path::PathBuf;

use crate::errors::MailError;

/// Message handed to the mail client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailMessage {
    pub files: Vec<PathBuf>,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    /// Every attachment must exist before the client is bothered.
    pub fn validate(&self) -> Result<(), MailError> {
        if let Some(missing) = self.files.iter().find(|f| !f.is_file()) {
            return Err(MailError::InvalidMessage(format!(
                "attachment {} does not exist",
                missing.display()
            )));
        }
        Ok(())
    }
}

/// Open the default mail client with `message`.
pub fn send_mail(message: &MailMessage) -> Result<(), MailError> {
    message.validate()?;
    platform::send(message)?;
    log::debug!(
        "mail to {:?} handed to client ({} attachment(s))",
        message.to,
        message.files.len()
    );
    Ok(())
}

/// Arguments for `xdg-email`.
pub fn xdg_email_args(message: &MailMessage) -> Vec<std::ffi::OsString> {
    let mut args: Vec<std::ffi::OsString> = Vec::new();
    if !message.subject.is_empty() {
        args.push("--subject".into());
        args.push(message.subject.clone().into());
    }
    if !message.body.is_empty() {
        args.push("--body".into());
        args.push(message.body.clone().into());
    }
    for file in &message.files {
        args.push("--attach".into());
        args.push(file.as_os_str().to_owned());
    }
    if !message.to.is_empty() {
        args.push(message.to.clone().into());
    }
    args
}

#[cfg(not(windows))]
mod platform {
    use std::io;
    use std::process::Command;

    use super::{xdg_email_args, MailMessage};
    use crate::errors::MailError;

    const XDG_EMAIL: &str = "xdg-email";

    pub(super) fn send(message: &MailMessage) -> Result<(), MailError> {
        let status = Command::new(XDG_EMAIL)
            .args(xdg_email_args(message))
            .status()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    MailError::ClientUnavailable(format!("{XDG_EMAIL} not found on PATH"))
                }
                _ => MailError::ClientUnavailable(format!("{XDG_EMAIL}: {e}")),
            })?;

        match status.code() {
            Some(0) => Ok(()),
            // xdg-email: 3 = a required tool could not be found.
            Some(3) => Err(MailError::ClientUnavailable(
                "no mail client is configured".into(),
            )),
            code => Err(MailError::SendFailed {
                code: code.unwrap_or(-1),
                message: format!("{XDG_EMAIL} exited with {status}"),
            }),
        }
    }
}

#[cfg(windows)]
mod platform {
    use std::ffi::{c_void, CString};

    use windows::core::{s, w};
    use windows::Win32::Foundation::{FreeLibrary, HMODULE};
    use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};

    use super::MailMessage;
    use crate::errors::MailError;

    const SUCCESS_SUCCESS: u32 = 0;
    const MAPI_USER_ABORT: u32 = 1;
    const MAPI_TO: u32 = 1;
    const MAPI_LOGON_UI: u32 = 0x0000_0001;
    const MAPI_DIALOG: u32 = 0x0000_0008;

    #[repr(C)]
    struct MapiRecipDesc {
        reserved: u32,
        recip_class: u32,
        name: *const u8,
        address: *const u8,
        eid_size: u32,
        entry_id: *mut c_void,
    }

    #[repr(C)]
    struct MapiFileDesc {
        reserved: u32,
        flags: u32,
        position: u32,
        path_name: *const u8,
        file_name: *const u8,
        file_type: *mut c_void,
    }

    #[repr(C)]
    struct MapiMessage {
        reserved: u32,
        subject: *const u8,
        note_text: *const u8,
        message_type: *const u8,
        date_received: *const u8,
        conversation_id: *const u8,
        flags: u32,
        originator: *mut MapiRecipDesc,
        recip_count: u32,
        recips: *mut MapiRecipDesc,
        file_count: u32,
        files: *mut MapiFileDesc,
    }

    type MapiSendMail =
        unsafe extern "system" fn(usize, usize, *mut MapiMessage, u32, u32) -> u32;

    /// Unloads MAPI32.DLL on drop.
    struct Library(HMODULE);

    impl Drop for Library {
        fn drop(&mut self) {
            let _ = unsafe { FreeLibrary(self.0) };
        }
    }

    fn c_string(value: &str, what: &str) -> Result<CString, MailError> {
        CString::new(value).map_err(|_| MailError::InvalidMessage(format!("{what} contains NUL")))
    }

    pub(super) fn send(message: &MailMessage) -> Result<(), MailError> {
        let library = unsafe { LoadLibraryW(w!("MAPI32.DLL")) }
            .map(Library)
            .map_err(|e| MailError::ClientUnavailable(format!("MAPI32.DLL: {e}")))?;

        let proc = unsafe { GetProcAddress(library.0, s!("MAPISendMail")) }
            .ok_or_else(|| MailError::ClientUnavailable("MAPISendMail export missing".into()))?;
        let send_mail: MapiSendMail = unsafe { std::mem::transmute(proc) };

        let subject = c_string(&message.subject, "subject")?;
        let body = c_string(&message.body, "body")?;
        let address = c_string(&format!("SMTP:{}", message.to), "recipient")?;
        let name = c_string(&message.to, "recipient")?;

        let paths = message
            .files
            .iter()
            .map(|f| {
                let abs = std::path::absolute(f).unwrap_or_else(|_| f.clone());
                c_string(&abs.to_string_lossy(), "attachment path")
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut recipients = Vec::new();
        if !message.to.is_empty() {
            recipients.push(MapiRecipDesc {
                reserved: 0,
                recip_class: MAPI_TO,
                name: name.as_ptr().cast(),
                address: address.as_ptr().cast(),
                eid_size: 0,
                entry_id: std::ptr::null_mut(),
            });
        }

        let mut attachments: Vec<MapiFileDesc> = paths
            .iter()
            .map(|p| MapiFileDesc {
                reserved: 0,
                flags: 0,
                position: u32::MAX,
                path_name: p.as_ptr().cast(),
                file_name: std::ptr::null(),
                file_type: std::ptr::null_mut(),
            })
            .collect();

        let mut msg = MapiMessage {
            reserved: 0,
            subject: subject.as_ptr().cast(),
            note_text: body.as_ptr().cast(),
            message_type: std::ptr::null(),
            date_received: std::ptr::null(),
            conversation_id: std::ptr::null(),
            flags: 0,
            originator: std::ptr::null_mut(),
            recip_count: recipients.len() as u32,
            recips: if recipients.is_empty() {
                std::ptr::null_mut()
            } else {
                recipients.as_mut_ptr()
            },
            file_count: attachments.len() as u32,
            files: if attachments.is_empty() {
                std::ptr::null_mut()
            } else {
                attachments.as_mut_ptr()
            },
        };

        let rc = unsafe { send_mail(0, 0, &mut msg, MAPI_LOGON_UI | MAPI_DIALOG, 0) };
        drop(library);
        match rc {
            SUCCESS_SUCCESS => Ok(()),
            MAPI_USER_ABORT => Err(MailError::Cancelled),
            code => Err(MailError::SendFailed {
                code: code as i32,
                message: format!("MAPISendMail returned {code}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    #[test]
    fn test_missing_attachment_is_invalid() {
        let msg = MailMessage {
            files: vec![PathBuf::from("/definitely/not/here.pdf")],
            to: "ops@example.com".into(),
            ..Default::default()
        };
        assert!(matches!(send_mail(&msg), Err(MailError::InvalidMessage(_))));
    }

    #[test]
    fn test_xdg_email_args_full() {
        let msg = MailMessage {
            files: vec![PathBuf::from("/tmp/a.log"), PathBuf::from("/tmp/b.log")],
            to: "ops@example.com".into(),
            subject: "Logs".into(),
            body: "See attached".into(),
        };
        let args: Vec<OsString> = xdg_email_args(&msg);
        let expected: Vec<OsString> = [
            "--subject",
            "Logs",
            "--body",
            "See attached",
            "--attach",
            "/tmp/a.log",
            "--attach",
            "/tmp/b.log",
            "ops@example.com",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn test_xdg_email_args_skip_empty_fields() {
        let msg = MailMessage {
            to: "ops@example.com".into(),
            ..Default::default()
        };
        assert_eq!(xdg_email_args(&msg), vec![OsString::from("ops@example.com")]);
    }
}
