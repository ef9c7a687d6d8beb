//! Freedesktop `.desktop` shortcuts.
//!
//! The portable counterpart of a Windows shell link: a `[Desktop Entry]`
//! key file.  Directory targets become `Type=Link` entries with a `file://`
//! URL, everything else a `Type=Application` entry whose `Exec` line is the
//! quoted target followed by the argument string with `%` doubled.
//!
//! Files are written to a hidden sibling and renamed into place, so a
//! failed save never leaves a partial entry or disturbs the previous one.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::ShortcutError;
use crate::shortcut::{ShellLink, ShellLinkFactory};
use crate::uri::file_url;

/// Factory for [`DesktopEntry`] links.  Always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopEntryFactory;

impl ShellLinkFactory for DesktopEntryFactory {
    type Link = DesktopEntry;

    fn acquire(&self) -> Result<DesktopEntry, ShortcutError> {
        Ok(DesktopEntry::default())
    }
}

/// In-memory desktop entry.
#[derive(Debug, Clone, Default)]
pub struct DesktopEntry {
    target: Option<String>,
    arguments: Option<String>,
    comment: Option<String>,
    working_directory: Option<String>,
}

impl DesktopEntry {
    /// Render the key file for a link saved at `link_file_path`.
    pub fn render(&self, link_file_path: &Path) -> String {
        let target = self.target.as_deref().unwrap_or_default();
        let name = link_file_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| target.to_owned());

        let mut out = String::from("[Desktop Entry]\nVersion=1.0\n");
        push_key(&mut out, "Name", &name);

        if Path::new(target).is_dir() {
            out.push_str("Type=Link\n");
            push_key(&mut out, "URL", &file_url(&absolute(target)));
        } else {
            out.push_str("Type=Application\n");
            let mut exec = quote_exec_arg(target);
            if let Some(arguments) = self.arguments.as_deref().filter(|a| !a.is_empty()) {
                // `%` starts a launcher field code; keep the arguments literal.
                exec.push(' ');
                exec.push_str(&arguments.replace('%', "%%"));
            }
            push_key(&mut out, "Exec", &exec);
        }

        if let Some(comment) = &self.comment {
            push_key(&mut out, "Comment", comment);
        }
        if let Some(dir) = &self.working_directory {
            push_key(&mut out, "Path", dir);
        }
        out
    }
}

impl ShellLink for DesktopEntry {
    fn set_path(&mut self, target: &str) -> Result<(), ShortcutError> {
        self.target = Some(target.to_owned());
        Ok(())
    }

    fn set_arguments(&mut self, arguments: &str) -> Result<(), ShortcutError> {
        self.arguments = Some(arguments.to_owned());
        Ok(())
    }

    fn set_description(&mut self, description: &str) -> Result<(), ShortcutError> {
        self.comment = Some(description.to_owned());
        Ok(())
    }

    fn set_working_directory(&mut self, dir: &str) -> Result<(), ShortcutError> {
        self.working_directory = Some(dir.to_owned());
        Ok(())
    }

    fn save(&mut self, link_file_path: &Path) -> Result<(), ShortcutError> {
        let content = self.render(link_file_path);
        let staging = staging_path(link_file_path);

        let written = write_staged(&staging, content.as_bytes())
            .and_then(|()| fs::rename(&staging, link_file_path));
        if let Err(err) = written {
            let _ = fs::remove_file(&staging);
            return Err(ShortcutError::persistence(&err, link_file_path));
        }
        Ok(())
    }
}

fn write_staged(staging: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(staging)?;
    file.write_all(content)?;
    file.sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}

/// Distinguishes concurrent saves to the same link within one process.
static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

fn staging_path(link_file_path: &Path) -> PathBuf {
    let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
    let name = link_file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    link_file_path.with_file_name(format!(".{name}.{}-{seq}.tmp", std::process::id()))
}

fn absolute(target: &str) -> PathBuf {
    std::path::absolute(target).unwrap_or_else(|_| PathBuf::from(target))
}

/// Escape a value for a desktop-entry string key.
fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

fn push_key(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push('=');
    out.push_str(&escape_value(value));
    out.push('\n');
}

/// Quote one `Exec` argument when it contains reserved characters.
fn quote_exec_arg(arg: &str) -> String {
    const RESERVED: &[char] = &[
        ' ', '\t', '\n', '"', '\'', '\\', '>', '<', '~', '|', '&', ';', '$', '*', '?', '#', '(',
        ')', '`',
    ];
    if !arg.is_empty() && !arg.contains(RESERVED) {
        return arg.replace('%', "%%");
    }
    let mut out = String::from("\"");
    for c in arg.chars() {
        match c {
            '"' | '`' | '$' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '%' => out.push_str("%%"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(target: &str) -> DesktopEntry {
        let mut e = DesktopEntry::default();
        e.set_path(target).unwrap();
        e
    }

    #[test]
    fn test_render_application_minimal() {
        let text = entry("/apps/editor").render(Path::new("/desktop/Editor.lnk"));
        assert_eq!(
            text,
            "[Desktop Entry]\nVersion=1.0\nName=Editor\nType=Application\nExec=/apps/editor\n"
        );
    }

    #[test]
    fn test_render_all_fields() {
        let mut e = entry("/opt/my apps/editor");
        e.set_arguments("--minimized").unwrap();
        e.set_description("Line one\nline two").unwrap();
        e.set_working_directory("/opt/my apps").unwrap();

        let text = e.render(Path::new("/desktop/Editor.lnk"));
        assert!(text.contains("Exec=\"/opt/my apps/editor\" --minimized\n"));
        assert!(text.contains("Comment=Line one\\nline two\n"));
        assert!(text.contains("Path=/opt/my apps\n"));
    }

    #[test]
    fn test_render_arguments_escape_field_codes() {
        let mut e = entry("/apps/editor");
        e.set_arguments("--zoom=100% %f").unwrap();

        let text = e.render(Path::new("/desktop/Editor.desktop"));
        assert!(text.contains("Exec=/apps/editor --zoom=100%% %%f\n"), "{text}");
    }

    #[test]
    fn test_render_directory_target_as_link() {
        let dir = tempfile::tempdir().unwrap();
        let text = entry(dir.path().to_str().unwrap()).render(Path::new("/desktop/Docs.lnk"));
        assert!(text.contains("Type=Link\n"));
        assert!(text.contains("URL=file://"));
        assert!(!text.contains("Exec="));
    }

    #[test]
    fn test_quote_exec_arg() {
        assert_eq!(quote_exec_arg("/usr/bin/app"), "/usr/bin/app");
        assert_eq!(quote_exec_arg("/a b/app"), "\"/a b/app\"");
        assert_eq!(quote_exec_arg("/a$b"), "\"/a\\$b\"");
        assert_eq!(quote_exec_arg("/100%"), "/100%%");
        assert_eq!(quote_exec_arg(""), "\"\"");
    }

    #[test]
    fn test_escape_value_doubles_backslash() {
        // Backslashes from Exec quoting are escaped again at the key-file level.
        assert_eq!(escape_value("\"a\\$b\""), "\"a\\\\$b\"");
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_entry_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("Editor.desktop");
        entry("/apps/editor").save(&link).unwrap();

        let mode = fs::metadata(&link).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
