//! Percent-encoding for paths written into desktop entries and trash info
//! files.

use std::path::Path;

/// Percent-encode each segment of `path`, keeping the `/` separators.
pub fn percent_encode_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    #[cfg(windows)]
    let raw = raw.replace('\\', "/");
    raw.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// `file://` URL for an absolute path.
pub fn file_url(path: &Path) -> String {
    let encoded = percent_encode_path(path);
    if encoded.starts_with('/') {
        format!("file://{encoded}")
    } else {
        format!("file:///{encoded}")
    }
}
