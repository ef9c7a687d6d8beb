//! `shellkit_core` -- Pure Rust core library for shellkit.
//!
//! This crate contains all OS-facing logic with **no PyO3 dependency**.
//! It can be consumed by:
//! - `shellkit-pyo3` (PyO3 Python extension)
//! - `shellkit-ffi` (C ABI DLL for JNI bridges, C#, ctypes)
//! - `shellkit-cli` (standalone CLI tools and the IPC worker)
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`errors`] | Per-service error enums and `ShellKitError` via `thiserror` |
//! | `com` | `ComGuard` RAII wrapper for COM apartment init (Windows) |
//! | [`shortcut`] | `ShortcutService`: shell links / desktop entries |
//! | [`links`] | Named shortcuts in the desktop and other shell folders |
//! | [`folders`] | Well-known folder lookup by CSIDL |
//! | [`trash`] | Recycle Bin / freedesktop trash |
//! | [`netif`] | `(address, mask)` pairs of local interfaces |
//! | [`mail`] | Default mail client via MAPI / `xdg-email` |

#[cfg(windows)]
pub mod com;
pub mod errors;
pub mod folders;
pub mod links;
pub mod mail;
pub mod netif;
pub mod shortcut;
pub mod trash;
mod uri;
