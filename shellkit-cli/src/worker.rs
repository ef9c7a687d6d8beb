//! JSON-RPC request dispatch for `shellkit-worker`.
//!
//! The worker reads line-delimited `{id, method, params}` requests and
//! answers each with `{id, result}` or `{id, error}`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use shellkit_core::folders::{system_folder_path, SystemFolder};
use shellkit_core::shortcut::{create_shortcut, ShortcutRequest};
use shellkit_core::trash::{remove_to_trash, RemoveOptions};

#[derive(Deserialize)]
pub struct Request {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Serialize)]
pub struct Response {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn from_outcome(id: u64, outcome: Result<Value, String>) -> Self {
        match outcome {
            Ok(result) => Self {
                id,
                result: Some(result),
                error: None,
            },
            Err(error) => Self {
                id,
                result: None,
                error: Some(error),
            },
        }
    }
}

#[derive(Deserialize)]
struct TrashParams {
    path: PathBuf,
    #[serde(default)]
    confirm: bool,
    #[serde(default)]
    show_progress: bool,
}

/// Resolve `params.folder`, given as a CSIDL number or a folder name.
fn folder_param(params: &Value) -> Result<SystemFolder, String> {
    let folder = params.get("folder").ok_or("missing param: folder")?;
    let resolved = match folder {
        Value::Number(n) => n
            .as_i64()
            .and_then(|id| i32::try_from(id).ok())
            .and_then(SystemFolder::from_csidl),
        Value::String(name) => SystemFolder::from_name(name),
        _ => None,
    };
    resolved.ok_or_else(|| format!("unknown folder: {folder}"))
}

pub fn dispatch(method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "create_shortcut" => {
            let request: ShortcutRequest =
                serde_json::from_value(params.clone()).map_err(|e| format!("invalid params: {e}"))?;
            create_shortcut(&request).map_err(|e| e.to_string())?;
            Ok(Value::Bool(true))
        }
        "remove_to_trash" => {
            let p: TrashParams =
                serde_json::from_value(params.clone()).map_err(|e| format!("invalid params: {e}"))?;
            let options = RemoveOptions {
                confirm: p.confirm,
                show_progress: p.show_progress,
            };
            remove_to_trash(&p.path, options).map_err(|e| e.to_string())?;
            Ok(Value::Bool(true))
        }
        "list_interfaces" => {
            serde_json::to_value(shellkit_core::netif::list_interfaces()).map_err(|e| e.to_string())
        }
        "system_folder_path" => {
            let folder = folder_param(params)?;
            let default_path = params
                .get("default_path")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            let path = system_folder_path(folder, default_path).map_err(|e| e.to_string())?;
            Ok(Value::String(path.to_string_lossy().into_owned()))
        }
        "ping" => Ok(Value::String("pong".to_owned())),
        _ => Err(format!("unknown method: {method}")),
    }
}
