//! JSON bodies printed by `--json`

use base64::{engine::general_purpose, Engine as _};
use sculpt_core::SculptError;
use sculpt_gen::RelayOutput;
use serde_json::{json, Value};

/// `{message, model_path, model, thumbnail}` with base64 payloads
pub fn response_body(out: &RelayOutput) -> Value {
    let model_path = out
        .model
        .path
        .as_ref()
        .map(|p| Value::String(p.to_string_lossy().to_string()))
        .unwrap_or(Value::Null);

    json!({
        "message": out.message,
        "model_path": model_path,
        "model": general_purpose::STANDARD.encode(&out.model.bytes),
        "thumbnail": format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(&out.thumbnail_png)
        ),
    })
}

/// `{error}` plus a machine-readable `code` when the cause is a `SculptError`
pub fn error_body(err: &anyhow::Error) -> Value {
    let mut body = json!({ "error": format!("{:#}", err) });
    if let Some(sculpt) = err.downcast_ref::<SculptError>() {
        body["code"] = json!(sculpt.code());
    }
    body
}
