//! Reply envelope (JSON).
//!
//! Servers answer every interaction with `{errcode, message, data?}`. The
//! reply may arrive already decoded (JSON content type) or as a string that
//! still has to be parsed; `normalize` folds both into one typed value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PageWireError, Result};

/// Normalized reply envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// `0` means success, anything else is an application failure.
    pub errcode: i64,
    /// User-facing text.
    pub message: String,
    /// Optional free-form payload (`url`, `IsCancel`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A reply as handed over by the transport, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawReply {
    /// Body delivered as text (non-JSON content type).
    Text(String),
    /// Body already decoded as JSON.
    Json(Value),
}

impl ResponseEnvelope {
    pub fn success(message: impl Into<String>) -> Self {
        Self { errcode: 0, message: message.into(), data: None }
    }

    pub fn failure(errcode: i64, message: impl Into<String>) -> Self {
        Self { errcode, message: message.into(), data: None }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_success(&self) -> bool {
        self.errcode == 0
    }

    /// Convert a nonzero `errcode` into `PageWireError::Application`.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(PageWireError::Application {
                errcode: self.errcode,
                message: self.message,
            })
        }
    }

    /// String field inside `data`, if present.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }

    /// `data.url`, used by download replies.
    pub fn redirect_url(&self) -> Option<&str> {
        self.data_str("url").filter(|u| !u.is_empty())
    }

    /// `data.IsCancel`, set by toggle actions when the toggle was undone.
    pub fn is_cancel(&self) -> bool {
        self.data
            .as_ref()
            .and_then(|d| d.get("IsCancel"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Serialize back to the wire form.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| PageWireError::Internal(format!("envelope encode failed: {e}")))
    }
}

/// Normalize a raw reply into a `ResponseEnvelope`.
///
/// Strings (including a JSON string value) are parsed once; the result, like
/// an already-structured reply, must be an object carrying `errcode` and
/// `message`.
pub fn normalize(raw: RawReply) -> Result<ResponseEnvelope> {
    match raw {
        RawReply::Text(s) => parse_text(&s),
        RawReply::Json(Value::String(s)) => {
            tracing::trace!(len = s.len(), "json reply is a string, parsing it once more");
            parse_text(&s)
        }
        RawReply::Json(v) => from_value(v),
    }
}

fn parse_text(s: &str) -> Result<ResponseEnvelope> {
    let s = s.trim();
    if s.is_empty() {
        return Err(PageWireError::Protocol("empty reply".into()));
    }
    let v: Value = serde_json::from_str(s)
        .map_err(|e| PageWireError::Protocol(format!("invalid envelope json: {e}")))?;
    from_value(v)
}

fn from_value(v: Value) -> Result<ResponseEnvelope> {
    if !v.is_object() {
        return Err(PageWireError::Protocol("reply is not an object".into()));
    }
    serde_json::from_value(v)
        .map_err(|e| PageWireError::Protocol(format!("envelope shape mismatch: {e}")))
}
