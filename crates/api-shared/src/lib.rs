//! # API Shared
//!
//! Wire types for the letter registry.
//!
//! Contains:
//! - the action request and `success`/`error` response envelope
//! - request/response bodies for `add` and `get`
//! - catalog and health responses
//! - `HealthService`
//!
//! Used by `api-rest` and the CLI so both speak the same JSON.

pub mod health;

pub use health::HealthService;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Action name for fetching issuance history.
pub const ACTION_GET: &str = "get";
/// Action name for registering a letter.
pub const ACTION_ADD: &str = "add";

/// Request accepted by the action endpoint: `{ "action": "get" | "add", "payload"?: ... }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub payload: Option<Value>,
}

/// Uniform response envelope.
///
/// Serialises as `{ "status": "success", "data": ... }` or
/// `{ "status": "error", "message": ... }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T> {
    Success { data: T },
    Error { message: String },
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Envelope::Success { data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }
}

/// Payload of the `add` action.
///
/// `detailData` is normally a JSON-encoded string. A JSON object is accepted too and
/// stored as its compact serialisation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddLetterReq {
    pub letter_type: String,
    pub patient_name: String,
    /// ISO date, `YYYY-MM-DD`.
    pub letter_date: String,
    #[serde(default, deserialize_with = "detail_data_text")]
    pub detail_data: String,
}

fn detail_data_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Result of the `add` action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AddLetterRes {
    pub message: String,
    /// The generated letter number.
    #[serde(rename = "nomorSurat")]
    pub letter_number: String,
}

/// One history entry returned by the `get` action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryRes {
    pub id: u64,
    pub letter_number: String,
    pub letter_type: String,
    pub letter_type_text: String,
    pub patient_name: String,
    pub letter_date: String,
    pub letter_date_formatted: String,
    pub detail_data: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LetterTypeRes {
    pub code: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DetailFieldRes {
    pub key: String,
    pub column: String,
    pub position: usize,
}

/// Column layout currently in effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRes {
    pub columns: Vec<String>,
    pub letter_types: Vec<LetterTypeRes>,
    pub detail_fields: Vec<DetailFieldRes>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}
