use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data_models::{ContactLead, ResearchRecord};
use crate::researcher::VerificationPayload;

#[derive(Debug, Deserialize)]
pub struct ResearchRequestBody {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_context: Option<String>,
    /// Kept loose so a non-array value gets a 400 with a message instead of a 422.
    #[serde(default)]
    pub contact_leads: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    pub status: &'static str,
    pub session_id: String,
    pub data: VerificationPayload,
}

#[derive(Debug, Deserialize)]
pub struct ContinueRequestBody {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedFiles {
    pub markdown: String,
    pub pdf: String,
}

#[derive(Debug, Serialize)]
pub struct CompletedResponse {
    pub status: &'static str,
    pub company_name: String,
    pub domain: String,
    pub data: ResearchRecord,
    pub files: GeneratedFiles,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub web_search_enabled: bool,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Accepts an array of `{name, title?, email?}` objects; entries without a
/// name are dropped. Anything other than an array (or null) is rejected.
pub fn parse_contact_leads(value: Option<Value>) -> Result<Vec<ContactLead>, ApiError> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ApiError::bad_request("contact_leads must be an array")),
    };

    let field = |item: &Value, key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Ok(items
        .iter()
        .filter_map(|item| {
            let name = field(item, "name")?;
            Some(ContactLead::new(name, field(item, "title"), field(item, "email")))
        })
        .collect())
}
