//! Request and response bodies of the backend's `/api/*` endpoints.

use serde::{Deserialize, Serialize};

use crate::{FlowError, http::Response};

/// Body of `POST /api/login` and `POST /api/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /api/verify-otp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Body of `POST /shorten`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortenRequest {
    pub original_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShortenResponse {
    #[serde(default)]
    pub short_url: String,
}

/// One row of `GET /api/history`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub original_url: String,
    #[serde(default)]
    pub short_url: String,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub is_logged_in: bool,
    #[serde(default)]
    pub user_email: String,
}

/// Error body: `{"error": "..."}`. Anything else parses to `error: None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `GET /api/session`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionBody {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub email: Option<String>,
}

/// The `error` field of a JSON body, if there is a non-blank one.
pub fn json_error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .map(|message| message.trim().to_owned())
        .filter(|message| !message.is_empty())
}

/// The body as trimmed text, if it is non-blank UTF-8.
pub fn body_text_message(body: &[u8]) -> Option<String> {
    std::str::from_utf8(body)
        .ok()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

/// Turns a non-2xx response into a `FlowError::Backend`.
///
/// The JSON `error` field wins; `raw_body_fallback` additionally accepts a
/// plain-text body; `default` covers everything else.
pub fn backend_error(response: &Response, raw_body_fallback: bool, default: &str) -> FlowError {
    let message = json_error_message(&response.body)
        .or_else(|| {
            raw_body_fallback
                .then(|| body_text_message(&response.body))
                .flatten()
        })
        .unwrap_or_else(|| default.to_owned());

    FlowError::Backend {
        status: response.status,
        message,
    }
}
