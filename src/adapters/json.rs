//! JSON request and response helpers shared by the controllers.

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{error::Category, Value};
use thiserror::Error;

use crate::{application::error::ApplicationError, domain::config::local::DEFAULT_MAX_JSON_SIZE};

/// Envelope used for every JSON reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonResponse {
    pub error: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonResponse {
    pub fn success(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            error: false,
            message: message.into(),
            data,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Limits applied when reading a JSON request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonPolicy {
    pub max_bytes: u64,
    pub allow_unknown_fields: bool,
}

impl Default for JsonPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_JSON_SIZE,
            allow_unknown_fields: false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JsonError {
    #[error("body must not be larger than {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("body must not be empty")]
    Empty,

    #[error("body contains badly-formed JSON (at line {line} column {column})")]
    Malformed { line: usize, column: usize },

    #[error("body contains incorrect JSON type: {0}")]
    IncorrectType(String),

    #[error("body contains unknown key \"{0}\"")]
    UnknownField(String),

    #[error("body must contain only one JSON value")]
    MultipleValues,

    #[error("failed to read body: {0}")]
    Read(String),
}

impl From<JsonError> for ApplicationError {
    fn from(error: JsonError) -> Self {
        match error {
            JsonError::TooLarge { .. } => ApplicationError::PayloadTooLarge(error.to_string()),
            _ => ApplicationError::BadRequest(error.to_string()),
        }
    }
}

/// Collects a request body, refusing to buffer more than the policy allows,
/// and decodes it with [`read_json`].
pub async fn read_json_body<T>(body: Body, policy: &JsonPolicy) -> Result<T, JsonError>
where
    T: DeserializeOwned,
{
    let limit = usize::try_from(policy.max_bytes).unwrap_or(usize::MAX);
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| JsonError::Read(e.to_string()))?;
        if buf.len().saturating_add(chunk.len()) > limit {
            return Err(JsonError::TooLarge {
                limit: policy.max_bytes,
            });
        }
        buf.extend_from_slice(&chunk);
    }

    read_json(&buf, policy)
}

/// Decodes exactly one JSON value from `body` into `T`.
///
/// Keys that `T` does not consume, at any depth, are rejected unless the
/// policy allows them.
pub fn read_json<T>(body: &[u8], policy: &JsonPolicy) -> Result<T, JsonError>
where
    T: DeserializeOwned,
{
    if body.len() as u64 > policy.max_bytes {
        return Err(JsonError::TooLarge {
            limit: policy.max_bytes,
        });
    }

    let mut values = serde_json::Deserializer::from_slice(body).into_iter::<Value>();
    let value = match values.next() {
        None => return Err(JsonError::Empty),
        Some(Err(e)) => return Err(classify(e)),
        Some(Ok(value)) => value,
    };
    if values.next().is_some() {
        return Err(JsonError::MultipleValues);
    }

    let mut ignored = Vec::new();
    let decoded: T = serde_ignored::deserialize(value, |path| ignored.push(path.to_string()))
        .map_err(classify)?;

    if !policy.allow_unknown_fields {
        if let Some(key) = ignored.into_iter().next() {
            return Err(JsonError::UnknownField(key));
        }
    }

    Ok(decoded)
}

fn classify(error: serde_json::Error) -> JsonError {
    match error.classify() {
        Category::Data => JsonError::IncorrectType(error.to_string()),
        Category::Syntax | Category::Eof | Category::Io => JsonError::Malformed {
            line: error.line(),
            column: error.column(),
        },
    }
}

/// Serializes `payload` with the given status and extra headers.
pub fn write_json<T>(
    status: StatusCode,
    payload: &T,
    headers: HeaderMap,
) -> Result<Response, ApplicationError>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(payload)
        .map_err(|e| ApplicationError::InternalError(format!("JSON encoding failed: {}", e)))?;

    let mut response = (status, headers, body).into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(response)
}

/// Error envelope `{ "error": true, "message": … }` with the given status.
pub fn error_json(message: impl Into<String>, status: StatusCode) -> Response {
    let payload = JsonResponse::failure(message);
    match write_json(status, &payload, HeaderMap::new()) {
        Ok(response) => response,
        Err(_) => (status, payload.message).into_response(),
    }
}
