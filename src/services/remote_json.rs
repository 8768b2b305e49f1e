use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::services::error::RemoteError;

/// POSTs `payload` as JSON to `uri` and returns the remote status code.
///
/// Non-success statuses are returned, not turned into errors; only transport
/// and encoding failures fail the call.
pub async fn push_json_to_remote<T>(
    client: &Client,
    uri: &str,
    payload: &T,
) -> Result<StatusCode, RemoteError>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(payload).map_err(|e| RemoteError::EncodeError(e.to_string()))?;

    let response = client
        .post(uri)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await?;

    let status = response.status();
    debug!(uri = %uri, status = %status, "Pushed JSON to remote");
    Ok(status)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::HeaderMap, routing::post, Router};
    use serde_json::{json, Value};

    use super::*;

    type Captured = Arc<Mutex<Option<(String, Value)>>>;

    async fn capture(
        State(captured): State<Captured>,
        headers: HeaderMap,
        body: String,
    ) -> StatusCode {
        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let value = serde_json::from_str(&body).unwrap_or(Value::Null);
        *captured.lock().unwrap() = Some((content_type, value));
        StatusCode::ACCEPTED
    }

    #[tokio::test]
    async fn posts_json_and_returns_status() {
        let captured: Captured = Arc::default();
        let app = Router::new()
            .route("/hook", post(capture))
            .with_state(captured.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        let status = push_json_to_remote(
            &Client::new(),
            &format!("http://{addr}/hook"),
            &json!({ "bar": "foo" }),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::ACCEPTED);
        let (content_type, value) = captured.lock().unwrap().clone().unwrap();
        assert_eq!(content_type, "application/json");
        assert_eq!(value, json!({ "bar": "foo" }));
    }

    #[tokio::test]
    async fn rejecting_remote_returns_its_status() {
        let app = Router::new().route("/hook", post(|| async { StatusCode::FORBIDDEN }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        let status = push_json_to_remote(
            &Client::new(),
            &format!("http://{addr}/hook"),
            &json!({ "bar": "foo" }),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unreachable_remote_is_a_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = push_json_to_remote(&Client::new(), &format!("http://{addr}/"), &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, RemoteError::NetworkError(_)));
    }
}
