//! Drives the router in-process with `tower::ServiceExt::oneshot()`.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request, StatusCode},
    response::Response,
    routing::post,
    Json, Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use upload_toolkit::{
    adapters::{router::create_router, state::AppState},
    application::services::RANDOM_NAME_LENGTH,
    domain::config::local::ServerConfig,
    services::{InferContentSniffer, OsTokenGenerator},
};

const BOUNDARY: &str = "----toolkit-test-boundary";

const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

// ---------------------------------------------------------------------------
// Test harness
// ---------------------------------------------------------------------------

struct TestApp {
    router: Router,
    tmp: TempDir,
}

impl TestApp {
    fn new(customize: impl FnOnce(&mut ServerConfig)) -> Self {
        let tmp = TempDir::new().unwrap();
        let mut config = ServerConfig {
            upload_dir: tmp.path().join("uploads"),
            static_dir: tmp.path().join("static"),
            allowed_file_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
            ],
            ..ServerConfig::default()
        };
        customize(&mut config);

        let state = AppState::new(
            config,
            Arc::new(OsTokenGenerator),
            Arc::new(InferContentSniffer),
        );
        Self {
            router: create_router(state),
            tmp,
        }
    }

    fn upload_dir(&self) -> std::path::PathBuf {
        self.tmp.path().join("uploads")
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp: Response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("router returned error");
        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .expect("body collect failed")
            .to_bytes();
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }
}

struct FilePart<'a> {
    field: &'a str,
    file_name: &'a str,
    content_type: &'a str,
    data: &'a [u8],
}

fn multipart_body(parts: &[FilePart<'_>], fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for part in parts {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                part.field, part.file_name, part.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_req(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn png_part(file_name: &str) -> FilePart<'_> {
    FilePart {
        field: "file",
        file_name,
        content_type: "image/png",
        data: TINY_PNG,
    }
}

fn entries(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|rd| {
            rd.map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn uploads_png_without_renaming() {
    let app = TestApp::new(|_| {});
    let body = multipart_body(&[png_part("img.png")], &[("description", "a pixel")]);

    let (status, json) = app
        .send(upload_req("/api/v1/uploads?rename=false", body))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["error"], false);
    assert_eq!(
        json["data"],
        json!([{
            "originalFileName": "img.png",
            "newFileName": "img.png",
            "fileSize": TINY_PNG.len()
        }])
    );
    assert_eq!(
        std::fs::read(app.upload_dir().join("img.png")).unwrap(),
        TINY_PNG
    );
}

#[tokio::test]
async fn uploads_are_renamed_by_default() {
    let app = TestApp::new(|_| {});
    let body = multipart_body(&[png_part("img.png"), png_part("other.png")], &[]);

    let (status, json) = app.send(upload_req("/api/v1/uploads", body)).await;

    assert_eq!(status, StatusCode::CREATED);
    let files = json["data"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    for file in files {
        let new_name = file["newFileName"].as_str().unwrap();
        assert_ne!(new_name, file["originalFileName"].as_str().unwrap());
        assert!(new_name.ends_with(".png"));
        assert_eq!(new_name.len(), RANDOM_NAME_LENGTH + 4);
        assert_eq!(
            std::fs::read(app.upload_dir().join(new_name)).unwrap(),
            TINY_PNG
        );
    }
    assert_eq!(entries(&app.upload_dir()).len(), 2);
}

#[tokio::test]
async fn disallowed_type_is_rejected() {
    let app = TestApp::new(|config| {
        config.allowed_file_types = vec!["image/jpeg".to_string(), "image/gif".to_string()];
    });
    let body = multipart_body(&[png_part("img.png")], &[]);

    let (status, json) = app
        .send(upload_req("/api/v1/uploads?rename=false", body))
        .await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(json["error"], true);
    assert!(json["message"].as_str().unwrap().contains("not permitted"));
    assert!(!app.upload_dir().join("img.png").exists());
}

#[tokio::test]
async fn spoofed_part_header_does_not_bypass_sniffing() {
    let app = TestApp::new(|_| {});
    let body = multipart_body(
        &[FilePart {
            field: "file",
            file_name: "innocent.png",
            content_type: "image/png",
            data: b"#!/bin/sh\necho this is not an image\n",
        }],
        &[],
    );

    let (status, _) = app.send(upload_req("/api/v1/uploads", body)).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(entries(&app.upload_dir()).is_empty());
}

#[tokio::test]
async fn single_upload_rejects_two_files() {
    let app = TestApp::new(|_| {});
    let body = multipart_body(&[png_part("a.png"), png_part("b.png")], &[]);

    let (status, json) = app
        .send(upload_req("/api/v1/uploads/single", body))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("exactly one"));
    assert!(entries(&app.upload_dir()).is_empty());
}

#[tokio::test]
async fn single_upload_returns_the_file() {
    let app = TestApp::new(|_| {});
    let body = multipart_body(&[png_part("a.png")], &[]);

    let (status, json) = app
        .send(upload_req("/api/v1/uploads/single?rename=true", body))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["originalFileName"], "a.png");
    assert_eq!(json["data"]["fileSize"], TINY_PNG.len());
    let new_name = json["data"]["newFileName"].as_str().unwrap();
    assert!(app.upload_dir().join(new_name).is_file());
}

#[tokio::test]
async fn request_without_files_returns_empty_list() {
    let app = TestApp::new(|_| {});
    let body = multipart_body(&[], &[("description", "no files here")]);

    let (status, json) = app.send(upload_req("/api/v1/uploads", body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn non_multipart_body_is_bad_request() {
    let app = TestApp::new(|_| {});
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/uploads")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let (status, json) = app.send(req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], true);
}

#[tokio::test]
async fn oversized_request_is_rejected() {
    let app = TestApp::new(|config| config.max_upload_size = 64);
    let mut data = TINY_PNG.to_vec();
    data.extend(std::iter::repeat(0u8).take(4096));
    let body = multipart_body(
        &[FilePart {
            field: "file",
            file_name: "big.png",
            content_type: "image/png",
            data: &data,
        }],
        &[],
    );

    let (status, _) = app.send(upload_req("/api/v1/uploads", body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(entries(&app.upload_dir()).is_empty());
}

#[tokio::test]
async fn webhook_receives_uploaded_files() {
    type Captured = Arc<Mutex<Vec<Value>>>;

    async fn capture(State(captured): State<Captured>, Json(body): Json<Value>) -> StatusCode {
        captured.lock().unwrap().push(body);
        StatusCode::OK
    }

    let captured: Captured = Arc::default();
    let hook = Router::new()
        .route("/hook", post(capture))
        .with_state(captured.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, hook).await });

    let app = TestApp::new(|config| {
        config.upload_webhook_url = Some(format!("http://{addr}/hook"));
    });
    let body = multipart_body(&[png_part("img.png")], &[]);

    let (status, _) = app
        .send(upload_req("/api/v1/uploads?rename=false", body))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let received = captured.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0][0]["newFileName"], "img.png");
}

// ---------------------------------------------------------------------------
// Downloads, slugs, health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn downloads_static_file_as_attachment() {
    let app = TestApp::new(|_| {});
    let static_dir = app.tmp.path().join("static");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("foto.png"), TINY_PNG).unwrap();

    let req = Request::builder()
        .uri("/api/v1/files/foto.png?displayName=foti.png")
        .body(Body::empty())
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"foti.png\""
    );
    assert_eq!(
        resp.headers()[header::CONTENT_LENGTH],
        TINY_PNG.len().to_string().as_str()
    );
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body.as_ref(), TINY_PNG);
}

#[tokio::test]
async fn missing_download_is_not_found() {
    let app = TestApp::new(|_| {});
    let req = Request::builder()
        .uri("/api/v1/files/missing.txt")
        .body(Body::empty())
        .unwrap();

    let (status, json) = app.send(req).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], true);
}

fn slug_req(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/v1/slugs")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn slug_endpoint_slugifies_text() {
    let app = TestApp::new(|_| {});

    let (status, json) = app
        .send(slug_req(r#"{"text": "This is a valid string 123"}"#))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "slug": "this-is-a-valid-string-123" }));
}

#[tokio::test]
async fn slug_endpoint_validates_body() {
    let app = TestApp::new(|_| {});

    let (status, json) = app
        .send(slug_req(r#"{"text": "hello", "extra": 1}"#))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "body contains unknown key \"extra\"");

    let (status, json) = app.send(slug_req(r#"{"text": ""}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "empty string not permitted");

    let (status, _) = app.send(slug_req("")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_upload_config() {
    let app = TestApp::new(|_| {});
    let req = Request::builder()
        .uri("/api/v1/health")
        .body(Body::empty())
        .unwrap();

    let (status, json) = app.send(req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(
        json["config"]["allowedFileTypes"],
        json!(["image/jpeg", "image/png", "image/gif"])
    );
}
