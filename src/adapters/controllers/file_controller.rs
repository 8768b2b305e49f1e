use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    adapters::{
        download::download_static_file,
        dto::upload_dto::{DownloadQuery, UploadQuery},
        json::{write_json, JsonResponse},
        state::AppState,
    },
    application::error::ApplicationError,
    domain::models::uploaded_file::UploadedFile,
    services::{push_json_to_remote, MulterSource},
};

pub struct FileController;

impl FileController {
    /// Accepts every file part of a multipart request
    /// POST /api/v1/uploads?rename=<bool>
    pub async fn upload_files(
        State(app_state): State<AppState>,
        Query(query): Query<UploadQuery>,
        request: Request,
    ) -> Result<Response, ApplicationError> {
        let policy = app_state.config.upload_policy();
        let rename = query.rename.unwrap_or(app_state.config.rename_uploads);
        let source = MulterSource::from_request(request, policy.max_bytes())?;

        let files = app_state
            .upload_service
            .upload_files(source, &app_state.config.upload_dir, rename, &policy)
            .await?;

        info!(count = files.len(), rename, "Files uploaded");
        notify_upload(&app_state, &files).await;

        let payload = JsonResponse::success(
            format!("{} file(s) uploaded", files.len()),
            Some(json!(files)),
        );
        write_json(StatusCode::CREATED, &payload, HeaderMap::new())
    }

    /// Accepts a multipart request carrying exactly one file
    /// POST /api/v1/uploads/single?rename=<bool>
    pub async fn upload_one_file(
        State(app_state): State<AppState>,
        Query(query): Query<UploadQuery>,
        request: Request,
    ) -> Result<Response, ApplicationError> {
        let policy = app_state.config.upload_policy();
        let rename = query.rename.unwrap_or(app_state.config.rename_uploads);
        let source = MulterSource::from_request(request, policy.max_bytes())?;

        let file = app_state
            .upload_service
            .upload_one_file(source, &app_state.config.upload_dir, rename, &policy)
            .await?;

        info!(new_file_name = %file.new_file_name, "File uploaded");
        notify_upload(&app_state, std::slice::from_ref(&file)).await;

        let payload = JsonResponse::success("file uploaded", Some(json!(file)));
        write_json(StatusCode::CREATED, &payload, HeaderMap::new())
    }

    /// GET /api/v1/files/{name}?displayName=<name>
    pub async fn download_file(
        State(app_state): State<AppState>,
        Path(name): Path<String>,
        Query(query): Query<DownloadQuery>,
    ) -> Result<Response, ApplicationError> {
        let display_name = query.display_name.as_deref().unwrap_or(&name);
        download_static_file(&app_state.config.static_dir, &name, display_name).await
    }
}

/// Pushes the accepted files to the configured webhook. Failures are logged
/// and never affect the upload response.
async fn notify_upload(app_state: &AppState, files: &[UploadedFile]) {
    let Some(url) = app_state.config.upload_webhook_url.as_deref() else {
        return;
    };

    match push_json_to_remote(&app_state.http_client, url, files).await {
        Ok(status) if status.is_success() => {
            info!(status = %status, "Upload notification delivered");
        }
        Ok(status) => warn!(status = %status, "Upload notification rejected"),
        Err(e) => warn!(error = %e, "Upload notification failed"),
    }
}
