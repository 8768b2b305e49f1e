use axum::{
    extract::{Request, State},
    Json,
};

use crate::{
    adapters::{
        dto::slug_dto::{SlugRequest, SlugResponse},
        json::{read_json_body, JsonPolicy},
    },
    application::error::ApplicationError,
    services::slugify,
};

pub struct SlugController;

impl SlugController {
    /// POST /api/v1/slugs
    pub async fn create_slug(
        State(policy): State<JsonPolicy>,
        request: Request,
    ) -> Result<Json<SlugResponse>, ApplicationError> {
        let body: SlugRequest = read_json_body(request.into_body(), &policy).await?;
        let slug = slugify(&body.text).map_err(|e| ApplicationError::BadRequest(e.to_string()))?;
        Ok(Json(SlugResponse { slug }))
    }
}
