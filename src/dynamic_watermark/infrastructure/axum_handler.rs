use crate::application::error::ApplicationError;
use crate::application::watermark_service::{parse_output_format, WatermarkService};
use crate::domain::image::mime_for_format;
use crate::domain::watermark::WatermarkSpec;
use axum::{
    body::Body,
    extract::{Json, State},
    http::{header, HeaderName},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use super::file_storage::LocalFileStorage;

pub struct AppState {
    pub watermark_service: Arc<WatermarkService>,
    pub file_storage: Arc<LocalFileStorage>,
    /// Where the latest result is stored for `/preview` and `/download`.
    pub output_path: String,
}

/// Either `{"image": "<locator>"}` or `{"text": "<label>"}`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkParam {
    Image(String),
    Text(String),
}

impl From<WatermarkParam> for WatermarkSpec {
    fn from(param: WatermarkParam) -> Self {
        match param {
            WatermarkParam::Image(locator) => WatermarkSpec::Image(locator),
            WatermarkParam::Text(text) => WatermarkSpec::Text(text),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct WatermarkParams {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub watermark: WatermarkParam,
    pub position: Option<String>,
    #[serde(rename = "outputFormat")]
    pub output_format: Option<String>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(vec![HeaderName::from_static("content-type")]);

    Router::new()
        .route("/watermark", post(watermark_handler))
        .route("/preview", get(preview_image_handler))
        .route("/download", get(download_image_handler))
        .with_state(Arc::new(state))
        .layer(cors)
}

pub async fn watermark_handler(
    State(state): State<Arc<AppState>>,
    Json(params): Json<WatermarkParams>,
) -> Result<impl IntoResponse, ApplicationError> {
    let position = params.position.unwrap_or_else(|| "center".to_string());
    let format = parse_output_format(params.output_format.as_deref().unwrap_or("png"));
    let spec = WatermarkSpec::from(params.watermark);

    let applied = state
        .watermark_service
        .apply_as(&params.image_url, &spec, &position, &state.output_path, Some(format))
        .await?;

    Response::builder()
        .header(header::CONTENT_TYPE, applied.rendered.content_type)
        .body(Body::from(applied.rendered.data))
        .map_err(|e| ApplicationError::Composition(format!("Failed to build response: {}", e)))
}

pub async fn preview_image_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApplicationError> {
    let (data, content_type) = read_latest(&state).await?;

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(data))
        .map_err(|e| ApplicationError::Composition(format!("Failed to build preview response: {}", e)))
}

pub async fn download_image_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApplicationError> {
    let (data, content_type) = read_latest(&state).await?;
    let file_name = std::path::Path::new(&state.output_path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("watermarked-image.png")
        .to_string();

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )
        .body(Body::from(data))
        .map_err(|e| ApplicationError::Composition(format!("Failed to build download response: {}", e)))
}

async fn read_latest(state: &AppState) -> Result<(Vec<u8>, &'static str), ApplicationError> {
    let data = state
        .file_storage
        .read_image_impl(&state.output_path)
        .await
        .map_err(|e| {
            tracing::debug!(path = %state.output_path, error = %e, "no stored image");
            ApplicationError::NotFound(state.output_path.clone())
        })?;
    let content_type = image::guess_format(&data)
        .map(mime_for_format)
        .unwrap_or("application/octet-stream");
    Ok((data, content_type))
}
