//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, Multipart, State,
    },
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::advisory::{
    assess_soil, market_outlook, recommend_crops, recommend_fertilizer, CropRequest, CropResponse,
    FertilizerRequest, FertilizerResponse, MarketRequest, MarketResponse, SoilRequest,
    SoilResponse,
};
use crate::inference::UploadedImage;

use super::error::{Result, ServerError};
use super::state::AppState;

/// Multipart field carrying the leaf photo.
pub const UPLOAD_FIELD: &str = "file";

// ============================================================================
// Liveness / System Handlers
// ============================================================================

pub async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "Backend working",
        "message": "NeoKrishi API is live",
    }))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let inference = state.classifier.config();
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.uptime_secs(),
        "model": {
            "classes": state.classifier.labels().len(),
            "input_shape": inference.input_shape(),
            "resize_filter": inference.filter,
        },
        "limits": {
            "max_upload_bytes": state.config.max_upload_size,
            "max_image_dimension": inference.max_image_dimension,
            "max_concurrent_inferences": inference.max_concurrent,
            "inference_timeout_secs": inference.timeout_secs,
        },
        "inference": state.classifier.stats(),
    }))
}

// ============================================================================
// Pest Detection Handlers
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PestResponse {
    pub filename: String,
    pub disease: String,
    pub confidence: String,
}

/// Classify an uploaded leaf photo
pub async fn detect_pest(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<PestResponse>> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;

        info!(
            filename = %filename,
            content_type = content_type.as_deref().unwrap_or("unknown"),
            bytes = data.len(),
            "Received image"
        );

        let mut upload = UploadedImage::new(data.to_vec(), filename.clone());
        if let Some(mime) = content_type {
            upload = upload.with_mime(mime);
        }

        let prediction = state.classifier.classify(upload).await?;
        return Ok(Json(PestResponse {
            filename,
            confidence: prediction.confidence_percent(),
            disease: prediction.label,
        }));
    }

    Err(ServerError::Validation(format!(
        "No image uploaded: expected multipart field '{UPLOAD_FIELD}'"
    )))
}

pub async fn get_pest_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "classes": state.classifier.labels().len(),
        "stats": state.classifier.stats(),
    }))
}

// ============================================================================
// Advisory Handlers
// ============================================================================

pub async fn soil_health(
    payload: std::result::Result<Json<SoilRequest>, JsonRejection>,
) -> Result<Json<SoilResponse>> {
    let Json(request) = payload?;
    Ok(Json(assess_soil(&request)?))
}

pub async fn fertilizer_advice(
    payload: std::result::Result<Json<FertilizerRequest>, JsonRejection>,
) -> Result<Json<FertilizerResponse>> {
    let Json(request) = payload?;
    Ok(Json(recommend_fertilizer(&request)?))
}

pub async fn crop_advice(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CropRequest>, JsonRejection>,
) -> Result<Json<CropResponse>> {
    let Json(request) = payload?;
    Ok(Json(recommend_crops(&request, &state.tables.crops)?))
}

pub async fn market_price(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<MarketRequest>, JsonRejection>,
) -> Result<Json<MarketResponse>> {
    let Json(request) = payload?;
    Ok(Json(market_outlook(&request, &state.tables.market)?))
}
