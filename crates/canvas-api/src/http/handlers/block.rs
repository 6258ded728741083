//! Building-block CRUD handlers for the REST API.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use canvas_types::block::{BlockPatch, NewBlock};
use canvas_types::error::StoreError;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/blocks - Create a block.
pub async fn create_block(
    State(state): State<AppState>,
    Json(body): Json<NewBlock>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if body.name.trim().is_empty() {
        return Err(AppError::Validation("block name must not be empty".to_string()));
    }

    let block = state.block_store.add(body).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(serde_json::to_value(&block).unwrap(), request_id, elapsed)
        .with_link("self", &format!("/api/v1/blocks/{}", block.id));
    Ok(Json(resp))
}

/// GET /api/v1/blocks - List all blocks.
pub async fn list_blocks(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let blocks = state.block_store.list().await;
    let elapsed = start.elapsed().as_millis() as u64;

    let blocks_json: Vec<serde_json::Value> = blocks
        .iter()
        .map(|b| serde_json::to_value(b).unwrap())
        .collect();

    let resp = ApiResponse::success(blocks_json, request_id, elapsed)
        .with_link("self", "/api/v1/blocks")
        .with_link("categorized", "/api/v1/blocks/categorized");
    Ok(Json(resp))
}

/// GET /api/v1/blocks/categorized - Blocks grouped by kind for the sidebar.
pub async fn categorized_blocks(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let categories = state.block_store.categorized().await;
    let elapsed = start.elapsed().as_millis() as u64;

    let categories_json: Vec<serde_json::Value> = categories
        .iter()
        .map(|c| serde_json::to_value(c).unwrap())
        .collect();

    let resp = ApiResponse::success(categories_json, request_id, elapsed)
        .with_link("self", "/api/v1/blocks/categorized");
    Ok(Json(resp))
}

/// GET /api/v1/blocks/:id - Get a block by ID.
pub async fn get_block(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let block = state.block_store.get(id).await.ok_or(StoreError::NotFound)?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(serde_json::to_value(&block).unwrap(), request_id, elapsed)
        .with_link("self", &format!("/api/v1/blocks/{}", block.id));
    Ok(Json(resp))
}

/// PUT /api/v1/blocks/:id - Apply a partial update.
pub async fn update_block(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<BlockPatch>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let block = state.block_store.update(id, patch).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(serde_json::to_value(&block).unwrap(), request_id, elapsed)
        .with_link("self", &format!("/api/v1/blocks/{}", block.id));
    Ok(Json(resp))
}

/// DELETE /api/v1/blocks/:id - Delete a block.
pub async fn delete_block(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    state.block_store.delete(id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(
        serde_json::json!({ "deleted": id.to_string() }),
        request_id,
        elapsed,
    );
    Ok(Json(resp))
}

/// POST /api/v1/blocks/:id/select - Make a block the current selection.
pub async fn select_block(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    state.block_store.select(Some(id)).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(
        serde_json::json!({ "selected": id.to_string() }),
        request_id,
        elapsed,
    );
    Ok(Json(resp))
}
