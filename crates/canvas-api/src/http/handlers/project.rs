//! Project CRUD and attribute-generation handlers for the REST API.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use canvas_core::agent;
use canvas_core::webhook::DispatchOptions;
use canvas_types::error::StoreError;
use canvas_types::project::{NewProject, ProjectPatch};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProjectListQuery {
    pub owner: Option<String>,
}

/// POST /api/v1/projects - Create a project (and select it).
pub async fn create_project(
    State(state): State<AppState>,
    Json(body): Json<NewProject>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if body.name.trim().is_empty() {
        return Err(AppError::Validation("project name must not be empty".to_string()));
    }

    let project = state.project_store.add(body).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(serde_json::to_value(&project).unwrap(), request_id, elapsed)
        .with_link("self", &format!("/api/v1/projects/{}", project.id))
        .with_link("generate", &format!("/api/v1/projects/{}/generate", project.id));
    Ok(Json(resp))
}

/// GET /api/v1/projects - List projects, optionally filtered by owner.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let projects = match &query.owner {
        Some(owner) => state.project_store.by_owner(owner).await,
        None => state.project_store.list().await,
    };
    let elapsed = start.elapsed().as_millis() as u64;

    let projects_json: Vec<serde_json::Value> = projects
        .iter()
        .map(|p| serde_json::to_value(p).unwrap())
        .collect();

    let resp = ApiResponse::success(projects_json, request_id, elapsed)
        .with_link("self", "/api/v1/projects");
    Ok(Json(resp))
}

/// GET /api/v1/projects/:id - Get a project by ID.
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let project = state.project_store.get(id).await.ok_or(StoreError::NotFound)?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(serde_json::to_value(&project).unwrap(), request_id, elapsed)
        .with_link("self", &format!("/api/v1/projects/{}", project.id));
    Ok(Json(resp))
}

/// PUT /api/v1/projects/:id - Apply a partial update.
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let project = state.project_store.update(id, patch).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(serde_json::to_value(&project).unwrap(), request_id, elapsed)
        .with_link("self", &format!("/api/v1/projects/{}", project.id));
    Ok(Json(resp))
}

/// DELETE /api/v1/projects/:id - Delete a project.
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    state.project_store.delete(id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(
        serde_json::json!({ "deleted": id.to_string() }),
        request_id,
        elapsed,
    );
    Ok(Json(resp))
}

/// POST /api/v1/projects/:id/select - Make a project the current selection.
pub async fn select_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    state.project_store.select(Some(id)).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(
        serde_json::json!({ "selected": id.to_string() }),
        request_id,
        elapsed,
    );
    Ok(Json(resp))
}

/// POST /api/v1/projects/:id/generate - Ask the project's agent flow to
/// generate attributes.
///
/// Dispatches a `generate-project-attributes` envelope to the project's
/// webhook URL (falling back to the configured agent URL) and spawns a
/// background task that folds the generated attributes back into the
/// project once the session resolves.
pub async fn generate_attributes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let project = state.project_store.get(id).await.ok_or(StoreError::NotFound)?;
    let url = project
        .webhook_url
        .clone()
        .or_else(|| state.config.webhook.agent_url.clone())
        .ok_or_else(|| {
            AppError::Validation("project has no webhook URL and no agent URL is configured".to_string())
        })?;

    let envelope = agent::attribute_request_envelope(&project);
    let session_id = envelope.session_id.clone();
    let handle = state
        .webhook
        .dispatch(&url, envelope, DispatchOptions::default())
        .await?;

    tracing::info!(
        project_id = %project.id,
        session_id = %session_id,
        "attribute generation requested"
    );

    // Fold the generated attributes back in once the session resolves.
    let store = state.project_store.clone();
    tokio::spawn(async move {
        let outcome = match handle.outcome().await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(project_id = %id, error = %e, "attribute generation aborted");
                return;
            }
        };
        let Some(generated) = agent::parse_generation_outcome(&outcome) else {
            tracing::warn!(project_id = %id, outcome = ?outcome, "attribute generation did not produce attributes");
            return;
        };
        let Some(project) = store.get(id).await else {
            tracing::warn!(project_id = %id, "project deleted before generated attributes arrived");
            return;
        };
        let patch = agent::apply_generated_attributes(&project, &generated);
        match store.update(id, patch).await {
            Ok(_) => tracing::info!(project_id = %id, "generated attributes applied"),
            Err(e) => tracing::error!(project_id = %id, error = %e, "failed to apply generated attributes"),
        }
    });

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        serde_json::json!({
            "sessionId": session_id,
            "status": "submitted",
        }),
        request_id,
        elapsed,
    )
    .with_link("project", &format!("/api/v1/projects/{}", id));
    Ok(Json(resp))
}
