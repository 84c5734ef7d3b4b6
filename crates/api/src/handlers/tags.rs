//! Handlers for tag CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use palco_core::error::CoreError;
use palco_core::types::DbId;
use palco_db::models::tag::{CreateTag, UpdateTag};
use palco_db::repositories::TagRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/newsletter/tags
///
/// List all tags, alphabetically.
pub async fn list_tags(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let tags = TagRepo::list_all(&state.pool).await?;

    Ok(Json(DataResponse { data: tags }))
}

/// POST /api/v1/newsletter/tags
///
/// Create a tag. Duplicate names are rejected with 409.
pub async fn create_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTag>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    let tag = TagRepo::create(
        &state.pool,
        &input.name,
        input.color.as_deref(),
        input.description.as_deref(),
    )
    .await?;

    tracing::info!(tag_id = tag.id, user_id = auth.user_id, "Tag created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: tag })))
}

/// PUT /api/v1/newsletter/tags/{id}
///
/// Update a tag's color and/or description.
pub async fn update_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(tag_id): Path<DbId>,
    Json(input): Json<UpdateTag>,
) -> AppResult<impl IntoResponse> {
    let tag = TagRepo::update(
        &state.pool,
        tag_id,
        input.color.as_deref(),
        input.description.as_deref(),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Tag",
        id: tag_id,
    }))?;

    tracing::info!(tag_id, user_id = auth.user_id, "Tag updated");

    Ok(Json(DataResponse { data: tag }))
}

/// DELETE /api/v1/newsletter/tags/{id}
///
/// Delete a tag and all its subscriber associations. Admin only.
pub async fn delete_tag(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(tag_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = TagRepo::delete(&state.pool, tag_id).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Tag",
            id: tag_id,
        }));
    }

    tracing::info!(tag_id, user_id = admin.user_id, "Tag deleted");

    Ok(StatusCode::NO_CONTENT)
}
