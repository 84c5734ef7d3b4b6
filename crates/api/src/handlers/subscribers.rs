//! Handlers for subscriber management: public signup, listing, CSV
//! import, and per-subscriber tag associations.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use validator::ValidateEmail;

use palco_core::error::CoreError;
use palco_core::import::{normalize_email, parse_subscriber_csv, RowError};
use palco_core::types::DbId;
use palco_db::models::subscriber::{CreateSubscriber, SubscriberListParams};
use palco_db::models::tag::ApplyTagRequest;
use palco_db::repositories::{SubscriberRepo, TagRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Source recorded for signups through the public website form.
const SOURCE_WEBSITE: &str = "website";

#[derive(Debug, Serialize)]
struct ImportResponse {
    imported: i64,
    skipped: i64,
    duplicates: usize,
    errors: Vec<RowError>,
}

/// POST /api/v1/newsletter/subscribe
///
/// Public signup endpoint for the website form. Re-subscribing a
/// previously unsubscribed email reactivates it.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(input): Json<CreateSubscriber>,
) -> AppResult<impl IntoResponse> {
    let email = normalize_email(&input.email);
    if !email.validate_email() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invalid email '{email}'"
        ))));
    }

    let subscriber = SubscriberRepo::create_or_reactivate(
        &state.pool,
        &email,
        input.name.as_deref().map(str::trim).filter(|n| !n.is_empty()),
        Some(input.source.as_deref().unwrap_or(SOURCE_WEBSITE)),
    )
    .await?;

    tracing::info!(subscriber_id = subscriber.id, "Subscriber signed up");

    Ok((StatusCode::CREATED, Json(DataResponse { data: subscriber })))
}

/// GET /api/v1/newsletter/subscribers
///
/// List subscribers, newest first, with pagination.
pub async fn list_subscribers(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SubscriberListParams>,
) -> AppResult<impl IntoResponse> {
    let subscribers = SubscriberRepo::list(&state.pool, &params).await?;

    Ok(Json(DataResponse { data: subscribers }))
}

/// POST /api/v1/newsletter/subscribers/import
///
/// Multipart CSV upload. Rows failing validation are reported back with
/// their line numbers; existing emails are skipped, never reactivated.
pub async fn import_subscribers(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut data = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if data.is_none() {
            data = Some(field.bytes().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read uploaded file: {e}"))
            })?);
        }
    }

    let data =
        data.ok_or_else(|| AppError::BadRequest("Missing file in multipart body".into()))?;

    let parsed = parse_subscriber_csv(&data)?;
    let outcome = SubscriberRepo::import_batch(&state.pool, &parsed.subscribers).await?;

    tracing::info!(
        imported = outcome.imported,
        skipped = outcome.skipped,
        invalid = parsed.errors.len(),
        user_id = auth.user_id,
        "Subscribers imported",
    );

    Ok(Json(DataResponse {
        data: ImportResponse {
            imported: outcome.imported,
            skipped: outcome.skipped,
            duplicates: parsed.duplicates,
            errors: parsed.errors,
        },
    }))
}

// ---------------------------------------------------------------------------
// Subscriber-tag associations
// ---------------------------------------------------------------------------

/// GET /api/v1/newsletter/subscribers/{id}/tags
///
/// List all tags attached to a subscriber.
pub async fn get_subscriber_tags(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(subscriber_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_subscriber_exists(&state, subscriber_id).await?;

    let tags = TagRepo::subscriber_tags(&state.pool, subscriber_id).await?;

    Ok(Json(DataResponse { data: tags }))
}

/// POST /api/v1/newsletter/subscribers/{id}/tags
///
/// Attach a tag to a subscriber. Idempotent: re-attaching an existing
/// tag is a no-op. Returns the full tag list after the change.
pub async fn apply_subscriber_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(subscriber_id): Path<DbId>,
    Json(input): Json<ApplyTagRequest>,
) -> AppResult<impl IntoResponse> {
    ensure_subscriber_exists(&state, subscriber_id).await?;

    TagRepo::find_by_id(&state.pool, input.tag_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Tag",
            id: input.tag_id,
        }))?;

    TagRepo::tag_subscriber(&state.pool, subscriber_id, input.tag_id).await?;

    tracing::info!(
        subscriber_id,
        tag_id = input.tag_id,
        user_id = auth.user_id,
        "Tag applied to subscriber",
    );

    let tags = TagRepo::subscriber_tags(&state.pool, subscriber_id).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: tags })))
}

/// DELETE /api/v1/newsletter/subscribers/{id}/tags/{tag_id}
///
/// Detach a tag from a subscriber.
pub async fn remove_subscriber_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((subscriber_id, tag_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let removed = TagRepo::untag_subscriber(&state.pool, subscriber_id, tag_id).await?;

    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "SubscriberTag",
            id: tag_id,
        }));
    }

    tracing::info!(
        subscriber_id,
        tag_id,
        user_id = auth.user_id,
        "Tag removed from subscriber",
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Reject requests that reference an unknown subscriber.
async fn ensure_subscriber_exists(state: &AppState, subscriber_id: DbId) -> AppResult<()> {
    SubscriberRepo::find_by_id(&state.pool, subscriber_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Subscriber",
            id: subscriber_id,
        }))?;
    Ok(())
}
