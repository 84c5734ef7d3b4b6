//! Handlers for dashboard authentication.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use palco_core::error::CoreError;
use palco_core::import::normalize_email;
use palco_db::models::user::{LoginRequest, UserInfo};
use palco_db::repositories::UserRepo;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    user: UserInfo,
}

/// POST /api/v1/auth/login
///
/// Verify credentials and issue an access token. The error message is
/// identical for unknown emails and wrong passwords.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let email = normalize_email(&input.email);

    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    let verified = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;

    if !verified {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    let token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(DataResponse {
        data: LoginResponse {
            token,
            user: UserInfo::from(&user),
        },
    }))
}
