use axum::{
    extract::State,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::auth::extractors::AuthUser;
use crate::auth::password::hash_password;
use crate::error::ApiError;
use crate::extract::Json;
use crate::posts::dto::PostView;
use crate::posts::repo::PostRow;
use crate::state::AppState;
use crate::users::dto::{PublicUser, UserResponse};
use crate::users::repo::{User, UserPatch};
use crate::validate::Violations;

/// Self-service routes: the caller only ever acts on their own account, so
/// the token's subject is the implicit target and no ownership check exists.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/profile/posts", get(my_posts))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let email = payload.email.map(|e| e.trim().to_lowercase());

    let mut violations = Violations::new();
    if let Some(name) = payload.name.as_deref() {
        violations.non_empty("name", name, "Name is required");
    }
    if let Some(email) = email.as_deref() {
        violations.email("email", email);
    }
    if let Some(password) = payload.password.as_deref() {
        violations.min_len(
            "password",
            password,
            6,
            "Password must be at least 6 characters long",
        );
    }
    violations.finish()?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    // Uniqueness is only re-checked when the address actually changes.
    if let Some(email) = email.as_deref() {
        if email != user.email && User::find_by_email(&state.db, email).await?.is_some() {
            return Err(ApiError::Conflict("Email is already in use".into()));
        }
    }

    let password_hash = match payload.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let updated = User::update(
        &state.db,
        claims.sub,
        UserPatch {
            name: payload.name.as_deref().map(str::trim),
            email: email.as_deref(),
            role: None,
            password_hash: password_hash.as_deref(),
        },
    )
    .await?;

    info!(user_id = %claims.sub, "profile updated");
    Ok(Json(UserResponse {
        message: "Profile updated successfully".into(),
        user: updated.into(),
    }))
}

#[instrument(skip(state))]
pub async fn my_posts(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<PostView>>, ApiError> {
    let posts = PostRow::list_by_author(&state.db, claims.sub).await?;
    Ok(Json(posts.into_iter().map(PostView::from).collect()))
}
