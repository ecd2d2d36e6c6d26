use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::claims::Role;
use crate::auth::extractors::Admin;
use crate::error::ApiError;
use crate::extract::Json;
use crate::state::AppState;
use crate::users::dto::{AdminUpdateUserRequest, MessageResponse, PublicUser, UserResponse};
use crate::users::repo::{User, UserPatch};
use crate::validate::Violations;

/// All /users routes are gated by the admin role; ownership does not apply.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Admin(_): Admin,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = User::list_all(&state.db).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Admin(claims): Admin,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let email = payload.email.map(|e| e.trim().to_lowercase());

    let mut violations = Violations::new();
    if let Some(name) = payload.name.as_deref() {
        violations.non_empty("name", name, "Name is required");
    }
    if let Some(email) = email.as_deref() {
        violations.email("email", email);
    }
    let role = match payload.role.as_deref() {
        None => None,
        Some("user") => Some(Role::User),
        Some("admin") => Some(Role::Admin),
        Some(_) => {
            violations.add("role", "Role must be either user or admin");
            None
        }
    };
    violations.finish()?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if let Some(email) = email.as_deref() {
        if email != user.email && User::find_by_email(&state.db, email).await?.is_some() {
            return Err(ApiError::Conflict("Email is already in use".into()));
        }
    }

    let updated = User::update(
        &state.db,
        id,
        UserPatch {
            name: payload.name.as_deref().map(str::trim),
            email: email.as_deref(),
            role,
            password_hash: None,
        },
    )
    .await?;

    info!(admin_id = %claims.sub, user_id = %id, "user updated by admin");
    Ok(Json(UserResponse {
        message: "User updated successfully".into(),
        user: updated.into(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Admin(claims): Admin,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    // Authored posts are intentionally left in place; their author reference
    // dangles and reads render the author as unknown.
    let deleted = User::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".into()));
    }
    info!(admin_id = %claims.sub, user_id = %id, "user deleted by admin");
    Ok(Json(MessageResponse {
        message: "User deleted successfully".into(),
    }))
}
