use axum::{
    extract::{FromRef, Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::extractors::{authenticate, AuthUser};
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::extract::Json;
use crate::posts::dto::{CreatePostRequest, PostResponse, PostView, UpdatePostRequest};
use crate::posts::repo::PostRow;
use crate::state::AppState;
use crate::users::dto::MessageResponse;
use crate::validate::Violations;

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/:id", get(get_post).put(update_post).delete(delete_post))
}

#[instrument(skip(state))]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostView>>, ApiError> {
    let posts = PostRow::list_all(&state.db).await?;
    Ok(Json(posts.into_iter().map(PostView::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PostView>, ApiError> {
    let post = PostRow::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;
    Ok(Json(post.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let mut violations = Violations::new();
    violations.non_empty("title", &payload.title, "Title is required");
    violations.non_empty("content", &payload.content, "Content is required");
    violations.finish()?;

    let post = PostRow::create(&state.db, &payload.title, &payload.content, claims.sub).await?;

    info!(post_id = %post.id, author_id = %claims.sub, "post created");
    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            message: "Post created successfully".into(),
            post: post.into(),
        }),
    ))
}

/// Update and delete check existence before authentication: a request for a
/// missing post is 404 no matter what the Authorization header holds, so the
/// token is verified in the handler body instead of an extractor.
#[instrument(skip(state, headers, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let mut violations = Violations::new();
    if let Some(title) = payload.title.as_deref() {
        violations.non_empty("title", title, "Title is required");
    }
    if let Some(content) = payload.content.as_deref() {
        violations.non_empty("content", content, "Content is required");
    }
    violations.finish()?;

    let post = PostRow::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;

    let keys = JwtKeys::from_ref(&state);
    let claims = authenticate(&keys, &headers)?;
    if !claims.owns_or_admin(post.author_id) {
        warn!(post_id = %id, caller = %claims.sub, "post update denied");
        return Err(ApiError::Forbidden("Forbidden".into()));
    }

    let updated = PostRow::update(
        &state.db,
        id,
        payload.title.as_deref(),
        payload.content.as_deref(),
    )
    .await?;

    info!(post_id = %id, caller = %claims.sub, "post updated");
    Ok(Json(PostResponse {
        message: "Post updated successfully".into(),
        post: updated.into(),
    }))
}

#[instrument(skip(state, headers))]
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let post = PostRow::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;

    let keys = JwtKeys::from_ref(&state);
    let claims = authenticate(&keys, &headers)?;
    if !claims.owns_or_admin(post.author_id) {
        warn!(post_id = %id, caller = %claims.sub, "post delete denied");
        return Err(ApiError::Forbidden("Forbidden".into()));
    }

    PostRow::delete(&state.db, id).await?;

    info!(post_id = %id, caller = %claims.sub, "post deleted");
    Ok(Json(MessageResponse {
        message: "Post deleted successfully".into(),
    }))
}
