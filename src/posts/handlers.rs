use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::{ApiError, ApiResult, POST_NOT_FOUND},
    posts::{
        dto::{CreatePostRequest, UpdatePostRequest},
        repo_types::{NewPost, Post, PostPatch},
    },
    repo::{Id, Repository},
    state::AppState,
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/:id", get(get_post).put(update_post).delete(delete_post))
}

#[instrument(skip(state))]
pub async fn list_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<Post>>> {
    Ok(Json(state.posts.find_all().await?))
}

#[instrument(skip(state))]
pub async fn get_post(State(state): State<AppState>, Path(id): Path<Id>) -> ApiResult<Json<Post>> {
    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound(POST_NOT_FOUND))?;
    Ok(Json(post))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let Json(payload) = payload?;
    let new = NewPost::try_from(payload).map_err(|e| {
        warn!(error = %e, "invalid post payload");
        ApiError::BadRequest(e.to_string())
    })?;

    let post = state.posts.create(new).await?;

    info!(post_id = %post.id, user_id = %post.user_id, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

#[instrument(skip(state, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> ApiResult<Json<Post>> {
    let Json(payload) = payload?;
    let post = state
        .posts
        .update(id, PostPatch::from(payload))
        .await?
        .ok_or(ApiError::NotFound(POST_NOT_FOUND))?;
    Ok(Json(post))
}

#[instrument(skip(state))]
pub async fn delete_post(State(state): State<AppState>, Path(id): Path<Id>) -> ApiResult<Json<u64>> {
    let removed = state.posts.destroy(id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound(POST_NOT_FOUND));
    }
    Ok(Json(removed))
}
