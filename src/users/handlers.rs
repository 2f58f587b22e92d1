use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::{ApiError, ApiResult, UNKNOWN_EMAIL, USER_NOT_FOUND, WRONG_PASSWORD},
    posts::repo_types::Post,
    repo::{Id, Repository},
    state::AppState,
    users::{
        dto::{CreateUserRequest, LoginRequest, LoginResponse, UpdateUserRequest, LOGGED_IN},
        repo_types::{NewUser, PublicUser, User, UserPatch},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/login", post(login))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/posts", get(list_user_posts))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = state.users.find_all().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> ApiResult<Json<PublicUser>> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))?;
    Ok(Json(user.into()))
}

/// Responds with the stored row, hash included.
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(payload) = payload?;
    let new = NewUser::try_from(payload).map_err(|e| {
        warn!(error = %e, "invalid user payload");
        ApiError::BadRequest(e.to_string())
    })?;

    let user = state.users.create(new).await?;

    info!(user_id = %user.id, email = %user.email, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<PublicUser>> {
    let Json(payload) = payload?;
    let patch = UserPatch::from(payload);
    let rehash = patch.password.is_some();

    let user = state
        .users
        .update(id, patch)
        .await?
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))?;

    info!(user_id = %user.id, rehash, "user updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<Id>) -> ApiResult<Json<u64>> {
    let removed = state.users.destroy(id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound(USER_NOT_FOUND));
    }

    info!(user_id = %id, "user deleted");
    Ok(Json(removed))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(payload) = payload?;
    let (email, password) = payload
        .into_parts()
        .ok_or_else(|| ApiError::BadRequest("email and password are required".into()))?;

    let user = match state.users.find_by_email(&email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::LoginFailed(UNKNOWN_EMAIL));
        }
    };

    if !user.check_password(&password).await? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::LoginFailed(WRONG_PASSWORD));
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        user: user.into(),
        message: LOGGED_IN,
    }))
}

#[instrument(skip(state))]
pub async fn list_user_posts(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> ApiResult<Json<Vec<Post>>> {
    if state.users.find_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound(USER_NOT_FOUND));
    }
    let posts = state.posts.find_by_user(id).await?;
    Ok(Json(posts))
}
