use axum::{
    extract::{FromRef, Path, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::auth::authorize::require_role;
use crate::auth::extractors::AuthUser;
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::model::Role;
use crate::users::service;

use super::dto::{
    LoginRequest, PasswordConfirmRequest, PasswordUpdateRequest, PublicUser, RegisterRequest,
    TokenResponse, UpdateUserRequest,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/all", get(get_all))
        .route("/users", get(get_logged_user).put(update_logged_user))
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/password", put(update_logged_user_password))
        .route("/users/password/:id", put(update_user_password))
        .route(
            "/users/:key",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state))]
async fn get_all(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = service::get_all(&state.db).await?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, claims))]
async fn get_logged_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = service::get_logged(&state.db, &claims).await?;
    Ok(Json(PublicUser::from(&user)))
}

/// GET /users/{key}: a numeric key is an admin-only lookup by id, anything
/// else a public lookup by username.
#[instrument(skip(state, auth))]
async fn get_user(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = match key.parse::<i64>() {
        Ok(id) => {
            let AuthUser(claims) = auth.ok_or_else(|| {
                ApiError::Unauthorized(
                    "You have to be logged in to access this resource.".to_string(),
                )
            })?;
            require_role(&claims, Role::Admin)?;
            service::get_by_id(&state.db, id).await?
        }
        Err(_) => service::get_by_username(&state.db, &key).await?,
    };
    Ok(Json(PublicUser::from(&user)))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<String>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    let user = service::register(&state.db, &state.config.password_policy, payload).await?;
    Ok(Json(user.full_name()))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    let keys = JwtKeys::from_ref(&state);
    let token = service::login(&state.db, &keys, payload).await?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, claims, payload))]
async fn update_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<String>, ApiError> {
    require_role(&claims, Role::Admin)?;
    let user = service::update_user(&state.db, id, payload).await?;
    Ok(Json(user.full_name()))
}

#[instrument(skip(state, claims, payload))]
async fn update_logged_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<String>, ApiError> {
    require_role(&claims, Role::User)?;
    let user = service::update_logged(&state.db, &claims, payload).await?;
    Ok(Json(user.full_name()))
}

#[instrument(skip(state, claims, payload))]
async fn update_user_password(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<PasswordConfirmRequest>,
) -> Result<Json<String>, ApiError> {
    require_role(&claims, Role::Admin)?;
    let user =
        service::update_password(&state.db, &state.config.password_policy, id, payload).await?;
    Ok(Json(user.full_name()))
}

#[instrument(skip(state, claims, payload))]
async fn update_logged_user_password(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<PasswordUpdateRequest>,
) -> Result<Json<String>, ApiError> {
    require_role(&claims, Role::User)?;
    let user = service::update_logged_password(
        &state.db,
        &state.config.password_policy,
        &claims,
        payload,
    )
    .await?;
    Ok(Json(user.full_name()))
}

#[instrument(skip(state, claims))]
async fn delete_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<String>, ApiError> {
    require_role(&claims, Role::Admin)?;
    let user = service::delete(&state.db, id, &claims).await?;
    Ok(Json(user.full_name()))
}
