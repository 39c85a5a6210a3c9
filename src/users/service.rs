//! Per-endpoint orchestration. Each operation is a short linear sequence
//! with early exits; the caller's claims are always an explicit parameter,
//! never ambient state.

use sqlx::PgPool;
use tracing::info;

use crate::auth::claims::Claims;
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::config::{AppConfig, PasswordPolicy};
use crate::error::{is_unique_violation, ApiError};
use crate::users::dto::{
    LoginRequest, PasswordConfirmRequest, PasswordUpdateRequest, RegisterRequest,
    UpdateUserRequest,
};
use crate::users::model::{Role, User};
use crate::validation::{validate_email, validate_password, validate_username};

pub async fn get_all(db: &PgPool) -> Result<Vec<User>, ApiError> {
    let users = User::find_all(db).await?;
    info!(count = users.len(), "retrieved users");
    Ok(users)
}

pub async fn get_logged(db: &PgPool, principal: &Claims) -> Result<User, ApiError> {
    get_by_id(db, principal.sid).await
}

pub async fn get_by_id(db: &PgPool, id: i64) -> Result<User, ApiError> {
    User::find_by_id(db, id).await?.ok_or_else(|| {
        ApiError::NotFound(format!("There is no user account associated with the id {id}."))
    })
}

pub async fn get_by_username(db: &PgPool, username: &str) -> Result<User, ApiError> {
    User::find_by_username(db, username).await?.ok_or_else(|| {
        ApiError::NotFound(format!(
            "There is no user account associated with the username {username}."
        ))
    })
}

pub async fn register(
    db: &PgPool,
    policy: &PasswordPolicy,
    req: RegisterRequest,
) -> Result<User, ApiError> {
    validate_email(&req.email)?;
    validate_password(&req.password, policy)?;
    validate_username(&req.username)?;

    if User::find_by_email(db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Email {} belongs to another user.",
            req.email
        )));
    }
    if User::find_by_username(db, &req.username).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Username {} belongs to another user.",
            req.username
        )));
    }

    let password = hash_password(&req.password)?;
    let user = User::new(
        req.email,
        req.username,
        password,
        req.first_name,
        req.last_name,
        Role::User,
    );

    // The read-then-write uniqueness check above races with concurrent
    // registrations; the schema's unique constraints settle it at commit.
    let user = User::insert(db, user).await.map_err(conflict_on_unique)?;

    info!(user_id = user.id, username = %user.username, "registered user");
    Ok(user)
}

pub async fn login(db: &PgPool, keys: &JwtKeys, req: LoginRequest) -> Result<String, ApiError> {
    let user = User::find_by_email(db, &req.email).await?.ok_or_else(|| {
        ApiError::NotFound(format!(
            "There is no user account associated with the email {}.",
            req.email
        ))
    })?;

    if !verify_password(&req.password, &user.password)? {
        return Err(ApiError::BadRequest("Wrong email or password.".to_string()));
    }

    let token = keys.issue(&user)?;
    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(token)
}

pub async fn update_user(
    db: &PgPool,
    id: i64,
    req: UpdateUserRequest,
) -> Result<User, ApiError> {
    validate_email(&req.email)?;
    validate_username(&req.username)?;

    let mut user = get_by_id(db, id).await?;

    if req.email != user.email && User::find_by_email(db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Email {} belongs to another user.",
            req.email
        )));
    }
    if req.username != user.username
        && User::find_by_username(db, &req.username).await?.is_some()
    {
        return Err(ApiError::Conflict(format!(
            "Username {} belongs to another user.",
            req.username
        )));
    }

    user.email = req.email;
    user.username = req.username;
    user.first_name = req.first_name;
    user.last_name = req.last_name;

    user.update(db).await.map_err(conflict_on_unique)?;
    info!(user_id = user.id, "updated user profile");
    Ok(user)
}

pub async fn update_logged(
    db: &PgPool,
    principal: &Claims,
    req: UpdateUserRequest,
) -> Result<User, ApiError> {
    update_user(db, principal.sid, req).await
}

pub async fn update_password(
    db: &PgPool,
    policy: &PasswordPolicy,
    id: i64,
    req: PasswordConfirmRequest,
) -> Result<User, ApiError> {
    if req.password != req.password_confirmation {
        return Err(ApiError::BadRequest("Passwords do not match.".to_string()));
    }
    validate_password(&req.password, policy)?;

    let mut user = get_by_id(db, id).await?;

    if verify_password(&req.password, &user.password)? {
        return Err(ApiError::BadRequest(
            "The new password must be different from the old one.".to_string(),
        ));
    }

    user.password = hash_password(&req.password)?;
    user.update(db).await?;
    info!(user_id = user.id, "updated password");
    Ok(user)
}

pub async fn update_logged_password(
    db: &PgPool,
    policy: &PasswordPolicy,
    principal: &Claims,
    req: PasswordUpdateRequest,
) -> Result<User, ApiError> {
    let user = get_logged(db, principal).await?;

    if !verify_password(&req.old_password, &user.password)? {
        return Err(ApiError::Unauthorized("Wrong password.".to_string()));
    }

    update_password(
        db,
        policy,
        user.id,
        PasswordConfirmRequest {
            password: req.password,
            password_confirmation: req.password_confirmation,
        },
    )
    .await
}

pub async fn delete(db: &PgPool, id: i64, principal: &Claims) -> Result<User, ApiError> {
    if id == principal.sid {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account.".to_string(),
        ));
    }

    let mut user = get_by_id(db, id).await?;
    let username = user.username.clone();

    user.soft_delete(db).await?;
    info!(user_id = user.id, username = %username, "deleted user");
    Ok(user)
}

/// Insert the configured default admin account unless an admin already
/// exists. Called once at startup.
pub async fn seed_default_admin(db: &PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let Some(admin) = &config.default_admin else {
        return Ok(());
    };

    let admins = sqlx::query_scalar::<_, i64>(
        "SELECT count(*) FROM users WHERE role = $1 AND NOT is_deleted",
    )
    .bind(Role::Admin)
    .fetch_one(db)
    .await?;
    if admins > 0 {
        return Ok(());
    }

    let user = User::new(
        admin.email.clone(),
        admin.username.clone(),
        hash_password(&admin.password)?,
        admin.first_name.clone(),
        admin.last_name.clone(),
        Role::Admin,
    );
    let user = User::insert(db, user).await?;
    info!(user_id = user.id, "default admin created");
    Ok(())
}

fn conflict_on_unique(err: anyhow::Error) -> ApiError {
    if is_unique_violation(&err) {
        ApiError::Conflict("Email or username belongs to another user.".to_string())
    } else {
        ApiError::Internal(err)
    }
}
