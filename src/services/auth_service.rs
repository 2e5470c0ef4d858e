use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest, UserList},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult, is_unique_violation},
    middleware::auth::{AuthUser, ensure_admin, issue_token},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// `Some(trimmed)` for a non-blank value, so blank patch fields keep what is stored.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn email_taken(state: &AppState, email: &str) -> AppResult<Option<Uuid>> {
    let existing = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(&state.orm)
        .await?;
    Ok(existing.map(|u| u.id))
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        name,
        email,
        password,
    } = payload;
    let email = email.trim().to_lowercase();
    if name.trim().is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "name, email and password are required".into(),
        ));
    }

    if email_taken(state, &email).await?.is_some() {
        return Err(AppError::BadRequest("User already exists".into()));
    }

    let password_hash = hash_password(&password)?;

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.trim().to_string()),
        email: Set(email),
        password_hash: Set(password_hash),
        is_admin: Set(false),
        mobile: Set(None),
        street: Set(None),
        city: Set(None),
        state: Set(None),
        zip_code: Set(None),
        country: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            AppError::BadRequest("User already exists".into())
        } else {
            err.into()
        }
    })?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(ApiResponse::success(
        "User registered successfully",
        user.into(),
        None,
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let user = Users::find()
        .filter(UserCol::Email.eq(email.trim().to_lowercase()))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    if !verify_password(&password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "login rejected");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = issue_token(&state.config, user.id, user.is_admin)?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse { token },
        Some(Meta::empty()),
    ))
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let found = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(ApiResponse::success("Profile", found.into(), Some(Meta::empty())))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let new_email = non_empty(payload.email).map(|e| e.to_lowercase());
    if let Some(email) = new_email.as_deref() {
        if email != existing.email {
            if let Some(owner) = email_taken(state, email).await? {
                if owner != existing.id {
                    return Err(AppError::BadRequest("Email is already taken".into()));
                }
            }
        }
    }

    let mut active: UserActive = existing.into();
    if let Some(name) = non_empty(payload.name) {
        active.name = Set(name);
    }
    if let Some(email) = new_email {
        active.email = Set(email);
    }
    if let Some(mobile) = non_empty(payload.mobile) {
        active.mobile = Set(Some(mobile));
    }
    if let Some(address) = payload.address {
        if let Some(street) = non_empty(address.street) {
            active.street = Set(Some(street));
        }
        if let Some(city) = non_empty(address.city) {
            active.city = Set(Some(city));
        }
        if let Some(region) = non_empty(address.state) {
            active.state = Set(Some(region));
        }
        if let Some(zip_code) = non_empty(address.zip_code) {
            active.zip_code = Set(Some(zip_code));
        }
        if let Some(country) = non_empty(address.country) {
            active.country = Set(Some(country));
        }
    }
    if let Some(password) = payload.password.filter(|p| !p.is_empty()) {
        active.password_hash = Set(hash_password(&password)?);
    }

    let updated = active.update(&state.orm).await.map_err(|err| {
        if is_unique_violation(&err) {
            AppError::BadRequest("Email is already taken".into())
        } else {
            err.into()
        }
    })?;

    tracing::info!(user_id = %updated.id, "profile updated");

    Ok(ApiResponse::success(
        "Profile updated successfully",
        updated.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_users(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let items: Vec<User> = Users::find()
        .order_by_asc(UserCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Users::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("User"));
    }

    tracing::info!(user_id = %id, admin_id = %user.user_id, "user deleted");

    Ok(ApiResponse::success(
        "User deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
