// src/handlers/user.rs
use axum::{extract::State, http::StatusCode, Extension, Json};
use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::{info, instrument, warn};

use crate::dtos::user::{LoginRequest, LoginResponse, ProfileResponse, RegisterUserRequest, UpdateProfileRequest};
use crate::error::{map_unique_violation, AppError};
use crate::middleware::auth::AuthContext;
use crate::models::profile::Profile;
use crate::state::AppState;

const PROFILE_COLUMNS: &str = "id, email, password_hash, full_name, avatar_url, brand_name, occupation, created_at";
const MIN_PASSWORD_LEN: usize = 6;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// POST /auth/register
#[instrument(skip(state, payload))]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("A valid email is required"));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation("Password too short"));
    }

    let password_hash =
        hash(&payload.password, DEFAULT_COST).map_err(|e| AppError::internal(format!("Hash error: {e}")))?;

    let mut tx = state.db_pool.begin().await?;

    let sql = format!(
        "INSERT INTO profiles (email, password_hash, full_name, brand_name)
         VALUES ($1, $2, $3, $4) RETURNING {PROFILE_COLUMNS}"
    );
    let profile = sqlx::query_as::<_, Profile>(&sql)
        .bind(&email)
        .bind(&password_hash)
        .bind(&payload.full_name)
        .bind(&payload.brand_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "Email already registered"))?;

    sqlx::query("INSERT INTO user_configs (user_id) VALUES ($1)")
        .bind(profile.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(user_id = %profile.id, "Registered new user");
    Ok((StatusCode::CREATED, Json(ProfileResponse::from(profile))))
}

// POST /auth/login
#[instrument(skip(state, payload))]
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = normalize_email(&payload.email);
    if email.is_empty() {
        return Err(AppError::validation("Email required"));
    }
    if payload.password.is_empty() {
        return Err(AppError::validation("Password required"));
    }

    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = $1");
    let profile = sqlx::query_as::<_, Profile>(&sql)
        .bind(&email)
        .fetch_optional(&state.db_pool)
        .await?;

    let Some(profile) = profile else {
        warn!("Login attempt for unknown email");
        return Err(AppError::unauthorized("Invalid credentials"));
    };

    let password_ok = verify(&payload.password, &profile.password_hash)
        .map_err(|e| AppError::internal(format!("Verify error: {e}")))?;
    if !password_ok {
        warn!(user_id = %profile.id, "Login attempt with wrong password");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let access_token = state.jwt.sign_token(profile.id, &profile.email)?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in_seconds: state.jwt.ttl_seconds(),
    }))
}

// GET /auth/me
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ProfileResponse>, AppError> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
    let profile = sqlx::query_as::<_, Profile>(&sql)
        .bind(auth.user_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found"))?;

    Ok(Json(ProfileResponse::from(profile)))
}

// PUT /auth/me
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let sql = format!(
        "UPDATE profiles SET
         full_name = COALESCE($1, full_name),
         avatar_url = COALESCE($2, avatar_url),
         brand_name = COALESCE($3, brand_name),
         occupation = COALESCE($4, occupation)
         WHERE id = $5 RETURNING {PROFILE_COLUMNS}"
    );
    let profile = sqlx::query_as::<_, Profile>(&sql)
        .bind(payload.full_name)
        .bind(payload.avatar_url)
        .bind(payload.brand_name)
        .bind(payload.occupation)
        .bind(auth.user_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found"))?;

    Ok(Json(ProfileResponse::from(profile)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Maker@Example.COM "), "maker@example.com");
    }
}
