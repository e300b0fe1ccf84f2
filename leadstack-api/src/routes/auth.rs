/// Authentication routes
///
/// Registration, login, logout, and current-user lookup. Successful
/// register/login responses carry the session token in an httpOnly
/// `Set-Cookie` header; the body never includes the token.
use crate::{
    app::{AppState, CurrentUser},
    cookies,
    error::{conflict_on_unique, validation_error, ApiError},
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use leadstack_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request body for POST /api/auth/register
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
}

/// Request body for POST /api/auth/login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// User profile as exposed to clients. The password hash never leaves the
/// server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn session_response(status: StatusCode, user: &User, secret: &str) -> Result<Response, ApiError> {
    let claims = jwt::Claims::new(user.id);
    let token = jwt::create_token(&claims, secret)?;

    let mut response = (status, Json(AuthResponse { user: user.into() })).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        cookies::auth_cookie(&token)
            .parse()
            .map_err(|_| ApiError::Internal("Failed to build session cookie".to_string()))?,
    );
    Ok(response)
}

/// POST /api/auth/register
///
/// Creates an account and starts a session in one step. Email is lowercased
/// before storage so lookups are case-insensitive.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    payload.validate().map_err(validation_error)?;

    let password_hash = password::hash_password(&payload.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: payload.email.to_lowercase(),
            password_hash,
            first_name: payload.first_name,
            last_name: payload.last_name,
        },
    )
    .await
    .map_err(|err| conflict_on_unique(err, "User already exists"))?;

    tracing::info!(user_id = %user.id, "User registered");

    session_response(StatusCode::CREATED, &user, state.jwt_secret())
}

/// POST /api/auth/login
///
/// The same "Invalid credentials" message covers both an unknown email and a
/// wrong password, so the endpoint cannot be used to enumerate accounts.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    payload.validate().map_err(validation_error)?;

    let user = User::find_by_email(&state.db, &payload.email.to_lowercase())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    if !password::verify_password(&payload.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    tracing::info!(user_id = %user.id, "User logged in");

    session_response(StatusCode::OK, &user, state.jwt_secret())
}

/// POST /api/auth/logout
///
/// Stateless logout: instructs the browser to drop the cookie. The token
/// itself remains valid until expiry; there is no server-side session store
/// to invalidate.
pub async fn logout() -> Result<Response, ApiError> {
    let mut response = Json(MessageResponse {
        message: "Logged out successfully",
    })
    .into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        cookies::clear_cookie()
            .parse()
            .map_err(|_| ApiError::Internal("Failed to build session cookie".to_string()))?,
    );
    Ok(response)
}

/// GET /api/auth/me
pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<AuthResponse> {
    Json(AuthResponse {
        user: UserProfile {
            id: current.id,
            email: current.email,
            first_name: current.first_name,
            last_name: current.last_name,
        },
    })
}
