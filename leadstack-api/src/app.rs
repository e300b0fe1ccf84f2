/// Application state and router builder
///
/// This module defines the shared application state, builds the Axum router
/// with all routes and middleware, and implements the cookie auth gate that
/// every lead operation passes through.
///
/// # Example
///
/// ```no_run
/// use leadstack_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = leadstack_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```
use crate::{cookies, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use leadstack_shared::{auth::jwt, models::user::User};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. The pool is
/// the process-owned store handle — components receive it through this state,
/// never through ambient globals.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<crate::config::Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: crate::config::Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Authenticated identity injected into request extensions by the auth gate.
///
/// Handlers extract it with `Extension<CurrentUser>`. The password hash never
/// crosses into this type.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /api
/// ├── /health                 # Health check (public)
/// ├── /auth/
/// │   ├── POST /register      # Create account, sets auth cookie
/// │   ├── POST /login         # Sets auth cookie
/// │   ├── POST /logout        # Clears auth cookie
/// │   └── GET  /me            # Current user (authenticated)
/// └── /leads/                 # Lead CRUD + filtered listing (authenticated)
///     ├── POST   /
///     ├── GET    /?page=&limit=&filters=
///     ├── GET    /:id
///     ├── PUT    /:id
///     └── DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS, restricted to the configured frontend origin with credentials
/// 3. Cookie authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes: register/login/logout are public, /me sits behind the gate
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .merge(
            Router::new()
                .route("/me", get(routes::auth::me))
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    cookie_auth_layer,
                )),
        );

    // Lead routes (all require a valid auth cookie)
    let lead_routes = Router::new()
        .route(
            "/",
            post(routes::leads::create_lead).get(routes::leads::list_leads),
        )
        .route(
            "/:id",
            get(routes::leads::get_lead)
                .put(routes::leads::update_lead)
                .delete(routes::leads::delete_lead),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            cookie_auth_layer,
        ));

    let api_routes = Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .nest("/leads", lead_routes);

    // Cookies require a concrete origin with credentials allowed; a wildcard
    // would make the browser drop them.
    let cors = match state.config.api.frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600)),
        Err(_) => CorsLayer::new(),
    };

    Router::new()
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Cookie authentication middleware layer
///
/// Extracts the session token from the auth cookie, validates the signature
/// and expiry, resolves the user (a minimal existence check — a token for a
/// deleted account is as good as no token), and injects [`CurrentUser`] into
/// request extensions. A missing or invalid token short-circuits here: no
/// downstream handler runs.
async fn cookie_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(cookies::token_from_header)
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    req.extensions_mut().insert(CurrentUser::from(user));

    Ok(next.run(req).await)
}
