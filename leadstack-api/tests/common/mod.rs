/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user creation
/// - Session cookie generation
/// - Lead creation helpers
use leadstack_api::app::{build_router, AppState};
use leadstack_api::config::Config;
use leadstack_shared::auth::jwt::{create_token, Claims};
use leadstack_shared::models::lead::{CreateLead, Lead, LeadSource, LeadStatus};
use leadstack_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh user
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Migrations path is relative to Cargo.toml, not this file
        sqlx::migrate!("../migrations").run(&db).await?;

        let user = User::create(
            &db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                password_hash: leadstack_shared::auth::password::hash_password("password123")?,
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
            },
        )
        .await?;

        let claims = Claims::new(user.id);
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            user,
            jwt_token,
        })
    }

    /// Returns the Cookie header value carrying the session token
    pub fn auth_cookie(&self) -> String {
        format!("token={}", self.jwt_token)
    }

    /// Creates a second user in the same database, for isolation tests
    pub async fn other_user(&self) -> anyhow::Result<User> {
        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("other-{}@example.com", Uuid::new_v4()),
                password_hash: leadstack_shared::auth::password::hash_password("password123")?,
                first_name: "Other".to_string(),
                last_name: "User".to_string(),
            },
        )
        .await?;
        Ok(user)
    }

    /// Cleans up test data (leads cascade from users)
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE email LIKE 'test-%@example.com' OR email LIKE 'other-%@example.com'")
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Helper to insert a lead directly, bypassing the HTTP layer
pub async fn create_test_lead(
    ctx: &TestContext,
    owner: Uuid,
    email: &str,
    status: LeadStatus,
    score: i32,
) -> anyhow::Result<Lead> {
    let lead = Lead::create(
        &ctx.db,
        CreateLead {
            user_id: owner,
            first_name: "Lead".to_string(),
            last_name: "Person".to_string(),
            email: email.to_string(),
            phone: "555-0100".to_string(),
            company: "Acme".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            source: LeadSource::Website,
            status,
            score,
            lead_value: 100.0,
            is_qualified: false,
            last_activity_at: None,
        },
    )
    .await?;

    Ok(lead)
}
