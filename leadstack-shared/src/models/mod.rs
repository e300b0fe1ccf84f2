/// Database models for LeadStack
///
/// # Models
///
/// - `user`: User accounts (the credential store behind the auth gate)
/// - `lead`: Lead records, owner-scoped CRUD, and the paginated listing engine
///
/// # Example
///
/// ```no_run
/// use leadstack_shared::models::user::{User, CreateUser};
/// use leadstack_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     first_name: "John".to_string(),
///     last_name: "Doe".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```
pub mod lead;
pub mod user;
