/// HTTP route handlers
///
/// - `health`: liveness probe with a database check
/// - `auth`: account registration, login, logout, and current-user lookup
/// - `leads`: lead CRUD and the filtered, paginated listing
pub mod auth;
pub mod health;
pub mod leads;
