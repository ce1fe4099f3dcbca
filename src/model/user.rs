use serde::{Deserialize, Serialize};

/// Minimal user row. User management lives in a separate service; this one
/// only reads the roster for role checks, display names, and admin fan-out.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub full_name: String,
    pub email: String,
    pub role_id: u8,
}
