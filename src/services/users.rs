use crate::model::{role::Role, user::User};
use sqlx::MySqlPool;

/// Admin roster, used to fan out admin notifications.
pub async fn find_admins(pool: &MySqlPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, full_name, email, role_id FROM users WHERE role_id = ?")
        .bind(Role::Admin as u8)
        .fetch_all(pool)
        .await
}

pub async fn find_user(pool: &MySqlPool, id: u64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, full_name, email, role_id FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Everyone the absence scan covers: the full roster minus admins.
pub async fn list_non_admins(pool: &MySqlPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, full_name, email, role_id FROM users WHERE role_id <> ?")
        .bind(Role::Admin as u8)
        .fetch_all(pool)
        .await
}

/// Full name for notification messages, falling back to the raw id when the
/// lookup fails or the user is gone.
pub async fn display_name(pool: &MySqlPool, id: u64) -> String {
    match find_user(pool, id).await {
        Ok(Some(user)) => user.full_name,
        _ => id.to_string(),
    }
}
