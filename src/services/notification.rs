use crate::services::users;
use sqlx::MySqlPool;
use tracing::warn;
use uuid::Uuid;

/// Title + message pair for a notification. The `type` column is always
/// "system" for everything this service emits.
#[derive(Debug, Clone)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Notice {
            title: title.into(),
            message: message.into(),
        }
    }
}

pub async fn create_notification(
    pool: &MySqlPool,
    user_id: u64,
    notice: &Notice,
    reference_id: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO notifications (id, user_id, title, message, type, reference_id) \
         VALUES (?, ?, ?, ?, 'system', ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(&notice.title)
    .bind(&notice.message)
    .bind(reference_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Store a notification for one user, logging instead of propagating:
/// delivery problems never fail the operation that triggered them.
pub async fn notify_user(pool: &MySqlPool, user_id: u64, notice: &Notice, reference: Option<&str>) {
    if let Err(e) = create_notification(pool, user_id, notice, reference).await {
        warn!(error = %e, user_id, title = %notice.title, "notification dispatch failed");
    }
}

/// Broadcast to every admin.
pub async fn notify_admins(pool: &MySqlPool, notice: &Notice, reference: Option<&str>) {
    let admins = match users::find_admins(pool).await {
        Ok(admins) => admins,
        Err(e) => {
            warn!(error = %e, title = %notice.title, "admin lookup failed, skipping broadcast");
            return;
        }
    };

    for admin in admins {
        notify_user(pool, admin.id, notice, reference).await;
    }
}

/// Dispatch the employee notification and the admin broadcast on a spawned
/// task. Callers invoke this after their primary write has committed, so a
/// failed fan-out can only ever lose notifications, never roll back state.
pub fn spawn_fan_out(
    pool: MySqlPool,
    employee: Option<(u64, Notice)>,
    admins: Option<Notice>,
    reference_id: Option<String>,
) {
    actix_web::rt::spawn(async move {
        let reference = reference_id.as_deref();
        if let Some((user_id, notice)) = employee {
            notify_user(&pool, user_id, &notice, reference).await;
        }
        if let Some(notice) = admins {
            notify_admins(&pool, &notice, reference).await;
        }
    });
}
