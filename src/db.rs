use sqlx::MySqlPool;

/// The process must not accept traffic without a reachable store, so a
/// connection failure here is fatal.
pub async fn init_db(database_url: &str) -> MySqlPool {
    MySqlPool::connect(database_url)
        .await
        .expect("Failed to connect to database")
}
