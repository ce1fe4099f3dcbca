use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// What a geofence store-read failure resolves to. Defaults to true so a
    /// broken or fence-less deployment never blocks attendance.
    pub geofence_fail_open: bool,

    /// Local hour (0-23) at which the weekday absence reconciliation runs.
    pub reconcile_hour: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),

            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            geofence_fail_open: env::var("GEOFENCE_FAIL_OPEN")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap(),

            reconcile_hour: env::var("RECONCILE_HOUR")
                .unwrap_or_else(|_| "9".to_string())
                .parse::<u32>()
                .unwrap()
                .min(23),
        }
    }
}
