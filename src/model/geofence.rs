use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Circular zone used to decide whether a location counts as on-site.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct GeoFence {
    #[schema(example = "b9c7a3f2-0d2e-4f0a-9f61-2d5c1f3e8a44")]
    pub id: String,
    #[schema(example = "Head Office")]
    pub name: String,
    #[schema(example = 23.8103)]
    pub center_latitude: f64,
    #[schema(example = 90.4125)]
    pub center_longitude: f64,
    /// Radius in meters
    #[schema(example = 200.0)]
    pub radius: f64,
    pub active: bool,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}
