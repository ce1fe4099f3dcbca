use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One attendance record per employee per calendar day. The unique
/// (employee_id, date) key in the store is what enforces that.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = "3f1c2a7e-6b4d-4e8f-a1b2-9c8d7e6f5a43")]
    pub id: String,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "09:02:17", value_type = String)]
    pub check_in_time: Option<NaiveTime>,
    #[schema(example = "18:05:40", value_type = String)]
    pub check_out_time: Option<NaiveTime>,
    pub location_latitude: Option<f64>,
    pub location_longitude: Option<f64>,
    #[schema(example = "2026-01-01T09:02:17", value_type = String)]
    pub location_timestamp: Option<NaiveDateTime>,
    pub is_within_fence: Option<bool>,
    pub late_checkout_reason: Option<String>,
    pub manually_added: bool,
    pub manually_edited: bool,
    pub auto_checkout: bool,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Attendance row joined with the employee's display name for the admin
/// cross-employee views.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AttendanceWithEmployee {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub employee_name: String,
}
