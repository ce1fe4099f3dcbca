use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Display, AsRefStr, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestDecision {
    Approved,
    Rejected,
}

/// Whether the request would create a record or edit an existing one.
/// Derived at submission time from record existence, never client-supplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Display, AsRefStr, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestType {
    New,
    Edit,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ManualAttendanceRequest {
    #[schema(example = "5d8f2b1c-4a6e-4c9d-8e7f-0a1b2c3d4e55")]
    pub id: String,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "09:00:00", value_type = String)]
    pub check_in_time: Option<NaiveTime>,
    #[schema(example = "18:00:00", value_type = String)]
    pub check_out_time: Option<NaiveTime>,
    pub reason: String,
    #[schema(example = "pending")]
    pub status: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    #[schema(example = "new")]
    pub request_type: String,
    pub original_record_id: Option<String>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request row joined with the employee's display name for the admin views.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ManualRequestWithEmployee {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: ManualAttendanceRequest,
    pub employee_name: String,
}

pub const STATUS_PENDING: &str = "pending";
