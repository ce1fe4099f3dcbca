use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, Display, AsRefStr, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Sick,
    Casual,
    Paid,
    Unpaid,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Display, AsRefStr, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveDecision {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Leave {
    #[schema(example = "7a2e4c8b-1f3d-4a5e-9b0c-6d7e8f9a0b12")]
    pub id: String,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    #[schema(example = "casual")]
    pub leave_type: String,
    pub reason: String,
    #[schema(example = "pending")]
    pub status: String,
    pub approved_by: Option<u64>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Leave row joined with the employee's display name for the admin views.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct LeaveWithEmployee {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub leave: Leave,
    pub employee_name: String,
}

/// Inclusive interval intersection, spelled out as the three sub-cases:
/// the new range starts inside an existing one, ends inside one, or fully
/// contains one.
pub fn ranges_overlap(
    new_start: NaiveDate,
    new_end: NaiveDate,
    existing_start: NaiveDate,
    existing_end: NaiveDate,
) -> bool {
    (existing_start <= new_start && existing_end >= new_start)
        || (existing_start <= new_end && existing_end >= new_end)
        || (existing_start >= new_start && existing_end <= new_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn partial_overlap_is_detected() {
        // existing 10th..15th, new 14th..20th
        assert!(ranges_overlap(
            d("2024-01-14"),
            d("2024-01-20"),
            d("2024-01-10"),
            d("2024-01-15"),
        ));
    }

    #[test]
    fn adjacent_non_overlapping_range_is_allowed() {
        // existing 10th..15th, new 16th..20th
        assert!(!ranges_overlap(
            d("2024-01-16"),
            d("2024-01-20"),
            d("2024-01-10"),
            d("2024-01-15"),
        ));
    }

    #[test]
    fn containment_both_directions() {
        assert!(ranges_overlap(
            d("2024-02-01"),
            d("2024-02-28"),
            d("2024-02-10"),
            d("2024-02-12"),
        ));
        assert!(ranges_overlap(
            d("2024-02-10"),
            d("2024-02-12"),
            d("2024-02-01"),
            d("2024-02-28"),
        ));
    }

    #[test]
    fn single_day_ranges_overlap_only_on_the_same_day() {
        assert!(ranges_overlap(
            d("2024-03-04"),
            d("2024-03-04"),
            d("2024-03-04"),
            d("2024-03-04"),
        ));
        assert!(!ranges_overlap(
            d("2024-03-04"),
            d("2024-03-04"),
            d("2024-03-05"),
            d("2024-03-05"),
        ));
    }

    #[test]
    fn shared_boundary_counts_as_overlap() {
        assert!(ranges_overlap(
            d("2024-01-15"),
            d("2024-01-20"),
            d("2024-01-10"),
            d("2024-01-15"),
        ));
    }
}
