use crate::model::{attendance::AttendanceRecord, user::User};
use crate::services::{notification, notification::Notice, users};
use crate::utils::clock::Clock;
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use sqlx::MySqlPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

/// Start the absence reconciliation job: one run immediately, then every
/// weekday at `run_hour` local time.
pub fn spawn(pool: MySqlPool, clock: Arc<dyn Clock>, run_hour: u32) {
    actix_web::rt::spawn(async move {
        reconcile_absences(&pool, clock.as_ref()).await;

        loop {
            let now = clock.now().naive_local();
            let next = next_weekday_run(now, run_hour);
            let wait = (next - now)
                .to_std()
                .unwrap_or_else(|_| Duration::from_secs(60));
            actix_web::rt::time::sleep(wait).await;

            reconcile_absences(&pool, clock.as_ref()).await;
        }
    });
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Most recent day before `today` that is not Saturday/Sunday. Holidays are
/// not consulted.
pub fn previous_working_day(today: NaiveDate) -> NaiveDate {
    let mut day = today - Days::new(1);
    while is_weekend(day) {
        day = day - Days::new(1);
    }
    day
}

/// Next `run_hour`:00 strictly after `now` that lands on a weekday.
pub fn next_weekday_run(now: NaiveDateTime, run_hour: u32) -> NaiveDateTime {
    let run_time = NaiveTime::from_hms_opt(run_hour.min(23), 0, 0).unwrap_or_default();

    let mut date = now.date();
    if now.date().and_time(run_time) <= now {
        date = date + Days::new(1);
    }
    while is_weekend(date) {
        date = date + Days::new(1);
    }
    date.and_time(run_time)
}

/// A day counts as an absence when there is no record at all, or the record
/// never completed the check-in/check-out pair.
pub fn needs_auto_leave(record: Option<&AttendanceRecord>) -> bool {
    match record {
        None => true,
        Some(r) => r.check_in_time.is_none() || r.check_out_time.is_none(),
    }
}

/// Scan the previous working day's attendance for every non-admin employee
/// and auto-file leave for absentees. Per-employee failures are logged and
/// do not stop the scan.
pub async fn reconcile_absences(pool: &MySqlPool, clock: &dyn Clock) {
    let target_date = previous_working_day(clock.today());
    info!(date = %target_date, "starting absence reconciliation");

    let employees = match users::list_non_admins(pool).await {
        Ok(list) => list,
        Err(e) => {
            error!(error = %e, "failed to load employee roster, skipping reconciliation run");
            return;
        }
    };

    info!(count = employees.len(), date = %target_date, "checking attendance");

    for employee in &employees {
        if let Err(e) = reconcile_employee(pool, employee, target_date).await {
            error!(
                error = %e,
                employee_id = employee.id,
                date = %target_date,
                "reconciliation failed for employee, continuing"
            );
        }
    }
}

async fn reconcile_employee(
    pool: &MySqlPool,
    employee: &User,
    date: NaiveDate,
) -> anyhow::Result<()> {
    let record = sqlx::query_as::<_, AttendanceRecord>(
        "SELECT * FROM attendance_records WHERE employee_id = ? AND date = ?",
    )
    .bind(employee.id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    if !needs_auto_leave(record.as_ref()) {
        return Ok(());
    }

    auto_apply_leave(pool, employee, date).await
}

/// File a single-day pending casual leave for an absence, unless any leave
/// of any status already covers that date.
pub async fn auto_apply_leave(
    pool: &MySqlPool,
    employee: &User,
    date: NaiveDate,
) -> anyhow::Result<()> {
    let existing: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM leaves WHERE employee_id = ? AND start_date <= ? AND end_date >= ?",
    )
    .bind(employee.id)
    .bind(date)
    .bind(date)
    .fetch_one(pool)
    .await?;

    if existing > 0 {
        info!(employee_id = employee.id, %date, "leave already exists, skipping auto-apply");
        return Ok(());
    }

    let leave_id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO leaves (id, employee_id, start_date, end_date, type, reason, status) \
         VALUES (?, ?, ?, ?, 'casual', 'Auto-deducted for absence', 'pending')",
    )
    .bind(&leave_id)
    .bind(employee.id)
    .bind(date)
    .bind(date)
    .execute(pool)
    .await?;

    notification::notify_user(
        pool,
        employee.id,
        &Notice::new(
            "Auto Leave Applied",
            format!(
                "Leave has been automatically applied for {date} due to absence \
                 (no check-in/check-out recorded)."
            ),
        ),
        Some(&leave_id),
    )
    .await;
    notification::notify_admins(
        pool,
        &Notice::new(
            "Auto Leave Applied",
            format!(
                "Auto leave applied for employee {} on {date} due to absence.",
                employee.full_name
            ),
        ),
        Some(&leave_id),
    )
    .await;

    info!(employee_id = employee.id, %date, "auto leave applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn record(check_in: Option<&str>, check_out: Option<&str>) -> AttendanceRecord {
        AttendanceRecord {
            id: "rec-1".to_string(),
            employee_id: 1000,
            date: d("2024-06-13"),
            check_in_time: check_in.map(|t| t.parse().unwrap()),
            check_out_time: check_out.map(|t| t.parse().unwrap()),
            location_latitude: None,
            location_longitude: None,
            location_timestamp: None,
            is_within_fence: None,
            late_checkout_reason: None,
            manually_added: false,
            manually_edited: false,
            auto_checkout: false,
            created_at: None,
        }
    }

    #[test]
    fn previous_working_day_skips_weekends() {
        // 2024-06-10 is a Monday
        assert_eq!(previous_working_day(d("2024-06-10")), d("2024-06-07"));
        // Sunday and Saturday both land on Friday
        assert_eq!(previous_working_day(d("2024-06-09")), d("2024-06-07"));
        assert_eq!(previous_working_day(d("2024-06-08")), d("2024-06-07"));
        // Midweek is just the day before
        assert_eq!(previous_working_day(d("2024-06-12")), d("2024-06-11"));
    }

    #[test]
    fn next_run_is_later_today_before_the_hour() {
        assert_eq!(
            next_weekday_run(dt("2024-06-11 08:00:00"), 9),
            dt("2024-06-11 09:00:00")
        );
    }

    #[test]
    fn next_run_rolls_to_tomorrow_at_or_past_the_hour() {
        assert_eq!(
            next_weekday_run(dt("2024-06-11 09:00:00"), 9),
            dt("2024-06-12 09:00:00")
        );
        assert_eq!(
            next_weekday_run(dt("2024-06-11 15:30:00"), 9),
            dt("2024-06-12 09:00:00")
        );
    }

    #[test]
    fn next_run_skips_the_weekend() {
        // Friday afternoon -> Monday morning
        assert_eq!(
            next_weekday_run(dt("2024-06-14 10:00:00"), 9),
            dt("2024-06-17 09:00:00")
        );
        // Saturday -> Monday
        assert_eq!(
            next_weekday_run(dt("2024-06-15 08:00:00"), 9),
            dt("2024-06-17 09:00:00")
        );
    }

    #[test]
    fn missing_record_needs_auto_leave() {
        assert!(needs_auto_leave(None));
    }

    #[test]
    fn incomplete_records_need_auto_leave() {
        let only_in = record(Some("09:00:00"), None);
        assert!(needs_auto_leave(Some(&only_in)));
        let only_out = record(None, Some("18:00:00"));
        assert!(needs_auto_leave(Some(&only_out)));
    }

    #[test]
    fn complete_record_needs_nothing() {
        let complete = record(Some("09:00:00"), Some("18:00:00"));
        assert!(!needs_auto_leave(Some(&complete)));
    }
}
