use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::{ApiError, is_unique_violation};
use crate::model::attendance::{AttendanceRecord, AttendanceWithEmployee};
use crate::services::{notification, notification::Notice, users};
use crate::utils::{clock::Clock, geofence};
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct CheckInPayload {
    #[schema(example = 23.8103)]
    pub latitude: Option<f64>,
    #[schema(example = 90.4125)]
    pub longitude: Option<f64>,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckOutPayload {
    #[schema(example = 23.8103)]
    pub latitude: Option<f64>,
    #[schema(example = 90.4125)]
    pub longitude: Option<f64>,
    #[schema(example = "Finishing the release")]
    pub late_checkout_reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ManualAttendancePayload {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "09:00:00", value_type = String)]
    pub check_in_time: Option<NaiveTime>,
    #[schema(example = "18:00:00", value_type = String)]
    pub check_out_time: Option<NaiveTime>,
}

#[derive(Deserialize, ToSchema)]
pub struct DateRangeQuery {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-01-31", format = "date", value_type = String)]
    pub end_date: Option<NaiveDate>,
}

async fn fetch_record_for_day(
    pool: &MySqlPool,
    employee_id: u64,
    date: NaiveDate,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(
        "SELECT * FROM attendance_records WHERE employee_id = ? AND date = ?",
    )
    .bind(employee_id)
    .bind(date)
    .fetch_optional(pool)
    .await
}

/// Check-in: NoRecord -> CheckedIn for the server's current day.
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body = CheckInPayload,
    responses(
        (status = 201, description = "Check-in successful", body = Object),
        (status = 200, description = "Latitude/longitude missing", body = Object, example = json!({
            "message": "Please provide latitude and longitude"
        })),
        (status = 400, description = "Already checked in today"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    clock: web::Data<dyn Clock>,
    payload: web::Json<CheckInPayload>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = auth.user_id;

    // Missing coordinates get an informational response, not an error.
    let Some((latitude, longitude)) = payload.latitude.zip(payload.longitude) else {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "Please provide latitude and longitude"
        })));
    };

    let now = clock.now();
    let today = clock.today();

    let is_within_fence = geofence::is_within(
        pool.get_ref(),
        latitude,
        longitude,
        config.geofence_fail_open,
    )
    .await;

    let record = AttendanceRecord {
        id: Uuid::new_v4().to_string(),
        employee_id,
        date: today,
        check_in_time: Some(now.time()),
        check_out_time: None,
        location_latitude: Some(latitude),
        location_longitude: Some(longitude),
        location_timestamp: Some(now.naive_local()),
        is_within_fence: Some(is_within_fence),
        late_checkout_reason: None,
        manually_added: false,
        manually_edited: false,
        auto_checkout: false,
        created_at: None,
    };

    let result = sqlx::query(
        "INSERT INTO attendance_records \
         (id, employee_id, date, check_in_time, location_latitude, location_longitude, \
          location_timestamp, is_within_fence) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&record.id)
    .bind(employee_id)
    .bind(today)
    .bind(record.check_in_time)
    .bind(latitude)
    .bind(longitude)
    .bind(record.location_timestamp)
    .bind(is_within_fence)
    .execute(pool.get_ref())
    .await;

    if let Err(e) = result {
        // The unique (employee_id, date) key resolves concurrent check-ins.
        if is_unique_violation(&e) {
            return Err(ApiError::Conflict("Already checked in today".to_string()));
        }
        error!(error = %e, employee_id, "Check-in failed");
        return Err(ApiError::Internal);
    }

    let time = now.time().format("%H:%M:%S");
    let display_name = users::display_name(pool.get_ref(), employee_id).await;
    notification::spawn_fan_out(
        pool.get_ref().clone(),
        Some((
            employee_id,
            Notice::new(
                "Check-in Successful",
                format!("You have checked in at {time}."),
            ),
        )),
        Some(Notice::new(
            "Employee Check-in",
            format!("Employee {display_name} has checked in at {time}."),
        )),
        Some(record.id.clone()),
    );

    Ok(HttpResponse::Created().json(json!({
        "message": "Check-in successful",
        "attendance": record,
        "is_within_fence": is_within_fence
    })))
}

/// Check-out: CheckedIn -> CheckedOut. Re-evaluates the fence for the
/// check-out location; an indeterminate evaluation keeps the stored flag.
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    request_body = CheckOutPayload,
    responses(
        (status = 200, description = "Check-out successful", body = Object),
        (status = 400, description = "No check-in record found for today / already checked out"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    payload: web::Json<CheckOutPayload>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = auth.user_id;

    let Some((latitude, longitude)) = payload.latitude.zip(payload.longitude) else {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "Please provide latitude and longitude"
        })));
    };

    let now = clock.now();
    let today = clock.today();

    let mut record = fetch_record_for_day(pool.get_ref(), employee_id, today)
        .await?
        .ok_or_else(|| ApiError::Conflict("No check-in record found for today".to_string()))?;

    if record.check_out_time.is_some() {
        return Err(ApiError::Conflict("Already checked out today".to_string()));
    }

    let is_within_fence = match geofence::evaluate(pool.get_ref(), latitude, longitude).await {
        Ok(within) => Some(within),
        Err(e) => {
            tracing::warn!(error = %e, employee_id, "geofence re-evaluation failed, keeping stored flag");
            record.is_within_fence
        }
    };

    record.check_out_time = Some(now.time());
    record.location_latitude = Some(latitude);
    record.location_longitude = Some(longitude);
    record.location_timestamp = Some(now.naive_local());
    record.is_within_fence = is_within_fence;
    record.late_checkout_reason = payload.late_checkout_reason.clone();

    sqlx::query(
        "UPDATE attendance_records \
         SET check_out_time = ?, location_latitude = ?, location_longitude = ?, \
             location_timestamp = ?, is_within_fence = ?, late_checkout_reason = ? \
         WHERE id = ?",
    )
    .bind(record.check_out_time)
    .bind(latitude)
    .bind(longitude)
    .bind(record.location_timestamp)
    .bind(is_within_fence)
    .bind(&record.late_checkout_reason)
    .bind(&record.id)
    .execute(pool.get_ref())
    .await?;

    let time = now.time().format("%H:%M:%S");
    let display_name = users::display_name(pool.get_ref(), employee_id).await;
    notification::spawn_fan_out(
        pool.get_ref().clone(),
        Some((
            employee_id,
            Notice::new(
                "Check-out Successful",
                format!("You have checked out at {time}."),
            ),
        )),
        Some(Notice::new(
            "Employee Check-out",
            format!("Employee {display_name} has checked out at {time}."),
        )),
        Some(record.id.clone()),
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Check-out successful",
        "attendance": record
    })))
}

/// Today's record for the calling employee, if any.
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's attendance retrieved", body = Object),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, ApiError> {
    let record = fetch_record_for_day(pool.get_ref(), auth.user_id, clock.today()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Today's attendance retrieved",
        "attendance": record
    })))
}

/// Own attendance history, newest first.
#[utoipa::path(
    get,
    path = "/api/attendance/history",
    responses(
        (status = 200, description = "Attendance history retrieved", body = Object),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let records = sqlx::query_as::<_, AttendanceRecord>(
        "SELECT * FROM attendance_records WHERE employee_id = ? ORDER BY date DESC",
    )
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance history retrieved",
        "attendance": records
    })))
}

/// One employee's attendance over an optional date range (admin).
#[utoipa::path(
    get,
    path = "/api/attendance/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee to inspect"),
        ("start_date" = Option<String>, Query, description = "Range start (inclusive)"),
        ("end_date" = Option<String>, Query, description = "Range end (inclusive)")
    ),
    responses(
        (status = 200, description = "Employee attendance retrieved", body = Object),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn employee_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    let mut sql = String::from("SELECT * FROM attendance_records WHERE employee_id = ?");
    match (query.start_date, query.end_date) {
        (Some(_), Some(_)) => sql.push_str(" AND date BETWEEN ? AND ?"),
        (Some(_), None) => sql.push_str(" AND date >= ?"),
        (None, Some(_)) => sql.push_str(" AND date <= ?"),
        (None, None) => {}
    }
    sql.push_str(" ORDER BY date DESC");

    let mut data_query = sqlx::query_as::<_, AttendanceRecord>(&sql).bind(employee_id);
    if let Some(start) = query.start_date {
        data_query = data_query.bind(start);
    }
    if let Some(end) = query.end_date {
        data_query = data_query.bind(end);
    }

    let records = data_query.fetch_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee attendance retrieved",
        "attendance": records
    })))
}

/// Every employee's attendance, joined with names (admin).
#[utoipa::path(
    get,
    path = "/api/attendance/all",
    responses(
        (status = 200, description = "All employee attendance retrieved", body = Object),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn all_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let records = sqlx::query_as::<_, AttendanceWithEmployee>(
        "SELECT a.*, u.full_name AS employee_name \
         FROM attendance_records a \
         JOIN users u ON u.id = a.employee_id \
         ORDER BY a.date DESC",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "All employee attendance retrieved",
        "attendance": records
    })))
}

/// All records for one calendar day (admin).
#[utoipa::path(
    get,
    path = "/api/attendance/date/{date}",
    params(("date" = String, Path, description = "Calendar day, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Attendance records retrieved", body = Object),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn attendance_by_date(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<NaiveDate>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let date = path.into_inner();

    let records = sqlx::query_as::<_, AttendanceWithEmployee>(
        "SELECT a.*, u.full_name AS employee_name \
         FROM attendance_records a \
         JOIN users u ON u.id = a.employee_id \
         WHERE a.date = ?",
    )
    .bind(date)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance records retrieved",
        "attendance": records
    })))
}

/// Admin patch-or-create for a (employee, date) record. Existing records are
/// patched with only the supplied times and flagged manually_edited; missing
/// ones are created flagged manually_added.
#[utoipa::path(
    post,
    path = "/api/attendance/manual",
    request_body = ManualAttendancePayload,
    responses(
        (status = 200, description = "Attendance record updated manually", body = Object),
        (status = 201, description = "Attendance record added manually", body = Object),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn manual_upsert(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ManualAttendancePayload>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let existing = fetch_record_for_day(pool.get_ref(), payload.employee_id, payload.date).await?;

    if let Some(record) = existing {
        sqlx::query(
            "UPDATE attendance_records \
             SET check_in_time = COALESCE(?, check_in_time), \
                 check_out_time = COALESCE(?, check_out_time), \
                 manually_edited = 1 \
             WHERE id = ?",
        )
        .bind(payload.check_in_time)
        .bind(payload.check_out_time)
        .bind(&record.id)
        .execute(pool.get_ref())
        .await?;

        let updated = fetch_record_for_day(pool.get_ref(), payload.employee_id, payload.date)
            .await?
            .ok_or(ApiError::Internal)?;

        notification::spawn_fan_out(
            pool.get_ref().clone(),
            Some((
                payload.employee_id,
                Notice::new(
                    "Attendance Record Updated",
                    format!(
                        "Your attendance record for {} has been updated by an administrator.",
                        payload.date
                    ),
                ),
            )),
            None,
            Some(record.id.clone()),
        );

        return Ok(HttpResponse::Ok().json(json!({
            "message": "Attendance record updated manually",
            "attendance": updated
        })));
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO attendance_records \
         (id, employee_id, date, check_in_time, check_out_time, manually_added) \
         VALUES (?, ?, ?, ?, ?, 1)",
    )
    .bind(&id)
    .bind(payload.employee_id)
    .bind(payload.date)
    .bind(payload.check_in_time)
    .bind(payload.check_out_time)
    .execute(pool.get_ref())
    .await?;

    let created = fetch_record_for_day(pool.get_ref(), payload.employee_id, payload.date)
        .await?
        .ok_or(ApiError::Internal)?;

    notification::spawn_fan_out(
        pool.get_ref().clone(),
        Some((
            payload.employee_id,
            Notice::new(
                "Attendance Record Added",
                format!(
                    "A new attendance record for {} has been added by an administrator.",
                    payload.date
                ),
            ),
        )),
        None,
        Some(id),
    );

    Ok(HttpResponse::Created().json(json!({
        "message": "Attendance record added manually",
        "attendance": created
    })))
}

/// Hard delete of one record by id (admin). Nothing references attendance
/// rows by foreign key, so no cascade is involved.
#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    params(("id" = String, Path, description = "Attendance record id")),
    responses(
        (status = 200, description = "Attendance record deleted successfully"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Attendance record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM attendance_records WHERE id = ?")
        .bind(&id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(
            "Attendance record not found".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance record deleted successfully"
    })))
}
