use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::attendance::AttendanceRecord;
use crate::model::manual_request::{
    ManualAttendanceRequest, ManualRequestWithEmployee, RequestDecision, RequestType,
    STATUS_PENDING,
};
use crate::services::{notification, notification::Notice, users};
use crate::utils::clock::Clock;
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct SubmitManualRequest {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "09:00:00", value_type = String)]
    pub check_in_time: Option<NaiveTime>,
    #[schema(example = "18:00:00", value_type = String)]
    pub check_out_time: Option<NaiveTime>,
    #[schema(example = "Forgot to check in, was at the client site")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ProcessRequestPayload {
    #[schema(example = "approved")]
    pub status: RequestDecision,
}

/// Submission rules that need no store access: a reason, at least one time,
/// and no future dates.
fn validate_submission(payload: &SubmitManualRequest, today: NaiveDate) -> Result<(), ApiError> {
    if payload.reason.trim().is_empty()
        || (payload.check_in_time.is_none() && payload.check_out_time.is_none())
    {
        return Err(ApiError::Validation(
            "Required fields are missing".to_string(),
        ));
    }
    if payload.date > today {
        return Err(ApiError::Validation(
            "Cannot request for future dates".to_string(),
        ));
    }
    Ok(())
}

async fn fetch_request(
    pool: &MySqlPool,
    id: &str,
) -> Result<Option<ManualAttendanceRequest>, sqlx::Error> {
    sqlx::query_as::<_, ManualAttendanceRequest>(
        "SELECT * FROM manual_attendance_requests WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Employee submits a correction proposal for a past day.
#[utoipa::path(
    post,
    path = "/api/manual-request",
    request_body = SubmitManualRequest,
    responses(
        (status = 201, description = "Manual attendance request submitted successfully", body = Object),
        (status = 400, description = "Validation failure or pending request already exists"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "ManualRequest"
)]
pub async fn submit_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    payload: web::Json<SubmitManualRequest>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = auth.user_id;

    validate_submission(&payload, clock.today())?;

    // Only one pending request per (employee, date); processed ones don't block.
    let pending: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM manual_attendance_requests \
         WHERE employee_id = ? AND date = ? AND status = 'pending'",
    )
    .bind(employee_id)
    .bind(payload.date)
    .fetch_one(pool.get_ref())
    .await?;

    if pending > 0 {
        return Err(ApiError::Conflict(
            "A pending request already exists for this date".to_string(),
        ));
    }

    let existing = sqlx::query_as::<_, AttendanceRecord>(
        "SELECT * FROM attendance_records WHERE employee_id = ? AND date = ?",
    )
    .bind(employee_id)
    .bind(payload.date)
    .fetch_optional(pool.get_ref())
    .await?;

    let request_type = if existing.is_some() {
        RequestType::Edit
    } else {
        RequestType::New
    };
    let original_record_id = existing.map(|record| record.id);

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO manual_attendance_requests \
         (id, employee_id, date, check_in_time, check_out_time, reason, status, type, original_record_id) \
         VALUES (?, ?, ?, ?, ?, ?, 'pending', ?, ?)",
    )
    .bind(&id)
    .bind(employee_id)
    .bind(payload.date)
    .bind(payload.check_in_time)
    .bind(payload.check_out_time)
    .bind(&payload.reason)
    .bind(request_type.as_ref())
    .bind(&original_record_id)
    .execute(pool.get_ref())
    .await?;

    let request = fetch_request(pool.get_ref(), &id)
        .await?
        .ok_or(ApiError::Internal)?;

    let action = match request_type {
        RequestType::Edit => "edit",
        RequestType::New => "add",
    };
    let display_name = users::display_name(pool.get_ref(), employee_id).await;
    notification::spawn_fan_out(
        pool.get_ref().clone(),
        Some((
            employee_id,
            Notice::new(
                "Manual Attendance Request Submitted",
                format!(
                    "Your request for {action}ing attendance on {} has been submitted and is awaiting approval.",
                    payload.date
                ),
            ),
        )),
        Some(Notice::new(
            "New Manual Attendance Request",
            format!(
                "Employee {display_name} has requested to {action} attendance for {}.",
                payload.date
            ),
        )),
        Some(id),
    );

    Ok(HttpResponse::Created().json(json!({
        "message": "Manual attendance request submitted successfully",
        "request": request
    })))
}

/// Own requests, newest first.
#[utoipa::path(
    get,
    path = "/api/manual-request",
    responses(
        (status = 200, description = "Requests retrieved", body = Object),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "ManualRequest"
)]
pub async fn my_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let requests = sqlx::query_as::<_, ManualAttendanceRequest>(
        "SELECT * FROM manual_attendance_requests WHERE employee_id = ? ORDER BY created_at DESC",
    )
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(requests))
}

#[utoipa::path(
    get,
    path = "/api/manual-request/all",
    responses(
        (status = 200, description = "Requests retrieved", body = Object),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "ManualRequest"
)]
pub async fn all_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let requests = sqlx::query_as::<_, ManualRequestWithEmployee>(
        "SELECT r.*, u.full_name AS employee_name \
         FROM manual_attendance_requests r \
         JOIN users u ON u.id = r.employee_id \
         ORDER BY r.created_at DESC",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(requests))
}

#[utoipa::path(
    get,
    path = "/api/manual-request/pending",
    responses(
        (status = 200, description = "Pending requests retrieved", body = Object),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "ManualRequest"
)]
pub async fn pending_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let requests = sqlx::query_as::<_, ManualRequestWithEmployee>(
        "SELECT r.*, u.full_name AS employee_name \
         FROM manual_attendance_requests r \
         JOIN users u ON u.id = r.employee_id \
         WHERE r.status = 'pending' \
         ORDER BY r.created_at DESC",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(requests))
}

/// Admin decision. Approval applies the requested times to the attendance
/// record, creating it when absent; the record is flagged manually_added in
/// both cases (kept as-is from the existing product behavior). Rejection
/// touches nothing but the request.
#[utoipa::path(
    put,
    path = "/api/manual-request/{id}/process",
    params(("id" = String, Path, description = "Request id")),
    request_body = ProcessRequestPayload,
    responses(
        (status = 200, description = "Request processed", body = Object),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "ManualRequest"
)]
pub async fn process_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    payload: web::Json<ProcessRequestPayload>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let request_id = path.into_inner();
    let mut request = fetch_request(pool.get_ref(), &request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))?;

    sqlx::query("UPDATE manual_attendance_requests SET status = ? WHERE id = ?")
        .bind(payload.status.as_ref())
        .bind(&request_id)
        .execute(pool.get_ref())
        .await?;
    request.status = payload.status.to_string();

    if payload.status == RequestDecision::Approved {
        let existing = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance_records WHERE employee_id = ? AND date = ?",
        )
        .bind(request.employee_id)
        .bind(request.date)
        .fetch_optional(pool.get_ref())
        .await?;

        if let Some(record) = existing {
            sqlx::query(
                "UPDATE attendance_records \
                 SET check_in_time = COALESCE(?, check_in_time), \
                     check_out_time = COALESCE(?, check_out_time), \
                     manually_added = 1 \
                 WHERE id = ?",
            )
            .bind(request.check_in_time)
            .bind(request.check_out_time)
            .bind(&record.id)
            .execute(pool.get_ref())
            .await?;
        } else if request.check_in_time.is_some() || request.check_out_time.is_some() {
            sqlx::query(
                "INSERT INTO attendance_records \
                 (id, employee_id, date, check_in_time, check_out_time, manually_added) \
                 VALUES (?, ?, ?, ?, ?, 1)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(request.employee_id)
            .bind(request.date)
            .bind(request.check_in_time)
            .bind(request.check_out_time)
            .execute(pool.get_ref())
            .await?;
        }
    }

    let action = if request.request_type == "edit" {
        "edit"
    } else {
        "add new"
    };
    let outcome = match payload.status {
        RequestDecision::Approved => "approved",
        RequestDecision::Rejected => "rejected",
    };
    let title = match payload.status {
        RequestDecision::Approved => "Manual Attendance Request Approved",
        RequestDecision::Rejected => "Manual Attendance Request Rejected",
    };
    notification::spawn_fan_out(
        pool.get_ref().clone(),
        Some((
            request.employee_id,
            Notice::new(
                title,
                format!(
                    "Your request to {action} attendance for {} has been {outcome}.",
                    request.date
                ),
            ),
        )),
        None,
        Some(request_id),
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Manual attendance request {outcome}"),
        "request": request
    })))
}

/// Owner-only cancellation while still pending; hard delete.
#[utoipa::path(
    delete,
    path = "/api/manual-request/{id}",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Manual attendance request cancelled successfully"),
        (status = 400, description = "Request already processed"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "ManualRequest"
)]
pub async fn cancel_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let request_id = path.into_inner();
    let request = fetch_request(pool.get_ref(), &request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))?;

    if request.employee_id != auth.user_id {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }
    if request.status != STATUS_PENDING {
        return Err(ApiError::Conflict(
            "Cannot cancel a request that has already been processed".to_string(),
        ));
    }

    sqlx::query("DELETE FROM manual_attendance_requests WHERE id = ?")
        .bind(&request_id)
        .execute(pool.get_ref())
        .await?;

    let display_name = users::display_name(pool.get_ref(), auth.user_id).await;
    notification::spawn_fan_out(
        pool.get_ref().clone(),
        None,
        Some(Notice::new(
            "Manual Attendance Request Cancelled",
            format!(
                "Employee {display_name} has cancelled their manual attendance request for {}.",
                request.date
            ),
        )),
        Some(request_id),
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Manual attendance request cancelled successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(
        date: &str,
        check_in: Option<&str>,
        check_out: Option<&str>,
        reason: &str,
    ) -> SubmitManualRequest {
        SubmitManualRequest {
            date: date.parse().unwrap(),
            check_in_time: check_in.map(|t| t.parse().unwrap()),
            check_out_time: check_out.map(|t| t.parse().unwrap()),
            reason: reason.to_string(),
        }
    }

    fn today() -> NaiveDate {
        "2024-06-14".parse().unwrap()
    }

    #[test]
    fn future_dates_are_rejected() {
        let p = payload("2024-06-15", Some("09:00:00"), None, "left badge at home");
        let err = validate_submission(&p, today()).unwrap_err();
        assert_eq!(err.to_string(), "Cannot request for future dates");
    }

    #[test]
    fn today_and_past_dates_are_accepted() {
        let p = payload("2024-06-14", Some("09:00:00"), None, "left badge at home");
        assert!(validate_submission(&p, today()).is_ok());
        let p = payload("2024-06-10", None, Some("18:00:00"), "forgot to check out");
        assert!(validate_submission(&p, today()).is_ok());
    }

    #[test]
    fn reason_is_required() {
        let p = payload("2024-06-10", Some("09:00:00"), None, "   ");
        assert!(validate_submission(&p, today()).is_err());
    }

    #[test]
    fn at_least_one_time_is_required() {
        let p = payload("2024-06-10", None, None, "forgot");
        assert!(validate_submission(&p, today()).is_err());
    }
}
