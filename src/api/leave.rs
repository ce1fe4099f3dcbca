use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::leave::{Leave, LeaveDecision, LeaveType, LeaveWithEmployee};
use crate::services::{notification, notification::Notice, users};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct ApplyLeave {
    #[schema(example = "2026-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    #[schema(example = "casual")]
    pub leave_type: LeaveType,
    #[schema(example = "Family event")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DecideLeavePayload {
    #[schema(example = "approved")]
    pub status: LeaveDecision,
}

async fn fetch_leave(pool: &MySqlPool, id: &str) -> Result<Option<Leave>, sqlx::Error> {
    sqlx::query_as::<_, Leave>("SELECT * FROM leaves WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Count leaves of any status intersecting [start, end], spelled as the
/// three sub-cases of inclusive interval overlap.
async fn count_overlapping(
    pool: &MySqlPool,
    employee_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM leaves \
         WHERE employee_id = ? \
         AND ((start_date <= ? AND end_date >= ?) \
           OR (start_date <= ? AND end_date >= ?) \
           OR (start_date >= ? AND end_date <= ?))",
    )
    .bind(employee_id)
    .bind(start)
    .bind(start)
    .bind(end)
    .bind(end)
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await
}

/// Employee applies for leave over an inclusive date range.
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body = ApplyLeave,
    responses(
        (status = 201, description = "Leave applied successfully", body = Object),
        (status = 400, description = "Invalid range or overlapping leave"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn apply_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ApplyLeave>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = auth.user_id;

    if payload.reason.trim().is_empty() {
        return Err(ApiError::Validation("All fields are required".to_string()));
    }
    if payload.start_date > payload.end_date {
        return Err(ApiError::Validation(
            "End date must be after start date".to_string(),
        ));
    }

    let overlapping =
        count_overlapping(pool.get_ref(), employee_id, payload.start_date, payload.end_date)
            .await?;
    if overlapping > 0 {
        return Err(ApiError::Conflict(
            "Leave already exists on this date range".to_string(),
        ));
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO leaves (id, employee_id, start_date, end_date, type, reason, status) \
         VALUES (?, ?, ?, ?, ?, ?, 'pending')",
    )
    .bind(&id)
    .bind(employee_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.leave_type.as_ref())
    .bind(&payload.reason)
    .execute(pool.get_ref())
    .await?;

    let leave = fetch_leave(pool.get_ref(), &id)
        .await?
        .ok_or(ApiError::Internal)?;

    let display_name = users::display_name(pool.get_ref(), employee_id).await;
    notification::spawn_fan_out(
        pool.get_ref().clone(),
        Some((
            employee_id,
            Notice::new(
                "Leave Application Submitted",
                format!(
                    "Your leave request from {} to {} has been submitted and is awaiting approval.",
                    payload.start_date, payload.end_date
                ),
            ),
        )),
        Some(Notice::new(
            "New Leave Application",
            format!(
                "Employee {display_name} has applied for {} leave from {} to {}.",
                payload.leave_type, payload.start_date, payload.end_date
            ),
        )),
        Some(id),
    );

    Ok(HttpResponse::Created().json(json!({
        "message": "Leave applied successfully",
        "leave": leave
    })))
}

/// Own leaves, newest first.
#[utoipa::path(
    get,
    path = "/api/leave",
    responses(
        (status = 200, description = "Leaves retrieved", body = Object),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn my_leaves(auth: AuthUser, pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let leaves = sqlx::query_as::<_, Leave>(
        "SELECT * FROM leaves WHERE employee_id = ? ORDER BY created_at DESC",
    )
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(leaves))
}

#[utoipa::path(
    get,
    path = "/api/leave/all",
    responses(
        (status = 200, description = "Leaves retrieved", body = Object),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn all_leaves(auth: AuthUser, pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let leaves = sqlx::query_as::<_, LeaveWithEmployee>(
        "SELECT l.*, u.full_name AS employee_name \
         FROM leaves l \
         JOIN users u ON u.id = l.employee_id \
         ORDER BY l.created_at DESC",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(leaves))
}

#[utoipa::path(
    get,
    path = "/api/leave/pending",
    responses(
        (status = 200, description = "Pending leaves retrieved", body = Object),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn pending_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let leaves = sqlx::query_as::<_, LeaveWithEmployee>(
        "SELECT l.*, u.full_name AS employee_name \
         FROM leaves l \
         JOIN users u ON u.id = l.employee_id \
         WHERE l.status = 'pending' \
         ORDER BY l.created_at DESC",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(leaves))
}

/// Admin decision. Terminal: a leave that has already been decided cannot be
/// re-decided.
#[utoipa::path(
    put,
    path = "/api/leave/{id}/status",
    params(("id" = String, Path, description = "Leave id")),
    request_body = DecideLeavePayload,
    responses(
        (status = 200, description = "Leave decided", body = Object),
        (status = 400, description = "Leave already processed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn decide_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    payload: web::Json<DecideLeavePayload>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let leave_id = path.into_inner();
    let mut leave = fetch_leave(pool.get_ref(), &leave_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Leave not found".to_string()))?;

    if leave.status != "pending" {
        return Err(ApiError::Conflict(
            "Leave has already been processed".to_string(),
        ));
    }

    sqlx::query("UPDATE leaves SET status = ?, approved_by = ? WHERE id = ?")
        .bind(payload.status.as_ref())
        .bind(auth.user_id)
        .bind(&leave_id)
        .execute(pool.get_ref())
        .await?;

    leave.status = payload.status.to_string();
    leave.approved_by = Some(auth.user_id);

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Leave {} successfully", payload.status),
        "leave": leave
    })))
}

/// Owner-only cancellation while still pending; hard delete.
#[utoipa::path(
    delete,
    path = "/api/leave/{id}",
    params(("id" = String, Path, description = "Leave id")),
    responses(
        (status = 200, description = "Leave cancelled successfully"),
        (status = 400, description = "Leave already processed"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Leave not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let leave_id = path.into_inner();
    let leave = fetch_leave(pool.get_ref(), &leave_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Leave not found".to_string()))?;

    if leave.employee_id != auth.user_id {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }
    if leave.status != "pending" {
        return Err(ApiError::Conflict(
            "Cannot cancel a leave that has already been processed".to_string(),
        ));
    }

    sqlx::query("DELETE FROM leaves WHERE id = ?")
        .bind(&leave_id)
        .execute(pool.get_ref())
        .await?;

    let display_name = users::display_name(pool.get_ref(), auth.user_id).await;
    notification::spawn_fan_out(
        pool.get_ref().clone(),
        None,
        Some(Notice::new(
            "Leave Application Cancelled",
            format!(
                "Employee {display_name} has cancelled their leave request from {} to {}.",
                leave.start_date, leave.end_date
            ),
        )),
        Some(leave_id),
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave cancelled successfully"
    })))
}
