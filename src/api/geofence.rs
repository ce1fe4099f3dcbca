use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::geofence::GeoFence;
use crate::utils::db_utils::{build_update_sql, execute_update};
use crate::utils::geofence;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use utoipa::ToSchema;
use uuid::Uuid;

/// Columns an update payload may touch.
const GEOFENCE_COLUMNS: &[&str] = &[
    "name",
    "center_latitude",
    "center_longitude",
    "radius",
    "active",
];

#[derive(Deserialize, ToSchema)]
pub struct CreateGeoFence {
    #[schema(example = "Head Office")]
    pub name: String,
    #[schema(example = 23.8103)]
    pub center_latitude: f64,
    #[schema(example = 90.4125)]
    pub center_longitude: f64,
    /// Radius in meters
    #[schema(example = 200.0)]
    pub radius: f64,
    pub active: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckLocationPayload {
    #[schema(example = 23.8103)]
    pub latitude: Option<f64>,
    #[schema(example = 90.4125)]
    pub longitude: Option<f64>,
}

#[utoipa::path(
    get,
    path = "/api/geofence",
    responses(
        (status = 200, description = "Geofences retrieved successfully", body = Object)
    ),
    security(("bearer_auth" = [])),
    tag = "GeoFence"
)]
pub async fn list_geofences(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let geofences =
        sqlx::query_as::<_, GeoFence>("SELECT * FROM geofences ORDER BY created_at DESC")
            .fetch_all(pool.get_ref())
            .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Geofences retrieved successfully",
        "geofences": geofences
    })))
}

#[utoipa::path(
    get,
    path = "/api/geofence/{id}",
    params(("id" = String, Path, description = "Geofence id")),
    responses(
        (status = 200, description = "Geofence retrieved successfully", body = GeoFence),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Geofence not found")
    ),
    security(("bearer_auth" = [])),
    tag = "GeoFence"
)]
pub async fn get_geofence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let id = path.into_inner();
    let geofence = sqlx::query_as::<_, GeoFence>("SELECT * FROM geofences WHERE id = ?")
        .bind(&id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Geofence not found".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Geofence retrieved successfully",
        "geofence": geofence
    })))
}

#[utoipa::path(
    post,
    path = "/api/geofence",
    request_body = CreateGeoFence,
    responses(
        (status = 201, description = "Geofence created successfully", body = Object),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "GeoFence"
)]
pub async fn create_geofence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateGeoFence>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Missing required fields".to_string()));
    }

    let geofence = GeoFence {
        id: Uuid::new_v4().to_string(),
        name: payload.name.clone(),
        center_latitude: payload.center_latitude,
        center_longitude: payload.center_longitude,
        radius: payload.radius,
        active: payload.active.unwrap_or(true),
        created_at: None,
    };

    sqlx::query(
        "INSERT INTO geofences (id, name, center_latitude, center_longitude, radius, active) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&geofence.id)
    .bind(&geofence.name)
    .bind(geofence.center_latitude)
    .bind(geofence.center_longitude)
    .bind(geofence.radius)
    .bind(geofence.active)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Geofence created successfully",
        "geofence": geofence
    })))
}

/// Patch the supplied fields only.
#[utoipa::path(
    put,
    path = "/api/geofence/{id}",
    params(("id" = String, Path, description = "Geofence id")),
    request_body = Object,
    responses(
        (status = 200, description = "Geofence updated successfully"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Geofence not found")
    ),
    security(("bearer_auth" = [])),
    tag = "GeoFence"
)]
pub async fn update_geofence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let id = path.into_inner();

    let update = build_update_sql("geofences", &body, GEOFENCE_COLUMNS, "id", &id)?;
    let affected = execute_update(pool.get_ref(), update).await?;

    if affected == 0 {
        return Err(ApiError::NotFound("Geofence not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Geofence updated successfully"
    })))
}

#[utoipa::path(
    delete,
    path = "/api/geofence/{id}",
    params(("id" = String, Path, description = "Geofence id")),
    responses(
        (status = 200, description = "Geofence deleted successfully"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Geofence not found")
    ),
    security(("bearer_auth" = [])),
    tag = "GeoFence"
)]
pub async fn delete_geofence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let id = path.into_inner();
    let result = sqlx::query("DELETE FROM geofences WHERE id = ?")
        .bind(&id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Geofence not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Geofence deleted successfully"
    })))
}

/// Evaluate an arbitrary location against the active fence set.
#[utoipa::path(
    post,
    path = "/api/geofence/check",
    request_body = CheckLocationPayload,
    responses(
        (status = 200, description = "Location checked successfully", body = Object)
    ),
    security(("bearer_auth" = [])),
    tag = "GeoFence"
)]
pub async fn check_location(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CheckLocationPayload>,
) -> Result<HttpResponse, ApiError> {
    let Some((latitude, longitude)) = payload.latitude.zip(payload.longitude) else {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "Please provide latitude and longitude"
        })));
    };

    let is_within_fence = geofence::is_within(
        pool.get_ref(),
        latitude,
        longitude,
        config.geofence_fail_open,
    )
    .await;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Location checked successfully",
        "is_within_fence": is_within_fence
    })))
}
