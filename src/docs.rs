use crate::api::attendance::{
    CheckInPayload, CheckOutPayload, DateRangeQuery, ManualAttendancePayload,
};
use crate::api::geofence::{CheckLocationPayload, CreateGeoFence};
use crate::api::leave::{ApplyLeave, DecideLeavePayload};
use crate::api::manual_request::{ProcessRequestPayload, SubmitManualRequest};
use crate::model::attendance::AttendanceRecord;
use crate::model::geofence::GeoFence;
use crate::model::leave::{Leave, LeaveDecision, LeaveType};
use crate::model::manual_request::{ManualAttendanceRequest, RequestDecision, RequestType};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "QuickClock API",
        version = "1.0.0",
        description = r#"
## Employee Attendance & Leave Administration

This API powers an attendance tracking backend with location verification.

### 🔹 Key Features
- **Attendance Tracking**
  - Daily check-in and check-out with geofence verification
  - Admin manual creation and correction of attendance records
- **Manual Attendance Requests**
  - Employees submit correction requests, admins approve or reject
- **Leave Management**
  - Apply for leave, approve/reject requests, and view leave history
  - Automatic leave deduction for unexplained absences
- **GeoFence Administration**
  - Define circular office zones used to validate check-in locations

### 🔐 Security
All endpoints are protected using **JWT Bearer authentication**.
Administrative operations require the **Admin** role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today_attendance,
        crate::api::attendance::my_history,
        crate::api::attendance::all_attendance,
        crate::api::attendance::attendance_by_date,
        crate::api::attendance::employee_attendance,
        crate::api::attendance::manual_upsert,
        crate::api::attendance::delete_attendance,

        crate::api::manual_request::submit_request,
        crate::api::manual_request::my_requests,
        crate::api::manual_request::all_requests,
        crate::api::manual_request::pending_requests,
        crate::api::manual_request::process_request,
        crate::api::manual_request::cancel_request,

        crate::api::leave::apply_leave,
        crate::api::leave::my_leaves,
        crate::api::leave::all_leaves,
        crate::api::leave::pending_leaves,
        crate::api::leave::decide_leave,
        crate::api::leave::cancel_leave,

        crate::api::geofence::list_geofences,
        crate::api::geofence::get_geofence,
        crate::api::geofence::create_geofence,
        crate::api::geofence::update_geofence,
        crate::api::geofence::delete_geofence,
        crate::api::geofence::check_location
    ),
    components(
        schemas(
            CheckInPayload,
            CheckOutPayload,
            ManualAttendancePayload,
            DateRangeQuery,
            AttendanceRecord,
            SubmitManualRequest,
            ProcessRequestPayload,
            ManualAttendanceRequest,
            RequestDecision,
            RequestType,
            ApplyLeave,
            DecideLeavePayload,
            Leave,
            LeaveType,
            LeaveDecision,
            CreateGeoFence,
            CheckLocationPayload,
            GeoFence
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance tracking APIs"),
        (name = "ManualRequest", description = "Manual attendance correction APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "GeoFence", description = "GeoFence administration APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
