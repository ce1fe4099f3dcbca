pub mod attendance;
pub mod geofence;
pub mod leave;
pub mod manual_request;
