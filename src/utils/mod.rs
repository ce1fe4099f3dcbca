pub mod clock;
pub mod db_utils;
pub mod geofence;
