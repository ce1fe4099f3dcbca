pub mod notification;
pub mod users;
