pub mod application;
pub mod application_log;
pub mod job;
pub mod notification;
pub mod user;
