pub mod access_event;
pub mod health_status;
pub mod person;
pub mod role;
pub mod work_area;
