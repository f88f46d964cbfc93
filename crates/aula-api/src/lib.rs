pub mod attendance;
pub mod auth;
pub mod classrooms;
pub mod error;
pub mod reservations;
pub mod sensors;
