//! Business logic behind the handlers.

pub mod auth;
pub mod projects;
pub mod users;
