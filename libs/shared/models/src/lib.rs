pub mod auth;
pub mod error;
pub mod profile;
