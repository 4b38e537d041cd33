pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod templates;
pub mod transport;

pub use models::*;
pub use services::{EmailService, ReminderService};
pub use router::notification_routes;
