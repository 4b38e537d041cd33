pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use services::live::AppointmentUpdates;
pub use router::appointment_routes;
