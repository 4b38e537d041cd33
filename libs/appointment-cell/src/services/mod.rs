pub mod booking;
pub mod lifecycle;
pub mod listings;
pub mod live;

pub use booking::BookingService;
pub use lifecycle::AppointmentLifecycleService;
pub use listings::AppointmentQueryService;
pub use live::AppointmentUpdates;
