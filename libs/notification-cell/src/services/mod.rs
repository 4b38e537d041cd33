pub mod email;
pub mod reminders;

pub use email::EmailService;
pub use reminders::ReminderService;
