pub mod events;
pub mod feedback;
pub mod journals;
pub mod profiles;
pub mod reminders;
pub mod timers;
pub mod uploads;
pub mod videos;
