pub mod event;
pub mod feedback;
pub mod journal;
pub mod profile;
pub mod reminder;
pub mod timer;
pub mod upload;

pub use event::Event;
pub use feedback::Feedback;
pub use journal::{Journal, JournalPatch};
pub use profile::{NewProfile, Profile, ProfileDeletion, ProfilePatch};
pub use reminder::{NewReminder, Reminder, ReminderPatch};
pub use timer::{NewTimer, Timer, TimerKind, TimerStatus};
pub use upload::Upload;
