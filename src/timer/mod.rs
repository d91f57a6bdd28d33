pub mod commands;
pub mod controller;
pub mod error;
pub mod state;

pub use controller::{CreateTimer, TimerController, TimerView};
pub use error::TimerError;
