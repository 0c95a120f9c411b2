//! Editing session: state value and controller.

pub mod manager;
pub mod model;

pub use manager::FileSession;
pub use model::{Controls, SaveOutcome, Session, SessionState, SessionView, SkipReason, Status};
