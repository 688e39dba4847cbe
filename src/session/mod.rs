//! Session lifecycle: codes, roles, and the coach and athlete handles
//!
//! A [`SessionManager`] hands out a [`CoachSession`] to whoever creates a
//! session and an [`AthleteSession`] to whoever joins one. Only the coach
//! handle can change the timer.

mod athlete;
mod coach;
mod code;
mod error;
mod manager;
mod model;

pub use athlete::AthleteSession;
pub use coach::CoachSession;
pub use code::SessionCode;
pub use error::SessionError;
pub use manager::SessionManager;
pub use model::{Role, Session, SessionConfig};
