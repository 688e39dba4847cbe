pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod relay;
pub mod session;
pub mod store;
pub mod sync;
pub mod timer;
pub mod ui;
pub mod util;

pub use app::App;
pub use catalog::{Exercise, EXERCISES};
pub use config::Config;
pub use session::{
    AthleteSession, CoachSession, Role, Session, SessionCode, SessionConfig, SessionError,
    SessionManager,
};
pub use store::{HttpStore, MemoryStore, SharedStore, StoreError};
pub use sync::{Mirror, Publisher, ReplicationOrdering, SessionRecord};
pub use timer::{Durations, Phase, TimerError, TimerState};
