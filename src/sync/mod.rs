//! Replication of coach state to athletes through the shared store
//!
//! Coach side: [`Publisher`] writes a full [`SessionRecord`] per change.
//! Athlete side: [`Mirror`] subscribes and feeds a [`Replica`].

mod mirror;
mod publisher;
mod record;

pub use mirror::{ApplyOutcome, Mirror, Replica, ReplicationOrdering};
pub use publisher::Publisher;
pub use record::{RecordError, SessionRecord};
