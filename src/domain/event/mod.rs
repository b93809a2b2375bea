//! User lifecycle events carried over the queue

mod envelope;

pub use envelope::{UserEvent, UserEventKind};
