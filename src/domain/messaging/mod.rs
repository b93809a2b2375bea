//! Messaging ports - the queue contract and the message handler seam

mod handler;
mod policy;
mod queue;

pub use handler::MessageHandler;
pub use policy::RequeuePolicy;
pub use queue::{Delivery, MessageQueue};

#[cfg(test)]
pub use handler::MockMessageHandler;
