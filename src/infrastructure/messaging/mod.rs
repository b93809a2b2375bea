//! Messaging infrastructure - Queue backends, the consumer loop and the
//! user event dispatcher

mod consumer;
mod dispatcher;
mod factory;
mod in_memory;
mod redis_stream;

pub use consumer::QueueConsumer;
pub use dispatcher::UserEventDispatcher;
pub use factory::QueueFactory;
pub use in_memory::{InMemoryQueue, QueueStats};
pub use redis_stream::{RedisStreamConfig, RedisStreamQueue};
