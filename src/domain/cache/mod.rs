//! Cache domain - key/value contract with expiry

mod key;
mod repository;

pub use key::{namespaced_key, user_key, USER_NAMESPACE};
pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
