//! Redis-backed queue adapter (§4.A).

mod redis;

pub use self::redis::RedisQueueClient;
