mod engine;
mod in_memory_basic;
mod redis_backed;

pub use engine::Store;
pub use in_memory_basic::InMemoryStore;
pub use redis_backed::RedisStore;
