use thiserror::Error;

/// Cache errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// Error reported by the redis client, connection failures included
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    /// Storage error raised by a non redis backend
    #[error("storage error: {0}")]
    Storage(String),
    /// A typed read found no value under the key
    #[error("no value stored under key")]
    Missing,
    /// Stored bytes are not valid utf-8
    #[error("value is not valid utf-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
    /// Stored text is not an integer
    #[error("value is not an integer: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
    /// Failed to write a report
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The cache released its store handle
    #[error("cache is closed")]
    Closed,
}

/// Cache Result type
pub type CacheResult<T> = Result<T, CacheError>;
