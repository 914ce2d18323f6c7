use crate::result::CacheResult;

/// Generic trait that abstracts over the key value store backing a cache.
///
/// Each method is one blocking round trip. Implementations only forward to
/// the store; atomicity is per call.
pub trait Store {
    /// set value with key
    fn set(&mut self, key: &str, value: &[u8]) -> CacheResult<()>;
    /// Get value for key, `None` when absent
    fn get(&mut self, key: &str) -> CacheResult<Option<Vec<u8>>>;
    /// Increment the integer under key by one, starting from zero, and return it
    fn incr(&mut self, key: &str) -> CacheResult<i64>;
    /// append value to the list under key and return the new length
    fn rpush(&mut self, key: &str, value: &[u8]) -> CacheResult<usize>;
    /// Read the list under key between two inclusive indices.
    /// Negative indices count from the end, so `(0, -1)` is the whole list.
    fn lrange(&mut self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<Vec<u8>>>;
    /// check whether key exists
    fn exists(&mut self, key: &str) -> CacheResult<bool>;
    /// Delete every key of the current database, waiting for completion
    fn flushdb(&mut self) -> CacheResult<()>;
}
