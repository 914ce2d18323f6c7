use log::trace;
use redis::Commands;

use crate::result::CacheResult;
use crate::storage::Store;

/// Store backed by a live redis server over a single blocking connection
pub struct RedisStore {
    conn: redis::Connection,
}

impl RedisStore {
    /// Open a connection to the server at `url`, e.g. `redis://127.0.0.1:6379/0`
    pub fn open(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection()?;
        trace!("connected to {}", url);
        Ok(Self { conn })
    }
}

impl Store for RedisStore {
    fn set(&mut self, key: &str, value: &[u8]) -> CacheResult<()> {
        trace!("SET {}", key);
        self.conn.set::<_, _, ()>(key, value)?;
        Ok(())
    }

    fn get(&mut self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        trace!("GET {}", key);
        Ok(self.conn.get(key)?)
    }

    fn incr(&mut self, key: &str) -> CacheResult<i64> {
        trace!("INCR {}", key);
        Ok(self.conn.incr(key, 1)?)
    }

    fn rpush(&mut self, key: &str, value: &[u8]) -> CacheResult<usize> {
        trace!("RPUSH {}", key);
        Ok(self.conn.rpush(key, value)?)
    }

    fn lrange(&mut self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<Vec<u8>>> {
        trace!("LRANGE {} {} {}", key, start, stop);
        Ok(self.conn.lrange(key, start, stop)?)
    }

    fn exists(&mut self, key: &str) -> CacheResult<bool> {
        trace!("EXISTS {}", key);
        Ok(self.conn.exists(key)?)
    }

    fn flushdb(&mut self) -> CacheResult<()> {
        trace!("FLUSHDB SYNC");
        redis::cmd("FLUSHDB").arg("SYNC").query::<()>(&mut self.conn)?;
        Ok(())
    }
}
