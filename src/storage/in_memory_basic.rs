use std::collections::HashMap;

use crate::result::{CacheError, CacheResult};
use crate::storage::Store;

const WRONG_TYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

#[derive(Debug, Clone)]
enum Entry {
    Bytes(Vec<u8>),
    List(Vec<Vec<u8>>),
}

/// In memory store with redis string and list semantics. Good for testing only
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    storage: HashMap<String, Entry>,
}

impl InMemoryStore {
    /// Create new in memory store using raw hashmap
    pub fn new() -> Self {
        Self {
            storage: HashMap::new(),
        }
    }

    /// Number of keys currently held
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// true when no key is held
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl Store for InMemoryStore {
    fn set(&mut self, key: &str, value: &[u8]) -> CacheResult<()> {
        self.storage
            .insert(key.to_string(), Entry::Bytes(value.to_vec()));
        Ok(())
    }

    fn get(&mut self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        match self.storage.get(key) {
            None => Ok(None),
            Some(Entry::Bytes(v)) => Ok(Some(v.clone())),
            Some(Entry::List(_)) => Err(CacheError::Storage(WRONG_TYPE.to_string())),
        }
    }

    fn incr(&mut self, key: &str) -> CacheResult<i64> {
        let current = match self.storage.get(key) {
            None => 0,
            Some(Entry::Bytes(v)) => std::str::from_utf8(v)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| {
                    CacheError::Storage("value is not an integer or out of range".to_string())
                })?,
            Some(Entry::List(_)) => return Err(CacheError::Storage(WRONG_TYPE.to_string())),
        };
        let next = current
            .checked_add(1)
            .ok_or_else(|| CacheError::Storage("increment would overflow".to_string()))?;
        self.storage
            .insert(key.to_string(), Entry::Bytes(next.to_string().into_bytes()));
        Ok(next)
    }

    fn rpush(&mut self, key: &str, value: &[u8]) -> CacheResult<usize> {
        let entry = self
            .storage
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(Vec::new()));
        match entry {
            Entry::List(items) => {
                items.push(value.to_vec());
                Ok(items.len())
            }
            Entry::Bytes(_) => Err(CacheError::Storage(WRONG_TYPE.to_string())),
        }
    }

    fn lrange(&mut self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<Vec<u8>>> {
        let items = match self.storage.get(key) {
            None => return Ok(Vec::new()),
            Some(Entry::List(items)) => items,
            Some(Entry::Bytes(_)) => return Err(CacheError::Storage(WRONG_TYPE.to_string())),
        };
        let len = items.len() as isize;
        let start = if start < 0 { (len + start).max(0) } else { start };
        let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
        if start > stop || start >= len {
            return Ok(Vec::new());
        }
        Ok(items[start as usize..=stop as usize].to_vec())
    }

    fn exists(&mut self, key: &str) -> CacheResult<bool> {
        Ok(self.storage.contains_key(key))
    }

    fn flushdb(&mut self) -> CacheResult<()> {
        self.storage.clear();
        Ok(())
    }
}
