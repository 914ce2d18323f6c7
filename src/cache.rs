use log::debug;
use uuid::Uuid;

use crate::instrument::{CallDescriptor, Interceptors};
use crate::result::{CacheError, CacheResult};
use crate::storage::{RedisStore, Store};
use crate::value::StoredValue;

/// Where a cache connects to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// redis connection url
    pub url: String,
}

impl CacheConfig {
    /// default local server
    pub const DEFAULT_URL: &'static str = "redis://127.0.0.1:6379/";

    /// Config for the server at `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_URL)
    }
}

/// Public methods of [`Cache`], named the way instrumentation keys them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// [`Cache::save`], counted and logged
    Save,
    /// [`Cache::retrieve`]
    Retrieve,
    /// [`Cache::retrieve_str`]
    RetrieveStr,
    /// [`Cache::retrieve_int`]
    RetrieveInt,
}

impl Method {
    /// Stable name used as the key namespace of the method's call records
    pub fn qualified_name(&self) -> &'static str {
        match self {
            Method::Save => "Cache.save",
            Method::Retrieve => "Cache.retrieve",
            Method::RetrieveStr => "Cache.retrieve_str",
            Method::RetrieveInt => "Cache.retrieve_int",
        }
    }
}

/// Cache storing scalars under generated keys in a key value store.
///
/// **Creating a cache flushes the whole current database of its store.**
/// Every key written before, by this process or any other client of the same
/// database, is deleted synchronously so each cache starts from a clean slate.
/// Point the cache at a dedicated database when the store is shared.
///
/// Calls to [`save`](Cache::save) are counted and their arguments and results
/// recorded in the store, see [`crate::instrument`].
pub struct Cache<S: Store = RedisStore> {
    store: Option<S>,
    save_layers: Interceptors,
}

impl Cache<RedisStore> {
    /// Connect to the redis server in `config` and flush its current database.
    pub fn connect(config: &CacheConfig) -> CacheResult<Self> {
        let store = RedisStore::open(&config.url)?;
        Self::new(store)
    }
}

impl<S: Store> Cache<S> {
    /// Take ownership of `store` and flush its current database.
    pub fn new(mut store: S) -> CacheResult<Self> {
        store.flushdb()?;
        debug!("flushed store for new cache");
        Ok(Self {
            store: Some(store),
            save_layers: Interceptors::counted_and_logged(),
        })
    }

    /// Store `data` under a fresh random key and return the key
    pub fn save(&mut self, data: impl Into<StoredValue>) -> CacheResult<String> {
        let args = [data.into()];
        let call = CallDescriptor::new(Method::Save.qualified_name(), &args);
        let store = self.store.as_mut().ok_or(CacheError::Closed)?;
        let key = self.save_layers.invoke(store, &call, |store| {
            let key = Uuid::new_v4().to_string();
            store.set(&key, &args[0].to_bytes())?;
            Ok(key)
        })?;
        debug!("saved value under {}", key);
        Ok(key)
    }

    /// Raw bytes stored under `key`, `None` if the key is absent
    pub fn retrieve(&mut self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.store.as_mut().ok_or(CacheError::Closed)?.get(key)
    }

    /// Fetch `key` and hand the result, absent or not, to `transform`
    pub fn retrieve_with<T, F>(&mut self, key: &str, transform: F) -> CacheResult<T>
    where
        F: FnOnce(Option<Vec<u8>>) -> CacheResult<T>,
    {
        let value = self.retrieve(key)?;
        transform(value)
    }

    /// Value under `key` decoded as utf-8
    pub fn retrieve_str(&mut self, key: &str) -> CacheResult<String> {
        self.retrieve_with(key, decode_utf8)
    }

    /// Value under `key` parsed as an integer
    pub fn retrieve_int(&mut self, key: &str) -> CacheResult<i64> {
        self.retrieve_with(key, parse_int)
    }

    /// The store handle, `None` once the cache is closed
    pub fn store_mut(&mut self) -> Option<&mut S> {
        self.store.as_mut()
    }

    /// Release the store handle and return it. Later calls fail with [`CacheError::Closed`].
    pub fn close(&mut self) -> Option<S> {
        self.store.take()
    }

    /// true after [`close`](Cache::close)
    pub fn is_closed(&self) -> bool {
        self.store.is_none()
    }
}

/// Transform decoding a fetched value as utf-8
pub fn decode_utf8(value: Option<Vec<u8>>) -> CacheResult<String> {
    let bytes = value.ok_or(CacheError::Missing)?;
    Ok(String::from_utf8(bytes)?)
}

/// Transform parsing a fetched value as a decimal integer
pub fn parse_int(value: Option<Vec<u8>>) -> CacheResult<i64> {
    let text = decode_utf8(value)?;
    Ok(text.trim().parse::<i64>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;

    fn cache() -> Cache<InMemoryStore> {
        Cache::new(InMemoryStore::new()).unwrap()
    }

    #[test]
    fn round_trips_every_scalar_kind() {
        let mut cache = cache();
        let values: Vec<StoredValue> = vec![
            "foo".into(),
            (&b"\x00bin"[..]).into(),
            (-17).into(),
            2.5.into(),
        ];
        for value in values {
            let key = cache.save(value.clone()).unwrap();
            assert_eq!(cache.retrieve(&key).unwrap(), Some(value.to_bytes()));
        }
    }

    #[test]
    fn typed_reads() {
        let mut cache = cache();
        let s = cache.save("héllo").unwrap();
        let n = cache.save(42).unwrap();
        assert_eq!(cache.retrieve_str(&s).unwrap(), "héllo");
        assert_eq!(cache.retrieve_int(&n).unwrap(), 42);
        assert_eq!(cache.retrieve_str(&n).unwrap(), "42");
    }

    #[test]
    fn retrieve_with_custom_transform() {
        let mut cache = cache();
        let key = cache.save("abc").unwrap();
        let len = cache
            .retrieve_with(&key, |v| Ok(v.map(|b| b.len()).unwrap_or(0)))
            .unwrap();
        assert_eq!(len, 3);
    }

    #[test]
    fn missing_key_passes_through() {
        let mut cache = cache();
        assert_eq!(cache.retrieve("nonexistent-key").unwrap(), None);
        let seen = cache.retrieve_with("nonexistent-key", Ok).unwrap();
        assert_eq!(seen, None);
        assert!(matches!(
            cache.retrieve_str("nonexistent-key"),
            Err(CacheError::Missing)
        ));
        assert!(matches!(
            cache.retrieve_int("nonexistent-key"),
            Err(CacheError::Missing)
        ));
    }

    #[test]
    fn bad_conversions_propagate() {
        let mut cache = cache();
        let text = cache.save("forty-two").unwrap();
        let raw = cache.save(vec![0xffu8, 0xfe]).unwrap();
        assert!(matches!(cache.retrieve_int(&text), Err(CacheError::ParseInt(_))));
        assert!(matches!(cache.retrieve_str(&raw), Err(CacheError::Decode(_))));
    }

    #[test]
    fn keys_are_unique_and_counted() {
        let mut cache = cache();
        let a = cache.save("a").unwrap();
        let b = cache.save("b").unwrap();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());

        let store = cache.store_mut().unwrap();
        assert_eq!(store.get("Cache.save").unwrap(), Some(b"2".to_vec()));
        assert_eq!(
            store.lrange("Cache.save:inputs", 0, -1).unwrap(),
            vec![b"('a',)".to_vec(), b"('b',)".to_vec()]
        );
        assert_eq!(
            store.lrange("Cache.save:outputs", 0, -1).unwrap(),
            vec![a.into_bytes(), b.into_bytes()]
        );
    }

    #[test]
    fn reads_are_not_instrumented() {
        let mut cache = cache();
        let key = cache.save(1).unwrap();
        cache.retrieve_int(&key).unwrap();
        let store = cache.store_mut().unwrap();
        assert!(!store.exists("Cache.retrieve_int").unwrap());
        assert!(!store.exists("Cache.retrieve").unwrap());
    }

    #[test]
    fn new_cache_flushes_previous_session() {
        let mut first = cache();
        let key = first.save("old").unwrap();
        let store = first.close().unwrap();

        let mut second = Cache::new(store).unwrap();
        assert_eq!(second.retrieve(&key).unwrap(), None);
        assert!(!second.store_mut().unwrap().exists("Cache.save").unwrap());
    }

    #[test]
    fn closed_cache_refuses_calls() {
        let mut cache = cache();
        assert!(!cache.is_closed());
        cache.close();
        assert!(cache.is_closed());
        assert!(matches!(cache.save("x"), Err(CacheError::Closed)));
        assert!(matches!(cache.retrieve("x"), Err(CacheError::Closed)));
    }
}
