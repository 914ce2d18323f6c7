#![deny(missing_docs)]
//! Instrumented cache over a redis key value store.
//!
//! [`Cache`] stores scalars under random keys and reads them back as raw
//! bytes, text or integers. Every [`Cache::save`] is counted and its
//! arguments and result are recorded in the store, and [`history`] prints
//! what was recorded.
//!
//! Creating a [`Cache`] flushes the current database of its store.
pub(crate) mod cache;
pub mod history;
pub mod instrument;
pub(crate) mod result;
/// Key value store backends
pub mod storage;
pub(crate) mod value;

pub use cache::{decode_utf8, parse_int, Cache, CacheConfig, Method};
pub use history::{display_call_history, replay, CallHistory, HistoryEntry};
pub use instrument::{CallCounter, CallDescriptor, CallLogger, Interceptor, Interceptors};
pub use result::{CacheError, CacheResult};
pub use storage::{InMemoryStore, RedisStore, Store};
pub use value::{byte_literal, float_repr, tuple_literal, StoredValue};
