//! Call history reports.
//!
//! Reads back what [`CallCounter`](crate::instrument::CallCounter) and
//! [`CallLogger`](crate::instrument::CallLogger) recorded for a method and
//! renders it:
//!
//! ```text
//! Cache.save was called 2 times:
//! Cache.save(*('a',)) -> b'3f2c...'
//! Cache.save(*('b',)) -> b'9d41...'
//! ```
//!
//! Inputs and outputs are paired by position. When the lists differ in
//! length, which happens after a failed call, the unmatched tail is left out.

use std::fmt;
use std::io::{self, Write};

use log::debug;
use serde::{Serialize, Serializer};

use crate::cache::{parse_int, Cache, Method};
use crate::instrument::{inputs_key, outputs_key};
use crate::result::CacheResult;
use crate::storage::Store;
use crate::value::byte_literal;

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// rendered argument tuple
    pub input: String,
    /// raw result
    #[serde(serialize_with = "lossy_str")]
    pub output: Vec<u8>,
}

/// Everything recorded for one qualified name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallHistory {
    /// method the history belongs to
    pub qualified_name: String,
    /// counter value, zero when never called
    pub calls: i64,
    /// paired inputs and outputs in call order
    pub entries: Vec<HistoryEntry>,
}

impl fmt::Display for CallHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} was called {} times:", self.qualified_name, self.calls)?;
        for entry in &self.entries {
            write!(
                f,
                "\n{}(*{}) -> {}",
                self.qualified_name,
                entry.input,
                byte_literal(&entry.output)
            )?;
        }
        Ok(())
    }
}

fn lossy_str<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

/// Read the count and history recorded under `qualified_name`
pub fn replay(store: &mut dyn Store, qualified_name: &str) -> CacheResult<CallHistory> {
    let calls = if store.exists(qualified_name)? {
        parse_int(store.get(qualified_name)?)?
    } else {
        0
    };
    let inputs = store.lrange(&inputs_key(qualified_name), 0, -1)?;
    let outputs = store.lrange(&outputs_key(qualified_name), 0, -1)?;
    if inputs.len() != outputs.len() {
        debug!(
            "{} has {} inputs but {} outputs",
            qualified_name,
            inputs.len(),
            outputs.len()
        );
    }
    let entries = inputs
        .into_iter()
        .zip(outputs)
        .map(|(input, output)| HistoryEntry {
            // only CallLogger writes here and it writes utf-8
            input: String::from_utf8_lossy(&input).into_owned(),
            output,
        })
        .collect();
    Ok(CallHistory {
        qualified_name: qualified_name.to_string(),
        calls,
        entries,
    })
}

/// Write the history of `method` on `cache` to `out`.
/// Writes nothing when the cache no longer holds a store.
pub fn write_call_history<S, W>(cache: &mut Cache<S>, method: Method, out: &mut W) -> CacheResult<()>
where
    S: Store,
    W: Write,
{
    let store = match cache.store_mut() {
        Some(store) => store,
        None => return Ok(()),
    };
    let history = replay(store, method.qualified_name())?;
    writeln!(out, "{}", history)?;
    Ok(())
}

/// Print the history of `method` on `cache` to stdout
pub fn display_call_history<S: Store>(cache: &mut Cache<S>, method: Method) -> CacheResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_call_history(cache, method, &mut out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;

    fn report(cache: &mut Cache<InMemoryStore>, method: Method) -> String {
        let mut out = Vec::new();
        write_call_history(cache, method, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn reports_single_save() {
        let mut cache = Cache::new(InMemoryStore::new()).unwrap();
        let key = cache.save("foo").unwrap();
        assert_eq!(cache.retrieve_str(&key).unwrap(), "foo");

        assert_eq!(
            report(&mut cache, Method::Save),
            format!(
                "Cache.save was called 1 times:\nCache.save(*('foo',)) -> b'{}'\n",
                key
            )
        );
    }

    #[test]
    fn keeps_call_order() {
        let mut cache = Cache::new(InMemoryStore::new()).unwrap();
        let a = cache.save("a").unwrap();
        let b = cache.save("b").unwrap();
        let history = replay(cache.store_mut().unwrap(), "Cache.save").unwrap();

        assert_eq!(history.calls, 2);
        let inputs: Vec<&str> = history.entries.iter().map(|e| e.input.as_str()).collect();
        assert_eq!(inputs, vec!["('a',)", "('b',)"]);
        let outputs: Vec<Vec<u8>> = history.entries.into_iter().map(|e| e.output).collect();
        assert_eq!(outputs, vec![a.into_bytes(), b.into_bytes()]);
    }

    #[test]
    fn never_called_reports_zero() {
        let mut cache = Cache::new(InMemoryStore::new()).unwrap();
        assert_eq!(
            report(&mut cache, Method::RetrieveStr),
            "Cache.retrieve_str was called 0 times:\n"
        );
    }

    #[test]
    fn unmatched_inputs_are_dropped() {
        let mut store = InMemoryStore::new();
        store.incr("Op").unwrap();
        store.incr("Op").unwrap();
        store.rpush("Op:inputs", b"(1,)").unwrap();
        store.rpush("Op:inputs", b"(2,)").unwrap();
        store.rpush("Op:outputs", b"one").unwrap();

        let history = replay(&mut store, "Op").unwrap();
        assert_eq!(history.calls, 2);
        assert_eq!(history.entries.len(), 1);
        assert_eq!(
            history.to_string(),
            "Op was called 2 times:\nOp(*(1,)) -> b'one'"
        );
    }

    #[test]
    fn closed_cache_prints_nothing() {
        let mut cache = Cache::new(InMemoryStore::new()).unwrap();
        cache.save("foo").unwrap();
        cache.close();
        assert_eq!(report(&mut cache, Method::Save), "");
    }

    #[test]
    fn serializes_to_json() {
        let history = CallHistory {
            qualified_name: "Cache.save".to_string(),
            calls: 1,
            entries: vec![HistoryEntry {
                input: "('x',)".to_string(),
                output: b"k1".to_vec(),
            }],
        };
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json["calls"], 1);
        assert_eq!(json["entries"][0]["output"], "k1");
    }
}
