//! Call instrumentation.
//!
//! An [`Interceptor`] observes a call through a `before` hook, run ahead of
//! the call, and an `after` hook, run with the raw result once the call has
//! succeeded. Interceptors record into the same store the call uses, under
//! keys derived from the call's qualified name:
//!
//! | key | written by |
//! |-----|------------|
//! | `<name>` | [`CallCounter`], `INCR` per call |
//! | `<name>:inputs` | [`CallLogger`], rendered argument tuple |
//! | `<name>:outputs` | [`CallLogger`], raw result bytes |
//!
//! Hooks are separate round trips. A call that fails has its input logged
//! but no output, so the two lists can drift apart.

use log::trace;

use crate::result::CacheResult;
use crate::storage::Store;
use crate::value::{tuple_literal, StoredValue};

/// One call as seen by interceptors
#[derive(Debug, Clone, Copy)]
pub struct CallDescriptor<'a> {
    /// stable name of the method, used as key namespace
    pub qualified_name: &'a str,
    /// positional arguments
    pub args: &'a [StoredValue],
}

impl<'a> CallDescriptor<'a> {
    /// describe a call of `qualified_name` with `args`
    pub fn new(qualified_name: &'a str, args: &'a [StoredValue]) -> Self {
        Self {
            qualified_name,
            args,
        }
    }

    /// key of the call counter
    pub fn counter_key(&self) -> &str {
        self.qualified_name
    }

    /// key of the input history list
    pub fn inputs_key(&self) -> String {
        inputs_key(self.qualified_name)
    }

    /// key of the output history list
    pub fn outputs_key(&self) -> String {
        outputs_key(self.qualified_name)
    }
}

pub(crate) fn inputs_key(qualified_name: &str) -> String {
    format!("{}:inputs", qualified_name)
}

pub(crate) fn outputs_key(qualified_name: &str) -> String {
    format!("{}:outputs", qualified_name)
}

/// Side effect attached around a call. Must not change the call's result.
pub trait Interceptor {
    /// Runs before the call. An error aborts the call.
    fn before(&self, store: &mut dyn Store, call: &CallDescriptor<'_>) -> CacheResult<()>;

    /// Runs after a successful call with its raw result.
    fn after(
        &self,
        _store: &mut dyn Store,
        _call: &CallDescriptor<'_>,
        _result: &[u8],
    ) -> CacheResult<()> {
        Ok(())
    }
}

/// Counts calls per qualified name
#[derive(Debug, Default, Clone, Copy)]
pub struct CallCounter;

impl Interceptor for CallCounter {
    fn before(&self, store: &mut dyn Store, call: &CallDescriptor<'_>) -> CacheResult<()> {
        let count = store.incr(call.counter_key())?;
        trace!("{} call #{}", call.qualified_name, count);
        Ok(())
    }
}

/// Records the inputs and outputs of every call
#[derive(Debug, Default, Clone, Copy)]
pub struct CallLogger;

impl Interceptor for CallLogger {
    fn before(&self, store: &mut dyn Store, call: &CallDescriptor<'_>) -> CacheResult<()> {
        let rendered = tuple_literal(call.args);
        trace!("{} input {}", call.qualified_name, rendered);
        store.rpush(&call.inputs_key(), rendered.as_bytes())?;
        Ok(())
    }

    fn after(
        &self,
        store: &mut dyn Store,
        call: &CallDescriptor<'_>,
        result: &[u8],
    ) -> CacheResult<()> {
        store.rpush(&call.outputs_key(), result)?;
        Ok(())
    }
}

/// Ordered composition of interceptors.
///
/// [`wrap`](Interceptors::wrap) places an interceptor outside all the ones
/// already present. `before` hooks run outermost first and `after` hooks run
/// innermost first.
#[derive(Default)]
pub struct Interceptors {
    // innermost first
    chain: Vec<Box<dyn Interceptor>>,
}

impl Interceptors {
    /// empty chain, calls pass straight through
    pub fn new() -> Self {
        Self { chain: Vec::new() }
    }

    /// Counter inside, logger outside
    pub fn counted_and_logged() -> Self {
        Self::new().wrap(CallCounter).wrap(CallLogger)
    }

    /// add `interceptor` as the new outermost layer
    pub fn wrap(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.chain.push(Box::new(interceptor));
        self
    }

    /// number of layers
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// true when no layer is present
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Run `op` on `store` inside every layer and return its result unchanged.
    pub fn invoke<S, T, F>(&self, store: &mut S, call: &CallDescriptor<'_>, op: F) -> CacheResult<T>
    where
        S: Store,
        T: AsRef<[u8]>,
        F: FnOnce(&mut S) -> CacheResult<T>,
    {
        for layer in self.chain.iter().rev() {
            layer.before(&mut *store, call)?;
        }
        let result = op(&mut *store)?;
        for layer in self.chain.iter() {
            layer.after(&mut *store, call, result.as_ref())?;
        }
        Ok(result)
    }
}
