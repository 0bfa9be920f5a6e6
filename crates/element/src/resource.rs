//! Suspense resource cache.
//!
//! A `Resource` pairs a loader with a `Cache`. Reading a key that has not
//! settled yet yields the in-flight awaitable for the component to report
//! as `Suspended`; once the awaitable fulfills, the cache holds the value
//! and subsequent reads return it. A rejected load is evicted so the next
//! read retries the loader.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::props::Value;
use crate::suspend::{Awaitable, Settlement};

enum Entry {
    Pending(Rc<dyn Awaitable>),
    Ready(Value),
}

#[derive(Clone, Default)]
pub struct Cache {
    records: Rc<RefCell<HashMap<Arc<str>, Entry>>>,
}

impl Cache {
    pub fn new() -> Cache {
        Cache::default()
    }
}

pub type Loader = dyn Fn(&str) -> Rc<dyn Awaitable>;

pub struct Resource {
    loader: Rc<Loader>,
}

impl Resource {
    pub fn new(loader: impl Fn(&str) -> Rc<dyn Awaitable> + 'static) -> Resource {
        Resource {
            loader: Rc::new(loader),
        }
    }

    /// Read `key` through `cache`: the cached value, or the awaitable to
    /// suspend on.
    pub fn read(&self, cache: &Cache, key: &str) -> Result<Value, Rc<dyn Awaitable>> {
        if let Some(entry) = cache.records.borrow().get(key) {
            return match entry {
                Entry::Ready(value) => Ok(value.clone()),
                Entry::Pending(awaitable) => Err(Rc::clone(awaitable)),
            };
        }

        let awaitable = (self.loader)(key);
        let record_key: Arc<str> = key.into();
        cache.records.borrow_mut().insert(
            Arc::clone(&record_key),
            Entry::Pending(Rc::clone(&awaitable)),
        );

        // Subscribe after inserting, so a loader that settles
        // synchronously overwrites (or evicts) the pending entry.
        let records = Rc::clone(&cache.records);
        awaitable.on_settle(Box::new(move |settlement| {
            let mut records = records.borrow_mut();
            match settlement {
                Settlement::Fulfilled(value) => {
                    records.insert(record_key, Entry::Ready(value.clone()));
                }
                Settlement::Rejected => {
                    records.remove(&record_key);
                }
            }
        }));

        match cache.records.borrow().get(key) {
            Some(Entry::Ready(value)) => Ok(value.clone()),
            _ => Err(awaitable),
        }
    }
}
