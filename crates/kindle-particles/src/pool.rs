//! Identity-keyed object pool
//!
//! Each distinct factory gets a stable [`PoolKey`] the first time it is seen.
//! Expired instances go onto the free list for the key they were acquired
//! with and come back out last-in, first-out.
//!
//! The pool is single-threaded (factories are `Rc`). Sharing one across
//! threads would need a lock around `get`/`expire` or one pool per worker.

use kindle_core::{KindleError, Result};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

/// Produces new instances for a [`Pool`].
///
/// A factory either constructs fresh values or clones a prototype. One that
/// does neither is rejected with [`KindleError::UnsupportedFactory`].
pub trait Factory<T> {
    fn construct(&self) -> Option<T> {
        None
    }

    fn clone_prototype(&self) -> Option<T> {
        None
    }

    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// Factory backed by a constructor function
pub struct Constructor<F>(pub F);

impl<T, F: Fn() -> T> Factory<T> for Constructor<F> {
    fn construct(&self) -> Option<T> {
        Some((self.0)())
    }
}

/// Factory that clones a template value
pub struct Prototype<T>(pub T);

impl<T: Clone> Factory<T> for Prototype<T> {
    fn clone_prototype(&self) -> Option<T> {
        Some(self.0.clone())
    }
}

/// Stable identity assigned to a factory on first use
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PoolKey(pub u32);

/// An instance on loan from a pool, stamped with the key it returns to.
pub struct Pooled<T> {
    key: PoolKey,
    item: Box<T>,
}

impl<T> Pooled<T> {
    pub fn key(&self) -> PoolKey {
        self.key
    }
}

impl<T> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.item
    }
}

impl<T: fmt::Debug> fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pooled")
            .field("key", &self.key)
            .field("item", &self.item)
            .finish()
    }
}

/// Free lists of expired instances, one per factory identity.
pub struct Pool<T> {
    /// Factory address -> key; the `Rc`s below keep the addresses pinned
    keys: HashMap<usize, PoolKey>,
    factories: Vec<Rc<dyn Factory<T>>>,
    free: HashMap<PoolKey, Vec<Box<T>>>,
    created: usize,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            keys: HashMap::new(),
            factories: Vec::new(),
            free: HashMap::new(),
            created: 0,
        }
    }

    /// Key for `factory`, registering it on first sight
    pub fn key_for(&mut self, factory: &Rc<dyn Factory<T>>) -> PoolKey {
        let addr = Rc::as_ptr(factory) as *const () as usize;
        if let Some(key) = self.keys.get(&addr) {
            return *key;
        }
        let key = PoolKey(self.factories.len() as u32);
        self.factories.push(Rc::clone(factory));
        self.keys.insert(addr, key);
        key
    }

    /// Take an instance: the most recently expired one for this factory,
    /// or a new one when the free list is empty.
    pub fn get(&mut self, factory: &Rc<dyn Factory<T>>) -> Result<Pooled<T>> {
        let key = self.key_for(factory);
        if let Some(item) = self.free.get_mut(&key).and_then(Vec::pop) {
            return Ok(Pooled { key, item });
        }
        let item = Box::new(self.create(factory.as_ref())?);
        Ok(Pooled { key, item })
    }

    /// Build a fresh instance, bypassing the free lists
    pub fn create(&mut self, factory: &dyn Factory<T>) -> Result<T> {
        let item = factory
            .construct()
            .or_else(|| factory.clone_prototype())
            .ok_or_else(|| KindleError::UnsupportedFactory(factory.describe()))?;
        self.created += 1;
        Ok(item)
    }

    /// Return an instance to the free list it was acquired from
    pub fn expire(&mut self, pooled: Pooled<T>) {
        self.free.entry(pooled.key).or_default().push(pooled.item);
    }

    /// Drop every free instance. Instances on loan are untouched.
    pub fn destroy(&mut self) {
        let dropped = self.free_count();
        self.free.clear();
        log::debug!("pool destroyed, released {dropped} free instance(s)");
    }

    /// Instances constructed over the pool's lifetime
    pub fn created(&self) -> usize {
        self.created
    }

    /// Instances waiting on all free lists
    pub fn free_count(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }

    /// Instances waiting on the free list for `key`
    pub fn free_count_for(&self, key: PoolKey) -> usize {
        self.free.get(&key).map_or(0, Vec::len)
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("factories", &self.factories.len())
            .field("free", &self.free_count())
            .field("created", &self.created)
            .finish()
    }
}
