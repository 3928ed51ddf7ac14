use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Something that happened to a cache entry, polled with [`ResourceCache::drain_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Loaded(String),
    Unloaded(String),
}

/// String-keyed store of shared resources with a fallback.
///
/// Lookups never fail: a missing key yields the default resource and a
/// warning the first time that key is asked for. Unloaded entries are kept
/// aside until every outside handle is gone, so the owner can free the GPU
/// side of a resource only when nothing draws with it anymore.
#[derive(Debug)]
pub struct ResourceCache<T> {
    kind: &'static str,
    entries: HashMap<String, Rc<T>>,
    default: Rc<T>,
    warned: HashSet<String>,
    retired: Vec<Rc<T>>,
    events: Vec<CacheEvent>,
}

impl<T> ResourceCache<T> {
    pub fn new(kind: &'static str, default: T) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
            default: Rc::new(default),
            warned: HashSet::new(),
            retired: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Stores `resource` under `key`, retiring whatever was there.
    pub fn insert(&mut self, key: impl Into<String>, resource: T) -> Rc<T> {
        let key = key.into();
        let resource = Rc::new(resource);
        if let Some(old) = self.entries.insert(key.clone(), Rc::clone(&resource)) {
            log::debug!("{} {key:?} replaced", self.kind);
            self.retired.push(old);
        }
        self.warned.remove(&key);
        self.events.push(CacheEvent::Loaded(key));
        resource
    }

    /// The resource stored under `key`, or the default one.
    pub fn get(&mut self, key: &str) -> Rc<T> {
        if let Some(resource) = self.entries.get(key) {
            return Rc::clone(resource);
        }
        if self.warned.insert(key.to_string()) {
            log::warn!("{} {key:?} is not loaded; using the default", self.kind);
        }
        Rc::clone(&self.default)
    }

    /// Looks `key` up without falling back.
    pub fn try_get(&self, key: &str) -> Option<Rc<T>> {
        self.entries.get(key).cloned()
    }

    /// Key under which `resource` is stored, if it is an entry of this cache.
    pub fn get_key(&self, resource: &Rc<T>) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, r)| Rc::ptr_eq(r, resource))
            .map(|(k, _)| k.as_str())
    }

    pub fn is_loaded(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_default(&self, resource: &Rc<T>) -> bool {
        Rc::ptr_eq(&self.default, resource)
    }

    pub fn default_resource(&self) -> Rc<T> {
        Rc::clone(&self.default)
    }

    /// Removes `key`. Returns false when it was not loaded.
    pub fn unload(&mut self, key: &str) -> bool {
        let Some(resource) = self.entries.remove(key) else {
            return false;
        };
        self.retired.push(resource);
        self.events.push(CacheEvent::Unloaded(key.to_string()));
        log::debug!("{} {key:?} unloaded", self.kind);
        true
    }

    /// Unloads every entry.
    pub fn clear(&mut self) {
        let keys: Vec<String> = self.entries.keys().cloned().collect();
        for key in keys {
            self.unload(&key);
        }
    }

    /// Unloaded resources nobody holds anymore. Still-shared ones stay retired.
    pub fn take_unused(&mut self) -> Vec<T> {
        let mut unused = Vec::new();
        let mut shared = Vec::new();
        for resource in self.retired.drain(..) {
            match Rc::try_unwrap(resource) {
                Ok(resource) => unused.push(resource),
                Err(resource) => shared.push(resource),
            }
        }
        self.retired = shared;
        unused
    }

    /// Everything the cache still owns, entries and default included, for final teardown.
    pub fn take_all(mut self) -> Vec<Rc<T>> {
        let mut all: Vec<Rc<T>> = self.entries.drain().map(|(_, r)| r).collect();
        all.append(&mut self.retired);
        all.push(self.default);
        all
    }

    pub fn drain_events(&mut self) -> Vec<CacheEvent> {
        std::mem::take(&mut self.events)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
