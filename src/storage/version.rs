//! Versioned derived views
//!
//! A derived view is any cache computed from the store (the search index is
//! the main one). It remembers the store version it was built from and is
//! rebuilt on the next read after that version moves on. Rebuilds happen
//! only on read, never on write.

/// Anything exposing a monotonic change counter
pub trait Versioned {
    fn version(&self) -> u64;
}

/// A value derived from a [`Versioned`] source
#[derive(Debug)]
pub struct Derived<T> {
    value: Option<T>,
    built_at: Option<u64>,
}

impl<T> Default for Derived<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Derived<T> {
    /// Creates an empty view; the first read always builds
    pub fn new() -> Self {
        Self {
            value: None,
            built_at: None,
        }
    }

    /// Returns true if the view must be rebuilt before use at `current`
    pub fn is_stale(&self, current: u64) -> bool {
        self.value.is_none() || self.built_at != Some(current)
    }

    /// Version the cached value was built from
    pub fn built_at(&self) -> Option<u64> {
        self.built_at
    }

    /// Returns the cached value, rebuilding it first if `current` moved on
    ///
    /// A failed build leaves the view empty so the next read retries.
    pub fn get_or_rebuild<E, F>(&mut self, current: u64, build: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let value = match self.value.take().filter(|_| self.built_at == Some(current)) {
            Some(value) => value,
            None => {
                self.built_at = None;
                let value = build()?;
                self.built_at = Some(current);
                value
            }
        };

        Ok(self.value.insert(value))
    }

    /// Like [`Derived::get_or_rebuild`], reading the version from `source`
    pub fn get_or_rebuild_from<S, E, F>(&mut self, source: &S, build: F) -> Result<&T, E>
    where
        S: Versioned + ?Sized,
        F: FnOnce(&S) -> Result<T, E>,
    {
        self.get_or_rebuild(source.version(), || build(source))
    }
}
