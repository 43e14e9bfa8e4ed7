//! Single-slot memoization keyed on input identity
//!
//! Derived state (resolved rooms, screen coordinates) is recomputed only
//! when the identity of its declared inputs changes, not on every read.

/// Caches one value together with the key it was computed from
#[derive(Debug, Clone)]
pub struct Memo<K, V> {
    key: Option<K>,
    value: Option<V>,
    computations: u64,
}

impl<K: PartialEq, V> Memo<K, V> {
    pub fn new() -> Self {
        Self {
            key: None,
            value: None,
            computations: 0,
        }
    }

    /// Cached value for `key`, computing it if the key changed
    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce() -> V) -> &V {
        if self.key.as_ref() != Some(&key) {
            self.key = Some(key);
            self.value = None;
        }
        let computations = &mut self.computations;
        self.value.get_or_insert_with(|| {
            *computations += 1;
            compute()
        })
    }

    /// Cached value if it was computed for `key`
    #[cfg(test)]
    pub fn peek(&self, key: &K) -> Option<&V> {
        match &self.key {
            Some(k) if k == key => self.value.as_ref(),
            _ => None,
        }
    }

    pub fn invalidate(&mut self) {
        self.key = None;
        self.value = None;
    }

    /// Number of times the value has been computed
    pub fn computations(&self) -> u64 {
        self.computations
    }
}

impl<K: PartialEq, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
