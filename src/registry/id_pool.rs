//! Identifier Pool
//!
//! Recycles small integer ids so that deleted resources' slots are reused.
//! Released ids are kept in an ordered set: the smallest pending id is always
//! handed out before any never-used integer.

use std::collections::BTreeSet;

/// Allocator of recyclable `u32` identifiers.
///
/// Not thread-safe; owned by a single registry category.
#[derive(Debug, Clone, Default)]
pub struct IdentifierPool {
    /// First integer that has never been handed out.
    next: u32,
    /// Ids returned by `release` and not yet re-acquired.
    released: BTreeSet<u32>,
}

impl IdentifierPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the smallest released id, or the next never-used one.
    pub fn acquire(&mut self) -> u32 {
        if let Some(id) = self.released.pop_first() {
            return id;
        }
        let id = self.next;
        self.next = self
            .next
            .checked_add(1)
            .expect("IdentifierPool exhausted the u32 id space");
        id
    }

    /// Returns `id` to the pool for future reuse.
    ///
    /// # Panics
    ///
    /// Releasing an id that is not currently held is a registry-discipline
    /// bug and panics.
    pub fn release(&mut self, id: u32) {
        assert!(
            self.is_held(id),
            "IdentifierPool: released id {id} which is not currently held"
        );
        self.released.insert(id);
    }

    /// Whether `id` is currently issued and not yet released.
    #[inline]
    #[must_use]
    pub fn is_held(&self, id: u32) -> bool {
        id < self.next && !self.released.contains(&id)
    }

    /// Number of ids currently held.
    #[inline]
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.next as usize - self.released.len()
    }

    /// Number of ids waiting for reuse.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.released.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_pool_counts_up_from_zero() {
        let mut pool = IdentifierPool::new();
        assert_eq!(pool.acquire(), 0);
        assert_eq!(pool.acquire(), 1);
        assert_eq!(pool.acquire(), 2);
        assert_eq!(pool.in_use(), 3);
    }

    #[test]
    fn smallest_released_id_comes_back_first() {
        let mut pool = IdentifierPool::new();
        for _ in 0..5 {
            pool.acquire();
        }
        pool.release(3);
        pool.release(1);
        assert_eq!(pool.acquire(), 1);
        assert_eq!(pool.acquire(), 3);
        assert_eq!(pool.acquire(), 5);
    }

    #[test]
    #[should_panic(expected = "not currently held")]
    fn double_release_panics() {
        let mut pool = IdentifierPool::new();
        let id = pool.acquire();
        pool.release(id);
        pool.release(id);
    }

    #[test]
    #[should_panic(expected = "not currently held")]
    fn releasing_unissued_id_panics() {
        let mut pool = IdentifierPool::new();
        pool.release(7);
    }
}
