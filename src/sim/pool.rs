//! Object pooling for projectiles and transient effects
//!
//! The pool guarantees slot reuse, not field hygiene: every caller of
//! [`ObjectPool::acquire_with`] must immediately re-initialize the value it
//! gets back (projectiles via `Projectile::reset`, particles likewise).

/// A capacity-capped LIFO free list.
#[derive(Debug)]
pub struct ObjectPool<T> {
    free: Vec<T>,
    capacity: usize,
}

impl<T> ObjectPool<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Take the most recently released instance, or construct a fresh one.
    pub fn acquire_with(&mut self, make: impl FnOnce() -> T) -> T {
        self.free.pop().unwrap_or_else(make)
    }

    /// Return an instance for reuse. Overflow beyond capacity is silently
    /// dropped; running the pool hot is not an error.
    pub fn release(&mut self, value: T) {
        if self.free.len() < self.capacity {
            self.free.push(value);
        }
    }

    /// Number of instances currently waiting for reuse.
    pub fn idle(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Marker(u32);

    #[test]
    fn test_lifo_reuse() {
        let mut pool = ObjectPool::new(8);
        pool.release(Marker(1));
        pool.release(Marker(2));
        // Most recently released comes back first
        assert_eq!(pool.acquire_with(|| Marker(0)), Marker(2));
        assert_eq!(pool.acquire_with(|| Marker(0)), Marker(1));
        // Empty pool falls back to the constructor
        assert_eq!(pool.acquire_with(|| Marker(0)), Marker(0));
    }

    #[test]
    fn test_capacity_cap_drops_overflow() {
        let mut pool = ObjectPool::new(2);
        pool.release(Marker(1));
        pool.release(Marker(2));
        pool.release(Marker(3)); // dropped
        assert_eq!(pool.idle(), 2);
        assert_eq!(pool.acquire_with(|| Marker(0)), Marker(2));
    }

    #[test]
    fn test_acquire_beyond_capacity_allocates() {
        let mut pool: ObjectPool<Marker> = ObjectPool::new(0);
        pool.release(Marker(9)); // capacity 0: dropped
        assert_eq!(pool.idle(), 0);
        assert_eq!(pool.acquire_with(|| Marker(7)), Marker(7));
    }
}
