use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

/// A thread-safe free list of reusable values.
///
/// [`Pool::get`] hands out a value wrapped in a [`PoolGuard`], which puts
/// the value back in the pool when dropped. If the pool is empty a new
/// value is created with [`Default`].
#[derive(Debug, Default)]
pub(crate) struct Pool<T> {
    stack: Mutex<Vec<Box<T>>>,
}

impl<T: Default> Pool<T> {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self { stack: Mutex::new(Vec::new()) }
    }

    /// Takes a value from the pool, or creates a new one.
    pub fn get(&self) -> PoolGuard<'_, T> {
        let value = self
            .stack
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_default();

        PoolGuard { pool: self, value: Some(value) }
    }

    fn put(&self, value: Box<T>) {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner).push(value);
    }

    /// Number of values currently in the pool.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// A value taken from a [`Pool`]. Returns the value to the pool on drop.
pub(crate) struct PoolGuard<'p, T: Default> {
    pool: &'p Pool<T>,
    /// Always `Some` until the guard is dropped.
    value: Option<Box<T>>,
}

impl<T: Default> Deref for PoolGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        match &self.value {
            Some(value) => &**value,
            None => unreachable!("pool value used after drop"),
        }
    }
}

impl<T: Default> DerefMut for PoolGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.value {
            Some(value) => &mut **value,
            None => unreachable!("pool value used after drop"),
        }
    }
}

impl<T: Default> Drop for PoolGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.pool.put(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Pool;

    #[test]
    fn values_are_reused() {
        let pool: Pool<Vec<u8>> = Pool::new();
        assert_eq!(pool.len(), 0);

        {
            let mut v = pool.get();
            v.extend_from_slice(b"foo");
            assert_eq!(pool.len(), 0);
        }

        assert_eq!(pool.len(), 1);

        {
            let v = pool.get();
            assert_eq!(v.as_slice(), b"foo");
            let w = pool.get();
            assert!(w.is_empty());
        }

        assert_eq!(pool.len(), 2);
    }
}
