//! Platform abstraction for the per-device lock.
//!
//! With the `std` feature enabled, uses `parking_lot::Mutex` (no poisoning).
//! Without it, uses `spin::Mutex`, which needs the `lock-free` feature.

#[cfg(not(any(feature = "std", feature = "lock-free")))]
compile_error!("enable either the `std` or the `lock-free` feature of `hal`");

#[cfg(feature = "std")]
pub type MutexGuard<'a, T> = parking_lot::MutexGuard<'a, T>;
#[cfg(not(feature = "std"))]
pub type MutexGuard<'a, T> = spin::MutexGuard<'a, T>;

/// Platform-agnostic mutex wrapper.
pub struct Mutex<T> {
    #[cfg(feature = "std")]
    inner: parking_lot::Mutex<T>,
    #[cfg(not(feature = "std"))]
    inner: spin::Mutex<T>,
}

impl<T> Mutex<T> {
    /// Creates a new mutex protecting the given value.
    pub fn new(value: T) -> Self {
        Self {
            #[cfg(feature = "std")]
            inner: parking_lot::Mutex::new(value),
            #[cfg(not(feature = "std"))]
            inner: spin::Mutex::new(value),
        }
    }

    /// Acquires the mutex, blocking until it becomes available.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }
}
