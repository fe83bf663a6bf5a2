#![allow(unused_macros)]

/// Helper macro for locking items, propagating a poisoned lock as [`crate::Error::LockError`]
///
/// ```rust, ignore
///  let mut data = lock!(my_mutex);
///  data.some_field = 42;
/// ```
macro_rules! lock {
    ($lock:expr) => {
        $lock.lock().map_err(|_| crate::Error::LockError)?
    };
}

/// Helper macro for waiting on a condition variable with a timeout, re-acquiring the guard
///
/// ```rust, ignore
///  guard = wait_timeout!(self.changed, guard, Duration::from_millis(50));
/// ```
macro_rules! wait_timeout {
    ($condvar:expr, $guard:expr, $timeout:expr) => {
        $condvar
            .wait_timeout($guard, $timeout)
            .map_err(|_| crate::Error::LockError)?
            .0
    };
}

/// Helper macro for blocking on a condition variable until notified, re-acquiring the guard
///
/// ```rust, ignore
///  guard = wait!(self.changed, guard);
/// ```
macro_rules! wait {
    ($condvar:expr, $guard:expr) => {
        $condvar
            .wait($guard)
            .map_err(|_| crate::Error::LockError)?
    };
}
