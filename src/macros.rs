#![allow(unused_macros)]

/// Helper macro for reading locked items, propagating poisoning as [`crate::Error::LockError`]
///
/// ```rust, ignore
///  let data = read_lock!(my_rwlock);
///  println!("{}", data.some_field);
/// ```
macro_rules! read_lock {
    ($rwlock:expr) => {
        $rwlock.read().map_err(|_| crate::Error::LockError)?
    };
}

/// Helper macro for writing to locked items, propagating poisoning as [`crate::Error::LockError`]
///
/// ```rust, ignore
///  let mut data = write_lock!(my_rwlock);
///  data.some_field = 42;
/// ```
macro_rules! write_lock {
    ($rwlock:expr) => {
        $rwlock.write().map_err(|_| crate::Error::LockError)?
    };
}

/// Helper macro for locking a mutex, propagating poisoning as [`crate::Error::LockError`]
///
/// ```rust, ignore
///  let _guard = lock!(my_mutex);
/// ```
macro_rules! lock {
    ($mutex:expr) => {
        $mutex.lock().map_err(|_| crate::Error::LockError)?
    };
}
