//! Version lock for optimistic concurrency control.
//!
//! A [`VersionLock`] packs a lock bit and a version counter into a single
//! `u32`. The low bit is set while the lock is held; every unlock leaves the
//! word even and strictly larger than before, so the word doubles as a
//! version number.
//!
//! # Concurrency Model
//! 1. Readers: call [`read`](VersionLock::read), perform the read, then check
//!    [`has_changed`](VersionLock::has_changed).
//! 2. Writers: call [`try_lock`](VersionLock::try_lock) with the version they
//!    validated against, modify, then [`unlock`](VersionLock::unlock).
//!
//! A `try_lock` on a stale version fails even if nobody holds the lock
//! right now, which is what lets a writer validate and lock in one step.

use crate::sync::{AtomicU32, Ordering};

/// Lock bit: the guarded field is being modified.
const LOCK_BIT: u32 = 1;

/// A seqlock-style version counter whose low bit marks it as locked.
///
/// ## Example
///
/// ```
/// use vskl::VersionLock;
///
/// let lock = VersionLock::new();
/// let v = lock.read();
/// assert!(lock.try_lock(v));
/// // A second writer holding the same snapshot loses.
/// assert!(!lock.try_lock(v));
/// lock.unlock();
/// assert!(lock.has_changed(v));
/// ```
#[derive(Debug)]
pub struct VersionLock {
  value: AtomicU32,
}

impl Default for VersionLock {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl VersionLock {
  /// Creates an unlocked version lock at version zero.
  #[inline]
  pub fn new() -> Self {
    Self {
      value: AtomicU32::new(0),
    }
  }

  /// Returns the current version with the lock bit masked off.
  ///
  /// The returned value is always even. If the lock is held at the time of
  /// the read, the returned version is the one the holder locked, and any
  /// `try_lock` with it fails until the holder unlocks (after which the
  /// version has moved on).
  #[inline]
  pub fn read(&self) -> u32 {
    self.value.load(Ordering::Acquire) & !LOCK_BIT
  }

  /// Returns `true` if the lock is currently held.
  #[inline]
  pub fn is_locked(&self) -> bool {
    self.value.load(Ordering::Acquire) & LOCK_BIT != 0
  }

  /// Returns `true` if the lock was taken or released since `version` was
  /// obtained from [`read`](VersionLock::read).
  #[inline]
  pub fn has_changed(&self, version: u32) -> bool {
    self.value.load(Ordering::Acquire) != version
  }

  /// Attempts to move the lock from the unlocked `version` to locked.
  ///
  /// Succeeds only if nobody holds the lock and nobody has released it since
  /// `version` was read.
  #[inline]
  pub fn try_lock(&self, version: u32) -> bool {
    debug_assert_eq!(version & LOCK_BIT, 0, "version must be an unlocked one");
    self
      .value
      .compare_exchange(
        version,
        version.wrapping_add(1),
        Ordering::AcqRel,
        Ordering::Acquire,
      )
      .is_ok()
  }

  /// Spins until the lock is acquired.
  ///
  /// Only for short critical sections where the holder is guaranteed to make
  /// progress without waiting on the caller.
  pub fn lock(&self) {
    #[cfg(not(loom))]
    let backoff = crossbeam_utils::Backoff::new();
    loop {
      let version = self.read();
      if self.try_lock(version) {
        return;
      }

      #[cfg(not(loom))]
      backoff.spin();
      #[cfg(loom)]
      ::loom::thread::yield_now();
    }
  }

  /// Releases the lock, publishing a new even version.
  ///
  /// Must only be called by the holder of the lock, once per successful
  /// [`try_lock`](VersionLock::try_lock) or [`lock`](VersionLock::lock).
  #[inline]
  pub fn unlock(&self) {
    let prev = self.value.fetch_add(1, Ordering::Release);
    debug_assert_eq!(prev & LOCK_BIT, LOCK_BIT, "unlock of a version lock that is not held");
  }

  #[cfg(test)]
  pub(crate) fn raw(&self) -> u32 {
    self.value.load(Ordering::Acquire)
  }
}

#[cfg(all(test, not(loom)))]
mod tests;
