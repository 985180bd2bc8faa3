use super::*;
use std::{
  sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
  },
  thread,
};

#[test]
fn test_new_is_unlocked() {
  let lock = VersionLock::new();
  assert_eq!(lock.read(), 0);
  assert!(!lock.is_locked());
  assert!(!lock.has_changed(0));
}

#[test]
fn test_try_lock_unlock() {
  let lock = VersionLock::new();
  let v = lock.read();
  assert!(lock.try_lock(v));
  assert!(lock.is_locked());
  assert_eq!(lock.raw(), v + 1);
  // The masked read still reports the version that was locked.
  assert_eq!(lock.read(), v);
  assert!(!lock.try_lock(v));

  lock.unlock();
  assert!(!lock.is_locked());
  assert_eq!(lock.read(), v + 2);
  assert!(lock.has_changed(v));
}

#[test]
fn test_try_lock_stale_version() {
  let lock = VersionLock::new();
  let stale = lock.read();
  lock.lock();
  lock.unlock();

  assert!(!lock.try_lock(stale));
  let fresh = lock.read();
  assert!(lock.try_lock(fresh));
  lock.unlock();
}

#[test]
fn test_versions_strictly_increase() {
  let lock = VersionLock::new();
  let mut last = lock.read();
  for _ in 0..100 {
    lock.lock();
    lock.unlock();
    let v = lock.read();
    assert!(v > last);
    assert_eq!(v % 2, 0);
    last = v;
  }
}

#[test]
fn test_wrapping() {
  let lock = VersionLock {
    value: AtomicU32::new(u32::MAX - 1),
  };
  let v = lock.read();
  assert!(lock.try_lock(v));
  assert_eq!(lock.raw(), u32::MAX);
  lock.unlock();
  assert_eq!(lock.read(), 0);
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_concurrent_mutual_exclusion() {
  const THREADS: usize = 8;
  const ITERS: u64 = 10_000;

  let lock = Arc::new(VersionLock::new());
  // Non-atomic read-modify-write, only correct under mutual exclusion.
  let counter = Arc::new(AtomicU64::new(0));

  let handles: Vec<_> = (0..THREADS)
    .map(|_| {
      let lock = lock.clone();
      let counter = counter.clone();
      thread::spawn(move || {
        for _ in 0..ITERS {
          lock.lock();
          let c = counter.load(Ordering::Relaxed);
          counter.store(c + 1, Ordering::Relaxed);
          lock.unlock();
        }
      })
    })
    .collect();

  for h in handles {
    h.join().unwrap();
  }

  assert_eq!(counter.load(Ordering::Relaxed), THREADS as u64 * ITERS);
  assert_eq!(lock.read() as u64, 2 * THREADS as u64 * ITERS);
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_optimistic_read_sees_consistent_pair() {
  const WRITES: u64 = 20_000;

  let lock = Arc::new(VersionLock::new());
  let a = Arc::new(AtomicU64::new(0));
  let b = Arc::new(AtomicU64::new(0));

  let writer = {
    let (lock, a, b) = (lock.clone(), a.clone(), b.clone());
    thread::spawn(move || {
      for i in 1..=WRITES {
        lock.lock();
        a.store(i, Ordering::Release);
        b.store(i, Ordering::Release);
        lock.unlock();
      }
    })
  };

  let mut validated = 0u64;
  while !writer.is_finished() || validated == 0 {
    let v = lock.read();
    let x = a.load(Ordering::Acquire);
    let y = b.load(Ordering::Acquire);
    if !lock.has_changed(v) {
      assert_eq!(x, y, "optimistic read validated a torn pair");
      validated += 1;
    }
  }
  writer.join().unwrap();
  assert!(validated > 0);
}
