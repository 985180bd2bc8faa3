use crossbeam_epoch::{Atomic, Guard, Owned, Shared};

use crate::{
  sync::{AtomicU32, Ordering},
  VersionLock,
};

/// The ordering key of a node.
///
/// The two sentinels bound every level of the list, so that all `i64` keys
/// (including `i64::MIN` and `i64::MAX`) remain storable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) enum NodeKey {
  Head,
  Key(i64),
  Tail,
}

/// One level of a node's tower.
#[derive(Debug)]
pub(super) struct Level {
  pub(super) next: Atomic<Node>,
  /// Guards `next` of this level.
  pub(super) lock: VersionLock,
}

impl Level {
  #[inline]
  fn new() -> Self {
    Self {
      next: Atomic::null(),
      lock: VersionLock::new(),
    }
  }
}

#[derive(Debug)]
pub(super) struct Node {
  pub(super) key: NodeKey,
  /// Number of levels the node should be linked at. `0` means the key is
  /// logically absent.
  target_height: AtomicU32,
  /// Number of levels the node is physically linked at right now, always
  /// counted from level 0 upwards.
  current_height: AtomicU32,
  /// Guards `target_height` and `current_height`.
  pub(super) height_lock: VersionLock,
  // Allocated at the full height of the set: a node revived after a
  // logical delete may draw a taller target than the one it was created with.
  tower: Box<[Level]>,
}

impl Node {
  /// Creates an unlinked node for `key`.
  pub(super) fn new(key: i64, target_height: usize, tower_height: usize) -> Owned<Self> {
    debug_assert!(target_height >= 1 && target_height <= tower_height);
    Owned::new(Self {
      key: NodeKey::Key(key),
      target_height: AtomicU32::new(target_height as u32),
      current_height: AtomicU32::new(0),
      height_lock: VersionLock::new(),
      tower: (0..tower_height).map(|_| Level::new()).collect(),
    })
  }

  /// Creates a sentinel linked at every level, pointing to `next` everywhere.
  pub(super) fn sentinel(key: NodeKey, next: Shared<'_, Node>, height: usize) -> Owned<Self> {
    let tower: Box<[Level]> = (0..height).map(|_| Level::new()).collect();
    for level in tower.iter() {
      level.next.store(next, Ordering::Relaxed);
    }

    Owned::new(Self {
      key,
      target_height: AtomicU32::new(height as u32),
      current_height: AtomicU32::new(height as u32),
      height_lock: VersionLock::new(),
      tower,
    })
  }

  #[inline]
  pub(super) fn is_present(&self) -> bool {
    self.target_height() != 0
  }

  #[inline]
  pub(super) fn target_height(&self) -> usize {
    self.target_height.load(Ordering::Acquire) as usize
  }

  #[inline]
  pub(super) fn current_height(&self) -> usize {
    self.current_height.load(Ordering::Acquire) as usize
  }

  /// The caller must hold `height_lock`.
  #[inline]
  pub(super) fn set_target_height(&self, height: usize) {
    debug_assert!(self.height_lock.is_locked());
    self.target_height.store(height as u32, Ordering::Release);
  }

  /// The caller must hold `height_lock`.
  #[inline]
  pub(super) fn grow(&self) {
    debug_assert!(self.height_lock.is_locked());
    self.current_height.fetch_add(1, Ordering::AcqRel);
  }

  /// Returns the number of levels still linked. The caller must hold
  /// `height_lock`.
  #[inline]
  pub(super) fn shrink(&self) -> usize {
    debug_assert!(self.height_lock.is_locked());
    self.current_height.fetch_sub(1, Ordering::AcqRel) as usize - 1
  }

  #[inline]
  pub(super) fn level_lock(&self, level: usize) -> &VersionLock {
    &self.tower[level].lock
  }

  #[inline]
  pub(super) fn next<'g>(&self, level: usize, guard: &'g Guard) -> Shared<'g, Node> {
    self.tower[level].next.load(Ordering::Acquire, guard)
  }

  /// The caller must hold the lock of `level`, or own the node exclusively.
  #[inline]
  pub(super) fn set_next(&self, level: usize, next: Shared<'_, Node>) {
    self.tower[level].next.store(next, Ordering::Release);
  }

  #[cfg(test)]
  pub(super) fn tower_height(&self) -> usize {
    self.tower.len()
  }
}

/// ## Safety
///
/// - `ptr` must not be null.
/// - `ptr` must have been loaded from the list while `guard` (its lifetime
///   `'g`) has been pinned.
#[inline]
pub(super) unsafe fn as_node<'g>(ptr: Shared<'g, Node>) -> &'g Node {
  debug_assert!(!ptr.is_null(), "dereferenced a null node");
  ptr.deref()
}
