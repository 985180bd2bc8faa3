use crossbeam_epoch::{Guard, Shared};

use super::{
  node::{as_node, Node, NodeKey},
  SkipSet, MAX_HEIGHT,
};

/// Outcome of an attempt to lock one level of the list for an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Status {
  /// The level is locked (or already updated), go on with the next level.
  Ok,
  /// The recorded predecessor no longer points at the recorded successor.
  /// Search this level again and retry.
  Abort,
  /// The height of the node changed under us: another thread finished the
  /// remaining work or logically flipped the node again. Stop.
  Terminate,
}

/// Predecessor and successor of a key at every level.
pub(super) struct Splices<'g> {
  pub(super) prevs: [Shared<'g, Node>; MAX_HEIGHT],
  pub(super) currs: [Shared<'g, Node>; MAX_HEIGHT],
}

impl Splices<'_> {
  #[inline]
  pub(super) fn new() -> Self {
    Self {
      prevs: [Shared::null(); MAX_HEIGHT],
      currs: [Shared::null(); MAX_HEIGHT],
    }
  }
}

impl SkipSet {
  /// Records, for every level in `to..=from`, the last node with a key
  /// smaller than `key` and the first node with a key not smaller than it.
  ///
  /// The search starts at the predecessor recorded for `from` by an earlier
  /// call, climbing up while that predecessor is no longer linked at the
  /// level. The top level always starts at the head. Nothing is locked, so
  /// the result must be validated before it is acted upon.
  pub(super) fn find_splice<'g>(
    &self,
    key: NodeKey,
    from: usize,
    to: usize,
    spl: &mut Splices<'g>,
    guard: &'g Guard,
  ) {
    let top = self.top_level();
    debug_assert!(to <= from && from <= top);

    spl.prevs[top] = self.head(guard);

    let mut from = from;
    let mut prev = spl.prevs[from];
    // Safety: every recorded predecessor was loaded under `guard`, and the
    // top one is the head.
    while unsafe { as_node(prev) }.current_height() <= from {
      from += 1;
      prev = spl.prevs[from];
    }

    for level in (to..=from).rev() {
      // Safety: `prev` is linked at `level` (or was when it was reached), so its
      // next pointer at `level` has been published, and the tail bounds the walk.
      unsafe {
        let mut curr = as_node(prev).next(level, guard);
        loop {
          let curr_node = as_node(curr);
          if curr_node.key >= key {
            break;
          }
          prev = curr;
          curr = curr_node.next(level, guard);
        }
        spl.prevs[level] = prev;
        spl.currs[level] = curr;
      }
    }
  }

  /// Checks that `prev` is still linked at `level` and still points at `curr`,
  /// returning the version of `prev`'s level lock that the check is valid for.
  #[inline]
  fn validate(prev: &Node, curr: Shared<'_, Node>, level: usize, guard: &Guard) -> Option<u32> {
    let version = prev.level_lock(level).read();
    if prev.current_height() <= level || prev.next(level, guard) != curr {
      return None;
    }
    Some(version)
  }

  /// Locks `prev` at `level` and the height of `node`, provided the splice
  /// `prev -> curr` still holds and the height of `node` is still at
  /// `height_version`. On success `height_version` becomes the locked version.
  pub(super) fn try_lock_level_and_height(
    prev: &Node,
    curr: Shared<'_, Node>,
    node: &Node,
    level: usize,
    height_version: &mut u32,
    guard: &Guard,
  ) -> Status {
    if node.height_lock.read() != *height_version {
      return Status::Terminate;
    }

    let level_version = match Self::validate(prev, curr, level, guard) {
      Some(version) => version,
      None => return Status::Abort,
    };

    if !prev.level_lock(level).try_lock(level_version) {
      return Status::Abort;
    }

    if !node.height_lock.try_lock(*height_version) {
      prev.level_lock(level).unlock();
      return Status::Terminate;
    }

    *height_version = height_version.wrapping_add(1);
    Status::Ok
  }
}
