use super::*;

impl SkipSet {
  /// Removes `key` from the set.
  ///
  /// Returns `true` if the key was present and has been removed, `false` if
  /// it was absent.
  ///
  /// ## Example
  ///
  /// ```
  /// use vskl::SkipSet;
  ///
  /// let set = SkipSet::new();
  /// set.insert(3);
  /// assert!(set.remove(3));
  /// assert!(!set.remove(3));
  /// assert!(!set.contains(3));
  /// ```
  pub fn remove(&self, key: i64) -> bool {
    let guard = &epoch::pin();
    let search_key = NodeKey::Key(key);

    let mut spl = Splices::new();
    self.find_splice(search_key, self.top_level(), 0, &mut spl, guard);

    let node = spl.currs[0];
    // Safety: loaded by `find_splice` under `guard`.
    let node_ref = unsafe { as_node(node) };
    if node_ref.key != search_key {
      return false;
    }

    // Logical removal.
    let mut height_version = loop {
      let version = node_ref.height_lock.read();
      if !node_ref.is_present() {
        return false;
      }

      if node_ref.height_lock.try_lock(version) {
        node_ref.set_target_height(0);
        node_ref.height_lock.unlock();
        break version.wrapping_add(2);
      }
    };

    // Physical removal, top-down. A revival raises the target height again,
    // which ends the loop.
    let mut level = node_ref.current_height();
    while level > node_ref.target_height() {
      // Safety: the predecessor was loaded by `find_splice` under `guard`.
      let prev = unsafe { as_node(spl.prevs[level - 1]) };
      match Self::try_remove_at_level(prev, node, level - 1, &mut height_version, guard) {
        Status::Ok => level -= 1,
        Status::Abort => {
          #[cfg(feature = "tracing")]
          tracing::trace!(key, level = level - 1, "stale splice while unlinking, searching level again");
          self.find_splice(search_key, level - 1, level - 1, &mut spl, guard);
        }
        Status::Terminate => {
          #[cfg(feature = "tracing")]
          tracing::trace!(key, level = level - 1, "node height changed while unlinking, stopping");
          break;
        }
      }
    }

    true
  }

  /// Splices `node` out from behind `prev` at `level`. Once the node is gone
  /// from every level it is handed to the epoch collector.
  fn try_remove_at_level(
    prev: &Node,
    node: Shared<'_, Node>,
    level: usize,
    height_version: &mut u32,
    guard: &Guard,
  ) -> Status {
    // Safety: the caller loaded `node` under `guard`.
    let node_ref = unsafe { as_node(node) };
    let status = Self::try_lock_level_and_height(prev, node, node_ref, level, height_version, guard);
    if status != Status::Ok {
      return status;
    }

    // Inserts behind `node` at this level hold its level lock, wait for them so
    // that the successor we splice in is final.
    node_ref.level_lock(level).lock();
    let remaining = node_ref.shrink();
    prev.set_next(level, node_ref.next(level, guard));

    node_ref.level_lock(level).unlock();
    node_ref.height_lock.unlock();
    prev.level_lock(level).unlock();
    *height_version = height_version.wrapping_add(1);

    if remaining == 0 {
      #[cfg(feature = "tracing")]
      tracing::debug!(key = ?node_ref.key, "node unlinked from every level, deferring reclamation");

      // Safety: the node is unreachable from every level, and it can no longer
      // be revived because its current height is zero. Threads that still
      // hold it are pinned, so it outlives them.
      unsafe { guard.defer_destroy(node) };
    }

    Status::Ok
  }
}
