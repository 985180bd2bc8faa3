use super::*;
use crate::random_height;

/// Result of trying to bring a node with the searched key back to life.
#[derive(Debug)]
pub(super) enum Revive {
  /// The key is already logically present.
  Present,
  /// The node has been unlinked from every level and is about to be
  /// reclaimed, search again.
  Unlinked,
  /// The node is logically present again. Holds the height version after
  /// the update.
  Revived(u32),
}

impl SkipSet {
  /// Adds `key` to the set.
  ///
  /// Returns `true` if the key was absent and is now present, `false` if it
  /// was already present.
  ///
  /// ## Example
  ///
  /// ```
  /// use vskl::SkipSet;
  ///
  /// let set = SkipSet::new();
  /// assert!(set.insert(5));
  /// assert!(!set.insert(5));
  /// assert!(set.contains(5));
  /// ```
  pub fn insert(&self, key: i64) -> bool {
    let guard = &epoch::pin();
    let search_key = NodeKey::Key(key);
    let height = random_height(self.max_height);

    let mut spl = Splices::new();
    let mut new_node: Option<Shared<'_, Node>> = None;
    let mut from = self.top_level();

    // Logical insertion: either revive the node already holding the key, or
    // link a fresh node at the bottom level.
    let (node, mut height_version) = loop {
      self.find_splice(search_key, from, 0, &mut spl, guard);
      from = 0;

      let (prev, curr) = (spl.prevs[0], spl.currs[0]);
      // Safety: loaded by `find_splice` under `guard`.
      let (prev_node, curr_node) = unsafe { (as_node(prev), as_node(curr)) };

      if curr_node.key == search_key {
        match Self::revive(curr_node, height) {
          Revive::Present => {
            if let Some(node) = new_node {
              // Safety: the node has never been linked, so no other thread
              // can have seen it.
              drop(unsafe { node.into_owned() });
            }
            return false;
          }
          Revive::Unlinked => continue,
          Revive::Revived(version) => {
            #[cfg(feature = "tracing")]
            tracing::trace!(key, "revived logically removed node");

            if let Some(node) = new_node {
              // Safety: as above.
              drop(unsafe { node.into_owned() });
            }
            break (curr, version);
          }
        }
      }

      let node = *new_node
        .get_or_insert_with(|| Node::new(key, height, self.max_height).into_shared(guard));
      // Safety: allocated above and still owned by this call.
      let mut version = unsafe { as_node(node) }.height_lock.read();
      match Self::try_insert_at_level(prev_node, curr, node, 0, &mut version, guard) {
        Status::Ok => break (node, version),
        _status => {
          #[cfg(feature = "tracing")]
          tracing::trace!(key, status = ?_status, "bottom level link failed, retrying");
        }
      }
    };

    // Physical insertion of the remaining levels, bottom-up.
    // Safety: either linked by this call or found in the list under `guard`.
    let node_ref = unsafe { as_node(node) };
    let mut level = node_ref.current_height();
    while level < node_ref.target_height() {
      // Safety: the predecessor was loaded by `find_splice` under `guard`.
      let prev = unsafe { as_node(spl.prevs[level]) };
      match Self::try_insert_at_level(prev, spl.currs[level], node, level, &mut height_version, guard)
      {
        Status::Ok => level += 1,
        Status::Abort => {
          #[cfg(feature = "tracing")]
          tracing::trace!(key, level, "stale splice while linking, searching level again");
          self.find_splice(search_key, level, level, &mut spl, guard);
        }
        Status::Terminate => {
          #[cfg(feature = "tracing")]
          tracing::trace!(key, level, "node height changed while linking, stopping");
          break;
        }
      }
    }

    true
  }

  /// Makes a logically removed node present again with a target height of
  /// at least `height`.
  pub(super) fn revive(node: &Node, height: usize) -> Revive {
    loop {
      let version = node.height_lock.read();
      if node.is_present() {
        return Revive::Present;
      }

      if node.current_height() == 0 {
        return Revive::Unlinked;
      }

      if node.height_lock.try_lock(version) {
        // The current height cannot move while the height is locked. Never
        // aim lower than what is still linked.
        node.set_target_height(height.max(node.current_height()));
        node.height_lock.unlock();
        return Revive::Revived(version.wrapping_add(2));
      }
    }
  }

  /// Splices `node` in between `prev` and `curr` at `level`.
  fn try_insert_at_level(
    prev: &Node,
    curr: Shared<'_, Node>,
    node: Shared<'_, Node>,
    level: usize,
    height_version: &mut u32,
    guard: &Guard,
  ) -> Status {
    // Safety: the caller loaded `node` under `guard`.
    let node_ref = unsafe { as_node(node) };
    let status = Self::try_lock_level_and_height(prev, curr, node_ref, level, height_version, guard);
    if status != Status::Ok {
      return status;
    }

    node_ref.set_next(level, curr);
    node_ref.grow();
    prev.set_next(level, node);

    node_ref.height_lock.unlock();
    *height_version = height_version.wrapping_add(1);
    prev.level_lock(level).unlock();
    Status::Ok
  }
}
