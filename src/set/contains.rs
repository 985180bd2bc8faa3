use super::*;

impl SkipSet {
  /// Returns `true` if `key` is in the set.
  ///
  /// Never locks and never retries. A node that is still linked but has been
  /// logically removed is reported as absent.
  ///
  /// ## Example
  ///
  /// ```
  /// use vskl::SkipSet;
  ///
  /// let set = SkipSet::new();
  /// assert!(!set.contains(7));
  /// set.insert(7);
  /// assert!(set.contains(7));
  /// ```
  pub fn contains(&self, key: i64) -> bool {
    let guard = &epoch::pin();
    let search_key = NodeKey::Key(key);

    let mut prev = self.head(guard);
    for level in (0..self.max_height).rev() {
      // Safety: `prev` is the head or was reached on a level at or above this
      // one, so its next pointer here is published. The tail stops the walk.
      unsafe {
        let mut curr = as_node(prev).next(level, guard);
        loop {
          let curr_node = as_node(curr);
          if curr_node.key >= search_key {
            if curr_node.key == search_key {
              return curr_node.is_present();
            }
            break;
          }
          prev = curr;
          curr = curr_node.next(level, guard);
        }
      }
    }

    false
  }
}
