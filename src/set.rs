use core::fmt;

use crossbeam_epoch::{self as epoch, Atomic, Guard, Shared};

use super::{sync::Ordering, Error, Options, MAX_HEIGHT};

mod node;
use node::{as_node, Node, NodeKey};

mod traverse;
use traverse::{Splices, Status};

mod contains;
mod insert;
mod remove;


/// A concurrent ordered set of `i64` keys backed by a skiplist.
///
/// Every level of every node carries its own [`VersionLock`](crate::VersionLock),
/// and each node has one more for its height. Insertions and removals
/// validate what they read against those versions and lock only the few
/// levels they splice, so writers on different keys never contend on a
/// shared lock. [`contains`](SkipSet::contains) takes no lock at all.
///
/// A key is a member of the set when its node has a non-zero target height.
/// Linking and unlinking the node at each level happens afterwards, level by
/// level, and may be finished by whichever thread touches the node next.
///
/// Unlinked nodes are reclaimed through `crossbeam-epoch` once no thread can
/// still be looking at them.
///
/// ## Example
///
/// ```
/// use std::{sync::Arc, thread};
/// use vskl::SkipSet;
///
/// let set = Arc::new(SkipSet::new());
/// let handles: Vec<_> = (0..4)
///   .map(|t| {
///     let set = set.clone();
///     thread::spawn(move || {
///       for k in (t * 100)..(t * 100 + 100) {
///         assert!(set.insert(k));
///       }
///     })
///   })
///   .collect();
/// for h in handles {
///   h.join().unwrap();
/// }
///
/// assert_eq!(set.size(), 400);
/// assert!(set.contains(399));
/// ```
pub struct SkipSet {
  head: Atomic<Node>,
  max_height: usize,
}

impl Default for SkipSet {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl SkipSet {
  /// Creates an empty set with the default [`Options`].
  #[inline]
  pub fn new() -> Self {
    Self::new_in(Options::new().max_height())
  }

  /// Creates an empty set with the given options.
  ///
  /// ## Example
  ///
  /// ```
  /// use vskl::{Options, SkipSet};
  ///
  /// let set = SkipSet::with_options(Options::new().with_max_height(8)).unwrap();
  /// assert_eq!(set.height(), 8);
  ///
  /// assert!(SkipSet::with_options(Options::new().with_max_height(0)).is_err());
  /// ```
  pub fn with_options(opts: Options) -> Result<Self, Error> {
    opts.validate()?;
    Ok(Self::new_in(opts.max_height()))
  }

  fn new_in(max_height: usize) -> Self {
    debug_assert!(max_height >= 1 && max_height <= MAX_HEIGHT);
    // Safety: the set is not shared yet.
    let guard = unsafe { epoch::unprotected() };
    let tail = Node::sentinel(NodeKey::Tail, Shared::null(), max_height).into_shared(guard);
    let head = Node::sentinel(NodeKey::Head, tail, max_height);

    Self {
      head: Atomic::from(head),
      max_height,
    }
  }

  /// Returns the number of levels of the skiplist.
  #[inline]
  pub fn height(&self) -> usize {
    self.max_height
  }

  /// Returns the number of keys in the set.
  ///
  /// This walks the whole bottom level. Under concurrent updates the count is
  /// not a snapshot: keys inserted or removed during the walk may or may not
  /// be counted.
  pub fn size(&self) -> usize {
    let guard = &epoch::pin();
    let mut count = 0;
    // Safety: every node on the bottom level is reachable under `guard`, and
    // the walk stops at the tail.
    unsafe {
      let mut curr = as_node(self.head(guard)).next(0, guard);
      loop {
        let node = as_node(curr);
        if node.key == NodeKey::Tail {
          break;
        }
        if node.is_present() {
          count += 1;
        }
        curr = node.next(0, guard);
      }
    }
    count
  }

  /// Returns `true` if the set holds no key.
  ///
  /// Advisory under concurrent updates, like [`size`](SkipSet::size).
  pub fn is_empty(&self) -> bool {
    let guard = &epoch::pin();
    // Safety: see `size`.
    unsafe {
      let mut curr = as_node(self.head(guard)).next(0, guard);
      loop {
        let node = as_node(curr);
        match node.key {
          NodeKey::Tail => return true,
          _ if node.is_present() => return false,
          _ => curr = node.next(0, guard),
        }
      }
    }
  }

  #[inline]
  fn head<'g>(&self, guard: &'g Guard) -> Shared<'g, Node> {
    self.head.load(Ordering::Acquire, guard)
  }

  #[inline]
  fn top_level(&self) -> usize {
    self.max_height - 1
  }
}

impl Drop for SkipSet {
  fn drop(&mut self) {
    // Safety: we own the set exclusively, so no operation is in flight. Every
    // node still linked at any level is linked on the bottom one, and nodes
    // unlinked from the bottom level have been handed to the epoch collector.
    unsafe {
      let guard = epoch::unprotected();
      let mut curr = self.head.load(Ordering::Relaxed, guard);
      while !curr.is_null() {
        let next = curr.deref().next(0, guard);
        drop(curr.into_owned());
        curr = next;
      }
    }
  }
}

impl fmt::Debug for SkipSet {
  /// Lists every node on the bottom level with its current and target
  /// heights, including logically removed nodes that are still linked.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    struct Entry {
      key: i64,
      current: usize,
      target: usize,
    }

    impl fmt::Debug for Entry {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
          f,
          "{}(curr {}, target {})",
          self.key, self.current, self.target
        )
      }
    }

    let guard = &epoch::pin();
    let mut list = f.debug_list();
    // Safety: see `size`.
    unsafe {
      let mut curr = as_node(self.head(guard)).next(0, guard);
      loop {
        let node = as_node(curr);
        let key = match node.key {
          NodeKey::Key(key) => key,
          _ => break,
        };
        list.entry(&Entry {
          key,
          current: node.current_height(),
          target: node.target_height(),
        });
        curr = node.next(0, guard);
      }
    }
    list.finish()
  }
}
