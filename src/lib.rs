#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, allow(unused_attributes))]
#![deny(missing_docs)]

mod error;
pub use error::Error;

mod options;
pub use options::Options;

mod version;
pub use version::VersionLock;

/// A concurrent ordered set of `i64` keys.
pub mod set;
pub use set::SkipSet;

/// The largest number of levels a [`SkipSet`] can be configured with.
pub const MAX_HEIGHT: usize = 32;

/// The probability that a node drawn at height `h` also reaches height `h + 1`.
pub const PROBABILITY: f64 = 0.5;

/// Precompute the level probabilities so that only a single random number
/// needs to be drawn per insertion.
const PROBABILITIES: [u32; MAX_HEIGHT] = {
  let mut probabilities = [0; MAX_HEIGHT];
  let mut p = 1f64;

  let mut i = 0;
  while i < MAX_HEIGHT {
    probabilities[i] = ((u32::MAX as f64) * p) as u32;
    p *= PROBABILITY;
    i += 1;
  }

  probabilities
};

/// Returns a height in `[1, max_height]` where height `h` is drawn with
/// probability proportional to `PROBABILITY^(h - 1)`.
#[inline]
fn random_height(max_height: usize) -> usize {
  use rand::Rng;

  let rnd: u32 = rand::rng().random();
  let mut h = 1;

  while h < max_height && rnd <= PROBABILITIES[h] {
    h += 1;
  }
  h
}

mod sync {
  #[cfg(not(loom))]
  pub(crate) use core::sync::atomic::*;

  #[cfg(loom)]
  pub(crate) use ::loom::sync::atomic::*;
}
