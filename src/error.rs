/// Error type for the [`SkipSet`](crate::SkipSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
  /// Indicates that the configured maximum height is zero or larger than
  /// [`MAX_HEIGHT`](crate::MAX_HEIGHT).
  InvalidHeight {
    /// The height that was requested.
    height: usize,
    /// The largest height that is supported.
    max: usize,
  },
}

impl core::fmt::Display for Error {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      Self::InvalidHeight { height, max } => {
        write!(f, "max height {height} is invalid, must be in range [1, {max}]")
      }
    }
  }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[test]
fn test_display() {
  let e = Error::InvalidHeight { height: 0, max: 32 };
  assert_eq!(e.to_string(), "max height 0 is invalid, must be in range [1, 32]");
}
