use super::{Error, MAX_HEIGHT};

/// Options for [`SkipSet`](crate::SkipSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Options {
  max_height: usize,
}

impl Default for Options {
  #[inline]
  fn default() -> Options {
    Options::new()
  }
}

impl Options {
  /// Creates a new set of options with the default values.
  #[inline]
  pub const fn new() -> Self {
    Self {
      max_height: MAX_HEIGHT,
    }
  }

  /// Sets the maximum number of levels of the skiplist.
  ///
  /// Every node carries a tower of this many levels, so a smaller height
  /// trades search speed on large sets for a smaller memory footprint.
  ///
  /// The default maximum height is [`MAX_HEIGHT`](crate::MAX_HEIGHT).
  ///
  /// ## Example
  ///
  /// ```
  /// use vskl::Options;
  ///
  /// let options = Options::new().with_max_height(12);
  /// assert_eq!(options.max_height(), 12);
  /// ```
  #[inline]
  pub const fn with_max_height(mut self, height: usize) -> Self {
    self.max_height = height;
    self
  }

  /// Returns the maximum number of levels of the skiplist.
  #[inline]
  pub const fn max_height(&self) -> usize {
    self.max_height
  }

  #[inline]
  pub(crate) const fn validate(&self) -> Result<(), Error> {
    if self.max_height == 0 || self.max_height > MAX_HEIGHT {
      return Err(Error::InvalidHeight {
        height: self.max_height,
        max: MAX_HEIGHT,
      });
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_validate() {
    assert!(Options::new().validate().is_ok());
    assert!(Options::new().with_max_height(1).validate().is_ok());
    assert_eq!(
      Options::new().with_max_height(0).validate(),
      Err(Error::InvalidHeight {
        height: 0,
        max: MAX_HEIGHT
      })
    );
    assert!(Options::new()
      .with_max_height(MAX_HEIGHT + 1)
      .validate()
      .is_err());
  }
}
