use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Largest flock accepted from callers.
pub const MAX_COUNT: usize = 10_000;

/// Intrinsic geometry of one flock item plus the flock size.
/// Constant for the lifetime of the page.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    /// Intrinsic item width (px).
    pub width: f64,
    /// Intrinsic item height (px).
    pub height: f64,
    /// Number of items in the flock.
    pub count: usize,
    /// Fraction of the item size reserved as spacing on each side.
    pub margin: f64,
}

impl Default for ItemSpec {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 30.0,
            count: 30,
            margin: 0.1,
        }
    }
}

impl ItemSpec {
    pub fn new(width: f64, height: f64, count: usize, margin: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(LayoutError::InvalidItemSize { width, height });
        }
        if count == 0 {
            return Err(LayoutError::EmptyFlock);
        }
        if count > MAX_COUNT {
            return Err(LayoutError::TooManyItems {
                count,
                max: MAX_COUNT,
            });
        }
        if !(0.0..0.5).contains(&margin) {
            return Err(LayoutError::InvalidMargin(margin));
        }
        Ok(Self {
            width,
            height,
            count,
            margin,
        })
    }

    /// Default flock with any provided fields replaced, then validated.
    pub fn with_overrides(
        width: Option<f64>,
        height: Option<f64>,
        count: Option<usize>,
        margin: Option<f64>,
    ) -> Result<Self> {
        let defaults = Self::default();
        Self::new(
            width.unwrap_or(defaults.width),
            height.unwrap_or(defaults.height),
            count.unwrap_or(defaults.count),
            margin.unwrap_or(defaults.margin),
        )
    }

    /// Footprint of one item including margin on both sides: (w, h).
    #[inline]
    pub fn cell_space(&self) -> (f64, f64) {
        let k = 1.0 + 2.0 * self.margin;
        (self.width * k, self.height * k)
    }
}
