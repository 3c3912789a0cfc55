// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid sizing configuration.

use kurbo::Size;

use crate::error::ConfigError;
use crate::types::Axis;

/// Default number of buckets on each axis for a fresh index.
pub const DEFAULT_INITIAL_BUCKETS: usize = 5;

/// Default ceiling on the number of buckets per axis.
pub const DEFAULT_MAX_BUCKETS: usize = 50;

/// Default ceiling on how much a single resize may stretch the bucket range.
pub const DEFAULT_MAX_RANGE_GROWTH: f64 = 1.5;

/// Default extent covered by a fresh index.
pub const DEFAULT_INITIAL_EXTENT: Size = Size::new(1000.0, 1000.0);

/// Sizing parameters for a [`GridIndex`](crate::GridIndex).
///
/// Rows subdivide the x axis and columns subdivide the y axis. When an item
/// lands beyond the current extent the index grows each axis independently,
/// either by stretching the bucket range (cell size) or by adding buckets; see
/// [`GridIndex::ensure_capacity`](crate::GridIndex::ensure_capacity).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridConfig {
    /// Initial bucket count along x. Default: 5.
    pub initial_rows: usize,
    /// Initial bucket count along y. Default: 5.
    pub initial_cols: usize,
    /// Maximum bucket count along x. Default: 50.
    pub max_rows: usize,
    /// Maximum bucket count along y. Default: 50.
    pub max_cols: usize,
    /// Largest factor by which a resize may stretch the bucket range before
    /// buckets are added instead. Must be `>= 1.0`. Default: 1.5.
    pub max_range_growth: f64,
    /// Extent covered before any growth. Default: 1000 x 1000.
    pub initial_extent: Size,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            initial_rows: DEFAULT_INITIAL_BUCKETS,
            initial_cols: DEFAULT_INITIAL_BUCKETS,
            max_rows: DEFAULT_MAX_BUCKETS,
            max_cols: DEFAULT_MAX_BUCKETS,
            max_range_growth: DEFAULT_MAX_RANGE_GROWTH,
            initial_extent: DEFAULT_INITIAL_EXTENT,
        }
    }
}

impl GridConfig {
    /// Returns a copy with the given initial bucket counts.
    #[must_use]
    pub const fn with_initial_buckets(mut self, rows: usize, cols: usize) -> Self {
        self.initial_rows = rows;
        self.initial_cols = cols;
        self
    }

    /// Returns a copy with the given maximum bucket counts.
    #[must_use]
    pub const fn with_max_buckets(mut self, rows: usize, cols: usize) -> Self {
        self.max_rows = rows;
        self.max_cols = cols;
        self
    }

    /// Returns a copy with the given range growth ceiling.
    #[must_use]
    pub const fn with_max_range_growth(mut self, factor: f64) -> Self {
        self.max_range_growth = factor;
        self
    }

    /// Returns a copy with the given initial extent.
    #[must_use]
    pub const fn with_initial_extent(mut self, extent: Size) -> Self {
        self.initial_extent = extent;
        self
    }

    /// Checks every parameter, returning the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, initial, max, extent) in [
            (
                Axis::X,
                self.initial_rows,
                self.max_rows,
                self.initial_extent.width,
            ),
            (
                Axis::Y,
                self.initial_cols,
                self.max_cols,
                self.initial_extent.height,
            ),
        ] {
            if initial < 1 {
                return Err(ConfigError::ZeroBuckets { axis });
            }
            if max < initial {
                return Err(ConfigError::MaxBelowInitial { axis, initial, max });
            }
            if !extent.is_finite() || extent <= 0.0 {
                return Err(ConfigError::Extent {
                    axis,
                    value: extent,
                });
            }
        }
        if !self.max_range_growth.is_finite() || self.max_range_growth < 1.0 {
            return Err(ConfigError::GrowthFactor(self.max_range_growth));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::GridConfig;
    use crate::error::ConfigError;
    use crate::types::Axis;

    #[test]
    fn defaults_are_valid() {
        let config = GridConfig::default();
        assert_eq!(config.initial_rows, 5);
        assert_eq!(config.max_cols, 50);
        assert_eq!(config.max_range_growth, 1.5);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn growth_factor_of_exactly_one_is_legal() {
        let config = GridConfig::default().with_max_range_growth(1.0);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_parameters() {
        assert_eq!(
            GridConfig::default().with_initial_buckets(0, 5).validate(),
            Err(ConfigError::ZeroBuckets { axis: Axis::X })
        );
        assert_eq!(
            GridConfig::default().with_max_buckets(50, 3).validate(),
            Err(ConfigError::MaxBelowInitial {
                axis: Axis::Y,
                initial: 5,
                max: 3
            })
        );
        assert_eq!(
            GridConfig::default().with_max_range_growth(0.9).validate(),
            Err(ConfigError::GrowthFactor(0.9))
        );
        assert!(matches!(
            GridConfig::default()
                .with_initial_extent(Size::new(0.0, 10.0))
                .validate(),
            Err(ConfigError::Extent { axis: Axis::X, .. })
        ));
        assert!(matches!(
            GridConfig::default()
                .with_max_range_growth(f64::NAN)
                .validate(),
            Err(ConfigError::GrowthFactor(_))
        ));
    }
}
