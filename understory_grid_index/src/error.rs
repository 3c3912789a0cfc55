// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for configuration, insertion, and cursor traversal.

use core::fmt;

use crate::types::Axis;

/// Error returned when a [`GridConfig`](crate::GridConfig) is rejected.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// An initial bucket count was zero.
    ZeroBuckets {
        /// The offending axis.
        axis: Axis,
    },
    /// A maximum bucket count was smaller than the initial count.
    MaxBelowInitial {
        /// The offending axis.
        axis: Axis,
        /// Configured initial count.
        initial: usize,
        /// Configured maximum count.
        max: usize,
    },
    /// The range growth factor was below `1.0` or not finite.
    GrowthFactor(f64),
    /// The initial extent was not finite and strictly positive.
    Extent {
        /// The offending axis.
        axis: Axis,
        /// The rejected extent.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ZeroBuckets { axis } => {
                write!(f, "initial bucket count on {axis:?} must be at least 1")
            }
            Self::MaxBelowInitial { axis, initial, max } => write!(
                f,
                "maximum bucket count {max} on {axis:?} is below the initial count {initial}"
            ),
            Self::GrowthFactor(factor) => {
                write!(f, "range growth factor {factor} must be finite and >= 1.0")
            }
            Self::Extent { axis, value } => write!(
                f,
                "initial extent {value} on {axis:?} must be finite and positive"
            ),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Error returned when an item cannot be placed in the index.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InsertError {
    /// A coordinate was negative, NaN, or infinite.
    OutOfDomain {
        /// Rejected x coordinate.
        x: f64,
        /// Rejected y coordinate.
        y: f64,
    },
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::OutOfDomain { x, y } => write!(
                f,
                "position ({x}, {y}) is outside the index domain (coordinates must be finite and non-negative)"
            ),
        }
    }
}

impl core::error::Error for InsertError {}

/// Error returned by [`Cursor`](crate::Cursor) operations.
///
/// Exhaustion is not an error: [`Cursor::advance`](crate::Cursor::advance)
/// reports it as `Ok(None)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CursorError {
    /// The index was structurally modified after the cursor was created.
    ConcurrentModification {
        /// Modification count captured by the cursor.
        expected: u64,
        /// Modification count observed at advancement.
        found: u64,
    },
    /// [`Cursor::remove`](crate::Cursor::remove) was called without a preceding
    /// successful advancement.
    InvalidState,
    /// The cursor was handed a grid other than the one that created it.
    ForeignIndex,
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ConcurrentModification { expected, found } => write!(
                f,
                "index modified during traversal (expected modification count {expected}, found {found})"
            ),
            Self::InvalidState => {
                f.write_str("no current element to remove; advance the cursor first")
            }
            Self::ForeignIndex => f.write_str("cursor used with a grid that did not create it"),
        }
    }
}

impl core::error::Error for CursorError {}
