// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Virtualizer configuration and its validation errors.

use core::fmt;

use kurbo::Rect;

/// Default margin added around the viewport on every side when querying.
pub const DEFAULT_LOOK_AHEAD: f64 = 200.0;

/// Configuration for a [`ViewportVirtualizer`](crate::ViewportVirtualizer).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VirtualizerConfig {
    /// Margin added around the viewport on every side, in content units.
    ///
    /// Items within this distance of the visible region are materialized
    /// ahead of time so small scrolls do not expose empty space.
    pub look_ahead: f64,
}

impl Default for VirtualizerConfig {
    fn default() -> Self {
        Self {
            look_ahead: DEFAULT_LOOK_AHEAD,
        }
    }
}

impl VirtualizerConfig {
    /// Sets the look-ahead margin.
    #[must_use]
    pub const fn with_look_ahead(mut self, look_ahead: f64) -> Self {
        self.look_ahead = look_ahead;
        self
    }

    /// Checks the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.look_ahead.is_finite() && self.look_ahead >= 0.0) {
            return Err(ConfigError::LookAhead(self.look_ahead));
        }
        Ok(())
    }
}

/// Error returned for rejected virtualizer or viewport parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The look-ahead margin was negative or not finite.
    LookAhead(f64),
    /// A viewport offset coordinate was not finite.
    Offset {
        /// Rejected x.
        x: f64,
        /// Rejected y.
        y: f64,
    },
    /// A viewport dimension was negative or not finite.
    Size {
        /// Rejected width.
        width: f64,
        /// Rejected height.
        height: f64,
    },
    /// Content bounds had a non-finite coordinate or a minimum above the
    /// matching maximum.
    ContentBounds(Rect),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::LookAhead(v) => write!(f, "look-ahead {v} must be finite and >= 0"),
            Self::Offset { x, y } => write!(f, "viewport offset ({x}, {y}) must be finite"),
            Self::Size { width, height } => write!(
                f,
                "viewport size {width}x{height} must be finite and non-negative"
            ),
            Self::ContentBounds(r) => write!(
                f,
                "content bounds ({}, {}, {}, {}) must be finite and not inverted",
                r.x0, r.y0, r.x1, r.y1
            ),
        }
    }
}

impl core::error::Error for ConfigError {}
