// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport state, its change notifications, and batching.

use alloc::boxed::Box;
use core::fmt;

use kurbo::{Point, Rect, Size};

use crate::config::{ConfigError, DEFAULT_LOOK_AHEAD};

/// The viewport moved or was resized.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewportChanged {
    /// Top-left corner of the visible region, in content coordinates.
    pub offset: Point,
    /// Size of the visible region.
    pub size: Size,
}

impl ViewportChanged {
    /// The visible region.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.offset, self.size)
    }
}

/// The content extent changed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContentBoundsChanged {
    /// Tight bounds of the content, `(min_x, min_y, max_x, max_y)`.
    pub bounds: Rect,
}

type OnChange = Box<dyn FnMut(&ViewportChanged)>;

/// The viewport of a virtualized view: offset, size, and look-ahead margin.
///
/// Setters notify the `on_change` callback when the viewport actually
/// changes. [`ViewportState::batch`] (or the explicit
/// [`begin_batch`](ViewportState::begin_batch) /
/// [`end_batch`](ViewportState::end_batch) pair) folds several updates into
/// one notification; batches nest.
///
/// When content bounds are known the offset is clamped so the viewport stays
/// inside them: each coordinate lies in `[min, max(min, max_bound - extent)]`.
///
/// ```rust
/// use core::cell::Cell;
/// use std::rc::Rc;
///
/// use kurbo::{Point, Size};
/// use understory_viewport_virtualizer::ViewportState;
///
/// let calls = Rc::new(Cell::new(0));
/// let seen = calls.clone();
/// let mut vp = ViewportState::new(200.0).unwrap();
/// vp.set_on_change(move |_| seen.set(seen.get() + 1));
///
/// vp.batch(|vp| {
///     vp.set_size(Size::new(800.0, 600.0)).unwrap();
///     vp.set_offset(Point::new(100.0, 50.0)).unwrap();
/// });
/// assert_eq!(calls.get(), 1);
/// assert_eq!(vp.expanded_rect().origin(), Point::new(-100.0, -150.0));
/// ```
pub struct ViewportState {
    offset: Point,
    size: Size,
    look_ahead: f64,
    content: Option<Rect>,
    depth: usize,
    pending: bool,
    on_change: Option<OnChange>,
}

impl fmt::Debug for ViewportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewportState")
            .field("offset", &self.offset)
            .field("size", &self.size)
            .field("look_ahead", &self.look_ahead)
            .field("content", &self.content)
            .field("depth", &self.depth)
            .field("pending", &self.pending)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            offset: Point::ZERO,
            size: Size::ZERO,
            look_ahead: DEFAULT_LOOK_AHEAD,
            content: None,
            depth: 0,
            pending: false,
            on_change: None,
        }
    }
}

impl ViewportState {
    /// Creates a zero-sized viewport at the origin.
    pub fn new(look_ahead: f64) -> Result<Self, ConfigError> {
        if !(look_ahead.is_finite() && look_ahead >= 0.0) {
            return Err(ConfigError::LookAhead(look_ahead));
        }
        Ok(Self {
            look_ahead,
            ..Self::default()
        })
    }

    /// Sets the callback invoked with every (batched) change.
    pub fn set_on_change(&mut self, f: impl FnMut(&ViewportChanged) + 'static) {
        self.on_change = Some(Box::new(f));
    }

    /// Removes the change callback.
    pub fn clear_on_change(&mut self) {
        self.on_change = None;
    }

    /// Top-left corner of the visible region.
    #[must_use]
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Size of the visible region.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Look-ahead margin.
    #[must_use]
    pub fn look_ahead(&self) -> f64 {
        self.look_ahead
    }

    /// Content bounds used for clamping, if known.
    #[must_use]
    pub fn content_bounds(&self) -> Option<Rect> {
        self.content
    }

    /// The visible region.
    #[must_use]
    pub fn visible_rect(&self) -> Rect {
        Rect::from_origin_size(self.offset, self.size)
    }

    /// The query rectangle: the visible region grown by the look-ahead on
    /// every side.
    #[must_use]
    pub fn expanded_rect(&self) -> Rect {
        self.visible_rect().inflate(self.look_ahead, self.look_ahead)
    }

    /// The current state as an event.
    #[must_use]
    pub fn snapshot(&self) -> ViewportChanged {
        ViewportChanged {
            offset: self.offset,
            size: self.size,
        }
    }

    /// Moves the viewport. The offset is clamped to the content bounds.
    pub fn set_offset(&mut self, offset: Point) -> Result<(), ConfigError> {
        if !(offset.x.is_finite() && offset.y.is_finite()) {
            return Err(ConfigError::Offset {
                x: offset.x,
                y: offset.y,
            });
        }
        let before = self.offset;
        self.offset = offset;
        self.clamp();
        if self.offset != before {
            self.notify();
        }
        Ok(())
    }

    /// Resizes the viewport. Zero is legal.
    pub fn set_size(&mut self, size: Size) -> Result<(), ConfigError> {
        if !(size.width.is_finite()
            && size.height.is_finite()
            && size.width >= 0.0
            && size.height >= 0.0)
        {
            return Err(ConfigError::Size {
                width: size.width,
                height: size.height,
            });
        }
        let before = (self.offset, self.size);
        self.size = size;
        self.clamp();
        if (self.offset, self.size) != before {
            self.notify();
        }
        Ok(())
    }

    /// Applies a [`ViewportChanged`] event as one batched update.
    pub fn apply(&mut self, event: ViewportChanged) -> Result<(), ConfigError> {
        self.batch(|vp| {
            vp.set_size(event.size)?;
            vp.set_offset(event.offset)
        })
    }

    /// Records new content bounds and re-clamps the offset.
    ///
    /// Bounds with a non-finite coordinate or with `x0 > x1` or `y0 > y1` are
    /// rejected and leave the state unchanged.
    pub fn set_content_bounds(&mut self, bounds: Rect) -> Result<(), ConfigError> {
        let finite = [bounds.x0, bounds.y0, bounds.x1, bounds.y1]
            .iter()
            .all(|v| v.is_finite());
        if !finite || bounds.x0 > bounds.x1 || bounds.y0 > bounds.y1 {
            return Err(ConfigError::ContentBounds(bounds));
        }
        if self.content == Some(bounds) {
            return Ok(());
        }
        self.content = Some(bounds);
        let before = self.offset;
        self.clamp();
        if self.offset != before {
            self.notify();
        }
        Ok(())
    }

    /// Applies a [`ContentBoundsChanged`] event.
    pub fn apply_content_bounds(
        &mut self,
        event: ContentBoundsChanged,
    ) -> Result<(), ConfigError> {
        self.set_content_bounds(event.bounds)
    }

    fn clamp(&mut self) {
        let Some(c) = self.content else {
            return;
        };
        let max_x = (c.x1 - self.size.width).max(c.x0);
        let max_y = (c.y1 - self.size.height).max(c.y0);
        self.offset = Point::new(
            self.offset.x.clamp(c.x0, max_x),
            self.offset.y.clamp(c.y0, max_y),
        );
    }

    /// Opens a batch. Notifications are deferred until the matching
    /// [`end_batch`](ViewportState::end_batch).
    pub fn begin_batch(&mut self) {
        self.depth = self.depth.saturating_add(1);
    }

    /// Closes a batch. Closing the outermost batch delivers one notification
    /// if anything changed inside it.
    pub fn end_batch(&mut self) {
        debug_assert!(self.depth > 0, "end_batch without begin_batch");
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 && core::mem::take(&mut self.pending) {
            self.notify_now();
        }
    }

    /// Runs `f` inside a batch.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_batch();
        let result = f(self);
        self.end_batch();
        result
    }

    /// Returns `true` while a batch is open.
    #[must_use]
    pub fn is_batching(&self) -> bool {
        self.depth > 0
    }

    fn notify(&mut self) {
        if self.depth > 0 {
            self.pending = true;
            return;
        }
        self.notify_now();
    }

    fn notify_now(&mut self) {
        let event = self.snapshot();
        if let Some(cb) = self.on_change.as_mut() {
            cb(&event);
        }
    }
}
