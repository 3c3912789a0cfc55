// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delta bands: the part of a new query rectangle not covered by the old one.

use kurbo::{Point, Rect};
use smallvec::SmallVec;

/// Up to four rectangles; the common scroll produces one or two.
pub type Bands = SmallVec<[Rect; 4]>;

/// Returns `true` if the closed rectangles share at least one point.
#[must_use]
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Returns `true` if `p` lies in the closed rectangle.
#[must_use]
pub fn contains(rect: Rect, p: Point) -> bool {
    rect.x0 <= p.x && p.x <= rect.x1 && rect.y0 <= p.y && p.y <= rect.y1
}

/// Covers `new \ old` with at most four rectangles.
///
/// The top and bottom bands span the full width of `new`; the left and right
/// bands span only the rows shared with `old`. Together they cover exactly the
/// points of `new` outside `old`, plus the shared edges (which are harmless to
/// query twice). This holds for any relative placement, including growth on
/// all sides, shrinking, and diagonal moves. Bands of zero width or height are
/// omitted. Non-overlapping inputs yield `new` itself.
#[must_use]
pub fn difference(new: Rect, old: Rect) -> Bands {
    let mut bands = Bands::new();
    if !overlaps(new, old) {
        bands.push(new);
        return bands;
    }
    let inner = new.intersect(old);
    if inner.y0 > new.y0 {
        bands.push(Rect::new(new.x0, new.y0, new.x1, inner.y0));
    }
    if inner.y1 < new.y1 {
        bands.push(Rect::new(new.x0, inner.y1, new.x1, new.y1));
    }
    if inner.x0 > new.x0 {
        bands.push(Rect::new(new.x0, inner.y0, inner.x0, inner.y1));
    }
    if inner.x1 < new.x1 {
        bands.push(Rect::new(inner.x1, inner.y0, new.x1, inner.y1));
    }
    bands.retain(|b| b.width() > 0.0 && b.height() > 0.0);
    bands
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect};

    use super::{contains, difference, overlaps};

    #[test]
    fn horizontal_scroll_yields_one_band() {
        let old = Rect::new(0.0, 0.0, 100.0, 100.0);
        let new = Rect::new(30.0, 0.0, 130.0, 100.0);
        assert_eq!(
            difference(new, old).as_slice(),
            [Rect::new(100.0, 0.0, 130.0, 100.0)]
        );
    }

    #[test]
    fn diagonal_scroll_yields_two_bands_without_gap() {
        let old = Rect::new(0.0, 0.0, 100.0, 100.0);
        let new = Rect::new(20.0, 30.0, 120.0, 130.0);
        let bands = difference(new, old);
        assert_eq!(
            bands.as_slice(),
            [
                Rect::new(20.0, 100.0, 120.0, 130.0),
                Rect::new(100.0, 30.0, 120.0, 100.0),
            ]
        );
        // The corner (110, 110) is covered.
        assert!(bands.iter().any(|b| contains(*b, Point::new(110.0, 110.0))));
    }

    #[test]
    fn zoom_out_yields_a_frame() {
        let old = Rect::new(40.0, 40.0, 60.0, 60.0);
        let new = Rect::new(0.0, 0.0, 100.0, 100.0);
        let bands = difference(new, old);
        assert_eq!(bands.len(), 4);
        let area: f64 = bands.iter().map(|b| b.area()).sum();
        assert_eq!(area, new.area() - old.area());
    }

    #[test]
    fn zoom_in_yields_nothing() {
        let old = Rect::new(0.0, 0.0, 100.0, 100.0);
        let new = Rect::new(10.0, 10.0, 90.0, 90.0);
        assert!(difference(new, old).is_empty());
    }

    #[test]
    fn disjoint_yields_new() {
        let old = Rect::new(0.0, 0.0, 10.0, 10.0);
        let new = Rect::new(20.0, 0.0, 30.0, 10.0);
        assert!(!overlaps(new, old));
        assert_eq!(difference(new, old).as_slice(), [new]);
        // Touching edges overlap under closed intervals.
        assert!(overlaps(Rect::new(10.0, 0.0, 20.0, 10.0), old));
    }
}
