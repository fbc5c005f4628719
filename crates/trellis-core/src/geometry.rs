//! Integer rectangles used for component bounds, hit testing and viewports.
//!
//! [`Rect`] is an axis-aligned box stored as its edges. Containment is
//! half-open: a rect contains `min <= p < max` on both axes, so a zero-size
//! rect contains no points and two rects that merely share an edge do not
//! intersect.

/// An axis-aligned integer rectangle.
///
/// The edges are normalized on construction so that `min_x <= max_x` and
/// `min_y <= max_y`. All operations are pure and return new values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl Rect {
    /// The empty rect at the origin.
    pub const ZERO: Rect = Rect {
        min_x: 0,
        min_y: 0,
        max_x: 0,
        max_y: 0,
    };

    /// Create a rect from its origin and size.
    ///
    /// Negative sizes are normalized so the rect spans the same area.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::from_edges(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    /// Create a rect from two opposite corners, in any order.
    pub fn from_edges(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Create a rect of the given size centered on `(cx, cy)`.
    pub fn from_center(cx: i32, cy: i32, width: i32, height: i32) -> Self {
        let (width, height) = (width.abs(), height.abs());
        Self::new(cx - width / 2, cy - height / 2, width, height)
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.min_x
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.min_y
    }

    #[inline]
    pub fn max_x(&self) -> i32 {
        self.max_x
    }

    #[inline]
    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    /// The origin (top-left corner in layout coordinates).
    #[inline]
    pub fn origin(&self) -> (i32, i32) {
        (self.min_x, self.min_y)
    }

    #[inline]
    pub fn size(&self) -> (i32, i32) {
        (self.width(), self.height())
    }

    /// The center point, rounded toward the origin.
    pub fn center(&self) -> (i32, i32) {
        (
            self.min_x + self.width() / 2,
            self.min_y + self.height() / 2,
        )
    }

    /// Area in square units.
    pub fn area(&self) -> i64 {
        i64::from(self.width()) * i64::from(self.height())
    }

    /// True when the rect has zero width or zero height.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min_x == self.max_x || self.min_y == self.max_y
    }

    /// Half-open point containment.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// True when the two rects share a region of positive area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    /// Translate this rect so it lies inside `bounds`.
    ///
    /// The size never changes. On an axis where this rect is larger than
    /// `bounds` it is centered on `bounds` instead.
    pub fn clamp(&self, bounds: &Rect) -> Rect {
        let (x, w) = clamp_axis(self.min_x, self.width(), bounds.min_x, bounds.max_x);
        let (y, h) = clamp_axis(self.min_y, self.height(), bounds.min_y, bounds.max_y);
        Rect::new(x, y, w, h)
    }

    /// Axis-wise overlap with `other`.
    ///
    /// When the rects are disjoint on an axis the result collapses to zero
    /// size on the edge of `other` nearest to this rect.
    pub fn clip(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.clamp(other.min_x, other.max_x),
            min_y: self.min_y.clamp(other.min_y, other.max_y),
            max_x: self.max_x.clamp(other.min_x, other.max_x),
            max_y: self.max_y.clamp(other.min_y, other.max_y),
        }
    }

    /// Alias of [`clip`](Self::clip).
    #[inline]
    pub fn intersect(&self, other: &Rect) -> Rect {
        self.clip(other)
    }

    /// The smallest rect containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Scale this rect's aspect ratio to the largest size that fits inside
    /// `target`, centered on it.
    ///
    /// An empty rect has no aspect ratio and fits as an empty rect at the
    /// center of `target`.
    pub fn fit(&self, target: &Rect) -> Rect {
        let (cx, cy) = target.center();
        if self.is_empty() {
            return Rect::new(cx, cy, 0, 0);
        }
        let sx = f64::from(target.width()) / f64::from(self.width());
        let sy = f64::from(target.height()) / f64::from(self.height());
        let scale = sx.min(sy);
        let w = (f64::from(self.width()) * scale).round() as i32;
        let h = (f64::from(self.height()) * scale).round() as i32;
        Rect::new(
            target.min_x + (target.width() - w) / 2,
            target.min_y + (target.height() - h) / 2,
            w,
            h,
        )
    }

    /// Move by `(dx, dy)`.
    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Scale every edge coordinate by the given factors, rounding to the
    /// nearest integer.
    pub fn scale(&self, sx: f32, sy: f32) -> Rect {
        let s = |v: i32, f: f32| (v as f32 * f).round() as i32;
        Rect::from_edges(
            s(self.min_x, sx),
            s(self.min_y, sy),
            s(self.max_x, sx),
            s(self.max_y, sy),
        )
    }

    /// Grow by `dx` on the left and right and `dy` on the top and bottom.
    ///
    /// Negative amounts shrink the rect; it collapses to zero size about
    /// its center rather than inverting.
    pub fn inflate(&self, dx: i32, dy: i32) -> Rect {
        let (cx, cy) = self.center();
        let (min_x, max_x) = inflate_axis(self.min_x, self.max_x, dx, cx);
        let (min_y, max_y) = inflate_axis(self.min_y, self.max_y, dy, cy);
        Rect {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Same size, new origin.
    pub fn with_origin(&self, x: i32, y: i32) -> Rect {
        Rect::new(x, y, self.width(), self.height())
    }

    /// Same origin, new size.
    pub fn with_size(&self, width: i32, height: i32) -> Rect {
        Rect::new(self.min_x, self.min_y, width, height)
    }
}

fn clamp_axis(min: i32, len: i32, lo: i32, hi: i32) -> (i32, i32) {
    let span = hi - lo;
    if len > span {
        (lo + (span - len) / 2, len)
    } else if min < lo {
        (lo, len)
    } else if min + len > hi {
        (hi - len, len)
    } else {
        (min, len)
    }
}

fn inflate_axis(min: i32, max: i32, amount: i32, center: i32) -> (i32, i32) {
    let (lo, hi) = (min - amount, max + amount);
    if lo > hi { (center, center) } else { (lo, hi) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_construction() {
        let r = Rect::from_edges(10, 20, 0, 5);
        assert_eq!((r.x(), r.y(), r.max_x(), r.max_y()), (0, 5, 10, 20));
        assert_eq!(Rect::new(10, 10, -4, -2), Rect::from_edges(6, 8, 10, 10));
    }

    #[test]
    fn test_half_open_containment() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains(0, 0));
        assert!(r.contains(9, 9));
        assert!(!r.contains(10, 5));
        assert!(!r.contains(5, 10));
        assert!(!Rect::new(3, 3, 0, 0).contains(3, 3));
    }

    #[test]
    fn test_shared_edge_is_not_intersection() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rect::new(9, 9, 5, 5)));
    }

    #[test]
    fn test_clamp_translates_inside() {
        let bounds = Rect::new(0, 0, 100, 100);
        assert_eq!(Rect::new(-10, 95, 20, 10).clamp(&bounds), Rect::new(0, 90, 20, 10));
        // Wider than bounds: centered horizontally, clamped vertically.
        assert_eq!(Rect::new(50, -5, 120, 10).clamp(&bounds), Rect::new(-10, 0, 120, 10));
    }

    #[test]
    fn test_clip_overlap_and_disjoint() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(a.clip(&Rect::new(5, 5, 10, 10)), Rect::from_edges(5, 5, 10, 10));

        let far = Rect::new(20, 0, 10, 10);
        let clipped = a.clip(&far);
        assert!(clipped.is_empty());
        assert_eq!(clipped.x(), 20);
        assert_eq!(a.intersect(&far), clipped);
    }

    #[test]
    fn test_union() {
        let u = Rect::new(0, 0, 5, 5).union(&Rect::new(10, 10, 5, 5));
        assert_eq!(u, Rect::from_edges(0, 0, 15, 15));
    }

    #[test]
    fn test_fit_preserves_aspect() {
        let target = Rect::new(0, 0, 100, 50);
        let fitted = Rect::new(0, 0, 20, 20).fit(&target);
        assert_eq!(fitted, Rect::new(25, 0, 50, 50));

        let wide = Rect::new(0, 0, 40, 10).fit(&target);
        assert_eq!(wide, Rect::new(0, 12, 100, 25));
    }

    #[test]
    fn test_translate_scale_inflate() {
        let r = Rect::new(2, 3, 4, 5);
        assert_eq!(r.translate(1, -1), Rect::new(3, 2, 4, 5));
        assert_eq!(r.scale(2.0, 2.0), Rect::new(4, 6, 8, 10));
        assert_eq!(r.inflate(1, 1), Rect::new(1, 2, 6, 7));

        let collapsed = Rect::new(0, 0, 4, 4).inflate(-5, -1);
        assert_eq!(collapsed.width(), 0);
        assert_eq!(collapsed.height(), 2);
    }

    #[test]
    fn test_from_center_and_accessors() {
        let r = Rect::from_center(50, 50, 20, 10);
        assert_eq!(r, Rect::new(40, 45, 20, 10));
        assert_eq!(r.center(), (50, 50));
        assert_eq!(r.area(), 200);
        assert_eq!(r.with_origin(0, 0), Rect::new(0, 0, 20, 10));
        assert_eq!(r.with_size(1, 1), Rect::new(40, 45, 1, 1));
    }
}
