//! Planar segment intersection.

use crate::models::Point;

/// A straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    fn shares_endpoint(&self, other: &Segment) -> bool {
        self.start == other.start
            || self.start == other.end
            || self.end == other.start
            || self.end == other.end
    }
}

/// `true` if `a`, `b`, `c` turn counter-clockwise.
fn ccw(a: Point, b: Point, c: Point) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

/// Returns `true` if the two segments properly cross.
///
/// Segments sharing an endpoint never count as crossing. Collinear overlap is
/// not detected.
///
/// # Examples
///
/// ```
/// use u_logistics::evaluation::{segments_intersect, Segment};
/// use u_logistics::models::Point;
///
/// let a = Segment::new(Point::new(0.0, 0.0), Point::new(2.0, 2.0));
/// let b = Segment::new(Point::new(0.0, 2.0), Point::new(2.0, 0.0));
/// assert!(segments_intersect(&a, &b));
/// ```
pub fn segments_intersect(a: &Segment, b: &Segment) -> bool {
    if a.shares_endpoint(b) {
        return false;
    }
    ccw(a.start, b.start, b.end) != ccw(a.end, b.start, b.end)
        && ccw(a.start, a.end, b.start) != ccw(a.start, a.end, b.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> Segment {
        Segment::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn test_crossing() {
        assert!(segments_intersect(&seg(0.0, 0.0, 4.0, 4.0), &seg(0.0, 4.0, 4.0, 0.0)));
    }

    #[test]
    fn test_disjoint() {
        assert!(!segments_intersect(&seg(0.0, 0.0, 1.0, 0.0), &seg(0.0, 1.0, 1.0, 1.0)));
        assert!(!segments_intersect(&seg(0.0, 0.0, 1.0, 1.0), &seg(2.0, 0.0, 3.0, -1.0)));
    }

    #[test]
    fn test_shared_endpoint_excluded() {
        assert!(!segments_intersect(&seg(0.0, 0.0, 2.0, 2.0), &seg(0.0, 0.0, 2.0, -2.0)));
        assert!(!segments_intersect(&seg(0.0, 0.0, 2.0, 2.0), &seg(2.0, 2.0, 4.0, 0.0)));
    }

    #[test]
    fn test_symmetric() {
        let a = seg(0.0, 0.0, 4.0, 4.0);
        let b = seg(1.0, 3.0, 3.0, 1.0);
        assert_eq!(segments_intersect(&a, &b), segments_intersect(&b, &a));
        assert!(segments_intersect(&a, &b));
    }
}
