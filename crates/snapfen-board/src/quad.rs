use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Board outline in source-image pixels, ordered top-left, top-right,
/// bottom-right, bottom-left.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardQuad {
    pub corners: [Point2<f32>; 4],
}

impl BoardQuad {
    #[inline]
    pub fn top_left(&self) -> Point2<f32> {
        self.corners[0]
    }

    #[inline]
    pub fn top_right(&self) -> Point2<f32> {
        self.corners[1]
    }

    #[inline]
    pub fn bottom_right(&self) -> Point2<f32> {
        self.corners[2]
    }

    #[inline]
    pub fn bottom_left(&self) -> Point2<f32> {
        self.corners[3]
    }
}

/// Axis-aligned source-image rectangle a board was cropped from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// First index minimizing `key`; ties keep the earliest point.
fn arg_min(pts: &[Point2<f32>; 4], key: impl Fn(&Point2<f32>) -> f32) -> usize {
    let mut best = 0;
    for i in 1..4 {
        if key(&pts[i]) < key(&pts[best]) {
            best = i;
        }
    }
    best
}

/// Order four unordered corners as TL, TR, BR, BL.
///
/// TL minimizes `x + y`, BR maximizes it; TR minimizes `y - x` (the most
/// "up and right" point), BL maximizes it. Ties resolve to the earliest
/// input point, so a degenerate input may reuse a point.
pub fn order_corners(pts: &[Point2<f32>; 4]) -> BoardQuad {
    let tl = arg_min(pts, |p| p.x + p.y);
    let br = arg_min(pts, |p| -(p.x + p.y));
    let tr = arg_min(pts, |p| p.y - p.x);
    let bl = arg_min(pts, |p| -(p.y - p.x));
    BoardQuad {
        corners: [pts[tl], pts[tr], pts[br], pts[bl]],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point2<f32> {
        Point2::new(x, y)
    }

    #[test]
    fn orders_shuffled_square() {
        let expected = [p(10.0, 12.0), p(300.0, 8.0), p(310.0, 290.0), p(5.0, 280.0)];
        let shuffles = [[2, 0, 3, 1], [3, 2, 1, 0], [1, 3, 0, 2], [0, 1, 2, 3]];
        for s in shuffles {
            let pts = [expected[s[0]], expected[s[1]], expected[s[2]], expected[s[3]]];
            assert_eq!(order_corners(&pts).corners, expected);
        }
    }

    #[test]
    fn chosen_corners_are_extremal() {
        let pts = [p(120.0, 40.0), p(30.0, 200.0), p(420.0, 380.0), p(460.0, 60.0)];
        let q = order_corners(&pts);
        let sum = |a: Point2<f32>| a.x + a.y;
        let diff = |a: Point2<f32>| a.y - a.x;
        for other in pts {
            assert!(sum(q.top_left()) <= sum(other));
            assert!(sum(q.bottom_right()) >= sum(other));
            assert!(diff(q.top_right()) <= diff(other));
            assert!(diff(q.bottom_left()) >= diff(other));
        }
    }
}
