//! Square-to-quad projective mapping used to rectify a photographed board.

use image::RgbImage;
use nalgebra::{Matrix3, Point2, Vector3};

use crate::sample_bilinear_rgb;

/// Below this the mapping is treated as singular.
const SINGULAR_EPS: f64 = 1e-9;

/// 3x3 projective transform acting on pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    /// Map a point; points sent to infinity come back non-finite.
    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        Point2::new((v.x / v.z) as f32, (v.y / v.z) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

/// Mapping from a `side x side` square with its origin at the top-left onto
/// `quad` (TL, TR, BR, BL): the square's corners land on the quad's corners
/// in that order.
///
/// Solved in closed form through the unit square. Returns `None` when three
/// or more corners are collinear or coincide.
pub fn square_to_quad(side: f32, quad: &[Point2<f32>; 4]) -> Option<Homography> {
    if side <= 0.0 {
        return None;
    }
    let [p0, p1, p2, p3] = quad.map(|p| (p.x as f64, p.y as f64));

    // the quad is a parallelogram iff both alternating sums vanish
    let sx = p0.0 - p1.0 + p2.0 - p3.0;
    let sy = p0.1 - p1.1 + p2.1 - p3.1;

    let (g, h) = if sx.abs() < SINGULAR_EPS && sy.abs() < SINGULAR_EPS {
        (0.0, 0.0)
    } else {
        let (dx1, dy1) = (p1.0 - p2.0, p1.1 - p2.1);
        let (dx2, dy2) = (p3.0 - p2.0, p3.1 - p2.1);
        let det = dx1 * dy2 - dx2 * dy1;
        if det.abs() < SINGULAR_EPS {
            return None;
        }
        ((sx * dy2 - dx2 * sy) / det, (dx1 * sy - sx * dy1) / det)
    };

    let unit = Matrix3::new(
        p1.0 - p0.0 + g * p1.0,
        p3.0 - p0.0 + h * p3.0,
        p0.0,
        p1.1 - p0.1 + g * p1.1,
        p3.1 - p0.1 + h * p3.1,
        p0.1,
        g,
        h,
        1.0,
    );
    if unit.determinant().abs() < SINGULAR_EPS {
        return None;
    }

    let s = 1.0 / side as f64;
    let to_unit = Matrix3::new(s, 0.0, 0.0, 0.0, s, 0.0, 0.0, 0.0, 1.0);
    Some(Homography::new(unit * to_unit))
}

/// Pull-warp: output pixel `(x, y)` samples the source at
/// `src_from_out(x, y)`, bilinearly; samples outside the source are black.
pub fn warp_perspective_rgb(
    src: &RgbImage,
    src_from_out: Homography,
    out_w: u32,
    out_h: u32,
) -> RgbImage {
    RgbImage::from_fn(out_w, out_h, |x, y| {
        let p = src_from_out.apply(Point2::new(x as f32, y as f32));
        if !(p.x.is_finite() && p.y.is_finite()) {
            return image::Rgb([0, 0, 0]);
        }
        sample_bilinear_rgb(src, p.x, p.y)
    })
}
