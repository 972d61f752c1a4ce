//! Internal grid-line detection.
//!
//! Hough lines are detected on a Canny edge map, then each line is walked
//! across the edge map to recover finite segments (runs of edge pixels with
//! gaps up to `max_line_gap`, at least `min_line_length` long). The board
//! extent is the span of horizontal and vertical segment midpoints.

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::hough::{detect_lines, LineDetectionOptions, PolarLine};

use crate::contour::blurred;
use crate::params::LineGridParams;
use crate::quad::CropRect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Segment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Segment {
    /// Unsigned direction angle in degrees, `[0, 180]`.
    pub fn angle_deg(&self) -> f64 {
        let dy = (self.y2 - self.y1) as f64;
        let dx = (self.x2 - self.x1) as f64;
        dy.atan2(dx).to_degrees().abs()
    }
}

#[inline]
fn is_edge(edges: &GrayImage, x: i64, y: i64) -> bool {
    x >= 0
        && y >= 0
        && (x as u32) < edges.width()
        && (y as u32) < edges.height()
        && edges.get_pixel(x as u32, y as u32)[0] > 0
}

/// Walk a polar line across the edge map and cut it into supported segments.
fn trace_segments(edges: &GrayImage, line: &PolarLine, params: &LineGridParams) -> Vec<Segment> {
    let theta = (line.angle_in_degrees as f64).to_radians();
    let (sin, cos) = theta.sin_cos();
    // foot of the perpendicular from the origin, and the line direction
    let (px, py) = (line.r as f64 * cos, line.r as f64 * sin);
    let (dx, dy) = (-sin, cos);
    // perpendicular step used to tolerate one pixel of rounding
    let (nx, ny) = (cos, sin);

    let reach = ((edges.width() as f64).powi(2) + (edges.height() as f64).powi(2)).sqrt();
    let t_max = reach.ceil() as i64;

    let mut segments = Vec::new();
    let mut run: Option<(f64, f64)> = None;
    let mut gap = 0u32;

    let close = |run: (f64, f64), segments: &mut Vec<Segment>| {
        let (t0, t1) = run;
        if t1 - t0 + 1.0 >= params.min_line_length as f64 {
            segments.push(Segment {
                x1: (px + t0 * dx).round() as i32,
                y1: (py + t0 * dy).round() as i32,
                x2: (px + t1 * dx).round() as i32,
                y2: (py + t1 * dy).round() as i32,
            });
        }
    };

    for step in -t_max..=t_max {
        let t = step as f64;
        let x = px + t * dx;
        let y = py + t * dy;
        let hit = [-1.0, 0.0, 1.0].iter().any(|&o| {
            is_edge(edges, (x + o * nx).round() as i64, (y + o * ny).round() as i64)
        });

        if hit {
            run = Some(match run {
                Some((t0, _)) => (t0, t),
                None => (t, t),
            });
            gap = 0;
        } else if let Some(r) = run {
            gap += 1;
            if gap > params.max_line_gap {
                close(r, &mut segments);
                run = None;
                gap = 0;
            }
        }
    }
    if let Some(r) = run {
        close(r, &mut segments);
    }

    segments
}

pub(crate) fn detect_segments(gray: &GrayImage, params: &LineGridParams) -> Vec<Segment> {
    let edges = canny(
        &blurred(gray, params.blur_sigma),
        params.canny_low,
        params.canny_high,
    );
    let lines = detect_lines(
        &edges,
        LineDetectionOptions {
            vote_threshold: params.vote_threshold,
            suppression_radius: params.suppression_radius,
        },
    );
    lines
        .iter()
        .flat_map(|l| trace_segments(&edges, l, params))
        .collect()
}

/// Board rectangle spanned by axis-aligned segments, if it looks square.
pub(crate) fn grid_bounds(segments: &[Segment], params: &LineGridParams) -> Option<CropRect> {
    if segments.len() < params.min_segments {
        log::debug!("line grid: only {} segments", segments.len());
        return None;
    }

    let h_tol = params.horizontal_tolerance_deg;
    let v_tol = params.vertical_tolerance_deg;

    let mut rows = Vec::new();
    let mut cols = Vec::new();
    for s in segments {
        let angle = s.angle_deg();
        if angle < h_tol || angle > 180.0 - h_tol {
            rows.push((s.y1.min(s.y2) as i64 + s.y1.max(s.y2) as i64).div_euclid(2));
        } else if angle > 90.0 - v_tol && angle < 90.0 + v_tol {
            cols.push((s.x1.min(s.x2) as i64 + s.x1.max(s.x2) as i64).div_euclid(2));
        }
    }

    if rows.len() < params.min_lines_per_axis || cols.len() < params.min_lines_per_axis {
        log::debug!(
            "line grid: {} horizontal / {} vertical lines",
            rows.len(),
            cols.len()
        );
        return None;
    }

    let y_min = *rows.iter().min()?;
    let y_max = *rows.iter().max()?;
    let x_min = *cols.iter().min()?;
    let x_max = *cols.iter().max()?;

    let w = x_max - x_min;
    let h = y_max - y_min;
    if w <= params.min_extent || h <= params.min_extent {
        return None;
    }
    let aspect = w as f64 / h as f64;
    if !(aspect > params.min_aspect && aspect < params.max_aspect) {
        return None;
    }
    if x_min < 0 || y_min < 0 {
        return None;
    }

    Some(CropRect {
        x: x_min as u32,
        y: y_min as u32,
        width: w as u32,
        height: h as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn seg(x1: i32, y1: i32, x2: i32, y2: i32) -> Segment {
        Segment { x1, y1, x2, y2 }
    }

    fn grid(x0: i32, y0: i32, size: i32) -> Vec<Segment> {
        let mut out = Vec::new();
        for k in 0..5 {
            let o = k * size / 4;
            out.push(seg(x0, y0 + o, x0 + size, y0 + o));
            out.push(seg(x0 + o, y0, x0 + o, y0 + size));
        }
        out
    }

    #[test]
    fn angles_are_unsigned() {
        assert!(seg(0, 0, 100, 0).angle_deg() < 1e-9);
        assert!((seg(100, 0, 0, 0).angle_deg() - 180.0).abs() < 1e-9);
        assert!((seg(5, 100, 5, 0).angle_deg() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn bounds_follow_midpoints() {
        let rect = grid_bounds(&grid(40, 30, 200), &LineGridParams::default()).expect("bounds");
        assert_eq!(
            rect,
            CropRect {
                x: 40,
                y: 30,
                width: 200,
                height: 200
            }
        );
    }

    #[test]
    fn diagonal_segments_are_ignored() {
        let mut segs = grid(0, 0, 200);
        segs.truncate(7);
        segs.extend((0..10).map(|k| seg(k, 0, k + 100, 100)));
        assert!(grid_bounds(&segs, &LineGridParams::default()).is_none());
    }

    #[test]
    fn rejects_too_few_or_non_square() {
        let params = LineGridParams::default();
        assert!(grid_bounds(&grid(0, 0, 200)[..6], &params).is_none());

        let mut wide = Vec::new();
        for k in 0..5 {
            wide.push(seg(0, k * 25, 300, k * 25));
            wide.push(seg(k * 75, 0, k * 75, 100));
        }
        assert!(grid_bounds(&wide, &params).is_none());
    }

    #[test]
    fn traces_drawn_grid_lines() {
        let mut gray = GrayImage::from_pixel(300, 300, Luma([230]));
        for k in 0..5u32 {
            let o = 50 + k * 50;
            for t in 50..=250u32 {
                gray.put_pixel(t, o, Luma([10]));
                gray.put_pixel(o, t, Luma([10]));
            }
        }
        let params = LineGridParams::default();
        let segments = detect_segments(&gray, &params);
        assert!(segments.len() >= params.min_segments, "{}", segments.len());
        let rect = grid_bounds(&segments, &params).expect("grid");
        assert!((rect.x as i64 - 50).abs() <= 3, "{rect:?}");
        assert!((rect.y as i64 - 50).abs() <= 3, "{rect:?}");
        assert!((rect.width as i64 - 200).abs() <= 6, "{rect:?}");
    }
}
