//! Outer-border quad detection.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{approximate_polygon_dp, arc_length, contour_area};
use imageproc::morphology::dilate;
use imageproc::point::Point;
use nalgebra::Point2;

use crate::params::ContourParams;
use crate::quad::{order_corners, BoardQuad};

pub(crate) fn blurred(gray: &GrayImage, sigma: f32) -> GrayImage {
    if sigma > 0.0 {
        gaussian_blur_f32(gray, sigma)
    } else {
        gray.clone()
    }
}

/// Bounding box aspect ratio (`w / h`) with inclusive pixel extents.
fn bounding_aspect(poly: &[Point<i32>]) -> f64 {
    let (mut min_x, mut min_y) = (i32::MAX, i32::MAX);
    let (mut max_x, mut max_y) = (i32::MIN, i32::MIN);
    for p in poly {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let w = (max_x - min_x + 1) as f64;
    let h = (max_y - min_y + 1) as f64;
    if h <= 0.0 {
        return 0.0;
    }
    w / h
}

/// Drop vertices closer than `eps` to the previously kept one, including
/// the wrap-around from the last vertex back to the first.
fn merge_close_vertices(poly: Vec<Point<i32>>, eps: f64) -> Vec<Point<i32>> {
    let dist = |a: &Point<i32>, b: &Point<i32>| {
        let dx = (a.x - b.x) as f64;
        let dy = (a.y - b.y) as f64;
        (dx * dx + dy * dy).sqrt()
    };
    let mut out: Vec<Point<i32>> = Vec::with_capacity(poly.len());
    for p in poly {
        if out.last().is_some_and(|q| dist(q, &p) < eps) {
            continue;
        }
        out.push(p);
    }
    while out.len() > 1 && dist(&out[0], &out[out.len() - 1]) < eps {
        out.pop();
    }
    out
}

/// Reduce a contour to a polygon; `None` unless it has exactly four vertices.
fn approximate_quad(contour: &Contour<i32>, epsilon_frac: f64) -> Option<[Point<i32>; 4]> {
    if contour.points.len() < 4 {
        return None;
    }
    let epsilon = epsilon_frac * arc_length(&contour.points, true);
    if epsilon <= 0.0 {
        return None;
    }
    let poly = approximate_polygon_dp(&contour.points, epsilon, true);
    // a contour traced from mid-edge can close with a vertex beside its start
    merge_close_vertices(poly, epsilon).try_into().ok()
}

/// Find the largest square-ish four-sided outline in the image.
pub(crate) fn find_board_quad(gray: &GrayImage, params: &ContourParams) -> Option<BoardQuad> {
    let (w, h) = gray.dimensions();
    let mut edges = canny(
        &blurred(gray, params.blur_sigma),
        params.canny_low,
        params.canny_high,
    );
    for _ in 0..params.dilate_iterations {
        edges = dilate(&edges, Norm::LInf, params.dilate_radius);
    }

    let mut contours: Vec<(f64, Contour<i32>)> = find_contours::<i32>(&edges)
        .into_iter()
        .filter(|c| c.parent.is_none() && c.border_type == BorderType::Outer)
        .map(|c| (contour_area(&c.points).abs(), c))
        .collect();
    contours.sort_by(|a, b| b.0.total_cmp(&a.0));

    let min_area = (w as f64) * (h as f64) * params.min_area_frac;

    for (area, contour) in contours.iter().take(params.max_candidates) {
        if *area < min_area {
            continue;
        }
        let Some(poly) = approximate_quad(contour, params.approx_epsilon_frac) else {
            continue;
        };
        let aspect = bounding_aspect(&poly);
        if aspect > params.min_aspect && aspect < params.max_aspect {
            let pts = poly.map(|p| Point2::new(p.x as f32, p.y as f32));
            log::debug!("quad candidate: area={area:.0} aspect={aspect:.3}");
            return Some(order_corners(&pts));
        }
    }

    None
}
