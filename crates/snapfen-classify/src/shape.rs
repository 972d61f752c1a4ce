//! Piece-kind guess from the silhouette of a square's center.

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::otsu_level;
use imageproc::geometry::{contour_area, convex_hull};
use snapfen_core::PieceKind;

use crate::params::ShapeBands;

/// Otsu-binarize the center, take the largest outer contour, and map its
/// fill ratio and solidity through `bands`. Falls back to a pawn when no
/// contour (or only a degenerate one) is found.
pub(crate) fn piece_kind_from_shape(center_gray: &GrayImage, bands: &ShapeBands) -> PieceKind {
    let (w, h) = center_gray.dimensions();
    if w == 0 || h == 0 {
        return PieceKind::Pawn;
    }

    // foreground is strictly above the Otsu level; a flat image has level 0
    let level = otsu_level(center_gray);
    let binary = GrayImage::from_fn(w, h, |x, y| {
        Luma([if center_gray.get_pixel(x, y)[0] > level { 255 } else { 0 }])
    });
    let contours = find_contours::<i32>(&binary);

    let mut largest: Option<(f64, &[imageproc::point::Point<i32>])> = None;
    for c in contours
        .iter()
        .filter(|c| c.parent.is_none() && c.border_type == BorderType::Outer)
    {
        let area = contour_area(&c.points).abs();
        if largest.is_none_or(|(best, _)| area > best) {
            largest = Some((area, c.points.as_slice()));
        }
    }
    let Some((area, points)) = largest else {
        return PieceKind::Pawn;
    };

    let hull_area = contour_area(&convex_hull(points)).abs();
    if hull_area <= 0.0 {
        return PieceKind::Pawn;
    }

    let solidity = area / hull_area;
    let fill_ratio = area / (w as f64 * h as f64);
    log::trace!("silhouette fill {fill_ratio:.3}, solidity {solidity:.3}");
    bands.classify(fill_ratio, solidity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(x0: u32, y0: u32, w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(40, 40, |x, y| {
            let inside = (x0..x0 + w).contains(&x) && (y0..y0 + h).contains(&y);
            Luma([if inside { 230 } else { 60 }])
        })
    }

    #[test]
    fn large_solid_block_is_a_rook() {
        // (36 - 1)^2 / 1600 = 0.77 fill, convex
        assert_eq!(
            piece_kind_from_shape(&blob(2, 2, 36, 36), &ShapeBands::default()),
            PieceKind::Rook
        );
    }

    #[test]
    fn small_block_is_a_pawn() {
        assert_eq!(
            piece_kind_from_shape(&blob(15, 15, 10, 10), &ShapeBands::default()),
            PieceKind::Pawn
        );
    }

    #[test]
    fn empty_region_defaults_to_pawn() {
        assert_eq!(
            piece_kind_from_shape(&GrayImage::new(0, 0), &ShapeBands::default()),
            PieceKind::Pawn
        );
    }

    #[test]
    fn single_pixel_has_no_hull_area() {
        let mut img = GrayImage::from_pixel(40, 40, Luma([20]));
        img.put_pixel(20, 20, Luma([255]));
        assert_eq!(piece_kind_from_shape(&img, &ShapeBands::default()), PieceKind::Pawn);
    }
}
