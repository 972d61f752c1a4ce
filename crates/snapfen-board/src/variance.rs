//! Block-variance fallback for screenshots without a clear border or grid.

use image::GrayImage;
use snapfen_core::gray_stats;

use crate::params::VarianceGridParams;
use crate::quad::CropRect;

/// Largest centered square of the image.
pub(crate) fn center_square(width: u32, height: u32) -> CropRect {
    let size = width.min(height);
    CropRect {
        x: (width - size) / 2,
        y: (height - size) / 2,
        width: size,
        height: size,
    }
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Square region covering the high-variance ("checkered") blocks, or `None`
/// when the block grid is too coarse, nothing is marked, or the region
/// degenerates.
pub(crate) fn variance_region(gray: &GrayImage, params: &VarianceGridParams) -> Option<CropRect> {
    let (w, h) = gray.dimensions();
    let block = w.min(h) / params.blocks_per_side.max(1);
    if block < params.min_block_size.max(1) {
        return None;
    }

    let rows = (h / block) as usize;
    let cols = (w / block) as usize;
    let mut variances = Vec::with_capacity(rows * cols);
    for i in 0..rows as u32 {
        for j in 0..cols as u32 {
            let pixels = (i * block..(i + 1) * block).flat_map(|y| {
                (j * block..(j + 1) * block).map(move |x| gray.get_pixel(x, y)[0])
            });
            variances.push(gray_stats(pixels).variance);
        }
    }

    let threshold = median(&mut variances.clone()) * params.median_factor;
    let marked = |i: usize, j: usize| variances[i * cols + j] > threshold;

    let marked_rows: Vec<usize> = (0..rows).filter(|&i| (0..cols).any(|j| marked(i, j))).collect();
    let marked_cols: Vec<usize> = (0..cols).filter(|&j| (0..rows).any(|i| marked(i, j))).collect();
    let (&r_min, &r_max) = (marked_rows.first()?, marked_rows.last()?);
    let (&c_min, &c_max) = (marked_cols.first()?, marked_cols.last()?);

    let y_min = r_min as u32 * block;
    let y_max = ((r_max as u32 + 1) * block).min(h);
    let x_min = c_min as u32 * block;
    let x_max = ((c_max as u32 + 1) * block).min(w);

    let half = (y_max - y_min).min(x_max - x_min) / 2;
    let cy = (y_min + y_max) / 2;
    let cx = (x_min + x_max) / 2;

    let y1 = cy.saturating_sub(half);
    let y2 = (cy + half).min(h);
    let x1 = cx.saturating_sub(half);
    let x2 = (cx + half).min(w);
    if y2 <= y1 || x2 <= x1 {
        return None;
    }

    log::debug!(
        "variance grid: block={block} marked rows {r_min}..={r_max} cols {c_min}..={c_max}"
    );
    Some(CropRect {
        x: x1,
        y: y1,
        width: x2 - x1,
        height: y2 - y1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn median_averages_middle_pair() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn center_square_is_centered() {
        assert_eq!(
            center_square(300, 200),
            CropRect {
                x: 50,
                y: 0,
                width: 200,
                height: 200
            }
        );
    }

    #[test]
    fn tiny_images_skip_block_analysis() {
        let gray = GrayImage::from_pixel(90, 90, Luma([128]));
        assert!(variance_region(&gray, &VarianceGridParams::default()).is_none());
    }

    #[test]
    fn flat_images_mark_nothing() {
        let gray = GrayImage::from_pixel(400, 400, Luma([128]));
        assert!(variance_region(&gray, &VarianceGridParams::default()).is_none());
    }

    #[test]
    fn finds_checkered_area_inside_flat_frame() {
        // 400x400 flat frame; checkerboard with 10px squares in [100, 300)^2
        let gray = GrayImage::from_fn(400, 400, |x, y| {
            let inside = (100..300).contains(&x) && (100..300).contains(&y);
            let v = if inside && ((x / 10 + y / 10) % 2 == 0) { 230 } else { 40 };
            Luma([if inside { v } else { 120 }])
        });
        let rect = variance_region(&gray, &VarianceGridParams::default()).expect("region");
        assert_eq!(
            rect,
            CropRect {
                x: 100,
                y: 100,
                width: 200,
                height: 200
            }
        );
    }
}
