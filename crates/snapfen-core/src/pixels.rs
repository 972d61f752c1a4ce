use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgb, RgbImage};

/// BT.601 luma (`0.299 R + 0.587 G + 0.114 B`), rounded to the nearest level.
///
/// The brightness thresholds used downstream were tuned against this
/// weighting, so it is used instead of `image`'s Rec. 709 conversion.
#[inline]
pub fn luma(px: Rgb<u8>) -> u8 {
    let [r, g, b] = px.0;
    let y = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}

/// Convert an RGB buffer to grayscale with [`luma`].
pub fn to_gray(img: &RgbImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        Luma([luma(*img.get_pixel(x, y))])
    })
}

#[inline]
fn get_rgb(src: &RgbImage, x: i32, y: i32) -> [f32; 3] {
    if x < 0 || y < 0 || x >= src.width() as i32 || y >= src.height() as i32 {
        return [0.0; 3];
    }
    let p = src.get_pixel(x as u32, y as u32).0;
    [p[0] as f32, p[1] as f32, p[2] as f32]
}

/// Bilinear RGB sample; pixels outside the image read as black.
#[inline]
pub fn sample_bilinear_rgb(src: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_rgb(src, x0, y0);
    let p10 = get_rgb(src, x0 + 1, y0);
    let p01 = get_rgb(src, x0, y0 + 1);
    let p11 = get_rgb(src, x0 + 1, y0 + 1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let a = p00[c] + fx * (p10[c] - p00[c]);
        let b = p01[c] + fx * (p11[c] - p01[c]);
        out[c] = (a + fy * (b - a)).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

/// Crop `(x, y, w, h)` out of `img` and resize it to `size x size`.
///
/// The rectangle is clamped to the image; an empty rectangle yields a black
/// square.
pub fn crop_resized(img: &RgbImage, x: u32, y: u32, w: u32, h: u32, size: u32) -> RgbImage {
    let x = x.min(img.width());
    let y = y.min(img.height());
    let w = w.min(img.width() - x);
    let h = h.min(img.height() - y);
    if w == 0 || h == 0 {
        return RgbImage::new(size, size);
    }

    let region = imageops::crop_imm(img, x, y, w, h).to_image();
    if w == size && h == size {
        return region;
    }
    imageops::resize(&region, size, size, FilterType::Triangle)
}

/// Per-channel mean of a rectangular region.
pub fn mean_rgb(img: &RgbImage, x: u32, y: u32, w: u32, h: u32) -> [f64; 3] {
    let mut sum = [0f64; 3];
    let mut n = 0usize;
    for yy in y..(y + h).min(img.height()) {
        for xx in x..(x + w).min(img.width()) {
            let p = img.get_pixel(xx, yy).0;
            for c in 0..3 {
                sum[c] += p[c] as f64;
            }
            n += 1;
        }
    }
    if n == 0 {
        return sum;
    }
    sum.map(|s| s / n as f64)
}

/// Mean and population variance of a set of intensities.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GrayStats {
    pub mean: f64,
    pub variance: f64,
}

pub fn gray_stats(values: impl IntoIterator<Item = u8>) -> GrayStats {
    let mut n = 0f64;
    let mut sum = 0f64;
    let mut sum_sq = 0f64;
    for v in values {
        let v = v as f64;
        n += 1.0;
        sum += v;
        sum_sq += v * v;
    }
    if n == 0.0 {
        return GrayStats::default();
    }
    let mean = sum / n;
    GrayStats {
        mean,
        variance: (sum_sq / n - mean * mean).max(0.0),
    }
}
