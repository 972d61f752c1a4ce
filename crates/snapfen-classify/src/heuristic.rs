use image::{imageops, RgbImage};
use snapfen_core::{
    gray_stats, luma, mean_rgb, to_gray, PieceColor, PieceLabel, SquareClassification,
    BOARD_SQUARES,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::HeuristicParams;
use crate::shape::piece_kind_from_shape;
use crate::{BackendInfo, ClassifyError, SquareClassifier};

/// Estimated background color of the light and dark squares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackgroundColors {
    pub light: [u8; 3],
    pub dark: [u8; 3],
}

impl BackgroundColors {
    /// Background for a scan-order index; a8 is light.
    pub fn for_square(&self, index: usize) -> [u8; 3] {
        if is_light_square(index) {
            self.light
        } else {
            self.dark
        }
    }
}

#[inline]
fn is_light_square(index: usize) -> bool {
    (index / 8 + index % 8) % 2 == 0
}

/// Measurements of a square's center region against its background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellStats {
    /// Euclidean RGB distance between the center's mean color and the background.
    pub color_distance: f64,
    /// Population variance of the center's grayscale intensities.
    pub gray_variance: f64,
}

impl CellStats {
    pub fn measure(center: &RgbImage, background: [u8; 3]) -> Self {
        let mean = mean_rgb(center, 0, 0, center.width(), center.height());
        let color_distance = mean
            .iter()
            .zip(background)
            .map(|(m, b)| (m - b as f64).powi(2))
            .sum::<f64>()
            .sqrt();
        let gray_variance = gray_stats(center.pixels().map(|p| luma(*p))).variance;
        Self {
            color_distance,
            gray_variance,
        }
    }
}

/// Model-free classifier for flat digital board themes.
#[derive(Clone, Debug, Default)]
pub struct HeuristicClassifier {
    params: HeuristicParams,
}

impl HeuristicClassifier {
    pub fn new(params: HeuristicParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &HeuristicParams {
        &self.params
    }

    /// Light/dark background colors from the corner pixels of every square.
    ///
    /// Each square contributes the mean of its four inset corner pixels; the
    /// background is the per-channel median of those means over all squares
    /// of the same color, truncated to `u8`.
    pub fn estimate_background(&self, squares: &[RgbImage]) -> BackgroundColors {
        let mut light = Vec::with_capacity(squares.len() / 2 + 1);
        let mut dark = Vec::with_capacity(squares.len() / 2 + 1);
        for (i, square) in squares.iter().enumerate() {
            let avg = self.corner_mean(square);
            if is_light_square(i) {
                light.push(avg);
            } else {
                dark.push(avg);
            }
        }
        BackgroundColors {
            light: channel_median(&light),
            dark: channel_median(&dark),
        }
    }

    fn corner_mean(&self, square: &RgbImage) -> [f64; 3] {
        let (w, h) = square.dimensions();
        if w == 0 || h == 0 {
            return [0.0; 3];
        }
        let inset = self.params.corner_inset;
        let near_x = inset.min(w - 1);
        let near_y = inset.min(h - 1);
        let far_x = (w - 1).saturating_sub(inset);
        let far_y = (h - 1).saturating_sub(inset);

        let mut sum = [0f64; 3];
        for (x, y) in [(near_x, near_y), (far_x, near_y), (near_x, far_y), (far_x, far_y)] {
            for (s, v) in sum.iter_mut().zip(square.get_pixel(x, y).0) {
                *s += v as f64;
            }
        }
        sum.map(|s| s / 4.0)
    }

    /// Centered `center_size` region of a square (smaller squares are used whole).
    fn center(&self, square: &RgbImage) -> RgbImage {
        let (w, h) = square.dimensions();
        let cw = self.params.center_size.min(w);
        let ch = self.params.center_size.min(h);
        imageops::crop_imm(square, (w - cw) / 2, (h - ch) / 2, cw, ch).to_image()
    }

    #[inline]
    pub fn is_empty(&self, stats: &CellStats) -> bool {
        stats.color_distance < self.params.empty_color_distance
            && stats.gray_variance < self.params.empty_variance
    }

    /// Label one square against the background of its own color.
    pub fn classify_square(&self, square: &RgbImage, background: [u8; 3]) -> SquareClassification {
        let center = self.center(square);
        let stats = CellStats::measure(&center, background);
        if self.is_empty(&stats) {
            return SquareClassification::new(PieceLabel::Empty, self.params.empty_confidence);
        }

        let color = self.piece_color(&center, background);
        let kind = piece_kind_from_shape(&to_gray(&center), &self.params.shape);
        SquareClassification::new(PieceLabel::piece(color, kind), self.params.piece_confidence)
    }

    /// White when the pixels that differ from the background are bright.
    ///
    /// Defaults to white when no pixel stands out.
    fn piece_color(&self, center: &RgbImage, background: [u8; 3]) -> PieceColor {
        let mut sum = 0f64;
        let mut n = 0usize;
        for px in center.pixels() {
            let max_diff = px
                .0
                .iter()
                .zip(background)
                .map(|(&v, b)| (v as f64 - b as f64).abs())
                .fold(0f64, f64::max);
            if max_diff > self.params.piece_mask_delta {
                sum += luma(*px) as f64;
                n += 1;
            }
        }
        if n == 0 || sum / n as f64 > self.params.white_brightness {
            PieceColor::White
        } else {
            PieceColor::Black
        }
    }
}

fn channel_median(samples: &[[f64; 3]]) -> [u8; 3] {
    let mut out = [0u8; 3];
    for (c, slot) in out.iter_mut().enumerate() {
        let mut values: Vec<f64> = samples.iter().map(|s| s[c]).collect();
        if values.is_empty() {
            continue;
        }
        values.sort_by(f64::total_cmp);
        let mid = values.len() / 2;
        let median = if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        };
        *slot = median.clamp(0.0, 255.0) as u8;
    }
    out
}

impl SquareClassifier for HeuristicClassifier {
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    fn classify(
        &self,
        squares: &[RgbImage; BOARD_SQUARES],
    ) -> Result<[SquareClassification; BOARD_SQUARES], ClassifyError> {
        let background = self.estimate_background(squares);
        log::debug!(
            "heuristic background: light {:?}, dark {:?}",
            background.light,
            background.dark
        );
        Ok(std::array::from_fn(|i| {
            self.classify_square(&squares[i], background.for_square(i))
        }))
    }

    fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            model_loaded: false,
            model_type: "heuristic",
        }
    }
}
