use image::imageops::{self, FilterType};
use image::RgbImage;
use snapfen_core::{PieceLabel, SquareClassification, BOARD_SQUARES};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::{ChannelOrder, ModelParams};
use crate::{BackendInfo, ClassifyError, SquareClassifier};

/// Inference runtime behind [`ModelClassifier`].
pub trait ScoreBackend: Send + Sync {
    /// Short runtime name reported as the backend's `model_type`.
    fn name(&self) -> &'static str;

    /// Raw class scores (logits) for one `(1, 3, size, size)` channel-first
    /// tensor with values in `[0, 1]`.
    fn scores(&self, input: &[f32], size: usize) -> Result<Vec<f32>, ClassifyError>;
}

/// Numerically stable softmax.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum.is_nan() || sum <= 0.0 {
        return vec![0.0; scores.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}

/// Learned 13-way classifier; each square is scored independently.
pub struct ModelClassifier<B> {
    backend: B,
    params: ModelParams,
}

impl<B: ScoreBackend> ModelClassifier<B> {
    pub fn new(backend: B, params: ModelParams) -> Self {
        Self { backend, params }
    }

    #[inline]
    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Resize to the model input and lay the pixels out as `C x H x W` in
    /// `[0, 1]`, in the configured channel order.
    pub fn to_tensor(&self, square: &RgbImage) -> Vec<f32> {
        let size = self.params.input_size.max(1);
        let resized;
        let img = if square.dimensions() == (size, size) {
            square
        } else {
            resized = imageops::resize(square, size, size, FilterType::Triangle);
            &resized
        };

        let plane = (size * size) as usize;
        let order: [usize; 3] = match self.params.channel_order {
            ChannelOrder::Rgb => [0, 1, 2],
            ChannelOrder::Bgr => [2, 1, 0],
        };
        let mut out = vec![0f32; 3 * plane];
        for (i, px) in img.pixels().enumerate() {
            for (c, &src) in order.iter().enumerate() {
                out[c * plane + i] = px.0[src] as f32 / 255.0;
            }
        }
        out
    }

    pub fn classify_square(
        &self,
        square: &RgbImage,
    ) -> Result<SquareClassification, ClassifyError> {
        let input = self.to_tensor(square);
        let scores = self
            .backend
            .scores(&input, self.params.input_size.max(1) as usize)?;
        if scores.len() != PieceLabel::COUNT {
            return Err(ClassifyError::ScoreLength {
                expected: PieceLabel::COUNT,
                got: scores.len(),
            });
        }

        let probs = softmax(&scores);
        let (best, p) = probs
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |acc, (i, p)| if p > acc.1 { (i, p) } else { acc });
        let label = PieceLabel::from_index(best).unwrap_or(PieceLabel::Empty);
        Ok(SquareClassification::new(label, p))
    }
}

impl<B: ScoreBackend> SquareClassifier for ModelClassifier<B> {
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    fn classify(
        &self,
        squares: &[RgbImage; BOARD_SQUARES],
    ) -> Result<[SquareClassification; BOARD_SQUARES], ClassifyError> {
        let mut out = [SquareClassification::new(PieceLabel::Empty, 0.0); BOARD_SQUARES];
        for (slot, square) in out.iter_mut().zip(squares) {
            *slot = self.classify_square(square)?;
        }
        Ok(out)
    }

    fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            model_loaded: true,
            model_type: self.backend.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Rgb;

    /// Puts a large logit on the class given by the tensor's mean intensity.
    struct MeanBackend;

    impl ScoreBackend for MeanBackend {
        fn name(&self) -> &'static str {
            "mean"
        }

        fn scores(&self, input: &[f32], size: usize) -> Result<Vec<f32>, ClassifyError> {
            assert_eq!(input.len(), 3 * size * size);
            let mean = input.iter().sum::<f32>() / input.len() as f32;
            let hot = (mean * 12.0).round() as usize;
            Ok((0..PieceLabel::COUNT)
                .map(|i| if i == hot { 10.0 } else { 0.0 })
                .collect())
        }
    }

    struct ShortBackend;

    impl ScoreBackend for ShortBackend {
        fn name(&self) -> &'static str {
            "short"
        }

        fn scores(&self, _: &[f32], _: usize) -> Result<Vec<f32>, ClassifyError> {
            Ok(vec![0.0; 12])
        }
    }

    #[test]
    fn softmax_is_normalized_and_shift_invariant() {
        let p = softmax(&[1.0, 2.0, 3.0]);
        assert_relative_eq!(p.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        let q = softmax(&[1001.0, 1002.0, 1003.0]);
        for (a, b) in p.iter().zip(&q) {
            assert_relative_eq!(a, b, epsilon = 1e-6);
        }
        assert!(p[2] > p[1] && p[1] > p[0]);
    }

    #[test]
    fn tensor_is_channel_first_in_configured_order() {
        let red = RgbImage::from_pixel(64, 64, Rgb([255, 0, 0]));
        let plane = 64 * 64;

        let bgr = ModelClassifier::new(MeanBackend, ModelParams::default()).to_tensor(&red);
        assert_eq!(bgr.len(), 3 * plane);
        assert_eq!(bgr[0], 0.0);
        assert_eq!(bgr[2 * plane], 1.0);

        let params = ModelParams {
            channel_order: ChannelOrder::Rgb,
            ..ModelParams::default()
        };
        let rgb = ModelClassifier::new(MeanBackend, params).to_tensor(&red);
        assert_eq!(rgb[0], 1.0);
        assert_eq!(rgb[2 * plane + 17], 0.0);
    }

    #[test]
    fn odd_sized_squares_are_resized() {
        let clf = ModelClassifier::new(MeanBackend, ModelParams::default());
        let t = clf.to_tensor(&RgbImage::from_pixel(50, 70, Rgb([9, 9, 9])));
        assert_eq!(t.len(), 3 * 64 * 64);
    }

    #[test]
    fn argmax_label_and_softmax_confidence() {
        let clf = ModelClassifier::new(MeanBackend, ModelParams::default());
        let black = RgbImage::new(64, 64);
        let c = clf.classify_square(&black).unwrap();
        assert_eq!(c.label, PieceLabel::Empty);
        let expected = 10f32.exp() / (10f32.exp() + 12.0);
        assert_relative_eq!(c.confidence, expected, epsilon = 1e-6);

        let white = RgbImage::from_pixel(64, 64, Rgb([255, 255, 255]));
        assert_eq!(clf.classify_square(&white).unwrap().label, PieceLabel::Bk);

        let info = clf.backend_info();
        assert!(info.model_loaded);
        assert_eq!(info.model_type, "mean");
    }

    #[test]
    fn wrong_score_count_is_an_error() {
        let clf = ModelClassifier::new(ShortBackend, ModelParams::default());
        let squares: [RgbImage; BOARD_SQUARES] = std::array::from_fn(|_| RgbImage::new(64, 64));
        match clf.classify(&squares) {
            Err(ClassifyError::ScoreLength { expected, got }) => {
                assert_eq!((expected, got), (13, 12));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
