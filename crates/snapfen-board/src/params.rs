use serde::{Deserialize, Serialize};

/// Quad (outer border) detection settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourParams {
    /// Pre-blur sigma. `1.1` is the sigma OpenCV derives for a 5x5 kernel.
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Dilation radius in pixels (`1` = 3x3 kernel).
    pub dilate_radius: u8,
    pub dilate_iterations: u32,
    /// Only the largest N external contours are examined.
    pub max_candidates: usize,
    /// Minimum contour area as a fraction of the image area.
    pub min_area_frac: f64,
    /// Polygon approximation tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_frac: f64,
    /// Open interval of accepted bounding-box aspect ratios (w / h).
    pub min_aspect: f64,
    pub max_aspect: f64,
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            canny_low: 30.0,
            canny_high: 100.0,
            dilate_radius: 1,
            dilate_iterations: 2,
            max_candidates: 5,
            min_area_frac: 0.1,
            approx_epsilon_frac: 0.02,
            min_aspect: 0.7,
            max_aspect: 1.3,
        }
    }
}

/// Internal grid-line detection settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineGridParams {
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Accumulator votes needed for a Hough line.
    pub vote_threshold: u32,
    /// Non-maximum suppression radius in the Hough accumulator.
    pub suppression_radius: u32,
    pub min_line_length: u32,
    /// Largest run of missing edge pixels bridged inside one segment.
    pub max_line_gap: u32,
    /// Abort when fewer segments are found.
    pub min_segments: usize,
    /// Abort when either axis keeps fewer lines.
    pub min_lines_per_axis: usize,
    /// Segments within this many degrees of 0/180 count as horizontal.
    pub horizontal_tolerance_deg: f64,
    /// Segments within this many degrees of 90 count as vertical.
    pub vertical_tolerance_deg: f64,
    /// Both board extents must exceed this many pixels.
    pub min_extent: i64,
    pub min_aspect: f64,
    pub max_aspect: f64,
}

impl Default for LineGridParams {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            canny_low: 50.0,
            canny_high: 150.0,
            vote_threshold: 100,
            suppression_radius: 8,
            min_line_length: 50,
            max_line_gap: 10,
            min_segments: 8,
            min_lines_per_axis: 4,
            horizontal_tolerance_deg: 15.0,
            vertical_tolerance_deg: 15.0,
            min_extent: 50,
            min_aspect: 0.7,
            max_aspect: 1.3,
        }
    }
}

/// Block-variance fallback settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarianceGridParams {
    /// Block size is `min(h, w) / blocks_per_side`.
    pub blocks_per_side: u32,
    /// Below this block size the fallback goes straight to a center crop.
    pub min_block_size: u32,
    /// Blocks with variance above `median_factor * median` are board-like.
    pub median_factor: f64,
}

impl Default for VarianceGridParams {
    fn default() -> Self {
        Self {
            blocks_per_side: 20,
            min_block_size: 5,
            median_factor: 0.3,
        }
    }
}

/// Configuration for [`crate::BoardLocator`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorParams {
    pub contour: ContourParams,
    pub lines: LineGridParams,
    pub variance: VarianceGridParams,
}
