use crate::util::{SilMatchError, SilMatchResult};

/// Resampling policy for the scale step.
///
/// Only nearest-neighbour is offered: any filter that blends neighbours would
/// reintroduce gray levels into a two-colour bitmap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Resample {
    #[default]
    Nearest,
}

/// Configuration for canonicalizing silhouettes.
#[derive(Clone, Debug, PartialEq)]
pub struct CanonConfig {
    /// Mean channel intensity above which a pixel is background.
    pub threshold: u8,
    /// Width of the box the cropped shape is scaled into.
    pub inner_width: usize,
    /// Height of the box the cropped shape is scaled into.
    pub inner_height: usize,
    /// Output bitmap width.
    pub canvas_width: usize,
    /// Output bitmap height.
    pub canvas_height: usize,
    /// Luminance written for foreground pixels.
    pub foreground: u8,
    /// Luminance written for background pixels and the canvas fill.
    pub background: u8,
    /// Resampling filter used when scaling the crop.
    pub resample: Resample,
    /// Re-crop once when downsampling dropped the outermost foreground
    /// rows or columns, so that canonical output is a fixed point.
    pub settle: bool,
    /// Canonicalize batch sources on the rayon pool (requires the `rayon`
    /// feature).
    pub parallel: bool,
}

impl Default for CanonConfig {
    fn default() -> Self {
        Self {
            threshold: 127,
            inner_width: 98,
            inner_height: 98,
            canvas_width: 100,
            canvas_height: 100,
            foreground: 0,
            background: 255,
            resample: Resample::Nearest,
            settle: true,
            parallel: true,
        }
    }
}

impl CanonConfig {
    /// Checks sizes and colours for consistency.
    pub fn validate(&self) -> SilMatchResult<()> {
        if self.inner_width == 0 || self.inner_height == 0 {
            return Err(SilMatchError::InvalidConfig("inner box must be non-empty"));
        }
        if self.inner_width >= self.canvas_width || self.inner_height >= self.canvas_height {
            return Err(SilMatchError::InvalidConfig(
                "inner box must be strictly smaller than the canvas",
            ));
        }
        if self.foreground > self.threshold {
            return Err(SilMatchError::InvalidConfig(
                "foreground luminance must not exceed the threshold",
            ));
        }
        if self.background <= self.threshold {
            return Err(SilMatchError::InvalidConfig(
                "background luminance must exceed the threshold",
            ));
        }
        Ok(())
    }

    /// Output dimensions `(width, height)`.
    pub fn canvas_dims(&self) -> (usize, usize) {
        (self.canvas_width, self.canvas_height)
    }

    #[inline]
    pub(crate) fn is_foreground(&self, luminance: u8) -> bool {
        luminance <= self.threshold
    }

    /// Foreground test on an RGB triple: mean intensity at or below threshold.
    #[inline]
    pub(crate) fn is_foreground_rgb(&self, px: [u8; 3]) -> bool {
        let sum = u16::from(px[0]) + u16::from(px[1]) + u16::from(px[2]);
        sum <= 3 * u16::from(self.threshold)
    }

    /// Scaled size for a crop of `crop_width x crop_height`.
    ///
    /// The long side (relative to the inner box) is pinned to the inner box
    /// and the other side follows the crop aspect ratio, rounded to the
    /// nearest pixel and clamped to at least one pixel.
    pub(crate) fn target_size(&self, crop_width: usize, crop_height: usize) -> (usize, usize) {
        let ar = crop_width as f64 / crop_height as f64;
        if crop_width * self.inner_height > crop_height * self.inner_width {
            let height = (self.inner_width as f64 / ar).round() as usize;
            (self.inner_width, height.clamp(1, self.inner_height))
        } else {
            let width = (self.inner_height as f64 * ar).round() as usize;
            (width.clamp(1, self.inner_width), self.inner_height)
        }
    }
}
