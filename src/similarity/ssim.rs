//! Windowed structural similarity (SSIM) between equal-size bitmaps.
//!
//! Matches the scikit-image defaults: a uniform `7x7` window, `K1 = 0.01`,
//! `K2 = 0.03`, data range 255 and sample covariance (`n / (n - 1)`). Only
//! windows lying fully inside the image contribute to the mean.
//!
//! Window sums come from integer summed-area tables, so the per-window
//! statistics are exact and the score is bit-for-bit symmetric in its
//! arguments.

use crate::image::Bitmap;
use crate::util::{SilMatchError, SilMatchResult};

/// SSIM parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SsimConfig {
    /// Side of the square sliding window; odd and at least 3.
    pub window: usize,
    /// Luminance stabilizer coefficient.
    pub k1: f64,
    /// Contrast/structure stabilizer coefficient.
    pub k2: f64,
    /// Dynamic range of the pixel values.
    pub data_range: f64,
    /// Use the unbiased (`n - 1`) variance estimate.
    pub sample_covariance: bool,
}

impl Default for SsimConfig {
    fn default() -> Self {
        Self {
            window: 7,
            k1: 0.01,
            k2: 0.03,
            data_range: 255.0,
            sample_covariance: true,
        }
    }
}

impl SsimConfig {
    /// Checks the window and constants.
    pub fn validate(&self) -> SilMatchResult<()> {
        if self.window < 3 || self.window % 2 == 0 {
            return Err(SilMatchError::InvalidConfig(
                "ssim window must be odd and at least 3",
            ));
        }
        if !(self.k1 > 0.0 && self.k2 > 0.0 && self.data_range > 0.0) {
            return Err(SilMatchError::InvalidConfig(
                "ssim constants must be positive",
            ));
        }
        Ok(())
    }
}

/// Summed-area table with a zero first row and column.
struct Integral {
    sums: Vec<u64>,
    stride: usize,
}

impl Integral {
    fn build(width: usize, height: usize, value: impl Fn(usize) -> u64) -> Self {
        let stride = width + 1;
        let mut sums = vec![0u64; stride * (height + 1)];
        for y in 0..height {
            let mut row_sum = 0u64;
            for x in 0..width {
                row_sum += value(y * width + x);
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_sum;
            }
        }
        Self { sums, stride }
    }

    /// Sum over the `size x size` window with top-left corner `(x, y)`.
    #[inline]
    fn window(&self, x: usize, y: usize, size: usize) -> u64 {
        let s = self.stride;
        let a = self.sums[y * s + x];
        let b = self.sums[y * s + x + size];
        let c = self.sums[(y + size) * s + x];
        let d = self.sums[(y + size) * s + x + size];
        d + a - b - c
    }
}

/// Mean SSIM of `a` against `b`, in `[-1, 1]`.
///
/// Fails with [`SilMatchError::DimensionMismatch`] when the bitmaps differ in
/// size and with [`SilMatchError::InvalidConfig`] when the window does not
/// fit inside them.
pub fn ssim(a: &Bitmap, b: &Bitmap, cfg: &SsimConfig) -> SilMatchResult<f64> {
    cfg.validate()?;
    if a.dims() != b.dims() {
        return Err(SilMatchError::DimensionMismatch {
            expected: a.dims(),
            got: b.dims(),
        });
    }
    let (width, height) = a.dims();
    let win = cfg.window;
    if win > width || win > height {
        return Err(SilMatchError::InvalidConfig(
            "ssim window larger than the bitmap",
        ));
    }

    let da = a.data();
    let db = b.data();
    let sum_a = Integral::build(width, height, |i| u64::from(da[i]));
    let sum_b = Integral::build(width, height, |i| u64::from(db[i]));
    let sum_aa = Integral::build(width, height, |i| u64::from(da[i]) * u64::from(da[i]));
    let sum_bb = Integral::build(width, height, |i| u64::from(db[i]) * u64::from(db[i]));
    let sum_ab = Integral::build(width, height, |i| u64::from(da[i]) * u64::from(db[i]));

    let n = (win * win) as f64;
    let cov_norm = if cfg.sample_covariance {
        n / (n - 1.0)
    } else {
        1.0
    };
    let c1 = (cfg.k1 * cfg.data_range).powi(2);
    let c2 = (cfg.k2 * cfg.data_range).powi(2);

    let mut total = 0.0f64;
    let mut count = 0usize;
    for y in 0..=(height - win) {
        for x in 0..=(width - win) {
            let ux = sum_a.window(x, y, win) as f64 / n;
            let uy = sum_b.window(x, y, win) as f64 / n;
            let uxx = sum_aa.window(x, y, win) as f64 / n;
            let uyy = sum_bb.window(x, y, win) as f64 / n;
            let uxy = sum_ab.window(x, y, win) as f64 / n;

            let vx = cov_norm * (uxx - ux * ux);
            let vy = cov_norm * (uyy - uy * uy);
            let vxy = cov_norm * (uxy - ux * uy);

            let num = (2.0 * (ux * uy) + c1) * (2.0 * vxy + c2);
            let den = (ux * ux + uy * uy + c1) * (vx + vy + c2);
            total += num / den;
            count += 1;
        }
    }

    Ok(total / count as f64)
}
