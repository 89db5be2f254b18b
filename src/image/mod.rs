//! Raster inputs and binary bitmaps.
//!
//! `RasterImage` is the decoded, immutable colour input handed to the
//! canonicalizer. Pixels are stored row-major as RGB triples; grayscale and
//! RGBA sources are expanded or composited into that layout on construction.
//! `Bitmap` is the single-channel luminance grid the pipeline works on.

use crate::util::{SilMatchError, SilMatchResult};

mod bitmap;
#[cfg(feature = "image-io")]
pub mod io;

pub use bitmap::{Bitmap, BoundingBox};

/// Decoded colour image, row-major RGB.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    pixels: Vec<[u8; 3]>,
    width: usize,
    height: usize,
}

impl RasterImage {
    /// Creates an image from RGB triples.
    pub fn from_pixels(pixels: Vec<[u8; 3]>, width: usize, height: usize) -> SilMatchResult<Self> {
        let needed = required_len(width, height)?;
        if pixels.len() < needed {
            return Err(SilMatchError::BufferTooSmall {
                needed,
                got: pixels.len(),
            });
        }
        if pixels.len() > needed {
            return Err(SilMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Creates an image from an interleaved `RGBRGB...` buffer.
    pub fn from_rgb(data: &[u8], width: usize, height: usize) -> SilMatchResult<Self> {
        let needed = required_len(width, height)?.saturating_mul(3);
        check_len(data.len(), needed, width, height)?;
        let pixels = data.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Self::from_pixels(pixels, width, height)
    }

    /// Creates an image from an interleaved `RGBA` buffer.
    ///
    /// Each pixel is composited over white, so a transparent canvas with dark
    /// strokes reads as dark-on-light.
    pub fn from_rgba(data: &[u8], width: usize, height: usize) -> SilMatchResult<Self> {
        let needed = required_len(width, height)?.saturating_mul(4);
        check_len(data.len(), needed, width, height)?;
        let pixels = data
            .chunks_exact(4)
            .map(|c| {
                let alpha = u32::from(c[3]);
                let over_white =
                    |v: u8| ((u32::from(v) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
                [over_white(c[0]), over_white(c[1]), over_white(c[2])]
            })
            .collect();
        Self::from_pixels(pixels, width, height)
    }

    /// Creates an image from single-channel intensities.
    pub fn from_gray(data: &[u8], width: usize, height: usize) -> SilMatchResult<Self> {
        let pixels = data.iter().map(|&v| [v, v, v]).collect();
        Self::from_pixels(pixels, width, height)
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns all pixels in row-major order.
    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.pixels
    }

    /// Returns the pixel at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }
}

impl From<&Bitmap> for RasterImage {
    fn from(bitmap: &Bitmap) -> Self {
        Self {
            pixels: bitmap.data().iter().map(|&v| [v, v, v]).collect(),
            width: bitmap.width(),
            height: bitmap.height(),
        }
    }
}

fn check_len(got: usize, needed: usize, width: usize, height: usize) -> SilMatchResult<()> {
    if got < needed {
        return Err(SilMatchError::BufferTooSmall { needed, got });
    }
    if got > needed {
        return Err(SilMatchError::InvalidDimensions { width, height });
    }
    Ok(())
}

pub(crate) fn required_len(width: usize, height: usize) -> SilMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(SilMatchError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(SilMatchError::InvalidDimensions { width, height })
}
