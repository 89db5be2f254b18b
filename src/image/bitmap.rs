//! Owned single-channel bitmap and the geometric helpers the pipeline needs.
//!
//! Resampling is nearest-neighbour with pixel-centre alignment:
//! `src = floor((dst + 0.5) * src_len / dst_len)`, evaluated in integers so
//! it never produces a value that was not already present in the source.

use crate::image::required_len;
use crate::util::{SilMatchError, SilMatchResult};

/// Inclusive axis-aligned pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    /// Leftmost column.
    pub x0: usize,
    /// Topmost row.
    pub y0: usize,
    /// Rightmost column (inclusive).
    pub x1: usize,
    /// Bottom row (inclusive).
    pub y1: usize,
}

impl BoundingBox {
    /// Returns the box width in pixels.
    pub fn width(&self) -> usize {
        self.x1 - self.x0 + 1
    }

    /// Returns the box height in pixels.
    pub fn height(&self) -> usize {
        self.y1 - self.y0 + 1
    }
}

/// Owned contiguous luminance grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl Bitmap {
    /// Creates a bitmap from a row-major buffer of exactly `width * height` values.
    pub fn from_vec(data: Vec<u8>, width: usize, height: usize) -> SilMatchResult<Self> {
        let needed = required_len(width, height)?;
        if data.len() < needed {
            return Err(SilMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(SilMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates a bitmap with every pixel set to `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> SilMatchResult<Self> {
        let len = required_len(width, height)?;
        Ok(Self {
            data: vec![value; len],
            width,
            height,
        })
    }

    /// Returns the width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the row-major pixel buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the value at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Returns row `y`.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }

    /// Applies `f` to every pixel, producing a bitmap of the same size.
    pub fn map(&self, f: impl Fn(u8) -> u8) -> Self {
        Self {
            data: self.data.iter().map(|&v| f(v)).collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Tight bounding box of the pixels matching `is_foreground`, or `None`
    /// when no pixel matches.
    pub fn bounding_box(&self, is_foreground: impl Fn(u8) -> bool) -> Option<BoundingBox> {
        let mut bbox: Option<BoundingBox> = None;
        for (y, row) in self.data.chunks_exact(self.width).enumerate() {
            let first = row.iter().position(|&v| is_foreground(v));
            let last = row.iter().rposition(|&v| is_foreground(v));
            if let (Some(first), Some(last)) = (first, last) {
                bbox = Some(match bbox {
                    None => BoundingBox {
                        x0: first,
                        y0: y,
                        x1: last,
                        y1: y,
                    },
                    Some(b) => BoundingBox {
                        x0: b.x0.min(first),
                        y0: b.y0,
                        x1: b.x1.max(last),
                        y1: y,
                    },
                });
            }
        }
        bbox
    }

    /// Copies the pixels inside `bbox` into a new bitmap.
    pub fn crop(&self, bbox: BoundingBox) -> SilMatchResult<Self> {
        if bbox.x0 > bbox.x1 || bbox.y0 > bbox.y1 || bbox.x1 >= self.width || bbox.y1 >= self.height
        {
            return Err(SilMatchError::InvalidDimensions {
                width: bbox.x1.saturating_sub(bbox.x0).saturating_add(1),
                height: bbox.y1.saturating_sub(bbox.y0).saturating_add(1),
            });
        }
        let width = bbox.width();
        let mut data = Vec::with_capacity(width * bbox.height());
        for row in self.data.chunks_exact(self.width).take(bbox.y1 + 1).skip(bbox.y0) {
            data.extend_from_slice(&row[bbox.x0..=bbox.x1]);
        }
        Self::from_vec(data, width, bbox.height())
    }

    /// Nearest-neighbour resample to `width x height`.
    pub fn resize_nearest(&self, width: usize, height: usize) -> SilMatchResult<Self> {
        let len = required_len(width, height)?;
        let src_x: Vec<usize> = (0..width)
            .map(|x| nearest_index(x, width, self.width))
            .collect();
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            let sy = nearest_index(y, height, self.height);
            let row = &self.data[sy * self.width..(sy + 1) * self.width];
            data.extend(src_x.iter().map(|&sx| row[sx]));
        }
        Self::from_vec(data, width, height)
    }

    /// Writes `src` into this bitmap with its top-left corner at `(x, y)`.
    ///
    /// Fails when `src` does not fit entirely inside the destination.
    pub fn paste(&mut self, src: &Bitmap, x: usize, y: usize) -> SilMatchResult<()> {
        if x + src.width > self.width || y + src.height > self.height {
            return Err(SilMatchError::DimensionMismatch {
                expected: (self.width, self.height),
                got: (x + src.width, y + src.height),
            });
        }
        for (sy, row) in src.data.chunks_exact(src.width).enumerate() {
            let start = (y + sy) * self.width + x;
            self.data[start..start + src.width].copy_from_slice(row);
        }
        Ok(())
    }
}

fn nearest_index(dst: usize, dst_len: usize, src_len: usize) -> usize {
    let idx = ((2 * dst + 1) * src_len) / (2 * dst_len);
    idx.min(src_len - 1)
}

#[cfg(test)]
mod tests {
    use super::{Bitmap, BoundingBox};

    fn grid(rows: &[&str]) -> Bitmap {
        let width = rows[0].len();
        let data = rows
            .iter()
            .flat_map(|r| r.bytes().map(|b| if b == b'#' { 0 } else { 255 }))
            .collect();
        Bitmap::from_vec(data, width, rows.len()).unwrap()
    }

    #[test]
    fn bounding_box_is_inclusive_and_tight() {
        let bmp = grid(&["....", ".#..", "..#.", "...."]);
        let bbox = bmp.bounding_box(|v| v == 0).unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                x0: 1,
                y0: 1,
                x1: 2,
                y1: 2
            }
        );
        assert_eq!((bbox.width(), bbox.height()), (2, 2));
        assert!(grid(&["..", ".."]).bounding_box(|v| v == 0).is_none());
    }

    #[test]
    fn crop_keeps_both_edges() {
        let bmp = grid(&["....", ".##.", ".#..", "...."]);
        let bbox = bmp.bounding_box(|v| v == 0).unwrap();
        let cropped = bmp.crop(bbox).unwrap();
        assert_eq!(cropped.dims(), (2, 2));
        assert_eq!(cropped.data(), &[0, 0, 0, 255]);
    }

    #[test]
    fn nearest_upscale_replicates_pixels() {
        let bmp = Bitmap::from_vec(vec![0, 255], 2, 1).unwrap();
        let up = bmp.resize_nearest(4, 2).unwrap();
        assert_eq!(up.row(0).unwrap(), &[0, 0, 255, 255]);
        assert_eq!(up.row(1).unwrap(), &[0, 0, 255, 255]);
    }

    #[test]
    fn nearest_never_invents_values() {
        let data: Vec<u8> = (0..35).map(|i| if i % 3 == 0 { 0 } else { 255 }).collect();
        let bmp = Bitmap::from_vec(data, 7, 5).unwrap();
        for (w, h) in [(3, 2), (11, 13), (1, 1)] {
            let out = bmp.resize_nearest(w, h).unwrap();
            assert!(out.data().iter().all(|&v| v == 0 || v == 255));
        }
    }

    #[test]
    fn paste_rejects_overflow() {
        let mut canvas = Bitmap::filled(3, 3, 255).unwrap();
        let patch = Bitmap::filled(2, 2, 0).unwrap();
        canvas.paste(&patch, 1, 1).unwrap();
        assert_eq!(canvas.row(2).unwrap(), &[255, 0, 0]);
        assert!(canvas.paste(&patch, 2, 0).is_err());
    }
}
