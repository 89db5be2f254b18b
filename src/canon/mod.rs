//! Canonicalization of raster inputs into fixed-size two-colour silhouettes.
//!
//! The pipeline is: binarize, crop to the tight foreground box, scale into the
//! inner box preserving aspect ratio (nearest-neighbour), re-binarize, then
//! paste onto a background canvas. Centering uses floor division,
//! `(canvas - content) / 2`, so an odd remainder leaves the extra pixel on the
//! right/bottom. Persisted assets depend on that placement; keep it.

mod config;

pub use config::{CanonConfig, Resample};

use crate::image::{Bitmap, BoundingBox, RasterImage};
use crate::trace::{trace_event, trace_span};
use crate::util::{SilMatchError, SilMatchResult};

/// Fixed-size bitmap holding exactly the configured foreground and
/// background luminances, with at least one foreground pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct CanonicalSilhouette {
    bitmap: Bitmap,
    aspect_ratio: f64,
    source: Option<String>,
}

impl CanonicalSilhouette {
    /// Wraps an already-canonical bitmap, e.g. one read back from storage.
    ///
    /// The bitmap is re-binarized with `config` so stray gray levels from a
    /// lossy asset collapse to the two colours. The aspect ratio is taken from
    /// the foreground bounding box.
    pub fn from_bitmap(bitmap: Bitmap, config: &CanonConfig) -> SilMatchResult<Self> {
        let bitmap = rebinarize(&bitmap, config);
        let bbox = bitmap
            .bounding_box(|v| config.is_foreground(v))
            .ok_or(SilMatchError::Degenerate { stage: "load" })?;
        Ok(Self {
            bitmap,
            aspect_ratio: aspect_of(bbox),
            source: None,
        })
    }

    /// Attaches a source identifier.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the underlying bitmap.
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Returns `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        self.bitmap.dims()
    }

    /// Width over height of the crop the silhouette was scaled from.
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Identifier of the source this silhouette was derived from, if known.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Consumes the silhouette and returns its bitmap.
    pub fn into_bitmap(self) -> Bitmap {
        self.bitmap
    }
}

/// Canonicalizer bound to a validated configuration.
#[derive(Clone, Debug)]
pub struct Canonicalizer {
    config: CanonConfig,
}

impl Canonicalizer {
    /// Creates a canonicalizer after validating `config`.
    pub fn new(config: CanonConfig) -> SilMatchResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &CanonConfig {
        &self.config
    }

    /// Converts `image` into a canonical silhouette.
    ///
    /// Fails with [`SilMatchError::Degenerate`] when the image has no
    /// foreground, or when the shape vanishes during scaling.
    pub fn canonicalize(&self, image: &RasterImage) -> SilMatchResult<CanonicalSilhouette> {
        let cfg = &self.config;
        let _span = trace_span!(
            "canonicalize",
            width = image.width(),
            height = image.height()
        )
        .entered();

        let binary = binarize(image, cfg)?;
        let bbox = binary
            .bounding_box(|v| cfg.is_foreground(v))
            .ok_or(SilMatchError::Degenerate { stage: "binarize" })?;
        let cropped = binary.crop(bbox)?;
        let mut content = self.fit(&cropped)?;

        if cfg.settle {
            let inner = content
                .bounding_box(|v| cfg.is_foreground(v))
                .ok_or(SilMatchError::Degenerate { stage: "scale" })?;
            if (inner.width(), inner.height()) != content.dims() {
                content = self.fit(&content.crop(inner)?)?;
            }
        }

        let mut canvas = Bitmap::filled(cfg.canvas_width, cfg.canvas_height, cfg.background)?;
        let x = (cfg.canvas_width - content.width()) / 2;
        let y = (cfg.canvas_height - content.height()) / 2;
        canvas.paste(&content, x, y)?;

        trace_event!(
            "canonicalized",
            crop_width = bbox.width(),
            crop_height = bbox.height(),
            content_width = content.width(),
            content_height = content.height()
        );

        if canvas.data().iter().all(|&v| v == cfg.background) {
            return Err(SilMatchError::Degenerate { stage: "scale" });
        }

        Ok(CanonicalSilhouette {
            bitmap: canvas,
            aspect_ratio: aspect_of(bbox),
            source: None,
        })
    }

    fn fit(&self, cropped: &Bitmap) -> SilMatchResult<Bitmap> {
        let (width, height) = self.config.target_size(cropped.width(), cropped.height());
        let resized = match self.config.resample {
            Resample::Nearest => cropped.resize_nearest(width, height)?,
        };
        Ok(rebinarize(&resized, &self.config))
    }
}

/// Canonicalizes `image` with `config`.
///
/// Shorthand for `Canonicalizer::new(config.clone())?.canonicalize(image)`.
pub fn canonicalize(image: &RasterImage, config: &CanonConfig) -> SilMatchResult<CanonicalSilhouette> {
    Canonicalizer::new(config.clone())?.canonicalize(image)
}

/// Maps every pixel to foreground or background by mean channel intensity.
pub fn binarize(image: &RasterImage, config: &CanonConfig) -> SilMatchResult<Bitmap> {
    let data = image
        .pixels()
        .iter()
        .map(|&px| {
            if config.is_foreground_rgb(px) {
                config.foreground
            } else {
                config.background
            }
        })
        .collect();
    Bitmap::from_vec(data, image.width(), image.height())
}

fn rebinarize(bitmap: &Bitmap, config: &CanonConfig) -> Bitmap {
    bitmap.map(|v| {
        if config.is_foreground(v) {
            config.foreground
        } else {
            config.background
        }
    })
}

fn aspect_of(bbox: BoundingBox) -> f64 {
    bbox.width() as f64 / bbox.height() as f64
}

#[cfg(test)]
mod tests {
    use super::{binarize, canonicalize, CanonConfig};
    use crate::image::RasterImage;
    use crate::util::SilMatchError;

    fn rect_image(width: usize, height: usize, x0: usize, y0: usize, w: usize, h: usize) -> RasterImage {
        let mut data = vec![255u8; width * height];
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                data[y * width + x] = 0;
            }
        }
        RasterImage::from_gray(&data, width, height).unwrap()
    }

    #[test]
    fn binarize_is_idempotent() {
        let cfg = CanonConfig::default();
        let data: Vec<u8> = (0..64u32).map(|i| (i * 4) as u8).collect();
        let img = RasterImage::from_gray(&data, 8, 8).unwrap();
        let once = binarize(&img, &cfg).unwrap();
        let twice = binarize(&RasterImage::from(&once), &cfg).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn blank_image_is_degenerate() {
        let img = RasterImage::from_gray(&[255u8; 2500], 50, 50).unwrap();
        let err = canonicalize(&img, &CanonConfig::default()).unwrap_err();
        assert_eq!(err, SilMatchError::Degenerate { stage: "binarize" });
        assert!(err.is_degenerate());
    }

    #[test]
    fn wide_rectangle_is_centered_with_floor_offsets() {
        // 40x13 crop -> 98 x round(98 * 13 / 40) = 98 x 32, offsets (1, 34)
        let img = rect_image(64, 32, 5, 7, 40, 13);
        let sil = canonicalize(&img, &CanonConfig::default()).unwrap();
        let bmp = sil.bitmap();
        assert_eq!(bmp.dims(), (100, 100));
        let bbox = bmp.bounding_box(|v| v == 0).unwrap();
        assert_eq!((bbox.x0, bbox.y0), (1, 34));
        assert_eq!((bbox.width(), bbox.height()), (98, 32));
        assert!((sil.aspect_ratio() - 40.0 / 13.0).abs() < 1e-12);
    }

    #[test]
    fn odd_remainder_biases_toward_top_left() {
        // 3x1 crop -> 98x33; (100 - 33) / 2 = 33 rows above, 34 below
        let img = rect_image(10, 10, 2, 4, 3, 1);
        let sil = canonicalize(&img, &CanonConfig::default()).unwrap();
        let bbox = sil.bitmap().bounding_box(|v| v == 0).unwrap();
        assert_eq!(bbox.y0, 33);
        assert_eq!(100 - 1 - bbox.y1, 34);
    }

    /// 196x196 crop: a one-pixel line in column 0 and a block over columns
    /// 3..=195. Halving samples odd columns only, so the scaled content has an
    /// empty first column.
    fn skipped_edge_image() -> RasterImage {
        let size = 196;
        let mut data = vec![255u8; size * size];
        for y in 0..size {
            data[y * size] = 0;
            for x in 3..size {
                data[y * size + x] = 0;
            }
        }
        RasterImage::from_gray(&data, size, size).unwrap()
    }

    #[test]
    fn single_pass_keeps_the_skipped_edge() {
        let cfg = CanonConfig {
            settle: false,
            ..CanonConfig::default()
        };
        let sil = canonicalize(&skipped_edge_image(), &cfg).unwrap();
        // 98x98 content at offset (1, 1); its first column came out empty.
        let bbox = sil.bitmap().bounding_box(|v| v == 0).unwrap();
        assert_eq!((bbox.x0, bbox.y0, bbox.x1, bbox.y1), (2, 1, 98, 98));
        assert_eq!(sil.aspect_ratio(), 1.0);

        // Not a fixed point: the second run re-centres the 97-wide content.
        let again = canonicalize(&RasterImage::from(sil.bitmap()), &cfg).unwrap();
        let bbox = again.bitmap().bounding_box(|v| v == 0).unwrap();
        assert_eq!((bbox.x0, bbox.x1), (1, 97));
    }

    #[test]
    fn settle_refits_after_a_skipped_edge() {
        let cfg = CanonConfig::default();
        let sil = canonicalize(&skipped_edge_image(), &cfg).unwrap();
        // Re-cropped to 97x98 and centred with (100 - 97) / 2 = 1.
        let bbox = sil.bitmap().bounding_box(|v| v == 0).unwrap();
        assert_eq!((bbox.x0, bbox.y0, bbox.x1, bbox.y1), (1, 1, 97, 98));
        assert_eq!(sil.aspect_ratio(), 1.0);

        let again = canonicalize(&RasterImage::from(sil.bitmap()), &cfg).unwrap();
        assert_eq!(again.bitmap(), sil.bitmap());
    }

    #[test]
    fn invalid_config_is_rejected_before_work() {
        let img = rect_image(4, 4, 1, 1, 2, 2);
        let cfg = CanonConfig {
            inner_height: 0,
            ..CanonConfig::default()
        };
        assert!(matches!(
            canonicalize(&img, &cfg),
            Err(SilMatchError::InvalidConfig(_))
        ));
    }
}
