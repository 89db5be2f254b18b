//! Decoding helpers built on the `image` and `base64` crates.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{Bitmap, RasterImage};
use crate::util::{SilMatchError, SilMatchResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

/// Converts a decoded image into a raster, compositing alpha over white.
pub fn raster_from_dynamic(img: &image::DynamicImage) -> SilMatchResult<RasterImage> {
    let rgba = img.to_rgba8();
    RasterImage::from_rgba(rgba.as_raw(), rgba.width() as usize, rgba.height() as usize)
}

/// Decodes an in-memory encoded image (PNG or JPEG).
pub fn decode_image_bytes(bytes: &[u8]) -> SilMatchResult<RasterImage> {
    let img = image::load_from_memory(bytes).map_err(|err| SilMatchError::ImageLoad {
        reason: err.to_string(),
    })?;
    raster_from_dynamic(&img)
}

/// Loads and decodes an image file.
pub fn load_image<P: AsRef<Path>>(path: P) -> SilMatchResult<RasterImage> {
    let img = image::open(path).map_err(|err| SilMatchError::ImageLoad {
        reason: err.to_string(),
    })?;
    raster_from_dynamic(&img)
}

/// Decodes a base64 image payload such as a browser `data:` URL.
///
/// Everything up to and including the first comma is treated as a header and
/// discarded; a payload without a comma is decoded whole.
pub fn decode_data_url(payload: &str) -> SilMatchResult<RasterImage> {
    let encoded = match payload.split_once(',') {
        Some((_, body)) => body,
        None => payload,
    };
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|err| SilMatchError::ImageLoad {
            reason: format!("base64: {err}"),
        })?;
    decode_image_bytes(&bytes)
}

/// Copies a bitmap into a grayscale image buffer.
pub fn gray_image_from_bitmap(bitmap: &Bitmap) -> SilMatchResult<image::GrayImage> {
    let (width, height) = bitmap.dims();
    image::GrayImage::from_raw(width as u32, height as u32, bitmap.data().to_vec()).ok_or(
        SilMatchError::InvalidDimensions { width, height },
    )
}

#[cfg(test)]
mod tests {
    use super::{decode_data_url, decode_image_bytes, gray_image_from_bitmap};
    use crate::image::Bitmap;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let bmp = Bitmap::from_vec(vec![0, 255, 255, 0], 2, 2).unwrap();
        let gray = gray_image_from_bitmap(&bmp).unwrap();
        let mut out = Cursor::new(Vec::new());
        gray.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_data_url_with_header() {
        let url = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes()));
        let img = decode_data_url(&url).unwrap();
        assert_eq!((img.width(), img.height()), (2, 2));
        assert_eq!(img.get(0, 0), Some([0, 0, 0]));
        assert_eq!(img.get(1, 0), Some([255, 255, 255]));
    }

    #[test]
    fn decodes_bare_base64() {
        let img = decode_data_url(&STANDARD.encode(png_bytes())).unwrap();
        assert_eq!(img.get(1, 1), Some([0, 0, 0]));
    }

    #[test]
    fn garbage_is_an_image_load_error() {
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
        assert!(decode_image_bytes(b"not an image").is_err());
    }
}
