//! Image encoding: `DynamicImage` → baseline JPEG bytes → base64 text.
//!
//! The inference envelope declares `image/jpeg` for every request, so every
//! decoded source (HEIC frame, PDF page) is re-encoded to JPEG here. Raster
//! uploads skip the JPEG step and are only base64-wrapped.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode an image as JPEG at the given quality.
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality);
    rgb.write_with_encoder(encoder)?;

    debug!(
        "Encoded {}x{} image → {} bytes JPEG (q={})",
        rgb.width(),
        rgb.height(),
        buf.len(),
        quality
    );
    Ok(buf)
}

/// Base64-encode raster bytes for the `data` field of the image block.
pub fn encode_base64(bytes: &[u8]) -> String {
    let b64 = STANDARD.encode(bytes);
    debug!("Encoded image → {} bytes base64", b64.len());
    b64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    #[test]
    fn encode_small_image_as_jpeg() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 7, Rgba([255, 0, 0, 128])));
        let jpeg = encode_jpeg(&img, 75).expect("encode should succeed");
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "JPEG SOI marker");

        let decoded = image::load_from_memory(&jpeg).expect("decodable");
        assert_eq!(decoded.dimensions(), (10, 7));
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn base64_is_standard_alphabet_with_padding() {
        assert_eq!(encode_base64(b"\xff\xd8\xff"), "/9j/");
        assert_eq!(encode_base64(b"ab"), "YWI=");
        let decoded = STANDARD.decode(encode_base64(b"receipt")).expect("valid base64");
        assert_eq!(decoded, b"receipt");
    }
}
