//! HEIC/HEIF decoding: container bytes → raw interleaved frame → raster.
//!
//! The decoder hands back the raw parameters of the primary frame (pixel
//! mode, dimensions, row stride, pixel buffer) rather than a ready image.
//! Decoders commonly pad rows for alignment, so [`frame_to_image`] walks the
//! buffer by stride and rejects frames whose buffer cannot hold every row.
//!
//! The real decoder links against libheif and is only compiled with the
//! `heif` feature, which the `lambda` build enables. Without it, [`default_decoder`] returns a decoder that
//! fails every call, which the pipeline treats like any malformed payload.

use crate::error::ReceiptError;
use image::{DynamicImage, RgbImage, RgbaImage};
use std::sync::Arc;

const KIND: &str = "HEIC/HEIF";

/// Channel layout of a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMode {
    Rgb,
    Rgba,
}

impl PixelMode {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelMode::Rgb => 3,
            PixelMode::Rgba => 4,
        }
    }
}

/// The primary frame of a HEIC/HEIF container, as raw interleaved samples.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub mode: PixelMode,
    pub width: u32,
    pub height: u32,
    /// Bytes between the starts of consecutive rows (≥ `width * bpp`).
    pub stride: usize,
    pub data: Vec<u8>,
}

/// Capability: decode HEIC/HEIF container bytes into a raw frame.
pub trait HeifDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<RawFrame, ReceiptError>;
}

/// Rebuild a raster image from raw frame parameters.
pub fn frame_to_image(frame: &RawFrame) -> Result<DynamicImage, ReceiptError> {
    let bpp = frame.mode.bytes_per_pixel();
    let width = frame.width as usize;
    let height = frame.height as usize;
    let row_len = width * bpp;

    if width == 0 || height == 0 {
        return Err(ReceiptError::decode(
            KIND,
            format!("frame has no pixels ({}x{})", frame.width, frame.height),
        ));
    }
    if frame.stride < row_len {
        return Err(ReceiptError::decode(
            KIND,
            format!("stride {} shorter than row of {row_len} bytes", frame.stride),
        ));
    }
    let needed = frame.stride * (height - 1) + row_len;
    if frame.data.len() < needed {
        return Err(ReceiptError::decode(
            KIND,
            format!(
                "pixel buffer holds {} bytes, {}x{} at stride {} needs {needed}",
                frame.data.len(),
                frame.width,
                frame.height,
                frame.stride
            ),
        ));
    }

    let mut packed = Vec::with_capacity(row_len * height);
    for row in frame.data.chunks(frame.stride).take(height) {
        packed.extend_from_slice(&row[..row_len]);
    }

    let image = match frame.mode {
        PixelMode::Rgb => {
            RgbImage::from_raw(frame.width, frame.height, packed).map(DynamicImage::ImageRgb8)
        }
        PixelMode::Rgba => {
            RgbaImage::from_raw(frame.width, frame.height, packed).map(DynamicImage::ImageRgba8)
        }
    };
    image.ok_or_else(|| ReceiptError::decode(KIND, "pixel buffer does not match dimensions"))
}

/// The decoder used when none is injected.
pub fn default_decoder() -> Arc<dyn HeifDecoder> {
    #[cfg(feature = "heif")]
    {
        Arc::new(LibHeifDecoder)
    }
    #[cfg(not(feature = "heif"))]
    {
        Arc::new(UnsupportedHeifDecoder)
    }
}

/// Placeholder used when the crate is built without the `heif` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedHeifDecoder;

impl HeifDecoder for UnsupportedHeifDecoder {
    fn decode(&self, _bytes: &[u8]) -> Result<RawFrame, ReceiptError> {
        Err(ReceiptError::decode(
            KIND,
            "HEIC/HEIF support not compiled in (enable the `heif` feature)",
        ))
    }
}

/// libheif-backed decoder for the primary image of a container.
#[cfg(feature = "heif")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LibHeifDecoder;

#[cfg(feature = "heif")]
impl HeifDecoder for LibHeifDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RawFrame, ReceiptError> {
        use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

        let lib_heif = LibHeif::new();
        let ctx = HeifContext::read_from_bytes(bytes)
            .map_err(|e| ReceiptError::decode(KIND, e.to_string()))?;
        let handle = ctx
            .primary_image_handle()
            .map_err(|e| ReceiptError::decode(KIND, e.to_string()))?;

        let (mode, chroma) = if handle.has_alpha_channel() {
            (PixelMode::Rgba, RgbChroma::Rgba)
        } else {
            (PixelMode::Rgb, RgbChroma::Rgb)
        };

        let image = lib_heif
            .decode(&handle, ColorSpace::Rgb(chroma), None)
            .map_err(|e| ReceiptError::decode(KIND, e.to_string()))?;
        let planes = image.planes();
        let plane = planes
            .interleaved
            .ok_or_else(|| ReceiptError::decode(KIND, "decoder returned no interleaved plane"))?;

        Ok(RawFrame {
            mode,
            width: plane.width,
            height: plane.height,
            stride: plane.stride,
            data: plane.data.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    #[test]
    fn padded_rows_are_unpacked() {
        // 2x2 RGB with 2 padding bytes per row.
        let frame = RawFrame {
            mode: PixelMode::Rgb,
            width: 2,
            height: 2,
            stride: 8,
            data: vec![
                1, 2, 3, 4, 5, 6, 0xEE, 0xEE, //
                7, 8, 9, 10, 11, 12, 0xEE, 0xEE,
            ],
        };
        let img = frame_to_image(&frame).unwrap();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(
            img.to_rgb8().into_raw(),
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]
        );
    }

    #[test]
    fn last_row_may_omit_padding() {
        let frame = RawFrame {
            mode: PixelMode::Rgba,
            width: 1,
            height: 2,
            stride: 8,
            data: vec![1, 2, 3, 4, 0, 0, 0, 0, 5, 6, 7, 8],
        };
        let img = frame_to_image(&frame).unwrap();
        assert_eq!(img.to_rgba8().into_raw(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn short_buffer_is_a_decode_failure() {
        let frame = RawFrame {
            mode: PixelMode::Rgb,
            width: 4,
            height: 4,
            stride: 12,
            data: vec![0; 20],
        };
        assert!(matches!(
            frame_to_image(&frame),
            Err(ReceiptError::DecodeFailed { kind: "HEIC/HEIF", .. })
        ));
    }

    #[test]
    fn stride_shorter_than_row_is_rejected() {
        let frame = RawFrame {
            mode: PixelMode::Rgba,
            width: 4,
            height: 1,
            stride: 8,
            data: vec![0; 16],
        };
        assert!(frame_to_image(&frame).is_err());
    }

    #[test]
    fn zero_sized_frame_is_rejected() {
        let frame = RawFrame {
            mode: PixelMode::Rgb,
            width: 0,
            height: 3,
            stride: 0,
            data: vec![],
        };
        assert!(frame_to_image(&frame).is_err());
    }

    #[cfg(not(feature = "heif"))]
    #[test]
    fn default_decoder_without_feature_fails() {
        let err = default_decoder().decode(b"\0\0\0\x18ftypheic").unwrap_err();
        assert!(err.to_string().contains("heif"), "got: {err}");
    }

    #[cfg(feature = "heif")]
    #[test]
    fn default_decoder_is_libheif_when_enabled() {
        let err = default_decoder().decode(b"\0\0\0\x18ftypheic").unwrap_err();
        assert!(matches!(err, ReceiptError::DecodeFailed { kind: "HEIC/HEIF", .. }));
        assert!(!err.to_string().contains("not compiled in"), "got: {err}");
    }

    #[cfg(feature = "heif")]
    #[test]
    fn libheif_rejects_garbage() {
        assert!(LibHeifDecoder.decode(b"definitely not a heic container").is_err());
    }
}
