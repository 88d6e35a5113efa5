//! Format normalisation: any supported source → one JPEG-compatible raster.
//!
//! ```text
//! Raster   ──────────────────────────────────────────▶ bytes unchanged
//! HEIC/HEIF ─▶ HeifDecoder ─▶ RawFrame ─▶ image ─┐
//! PDF      ─▶ PdfRenderer (page 0) ─▶ image ─────┴──▶ JPEG
//! ```
//!
//! The kind is resolved once from the key and matched exhaustively, so a new
//! [`DocumentKind`] cannot silently fall into the pass-through arm.
//!
//! Decoding is CPU-bound and, for pdfium, blocking FFI. [`FormatNormalizer`]
//! is cheap to clone so the orchestrator can move a copy into
//! `spawn_blocking`.

use crate::error::ReceiptError;
use crate::pipeline::encode::encode_jpeg;
use crate::pipeline::format::DocumentKind;
use crate::pipeline::heif::{self, frame_to_image, HeifDecoder};
use crate::pipeline::render::{PdfRenderer, PdfiumRenderer};
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// The only PDF page ever rendered.
pub const PDF_PAGE_INDEX: u16 = 0;

/// Dispatches source bytes to the right decoder and re-encodes to JPEG.
#[derive(Clone)]
pub struct FormatNormalizer {
    heif: Arc<dyn HeifDecoder>,
    pdf: Arc<dyn PdfRenderer>,
    jpeg_quality: u8,
}

impl FormatNormalizer {
    /// Build a normaliser from explicit capability providers.
    pub fn new(heif: Arc<dyn HeifDecoder>, pdf: Arc<dyn PdfRenderer>, jpeg_quality: u8) -> Self {
        Self {
            heif,
            pdf,
            jpeg_quality,
        }
    }

    /// Build a normaliser with the stock decoders: libheif (when compiled in)
    /// and a lazily bound pdfium.
    pub fn with_default_decoders(pdfium_lib_path: Option<PathBuf>, jpeg_quality: u8) -> Self {
        Self::new(
            heif::default_decoder(),
            Arc::new(PdfiumRenderer::new(pdfium_lib_path)),
            jpeg_quality,
        )
    }

    /// Normalise `raw` according to the suffix of `key`.
    ///
    /// Rasters are returned unmodified; the caller is trusted to have stored
    /// something the model can decode.
    pub fn normalize(&self, raw: Vec<u8>, key: &str) -> Result<Vec<u8>, ReceiptError> {
        let kind = DocumentKind::from_key(key);
        debug!("Normalising {} bytes as {}", raw.len(), kind);

        match kind {
            DocumentKind::Raster => Ok(raw),
            DocumentKind::HeicHeif => {
                let frame = self.heif.decode(&raw)?;
                let image = frame_to_image(&frame)?;
                self.to_jpeg(&image)
            }
            DocumentKind::Pdf => {
                let image = self.pdf.render_page(&raw, PDF_PAGE_INDEX)?;
                if image.width() == 0 || image.height() == 0 {
                    return Err(ReceiptError::EmptyRender {
                        width: image.width(),
                        height: image.height(),
                    });
                }
                self.to_jpeg(&image)
            }
        }
    }

    fn to_jpeg(&self, image: &DynamicImage) -> Result<Vec<u8>, ReceiptError> {
        encode_jpeg(image, self.jpeg_quality)
            .map_err(|e| ReceiptError::EncodeFailed(format!("JPEG encoding failed: {e}")))
    }
}

impl std::fmt::Debug for FormatNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatNormalizer")
            .field("heif", &"<dyn HeifDecoder>")
            .field("pdf", &"<dyn PdfRenderer>")
            .field("jpeg_quality", &self.jpeg_quality)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::heif::{PixelMode, RawFrame};
    use image::{GenericImageView, Rgba, RgbaImage};
    use std::sync::Mutex;

    struct FixedFrame(RawFrame);

    impl HeifDecoder for FixedFrame {
        fn decode(&self, _bytes: &[u8]) -> Result<RawFrame, ReceiptError> {
            Ok(self.0.clone())
        }
    }

    struct FailingHeif;

    impl HeifDecoder for FailingHeif {
        fn decode(&self, _bytes: &[u8]) -> Result<RawFrame, ReceiptError> {
            Err(ReceiptError::decode("HEIC/HEIF", "no ftyp box"))
        }
    }

    /// Renders a solid page per index and records which pages were asked for.
    struct RecordingPdf {
        calls: Mutex<Vec<u16>>,
        size: (u32, u32),
    }

    impl RecordingPdf {
        fn new(size: (u32, u32)) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                size,
            }
        }
    }

    impl PdfRenderer for RecordingPdf {
        fn render_page(&self, _pdf: &[u8], page_index: u16) -> Result<DynamicImage, ReceiptError> {
            self.calls.lock().unwrap().push(page_index);
            Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                self.size.0,
                self.size.1,
                Rgba([255, 255, 255, 255]),
            )))
        }
    }

    fn rgb_frame(width: u32, height: u32) -> RawFrame {
        RawFrame {
            mode: PixelMode::Rgb,
            width,
            height,
            stride: width as usize * 3 + 4,
            data: vec![200; (width as usize * 3 + 4) * height as usize],
        }
    }

    fn normalizer(heif: Arc<dyn HeifDecoder>, pdf: Arc<dyn PdfRenderer>) -> FormatNormalizer {
        FormatNormalizer::new(heif, pdf, 75)
    }

    #[test]
    fn raster_is_identity() {
        let n = normalizer(Arc::new(FailingHeif), Arc::new(RecordingPdf::new((1, 1))));
        let bytes = vec![0x89, b'P', b'N', b'G', 1, 2, 3];
        assert_eq!(n.normalize(bytes.clone(), "r.png").unwrap(), bytes);
        // Even garbage passes through untouched.
        assert_eq!(n.normalize(b"junk".to_vec(), "r.jpg").unwrap(), b"junk");
    }

    #[test]
    fn heic_keeps_frame_dimensions() {
        let n = normalizer(
            Arc::new(FixedFrame(rgb_frame(31, 17))),
            Arc::new(RecordingPdf::new((1, 1))),
        );
        for key in ["IMG_0001.heic", "IMG_0001.heif"] {
            let jpeg = n.normalize(b"ftyp".to_vec(), key).unwrap();
            let img = image::load_from_memory(&jpeg).expect("decodable JPEG");
            assert_eq!(img.dimensions(), (31, 17), "{key}");
        }
    }

    #[test]
    fn heic_decode_failure_propagates() {
        let n = normalizer(Arc::new(FailingHeif), Arc::new(RecordingPdf::new((1, 1))));
        let err = n.normalize(b"garbage".to_vec(), "x.heic").unwrap_err();
        assert!(matches!(err, ReceiptError::DecodeFailed { .. }));
    }

    #[test]
    fn pdf_renders_page_zero_once() {
        let pdf = Arc::new(RecordingPdf::new((612, 792)));
        let n = normalizer(Arc::new(FailingHeif), pdf.clone());
        let jpeg = n.normalize(b"%PDF-1.7".to_vec(), "scan.pdf").unwrap();

        assert_eq!(*pdf.calls.lock().unwrap(), vec![0]);
        let img = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(img.dimensions(), (612, 792));
        assert!(!img.color().has_alpha());
    }

    #[test]
    fn empty_pdf_render_is_rejected() {
        let n = normalizer(Arc::new(FailingHeif), Arc::new(RecordingPdf::new((0, 792))));
        let err = n.normalize(b"%PDF".to_vec(), "blank.pdf").unwrap_err();
        assert!(matches!(err, ReceiptError::EmptyRender { width: 0, height: 792 }));
    }

    #[test]
    fn uppercase_suffix_is_not_decoded() {
        let pdf = Arc::new(RecordingPdf::new((10, 10)));
        let n = normalizer(Arc::new(FailingHeif), pdf.clone());
        assert_eq!(n.normalize(b"%PDF".to_vec(), "SCAN.PDF").unwrap(), b"%PDF");
        assert!(pdf.calls.lock().unwrap().is_empty());
    }
}
