//! PDF rasterisation: render a page of an in-memory PDF via pdfium.
//!
//! Only page index 0 is ever requested by the normaliser. Pages beyond the
//! first are counted for the log line and otherwise left untouched.
//!
//! ## Binding
//!
//! pdfium is a shared library loaded at runtime. [`PdfiumRenderer`] binds it
//! on first use and keeps the handle for the life of the process, so warm
//! invocations skip the `dlopen` and non-PDF invocations never need the
//! library at all.
//!
//! ## Resolution
//!
//! Pages render at scale 1.0, one pixel per PDF point (72 DPI). The bitmap is
//! filled white before drawing and its alpha channel is dropped by the JPEG
//! encoder downstream.

use crate::error::ReceiptError;
use image::DynamicImage;
use once_cell::sync::OnceCell;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info, warn};

const KIND: &str = "PDF";

/// Capability: rasterise one page of a PDF held in memory.
pub trait PdfRenderer: Send + Sync {
    fn render_page(&self, pdf_bytes: &[u8], page_index: u16) -> Result<DynamicImage, ReceiptError>;
}

/// pdfium-backed renderer with a lazily bound library handle.
pub struct PdfiumRenderer {
    lib_path: Option<PathBuf>,
    pdfium: OnceCell<Pdfium>,
}

impl PdfiumRenderer {
    /// Bind to the library at `lib_path` on first use, or to the system
    /// library when `None`.
    pub fn new(lib_path: Option<PathBuf>) -> Self {
        Self {
            lib_path,
            pdfium: OnceCell::new(),
        }
    }

    fn pdfium(&self) -> Result<&Pdfium, ReceiptError> {
        self.pdfium.get_or_try_init(|| {
            let bindings = match &self.lib_path {
                Some(path) => {
                    info!("Binding pdfium from {}", path.display());
                    Pdfium::bind_to_library(path)
                }
                None => Pdfium::bind_to_system_library(),
            }
            .map_err(|e| ReceiptError::PdfiumBindingFailed(format!("{e:?}")))?;
            Ok(Pdfium::new(bindings))
        })
    }
}

impl std::fmt::Debug for PdfiumRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfiumRenderer")
            .field("lib_path", &self.lib_path)
            .field("bound", &self.pdfium.get().is_some())
            .finish()
    }
}

impl PdfRenderer for PdfiumRenderer {
    fn render_page(&self, pdf_bytes: &[u8], page_index: u16) -> Result<DynamicImage, ReceiptError> {
        let pdfium = self.pdfium()?;

        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| ReceiptError::decode(KIND, format!("{e:?}")))?;

        let pages = document.pages();
        let total_pages = pages.len();
        if total_pages > page_index.saturating_add(1) {
            warn!(
                "PDF has {} pages; rendering page {} only",
                total_pages,
                page_index + 1
            );
        }

        let page = pages.get(page_index).map_err(|e| {
            ReceiptError::decode(
                KIND,
                format!("page {page_index} unavailable ({total_pages} pages): {e:?}"),
            )
        })?;

        // pdfium's default clear colour is white, which stands in for alpha.
        let render_config = PdfRenderConfig::new().scale_page_by_factor(1.0);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| ReceiptError::decode(KIND, format!("rasterisation failed: {e:?}")))?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            page_index + 1,
            image.width(),
            image.height()
        );

        Ok(image)
    }
}
