//! Source-format classification from the object key.
//!
//! Dispatch is by suffix only and is case-sensitive: `scan.PDF` is treated
//! as a raster. Content sniffing is deliberately absent so the decision is
//! visible from the key alone in logs and artifacts.

use std::fmt;

/// The decoding path a source object takes before inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Already a raster the model accepts (JPEG, PNG, …); passed through.
    Raster,
    /// HEIC/HEIF container; primary frame decoded and re-encoded.
    HeicHeif,
    /// PDF document; page 0 rendered and re-encoded.
    Pdf,
}

impl DocumentKind {
    /// Classify an object key by its suffix.
    pub fn from_key(key: &str) -> Self {
        if key.ends_with(".heic") || key.ends_with(".heif") {
            DocumentKind::HeicHeif
        } else if key.ends_with(".pdf") {
            DocumentKind::Pdf
        } else {
            DocumentKind::Raster
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Raster => "raster",
            DocumentKind::HeicHeif => "HEIC/HEIF",
            DocumentKind::Pdf => "PDF",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_suffix() {
        assert_eq!(DocumentKind::from_key("a/b/photo.heic"), DocumentKind::HeicHeif);
        assert_eq!(DocumentKind::from_key("photo.heif"), DocumentKind::HeicHeif);
        assert_eq!(DocumentKind::from_key("scan.pdf"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_key("r.jpg"), DocumentKind::Raster);
        assert_eq!(DocumentKind::from_key("r.png"), DocumentKind::Raster);
        assert_eq!(DocumentKind::from_key("no_extension"), DocumentKind::Raster);
    }

    #[test]
    fn suffix_match_is_case_sensitive() {
        assert_eq!(DocumentKind::from_key("scan.PDF"), DocumentKind::Raster);
        assert_eq!(DocumentKind::from_key("IMG_0001.HEIC"), DocumentKind::Raster);
    }

    #[test]
    fn suffix_must_be_terminal() {
        assert_eq!(DocumentKind::from_key("scan.pdf.json"), DocumentKind::Raster);
        assert_eq!(DocumentKind::from_key("heic"), DocumentKind::Raster);
    }
}
