use serde::{Deserialize, Serialize};

/// Accepted image MIME types and their file extensions.
const IMAGE_TYPES: &[(&str, &[&str])] = &[
    ("image/jpeg", &["jpg", "jpeg"]),
    ("image/png", &["png"]),
    ("image/gif", &["gif"]),
    ("image/webp", &["webp"]),
    ("image/bmp", &["bmp"]),
];

const PDF_TYPES: &[(&str, &[&str])] = &[("application/pdf", &["pdf"])];

/// Family of files a tool accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Pdf,
}

impl MediaKind {
    fn table(self) -> &'static [(&'static str, &'static [&'static str])] {
        match self {
            MediaKind::Image => IMAGE_TYPES,
            MediaKind::Pdf => PDF_TYPES,
        }
    }

    /// MIME type for `ext` if this kind accepts it. Case-insensitive, with or
    /// without a leading dot.
    pub fn mime_for_extension(self, ext: &str) -> Option<&'static str> {
        let ext = ext.trim_start_matches('.');
        self.table()
            .iter()
            .find(|(_, exts)| exts.iter().any(|candidate| candidate.eq_ignore_ascii_case(ext)))
            .map(|(mime, _)| *mime)
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Pdf => "PDF",
        }
    }
}

/// Preferred file extension for an image MIME type, `png` when unknown.
pub fn extension_for_mime(mime: &str) -> &'static str {
    IMAGE_TYPES
        .iter()
        .chain(PDF_TYPES.iter())
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(mime.trim()))
        .map(|(_, exts)| exts[0])
        .unwrap_or("png")
}
