//! PDF and archive plumbing: image→PDF composition, merging, signature
//! stamping, page rasterisation and ZIP packaging.

pub mod archive;
pub mod compose;
pub mod merge;
pub mod raster;
pub mod sign;

pub use archive::{zip_buffers, NamedBuffer};
pub use compose::images_to_pdf;
pub use merge::merge_pdfs;
pub use raster::{pdf_to_images, PageRasterizer, PdfiumRasterizer, RasterOptions};
pub use sign::{sign_pdf, SignaturePlacement};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("At least two PDF files are required, got {found}")]
    NotEnoughDocuments { found: usize },

    #[error("No images to convert")]
    NoImages,

    #[error("PDF #{} is encrypted", .index + 1)]
    Encrypted { index: usize },

    #[error("PDF #{} could not be read: {reason}", .index + 1)]
    Corrupt { index: usize, reason: String },

    #[error("Image #{} could not be read: {reason}", .index + 1)]
    InvalidImage { index: usize, reason: String },

    #[error("Page {} does not exist, the document has {count}", .page + 1)]
    PageOutOfRange { page: usize, count: usize },

    #[error("{0}")]
    MissingDependency(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("No page could be converted")]
    NoPagesConverted,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Engine(#[from] engine::EngineError),
}

pub type Result<T> = std::result::Result<T, DocumentError>;
