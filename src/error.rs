use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to create PDF: {0}")]
    PdfError(String),
    #[error("Failed to read prescription file: {0}")]
    PrescriptionError(String),
    #[error("Failed to read catalog file: {0}")]
    CatalogError(String),
    #[error("Invalid prescription: {0}")]
    ValidationError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
