use pdf_archive::ArchiveError;
use pdf_photos::AssembleError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Assemble(#[from] AssembleError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("No destination given and no save dialog available")]
    NoDestination,
}

pub type Result<T> = std::result::Result<T, ExportError>;
