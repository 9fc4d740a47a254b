//! Backend failures and their mapping onto [`PdfError`].

use pdfvision_core::PdfError;
use thiserror::Error;

/// Failure inside the lopdf backend or the content interpreter.
#[derive(Debug, Error)]
pub enum BackendError {
    /// lopdf could not load the file or resolve an object.
    #[error("malformed PDF: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unusable font program, encoding or ToUnicode CMap.
    #[error("font: {0}")]
    Font(String),

    /// Tokenizer or operator failure in a content stream.
    #[error("content stream: {0}")]
    Interpreter(String),

    /// Limit breaches and encryption, already expressed as [`PdfError`].
    #[error(transparent)]
    Core(#[from] PdfError),
}

impl From<BackendError> for PdfError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => PdfError::ParseError(msg),
            BackendError::Io(e) => PdfError::IoError(e.to_string()),
            BackendError::Font(msg) => PdfError::FontError(msg),
            BackendError::Interpreter(msg) => PdfError::InterpreterError(msg),
            BackendError::Core(e) => e,
        }
    }
}
