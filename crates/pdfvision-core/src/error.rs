//! Errors, warnings and extraction options.
//!
//! A [`PdfError`] aborts the document. An [`ExtractWarning`] is recorded and
//! extraction carries on with a fallback (black color, default metrics).

use std::fmt;

use crate::words::GroupingOptions;

/// Fatal extraction error. Any of these discards the whole document's output.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfError {
    /// The document structure could not be read.
    ParseError(String),
    IoError(String),
    /// A font dictionary is unusable.
    FontError(String),
    /// A content stream could not be decoded or executed.
    InterpreterError(String),
    /// An [`ExtractOptions`] limit was hit.
    ResourceLimitExceeded {
        /// Option name, e.g. `"max_glyphs_per_page"`.
        limit_name: String,
        limit_value: usize,
        actual_value: usize,
    },
    /// Encrypted documents are not decrypted.
    PasswordRequired,
    Other(String),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::ParseError(msg) => write!(f, "cannot parse PDF: {msg}"),
            PdfError::IoError(msg) => write!(f, "I/O error: {msg}"),
            PdfError::FontError(msg) => write!(f, "bad font: {msg}"),
            PdfError::InterpreterError(msg) => write!(f, "cannot decode page content: {msg}"),
            PdfError::ResourceLimitExceeded {
                limit_name,
                limit_value,
                actual_value,
            } => write!(
                f,
                "{limit_name} exceeded: {actual_value} > {limit_value}"
            ),
            PdfError::PasswordRequired => f.write_str("encrypted PDFs are not supported"),
            PdfError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PdfError {}

impl From<std::io::Error> for PdfError {
    fn from(err: std::io::Error) -> Self {
        PdfError::IoError(err.to_string())
    }
}

/// Category of a non-fatal extraction problem.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum ExtractWarningCode {
    /// `Tf` named a font the resources do not define, or text came before any `Tf`.
    MissingFont,
    /// Colors in this space cannot be converted and resolve to black.
    UnsupportedColorSpace,
    MalformedObject,
    ResourceLimitReached,
    /// A character code had no Unicode mapping.
    EncodingFallback,
    Other(String),
}

impl ExtractWarningCode {
    /// Upper snake case tag used in log lines.
    pub fn as_str(&self) -> &str {
        match self {
            ExtractWarningCode::MissingFont => "MISSING_FONT",
            ExtractWarningCode::UnsupportedColorSpace => "UNSUPPORTED_COLOR_SPACE",
            ExtractWarningCode::MalformedObject => "MALFORMED_OBJECT",
            ExtractWarningCode::ResourceLimitReached => "RESOURCE_LIMIT_REACHED",
            ExtractWarningCode::EncodingFallback => "ENCODING_FALLBACK",
            ExtractWarningCode::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for ExtractWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A problem that was worked around. The affected glyphs are still emitted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractWarning {
    pub code: ExtractWarningCode,
    pub description: String,
    /// 0-based page index.
    pub page: Option<usize>,
    /// Position of the offending operator in the content stream.
    pub operator_index: Option<usize>,
    /// Font resource name (`/F1`) current when the warning was raised.
    pub font_name: Option<String>,
}

impl ExtractWarning {
    /// Uncategorized warning.
    pub fn new(description: impl Into<String>) -> Self {
        Self::with_code(ExtractWarningCode::Other(String::new()), description)
    }

    pub fn with_code(code: ExtractWarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            page: None,
            operator_index: None,
            font_name: None,
        }
    }

    pub fn on_page(code: ExtractWarningCode, description: impl Into<String>, page: usize) -> Self {
        Self {
            page: Some(page),
            ..Self::with_code(code, description)
        }
    }

    pub fn with_operator_context(
        code: ExtractWarningCode,
        description: impl Into<String>,
        operator_index: usize,
        font_name: impl Into<String>,
    ) -> Self {
        Self {
            operator_index: Some(operator_index),
            font_name: Some(font_name.into()),
            ..Self::with_code(code, description)
        }
    }

    /// Attach a page index, keeping any existing one.
    pub fn or_page(mut self, page: usize) -> Self {
        self.page.get_or_insert(page);
        self
    }
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(page) = self.page {
            write!(f, " (page {})", page + 1)?;
        }
        if let Some(ref font_name) = self.font_name {
            write!(f, " [font {font_name}]")?;
        }
        if let Some(index) = self.operator_index {
            write!(f, " [operator #{index}]")?;
        }
        Ok(())
    }
}

/// An extracted value plus the warnings raised while producing it.
#[derive(Debug, Clone)]
pub struct ExtractResult<T> {
    pub value: T,
    pub warnings: Vec<ExtractWarning>,
}

impl<T> ExtractResult<T> {
    pub fn with_warnings(value: T, warnings: Vec<ExtractWarning>) -> Self {
        Self { value, warnings }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Resource limits and grouping tolerances for one extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Form XObject nesting depth (default 10).
    pub max_recursion_depth: usize,
    /// Decoded content bytes per stream and per page (default 100 MiB).
    pub max_stream_bytes: usize,
    /// Glyphs per page (default 1,000,000).
    pub max_glyphs_per_page: usize,
    pub collect_warnings: bool,
    /// Raw input size, checked before parsing. Unlimited by default.
    pub max_input_bytes: Option<usize>,
    /// Page count, checked after parsing. Unlimited by default.
    pub max_pages: Option<usize>,
    pub grouping: GroupingOptions,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: 10,
            max_stream_bytes: 100 * 1024 * 1024,
            max_glyphs_per_page: 1_000_000,
            collect_warnings: true,
            max_input_bytes: None,
            max_pages: None,
            grouping: GroupingOptions::default(),
        }
    }
}
