use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Extract styled text elements, glyphs and fonts from PDF documents.
#[derive(Debug, Parser)]
#[command(name = "pdfvision", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract words with position, font, weight, style and color
    Elements {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Split words at gaps wider than this fraction of a space (default: 0.35)
        #[arg(long, default_value_t = 0.35)]
        gap_ratio: f64,

        /// Glyphs stay on one line while the baseline moves less than this
        /// fraction of the glyph height (default: 0.5)
        #[arg(long, default_value_t = 0.5)]
        line_tolerance: f64,

        /// Font sizes closer than this are treated as equal (default: 0.5)
        #[arg(long, default_value_t = 0.5)]
        font_size_tolerance: f64,

        /// Process pages concurrently
        #[arg(long)]
        parallel: bool,
    },

    /// Dump the raw glyph records with resolved colors
    Glyphs {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List the fonts used on each page with derived family, weight and style
    Fonts {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = FontsFormat::Text)]
        format: FontsFormat,
    },
}

/// Output format for elements/glyphs subcommands.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Plain text (tab-separated)
    Text,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}

/// Output format for the fonts subcommand.
#[derive(Debug, Clone, ValueEnum)]
pub enum FontsFormat {
    /// Plain text output
    Text,
    /// JSON output
    Json,
}
