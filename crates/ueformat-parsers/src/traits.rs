// ueformat-parsers/src/traits.rs
//! Core traits defining the parser interface for the UEFORMAT family.
//!
//! This module establishes a unified parsing interface that enables:
//! - Consistent error handling across all payload kinds
//! - Typed failure classification (the host application renders messages)
//! - Progress reporting for large files

use std::io::{Read, Seek};
use std::path::Path;

use thiserror::Error;

/// Errors that can occur during parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid magic bytes: expected {expected:?}, found {found:?}")]
    InvalidMagic { expected: Vec<u8>, found: Vec<u8> },

    #[error("Unsupported file version: {version} (supported: {min}..={max})")]
    UnsupportedVersion { version: u8, min: u8, max: u8 },

    #[error("Unsupported compression method: {method}")]
    UnsupportedCompression { method: String },

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Decompressed size mismatch: header declares {expected} bytes, codec produced {actual}")]
    DecompressionSizeMismatch { expected: usize, actual: usize },

    #[error("Truncated buffer at offset {offset}: requested {requested} bytes, {available} available")]
    BufferOverflow {
        offset: usize,
        requested: usize,
        available: usize,
    },

    #[error("Invalid data at offset {offset}: {message}")]
    InvalidData { offset: usize, message: String },

    #[error("Chunk size mismatch in {chunk}: header declares {declared} bytes, decoder consumed {consumed}")]
    ChunkSizeMismatch {
        chunk: String,
        declared: usize,
        consumed: usize,
    },

    #[error("Nested error in {context}: {source}")]
    Nested {
        context: String,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Wrap this error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ParseError::Nested {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Check if this is a structural (format-level) error as opposed to I/O
    pub fn is_format_error(&self) -> bool {
        !matches!(self, ParseError::Io(_))
    }
}

/// Result type alias for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Progress callback for long-running parse operations
pub type ProgressCallback = Box<dyn Fn(ParseProgress) + Send + Sync>;

/// Progress information during parsing
#[derive(Debug, Clone)]
pub struct ParseProgress {
    /// Current phase of parsing
    pub phase: ParsePhase,
    /// Bytes processed so far
    pub bytes_processed: u64,
    /// Total bytes to process (if known)
    pub total_bytes: Option<u64>,
    /// Current item being processed (e.g., a LOD name)
    pub current_item: Option<String>,
    /// Number of items processed
    pub items_processed: u64,
    /// Total items to process (if known)
    pub total_items: Option<u64>,
}

impl ParseProgress {
    /// Calculate percentage complete (0.0 - 1.0)
    pub fn percentage(&self) -> Option<f32> {
        self.total_bytes.map(|total| {
            if total == 0 {
                1.0
            } else {
                self.bytes_processed as f32 / total as f32
            }
        })
    }
}

/// Phases of the parsing process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePhase {
    /// Reading the file envelope
    ReadingHeader,
    /// Decompressing the payload
    Decompressing,
    /// Walking sections and decoding chunks
    ParsingRecords,
    /// Parsing complete
    Complete,
}

/// Configuration options for parsing
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Treat declared-vs-consumed chunk size mismatches as hard errors.
    /// When false, the declared size stays authoritative and the parser
    /// resynchronizes to it with a warning.
    pub strict_validation: bool,
    /// Memory limit for decompression buffers (in bytes). Declared
    /// uncompressed sizes above this are rejected before allocation.
    pub decompression_memory_limit: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict_validation: false,
            decompression_memory_limit: 512 * 1024 * 1024, // 512 MB
        }
    }
}

/// Core trait for UEFORMAT payload parsers
///
/// Implementors of this trait provide the ability to parse one payload
/// kind of the UEFORMAT container (model, animation, world).
pub trait Parser: Send + Sync {
    /// The parsed output type
    type Output: Send + Sync;

    /// Returns the file extensions this parser handles (e.g., ["uemodel"])
    fn extensions(&self) -> &[&str];

    /// Returns the magic bytes that identify this file type (if applicable)
    fn magic_bytes(&self) -> Option<&[u8]> {
        None
    }

    /// Returns a human-readable name for this parser
    fn name(&self) -> &str;

    /// Returns the file version bytes supported by this parser
    fn supported_versions(&self) -> &[u8] {
        &[]
    }

    /// Parse from a reader with default options
    fn parse<R: Read + Seek>(&self, reader: R) -> ParseResult<Self::Output> {
        self.parse_with_options(reader, &ParseOptions::default(), None)
    }

    /// Parse from a reader with custom options and optional progress callback
    fn parse_with_options<R: Read + Seek>(
        &self,
        reader: R,
        options: &ParseOptions,
        progress: Option<ProgressCallback>,
    ) -> ParseResult<Self::Output>;

    /// Parse from a file path
    fn parse_file(&self, path: &Path) -> ParseResult<Self::Output> {
        self.parse_file_with_options(path, &ParseOptions::default(), None)
    }

    /// Parse from a file path with options
    fn parse_file_with_options(
        &self,
        path: &Path,
        options: &ParseOptions,
        progress: Option<ProgressCallback>,
    ) -> ParseResult<Self::Output> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        self.parse_with_options(reader, options, progress)
    }

    /// Check if this parser can handle the given file
    fn can_parse(&self, path: &Path) -> bool {
        // Check extension
        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy().to_lowercase();
            if self.extensions().iter().any(|e| e.to_lowercase() == ext_str) {
                return true;
            }
        }

        // Try to check magic bytes if available
        if let Some(magic) = self.magic_bytes() {
            if let Ok(file) = std::fs::File::open(path) {
                let mut reader = std::io::BufReader::new(file);
                let mut buffer = vec![0u8; magic.len()];
                if reader.read_exact(&mut buffer).is_ok() {
                    return buffer == magic;
                }
            }
        }

        false
    }
}
