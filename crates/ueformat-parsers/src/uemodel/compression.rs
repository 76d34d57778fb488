// ueformat-parsers/src/uemodel/compression.rs
//! Compression envelope handling for UEFORMAT containers
//!
//! Compressed containers name their codec in the header. Two codecs are
//! wired:
//! - ZSTD (Zstandard)
//! - GZIP (gzip-wrapped DEFLATE)
//!
//! Decompression must produce exactly the declared uncompressed size; the
//! chunk protocol's offset bookkeeping depends on it.

use crate::traits::{ParseError, ParseResult};

/// Compression methods named in the container header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Zstandard
    Zstd,
    /// gzip
    Gzip,
    /// Anything else named by the file
    Unknown(String),
}

impl CompressionMethod {
    /// Decode the algorithm name as read from the header
    pub fn from_name(name: &str) -> Self {
        match name {
            "ZSTD" => CompressionMethod::Zstd,
            "GZIP" => CompressionMethod::Gzip,
            other => CompressionMethod::Unknown(other.to_string()),
        }
    }

    /// The header name for this method
    pub fn name(&self) -> &str {
        match self {
            CompressionMethod::Zstd => "ZSTD",
            CompressionMethod::Gzip => "GZIP",
            CompressionMethod::Unknown(name) => name,
        }
    }
}

/// Handles the whole-payload compression envelope
pub struct Decompressor;

impl Decompressor {
    /// Decompress `data` using `method`, enforcing the declared output size
    pub fn decompress(
        data: &[u8],
        method: &CompressionMethod,
        expected_size: usize,
    ) -> ParseResult<Vec<u8>> {
        let output = match method {
            CompressionMethod::Zstd => Self::decompress_zstd(data)?,
            CompressionMethod::Gzip => Self::decompress_gzip(data, expected_size)?,
            CompressionMethod::Unknown(name) => {
                return Err(ParseError::UnsupportedCompression {
                    method: name.clone(),
                })
            }
        };

        if output.len() != expected_size {
            return Err(ParseError::DecompressionSizeMismatch {
                expected: expected_size,
                actual: output.len(),
            });
        }

        Ok(output)
    }

    /// Decompress using Zstandard
    fn decompress_zstd(data: &[u8]) -> ParseResult<Vec<u8>> {
        zstd::stream::decode_all(data)
            .map_err(|e| ParseError::DecompressionFailed(format!("ZSTD: {e}")))
    }

    /// Decompress using gzip
    fn decompress_gzip(data: &[u8], expected_size: usize) -> ParseResult<Vec<u8>> {
        use std::io::Read;

        let mut decoder = flate2::read::GzDecoder::new(data);
        let mut output = Vec::with_capacity(expected_size);

        decoder
            .read_to_end(&mut output)
            .map_err(|e| ParseError::DecompressionFailed(format!("GZIP: {e}")))?;

        Ok(output)
    }

    /// Compress data with the given method (fixture and round-trip support)
    pub fn compress(data: &[u8], method: &CompressionMethod) -> ParseResult<Vec<u8>> {
        match method {
            CompressionMethod::Zstd => zstd::stream::encode_all(data, 3)
                .map_err(|e| ParseError::DecompressionFailed(format!("ZSTD: {e}"))),
            CompressionMethod::Gzip => {
                use std::io::Write;

                let mut encoder =
                    flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder
                    .write_all(data)
                    .and_then(|_| encoder.finish())
                    .map_err(|e| ParseError::DecompressionFailed(format!("GZIP: {e}")))
            }
            CompressionMethod::Unknown(name) => Err(ParseError::UnsupportedCompression {
                method: name.clone(),
            }),
        }
    }
}
