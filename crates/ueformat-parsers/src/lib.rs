//! ueformat-parsers
//!
//! A library for parsing the UEFORMAT asset interchange family.
//!
//! # Supported Payloads
//!
//! | Identifier | Extension  | Description                              |
//! |------------|------------|------------------------------------------|
//! | UEMODEL    | `.uemodel` | Model payload (LODs, materials, morphs)  |
//! | UEANIM     | `.ueanim`  | Animation payload (accepted, not parsed) |
//! | UEWORLD    | `.ueworld` | World payload (accepted, not parsed)     |
//!
//! Containers are optionally compressed as a whole (ZSTD or GZIP); the
//! payload is a stream of self-delimited sections whose unknown members
//! are skipped by declared byte size, so readers stay forward compatible.
//!
//! # Example
//!
//! ```rust,ignore
//! use ueformat_parsers::{Parser, UeModelParser};
//!
//! let parser = UeModelParser::new();
//! let model = parser.parse_file("SK_Mannequin.uemodel".as_ref())?;
//!
//! println!("{} LODs, {} vertices", model.lods.len(), model.vertex_count());
//! ```

pub mod logging;
pub mod reader;
pub mod traits;
pub mod uemodel;

// Re-export main types
pub use traits::{
    ParseError, ParseOptions, ParsePhase, ParseProgress, ParseResult, Parser, ProgressCallback,
};

pub use uemodel::{
    material_for_face, Bone, ChunkHeader, ChunkType, CompressionHeader, CompressionMethod,
    Decompressor, FormatHeader, FormatVersion, LodLevel, MaterialRange, MorphDelta, MorphTarget,
    SectionType, Skeleton, Socket, UeModel, UeModelParser, VertexColorChannel, VertexWeight,
    MAX_VERSION, MIN_VERSION, MODEL_IDENTIFIER, UEF_MAGIC,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
