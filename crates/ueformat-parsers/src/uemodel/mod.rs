// ueformat-parsers/src/uemodel/mod.rs
//! UEFORMAT model (.uemodel) parser
//!
//! UEFORMAT is a chunked, versioned, optionally-compressed interchange
//! format for game-engine model exports. A model file carries LOD meshes,
//! vertex streams, material face ranges, bone weights and morph targets.
//!
//! # Format Structure
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     UEFORMAT Container                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Magic "UEFORMAT"                                            │
//! │  Header: identifier, version byte, object name,              │
//! │          compression flag [, codec, sizes]                   │
//! ├──────────────────────────────────────────────────────────────┤
//! │              Payload (decompressed as a whole)               │
//! │  Section*: name, element count, declared byte size           │
//! │    "LODS" → LOD*: name, chunk-list byte size,                │
//! │      Chunk*: name, count, byte size                          │
//! │        VERTICES / INDICES / NORMALS / TANGENTS /             │
//! │        VERTEXCOLORS / TEXCOORDS / MATERIALS /                │
//! │        WEIGHTS / MORPHTARGETS / unknown (skipped)            │
//! │    other sections → skipped by declared byte size            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unknown sections and chunks are skipped by their declared byte size;
//! that skip is the format's forward-compatibility contract and is never
//! an error.

mod chunks;
mod compression;
mod lod;
mod skeleton;

pub use chunks::{ChunkHeader, ChunkType, SectionType};
pub use compression::{CompressionMethod, Decompressor};
pub use lod::{
    material_for_face, LodLevel, MaterialRange, MorphDelta, MorphTarget, VertexColorChannel,
    VertexWeight,
};
pub use skeleton::{Bone, Skeleton, Socket};

use std::io::{Read, Seek, SeekFrom};

use serde::{Deserialize, Serialize};
use ueformat_core::Vec4;

use crate::reader::{self, ByteCursor};
use crate::traits::{
    ParseError, ParseOptions, ParsePhase, ParseProgress, ParseResult, Parser, ProgressCallback,
};

/// Magic signature opening every UEFORMAT container
pub const UEF_MAGIC: &[u8; 8] = b"UEFORMAT";

/// Header identifier for model payloads
pub const MODEL_IDENTIFIER: &str = "UEMODEL";
/// Header identifier for animation payloads (not handled by this reader)
pub const ANIM_IDENTIFIER: &str = "UEANIM";
/// Header identifier for world payloads (not handled by this reader)
pub const WORLD_IDENTIFIER: &str = "UEWORLD";

/// Oldest supported file version byte
pub const MIN_VERSION: u8 = 1;
/// Newest supported file version byte
pub const MAX_VERSION: u8 = 5;

/// Named format revisions, one per version byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum FormatVersion {
    /// Binormal sign serialized with normals
    SerializeBinormalSign = 1,
    /// Multiple named vertex color channels
    AddMultipleVertexColors = 2,
    /// Convex collision geometry section
    AddConvexCollisionGeom = 3,
    /// LOD list restructure
    LevelOfDetailFormatRestructure = 4,
    /// Virtual bone serialization
    SerializeVirtualBones = 5,
}

impl FormatVersion {
    /// Decode a version byte, `None` when outside the supported window
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(FormatVersion::SerializeBinormalSign),
            2 => Some(FormatVersion::AddMultipleVertexColors),
            3 => Some(FormatVersion::AddConvexCollisionGeom),
            4 => Some(FormatVersion::LevelOfDetailFormatRestructure),
            5 => Some(FormatVersion::SerializeVirtualBones),
            _ => None,
        }
    }
}

/// Compression fields of the container header; absent entirely when the
/// compression flag is clear
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionHeader {
    /// Codec name as written by the exporter (e.g. "ZSTD")
    pub method: String,
    /// Declared payload size after decompression
    pub uncompressed_size: u32,
    /// Declared size of the compressed block that follows the header
    pub compressed_size: u32,
}

/// Parsed container header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatHeader {
    /// Payload kind ("UEMODEL", "UEANIM", "UEWORLD")
    pub identifier: String,
    /// Format revision byte
    pub file_version: u8,
    /// Exported object name
    pub object_name: String,
    /// Compression envelope, `None` for raw payloads
    pub compression: Option<CompressionHeader>,
}

impl FormatHeader {
    /// Whether the payload is wrapped in a compression envelope
    pub fn is_compressed(&self) -> bool {
        self.compression.is_some()
    }

    /// The named format revision for this header's version byte
    pub fn version(&self) -> Option<FormatVersion> {
        FormatVersion::from_byte(self.file_version)
    }
}

/// Parsed UEFORMAT model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UeModel {
    /// Container header
    pub header: FormatHeader,
    /// Levels of detail in file order
    pub lods: Vec<LodLevel>,
    /// Skeleton record; the SKELETON section is recognized but not
    /// decoded by this reader, so this stays `None`
    pub skeleton: Option<Skeleton>,
}

impl UeModel {
    /// Create an empty model for the given header
    pub fn new(header: FormatHeader) -> Self {
        Self {
            header,
            lods: Vec::new(),
            skeleton: None,
        }
    }

    /// Get total vertex count across all LODs
    pub fn vertex_count(&self) -> usize {
        self.lods.iter().map(|l| l.vertex_count()).sum()
    }

    /// Get total triangle count across all LODs
    pub fn triangle_count(&self) -> usize {
        self.lods.iter().map(|l| l.triangle_count()).sum()
    }

    /// Check if any LOD carries bone weights
    pub fn is_skinned(&self) -> bool {
        self.lods.iter().any(|l| l.has_weights())
    }

    /// Check if any LOD carries morph targets
    pub fn has_morph_targets(&self) -> bool {
        self.lods.iter().any(|l| l.has_morph_targets())
    }

    /// Find a LOD by name
    pub fn lod_by_name(&self, name: &str) -> Option<&LodLevel> {
        self.lods.iter().find(|l| l.name == name)
    }
}

/// UEFORMAT model parser
///
/// Stateless; one instance can parse any number of files, concurrently if
/// the byte sources are independent.
#[derive(Debug, Default)]
pub struct UeModelParser;

impl UeModelParser {
    /// Create a new model parser
    pub fn new() -> Self {
        Self
    }

    /// Read and validate the container envelope
    fn read_header<R: Read>(&self, reader: &mut R) -> ParseResult<FormatHeader> {
        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic)?;
        if &magic != UEF_MAGIC {
            return Err(ParseError::InvalidMagic {
                expected: UEF_MAGIC.to_vec(),
                found: magic.to_vec(),
            });
        }

        let identifier = reader::read_string_stream(reader)?;

        let mut version = [0u8; 1];
        reader.read_exact(&mut version)?;
        let file_version = version[0];
        if FormatVersion::from_byte(file_version).is_none() {
            return Err(ParseError::UnsupportedVersion {
                version: file_version,
                min: MIN_VERSION,
                max: MAX_VERSION,
            });
        }

        let object_name = reader::read_string_stream(reader)?;

        let mut flag = [0u8; 1];
        reader.read_exact(&mut flag)?;
        let compression = if flag[0] != 0 {
            let method = reader::read_string_stream(reader)?;
            let uncompressed_size = reader::read_i32_stream(reader)?;
            let compressed_size = reader::read_i32_stream(reader)?;
            if uncompressed_size < 0 || compressed_size < 0 {
                return Err(ParseError::InvalidData {
                    offset: 0,
                    message: format!(
                        "negative compression sizes: uncompressed {uncompressed_size}, compressed {compressed_size}"
                    ),
                });
            }
            Some(CompressionHeader {
                method,
                uncompressed_size: uncompressed_size as u32,
                compressed_size: compressed_size as u32,
            })
        } else {
            None
        };

        Ok(FormatHeader {
            identifier,
            file_version,
            object_name,
            compression,
        })
    }

    /// Materialize the payload buffer, decompressing if the header says so
    fn read_payload<R: Read + Seek>(
        &self,
        reader: &mut R,
        header: &FormatHeader,
        options: &ParseOptions,
    ) -> ParseResult<Vec<u8>> {
        match &header.compression {
            Some(envelope) => {
                let expected = envelope.uncompressed_size as usize;
                if expected > options.decompression_memory_limit {
                    return Err(ParseError::InvalidData {
                        offset: 0,
                        message: format!(
                            "declared uncompressed size {expected} exceeds the {} byte memory limit",
                            options.decompression_memory_limit
                        ),
                    });
                }

                let method = CompressionMethod::from_name(&envelope.method);
                // Compressed scratch buffer; dropped at end of scope on
                // every path.
                let compressed =
                    reader::read_exact_stream(reader, envelope.compressed_size as usize)?;
                Decompressor::decompress(&compressed, &method, expected)
            }
            None => {
                // Raw payload: everything from here to end-of-stream.
                let current = reader.stream_position()?;
                let end = reader.seek(SeekFrom::End(0))?;
                reader.seek(SeekFrom::Start(current))?;
                reader::read_exact_stream(reader, (end - current) as usize)
            }
        }
    }

    /// Read one section or chunk header: name, element count, byte size
    fn read_chunk_header(&self, cursor: &mut ByteCursor) -> ParseResult<ChunkHeader> {
        let name = cursor.read_string()?;
        let count = cursor.read_len()?;
        let byte_size = cursor.read_len()?;
        Ok(ChunkHeader {
            name,
            count,
            byte_size,
        })
    }

    /// Reconcile a decoded span against its declared byte size.
    ///
    /// The declared size is authoritative: in lenient mode a disagreeing
    /// decoder is logged and the cursor resynchronizes to the declared
    /// boundary, so one bad chunk cannot desync the rest of the buffer.
    fn reconcile_span(
        &self,
        cursor: &mut ByteCursor,
        label: &str,
        start: usize,
        declared: usize,
        options: &ParseOptions,
    ) -> ParseResult<()> {
        let consumed = cursor.position() - start;
        if consumed != declared {
            if options.strict_validation {
                return Err(ParseError::ChunkSizeMismatch {
                    chunk: label.to_string(),
                    declared,
                    consumed,
                });
            }
            tracing::warn!(
                chunk = label,
                declared,
                consumed,
                "declared chunk size disagrees with decoded bytes, resynchronizing"
            );
            cursor.seek(start + declared)?;
        }
        Ok(())
    }

    /// Walk the top-level sections of a model payload
    fn parse_sections(
        &self,
        data: &[u8],
        model: &mut UeModel,
        options: &ParseOptions,
        progress: Option<&ProgressCallback>,
    ) -> ParseResult<()> {
        let mut cursor = ByteCursor::new(data);

        while !cursor.is_empty() {
            let header = self.read_chunk_header(&mut cursor)?;
            let start = cursor.position();

            match SectionType::from_name(&header.name) {
                SectionType::Lods => {
                    let lods = self.read_lods(&mut cursor, &header, options, progress)?;
                    model.lods.extend(lods);
                    self.reconcile_span(&mut cursor, &header.name, start, header.byte_size, options)?;
                }
                section => {
                    // Forward compatibility: unhandled sections are skipped
                    // by declared size, never reported as errors.
                    tracing::debug!(
                        section = section.name(),
                        count = header.count,
                        bytes = header.byte_size,
                        "skipping unhandled section"
                    );
                    cursor.skip(header.byte_size)?;
                }
            }
        }

        Ok(())
    }

    /// Decode the LOD list section
    fn read_lods(
        &self,
        cursor: &mut ByteCursor,
        section: &ChunkHeader,
        options: &ParseOptions,
        progress: Option<&ProgressCallback>,
    ) -> ParseResult<Vec<LodLevel>> {
        let mut lods = Vec::with_capacity(section.count.min(64));

        for index in 0..section.count {
            let name = cursor.read_string()?;
            let list_size = cursor.read_len()?;
            let list_start = cursor.position();

            if let Some(cb) = progress {
                cb(ParseProgress {
                    phase: ParsePhase::ParsingRecords,
                    bytes_processed: cursor.position() as u64,
                    total_bytes: None,
                    current_item: Some(name.clone()),
                    items_processed: index as u64,
                    total_items: Some(section.count as u64),
                });
            }

            let mut lod = LodLevel::new(name);
            while cursor.position() - list_start < list_size {
                self.read_lod_chunk(cursor, &mut lod, options)?;
            }
            self.reconcile_span(cursor, &lod.name, list_start, list_size, options)?;

            lods.push(lod);
        }

        Ok(lods)
    }

    /// Decode a single chunk within a LOD's chunk list
    fn read_lod_chunk(
        &self,
        cursor: &mut ByteCursor,
        lod: &mut LodLevel,
        options: &ParseOptions,
    ) -> ParseResult<()> {
        let header = self.read_chunk_header(cursor)?;
        let start = cursor.position();

        match ChunkType::from_name(&header.name) {
            ChunkType::Vertices => {
                lod.positions = (0..header.count)
                    .map(|_| cursor.read_vec3())
                    .collect::<ParseResult<_>>()?;
            }
            ChunkType::Indices => {
                lod.indices = (0..header.count)
                    .map(|_| cursor.read_u32())
                    .collect::<ParseResult<_>>()?;
            }
            ChunkType::Normals => {
                // File order is W,X,Y,Z; stored X,Y,Z,W so consumers read
                // the direction straight from x/y/z.
                lod.normals = (0..header.count)
                    .map(|_| {
                        let w = cursor.read_f32()?;
                        let x = cursor.read_f32()?;
                        let y = cursor.read_f32()?;
                        let z = cursor.read_f32()?;
                        Ok(Vec4::new(x, y, z, w))
                    })
                    .collect::<ParseResult<_>>()?;
            }
            ChunkType::VertexColors => {
                lod.vertex_colors = (0..header.count)
                    .map(|_| {
                        let name = cursor.read_string()?;
                        let len = cursor.read_len()?;
                        let colors = (0..len)
                            .map(|_| cursor.read_color4())
                            .collect::<ParseResult<_>>()?;
                        Ok(VertexColorChannel { name, colors })
                    })
                    .collect::<ParseResult<_>>()?;
            }
            ChunkType::TexCoords => {
                lod.uv_channels = (0..header.count)
                    .map(|_| {
                        let len = cursor.read_len()?;
                        (0..len).map(|_| cursor.read_vec2()).collect()
                    })
                    .collect::<ParseResult<_>>()?;
            }
            ChunkType::Materials => {
                lod.materials = (0..header.count)
                    .map(|_| {
                        let name = cursor.read_string()?;
                        let first_index = cursor.read_u32()?;
                        let face_count = cursor.read_u32()?;
                        Ok(MaterialRange {
                            name,
                            first_index,
                            face_count,
                        })
                    })
                    .collect::<ParseResult<_>>()?;
            }
            ChunkType::Weights => {
                // Contiguous block of 10-byte records.
                lod.weights = (0..header.count)
                    .map(|_| {
                        let bone_index = cursor.read_u16()?;
                        let vertex_index = cursor.read_u32()?;
                        let weight = cursor.read_f32()?;
                        Ok(VertexWeight {
                            bone_index,
                            vertex_index,
                            weight,
                        })
                    })
                    .collect::<ParseResult<_>>()?;
            }
            ChunkType::MorphTargets => {
                lod.morph_targets = (0..header.count)
                    .map(|_| {
                        let name = cursor.read_string()?;
                        let delta_count = cursor.read_len()?;
                        let deltas = (0..delta_count)
                            .map(|_| {
                                let position = cursor.read_vec3()?;
                                let normal = cursor.read_vec3()?;
                                let vertex_index = cursor.read_u32()?;
                                Ok(MorphDelta {
                                    position,
                                    normal,
                                    vertex_index,
                                })
                            })
                            .collect::<ParseResult<_>>()?;
                        Ok(MorphTarget { name, deltas })
                    })
                    .collect::<ParseResult<_>>()?;
            }
            ChunkType::Tangents => {
                // Present in the stream but not consumed by this reader.
                cursor.skip(header.byte_size)?;
            }
            ChunkType::Unknown(name) => {
                tracing::debug!(
                    chunk = %name,
                    lod = %lod.name,
                    bytes = header.byte_size,
                    "skipping unhandled chunk"
                );
                cursor.skip(header.byte_size)?;
            }
        }

        self.reconcile_span(cursor, &header.name, start, header.byte_size, options)
    }
}

impl Parser for UeModelParser {
    type Output = UeModel;

    fn extensions(&self) -> &[&str] {
        &["uemodel"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(UEF_MAGIC)
    }

    fn name(&self) -> &str {
        "UEFORMAT Model Parser"
    }

    fn supported_versions(&self) -> &[u8] {
        &[1, 2, 3, 4, 5]
    }

    fn parse_with_options<R: Read + Seek>(
        &self,
        mut reader: R,
        options: &ParseOptions,
        progress: Option<ProgressCallback>,
    ) -> ParseResult<Self::Output> {
        if let Some(ref cb) = progress {
            cb(ParseProgress {
                phase: ParsePhase::ReadingHeader,
                bytes_processed: 0,
                total_bytes: None,
                current_item: None,
                items_processed: 0,
                total_items: None,
            });
        }

        let header = self.read_header(&mut reader)?;

        if header.is_compressed() {
            if let Some(ref cb) = progress {
                cb(ParseProgress {
                    phase: ParsePhase::Decompressing,
                    bytes_processed: reader.stream_position()?,
                    total_bytes: None,
                    current_item: None,
                    items_processed: 0,
                    total_items: None,
                });
            }
        }

        let payload = self.read_payload(&mut reader, &header, options)?;
        tracing::debug!(
            object = %header.object_name,
            version = header.file_version,
            compressed = header.is_compressed(),
            payload_bytes = payload.len(),
            "container envelope read"
        );

        let mut model = UeModel::new(header);

        // Only model payloads are structurally parsed; other identifiers
        // are accepted and produce an empty model.
        if model.header.identifier == MODEL_IDENTIFIER {
            self.parse_sections(&payload, &mut model, options, progress.as_ref())?;
        } else {
            tracing::debug!(
                identifier = %model.header.identifier,
                "non-model payload accepted without section parsing"
            );
        }

        if let Some(ref cb) = progress {
            cb(ParseProgress {
                phase: ParsePhase::Complete,
                bytes_processed: payload.len() as u64,
                total_bytes: Some(payload.len() as u64),
                current_item: None,
                items_processed: model.lods.len() as u64,
                total_items: Some(model.lods.len() as u64),
            });
        }

        Ok(model)
    }
}
