// ueformat-parsers/src/uemodel/chunks.rs
//! UEFORMAT section and chunk identification
//!
//! The payload identifies sections and chunks by length-prefixed name
//! strings. Each name is decoded into a closed enumeration once, at header
//! read time; dispatch is then an exhaustive match instead of repeated
//! string comparisons.

use serde::{Deserialize, Serialize};

/// Top-level section types within a UEMODEL payload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionType {
    /// Level-of-detail list
    Lods,
    /// Skeleton data (recognized, not decoded by this reader)
    Skeleton,
    /// Collision geometry (recognized, not decoded by this reader)
    Collision,
    /// Unknown section type (skipped via declared byte size)
    Unknown(String),
}

impl SectionType {
    /// Decode a section name as read from the payload
    pub fn from_name(name: &str) -> Self {
        match name {
            "LODS" => SectionType::Lods,
            "SKELETON" => SectionType::Skeleton,
            "COLLISION" => SectionType::Collision,
            other => SectionType::Unknown(other.to_string()),
        }
    }

    /// The on-disk section name
    pub fn name(&self) -> &str {
        match self {
            SectionType::Lods => "LODS",
            SectionType::Skeleton => "SKELETON",
            SectionType::Collision => "COLLISION",
            SectionType::Unknown(name) => name,
        }
    }
}

/// Chunk types within a single LOD entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkType {
    /// Vertex positions, 3 floats each
    Vertices,
    /// Triangle vertex indices, flat with stride 3
    Indices,
    /// Vertex normals, 4 floats each in W,X,Y,Z order
    Normals,
    /// Vertex tangents (recognized, skipped via declared byte size)
    Tangents,
    /// Named vertex color channels
    VertexColors,
    /// UV channels
    TexCoords,
    /// Material face ranges
    Materials,
    /// Bone weight entries
    Weights,
    /// Named sparse morph targets
    MorphTargets,
    /// Unknown chunk type (skipped via declared byte size)
    Unknown(String),
}

impl ChunkType {
    /// Decode a chunk name as read from the payload
    pub fn from_name(name: &str) -> Self {
        match name {
            "VERTICES" => ChunkType::Vertices,
            "INDICES" => ChunkType::Indices,
            "NORMALS" => ChunkType::Normals,
            "TANGENTS" => ChunkType::Tangents,
            "VERTEXCOLORS" => ChunkType::VertexColors,
            "TEXCOORDS" => ChunkType::TexCoords,
            "MATERIALS" => ChunkType::Materials,
            "WEIGHTS" => ChunkType::Weights,
            "MORPHTARGETS" => ChunkType::MorphTargets,
            other => ChunkType::Unknown(other.to_string()),
        }
    }

    /// The on-disk chunk name
    pub fn name(&self) -> &str {
        match self {
            ChunkType::Vertices => "VERTICES",
            ChunkType::Indices => "INDICES",
            ChunkType::Normals => "NORMALS",
            ChunkType::Tangents => "TANGENTS",
            ChunkType::VertexColors => "VERTEXCOLORS",
            ChunkType::TexCoords => "TEXCOORDS",
            ChunkType::Materials => "MATERIALS",
            ChunkType::Weights => "WEIGHTS",
            ChunkType::MorphTargets => "MORPHTARGETS",
            ChunkType::Unknown(name) => name,
        }
    }

    /// Check if this chunk carries per-vertex geometry streams
    pub fn is_vertex_stream(&self) -> bool {
        matches!(
            self,
            ChunkType::Vertices | ChunkType::Normals | ChunkType::Tangents
        )
    }
}

/// Header preceding every section and every chunk: name, element count,
/// declared byte size of the body
#[derive(Debug, Clone)]
pub struct ChunkHeader {
    /// Decoded type name
    pub name: String,
    /// Number of elements in the body
    pub count: usize,
    /// Declared byte size of the body (authoritative for skipping)
    pub byte_size: usize,
}
