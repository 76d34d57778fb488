// ueformat-parsers/src/uemodel/lod.rs
//! Level-of-detail records and their per-LOD data streams

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ueformat_core::{BoundingBox, Color4, Vec2, Vec3, Vec4};

/// One level of detail of a model
///
/// All arrays are parallel over the same vertex set except `indices`
/// (flat triangle list), `materials` (face ranges), `weights` (flat, not
/// grouped per vertex) and `morph_targets` (sparse).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LodLevel {
    /// LOD name as exported (e.g. "LOD0")
    pub name: String,
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Triangle vertex indices, flat with stride 3
    pub indices: Vec<u32>,
    /// Vertex normals. The file stores W,X,Y,Z per vertex; they are
    /// reordered at decode so `x`/`y`/`z` hold the direction and `w` the
    /// trailing sign component.
    pub normals: Vec<Vec4>,
    /// Named vertex color channels
    pub vertex_colors: Vec<VertexColorChannel>,
    /// UV channels, one outer entry per channel
    pub uv_channels: Vec<Vec<Vec2>>,
    /// Material face ranges, ordered by increasing first index
    pub materials: Vec<MaterialRange>,
    /// Bone weight entries, flat
    pub weights: Vec<VertexWeight>,
    /// Named sparse morph targets
    pub morph_targets: Vec<MorphTarget>,
}

impl LodLevel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if this LOD carries UV coordinates
    pub fn has_uvs(&self) -> bool {
        self.uv_channels.iter().any(|c| !c.is_empty())
    }

    /// Get UV channel count
    pub fn uv_channel_count(&self) -> usize {
        self.uv_channels.len()
    }

    /// Check if this LOD carries vertex colors
    pub fn has_colors(&self) -> bool {
        self.vertex_colors.iter().any(|c| !c.colors.is_empty())
    }

    /// Check if this LOD carries bone weights (skinned)
    pub fn has_weights(&self) -> bool {
        !self.weights.is_empty()
    }

    /// Check if this LOD carries morph targets
    pub fn has_morph_targets(&self) -> bool {
        !self.morph_targets.is_empty()
    }

    /// Per-vertex normal directions with the trailing component dropped
    pub fn normal_directions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.normals.iter().map(|n| n.xyz())
    }

    /// Axis-aligned bounds of the position stream
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.positions)
    }

    /// Material index for each face, resolved from the material ranges.
    /// Faces before the first range (or with no ranges at all) map to
    /// material 0; the last range extends to the end of the index buffer.
    pub fn face_material_assignment(&self) -> Vec<usize> {
        (0..self.triangle_count())
            .map(|face| material_for_face(&self.materials, face))
            .collect()
    }

    /// Bone weights grouped by vertex index, ordered by vertex
    pub fn weights_by_vertex(&self) -> BTreeMap<u32, Vec<&VertexWeight>> {
        let mut grouped: BTreeMap<u32, Vec<&VertexWeight>> = BTreeMap::new();
        for weight in &self.weights {
            grouped.entry(weight.vertex_index).or_default().push(weight);
        }
        grouped
    }
}

/// A named per-vertex color channel
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VertexColorChannel {
    /// Channel name as exported
    pub name: String,
    /// One RGBA color per vertex
    pub colors: Vec<Color4>,
}

/// A contiguous span of the triangle list assigned to one material slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRange {
    /// Material slot name
    pub name: String,
    /// First triangle index of the span
    pub first_index: u32,
    /// Number of faces in the span
    pub face_count: u32,
}

/// Resolve the material slot owning `face`.
///
/// Ranges are ordered by increasing `first_index` and assumed
/// non-overlapping; the last range extends to the end of the index buffer,
/// so only the start of each span decides ownership.
pub fn material_for_face(ranges: &[MaterialRange], face: usize) -> usize {
    let mut slot = 0;
    for (index, range) in ranges.iter().enumerate() {
        if range.first_index as usize <= face {
            slot = index;
        } else {
            break;
        }
    }
    slot
}

/// One bone influence on one vertex
///
/// The list is flat, not grouped per vertex; the on-disk record is 10
/// bytes (2-byte bone index, 4-byte vertex index, 4-byte weight).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexWeight {
    /// Bone index into the skeleton
    pub bone_index: u16,
    /// Vertex this influence applies to
    pub vertex_index: u32,
    /// Influence amount
    pub weight: f32,
}

/// A sparse morph target: only affected vertices are listed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MorphTarget {
    /// Morph target name as exported
    pub name: String,
    /// Per-vertex deltas
    pub deltas: Vec<MorphDelta>,
}

/// One morph target delta (28-byte on-disk record)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MorphDelta {
    /// Position offset from the base mesh
    pub position: Vec3,
    /// Normal offset from the base mesh
    pub normal: Vec3,
    /// Vertex this delta applies to
    pub vertex_index: u32,
}
