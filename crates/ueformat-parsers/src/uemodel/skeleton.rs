// ueformat-parsers/src/uemodel/skeleton.rs
//! Skeleton record types
//!
//! The format reserves a SKELETON section next to LODS. This reader
//! recognizes the section and skips it by declared size; the types below
//! exist so the model record matches the full shape of the format and a
//! future decoder has somewhere to put its output.

use serde::{Deserialize, Serialize};
use ueformat_core::{Vec3, Vec4};

/// Skeleton data attached to a model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skeleton {
    /// Bones in file order; parent references are indices into this list
    pub bones: Vec<Bone>,
    /// Attachment sockets
    pub sockets: Vec<Socket>,
}

impl Skeleton {
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Find a bone by name
    pub fn bone_by_name(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }
}

/// One bone of the skeleton
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bone {
    /// Bone name
    pub name: String,
    /// Index of the parent bone, negative for roots
    pub parent_index: i32,
    /// Rest position
    pub position: Vec3,
    /// Rest rotation quaternion
    pub rotation: Vec4,
}

impl Bone {
    /// Check if this is a root bone
    pub fn is_root(&self) -> bool {
        self.parent_index < 0
    }
}

/// An attachment socket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Socket {
    /// Socket name
    pub name: String,
    /// Name of the bone the socket attaches to
    pub parent_name: String,
    /// Local position
    pub position: Vec3,
    /// Local rotation quaternion
    pub rotation: Vec4,
    /// Local scale
    pub scale: Vec3,
}
