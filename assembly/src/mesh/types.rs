//! Assembled mesh types

use serde::Serialize;
use smallvec::SmallVec;

/// Primitive layout of a submesh's index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Topology {
    /// Three indices per triangle, counter-clockwise front faces
    TriangleList,
    /// Two indices per segment
    LineList,
}

impl Topology {
    pub fn indices_per_primitive(self) -> usize {
        match self {
            Topology::TriangleList => 3,
            Topology::LineList => 2,
        }
    }
}

/// One fully resolved vertex: every attribute a corner references
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CompositeVertex {
    pub position: [f32; 3],
    pub normal: Option<[f32; 3]>,
    /// Texture coordinates ordered by input set
    pub texcoords: SmallVec<[[f32; 2]; 2]>,
    /// RGBA; three-component sources get alpha 1.0
    pub color: Option<[f32; 4]>,
    /// Skeleton joint indices, parallel to `weights` (skinned meshes only)
    pub joints: SmallVec<[u16; 4]>,
    pub weights: SmallVec<[f32; 4]>,
}

impl CompositeVertex {
    pub fn is_skinned(&self) -> bool {
        !self.joints.is_empty()
    }
}

/// Bounded joint influences of one source vertex, in skeleton joint indices
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkinInfluence {
    pub joints: SmallVec<[u16; 4]>,
    pub weights: SmallVec<[f32; 4]>,
}

/// Vertices and indices sharing one material symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submesh {
    /// Material symbol from the primitive; bound per node instance
    pub material: Option<String>,
    pub topology: Topology,
    pub vertices: Vec<CompositeVertex>,
    pub indices: Vec<u32>,
}

impl Submesh {
    pub fn primitive_count(&self) -> usize {
        self.indices.len() / self.topology.indices_per_primitive()
    }
}
