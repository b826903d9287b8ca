//! Exact-match vertex welding
//!
//! Vertices are keyed by the bit patterns of every component, joint indices
//! and weights included, so two corners weld only when all their attributes
//! are identical (`-0.0` and `0.0` stay distinct). Scope is one submesh.

use hashbrown::HashMap;
use smallvec::SmallVec;

use super::types::CompositeVertex;

type WeldKey = SmallVec<[u32; 16]>;

/// Pre-welding vertex index to the post-welding vertices derived from it.
///
/// One source vertex splits into several when the corners touching it carry
/// different normals or texcoords; several source vertices share one output
/// vertex when all their attributes coincide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeldMap {
    derived: HashMap<u32, SmallVec<[u32; 2]>>,
}

impl WeldMap {
    pub fn record(&mut self, pre: u32, post: u32) {
        let posts = self.derived.entry(pre).or_default();
        if !posts.contains(&post) {
            posts.push(post);
        }
    }

    /// Output vertices derived from source vertex `pre`
    pub fn derived(&self, pre: u32) -> &[u32] {
        self.derived.get(&pre).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u32])> {
        self.derived.iter().map(|(&pre, posts)| (pre, posts.as_slice()))
    }

    /// Number of distinct source vertices referenced
    pub fn len(&self) -> usize {
        self.derived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.derived.is_empty()
    }
}

/// Accumulates one submesh's deduplicated vertex and index buffers
#[derive(Debug, Default)]
pub struct Welder {
    lookup: HashMap<WeldKey, u32>,
    vertices: Vec<CompositeVertex>,
    indices: Vec<u32>,
    map: WeldMap,
}

impl Welder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one corner. Returns the output vertex id it resolved to.
    pub fn push(&mut self, vertex: CompositeVertex, pre: u32) -> u32 {
        let key = weld_key(&vertex);
        let id = match self.lookup.get(&key) {
            Some(&id) => id,
            None => {
                let id = self.vertices.len() as u32;
                self.lookup.insert(key, id);
                self.vertices.push(vertex);
                id
            }
        };
        self.indices.push(id);
        self.map.record(pre, id);
        id
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn finish(self) -> (Vec<CompositeVertex>, Vec<u32>, WeldMap) {
        (self.vertices, self.indices, self.map)
    }
}

fn weld_key(vertex: &CompositeVertex) -> WeldKey {
    let mut key = WeldKey::new();
    // Layout word keeps vertices with different attribute sets apart
    let layout = vertex.normal.is_some() as u32
        | (vertex.color.is_some() as u32) << 1
        | (vertex.texcoords.len() as u32) << 2
        | (vertex.joints.len() as u32) << 8;
    key.push(layout);
    key.extend(vertex.position.iter().map(|c| c.to_bits()));
    if let Some(normal) = vertex.normal {
        key.extend(normal.iter().map(|c| c.to_bits()));
    }
    for uv in &vertex.texcoords {
        key.extend(uv.iter().map(|c| c.to_bits()));
    }
    if let Some(color) = vertex.color {
        key.extend(color.iter().map(|c| c.to_bits()));
    }
    key.extend(vertex.joints.iter().map(|&j| u32::from(j)));
    key.extend(vertex.weights.iter().map(|w| w.to_bits()));
    key
}
