//! Vertex stream composition
//!
//! Primitive index tuples are decoded per topology, triangulated, resolved
//! into [`CompositeVertex`]es and welded into one deduplicated vertex/index
//! buffer per material symbol.

mod compose;
mod topology;
mod types;
mod weld;

pub use compose::{compose_geometry, compose_mesh_source, compose_skinned_source, ComposedMesh};
pub use types::{CompositeVertex, SkinInfluence, Submesh, Topology};
pub use weld::{WeldMap, Welder};
