//! nether-assembly library
//!
//! Turns a parsed interchange [`Document`](nether_dae::Document) into
//! renderer-ready content: welded vertex/index buffers per submesh, skeletons
//! with bind-pose data, a flattened scene graph and keyframe tracks grouped by
//! clip.
//!
//! The entry point is [`assemble_content`]. Each component is also usable on
//! its own:
//!
//! - [`accessor`] resolves sources and strided accessors into tuples
//! - [`scene`] composes transform stacks and flattens the node tree
//! - [`mesh`] decodes primitives, triangulates and welds vertices
//! - [`skin`] binds joints and per-vertex influences
//! - [`animation`] resolves samplers and SID-path targets into tracks
//! - [`material`] maps material symbols to per-instance materials
//! - [`packing`] interleaves submeshes into GPU vertex buffers
//!
//! Assembly is a pure function of its input: nothing is cached between calls
//! and the returned [`ContentAsset`] holds no references into the document.

pub mod accessor;
pub mod animation;
pub mod assemble;
pub mod error;
pub mod material;
pub mod mesh;
pub mod options;
pub mod packing;
pub mod scene;
pub mod skin;
pub mod transform;

#[cfg(test)]
mod test_support;

// Re-export the entry points and the content model
pub use assemble::{
    assemble_content, assemble_content_with_cancel, AssembledMesh, ContentAsset, MeshInstance,
    MeshSourceKind,
};
pub use error::{AssemblyError, ErrorKind, Result};
pub use options::AssemblyOptions;

pub use animation::{AnimationClipTracks, AnimationTrack, Interpolation, Keyframe};
pub use material::MaterialBinding;
pub use mesh::{CompositeVertex, Submesh, Topology};
pub use scene::{FlatScene, SceneNodeInstance};
pub use skin::{Skeleton, SkeletonJoint};
