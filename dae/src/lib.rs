//! Parsed interchange-document model
//!
//! The markup front end produces a [`Document`]: an immutable tree of sources,
//! accessors, geometries, controllers, materials, scene nodes and animations.
//! Element kinds that the format leaves loosely typed are modelled here as
//! tagged unions, and the shared identity fields are exposed through the
//! [`HasId`], [`HasName`] and [`HasSid`] capability traits.
//!
//! Everything in this crate is plain data. Conversion into renderer-ready
//! content lives in `nether-assembly`.

pub mod animation;
pub mod controller;
pub mod document;
pub mod geometry;
pub mod reference;
pub mod scene;
pub mod source;
pub mod traits;

pub use animation::{Animation, AnimationClip, Channel, Sampler};
pub use controller::{
    Controller, ControllerElement, Joints, Morph, MorphMethod, Skin, VertexWeights,
};
pub use document::{AssetInfo, Document, Material, NodeIndex, Unit, UpAxis, ValidationError};
pub use geometry::{
    GeometricElement, Geometry, Mesh, Primitive, PrimitiveData, Semantic, SharedInput, Spline,
    UnsharedInput, Vertices,
};
pub use reference::fragment;
pub use scene::{
    BindMaterial, BindVertexInput, InstanceController, InstanceGeometry, InstanceMaterial,
    InstanceNode, Node, NodeInstance, NodeKind, SceneRef, Transform, TransformKind, VisualScene,
};
pub use source::{Accessor, DataArray, Param, Source};
pub use traits::{HasId, HasName, HasSid};

/// Row-major 4x4 identity, the default for matrix-valued document fields
pub const IDENTITY_MATRIX: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];
