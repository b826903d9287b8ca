//! Scene graph elements: nodes, transform stacks and instances

use serde::{Deserialize, Serialize};

use crate::traits::{impl_has_id, impl_has_name, impl_has_sid};

/// `<visual_scene>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualScene {
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl_has_id!(VisualScene);
impl_has_name!(VisualScene);

/// `<scene><instance_visual_scene>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRef {
    pub visual_scene: String,
}

/// `<node>`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub kind: NodeKind,
    /// Transform elements in document order
    #[serde(default)]
    pub transforms: Vec<Transform>,
    #[serde(default)]
    pub instances: Vec<NodeInstance>,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl_has_id!(Node);
impl_has_name!(Node);
impl_has_sid!(Node);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    #[default]
    Node,
    Joint,
}

/// One element of a node's transform stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub sid: Option<String>,
    pub kind: TransformKind,
}

impl_has_sid!(Transform);

impl Transform {
    pub fn new(kind: TransformKind) -> Self {
        Self { sid: None, kind }
    }

    pub fn with_sid(sid: &str, kind: TransformKind) -> Self {
        Self {
            sid: Some(sid.to_string()),
            kind,
        }
    }
}

/// Transform element payloads, in document units.
///
/// `Matrix` is row-major as written in the document; `Rotate` is
/// `[axis_x, axis_y, axis_z, angle_degrees]`; `Skew` is
/// `[angle_degrees, rotation_axis(3), translation_axis(3)]`; `Lookat` is
/// `[eye(3), interest(3), up(3)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Matrix([f32; 16]),
    Translate([f32; 3]),
    Rotate([f32; 4]),
    Scale([f32; 3]),
    Skew([f32; 7]),
    Lookat([f32; 9]),
}

impl TransformKind {
    /// Flat parameter values in document order
    pub fn values(&self) -> &[f32] {
        match self {
            TransformKind::Matrix(v) => v.as_slice(),
            TransformKind::Translate(v) | TransformKind::Scale(v) => v.as_slice(),
            TransformKind::Rotate(v) => v.as_slice(),
            TransformKind::Skew(v) => v.as_slice(),
            TransformKind::Lookat(v) => v.as_slice(),
        }
    }

    pub fn element_name(&self) -> &'static str {
        match self {
            TransformKind::Matrix(_) => "matrix",
            TransformKind::Translate(_) => "translate",
            TransformKind::Rotate(_) => "rotate",
            TransformKind::Scale(_) => "scale",
            TransformKind::Skew(_) => "skew",
            TransformKind::Lookat(_) => "lookat",
        }
    }
}

/// Instances attached to a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeInstance {
    Geometry(InstanceGeometry),
    Controller(InstanceController),
    Node(InstanceNode),
    Camera { url: String },
    Light { url: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceGeometry {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bind_material: Option<BindMaterial>,
}

impl_has_name!(InstanceGeometry);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceController {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    /// `<skeleton>` roots that scope joint lookups
    #[serde(default)]
    pub skeletons: Vec<String>,
    #[serde(default)]
    pub bind_material: Option<BindMaterial>,
}

impl_has_name!(InstanceController);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceNode {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `<bind_material><technique_common>`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BindMaterial {
    #[serde(default)]
    pub instance_materials: Vec<InstanceMaterial>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceMaterial {
    pub symbol: String,
    /// Reference to a `<material>`
    pub target: String,
    #[serde(default)]
    pub bind_vertex_inputs: Vec<BindVertexInput>,
}

/// Binds an effect texcoord semantic to a geometry input set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindVertexInput {
    pub semantic: String,
    pub input_semantic: String,
    #[serde(default)]
    pub input_set: Option<u32>,
}
