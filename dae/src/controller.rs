//! Controllers: skins and morphs wrapping a base geometry

use serde::{Deserialize, Serialize};

use crate::geometry::{SharedInput, UnsharedInput};
use crate::source::Source;
use crate::traits::{impl_has_id, impl_has_name};
use crate::IDENTITY_MATRIX;

/// `<controller>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controller {
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub element: ControllerElement,
}

impl_has_id!(Controller);
impl_has_name!(Controller);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerElement {
    Skin(Skin),
    Morph(Morph),
}

impl ControllerElement {
    /// Reference to the geometry (or nested controller) this one deforms
    pub fn base(&self) -> &str {
        match self {
            ControllerElement::Skin(skin) => &skin.source,
            ControllerElement::Morph(morph) => &morph.source,
        }
    }
}

/// `<skin>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skin {
    /// Reference to the skinned geometry
    pub source: String,
    /// Row-major mesh-space to bind-pose transform
    #[serde(default = "identity")]
    pub bind_shape_matrix: [f32; 16],
    #[serde(default)]
    pub sources: Vec<Source>,
    pub joints: Joints,
    pub vertex_weights: VertexWeights,
}

fn identity() -> [f32; 16] {
    IDENTITY_MATRIX
}

/// `<joints>`: parallel JOINT and INV_BIND_MATRIX sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joints {
    pub inputs: Vec<UnsharedInput>,
}

/// `<vertex_weights>`
///
/// `vcount[i]` is the number of (joint, weight) index tuples for pre-welding
/// vertex `i`; `v` holds those tuples back to back. A joint index of `-1`
/// refers to the bind shape itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexWeights {
    pub count: usize,
    pub inputs: Vec<SharedInput>,
    #[serde(default)]
    pub vcount: Vec<u32>,
    #[serde(default)]
    pub v: Vec<i64>,
}

impl VertexWeights {
    pub fn index_stride(&self) -> usize {
        self.inputs
            .iter()
            .map(|input| input.offset + 1)
            .max()
            .unwrap_or(1)
    }
}

/// `<morph>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Morph {
    pub source: String,
    #[serde(default)]
    pub method: MorphMethod,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub targets: Vec<UnsharedInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MorphMethod {
    #[default]
    Normalized,
    Relative,
}
