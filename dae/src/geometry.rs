//! Geometry elements: meshes, their vertex inputs and primitive batches

use serde::{Deserialize, Serialize};

use crate::source::Source;
use crate::traits::{impl_has_id, impl_has_name};

/// `<geometry>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub element: GeometricElement,
}

impl_has_id!(Geometry);
impl_has_name!(Geometry);

/// The single geometric element a `<geometry>` wraps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometricElement {
    Mesh(Mesh),
    ConvexMesh {
        #[serde(default)]
        convex_hull_of: Option<String>,
    },
    Spline(Spline),
}

impl GeometricElement {
    pub fn kind_name(&self) -> &'static str {
        match self {
            GeometricElement::Mesh(_) => "mesh",
            GeometricElement::ConvexMesh { .. } => "convex_mesh",
            GeometricElement::Spline(_) => "spline",
        }
    }
}

/// `<spline>`; carried for completeness, never renderable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spline {
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub control_vertices: Vec<UnsharedInput>,
}

/// `<mesh>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(default)]
    pub sources: Vec<Source>,
    pub vertices: Vertices,
    #[serde(default)]
    pub primitives: Vec<Primitive>,
}

/// `<vertices>`: the per-vertex attributes addressed through the `VERTEX` input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertices {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub inputs: Vec<UnsharedInput>,
}

/// `<input>` without an offset (vertices, joints, samplers)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsharedInput {
    pub semantic: Semantic,
    pub source: String,
}

/// `<input>` inside a primitive or `<vertex_weights>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedInput {
    pub semantic: Semantic,
    pub source: String,
    pub offset: usize,
    #[serde(default)]
    pub set: Option<u32>,
}

/// One primitive batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    #[serde(default)]
    pub name: Option<String>,
    /// Material symbol, bound per node instance by `<bind_material>`
    #[serde(default)]
    pub material: Option<String>,
    pub count: usize,
    pub inputs: Vec<SharedInput>,
    pub data: PrimitiveData,
}

impl Primitive {
    /// Width of one index tuple in the `p` array: highest input offset + 1
    pub fn index_stride(&self) -> usize {
        self.inputs
            .iter()
            .map(|input| input.offset + 1)
            .max()
            .unwrap_or(1)
    }
}

/// Topology-specific index data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveData {
    Triangles { p: Vec<u32> },
    /// Variable-arity faces; `vcount[i]` is the corner count of face `i`
    Polylist { vcount: Vec<u32>, p: Vec<u32> },
    /// One index list per face
    Polygons { faces: Vec<Vec<u32>> },
    Trifans { fans: Vec<Vec<u32>> },
    Tristrips { strips: Vec<Vec<u32>> },
    Lines { p: Vec<u32> },
    Linestrips { strips: Vec<Vec<u32>> },
}

impl PrimitiveData {
    pub fn kind_name(&self) -> &'static str {
        match self {
            PrimitiveData::Triangles { .. } => "triangles",
            PrimitiveData::Polylist { .. } => "polylist",
            PrimitiveData::Polygons { .. } => "polygons",
            PrimitiveData::Trifans { .. } => "trifans",
            PrimitiveData::Tristrips { .. } => "tristrips",
            PrimitiveData::Lines { .. } => "lines",
            PrimitiveData::Linestrips { .. } => "linestrips",
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(
            self,
            PrimitiveData::Lines { .. } | PrimitiveData::Linestrips { .. }
        )
    }

    /// Total number of index values across all lists
    pub fn index_len(&self) -> usize {
        match self {
            PrimitiveData::Triangles { p }
            | PrimitiveData::Lines { p }
            | PrimitiveData::Polylist { p, .. } => p.len(),
            PrimitiveData::Polygons { faces: lists }
            | PrimitiveData::Trifans { fans: lists }
            | PrimitiveData::Tristrips { strips: lists }
            | PrimitiveData::Linestrips { strips: lists } => lists.iter().map(Vec::len).sum(),
        }
    }
}

/// Role of an input stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Semantic {
    Vertex,
    Position,
    Normal,
    TexCoord,
    Color,
    Tangent,
    Binormal,
    TexTangent,
    TexBinormal,
    Joint,
    Weight,
    InvBindMatrix,
    Input,
    Output,
    Interpolation,
    InTangent,
    OutTangent,
    MorphTarget,
    MorphWeight,
    Other(String),
}

impl Semantic {
    pub fn as_str(&self) -> &str {
        match self {
            Semantic::Vertex => "VERTEX",
            Semantic::Position => "POSITION",
            Semantic::Normal => "NORMAL",
            Semantic::TexCoord => "TEXCOORD",
            Semantic::Color => "COLOR",
            Semantic::Tangent => "TANGENT",
            Semantic::Binormal => "BINORMAL",
            Semantic::TexTangent => "TEXTANGENT",
            Semantic::TexBinormal => "TEXBINORMAL",
            Semantic::Joint => "JOINT",
            Semantic::Weight => "WEIGHT",
            Semantic::InvBindMatrix => "INV_BIND_MATRIX",
            Semantic::Input => "INPUT",
            Semantic::Output => "OUTPUT",
            Semantic::Interpolation => "INTERPOLATION",
            Semantic::InTangent => "IN_TANGENT",
            Semantic::OutTangent => "OUT_TANGENT",
            Semantic::MorphTarget => "MORPH_TARGET",
            Semantic::MorphWeight => "MORPH_WEIGHT",
            Semantic::Other(name) => name,
        }
    }
}

impl From<String> for Semantic {
    fn from(name: String) -> Self {
        match name.as_str() {
            "VERTEX" => Semantic::Vertex,
            "POSITION" => Semantic::Position,
            "NORMAL" => Semantic::Normal,
            "TEXCOORD" | "UV" => Semantic::TexCoord,
            "COLOR" => Semantic::Color,
            "TANGENT" => Semantic::Tangent,
            "BINORMAL" => Semantic::Binormal,
            "TEXTANGENT" => Semantic::TexTangent,
            "TEXBINORMAL" => Semantic::TexBinormal,
            "JOINT" => Semantic::Joint,
            "WEIGHT" => Semantic::Weight,
            "INV_BIND_MATRIX" => Semantic::InvBindMatrix,
            "INPUT" => Semantic::Input,
            "OUTPUT" => Semantic::Output,
            "INTERPOLATION" => Semantic::Interpolation,
            "IN_TANGENT" => Semantic::InTangent,
            "OUT_TANGENT" => Semantic::OutTangent,
            "MORPH_TARGET" => Semantic::MorphTarget,
            "MORPH_WEIGHT" => Semantic::MorphWeight,
            _ => Semantic::Other(name),
        }
    }
}

impl From<Semantic> for String {
    fn from(semantic: Semantic) -> Self {
        semantic.as_str().to_string()
    }
}

impl std::fmt::Display for Semantic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
