//! Document root, element lookups and the one-time structural validation

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::animation::{Animation, AnimationClip};
use crate::controller::{Controller, ControllerElement};
use crate::geometry::{GeometricElement, Geometry, Primitive, PrimitiveData};
use crate::reference::fragment;
use crate::scene::{Node, SceneRef, VisualScene};
use crate::source::Source;
use crate::traits::{impl_has_id, impl_has_name, HasId};

/// Root of a parsed document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub asset: AssetInfo,
    #[serde(default)]
    pub geometries: Vec<Geometry>,
    #[serde(default)]
    pub controllers: Vec<Controller>,
    #[serde(default)]
    pub materials: Vec<Material>,
    /// `<library_nodes>`: nodes only reachable through `instance_node`
    #[serde(default)]
    pub library_nodes: Vec<Node>,
    #[serde(default)]
    pub visual_scenes: Vec<VisualScene>,
    #[serde(default)]
    pub animations: Vec<Animation>,
    #[serde(default)]
    pub animation_clips: Vec<AnimationClip>,
    #[serde(default)]
    pub scene: Option<SceneRef>,
}

/// `<asset>` metadata relevant to assembly
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetInfo {
    #[serde(default)]
    pub up_axis: UpAxis,
    #[serde(default)]
    pub unit: Unit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpAxis {
    #[serde(rename = "X_UP")]
    XUp,
    #[default]
    #[serde(rename = "Y_UP")]
    YUp,
    #[serde(rename = "Z_UP")]
    ZUp,
}

/// `<unit>`: how many meters one document unit spans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(default = "default_unit_name")]
    pub name: String,
    #[serde(default = "default_meter")]
    pub meter: f32,
}

impl Default for Unit {
    fn default() -> Self {
        Self {
            name: default_unit_name(),
            meter: default_meter(),
        }
    }
}

fn default_unit_name() -> String {
    "meter".to_string()
}

fn default_meter() -> f32 {
    1.0
}

/// `<material>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// `<instance_effect url>`
    #[serde(default)]
    pub effect: Option<String>,
}

impl_has_id!(Material);
impl_has_name!(Material);

/// Structural problems detected once, right after parsing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("id '{0}' is declared more than once")]
    DuplicateId(String),

    #[error("source '{0}' has an empty array")]
    EmptySource(String),

    #[error("accessor of source '{source_id}' needs {required} values but its array holds {available}")]
    AccessorOutOfRange {
        source_id: String,
        required: usize,
        available: usize,
    },

    #[error("{kind} primitive in geometry '{geometry}' has {len} indices, not a multiple of its tuple width {stride}")]
    RaggedIndices {
        geometry: String,
        kind: &'static str,
        len: usize,
        stride: usize,
    },

    #[error("polylist in geometry '{geometry}' declares {expected} corners in vcount but p holds {actual}")]
    VcountMismatch {
        geometry: String,
        expected: usize,
        actual: usize,
    },
}

impl Document {
    /// Find a geometry by `#id` reference
    pub fn geometry(&self, reference: &str) -> Option<&Geometry> {
        find_by_id(&self.geometries, reference)
    }

    pub fn controller(&self, reference: &str) -> Option<&Controller> {
        find_by_id(&self.controllers, reference)
    }

    pub fn material(&self, reference: &str) -> Option<&Material> {
        find_by_id(&self.materials, reference)
    }

    pub fn visual_scene(&self, reference: &str) -> Option<&VisualScene> {
        find_by_id(&self.visual_scenes, reference)
    }

    /// Find an animation anywhere in the (possibly nested) animation library
    pub fn animation(&self, reference: &str) -> Option<&Animation> {
        let id = fragment(reference)?;
        self.animations.iter().find_map(|a| a.find(id))
    }

    /// The visual scene named by `<scene>`, falling back to the first one
    pub fn active_visual_scene(&self) -> Option<&VisualScene> {
        match &self.scene {
            Some(scene) => self.visual_scene(&scene.visual_scene),
            None => self.visual_scenes.first(),
        }
    }

    /// Build an id index over every node in the library and all visual scenes
    pub fn node_index(&self) -> NodeIndex<'_> {
        let mut index = NodeIndex::default();
        for node in &self.library_nodes {
            index.insert_recursive(node);
        }
        for scene in &self.visual_scenes {
            for node in &scene.nodes {
                index.insert_recursive(node);
            }
        }
        index
    }

    /// Structural checks performed once after parsing.
    ///
    /// Catches the problems that would otherwise surface deep inside
    /// assembly: duplicate ids, empty sources, accessors reading past their
    /// arrays, and ragged primitive index lists.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for geometry in &self.geometries {
            check_unique(&mut seen, geometry.id())?;
        }
        for controller in &self.controllers {
            check_unique(&mut seen, controller.id())?;
        }
        for material in &self.materials {
            check_unique(&mut seen, material.id())?;
        }
        for scene in &self.visual_scenes {
            check_unique(&mut seen, scene.id())?;
        }
        let mut node_ids = Vec::new();
        for node in &self.library_nodes {
            collect_node_ids(node, &mut node_ids);
        }
        for scene in &self.visual_scenes {
            for node in &scene.nodes {
                collect_node_ids(node, &mut node_ids);
            }
        }
        for id in node_ids {
            check_unique(&mut seen, Some(id))?;
        }

        for geometry in &self.geometries {
            if let GeometricElement::Mesh(mesh) = &geometry.element {
                validate_sources(&mesh.sources)?;
                let label = geometry.id().unwrap_or("<unnamed>");
                for primitive in &mesh.primitives {
                    validate_primitive(label, primitive)?;
                }
            }
        }
        for controller in &self.controllers {
            match &controller.element {
                ControllerElement::Skin(skin) => validate_sources(&skin.sources)?,
                ControllerElement::Morph(morph) => validate_sources(&morph.sources)?,
            }
        }
        for animation in &self.animations {
            validate_animation(animation)?;
        }
        Ok(())
    }
}

fn find_by_id<'a, T: HasId>(elements: &'a [T], reference: &str) -> Option<&'a T> {
    let id = fragment(reference)?;
    elements.iter().find(|e| e.id() == Some(id))
}

fn check_unique<'a>(
    seen: &mut HashSet<&'a str>,
    id: Option<&'a str>,
) -> Result<(), ValidationError> {
    match id {
        Some(id) if !seen.insert(id) => Err(ValidationError::DuplicateId(id.to_string())),
        _ => Ok(()),
    }
}

fn collect_node_ids<'a>(node: &'a Node, out: &mut Vec<&'a str>) {
    if let Some(id) = node.id.as_deref() {
        out.push(id);
    }
    for child in &node.children {
        collect_node_ids(child, out);
    }
}

fn validate_sources(sources: &[Source]) -> Result<(), ValidationError> {
    for source in sources {
        let label = source.id().unwrap_or("<unnamed>");
        if source.array.is_empty() {
            return Err(ValidationError::EmptySource(label.to_string()));
        }
        if let Some(accessor) = &source.accessor {
            let required = accessor.required_len().unwrap_or(usize::MAX);
            let available = source.array.len();
            if required > available {
                return Err(ValidationError::AccessorOutOfRange {
                    source_id: label.to_string(),
                    required,
                    available,
                });
            }
        }
    }
    Ok(())
}

fn validate_animation(animation: &Animation) -> Result<(), ValidationError> {
    validate_sources(&animation.sources)?;
    for child in &animation.children {
        validate_animation(child)?;
    }
    Ok(())
}

fn validate_primitive(geometry: &str, primitive: &Primitive) -> Result<(), ValidationError> {
    let stride = primitive.index_stride();
    let ragged = |len: usize| ValidationError::RaggedIndices {
        geometry: geometry.to_string(),
        kind: primitive.data.kind_name(),
        len,
        stride,
    };
    match &primitive.data {
        PrimitiveData::Triangles { p } | PrimitiveData::Lines { p } => {
            if p.len() % stride != 0 {
                return Err(ragged(p.len()));
            }
        }
        PrimitiveData::Polylist { vcount, p } => {
            if p.len() % stride != 0 {
                return Err(ragged(p.len()));
            }
            let expected: usize = vcount.iter().map(|&n| n as usize).sum();
            if expected != p.len() / stride {
                return Err(ValidationError::VcountMismatch {
                    geometry: geometry.to_string(),
                    expected,
                    actual: p.len() / stride,
                });
            }
        }
        PrimitiveData::Polygons { faces: lists }
        | PrimitiveData::Trifans { fans: lists }
        | PrimitiveData::Tristrips { strips: lists }
        | PrimitiveData::Linestrips { strips: lists } => {
            if let Some(list) = lists.iter().find(|list| list.len() % stride != 0) {
                return Err(ragged(list.len()));
            }
        }
    }
    Ok(())
}

/// Id lookup over every node reachable by `instance_node`
#[derive(Debug, Default)]
pub struct NodeIndex<'a> {
    by_id: HashMap<&'a str, &'a Node>,
}

impl<'a> NodeIndex<'a> {
    fn insert_recursive(&mut self, node: &'a Node) {
        if let Some(id) = node.id.as_deref() {
            self.by_id.entry(id).or_insert(node);
        }
        for child in &node.children {
            self.insert_recursive(child);
        }
    }

    pub fn get(&self, reference: &str) -> Option<&'a Node> {
        fragment(reference).and_then(|id| self.by_id.get(id).copied())
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
