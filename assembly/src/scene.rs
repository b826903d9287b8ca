//! Scene flattening
//!
//! The node tree (plus `instance_node` references) is flattened depth-first
//! into an arena of [`SceneNodeInstance`]s addressed by index. Every node
//! appears after its parent, so world matrices are computed in one pass and
//! `parent < index` always holds.
//!
//! A node reachable through several instancing paths is instantiated once per
//! path. A chain that instances one of its own ancestors is a cycle.

use glam::Mat4;
use nether_dae::{
    Document, HasId, Node, NodeIndex, NodeInstance, NodeKind, Transform, VisualScene,
};
use serde::Serialize;

use crate::assemble::MeshInstance;
use crate::error::{AssemblyError, Result};
use crate::options::AssemblyOptions;
use crate::transform::{compose_local, up_axis_correction};

/// One instantiation of a document node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNodeInstance {
    pub id: Option<String>,
    pub name: Option<String>,
    pub sid: Option<String>,
    pub is_joint: bool,
    pub parent: Option<usize>,
    /// Local matrix, including the up-axis correction on roots
    pub local: Mat4,
    pub world: Mat4,
    /// Transform stack in document order, kept for animation targeting
    pub transforms: Vec<Transform>,
    /// Geometry and controller instances with their resolved materials
    pub instances: Vec<MeshInstance>,
}

/// Flattened node arena in depth-first order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlatScene {
    pub nodes: Vec<SceneNodeInstance>,
}

impl FlatScene {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(index, _)| index)
    }

    /// Parent chain of `index`, nearest first, `index` excluded
    pub fn ancestors(&self, index: usize) -> Ancestors<'_> {
        Ancestors {
            scene: self,
            next: self.nodes.get(index).and_then(|node| node.parent),
        }
    }

    /// Whether `index` is `root` or lies below it
    pub fn is_within(&self, index: usize, root: usize) -> bool {
        index == root || self.ancestors(index).any(|a| a == root)
    }

    /// Indices of every instantiation of the node with this id
    pub fn find_by_id<'a>(&'a self, id: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.id.as_deref() == Some(id))
            .map(|(index, _)| index)
    }
}

pub struct Ancestors<'a> {
    scene: &'a FlatScene,
    next: Option<usize>,
}

impl Iterator for Ancestors<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = self.scene.nodes.get(current).and_then(|node| node.parent);
        Some(current)
    }
}

/// Flatten `scene` into a [`FlatScene`].
pub fn flatten_scene(
    doc: &Document,
    scene: &VisualScene,
    options: &AssemblyOptions,
) -> Result<FlatScene> {
    flatten_with_origins(doc, scene, options).map(|(flat, _)| flat)
}

/// Flatten and also return the document node behind each instantiation
pub(crate) fn flatten_with_origins<'a>(
    doc: &'a Document,
    scene: &'a VisualScene,
    options: &AssemblyOptions,
) -> Result<(FlatScene, Vec<&'a Node>)> {
    let mut flattener = Flattener {
        index: doc.node_index(),
        unit_scale: options.unit_scale(doc.asset.unit.meter),
        nodes: Vec::new(),
        origins: Vec::new(),
        path: Vec::new(),
    };

    let correction = if options.up_axis_normalization {
        up_axis_correction(doc.asset.up_axis)
    } else {
        Mat4::IDENTITY
    };

    for root in &scene.nodes {
        flattener.visit(root, None, correction)?;
    }

    tracing::debug!(
        "Flattened scene '{}': {} node instances",
        scene.id().unwrap_or("<unnamed>"),
        flattener.nodes.len()
    );

    Ok((FlatScene { nodes: flattener.nodes }, flattener.origins))
}

struct Flattener<'a> {
    index: NodeIndex<'a>,
    unit_scale: f32,
    nodes: Vec<SceneNodeInstance>,
    origins: Vec<&'a Node>,
    /// Document nodes on the current traversal path
    path: Vec<&'a Node>,
}

impl<'a> Flattener<'a> {
    /// `pre` is the parent world matrix, or the root correction for roots
    fn visit(&mut self, node: &'a Node, parent: Option<usize>, pre: Mat4) -> Result<()> {
        if self.path.iter().any(|visited| std::ptr::eq(*visited, node)) {
            return Err(self.cycle(node));
        }

        let local = match parent {
            Some(_) => compose_local(&node.transforms, self.unit_scale),
            None => pre * compose_local(&node.transforms, self.unit_scale),
        };
        let world = match parent {
            Some(_) => pre * local,
            None => local,
        };

        let index = self.nodes.len();
        self.nodes.push(SceneNodeInstance {
            id: node.id.clone(),
            name: node.name.clone(),
            sid: node.sid.clone(),
            is_joint: node.kind == NodeKind::Joint,
            parent,
            local,
            world,
            transforms: node.transforms.clone(),
            instances: Vec::new(),
        });
        self.origins.push(node);
        self.path.push(node);

        for child in &node.children {
            self.visit(child, Some(index), world)?;
        }

        for instance in &node.instances {
            let NodeInstance::Node(instance) = instance else {
                continue;
            };
            let target = self.index.get(&instance.url).ok_or_else(|| {
                AssemblyError::reference(
                    &instance.url,
                    format!("instance_node of node '{}'", node_label(node)),
                )
            })?;
            self.visit(target, Some(index), world)?;
        }

        self.path.pop();
        Ok(())
    }

    fn cycle(&self, node: &Node) -> AssemblyError {
        let start = self
            .path
            .iter()
            .position(|visited| std::ptr::eq(*visited, node))
            .unwrap_or(0);
        let mut path: Vec<String> = self.path[start..]
            .iter()
            .map(|n| node_label(n).to_string())
            .collect();
        path.push(node_label(node).to_string());
        AssemblyError::CycleDetected { path }
    }
}

fn node_label(node: &Node) -> &str {
    node.id
        .as_deref()
        .or(node.name.as_deref())
        .unwrap_or("<unnamed>")
}
