//! Whole-document assembly
//!
//! [`assemble_content`] drives every resolver over the active visual scene:
//! it flattens the node graph, composes each referenced geometry or
//! controller exactly once, binds materials per instance and builds the
//! animation clips. Mesh units and clips are independent of each other and
//! are processed on the rayon pool unless [`AssemblyOptions::parallel`] is
//! off. Any failing unit aborts the whole assembly.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use hashbrown::HashMap;
use nether_dae::{
    fragment, AnimationClip, Controller, ControllerElement, Document, Geometry, InstanceController,
    NodeInstance, VisualScene,
};
use rayon::prelude::*;
use serde::Serialize;

use crate::animation::{build_clip_tracks, AnimationClipTracks};
use crate::error::{AssemblyError, Result};
use crate::material::{resolve_bindings, MaterialBinding};
use crate::mesh::{compose_geometry, compose_mesh_source, Submesh};
use crate::options::AssemblyOptions;
use crate::scene::{flatten_with_origins, FlatScene, SceneNodeInstance};
use crate::skin::{bind_skin, Skeleton};

/// Renderer-ready content of one document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentAsset {
    /// Composed meshes keyed by geometry or controller id
    pub meshes: BTreeMap<String, AssembledMesh>,
    pub clips: Vec<AnimationClipTracks>,
    /// Flattened scene, parents before children
    pub nodes: Vec<SceneNodeInstance>,
}

impl ContentAsset {
    pub fn mesh(&self, id: &str) -> Option<&AssembledMesh> {
        self.meshes.get(id)
    }

    pub fn clip(&self, name: &str) -> Option<&AnimationClipTracks> {
        self.clips.iter().find(|c| c.name == name)
    }

    /// Every node instantiating `mesh`, with its instance record
    pub fn instances_of<'a>(
        &'a self,
        mesh: &'a str,
    ) -> impl Iterator<Item = (usize, &'a MeshInstance)> + 'a {
        self.nodes.iter().enumerate().flat_map(move |(index, node)| {
            node.instances
                .iter()
                .filter(move |instance| instance.mesh == mesh)
                .map(move |instance| (index, instance))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledMesh {
    pub name: Option<String>,
    pub submeshes: Vec<Submesh>,
    /// Present for skin controllers
    pub skeleton: Option<Skeleton>,
}

impl AssembledMesh {
    pub fn vertex_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.vertices.len()).sum()
    }

    /// Material symbols in submesh order
    pub fn material_symbols(&self) -> impl Iterator<Item = &str> {
        self.submeshes.iter().filter_map(|s| s.material.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshSourceKind {
    Geometry,
    Controller,
}

/// One geometry or controller instance on a scene node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshInstance {
    /// Key into [`ContentAsset::meshes`]
    pub mesh: String,
    pub kind: MeshSourceKind,
    pub name: Option<String>,
    pub materials: Vec<MaterialBinding>,
}

/// A geometry or controller composed once, however often it is instanced
enum MeshUnit<'a> {
    Geometry {
        key: &'a str,
        geometry: &'a Geometry,
    },
    Controller {
        key: &'a str,
        controller: &'a Controller,
        instance: &'a InstanceController,
    },
}

impl<'a> MeshUnit<'a> {
    fn key(&self) -> &'a str {
        match self {
            MeshUnit::Geometry { key, .. } | MeshUnit::Controller { key, .. } => *key,
        }
    }
}

/// Assemble the active visual scene of `doc`.
pub fn assemble_content(doc: &Document, options: &AssemblyOptions) -> Result<ContentAsset> {
    assemble_content_with_cancel(doc, options, &AtomicBool::new(false))
}

/// Like [`assemble_content`], checking `cancel` between units.
///
/// Returns [`AssemblyError::Cancelled`] once the flag is observed set.
/// Units already running finish first.
pub fn assemble_content_with_cancel(
    doc: &Document,
    options: &AssemblyOptions,
    cancel: &AtomicBool,
) -> Result<ContentAsset> {
    check_cancel(cancel)?;
    let Some(scene) = active_scene(doc)? else {
        tracing::warn!("Document has no visual scene, nothing to assemble");
        return Ok(ContentAsset::default());
    };

    let (mut flat, origins) = flatten_with_origins(doc, scene, options)?;
    tracing::debug!("Flattened scene into {} node instances", flat.len());

    // Units keyed by fragment, in order of first encounter
    let mut units: Vec<MeshUnit> = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for origin in &origins {
        for instance in &origin.instances {
            let unit = match instance {
                NodeInstance::Geometry(instance) => {
                    let key = instance_key(&instance.url)?;
                    let geometry = doc.geometry(&instance.url).ok_or_else(|| {
                        AssemblyError::reference(&instance.url, "instance_geometry")
                    })?;
                    MeshUnit::Geometry { key, geometry }
                }
                NodeInstance::Controller(instance) => {
                    let key = instance_key(&instance.url)?;
                    let controller = doc.controller(&instance.url).ok_or_else(|| {
                        AssemblyError::reference(&instance.url, "instance_controller")
                    })?;
                    MeshUnit::Controller {
                        key,
                        controller,
                        instance,
                    }
                }
                _ => continue,
            };
            match seen.get(unit.key()) {
                Some(&existing) => warn_divergent_skeletons(&units[existing], &unit),
                None => {
                    seen.insert(unit.key(), units.len());
                    units.push(unit);
                }
            }
        }
    }

    let flat_ref = &flat;
    let assembled = run_units(&units, options.parallel, cancel, |unit| {
        compose_unit(doc, unit, flat_ref, options).map(|mesh| (unit.key().to_string(), mesh))
    })?;
    let meshes: BTreeMap<String, AssembledMesh> = assembled.into_iter().collect();

    check_cancel(cancel)?;
    for (index, origin) in origins.iter().enumerate() {
        for instance in &origin.instances {
            let (url, name, bind_material, kind) = match instance {
                NodeInstance::Geometry(g) => (
                    &g.url,
                    g.name.as_deref(),
                    g.bind_material.as_ref(),
                    MeshSourceKind::Geometry,
                ),
                NodeInstance::Controller(c) => (
                    &c.url,
                    c.name.as_deref(),
                    c.bind_material.as_ref(),
                    MeshSourceKind::Controller,
                ),
                _ => continue,
            };
            let key = instance_key(url)?;
            let Some(mesh) = meshes.get(key) else {
                continue;
            };
            let context = format!("instance of '{key}'");
            let materials =
                resolve_bindings(doc, bind_material, mesh.material_symbols(), &context)?;
            flat.nodes[index].instances.push(MeshInstance {
                mesh: key.to_string(),
                kind,
                name: name.map(str::to_string),
                materials,
            });
        }
    }

    let clips: Vec<Option<&AnimationClip>> = if !doc.animation_clips.is_empty() {
        doc.animation_clips.iter().map(Some).collect()
    } else if !doc.animations.is_empty() {
        vec![None]
    } else {
        Vec::new()
    };
    let flat_ref = &flat;
    let clips = run_units(&clips, options.parallel, cancel, |clip| {
        build_clip_tracks(doc, *clip, flat_ref, options)
    })?;

    tracing::debug!(
        "Assembled {} meshes, {} clips, {} nodes",
        meshes.len(),
        clips.len(),
        flat.len()
    );

    Ok(ContentAsset {
        meshes,
        clips,
        nodes: flat.nodes,
    })
}

fn check_cancel(cancel: &AtomicBool) -> Result<()> {
    if cancel.load(Ordering::Relaxed) {
        return Err(AssemblyError::Cancelled);
    }
    Ok(())
}

/// `<scene>` must resolve when present; otherwise the first visual scene
fn active_scene(doc: &Document) -> Result<Option<&VisualScene>> {
    match &doc.scene {
        Some(scene) => doc
            .visual_scene(&scene.visual_scene)
            .map(Some)
            .ok_or_else(|| AssemblyError::reference(&scene.visual_scene, "scene")),
        None => Ok(doc.visual_scenes.first()),
    }
}

fn instance_key(url: &str) -> Result<&str> {
    fragment(url).ok_or_else(|| AssemblyError::reference(url, "instance url"))
}

/// A controller is bound once; later instances with other skeleton roots share it
fn warn_divergent_skeletons(existing: &MeshUnit, unit: &MeshUnit) {
    let (
        MeshUnit::Controller { instance: first, .. },
        MeshUnit::Controller { key, instance, .. },
    ) = (existing, unit)
    else {
        return;
    };
    if first.skeletons != instance.skeletons {
        tracing::warn!(
            "Controller '{}' instanced with different skeleton roots, using the first binding",
            key
        );
    }
}

fn compose_unit(
    doc: &Document,
    unit: &MeshUnit,
    flat: &FlatScene,
    options: &AssemblyOptions,
) -> Result<AssembledMesh> {
    match unit {
        MeshUnit::Geometry { key, geometry } => {
            tracing::debug!("Composing geometry '{}'", key);
            let composed = compose_geometry(doc, geometry, options)?;
            Ok(AssembledMesh {
                name: geometry.name.clone(),
                submeshes: composed.submeshes,
                skeleton: None,
            })
        }
        MeshUnit::Controller {
            key,
            controller,
            instance,
        } => match &controller.element {
            ControllerElement::Skin(skin) => {
                tracing::debug!("Binding skin '{}'", key);
                let skinned = bind_skin(doc, controller, skin, instance, flat, options)?;
                Ok(AssembledMesh {
                    name: controller.name.clone(),
                    submeshes: skinned.mesh.submeshes,
                    skeleton: Some(skinned.skeleton),
                })
            }
            ControllerElement::Morph(_) => {
                tracing::debug!("Composing morph base of '{}'", key);
                let context = format!("controller '{key}'");
                let composed = compose_mesh_source(doc, &instance.url, options, &context)?;
                Ok(AssembledMesh {
                    name: controller.name.clone(),
                    submeshes: composed.submeshes,
                    skeleton: None,
                })
            }
        },
    }
}

/// Map `items` in order, on the rayon pool when `parallel`.
fn run_units<T, R, F>(items: &[T], parallel: bool, cancel: &AtomicBool, f: F) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> Result<R> + Sync + Send,
{
    let run = |item: &T| {
        check_cancel(cancel)?;
        f(item)
    };
    if parallel {
        items.par_iter().map(run).collect()
    } else {
        items.iter().map(run).collect()
    }
}
