//! Document and content summaries

use nether_assembly::packing::{interleave, narrow_indices_u16};
use nether_assembly::ContentAsset;
use nether_dae::traits::label;
use nether_dae::{ControllerElement, Document, GeometricElement, HasId};
use std::path::Path;

/// List geometries, controllers, scenes and clips of a document
pub fn list_document(doc: &Document, path: &Path) {
    tracing::info!(
        "Document {:?}: {:?}, {} meter(s) per unit",
        path,
        doc.asset.up_axis,
        doc.asset.unit.meter
    );

    tracing::info!("Geometries: {}", doc.geometries.len());
    for geometry in &doc.geometries {
        match &geometry.element {
            GeometricElement::Mesh(mesh) => {
                let kinds: Vec<&str> = mesh.primitives.iter().map(|p| p.data.kind_name()).collect();
                tracing::info!("  '{}': mesh [{}]", label(geometry), kinds.join(", "));
            }
            other => tracing::info!("  '{}': {}", label(geometry), other.kind_name()),
        }
    }

    tracing::info!("Controllers: {}", doc.controllers.len());
    for controller in &doc.controllers {
        let kind = match &controller.element {
            ControllerElement::Skin(_) => "skin",
            ControllerElement::Morph(_) => "morph",
        };
        tracing::info!(
            "  '{}': {} of {}",
            label(controller),
            kind,
            controller.element.base()
        );
    }

    let active = doc.active_visual_scene().and_then(|scene| scene.id());
    tracing::info!("Visual scenes: {}", doc.visual_scenes.len());
    for scene in &doc.visual_scenes {
        let marker = if scene.id().is_some() && scene.id() == active {
            " (active)"
        } else {
            ""
        };
        tracing::info!(
            "  '{}': {} root nodes{}",
            label(scene),
            scene.nodes.len(),
            marker
        );
    }

    tracing::info!(
        "Animations: {}, clips: {}",
        doc.animations.len(),
        doc.animation_clips.len()
    );
    for clip in &doc.animation_clips {
        tracing::info!(
            "  '{}': {} animations from {}s",
            label(clip),
            clip.animations.len(),
            clip.start
        );
    }
}

/// Log per-mesh statistics of assembled content
pub fn summarize_content(content: &ContentAsset) {
    for (key, mesh) in &content.meshes {
        let joints = mesh.skeleton.as_ref().map_or(0, |s| s.joints.len());
        tracing::info!(
            "  '{}': {} submeshes, {} vertices, {} joints",
            key,
            mesh.submeshes.len(),
            mesh.vertex_count(),
            joints
        );
        for submesh in &mesh.submeshes {
            let material = submesh.material.as_deref().unwrap_or("<none>");
            match interleave(submesh) {
                Ok(packed) => tracing::debug!(
                    "    {}: stride {} bytes, {} bytes packed, 16-bit indices: {}",
                    material,
                    packed.stride,
                    packed.bytes.len(),
                    narrow_indices_u16(&packed.indices).is_ok()
                ),
                Err(e) => tracing::debug!("    {}: not packable ({})", material, e),
            }
        }
    }
    for clip in &content.clips {
        tracing::info!(
            "  clip '{}': {} tracks, {}s to {}s",
            clip.name,
            clip.tracks.len(),
            clip.start,
            clip.end
        );
    }
}
