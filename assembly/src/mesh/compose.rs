//! Geometry composition: primitives to welded submeshes

use hashbrown::HashMap;
use nether_dae::{
    fragment, ControllerElement, Document, GeometricElement, Geometry, HasId, Mesh, Primitive,
    Semantic,
};
use smallvec::SmallVec;

use super::topology::decode;
use super::types::{CompositeVertex, SkinInfluence, Submesh, Topology};
use super::weld::{WeldMap, Welder};
use crate::accessor::{read_source, resolve_source, TupleView, Tuples};
use crate::error::{AssemblyError, Result};
use crate::options::AssemblyOptions;

/// Output of composing one geometry
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedMesh {
    pub submeshes: Vec<Submesh>,
    /// Pre-welding to post-welding vertex map, parallel to `submeshes`
    pub weld_maps: Vec<WeldMap>,
    /// Number of source vertices (`<vertices>` POSITION count)
    pub source_vertex_count: usize,
}

impl ComposedMesh {
    pub fn vertex_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.vertices.len()).sum()
    }

    pub fn index_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.indices.len()).sum()
    }
}

/// Compose the mesh behind a geometry or controller reference.
///
/// Morph controllers contribute their base geometry; morph targets are not
/// blended. Skin controllers are not followed here.
pub fn compose_mesh_source(
    doc: &Document,
    reference: &str,
    options: &AssemblyOptions,
    context: &str,
) -> Result<ComposedMesh> {
    compose_source(doc, reference, options, None, context)
}

/// Compose a skin's base mesh with one influence entry per source vertex.
///
/// Influences are part of every vertex's weld key, so corners that agree on
/// all other attributes but carry different weights stay separate.
pub fn compose_skinned_source(
    doc: &Document,
    reference: &str,
    options: &AssemblyOptions,
    influences: &[SkinInfluence],
    context: &str,
) -> Result<ComposedMesh> {
    compose_source(doc, reference, options, Some(influences), context)
}

fn compose_source(
    doc: &Document,
    reference: &str,
    options: &AssemblyOptions,
    influences: Option<&[SkinInfluence]>,
    context: &str,
) -> Result<ComposedMesh> {
    let mut reference = reference;
    let mut visited: Vec<&str> = Vec::new();
    loop {
        if let Some(geometry) = doc.geometry(reference) {
            return compose_with(doc, geometry, options, influences);
        }
        let controller = doc
            .controller(reference)
            .ok_or_else(|| AssemblyError::reference(reference, context))?;
        let id = controller.id().unwrap_or("<unnamed>");
        if visited.contains(&id) {
            let mut path: Vec<String> = visited.iter().map(|s| s.to_string()).collect();
            path.push(id.to_string());
            return Err(AssemblyError::CycleDetected { path });
        }
        visited.push(id);
        match &controller.element {
            ControllerElement::Morph(morph) => {
                if !morph.targets.is_empty() {
                    tracing::warn!(
                        "Morph controller '{}': targets ignored, using base mesh",
                        id
                    );
                }
                reference = &morph.source;
            }
            ControllerElement::Skin(_) => {
                return Err(AssemblyError::topology(
                    context,
                    format!("skin controller '{id}' cannot be the base of another skin"),
                ));
            }
        }
    }
}

/// Decode, triangulate and weld every primitive of `geometry`.
///
/// Produces one submesh per distinct material symbol, in order of first use.
pub fn compose_geometry(
    doc: &Document,
    geometry: &Geometry,
    options: &AssemblyOptions,
) -> Result<ComposedMesh> {
    compose_with(doc, geometry, options, None)
}

fn compose_with(
    doc: &Document,
    geometry: &Geometry,
    options: &AssemblyOptions,
    influences: Option<&[SkinInfluence]>,
) -> Result<ComposedMesh> {
    let label = geometry.id().unwrap_or("<unnamed>");
    let context = format!("geometry '{label}'");
    let mesh = match &geometry.element {
        GeometricElement::Mesh(mesh) => mesh,
        other => {
            return Err(AssemblyError::topology(
                &context,
                format!("{} is not a renderable mesh", other.kind_name()),
            ));
        }
    };

    let has_lines = mesh.primitives.iter().any(|p| p.data.is_line());
    if has_lines && mesh.primitives.iter().any(|p| !p.data.is_line()) {
        return Err(AssemblyError::topology(
            &context,
            "line primitives mixed with polygonal primitives",
        ));
    }

    let cache = SourceCache::load(mesh, &context)?;
    let vertex_streams = VertexStreams::new(mesh, &cache, &context)?;
    if let Some(influences) = influences {
        if influences.len() != vertex_streams.positions.len() {
            return Err(AssemblyError::bounds(
                format!("{context}: skin weights per source vertex"),
                vertex_streams.positions.len(),
                influences.len(),
            ));
        }
    }
    let unit_scale = options.unit_scale(doc.asset.unit.meter);

    let mut groups: Vec<(Option<String>, Topology, Welder)> = Vec::new();
    for (index, primitive) in mesh.primitives.iter().enumerate() {
        let primitive_context = format!("{context} {} #{index}", primitive.data.kind_name());
        let streams = PrimitiveStreams::new(mesh, primitive, &cache, &primitive_context)?;
        let corners = decode(&primitive.data, primitive.index_stride(), &primitive_context)?;

        let slot = match groups
            .iter()
            .position(|(material, _, _)| *material == primitive.material)
        {
            Some(slot) => slot,
            None => {
                groups.push((primitive.material.clone(), corners.topology, Welder::new()));
                groups.len() - 1
            }
        };
        let welder = &mut groups[slot].2;

        for tuple in corners.tuples {
            let pre = tuple[streams.vertex_offset];
            let mut vertex =
                build_vertex(&vertex_streams, &streams, tuple, unit_scale, &primitive_context)?;
            if let Some(influence) = influences.and_then(|table| table.get(pre as usize)) {
                vertex.joints = influence.joints.clone();
                vertex.weights = influence.weights.clone();
            }
            welder.push(vertex, pre);
        }
    }

    let mut submeshes = Vec::with_capacity(groups.len());
    let mut weld_maps = Vec::with_capacity(groups.len());
    for (material, topology, welder) in groups {
        if welder.index_count() == 0 {
            continue;
        }
        let (vertices, indices, map) = welder.finish();
        submeshes.push(Submesh {
            material,
            topology,
            vertices,
            indices,
        });
        weld_maps.push(map);
    }

    let composed = ComposedMesh {
        submeshes,
        weld_maps,
        source_vertex_count: vertex_streams.positions.len(),
    };
    tracing::debug!(
        "Composed {}: {} submeshes, {} vertices, {} indices",
        context,
        composed.submeshes.len(),
        composed.vertex_count(),
        composed.index_count()
    );
    Ok(composed)
}

/// Every float source of the mesh that a supported input references
struct SourceCache {
    tuples: HashMap<String, Tuples>,
}

impl SourceCache {
    fn load(mesh: &Mesh, context: &str) -> Result<Self> {
        let mut tuples = HashMap::new();
        let references = mesh
            .vertices
            .inputs
            .iter()
            .map(|input| (&input.semantic, &input.source))
            .chain(
                mesh.primitives
                    .iter()
                    .flat_map(|p| p.inputs.iter())
                    .map(|input| (&input.semantic, &input.source)),
            );
        for (semantic, reference) in references {
            if !is_attribute(semantic) || tuples.contains_key(reference.as_str()) {
                continue;
            }
            let source = resolve_source(&mesh.sources, reference, context)?;
            let source_context = format!("{context} {semantic}");
            tuples.insert(reference.clone(), read_source(&mesh.sources, source, &source_context)?);
        }
        Ok(Self { tuples })
    }

    fn stream(
        &self,
        reference: &str,
        semantic: &Semantic,
        min_width: usize,
        context: &str,
    ) -> Result<TupleView<'_, f32>> {
        let tuples = self
            .tuples
            .get(reference)
            .ok_or_else(|| AssemblyError::reference(reference, context))?;
        let view = tuples.expect_f32(&format!("{context} {semantic}"))?;
        if view.width() < min_width {
            return Err(AssemblyError::bounds(
                format!("{context}: {semantic} tuple width"),
                min_width,
                view.width(),
            ));
        }
        Ok(view)
    }
}

fn is_attribute(semantic: &Semantic) -> bool {
    matches!(
        semantic,
        Semantic::Position | Semantic::Normal | Semantic::TexCoord | Semantic::Color
    )
}

fn min_width(semantic: &Semantic) -> usize {
    match semantic {
        Semantic::Position | Semantic::Normal | Semantic::Color => 3,
        Semantic::TexCoord => 2,
        _ => 1,
    }
}

/// Attributes indexed by the source vertex index (`<vertices>` inputs)
struct VertexStreams<'a> {
    positions: TupleView<'a, f32>,
    normal: Option<TupleView<'a, f32>>,
    texcoords: SmallVec<[TupleView<'a, f32>; 2]>,
    color: Option<TupleView<'a, f32>>,
}

impl<'a> VertexStreams<'a> {
    fn new(mesh: &Mesh, cache: &'a SourceCache, context: &str) -> Result<Self> {
        let mut positions = None;
        let mut normal = None;
        let mut texcoords = SmallVec::new();
        let mut color = None;
        for input in &mesh.vertices.inputs {
            if !is_attribute(&input.semantic) {
                tracing::debug!("{}: ignoring vertices input {}", context, input.semantic);
                continue;
            }
            let width = min_width(&input.semantic);
            let view = cache.stream(&input.source, &input.semantic, width, context)?;
            match input.semantic {
                Semantic::Position => positions = Some(view),
                Semantic::Normal => normal = Some(view),
                Semantic::TexCoord => texcoords.push(view),
                Semantic::Color => color = Some(view),
                _ => {}
            }
        }
        let positions = positions.ok_or_else(|| {
            AssemblyError::reference("POSITION", format!("{context} <vertices>"))
        })?;
        Ok(Self {
            positions,
            normal,
            texcoords,
            color,
        })
    }
}

/// Attributes indexed through a primitive's own offsets
struct PrimitiveStreams<'a> {
    vertex_offset: usize,
    normal: Option<(usize, TupleView<'a, f32>)>,
    texcoords: SmallVec<[(usize, TupleView<'a, f32>); 2]>,
    color: Option<(usize, TupleView<'a, f32>)>,
}

impl<'a> PrimitiveStreams<'a> {
    fn new(
        mesh: &Mesh,
        primitive: &Primitive,
        cache: &'a SourceCache,
        context: &str,
    ) -> Result<Self> {
        let vertex = primitive
            .inputs
            .iter()
            .find(|input| input.semantic == Semantic::Vertex)
            .ok_or_else(|| AssemblyError::topology(context, "primitive has no VERTEX input"))?;
        if fragment(&vertex.source) != Some(mesh.vertices.id.as_str()) {
            return Err(AssemblyError::reference(&vertex.source, context));
        }

        let mut normal = None;
        let mut texcoords: SmallVec<[(u32, usize, TupleView<'a, f32>); 2]> = SmallVec::new();
        let mut color = None;
        for input in &primitive.inputs {
            if !is_attribute(&input.semantic) {
                continue;
            }
            let width = min_width(&input.semantic);
            let view = cache.stream(&input.source, &input.semantic, width, context)?;
            match input.semantic {
                Semantic::Normal => normal = Some((input.offset, view)),
                Semantic::TexCoord => {
                    texcoords.push((input.set.unwrap_or(0), input.offset, view))
                }
                Semantic::Color => color = Some((input.offset, view)),
                _ => {
                    tracing::debug!("{}: ignoring primitive input {}", context, input.semantic);
                }
            }
        }
        texcoords.sort_by_key(|&(set, _, _)| set);

        Ok(Self {
            vertex_offset: vertex.offset,
            normal,
            texcoords: texcoords
                .into_iter()
                .map(|(_, offset, view)| (offset, view))
                .collect(),
            color,
        })
    }
}

fn build_vertex(
    vertex: &VertexStreams,
    primitive: &PrimitiveStreams,
    tuple: &[u32],
    unit_scale: f32,
    context: &str,
) -> Result<CompositeVertex> {
    let vi = tuple[primitive.vertex_offset] as usize;

    let [x, y, z] = read::<3>(&vertex.positions, vi, "POSITION", context)?;
    let position = [x * unit_scale, y * unit_scale, z * unit_scale];

    let normal = match (&primitive.normal, &vertex.normal) {
        (Some((offset, view)), _) => {
            Some(read::<3>(view, tuple[*offset] as usize, "NORMAL", context)?)
        }
        (None, Some(view)) => Some(read::<3>(view, vi, "NORMAL", context)?),
        (None, None) => None,
    };

    let mut texcoords = SmallVec::new();
    for view in &vertex.texcoords {
        texcoords.push(read::<2>(view, vi, "TEXCOORD", context)?);
    }
    for (offset, view) in &primitive.texcoords {
        texcoords.push(read::<2>(view, tuple[*offset] as usize, "TEXCOORD", context)?);
    }

    let color = match (&primitive.color, &vertex.color) {
        (Some((offset, view)), _) => Some(read_color(view, tuple[*offset] as usize, context)?),
        (None, Some(view)) => Some(read_color(view, vi, context)?),
        (None, None) => None,
    };

    Ok(CompositeVertex {
        position,
        normal,
        texcoords,
        color,
        ..Default::default()
    })
}

fn read<const N: usize>(
    view: &TupleView<f32>,
    index: usize,
    semantic: &str,
    context: &str,
) -> Result<[f32; N]> {
    let tuple = view.get(index).ok_or_else(|| {
        AssemblyError::bounds(format!("{context}: {semantic} index"), index + 1, view.len())
    })?;
    let mut out = [0.0; N];
    out.copy_from_slice(&tuple[..N]);
    Ok(out)
}

fn read_color(view: &TupleView<f32>, index: usize, context: &str) -> Result<[f32; 4]> {
    let tuple = view.get(index).ok_or_else(|| {
        AssemblyError::bounds(format!("{context}: COLOR index"), index + 1, view.len())
    })?;
    Ok(match tuple {
        [r, g, b] => [*r, *g, *b, 1.0],
        [r, g, b, a, ..] => [*r, *g, *b, *a],
        _ => [0.0, 0.0, 0.0, 1.0],
    })
}
