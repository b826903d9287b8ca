//! Skin binding
//!
//! Resolves a skin controller's joints against the flattened scene, then
//! composes the base mesh with bounded, renormalized influences per source
//! vertex. Influences take part in welding, so every post-welding vertex
//! derived from a source vertex carries that vertex's weights.

use glam::Mat4;
use hashbrown::HashMap;
use nether_dae::{
    fragment, Controller, DataArray, HasId, InstanceController, Semantic, Skin, Source,
};
use serde::Serialize;
use smallvec::SmallVec;

use crate::accessor::{read_source, resolve_source};
use crate::error::{AssemblyError, Result};
use crate::mesh::{compose_skinned_source, ComposedMesh, SkinInfluence};
use crate::options::AssemblyOptions;
use crate::scene::FlatScene;
use crate::transform::{from_row_major, scale_translation};

/// One bone of an assembled skeleton
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkeletonJoint {
    /// Joint name as written in the skin's joint source
    pub name: String,
    /// Index into the flattened scene
    pub node: usize,
    /// Parent joint index; always less than this joint's own index
    pub parent: Option<usize>,
    /// Local transform of the joint node in the bind scene
    pub bind_pose: Mat4,
    pub inverse_bind: Mat4,
}

/// Joints of one skinned mesh, parents before children
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skeleton {
    /// Mesh space to bind space, applied before joint transforms
    pub bind_shape: Mat4,
    pub joints: Vec<SkeletonJoint>,
}

/// A skin's base mesh with influences written, plus its skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct SkinnedMesh {
    pub mesh: ComposedMesh,
    pub skeleton: Skeleton,
}

/// (joint index, weight) pairs of one vertex
pub type Influences = SmallVec<[(usize, f32); 4]>;

/// Keep the `max` heaviest influences and renormalize them to sum to 1.
///
/// Duplicate joints are merged first and non-positive weights dropped. Ties
/// keep their original order. A vertex whose weights sum to zero ends up
/// with no influences.
pub fn limit_influences(pairs: &[(usize, f32)], max: usize) -> Influences {
    let mut merged: Influences = SmallVec::new();
    for &(joint, weight) in pairs {
        if !(weight.is_finite() && weight > 0.0) {
            continue;
        }
        match merged.iter_mut().find(|(j, _)| *j == joint) {
            Some((_, w)) => *w += weight,
            None => merged.push((joint, weight)),
        }
    }

    merged.sort_by(|a, b| b.1.total_cmp(&a.1));
    merged.truncate(max.max(1));

    let total: f32 = merged.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        merged.clear();
        return merged;
    }
    for (_, weight) in merged.iter_mut() {
        *weight /= total;
    }
    merged
}

/// Bind `skin` (owned by `controller`) as instanced by `instance`.
pub fn bind_skin(
    doc: &nether_dae::Document,
    controller: &Controller,
    skin: &Skin,
    instance: &InstanceController,
    flat: &FlatScene,
    options: &AssemblyOptions,
) -> Result<SkinnedMesh> {
    let label = controller.id().unwrap_or("<unnamed>");
    let context = format!("skin '{label}'");
    let unit_scale = options.unit_scale(doc.asset.unit.meter);

    // Joints block: names and inverse bind matrices, parallel
    let joint_source = joints_input(skin, Semantic::Joint, &context)?;
    let joint_tuples = read_source(&skin.sources, joint_source, &context)?;
    let joint_names: Vec<&str> = joint_tuples
        .expect_names(&context)?
        .iter()
        .filter_map(|tuple| tuple.first().map(String::as_str))
        .collect();
    let by_id = matches!(joint_source.array, DataArray::IdRef { .. });

    let ibm_source = joints_input(skin, Semantic::InvBindMatrix, &context)?;
    let ibm_tuples = read_source(&skin.sources, ibm_source, &context)?;
    let ibm_view = ibm_tuples.expect_f32(&context)?;
    if ibm_view.width() < 16 || ibm_view.len() != joint_names.len() {
        return Err(AssemblyError::bounds(
            format!("{context}: INV_BIND_MATRIX per joint"),
            joint_names.len() * 16,
            ibm_view.flat().len(),
        ));
    }
    if joint_names.len() > u16::MAX as usize + 1 {
        return Err(AssemblyError::bounds(
            format!("{context}: joint count"),
            joint_names.len(),
            u16::MAX as usize + 1,
        ));
    }

    let scope = skeleton_roots(instance, flat, &context)?;
    let mut nodes = Vec::with_capacity(joint_names.len());
    for name in &joint_names {
        let node = find_joint_node(flat, &scope, name, by_id).ok_or_else(|| {
            AssemblyError::JointResolution {
                skin: label.to_string(),
                joint: name.to_string(),
            }
        })?;
        nodes.push(node);
    }

    // Parents must precede children: order joints by flattened node index
    let mut order: Vec<usize> = (0..joint_names.len()).collect();
    order.sort_by_key(|&j| nodes[j]);
    let mut remap = vec![0usize; joint_names.len()];
    for (new, &old) in order.iter().enumerate() {
        remap[old] = new;
    }
    let mut joint_of_node: HashMap<usize, usize> = HashMap::new();
    for (new, &old) in order.iter().enumerate() {
        joint_of_node.entry(nodes[old]).or_insert(new);
    }

    let mut joints = Vec::with_capacity(order.len());
    for &old in &order {
        let node = nodes[old];
        let parent = flat
            .ancestors(node)
            .find_map(|ancestor| joint_of_node.get(&ancestor).copied());
        let mut ibm = [0.0; 16];
        if let Some(values) = ibm_view.get(old) {
            ibm.copy_from_slice(&values[..16]);
        }
        joints.push(SkeletonJoint {
            name: joint_names[old].to_string(),
            node,
            parent,
            bind_pose: flat.nodes[node].local,
            inverse_bind: scale_translation(from_row_major(&ibm), unit_scale),
        });
    }

    let influences: Vec<SkinInfluence> =
        vertex_influences(skin, label, &joint_names, options.max_influences(), &context)?
            .iter()
            .map(|influence| SkinInfluence {
                joints: influence.iter().map(|&(j, _)| remap[j] as u16).collect(),
                weights: influence.iter().map(|&(_, w)| w).collect(),
            })
            .collect();
    let unweighted = influences.iter().filter(|i| i.joints.is_empty()).count();
    if unweighted > 0 {
        tracing::warn!("{}: {} source vertices have no joint influences", context, unweighted);
    }
    let mesh = compose_skinned_source(doc, &skin.source, options, &influences, &context)?;

    tracing::debug!(
        "Bound {}: {} joints, {} weighted source vertices",
        context,
        joints.len(),
        influences.len() - unweighted
    );

    Ok(SkinnedMesh {
        mesh,
        skeleton: Skeleton {
            bind_shape: scale_translation(from_row_major(&skin.bind_shape_matrix), unit_scale),
            joints,
        },
    })
}

fn joints_input<'a>(skin: &'a Skin, semantic: Semantic, context: &str) -> Result<&'a Source> {
    let input = skin
        .joints
        .inputs
        .iter()
        .find(|input| input.semantic == semantic)
        .ok_or_else(|| {
            AssemblyError::reference(semantic.as_str(), format!("{context} <joints>"))
        })?;
    resolve_source(&skin.sources, &input.source, context)
}

/// Flattened nodes the `<skeleton>` elements point at; empty means unscoped
fn skeleton_roots(
    instance: &InstanceController,
    flat: &FlatScene,
    context: &str,
) -> Result<Vec<usize>> {
    let mut roots = Vec::new();
    for reference in &instance.skeletons {
        let id = fragment(reference).ok_or_else(|| AssemblyError::reference(reference, context))?;
        let before = roots.len();
        roots.extend(flat.find_by_id(id));
        if roots.len() == before {
            return Err(AssemblyError::reference(
                reference,
                format!("{context} <skeleton>"),
            ));
        }
    }
    Ok(roots)
}

/// First flattened node in scope matching `name` by sid, then name, then id.
/// `IDREF_array` joints match ids first.
fn find_joint_node(flat: &FlatScene, scope: &[usize], name: &str, by_id: bool) -> Option<usize> {
    let in_scope =
        |index: usize| scope.is_empty() || scope.iter().any(|&root| flat.is_within(index, root));
    let candidates = || {
        flat.nodes
            .iter()
            .enumerate()
            .filter(move |(index, _)| in_scope(*index))
    };

    let by_sid = || candidates().find(|(_, n)| n.sid.as_deref() == Some(name));
    let by_name = || candidates().find(|(_, n)| n.name.as_deref() == Some(name));
    let by_node_id = || candidates().find(|(_, n)| n.id.as_deref() == Some(name));

    let found = if by_id {
        by_node_id().or_else(by_sid).or_else(by_name)
    } else {
        by_sid().or_else(by_name).or_else(by_node_id)
    };
    found.map(|(index, _)| index)
}

/// Per source vertex influences, in joints-block indices
fn vertex_influences(
    skin: &Skin,
    label: &str,
    joint_names: &[&str],
    max: usize,
    context: &str,
) -> Result<Vec<Influences>> {
    let weights = &skin.vertex_weights;
    let weights_context = format!("{context} <vertex_weights>");

    let find = |semantic: Semantic| {
        weights
            .inputs
            .iter()
            .find(|input| input.semantic == semantic)
            .ok_or_else(|| AssemblyError::reference(semantic.as_str(), weights_context.as_str()))
    };
    let joint_input = find(Semantic::Joint)?;
    let weight_input = find(Semantic::Weight)?;

    // Joint indices address the vertex_weights JOINT source; map them onto
    // the joints block by name
    let joint_source = resolve_source(&skin.sources, &joint_input.source, &weights_context)?;
    let joint_tuples = read_source(&skin.sources, joint_source, &weights_context)?;
    let mut joint_map = Vec::new();
    for tuple in joint_tuples.expect_names(&weights_context)?.iter() {
        let name = tuple.first().map(String::as_str).unwrap_or_default();
        let index = joint_names.iter().position(|n| *n == name).ok_or_else(|| {
            AssemblyError::JointResolution {
                skin: label.to_string(),
                joint: name.to_string(),
            }
        })?;
        joint_map.push(index);
    }

    let weight_source = resolve_source(&skin.sources, &weight_input.source, &weights_context)?;
    let weight_tuples = read_source(&skin.sources, weight_source, &weights_context)?;
    let weight_view = weight_tuples.expect_f32(&weights_context)?;

    if weights.vcount.len() != weights.count {
        return Err(AssemblyError::bounds(
            format!("{weights_context}: vcount"),
            weights.count,
            weights.vcount.len(),
        ));
    }
    let stride = weights.index_stride();
    let pairs: usize = weights.vcount.iter().map(|&n| n as usize).sum();
    if pairs * stride > weights.v.len() {
        return Err(AssemblyError::bounds(
            format!("{weights_context}: v"),
            pairs * stride,
            weights.v.len(),
        ));
    }

    let mut influences = Vec::with_capacity(weights.count);
    let mut cursor = 0;
    let mut gathered: Vec<(usize, f32)> = Vec::new();
    for &n in &weights.vcount {
        gathered.clear();
        for _ in 0..n {
            let tuple = &weights.v[cursor * stride..(cursor + 1) * stride];
            cursor += 1;
            let joint = tuple[joint_input.offset];
            let weight = tuple[weight_input.offset];
            // -1 binds to the bind shape itself
            if joint == -1 {
                continue;
            }
            let joint = usize::try_from(joint)
                .ok()
                .and_then(|j| joint_map.get(j).copied())
                .ok_or_else(|| {
                    AssemblyError::bounds(
                        format!("{weights_context}: joint index {joint}"),
                        joint.max(0) as usize + 1,
                        joint_map.len(),
                    )
                })?;
            let weight = usize::try_from(weight)
                .ok()
                .and_then(|w| weight_view.get(w))
                .and_then(|w| w.first().copied())
                .ok_or_else(|| {
                    AssemblyError::bounds(
                        format!("{weights_context}: weight index {weight}"),
                        weight.max(0) as usize + 1,
                        weight_view.len(),
                    )
                })?;
            gathered.push((joint, weight));
        }
        influences.push(limit_influences(&gathered, max));
    }
    Ok(influences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::scene::flatten_scene;
    use crate::test_support::*;
    use nether_dae::{
        ControllerElement, Document, Geometry, Joints, Node, NodeKind, PrimitiveData, Transform,
        TransformKind, VertexWeights, VisualScene, IDENTITY_MATRIX,
    };

    #[test]
    fn test_truncates_to_four_heaviest() {
        let pairs = [(0, 0.1), (1, 0.3), (2, 0.05), (3, 0.4), (4, 0.15)];
        let kept = limit_influences(&pairs, 4);

        assert_eq!(kept.len(), 4);
        let joints: Vec<usize> = kept.iter().map(|&(j, _)| j).collect();
        assert_eq!(joints, vec![3, 1, 4, 0]);
        let total: f32 = kept.iter().map(|&(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-6, "sum was {total}");
        assert!(kept.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_merges_duplicate_joints() {
        let kept = limit_influences(&[(2, 0.25), (5, 0.5), (2, 0.25)], 4);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].1, 0.5);
        assert_eq!(kept[1].1, 0.5);
    }

    #[test]
    fn test_zero_weights_yield_no_influences() {
        assert!(limit_influences(&[(0, 0.0), (1, -1.0)], 4).is_empty());
        assert!(limit_influences(&[], 4).is_empty());
    }

    fn joint(id: &str, x: f32, children: Vec<Node>) -> Node {
        Node {
            id: Some(id.to_string()),
            name: Some(id.to_string()),
            sid: Some(id.to_string()),
            kind: NodeKind::Joint,
            transforms: vec![Transform::new(TransformKind::Translate([x, 0.0, 0.0]))],
            children,
            ..Default::default()
        }
    }

    fn ibm(count: usize) -> Vec<f32> {
        (0..count).flat_map(|_| IDENTITY_MATRIX).collect()
    }

    /// Triangle skinned to three joints; joint list written child-first
    fn skinned_doc(
        joint_names: &[&str],
        v: Vec<i64>,
        vcount: Vec<u32>,
        weights: Vec<f32>,
    ) -> Document {
        let positions = float_source(
            "pos",
            &["X", "Y", "Z"],
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        );
        let geometry = mesh_geometry(
            "body",
            vec![positions],
            vec![unshared(Semantic::Position, "pos")],
            vec![primitive(
                None,
                vec![input(Semantic::Vertex, "body-vertices", 0)],
                PrimitiveData::Triangles { p: vec![0, 1, 2] },
            )],
        );
        skinned_geometry_doc(geometry, joint_names, v, vcount, weights)
    }

    /// `geometry` (id `body`) skinned through controller `body-skin`
    fn skinned_geometry_doc(
        geometry: Geometry,
        joint_names: &[&str],
        v: Vec<i64>,
        vcount: Vec<u32>,
        weights: Vec<f32>,
    ) -> Document {
        let skin = Skin {
            source: "#body".into(),
            bind_shape_matrix: IDENTITY_MATRIX,
            sources: vec![
                name_source("names", "JOINT", joint_names),
                matrix_source("ibm", ibm(joint_names.len())),
                float_source("w", &["WEIGHT"], weights),
            ],
            joints: Joints {
                inputs: vec![
                    unshared(Semantic::Joint, "names"),
                    unshared(Semantic::InvBindMatrix, "ibm"),
                ],
            },
            vertex_weights: VertexWeights {
                count: vcount.len(),
                inputs: vec![
                    input(Semantic::Joint, "names", 0),
                    input(Semantic::Weight, "w", 1),
                ],
                vcount,
                v,
            },
        };
        let mut doc = doc_with_geometry(geometry);
        doc.controllers.push(Controller {
            id: Some("body-skin".into()),
            name: None,
            element: ControllerElement::Skin(skin),
        });
        doc.visual_scenes.push(VisualScene {
            id: Some("scene".into()),
            name: None,
            nodes: vec![joint(
                "Hip",
                0.0,
                vec![joint("Spine", 1.0, vec![joint("Head", 1.0, vec![])])],
            )],
        });
        doc
    }

    fn bind(doc: &Document, instance: &InstanceController) -> Result<SkinnedMesh> {
        let options = AssemblyOptions::default();
        let flat = flatten_scene(doc, &doc.visual_scenes[0], &options)?;
        let controller = &doc.controllers[0];
        let ControllerElement::Skin(skin) = &controller.element else {
            unreachable!()
        };
        bind_skin(doc, controller, skin, instance, &flat, &options)
    }

    fn instance(skeletons: &[&str]) -> InstanceController {
        InstanceController {
            url: "#body-skin".into(),
            name: None,
            skeletons: skeletons.iter().map(|s| s.to_string()).collect(),
            bind_material: None,
        }
    }

    #[test]
    fn test_joints_reordered_parent_first() {
        // Vertex i fully weighted to joint list entry i
        let doc = skinned_doc(
            &["Head", "Spine", "Hip"],
            vec![0, 0, 1, 0, 2, 0],
            vec![1, 1, 1],
            vec![1.0],
        );
        let skinned = bind(&doc, &instance(&["#Hip"])).unwrap();

        let names: Vec<&str> = skinned
            .skeleton
            .joints
            .iter()
            .map(|j| j.name.as_str())
            .collect();
        assert_eq!(names, vec!["Hip", "Spine", "Head"]);
        let parents: Vec<Option<usize>> =
            skinned.skeleton.joints.iter().map(|j| j.parent).collect();
        assert_eq!(parents, vec![None, Some(0), Some(1)]);

        // Vertex 0 was bound to "Head", now joint 2
        let vertices = &skinned.mesh.submeshes[0].vertices;
        assert_eq!(vertices[0].joints.as_slice(), &[2]);
        assert_eq!(vertices[2].joints.as_slice(), &[0]);
        assert_eq!(vertices[0].weights.as_slice(), &[1.0]);
    }

    #[test]
    fn test_influences_truncated_on_vertices() {
        // Vertex 0 has five pairs over three joints (duplicates merge)
        let doc = skinned_doc(
            &["Hip", "Spine", "Head"],
            vec![0, 0, 1, 1, 2, 2, 0, 3, 1, 4, 0, 0, 0, 0],
            vec![5, 1, 1],
            vec![0.1, 0.3, 0.4, 0.05, 0.15],
        );
        let skinned = bind(&doc, &instance(&[])).unwrap();

        let vertex = &skinned.mesh.submeshes[0].vertices[0];
        assert_eq!(vertex.joints.len(), 3);
        let total: f32 = vertex.weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        // Spine: 0.3 + 0.15
        assert_eq!(vertex.joints.as_slice(), &[1, 2, 0]);
    }

    #[test]
    fn test_bind_shape_index_dropped() {
        let doc = skinned_doc(
            &["Hip"],
            vec![-1, 0, 0, 0, 0, 0, 0, 0],
            vec![2, 1, 1],
            vec![0.5],
        );
        let skinned = bind(&doc, &instance(&[])).unwrap();
        let vertex = &skinned.mesh.submeshes[0].vertices[0];
        assert_eq!(vertex.joints.as_slice(), &[0]);
        assert_eq!(vertex.weights.as_slice(), &[1.0]);
    }

    #[test]
    fn test_unknown_joint_fails() {
        let doc = skinned_doc(&["Hip", "Tail"], vec![0, 0, 0, 0, 0, 0], vec![1, 1, 1], vec![1.0]);
        let err = bind(&doc, &instance(&[])).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::JointResolution {
                skin: "body-skin".into(),
                joint: "Tail".into(),
            }
        );
    }

    #[test]
    fn test_skeleton_scope_excludes_outside_nodes() {
        // Scoped to Spine: Hip lies outside the skeleton root
        let doc = skinned_doc(&["Hip"], vec![0, 0, 0, 0, 0, 0], vec![1, 1, 1], vec![1.0]);
        let err = bind(&doc, &instance(&["#Spine"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::JointResolution);
    }

    #[test]
    fn test_weight_index_out_of_range() {
        let doc = skinned_doc(&["Hip"], vec![0, 3, 0, 0, 0, 0], vec![1, 1, 1], vec![1.0]);
        let err = bind(&doc, &instance(&[])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessorBounds);
    }

    #[test]
    fn test_bind_pose_is_node_local() {
        let doc = skinned_doc(&["Spine"], vec![0, 0, 0, 0, 0, 0], vec![1, 1, 1], vec![1.0]);
        let skinned = bind(&doc, &instance(&[])).unwrap();
        let joint = &skinned.skeleton.joints[0];
        assert_eq!(joint.node, 1);
        assert_eq!(
            joint.bind_pose,
            Mat4::from_translation(glam::Vec3::new(1.0, 0.0, 0.0))
        );
        assert_eq!(joint.inverse_bind, Mat4::IDENTITY);
    }

    #[test]
    fn test_coincident_vertices_with_different_weights_stay_apart() {
        // Source vertex 3 repeats vertex 0's position but belongs to Spine
        let positions = float_source(
            "pos",
            &["X", "Y", "Z"],
            vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, //
                0.0, 0.0, 0.0,
            ],
        );
        let geometry = mesh_geometry(
            "body",
            vec![positions],
            vec![unshared(Semantic::Position, "pos")],
            vec![primitive(
                None,
                vec![input(Semantic::Vertex, "body-vertices", 0)],
                PrimitiveData::Triangles {
                    p: vec![0, 1, 2, 3, 2, 1],
                },
            )],
        );
        let doc = skinned_geometry_doc(
            geometry,
            &["Hip", "Spine"],
            vec![0, 0, 0, 0, 0, 0, 1, 0],
            vec![1, 1, 1, 1],
            vec![1.0],
        );
        let skinned = bind(&doc, &instance(&[])).unwrap();

        let submesh = &skinned.mesh.submeshes[0];
        let map = &skinned.mesh.weld_maps[0];
        assert_eq!(submesh.vertices.len(), 4);
        assert_eq!(submesh.indices, vec![0, 1, 2, 3, 2, 1]);
        let from_zero = &submesh.vertices[map.derived(0)[0] as usize];
        let from_three = &submesh.vertices[map.derived(3)[0] as usize];
        assert_eq!(from_zero.position, from_three.position);
        assert_eq!(from_zero.joints.as_slice(), &[0]);
        assert_eq!(from_three.joints.as_slice(), &[1]);
        assert_eq!(from_three.weights.as_slice(), &[1.0]);
    }

    #[test]
    fn test_split_vertex_keeps_weights_on_every_copy() {
        // Two faces with their own normals share vertices 0 and 2
        let positions = float_source(
            "pos",
            &["X", "Y", "Z"],
            vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                0.0, 1.0, 0.0,
            ],
        );
        let normals = float_source("nrm", &["X", "Y", "Z"], vec![0.0, 0.0, 1.0, 0.0, 0.6, 0.8]);
        let geometry = mesh_geometry(
            "body",
            vec![positions, normals],
            vec![unshared(Semantic::Position, "pos")],
            vec![primitive(
                None,
                vec![
                    input(Semantic::Vertex, "body-vertices", 0),
                    input(Semantic::Normal, "nrm", 1),
                ],
                PrimitiveData::Triangles {
                    p: vec![0, 0, 1, 0, 2, 0, 0, 1, 2, 1, 3, 1],
                },
            )],
        );
        // Vertex 0: Hip 0.25, Spine 0.75; the rest fully Hip
        let doc = skinned_geometry_doc(
            geometry,
            &["Hip", "Spine"],
            vec![0, 1, 1, 2, 0, 0, 0, 0, 0, 0],
            vec![2, 1, 1, 1],
            vec![1.0, 0.25, 0.75],
        );
        let skinned = bind(&doc, &instance(&[])).unwrap();

        let submesh = &skinned.mesh.submeshes[0];
        let map = &skinned.mesh.weld_maps[0];
        assert_eq!(submesh.vertices.len(), 6);
        for pre in [0, 2] {
            let derived = map.derived(pre);
            assert_eq!(derived.len(), 2, "source vertex {pre}");
            let first = &submesh.vertices[derived[0] as usize];
            let second = &submesh.vertices[derived[1] as usize];
            assert_ne!(first.normal, second.normal);
            assert_eq!(first.joints, second.joints);
            assert_eq!(first.weights, second.weights);
        }
        let shared = &submesh.vertices[map.derived(0)[1] as usize];
        assert_eq!(shared.joints.as_slice(), &[1, 0]);
        assert_eq!(shared.weights.as_slice(), &[0.75, 0.25]);
    }

    #[test]
    fn test_fewer_weight_entries_than_vertices() {
        let doc = skinned_doc(&["Hip"], vec![0, 0, 0, 0], vec![1, 1], vec![1.0]);
        let err = bind(&doc, &instance(&[])).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::AccessorBounds {
                context: "geometry 'body': skin weights per source vertex".into(),
                required: 3,
                available: 2,
            }
        );
    }

    #[test]
    fn test_more_weight_entries_than_vertices() {
        let doc = skinned_doc(
            &["Hip"],
            vec![0, 0, 0, 0, 0, 0, 0, 0],
            vec![1, 1, 1, 1],
            vec![1.0],
        );
        let err = bind(&doc, &instance(&[])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessorBounds);
    }
}
