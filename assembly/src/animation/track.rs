//! Sampler resolution and per-property tracks

use std::collections::BTreeMap;

use nether_dae::traits::label;
use nether_dae::{
    fragment, Animation, AnimationClip, Document, HasId, Sampler, Semantic, TransformKind,
};
use serde::Serialize;
use smallvec::SmallVec;

use super::target::{parse_target, TargetPath};
use crate::accessor::resolve_accessor;
use crate::error::{AssemblyError, Result};
use crate::options::AssemblyOptions;
use crate::scene::{FlatScene, SceneNodeInstance};

/// Keyframe interpolation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interpolation {
    Step,
    #[default]
    Linear,
    Bezier,
    Hermite,
    Cardinal,
    Bspline,
}

impl Interpolation {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "STEP" => Interpolation::Step,
            "LINEAR" => Interpolation::Linear,
            "BEZIER" => Interpolation::Bezier,
            "HERMITE" => Interpolation::Hermite,
            "CARDINAL" => Interpolation::Cardinal,
            "BSPLINE" => Interpolation::Bspline,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyframe {
    pub time: f32,
    /// Whole element value (16 row-major floats for matrices)
    pub value: SmallVec<[f32; 4]>,
    pub interpolation: Interpolation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_tangent: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_tangent: Option<Vec<f32>>,
}

/// Keyframes driving one transform element of one node instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationTrack {
    /// Index into the flattened scene
    pub node: usize,
    /// Position of the element in the node's transform stack
    pub element: usize,
    /// Sid of the element
    pub property: String,
    /// `translate`, `rotate`, `matrix`, ...
    pub kind: &'static str,
    /// Strictly increasing in time
    pub keyframes: Vec<Keyframe>,
}

/// Tracks of one animation clip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationClipTracks {
    pub name: String,
    pub start: f32,
    pub end: f32,
    pub tracks: Vec<AnimationTrack>,
}

/// Build every track of `clip`, or of all animations when `clip` is `None`.
pub fn build_clip_tracks(
    doc: &Document,
    clip: Option<&AnimationClip>,
    flat: &FlatScene,
    options: &AssemblyOptions,
) -> Result<AnimationClipTracks> {
    let name = clip.map(|c| label(c).to_string()).unwrap_or_else(|| "default".to_string());
    let context = format!("clip '{name}'");

    let mut animations = Vec::new();
    match clip {
        Some(clip) => {
            for reference in &clip.animations {
                let animation = doc
                    .animation(reference)
                    .ok_or_else(|| AssemblyError::reference(reference, context.as_str()))?;
                collect(animation, &mut animations);
            }
        }
        None => {
            for animation in &doc.animations {
                collect(animation, &mut animations);
            }
        }
    }

    let unit_scale = options.unit_scale(doc.asset.unit.meter);
    let mut groups: BTreeMap<(usize, usize), PropertyChannels> = BTreeMap::new();
    for animation in animations {
        for channel in &animation.channels {
            let channel_context = format!("{context} channel '{}'", channel.target);
            let sampler = find_sampler(animation, &channel.source, &channel_context)?;
            let target = parse_target(&channel.target)?;
            let keys = SamplerKeys::resolve(animation, sampler, &channel_context)?;

            let nodes = target_nodes(flat, &target);
            if nodes.is_empty() {
                return Err(AssemblyError::target(
                    &channel_context,
                    format!("no scene node '{}'", target.node),
                ));
            }
            for node in nodes {
                let (element, kind) = flat.nodes[node]
                    .transforms
                    .iter()
                    .enumerate()
                    .find(|(_, t)| t.sid.as_deref() == Some(target.element.as_str()))
                    .map(|(i, t)| (i, &t.kind))
                    .ok_or_else(|| {
                        AssemblyError::target(
                            &channel_context,
                            format!("node has no element with sid '{}'", target.element),
                        )
                    })?;
                let component = target.member.component(kind, &channel_context)?;
                let resolved = keys.bind(kind, component, unit_scale, &channel_context)?;

                let group = groups.entry((node, element)).or_insert_with(|| PropertyChannels {
                    property: target.element.clone(),
                    kind: kind.clone(),
                    whole: None,
                    components: Vec::new(),
                });
                match component {
                    None if group.whole.is_some() || !group.components.is_empty() => {
                        return Err(AssemblyError::target(
                            &channel_context,
                            "element already animated by another channel",
                        ));
                    }
                    None => group.whole = Some(resolved),
                    Some(_) if group.whole.is_some() => {
                        return Err(AssemblyError::target(
                            &channel_context,
                            "element already animated as a whole",
                        ));
                    }
                    Some(index) if group.components.iter().any(|(i, _)| *i == index) => {
                        return Err(AssemblyError::target(
                            &channel_context,
                            format!("component {index} already animated by another channel"),
                        ));
                    }
                    Some(index) => group.components.push((index, resolved)),
                }
            }
        }
    }

    let mut tracks = Vec::with_capacity(groups.len());
    for ((node, element), group) in groups {
        let kind_name = group.kind.element_name();
        let keyframes = match group.whole {
            Some(whole) => whole.into_keyframes(),
            None => merge_components(&group.kind, group.components, unit_scale),
        };
        tracks.push(AnimationTrack {
            node,
            element,
            property: group.property,
            kind: kind_name,
            keyframes,
        });
    }

    let last = tracks
        .iter()
        .filter_map(|t| t.keyframes.last())
        .map(|k| k.time)
        .fold(0.0f32, f32::max);
    let (start, end) = match clip {
        Some(clip) => (clip.start, clip.end.unwrap_or(last)),
        None => (0.0, last),
    };

    tracing::debug!("Built {}: {} tracks, {:.3}s", context, tracks.len(), end - start);

    Ok(AnimationClipTracks {
        name,
        start,
        end,
        tracks,
    })
}

fn collect<'a>(animation: &'a Animation, out: &mut Vec<&'a Animation>) {
    out.push(animation);
    for child in &animation.children {
        collect(child, out);
    }
}

fn find_sampler<'a>(
    animation: &'a Animation,
    reference: &str,
    context: &str,
) -> Result<&'a Sampler> {
    let id = fragment(reference).ok_or_else(|| AssemblyError::reference(reference, context))?;
    animation
        .samplers
        .iter()
        .find(|s| s.id() == Some(id))
        .ok_or_else(|| AssemblyError::reference(reference, context))
}

/// Every instantiation of the targeted node: by id, then sid, then name
fn target_nodes(flat: &FlatScene, target: &TargetPath) -> Vec<usize> {
    let wanted = Some(target.node.as_str());
    let matching = |select: fn(&SceneNodeInstance) -> Option<&str>| -> Vec<usize> {
        flat.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| select(node) == wanted)
            .map(|(index, _)| index)
            .collect()
    };
    let by_id = matching(|n| n.id.as_deref());
    if !by_id.is_empty() {
        return by_id;
    }
    let by_sid = matching(|n| n.sid.as_deref());
    if !by_sid.is_empty() {
        return by_sid;
    }
    matching(|n| n.name.as_deref())
}

/// Raw sampler data, before it is bound to an element
struct SamplerKeys {
    times: Vec<f32>,
    values: Vec<f32>,
    width: usize,
    interpolations: Vec<Interpolation>,
    in_tangents: Option<(usize, Vec<f32>)>,
    out_tangents: Option<(usize, Vec<f32>)>,
}

impl SamplerKeys {
    fn resolve(animation: &Animation, sampler: &Sampler, context: &str) -> Result<Self> {
        let input = |semantic: Semantic| {
            sampler
                .inputs
                .iter()
                .find(|input| input.semantic == semantic)
                .map(|input| input.source.as_str())
        };
        let floats = |reference: &str| -> Result<(usize, Vec<f32>)> {
            let tuples = resolve_accessor(&animation.sources, reference, context)?;
            let view = tuples.expect_f32(context)?;
            Ok((view.width(), view.flat().to_vec()))
        };

        let times_ref = input(Semantic::Input)
            .ok_or_else(|| AssemblyError::target(context, "sampler has no INPUT"))?;
        let (time_width, time_values) = floats(times_ref)?;
        let times: Vec<f32> = time_values.chunks_exact(time_width.max(1)).map(|t| t[0]).collect();
        if times.is_empty() {
            return Err(AssemblyError::target(context, "sampler has no keys"));
        }
        if let Some(pair) = times.windows(2).find(|pair| !(pair[0] < pair[1])) {
            return Err(AssemblyError::target(
                context,
                format!("keyframe times not strictly increasing ({} then {})", pair[0], pair[1]),
            ));
        }

        let values_ref = input(Semantic::Output)
            .ok_or_else(|| AssemblyError::target(context, "sampler has no OUTPUT"))?;
        let (width, values) = floats(values_ref)?;
        if width == 0 || values.len() != times.len() * width {
            return Err(AssemblyError::target(
                context,
                format!("{} output values for {} keys", values.len(), times.len()),
            ));
        }

        let interpolations = match input(Semantic::Interpolation) {
            Some(reference) => {
                let tuples = resolve_accessor(&animation.sources, reference, context)?;
                let names = tuples.expect_names(context)?;
                let mut parsed = Vec::with_capacity(names.len());
                for name in names.iter().filter_map(|t| t.first()) {
                    parsed.push(Interpolation::from_name(name).ok_or_else(|| {
                        AssemblyError::target(context, format!("unknown interpolation '{name}'"))
                    })?);
                }
                if parsed.len() != times.len() {
                    return Err(AssemblyError::target(
                        context,
                        format!("{} interpolations for {} keys", parsed.len(), times.len()),
                    ));
                }
                parsed
            }
            None => vec![Interpolation::Linear; times.len()],
        };

        let tangents = |semantic: Semantic| -> Result<Option<(usize, Vec<f32>)>> {
            let Some(reference) = input(semantic) else {
                return Ok(None);
            };
            let (width, values) = floats(reference)?;
            if width == 0 || values.len() != times.len() * width {
                return Err(AssemblyError::target(
                    context,
                    format!("{} tangent values for {} keys", values.len(), times.len()),
                ));
            }
            Ok(Some((width, values)))
        };
        let in_tangents = tangents(Semantic::InTangent)?;
        let out_tangents = tangents(Semantic::OutTangent)?;

        Ok(Self {
            times,
            values,
            width,
            interpolations,
            in_tangents,
            out_tangents,
        })
    }

    /// Check the output width against the targeted element and apply the
    /// unit scale to translation-valued components.
    fn bind(
        &self,
        kind: &TransformKind,
        component: Option<usize>,
        unit_scale: f32,
        context: &str,
    ) -> Result<BoundChannel> {
        let expected = match component {
            Some(_) => 1,
            None => kind.values().len(),
        };
        if self.width != expected {
            return Err(AssemblyError::target(
                context,
                format!(
                    "output width {} does not match {} (expected {expected})",
                    self.width,
                    kind.element_name()
                ),
            ));
        }

        let scaled = |slot: usize| match component {
            Some(index) => is_translation(kind, index),
            None => is_translation(kind, slot),
        };
        let mut values = self.values.clone();
        for (i, value) in values.iter_mut().enumerate() {
            if scaled(i % expected) {
                *value *= unit_scale;
            }
        }

        let scale_tangents = |tangents: &Option<(usize, Vec<f32>)>| {
            tangents.as_ref().map(|(width, values)| {
                let mut values = values.clone();
                for (i, value) in values.iter_mut().enumerate() {
                    let slot = i % width;
                    // Bezier tangents are (time, value) pairs per component
                    let component_slot = if *width == 2 * expected {
                        (slot % 2 == 1).then_some(slot / 2)
                    } else {
                        Some(slot % expected)
                    };
                    if component_slot.is_some_and(&scaled) {
                        *value *= unit_scale;
                    }
                }
                (*width, values)
            })
        };

        Ok(BoundChannel {
            times: self.times.clone(),
            values,
            width: expected,
            interpolations: self.interpolations.clone(),
            in_tangents: scale_tangents(&self.in_tangents),
            out_tangents: scale_tangents(&self.out_tangents),
        })
    }
}

/// Whether component `index` of `kind` is a translation
fn is_translation(kind: &TransformKind, index: usize) -> bool {
    match kind {
        TransformKind::Translate(_) => true,
        TransformKind::Matrix(_) => matches!(index, 3 | 7 | 11),
        TransformKind::Lookat(_) => index < 6,
        _ => false,
    }
}

/// Sampler keys bound to one element or one component of it
#[derive(Clone)]
struct BoundChannel {
    times: Vec<f32>,
    values: Vec<f32>,
    width: usize,
    interpolations: Vec<Interpolation>,
    in_tangents: Option<(usize, Vec<f32>)>,
    out_tangents: Option<(usize, Vec<f32>)>,
}

impl BoundChannel {
    fn into_keyframes(self) -> Vec<Keyframe> {
        let tangent = |tangents: &Option<(usize, Vec<f32>)>, key: usize| {
            tangents
                .as_ref()
                .map(|(width, values)| values[key * width..(key + 1) * width].to_vec())
        };
        (0..self.times.len())
            .map(|key| Keyframe {
                time: self.times[key],
                value: SmallVec::from_slice(&self.values[key * self.width..(key + 1) * self.width]),
                interpolation: self.interpolations[key],
                in_tangent: tangent(&self.in_tangents, key),
                out_tangent: tangent(&self.out_tangents, key),
            })
            .collect()
    }

    /// Scalar value at `time`, holding the end keys outside the range
    fn sample(&self, time: f32) -> f32 {
        let next = self.times.partition_point(|&t| t <= time);
        if next == 0 {
            return self.values[0];
        }
        let prev = next - 1;
        if next == self.times.len() || self.times[prev] == time {
            return self.values[prev];
        }
        match self.interpolations[prev] {
            Interpolation::Step => self.values[prev],
            _ => {
                let (t0, t1) = (self.times[prev], self.times[next]);
                let f = (time - t0) / (t1 - t0);
                self.values[prev] + (self.values[next] - self.values[prev]) * f
            }
        }
    }
}

struct PropertyChannels {
    property: String,
    kind: TransformKind,
    whole: Option<BoundChannel>,
    components: Vec<(usize, BoundChannel)>,
}

/// Combine single-component channels into whole-element keyframes.
///
/// Keys land on the union of all channel times; components no channel drives
/// keep the element's static value.
fn merge_components(
    kind: &TransformKind,
    components: Vec<(usize, BoundChannel)>,
    unit_scale: f32,
) -> Vec<Keyframe> {
    let base: SmallVec<[f32; 4]> = kind
        .values()
        .iter()
        .enumerate()
        .map(|(i, &v)| if is_translation(kind, i) { v * unit_scale } else { v })
        .collect();

    let mut times: Vec<f32> = components
        .iter()
        .flat_map(|(_, channel)| channel.times.iter().copied())
        .collect();
    times.sort_by(f32::total_cmp);
    times.dedup();

    // One interpolation for the merged track: shared if every channel agrees
    let first = components
        .first()
        .and_then(|(_, c)| c.interpolations.first().copied())
        .unwrap_or_default();
    let uniform = components
        .iter()
        .all(|(_, c)| c.interpolations.iter().all(|&i| i == first));
    let interpolation = if uniform && matches!(first, Interpolation::Step | Interpolation::Linear) {
        first
    } else {
        Interpolation::Linear
    };

    times
        .into_iter()
        .map(|time| {
            let mut value = base.clone();
            for (index, channel) in &components {
                value[*index] = channel.sample(time);
            }
            Keyframe {
                time,
                value,
                interpolation,
                in_tangent: None,
                out_tangent: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::scene::flatten_scene;
    use crate::test_support::*;
    use nether_dae::{
        Accessor, Channel, DataArray, Node, Param, Source, Transform, UnsharedInput, VisualScene,
    };

    fn interpolation_source(id: &str, names: &[&str]) -> Source {
        Source {
            id: Some(id.to_string()),
            name: None,
            accessor: Some(Accessor {
                source: format!("#{id}-array"),
                count: names.len(),
                offset: 0,
                stride: 1,
                params: vec![Param::named("INTERPOLATION", "name")],
            }),
            array: DataArray::Name {
                id: Some(format!("{id}-array")),
                values: names.iter().map(|n| n.to_string()).collect(),
            },
        }
    }

    fn sampler(id: &str, input: &str, output: &str) -> Sampler {
        Sampler {
            id: Some(id.to_string()),
            inputs: vec![unshared(Semantic::Input, input), unshared(Semantic::Output, output)],
        }
    }

    fn animated_node() -> Node {
        Node {
            id: Some("Arm".into()),
            name: Some("Arm".into()),
            sid: Some("Arm".into()),
            transforms: vec![
                Transform::with_sid("location", TransformKind::Translate([1.0, 2.0, 3.0])),
                Transform::with_sid("rotationZ", TransformKind::Rotate([0.0, 0.0, 1.0, 0.0])),
            ],
            ..Default::default()
        }
    }

    fn doc_with(animations: Vec<Animation>) -> Document {
        Document {
            visual_scenes: vec![VisualScene {
                id: Some("scene".into()),
                name: None,
                nodes: vec![animated_node()],
            }],
            animations,
            ..Default::default()
        }
    }

    fn build(doc: &Document) -> Result<AnimationClipTracks> {
        let options = AssemblyOptions::default();
        let flat = flatten_scene(doc, &doc.visual_scenes[0], &options)?;
        build_clip_tracks(doc, None, &flat, &options)
    }

    fn one_channel(target: &str, times: Vec<f32>, params: &[&str], values: Vec<f32>) -> Animation {
        Animation {
            id: Some("anim".into()),
            sources: vec![
                float_source("t", &["TIME"], times),
                float_source("v", params, values),
            ],
            samplers: vec![sampler("s", "t", "v")],
            channels: vec![Channel {
                source: "#s".into(),
                target: target.into(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_whole_element_track() {
        let doc = doc_with(vec![one_channel(
            "Arm/location",
            vec![0.0, 1.0],
            &["X", "Y", "Z"],
            vec![0.0, 0.0, 0.0, 4.0, 5.0, 6.0],
        )]);
        let clip = build(&doc).unwrap();

        assert_eq!(clip.name, "default");
        assert_eq!(clip.end, 1.0);
        assert_eq!(clip.tracks.len(), 1);
        let track = &clip.tracks[0];
        assert_eq!((track.node, track.element), (0, 0));
        assert_eq!(track.kind, "translate");
        assert_eq!(track.keyframes[1].value.as_slice(), &[4.0, 5.0, 6.0]);
        assert_eq!(track.keyframes[1].interpolation, Interpolation::Linear);
    }

    #[test]
    fn test_component_channels_merge_into_one_track() {
        let mut animation = one_channel("Arm/location.X", vec![0.0, 2.0], &["X"], vec![10.0, 20.0]);
        animation.sources.push(float_source("t2", &["TIME"], vec![1.0]));
        animation.sources.push(float_source("v2", &["Y"], vec![-1.0]));
        animation.samplers.push(sampler("s2", "t2", "v2"));
        animation.channels.push(Channel {
            source: "#s2".into(),
            target: "Arm/location.Y".into(),
        });

        let clip = build(&doc_with(vec![animation])).unwrap();
        assert_eq!(clip.tracks.len(), 1);

        let keys = &clip.tracks[0].keyframes;
        let times: Vec<f32> = keys.iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0]);
        // X interpolates, Y holds its only key, Z keeps the static value
        assert_eq!(keys[0].value.as_slice(), &[10.0, -1.0, 3.0]);
        assert_eq!(keys[1].value.as_slice(), &[15.0, -1.0, 3.0]);
        assert_eq!(keys[2].value.as_slice(), &[20.0, -1.0, 3.0]);
    }

    #[test]
    fn test_same_component_driven_twice_rejected() {
        let mut animation = one_channel("Arm/location.X", vec![0.0, 1.0], &["X"], vec![1.0, 2.0]);
        animation.channels.push(Channel {
            source: "#s".into(),
            target: "Arm/location(0)".into(),
        });

        let err = build(&doc_with(vec![animation])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AnimationTarget);
    }

    #[test]
    fn test_angle_member() {
        let doc = doc_with(vec![one_channel(
            "Arm/rotationZ.ANGLE",
            vec![0.0, 1.0],
            &["ANGLE"],
            vec![0.0, 90.0],
        )]);
        let clip = build(&doc).unwrap();
        let track = &clip.tracks[0];
        assert_eq!(track.element, 1);
        assert_eq!(track.keyframes[1].value.as_slice(), &[0.0, 0.0, 1.0, 90.0]);
    }

    #[test]
    fn test_step_interpolation() {
        let mut animation =
            one_channel("Arm/location", vec![0.0, 1.0], &["X", "Y", "Z"], vec![0.0; 6]);
        animation.sources.push(interpolation_source("i", &["STEP", "STEP"]));
        animation.samplers[0].inputs.push(UnsharedInput {
            semantic: Semantic::Interpolation,
            source: "#i".into(),
        });
        let clip = build(&doc_with(vec![animation])).unwrap();
        assert_eq!(clip.tracks[0].keyframes[0].interpolation, Interpolation::Step);
    }

    #[test]
    fn test_non_increasing_times_rejected() {
        let doc = doc_with(vec![one_channel(
            "Arm/location.X",
            vec![0.0, 1.0, 1.0],
            &["X"],
            vec![0.0, 1.0, 2.0],
        )]);
        assert_eq!(build(&doc).unwrap_err().kind(), ErrorKind::AnimationTarget);

        let doc = doc_with(vec![one_channel(
            "Arm/location.X",
            vec![1.0, 0.5],
            &["X"],
            vec![0.0, 1.0],
        )]);
        assert_eq!(build(&doc).unwrap_err().kind(), ErrorKind::AnimationTarget);
    }

    #[test]
    fn test_unknown_node() {
        let doc = doc_with(vec![one_channel("Leg/location.X", vec![0.0], &["X"], vec![1.0])]);
        assert_eq!(build(&doc).unwrap_err().kind(), ErrorKind::AnimationTarget);
    }

    #[test]
    fn test_unknown_element_sid() {
        let doc = doc_with(vec![one_channel("Arm/scale", vec![0.0], &["X"], vec![1.0])]);
        assert_eq!(build(&doc).unwrap_err().kind(), ErrorKind::AnimationTarget);
    }

    #[test]
    fn test_output_width_mismatch() {
        let doc = doc_with(vec![one_channel(
            "Arm/location",
            vec![0.0, 1.0],
            &["X", "Y"],
            vec![0.0, 0.0, 1.0, 1.0],
        )]);
        assert_eq!(build(&doc).unwrap_err().kind(), ErrorKind::AnimationTarget);
    }

    #[test]
    fn test_missing_sampler() {
        let mut animation = one_channel("Arm/location.X", vec![0.0], &["X"], vec![1.0]);
        animation.channels[0].source = "#nope".into();
        assert_eq!(
            build(&doc_with(vec![animation])).unwrap_err().kind(),
            ErrorKind::ParseReference
        );
    }

    #[test]
    fn test_translation_tracks_use_unit_scale() {
        let mut doc = doc_with(vec![one_channel(
            "Arm/location",
            vec![0.0],
            &["X", "Y", "Z"],
            vec![100.0, 200.0, 300.0],
        )]);
        doc.asset.unit.meter = 0.01;
        let clip = build(&doc).unwrap();
        assert_eq!(clip.tracks[0].keyframes[0].value.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_nested_animations_and_clip() {
        let child = one_channel("Arm/location.Z", vec![0.0, 0.5], &["Z"], vec![0.0, 1.0]);
        let parent = Animation {
            id: Some("walk".into()),
            children: vec![Animation {
                id: Some("walk-z".into()),
                ..child
            }],
            ..Default::default()
        };
        let mut doc = doc_with(vec![parent]);
        doc.animation_clips.push(AnimationClip {
            id: Some("walk-clip".into()),
            name: Some("Walk".into()),
            start: 0.0,
            end: Some(2.0),
            animations: vec!["#walk".into()],
        });

        let options = AssemblyOptions::default();
        let flat = flatten_scene(&doc, &doc.visual_scenes[0], &options).unwrap();
        let clip = build_clip_tracks(&doc, Some(&doc.animation_clips[0]), &flat, &options).unwrap();
        assert_eq!(clip.name, "Walk");
        assert_eq!(clip.end, 2.0);
        assert_eq!(clip.tracks.len(), 1);
    }
}
