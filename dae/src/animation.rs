//! Animation elements

use serde::{Deserialize, Serialize};

use crate::geometry::UnsharedInput;
use crate::source::Source;
use crate::traits::{impl_has_id, impl_has_name};

/// `<animation>`; may nest further animations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Animation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub samplers: Vec<Sampler>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub children: Vec<Animation>,
}

impl_has_id!(Animation);
impl_has_name!(Animation);

impl Animation {
    /// Depth-first search for a nested animation by id (self included)
    pub fn find(&self, id: &str) -> Option<&Animation> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// `<sampler>`: INPUT (times), OUTPUT (values), INTERPOLATION and tangents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sampler {
    pub id: Option<String>,
    pub inputs: Vec<UnsharedInput>,
}

impl_has_id!(Sampler);

/// `<channel>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Reference to a sampler in the same animation
    pub source: String,
    /// SID path, e.g. `Bone1/rotateZ.ANGLE` or `Root/transform(3)(0)`
    pub target: String,
}

/// `<animation_clip>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start: f32,
    #[serde(default)]
    pub end: Option<f32>,
    /// `<instance_animation>` references
    #[serde(default)]
    pub animations: Vec<String>,
}

impl_has_id!(AnimationClip);
impl_has_name!(AnimationClip);
