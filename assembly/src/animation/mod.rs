//! Animation track building
//!
//! Channels are resolved against the flattened scene: the target path names
//! a node and one element of its transform stack, optionally narrowed to a
//! single component. Channels that each drive one component of the same
//! element are merged into a single whole-element track.

mod target;
mod track;

pub use target::{parse_target, Member, TargetPath};
pub use track::{
    build_clip_tracks, AnimationClipTracks, AnimationTrack, Interpolation, Keyframe,
};
