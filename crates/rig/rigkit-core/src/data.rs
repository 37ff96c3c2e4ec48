//! Skeleton document data model.
//!
//! Field names follow the skeleton JSON serialization contract (`name`, `parent`,
//! `length`, `rotation`, `x`, `y`, `inherit` for bones; `name`, `bone`,
//! `attachment` for slots; `name`, `attachments` for skins).

use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{SkeletonError, TrackKind};

/// `skeleton` header block. Informational only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonInfo {
    pub hash: String,
    pub spine: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub images: String,
    pub audio: String,
}

/// How a bone would inherit its parent's transform.
///
/// Recorded for interoperability; resolution always sums offsets and rotations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InheritMode {
    #[default]
    Normal,
    OnlyTranslation,
    NoRotationOrReflection,
    NoScale,
    NoScaleOrReflection,
    #[serde(other)]
    Other,
}

/// Static bone description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneData {
    pub name: String,
    /// `None` for roots. An empty string in the document also means root.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent: Option<String>,
    #[serde(default)]
    pub length: f32,
    /// Degrees.
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default, alias = "transform")]
    pub inherit: InheritMode,
}

impl BoneData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            length: 0.0,
            rotation: 0.0,
            x: 0.0,
            y: 0.0,
            inherit: InheritMode::Normal,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }
}

/// A drawable part attached to a bone. Slot order is paint order, back to front.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotData {
    pub name: String,
    pub bone: String,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub attachment: Option<String>,
}

/// Placement of an attachment relative to its slot's bone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
    pub x: f32,
    pub y: f32,
    /// Degrees.
    pub rotation: f32,
    pub width: f32,
    pub height: f32,
}

/// Named set of attachment placements, keyed by slot name then attachment name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Skin {
    pub name: String,
    #[serde(default)]
    pub attachments: HashMap<String, HashMap<String, Attachment>>,
}

impl Skin {
    pub fn attachment(&self, slot: &str, attachment: &str) -> Option<&Attachment> {
        self.attachments.get(slot)?.get(attachment)
    }
}

/// One key on a translate (`x`, `y`) or rotate (`value`) track. Time in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keyframe {
    pub time: f32,
    pub x: f32,
    pub y: f32,
    #[serde(alias = "angle")]
    pub value: f32,
}

impl Keyframe {
    pub fn translate(time: f32, x: f32, y: f32) -> Self {
        Self {
            time,
            x,
            y,
            value: 0.0,
        }
    }

    pub fn rotate(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            ..Self::default()
        }
    }
}

/// Keyframe tracks for one bone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoneTimeline {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub translate: Vec<Keyframe>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rotate: Vec<Keyframe>,
}

/// A named animation: bone name to keyframe tracks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationData {
    pub bones: HashMap<String, BoneTimeline>,
}

impl AnimationData {
    /// Reject tracks whose times are non-finite or not strictly increasing.
    pub fn validate_basic(&self, name: &str) -> Result<(), SkeletonError> {
        for (bone, timeline) in &self.bones {
            for (track, frames) in [
                (TrackKind::Translate, &timeline.translate),
                (TrackKind::Rotate, &timeline.rotate),
            ] {
                let mut last = f32::NEG_INFINITY;
                for (index, frame) in frames.iter().enumerate() {
                    if !frame.time.is_finite() || frame.time <= last {
                        return Err(SkeletonError::InvalidKeyframeTime {
                            animation: name.to_string(),
                            bone: bone.clone(),
                            track,
                            index,
                            time: frame.time,
                        });
                    }
                    last = frame.time;
                }
            }
        }
        Ok(())
    }

    /// Time of the last keyframe across all tracks.
    pub fn duration(&self) -> f32 {
        self.bones
            .values()
            .flat_map(|tl| tl.translate.iter().chain(tl.rotate.iter()))
            .map(|k| k.time)
            .fold(0.0, f32::max)
    }
}

/// Whole skeleton document as loaded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonDocument {
    pub skeleton: SkeletonInfo,
    pub bones: Vec<BoneData>,
    pub slots: Vec<SlotData>,
    pub skins: Vec<Skin>,
    /// Declaration order is preserved.
    pub animations: IndexMap<String, AnimationData>,
}

impl SkeletonDocument {
    /// Document-level invariants that don't need the resolved hierarchy.
    /// Bone names are checked when the hierarchy is built.
    pub fn validate_basic(&self) -> Result<(), SkeletonError> {
        let mut seen = hashbrown::HashSet::with_capacity(self.slots.len());
        for slot in &self.slots {
            if !seen.insert(slot.name.as_str()) {
                return Err(SkeletonError::DuplicateSlot {
                    name: slot.name.clone(),
                });
            }
        }
        for (name, anim) in &self.animations {
            anim.validate_basic(name)?;
        }
        Ok(())
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
