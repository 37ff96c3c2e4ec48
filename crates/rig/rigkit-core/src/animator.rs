//! Animation clock and per-bone delta sampling.
//!
//! Exactly one animation is current at a time. Timelines are bound to [`BoneId`]s
//! once at construction; timelines for bones the skeleton doesn't declare are dropped.

use indexmap::IndexMap;

use crate::data::{AnimationData, BoneTimeline};
use crate::hierarchy::{BoneHierarchy, BoneState};
use crate::ids::BoneId;
use crate::sampling::{sample_rotate, sample_translate};

/// Animation with timelines resolved to bone ids.
#[derive(Clone, Debug, Default)]
struct BoundAnimation {
    tracks: Vec<(BoneId, BoneTimeline)>,
    duration: f32,
}

#[derive(Clone, Debug, Default)]
pub struct Animator {
    clips: IndexMap<String, BoundAnimation>,
    current: Option<String>,
    time: f32,
}

impl Animator {
    pub fn new(animations: IndexMap<String, AnimationData>, hierarchy: &BoneHierarchy) -> Self {
        let clips = animations
            .into_iter()
            .map(|(name, data)| {
                let duration = data.duration();
                let mut tracks: Vec<(BoneId, BoneTimeline)> = Vec::with_capacity(data.bones.len());
                for (bone, timeline) in data.bones {
                    match hierarchy.id_of(&bone) {
                        Some(id) => tracks.push((id, timeline)),
                        None => log::warn!(
                            "animation '{name}' animates unknown bone '{bone}'; timeline dropped"
                        ),
                    }
                }
                tracks.sort_by_key(|(id, _)| *id);
                (name, BoundAnimation { tracks, duration })
            })
            .collect();
        Self {
            clips,
            current: None,
            time: 0.0,
        }
    }

    /// Select `name` and rewind the clock. Unknown names are ignored.
    pub fn set_animation(&mut self, name: &str) {
        if self.clips.contains_key(name) {
            self.current = Some(name.to_string());
            self.time = 0.0;
        } else {
            log::trace!("set_animation: no animation named '{name}', keeping {:?}", self.current);
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Seconds since the current animation was selected.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn has_animation(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    /// Animation names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.clips.keys().map(String::as_str)
    }

    /// Time of the last keyframe of `name`.
    pub fn duration(&self, name: &str) -> Option<f32> {
        self.clips.get(name).map(|c| c.duration)
    }

    /// Advance the clock by `dt` seconds and resample every bone the current
    /// animation drives. Other bones keep their last delta.
    pub fn update(&mut self, dt: f32, pose: &mut BoneState) {
        let Some(name) = self.current.as_deref() else {
            return;
        };
        let Some(clip) = self.clips.get(name) else {
            return;
        };
        self.time += dt;
        let t = self.time;
        for (id, timeline) in &clip.tracks {
            let Some(delta) = pose.get_mut(*id) else {
                continue;
            };
            if let Some((x, y)) = sample_translate(&timeline.translate, t) {
                delta.x = x;
                delta.y = y;
            }
            if let Some(rotation) = sample_rotate(&timeline.rotate, t) {
                delta.rotation = rotation;
            }
        }
    }

    /// Bones driven by `name`, for diagnostics.
    pub fn driven_bones(&self, name: &str) -> Vec<BoneId> {
        self.clips
            .get(name)
            .map(|c| c.tracks.iter().map(|(id, _)| *id).collect())
            .unwrap_or_default()
    }
}
