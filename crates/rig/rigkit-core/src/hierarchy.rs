//! Bone hierarchy resolution.
//!
//! Bones are stored flat in declaration order with parents pre-resolved to
//! [`BoneId`]s. The animated per-bone delta lives in a separate [`BoneState`] so the
//! hierarchy itself stays immutable after load.
//!
//! World transforms are plain sums along the parent chain: a child's offset is not
//! rotated by its parent's rotation. The accumulated Y is negated on output to move
//! from the document's top-down axis to the renderer's bottom-up axis.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::data::BoneData;
use crate::error::{LookupError, SkeletonError};
use crate::ids::BoneId;

/// Animated delta applied on top of a bone's static offset and rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneTransform {
    pub x: f32,
    pub y: f32,
    /// Degrees.
    pub rotation: f32,
}

/// Per-bone runtime deltas, indexed by [`BoneId`]. Written only by the animator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoneState {
    deltas: Vec<BoneTransform>,
}

impl BoneState {
    pub fn zeroed(bones: usize) -> Self {
        Self {
            deltas: vec![BoneTransform::default(); bones],
        }
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Delta for `id`; zero for ids outside the state.
    #[inline]
    pub fn get(&self, id: BoneId) -> BoneTransform {
        self.deltas.get(id.index()).copied().unwrap_or_default()
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: BoneId) -> Option<&mut BoneTransform> {
        self.deltas.get_mut(id.index())
    }

    pub fn reset(&mut self) {
        self.deltas.fill(BoneTransform::default());
    }
}

#[derive(Clone, Debug, PartialEq)]
enum ParentLink {
    Root,
    Bone(BoneId),
    /// Parent name that no bone declares. Resolution through it fails.
    Dangling(String),
}

/// Resolved world transform of one bone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldTransform<'a> {
    pub bone: &'a BoneData,
    pub x: f32,
    /// Already flipped to the bottom-up axis.
    pub y: f32,
    /// Degrees.
    pub rotation: f32,
}

/// Immutable bone forest built once at load time.
#[derive(Clone, Debug, Default)]
pub struct BoneHierarchy {
    bones: Vec<BoneData>,
    parents: Vec<ParentLink>,
    by_name: HashMap<String, BoneId>,
}

impl BoneHierarchy {
    /// Index bones by name, link parents and reject duplicate names and cycles.
    pub fn new(bones: Vec<BoneData>) -> Result<Self, SkeletonError> {
        let mut by_name = HashMap::with_capacity(bones.len());
        for (i, bone) in bones.iter().enumerate() {
            if by_name
                .insert(bone.name.clone(), BoneId::from_index(i))
                .is_some()
            {
                return Err(SkeletonError::DuplicateBone {
                    name: bone.name.clone(),
                });
            }
        }

        let parents = bones
            .iter()
            .map(|bone| match bone.parent.as_deref() {
                None | Some("") => ParentLink::Root,
                Some(name) => match by_name.get(name) {
                    Some(id) => ParentLink::Bone(*id),
                    None => ParentLink::Dangling(name.to_string()),
                },
            })
            .collect();

        let hierarchy = Self {
            bones,
            parents,
            by_name,
        };
        hierarchy.check_acyclic()?;
        Ok(hierarchy)
    }

    fn check_acyclic(&self) -> Result<(), SkeletonError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.bones.len()];
        let mut chain = Vec::new();
        for start in 0..self.bones.len() {
            let mut cur = start;
            loop {
                match marks[cur] {
                    Mark::Done => break,
                    Mark::InProgress => {
                        return Err(SkeletonError::BoneCycle {
                            bone: self.bones[cur].name.clone(),
                        })
                    }
                    Mark::Unvisited => {}
                }
                marks[cur] = Mark::InProgress;
                chain.push(cur);
                match &self.parents[cur] {
                    ParentLink::Bone(parent) => cur = parent.index(),
                    ParentLink::Root | ParentLink::Dangling(_) => break,
                }
            }
            for i in chain.drain(..) {
                marks[i] = Mark::Done;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Bones in declaration order.
    pub fn bones(&self) -> &[BoneData] {
        &self.bones
    }

    pub fn id_of(&self, name: &str) -> Option<BoneId> {
        self.by_name.get(name).copied()
    }

    pub fn bone(&self, id: BoneId) -> Option<&BoneData> {
        self.bones.get(id.index())
    }

    pub fn find_bone(&self, name: &str) -> Result<&BoneData, LookupError> {
        self.id_of(name)
            .and_then(|id| self.bone(id))
            .ok_or_else(|| bone_not_found(name))
    }

    /// Parent of `id`, if it is linked to a declared bone.
    pub fn parent_of(&self, id: BoneId) -> Option<BoneId> {
        match self.parents.get(id.index())? {
            ParentLink::Bone(parent) => Some(*parent),
            ParentLink::Root | ParentLink::Dangling(_) => None,
        }
    }

    /// Sum static offsets, rotations and animated deltas from `name` up to its root.
    pub fn resolve<'a>(
        &'a self,
        name: &str,
        pose: &BoneState,
    ) -> Result<WorldTransform<'a>, LookupError> {
        let id = self.id_of(name).ok_or_else(|| bone_not_found(name))?;
        self.resolve_id(id, pose)
    }

    pub fn resolve_id<'a>(
        &'a self,
        id: BoneId,
        pose: &BoneState,
    ) -> Result<WorldTransform<'a>, LookupError> {
        let bone = self
            .bone(id)
            .ok_or_else(|| bone_not_found(&format!("#{}", id.0)))?;

        let (mut x, mut y, mut rotation) = (0.0f32, 0.0f32, 0.0f32);
        let mut cur = id;
        loop {
            let b = &self.bones[cur.index()];
            let delta = pose.get(cur);
            x += b.x + delta.x;
            y += b.y + delta.y;
            rotation += b.rotation + delta.rotation;
            match &self.parents[cur.index()] {
                ParentLink::Root => break,
                ParentLink::Bone(parent) => cur = *parent,
                ParentLink::Dangling(missing) => return Err(bone_not_found(missing)),
            }
        }

        Ok(WorldTransform {
            bone,
            x,
            y: -y,
            rotation,
        })
    }

    /// Position-only variant of [`Self::resolve`].
    pub fn world_position(&self, name: &str, pose: &BoneState) -> Result<(f32, f32), LookupError> {
        self.resolve(name, pose).map(|w| (w.x, w.y))
    }
}

fn bone_not_found(name: &str) -> LookupError {
    LookupError::BoneNotFound {
        name: name.to_string(),
    }
}
