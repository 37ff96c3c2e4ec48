//! Rig: one animated character instance.
//!
//! Owns the loaded atlas, bone hierarchy, slots, skins and animations (read-only after
//! load) plus the only mutable state, the per-bone [`BoneState`]. `update` takes
//! `&mut self` and `compose_frame` takes `&self`, so a rig can never be animated
//! while a frame is being composed from it. Separate rigs share nothing.

use crate::animator::Animator;
use crate::atlas::{parse_atlas, Atlas, Sprite};
use crate::compose::{Composer, DrawInstruction, Renderer};
use crate::config::Config;
use crate::data::{BoneData, SkeletonDocument, SkeletonInfo, Skin, SlotData};
use crate::document::parse_skeleton_json;
use crate::error::{LoadError, LookupError};
use crate::hierarchy::{BoneHierarchy, BoneState, WorldTransform};

#[derive(Clone, Debug)]
pub struct Rig {
    cfg: Config,
    info: SkeletonInfo,
    atlas: Atlas,
    hierarchy: BoneHierarchy,
    slots: Vec<SlotData>,
    skins: Vec<Skin>,
    active_skin: Option<usize>,
    animator: Animator,
    pose: BoneState,
}

impl Rig {
    /// Parse both documents and build a rig. Nothing is returned on any failure.
    pub fn load(skeleton_json: &str, atlas_text: &str, cfg: Config) -> Result<Self, LoadError> {
        let doc = parse_skeleton_json(skeleton_json)?;
        let atlas = parse_atlas(atlas_text)?;
        Self::assemble(doc, atlas, cfg)
    }

    /// Build a rig from already-parsed documents.
    pub fn from_parts(doc: SkeletonDocument, atlas: Atlas, cfg: Config) -> Result<Self, LoadError> {
        doc.validate_basic()?;
        Self::assemble(doc, atlas, cfg)
    }

    fn assemble(doc: SkeletonDocument, atlas: Atlas, cfg: Config) -> Result<Self, LoadError> {
        cfg.validate()?;

        let SkeletonDocument {
            skeleton,
            bones,
            slots,
            skins,
            animations,
        } = doc;

        let hierarchy = BoneHierarchy::new(bones)?;

        let active_skin = match cfg.skin.as_deref() {
            Some(name) => Some(
                skins
                    .iter()
                    .position(|s| s.name == name)
                    .ok_or_else(|| LookupError::SkinNotFound {
                        name: name.to_string(),
                    })?,
            ),
            None if skins.is_empty() => None,
            None => Some(0),
        };

        let mut animator = Animator::new(animations, &hierarchy);
        if let Some(name) = cfg.animation.as_deref() {
            if !animator.has_animation(name) {
                return Err(LookupError::AnimationNotFound {
                    name: name.to_string(),
                }
                .into());
            }
            animator.set_animation(name);
        }

        let pose = BoneState::zeroed(hierarchy.len());

        log::debug!(
            "rig loaded: {} bones, {} slots, {} sprites in '{}', {} animations, skin {:?}",
            hierarchy.len(),
            slots.len(),
            atlas.sprites().len(),
            atlas.image_name,
            animator.names().count(),
            active_skin.map(|i| skins[i].name.as_str())
        );

        Ok(Self {
            cfg,
            info: skeleton,
            atlas,
            hierarchy,
            slots,
            skins,
            active_skin,
            animator,
            pose,
        })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// The document's `skeleton` header.
    pub fn info(&self) -> &SkeletonInfo {
        &self.info
    }

    pub fn atlas(&self) -> &Atlas {
        &self.atlas
    }

    pub fn hierarchy(&self) -> &BoneHierarchy {
        &self.hierarchy
    }

    /// Slots in paint order.
    pub fn slots(&self) -> &[SlotData] {
        &self.slots
    }

    pub fn skins(&self) -> &[Skin] {
        &self.skins
    }

    pub fn active_skin(&self) -> Option<&Skin> {
        self.active_skin.and_then(|i| self.skins.get(i))
    }

    pub fn pose(&self) -> &BoneState {
        &self.pose
    }

    pub fn find_bone(&self, name: &str) -> Result<&BoneData, LookupError> {
        self.hierarchy.find_bone(name)
    }

    pub fn find_sprite(&self, name: &str) -> Result<&Sprite, LookupError> {
        self.atlas.find_sprite(name)
    }

    /// World transform of `name` including the current animated deltas.
    pub fn resolve_world_transform(&self, name: &str) -> Result<WorldTransform<'_>, LookupError> {
        self.hierarchy.resolve(name, &self.pose)
    }

    pub fn bone_world_position(&self, name: &str) -> Result<(f32, f32), LookupError> {
        self.hierarchy.world_position(name, &self.pose)
    }

    /// Select an animation and rewind its clock. Unknown names are silently ignored.
    pub fn set_animation(&mut self, name: &str) {
        self.animator.set_animation(name);
    }

    pub fn current_animation(&self) -> Option<&str> {
        self.animator.current()
    }

    pub fn animation_time(&self) -> f32 {
        self.animator.time()
    }

    pub fn animation_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.animator.names()
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Advance the current animation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.animator.update(dt, &mut self.pose);
    }

    fn composer(&self) -> Composer<'_> {
        Composer {
            hierarchy: &self.hierarchy,
            pose: &self.pose,
            slots: &self.slots,
            skin: self.active_skin(),
            atlas: &self.atlas,
        }
    }

    /// Draw instructions for this frame in paint order.
    pub fn compose_frame(&self, origin_x: f32, origin_y: f32) -> Vec<DrawInstruction> {
        self.composer().compose(origin_x, origin_y)
    }

    /// [`Self::compose_frame`] at the viewport centre.
    pub fn compose_centered(&self) -> Vec<DrawInstruction> {
        let (x, y) = self.cfg.viewport.center();
        self.compose_frame(x, y)
    }

    /// Stream this frame into `renderer`; returns the number of instructions drawn.
    pub fn render(&self, renderer: &mut dyn Renderer, origin_x: f32, origin_y: f32) -> usize {
        self.composer().render(renderer, origin_x, origin_y)
    }
}
