//! rigkit core: a minimal 2D skeletal animation runtime (engine-agnostic).
//!
//! Loads a skeleton JSON document and a text atlas, then per frame samples the
//! current animation into per-bone deltas and composes one [`DrawInstruction`]
//! per visible slot (destination transform + atlas source rectangle). Pixel work
//! is left to a [`Renderer`] supplied by the host.
//!
//! ```no_run
//! # fn main() -> Result<(), rigkit_core::LoadError> {
//! # let (skeleton_json, atlas_text) = ("{}", "");
//! use rigkit_core::{Config, Rig};
//!
//! let mut rig = Rig::load(skeleton_json, atlas_text, Config::default().with_animation("idle"))?;
//! rig.update(1.0 / 60.0);
//! for draw in rig.compose_centered() {
//!     println!("{} <- {:?}", draw.slot, draw.source);
//! }
//! # Ok(())
//! # }
//! ```

pub mod animator;
pub mod atlas;
pub mod compose;
pub mod config;
pub mod data;
pub mod document;
pub mod error;
pub mod hierarchy;
pub mod ids;
pub mod rig;
pub mod sampling;

// Re-exports for hosts and renderer adapters
pub use animator::Animator;
pub use atlas::{parse_atlas, Atlas, Rect, Sprite};
pub use compose::{Composer, DrawInstruction, Renderer};
pub use config::{Config, Viewport};
pub use data::{
    AnimationData, Attachment, BoneData, BoneTimeline, InheritMode, Keyframe, SkeletonDocument,
    SkeletonInfo, Skin, SlotData,
};
pub use document::parse_skeleton_json;
pub use error::{
    AtlasError, AtlasSection, ConfigError, LoadError, LookupError, RectParseError, SkeletonError,
    SpriteField, TrackKind,
};
pub use hierarchy::{BoneHierarchy, BoneState, BoneTransform, WorldTransform};
pub use ids::{BoneId, SpriteId};
pub use rig::Rig;
pub use sampling::{sample_rotate, sample_translate};
pub use glam::Affine2;
