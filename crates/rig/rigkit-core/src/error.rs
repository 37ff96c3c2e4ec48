//! Error types for loading and querying a rig.
//!
//! Structural problems with the input documents ([`AtlasError`], [`SkeletonError`],
//! [`ConfigError`]) are fatal to a load. [`LookupError`] is returned by the direct
//! lookup APIs; the composer treats it as "skip this slot".

use std::fmt;

use thiserror::Error;

/// Header sections of an atlas document, in the order they must appear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AtlasSection {
    Size,
    Filter,
    Pma,
}

impl AtlasSection {
    /// Line prefix introducing this section, including the colon.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Size => "size:",
            Self::Filter => "filter:",
            Self::Pma => "pma:",
        }
    }
}

impl fmt::Display for AtlasSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().trim_end_matches(':'))
    }
}

/// Rectangle-valued fields of a sprite record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteField {
    Bounds,
    Offsets,
}

impl SpriteField {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Bounds => "bounds:",
            Self::Offsets => "offsets:",
        }
    }
}

impl fmt::Display for SpriteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().trim_end_matches(':'))
    }
}

/// Keyframe track kinds inside a bone timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Translate,
    Rotate,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translate => f.write_str("translate"),
            Self::Rotate => f.write_str("rotate"),
        }
    }
}

/// Failure to parse an `x,y,w,h` rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RectParseError {
    #[error("expected 4 comma-separated fields, found {found}")]
    FieldCount { found: usize },

    #[error("field {index} is not an integer: '{value}'")]
    NotAnInteger { index: usize, value: String },
}

/// Structural errors in an atlas document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtlasError {
    #[error("atlas document is empty")]
    Empty,

    #[error("atlas is missing its `{section}:` line")]
    MissingSection { section: AtlasSection },

    #[error("malformed `{section}:` line: '{line}'")]
    MalformedSection { section: AtlasSection, line: String },

    #[error("sprite '{sprite}' is missing its `{field}:` line")]
    MissingSpriteField { sprite: String, field: SpriteField },

    #[error("sprite '{sprite}' has malformed {field}: {source}")]
    MalformedSpriteRect {
        sprite: String,
        field: SpriteField,
        source: RectParseError,
    },
}

/// Structural errors in a skeleton document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkeletonError {
    #[error("skeleton json: {reason}")]
    Json { reason: String },

    #[error("bone '{name}' is declared more than once")]
    DuplicateBone { name: String },

    #[error("slot '{name}' is declared more than once")]
    DuplicateSlot { name: String },

    #[error("bone '{bone}' is part of a parent cycle")]
    BoneCycle { bone: String },

    #[error(
        "animation '{animation}', bone '{bone}': {track} keyframe {index} has time {time}, \
         times must be finite and strictly increasing"
    )]
    InvalidKeyframeTime {
        animation: String,
        bone: String,
        track: TrackKind,
        index: usize,
        time: f32,
    },
}

impl From<serde_json::Error> for SkeletonError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            reason: err.to_string(),
        }
    }
}

/// A named entity was not found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("sprite not found: {name}")]
    SpriteNotFound { name: String },

    #[error("bone not found: {name}")]
    BoneNotFound { name: String },

    #[error("skin not found: {name}")]
    SkinNotFound { name: String },

    #[error("animation not found: {name}")]
    AnimationNotFound { name: String },
}

/// Invalid runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("viewport must be non-empty, got {width}x{height}")]
    EmptyViewport { width: u32, height: u32 },

    #[error("config json: {reason}")]
    Json { reason: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            reason: err.to_string(),
        }
    }
}

/// Any failure while building a [`crate::Rig`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Atlas(#[from] AtlasError),

    #[error(transparent)]
    Skeleton(#[from] SkeletonError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl LoadError {
    /// Short label for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Atlas(_) => "atlas",
            Self::Skeleton(_) => "skeleton",
            Self::Config(_) => "config",
            Self::Lookup(_) => "lookup",
        }
    }
}
