//! Runtime configuration for a [`crate::Rig`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Host viewport the rig is drawn into.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "rigkit".to_string(),
        }
    }
}

impl Viewport {
    /// Default compose origin.
    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

/// Every recognized construction option. Unknown JSON keys are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub viewport: Viewport,
    /// Skin used for attachment placement; `None` picks the first declared skin.
    pub skin: Option<String>,
    /// Animation selected right after load.
    pub animation: Option<String>,
}

impl Config {
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Viewport { width, height, .. } = self.viewport;
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyViewport { width, height });
        }
        Ok(())
    }

    pub fn with_skin(mut self, skin: impl Into<String>) -> Self {
        self.skin = Some(skin.into());
        self
    }

    pub fn with_animation(mut self, animation: impl Into<String>) -> Self {
        self.animation = Some(animation.into());
        self
    }

    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport.width = width;
        self.viewport.height = height;
        self
    }
}
