use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "Glyph Shatter".into(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TextConfig {
    pub content: String,
    /// Laid-out string width in world units. <= 0 means 80% of window width.
    pub target_width: f32,
    /// Baseline height in world units (y-up, window center = 0).
    pub baseline_y: f32,
}
impl Default for TextConfig {
    fn default() -> Self {
        Self {
            content: "SHATTER".into(),
            target_width: 0.0,
            baseline_y: -60.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FontConfig {
    /// TTF candidates, tried in order; first parsable one wins.
    pub search_paths: Vec<String>,
}
impl Default for FontConfig {
    fn default() -> Self {
        Self {
            search_paths: vec![
                "assets/fonts/AovelSansRounded-rdDL.ttf".into(),
                "assets/fonts/FiraSans-Bold.ttf".into(),
            ],
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SplitterConfig {
    /// Chord redraw attempts per contour before falling back to an unsplit fragment.
    pub max_attempts: u32,
}
impl Default for SplitterConfig {
    fn default() -> Self {
        Self { max_attempts: 50 }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PointerConfig {
    /// Radius of the kinematic pointer disc.
    pub radius: f32,
}
impl Default for PointerConfig {
    fn default() -> Self {
        Self { radius: 12.0 }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScrollConfig {
    /// Rest positions drop by progress * viewport_height * drop_factor.
    pub drop_factor: f32,
}
impl Default for ScrollConfig {
    fn default() -> Self {
        Self { drop_factor: 1.0 }
    }
}

#[derive(Debug, Deserialize, Serialize, Resource, Clone, PartialEq, Default)]
#[serde(default)]
pub struct EffectConfig {
    pub window: WindowConfig,
    pub text: TextConfig,
    pub fonts: FontConfig,
    pub splitter: SplitterConfig,
    pub pointer: PointerConfig,
    pub scroll: ScrollConfig,
    pub rapier_debug: bool,
}

impl EffectConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        ron::from_str(&data).map_err(|e| format!("parse RON: {e}"))
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Non-fatal sanity pass; every entry is a warning, never an error.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push(format!(
                "window dimensions {}x{} invalid; defaults will be distorted",
                self.window.width, self.window.height
            ));
        }
        if self.text.content.trim().is_empty() {
            w.push("text.content is empty; the effect will stay idle".into());
        }
        if self.fonts.search_paths.is_empty() {
            w.push("fonts.search_paths is empty; no outlines can be produced".into());
        }
        if self.splitter.max_attempts == 0 {
            w.push("splitter.max_attempts is 0; every contour will ship unsplit".into());
        }
        if self.pointer.radius <= 0.0 {
            w.push(format!(
                "pointer.radius {} not positive; pointer contact disabled",
                self.pointer.radius
            ));
        }
        if self.scroll.drop_factor < 0.0 {
            w.push("scroll.drop_factor negative; scrolling will lift rest positions".into());
        }
        w
    }
}
