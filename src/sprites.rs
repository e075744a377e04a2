//! Sprite sheet metadata and the drawing surface seam
//!
//! The sheet only knows where each named sprite lives inside the packed
//! image. Pixels never pass through here: drawing hands a source rectangle
//! and a destination to whatever [`Surface`] the host provides.

use std::collections::HashMap;
use std::path::Path;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

fn one() -> u32 {
    1
}

/// Placement of one named sprite inside the sheet image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteFrame {
    /// Left edge of frame 0
    pub sx: u32,
    /// Top edge of every frame
    pub sy: u32,
    pub w: u32,
    pub h: u32,
    /// Animation frames laid out left to right
    #[serde(default = "one")]
    pub frames: u32,
}

impl SpriteFrame {
    /// Source rectangle for an animation frame.
    ///
    /// Frames are packed horizontally, so frame `n` starts `n * w` pixels
    /// to the right of frame 0. Indices past the strip show the last frame.
    pub fn source(&self, frame: u32) -> SourceRect {
        let frame = frame.min(self.frames.saturating_sub(1));
        SourceRect {
            x: self.sx.saturating_add(frame.saturating_mul(self.w)),
            y: self.sy,
            w: self.w,
            h: self.h,
        }
    }
}

/// Rectangle to copy out of the sheet image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Drawing target supplied by the host.
///
/// Implementations own the actual image; the engine only tells them which
/// part of it goes where.
pub trait Surface {
    fn draw_image(&mut self, src: SourceRect, dest: IVec2);
}

/// A single recorded blit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    pub src: SourceRect,
    pub dest: IVec2,
}

/// Surface that records draw calls instead of rasterizing them.
///
/// Used by the headless binary and by tests to observe draw order.
#[derive(Debug, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Surface for DrawList {
    fn draw_image(&mut self, src: SourceRect, dest: IVec2) {
        self.commands.push(DrawCommand { src, dest });
    }
}

/// Named sprite metadata for one packed image
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpriteSheet {
    map: HashMap<String, SpriteFrame>,
}

impl SpriteSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse sheet metadata from JSON: `{ "ship": { "sx": 0, "sy": 0, "w": 37, "h": 42 } }`
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let sheet: Self = serde_json::from_str(json).map_err(EngineError::SpriteData)?;
        log::debug!("Loaded sprite sheet with {} sprites", sheet.map.len());
        Ok(sheet)
    }

    /// Read sheet metadata from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Register or replace a sprite
    pub fn insert(&mut self, name: impl Into<String>, frame: SpriteFrame) {
        self.map.insert(name.into(), frame);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Metadata for a sprite, or `UnknownSprite` if the sheet lacks it
    pub fn lookup(&self, name: &str) -> Result<&SpriteFrame, EngineError> {
        self.map
            .get(name)
            .ok_or_else(|| EngineError::UnknownSprite(name.to_string()))
    }

    /// Blit one frame of `name` with its top-left corner at `pos`.
    ///
    /// The position is floored to whole pixels.
    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        name: &str,
        pos: glam::Vec2,
        frame: u32,
    ) -> Result<(), EngineError> {
        let sprite = self.lookup(name)?;
        let dest = IVec2::new(pos.x.floor() as i32, pos.y.floor() as i32);
        surface.draw_image(sprite.source(frame), dest);
        Ok(())
    }
}
