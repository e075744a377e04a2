//! Entity contract and the sprite base every entity embeds

use glam::Vec2;

use super::collision::Rect;
use super::state::{BoardId, StepContext};
use crate::error::EngineError;
use crate::sprites::{SpriteSheet, Surface};

bitflags::bitflags! {
    /// Entity kind tag, used as a bitmask for collision filtering.
    ///
    /// The named kinds cover the bundled sample game; any other bit pattern
    /// is valid via [`EntityKind::from_bits_retain`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct EntityKind: u32 {
        const PLAYER = 1 << 0;
        const PLAYER_PROJECTILE = 1 << 1;
        const ENEMY = 1 << 2;
        const ENEMY_PROJECTILE = 1 << 3;
        const POWERUP = 1 << 4;
    }
}

/// Construction-time overrides for a [`Sprite`].
///
/// Unset fields keep whatever the sprite already has (for a fresh sprite:
/// origin position and frame 0).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpriteProps {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub frame: Option<u32>,
}

impl SpriteProps {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            frame: None,
        }
    }

    pub fn with_frame(mut self, frame: u32) -> Self {
        self.frame = Some(frame);
        self
    }
}

/// Position, size and kind shared by every entity
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    key: String,
    /// Top-left corner
    pub pos: Vec2,
    w: f32,
    h: f32,
    kind: EntityKind,
    /// Animation frame index
    pub frame: u32,
    board: Option<BoardId>,
}

impl Sprite {
    /// Create a sprite for `key`, sized from the sheet metadata.
    ///
    /// Fails with `UnknownSprite` if the sheet does not define `key`.
    pub fn setup(
        sheet: &SpriteSheet,
        key: &str,
        kind: EntityKind,
        props: &SpriteProps,
    ) -> Result<Self, EngineError> {
        let frame = sheet.lookup(key)?;
        let mut sprite = Self {
            key: key.to_string(),
            pos: Vec2::ZERO,
            w: frame.w as f32,
            h: frame.h as f32,
            kind,
            frame: 0,
            board: None,
        };
        sprite.merge(props);
        Ok(sprite)
    }

    /// Apply every field that `props` sets
    pub fn merge(&mut self, props: &SpriteProps) {
        if let Some(x) = props.x {
            self.pos.x = x;
        }
        if let Some(y) = props.y {
            self.pos.y = y;
        }
        if let Some(frame) = props.frame {
            self.frame = frame;
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface, sheet: &SpriteSheet) -> Result<(), EngineError> {
        sheet.draw(surface, &self.key, self.pos, self.frame)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn w(&self) -> f32 {
        self.w
    }

    pub fn h(&self) -> f32 {
        self.h
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.w, self.h)
    }

    /// Board this sprite was added to, if any
    pub fn board(&self) -> Option<BoardId> {
        self.board
    }

    pub(crate) fn attach(&mut self, board: BoardId) {
        self.board = Some(board);
    }
}

/// Anything that lives on a board.
///
/// Implementors embed a [`Sprite`] and expose it; the board reads kind and
/// bounds from it for bookkeeping and collision.
pub trait Entity {
    fn sprite(&self) -> &Sprite;

    fn sprite_mut(&mut self) -> &mut Sprite;

    /// Advance by `dt` seconds. May add entities, or mark any entity
    /// (including this one) for removal, through `ctx`.
    fn step(&mut self, ctx: &mut StepContext<'_>, dt: f32) -> Result<(), EngineError>;

    fn draw(&self, surface: &mut dyn Surface, sheet: &SpriteSheet) -> Result<(), EngineError> {
        self.sprite().draw(surface, sheet)
    }

    /// Apply damage. Returns `true` if the entity is destroyed by it.
    fn hit(&mut self, _damage: u32) -> bool {
        true
    }
}
