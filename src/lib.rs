//! Sprite Board - a minimal 2D arcade runtime
//!
//! Core modules:
//! - `board`: Entity boards (storage, deferred removal, collision)
//! - `game`: Fixed-tick loop driver and board-slot table
//! - `sprites`: Sprite sheet metadata and the drawing surface seam
//! - `input`: Logical input state
//! - `settings`: JSON configuration
//! - `invaders`: Sample shooter entities built on the above

pub mod board;
pub mod error;
pub mod game;
pub mod input;
pub mod invaders;
pub mod settings;
pub mod sprites;

pub use board::{
    Board, BoardId, Entity, EntityId, EntityKind, Rect, Sprite, SpriteProps, StepContext, overlap,
};
pub use error::EngineError;
pub use game::{Frame, Game, Layer};
pub use input::{Action, InputState, KeyBindings};
pub use settings::GameSettings;
pub use sprites::{DrawList, SourceRect, SpriteFrame, SpriteSheet, Surface};

/// Loop timing constants
pub mod consts {
    /// Delay between ticks in the reference loop (~33 Hz)
    pub const TICK_MS: u64 = 30;
    /// Step length passed to every board, in seconds
    pub const TICK_DT: f32 = TICK_MS as f32 / 1000.0;
}
