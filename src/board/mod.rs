//! Entity boards
//!
//! A board owns a flat, ordered list of entities and is stepped and drawn
//! once per tick:
//! - Insertion order is step and draw order
//! - Removal requested during a step takes effect after the whole pass
//! - Per-kind live counts are kept in sync with the list

pub mod collision;
pub mod sprite;
pub mod state;

pub use collision::{Rect, overlap};
pub use sprite::{Entity, EntityKind, Sprite, SpriteProps};
pub use state::{Board, BoardId, EntityId, StepContext};
