//! Axis-aligned overlap tests and board collision queries
//!
//! Boxes are half-open spans: a box at `x` with width `w` covers
//! `x .. x + w`. Two boxes collide when the spans intersect on both axes with
//! non-zero extent, so boxes that merely touch edges do not. Positions are
//! real-valued and any positive shared extent counts, including fractions of
//! a pixel.

use super::sprite::{Entity, EntityKind};
use super::state::{Board, EntityId};

/// Bounding box, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// True unless one box lies entirely above, below, left or right of the other
#[inline]
pub fn overlap(a: &Rect, b: &Rect) -> bool {
    !((a.x + a.w <= b.x) || (b.x + b.w <= a.x) || (a.y + a.h <= b.y) || (b.y + b.h <= a.y))
}

impl Board {
    /// First entity in board order for which `pred` holds.
    ///
    /// An entity whose `step` is currently running is not visible here.
    pub fn detect<F>(&self, mut pred: F) -> Option<EntityId>
    where
        F: FnMut(EntityId, &dyn Entity) -> bool,
    {
        self.objects
            .iter()
            .copied()
            .find(|&id| match self.entities.get(id).and_then(|e| e.entity.as_deref()) {
                Some(entity) => pred(id, entity),
                None => false,
            })
    }

    /// First entity (other than `id`) overlapping `id` whose kind intersects
    /// `mask`. An empty mask matches every kind.
    ///
    /// Results follow insertion order, not distance.
    pub fn collide(&self, id: EntityId, mask: EntityKind) -> Option<EntityId> {
        let bounds = self.get(id)?.sprite().bounds();
        self.collide_rect(Some(id), &bounds, mask)
    }

    /// Same as [`Board::collide`] for an arbitrary box.
    pub fn collide_rect(
        &self,
        exclude: Option<EntityId>,
        bounds: &Rect,
        mask: EntityKind,
    ) -> Option<EntityId> {
        self.detect(|id, other| {
            if Some(id) == exclude {
                return false;
            }
            let sprite = other.sprite();
            (mask.is_empty() || sprite.kind().intersects(mask)) && overlap(bounds, &sprite.bounds())
        })
    }
}
