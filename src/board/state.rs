//! Board: the ordered entity list for one screen
//!
//! Removal is two-phase. `remove` only marks an entity; the list itself is
//! not touched until `finalize_removed` runs after the step pass, so entities
//! can remove themselves or each other mid-iteration.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use slotmap::SlotMap;

use super::collision::Rect;
use super::sprite::{Entity, EntityKind, Sprite};
use crate::error::EngineError;
use crate::game::Frame;
use crate::input::InputState;
use crate::sprites::{SpriteSheet, Surface};

slotmap::new_key_type! {
    /// Handle to an entity on a board
    pub struct EntityId;
}

static NEXT_BOARD_ID: AtomicU32 = AtomicU32::new(1);

/// Non-owning reference from an entity back to its board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardId(u32);

/// Storage slot. `entity` is `None` while that entity's `step` runs.
pub(super) struct Entry {
    kind: EntityKind,
    pub(super) entity: Option<Box<dyn Entity>>,
}

pub struct Board {
    id: BoardId,
    pub(super) entities: SlotMap<EntityId, Entry>,
    /// Step and draw order
    pub(super) objects: Vec<EntityId>,
    counts: HashMap<EntityKind, usize>,
    removed: Vec<EntityId>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            id: BoardId(NEXT_BOARD_ID.fetch_add(1, Ordering::Relaxed)),
            entities: SlotMap::with_key(),
            objects: Vec::new(),
            counts: HashMap::new(),
            removed: Vec::new(),
        }
    }

    pub fn id(&self) -> BoardId {
        self.id
    }

    /// Append an entity to the end of the step/draw order
    pub fn add(&mut self, entity: impl Entity + 'static) -> EntityId {
        self.add_boxed(Box::new(entity))
    }

    pub fn add_boxed(&mut self, mut entity: Box<dyn Entity>) -> EntityId {
        entity.sprite_mut().attach(self.id);
        let kind = entity.sprite().kind();
        let id = self.entities.insert(Entry {
            kind,
            entity: Some(entity),
        });
        self.objects.push(id);
        *self.counts.entry(kind).or_insert(0) += 1;
        log::trace!("Added {:?} ({:?})", id, kind);
        id
    }

    /// Mark an entity for removal at the end of the current step.
    ///
    /// Marking twice is the same as marking once.
    pub fn remove(&mut self, id: EntityId) {
        if !self.removed.contains(&id) {
            self.removed.push(id);
        }
    }

    pub fn is_pending_removal(&self, id: EntityId) -> bool {
        self.removed.contains(&id)
    }

    /// Forget all removal marks
    pub fn reset_removed(&mut self) {
        self.removed.clear();
    }

    /// Physically remove every marked entity still on the board
    pub fn finalize_removed(&mut self) {
        for id in std::mem::take(&mut self.removed) {
            let Some(idx) = self.objects.iter().position(|&o| o == id) else {
                continue;
            };
            self.objects.remove(idx);
            if let Some(entry) = self.entities.remove(id) {
                if let Some(count) = self.counts.get_mut(&entry.kind) {
                    *count -= 1;
                    if *count == 0 {
                        self.counts.remove(&entry.kind);
                    }
                }
                log::trace!("Removed {:?} ({:?})", id, entry.kind);
            }
        }
    }

    /// Call `f` on each entity, in order.
    ///
    /// The length is sampled once up front: entities appended while `f` runs
    /// are not visited in this pass.
    pub fn iterate<F>(&self, mut f: F) -> Result<(), EngineError>
    where
        F: FnMut(EntityId, &dyn Entity) -> Result<(), EngineError>,
    {
        let len = self.objects.len();
        for &id in &self.objects[..len] {
            if let Some(entity) = self.entities.get(id).and_then(|e| e.entity.as_deref()) {
                f(id, entity)?;
            }
        }
        Ok(())
    }

    /// Reset removal marks, step every entity, then apply removals.
    ///
    /// If an entity fails, the pass stops there but marked removals are still
    /// applied before the error is returned.
    pub fn step(&mut self, dt: f32, frame: &Frame<'_>) -> Result<(), EngineError> {
        self.reset_removed();
        let result = self.step_entities(dt, frame);
        self.finalize_removed();
        result
    }

    fn step_entities(&mut self, dt: f32, frame: &Frame<'_>) -> Result<(), EngineError> {
        let len = self.objects.len();
        for i in 0..len {
            let Some(&id) = self.objects.get(i) else {
                break;
            };
            // Take the entity out so it can borrow the board mutably
            let Some(mut entity) = self.entities.get_mut(id).and_then(|e| e.entity.take()) else {
                continue;
            };
            let result = {
                let mut ctx = StepContext {
                    board: self,
                    frame,
                    id,
                };
                entity.step(&mut ctx, dt)
            };
            if let Some(entry) = self.entities.get_mut(id) {
                entry.entity = Some(entity);
            }
            result?;
        }
        Ok(())
    }

    /// Draw every entity in order. Never changes membership.
    pub fn draw(&self, surface: &mut dyn Surface, sheet: &SpriteSheet) -> Result<(), EngineError> {
        self.iterate(|_, entity| entity.draw(surface, sheet))
    }

    pub fn get(&self, id: EntityId) -> Option<&dyn Entity> {
        self.entities.get(id).and_then(|e| e.entity.as_deref())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut (dyn Entity + 'static)> {
        self.entities.get_mut(id).and_then(|e| e.entity.as_deref_mut())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Entity handles in step/draw order
    pub fn ids(&self) -> &[EntityId] {
        &self.objects
    }

    /// Number of live entities of exactly `kind`, as tagged when added
    pub fn count(&self, kind: EntityKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// What an entity sees of the world during its own `step`.
///
/// Board access is limited to adding, marking for removal and queries, so
/// an entity can never reshape the list while the pass is walking it.
pub struct StepContext<'a> {
    board: &'a mut Board,
    pub frame: &'a Frame<'a>,
    id: EntityId,
}

impl StepContext<'_> {
    /// Handle of the entity being stepped
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn input(&self) -> &InputState {
        self.frame.input
    }

    pub fn sheet(&self) -> &SpriteSheet {
        self.frame.sheet
    }

    pub fn add(&mut self, entity: impl Entity + 'static) -> EntityId {
        self.board.add(entity)
    }

    pub fn remove(&mut self, id: EntityId) {
        self.board.remove(id);
    }

    pub fn remove_self(&mut self) {
        self.board.remove(self.id);
    }

    /// First other entity overlapping `sprite` whose kind intersects `mask`
    pub fn collide(&self, sprite: &Sprite, mask: EntityKind) -> Option<EntityId> {
        self.board.collide_rect(Some(self.id), &sprite.bounds(), mask)
    }

    /// Another entity on the board. `None` for the entity being stepped.
    pub fn get(&self, id: EntityId) -> Option<&dyn Entity> {
        self.board.get(id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut (dyn Entity + 'static)> {
        self.board.get_mut(id)
    }

    pub fn ids(&self) -> &[EntityId] {
        self.board.ids()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.board.count(kind)
    }

    pub fn is_pending_removal(&self, id: EntityId) -> bool {
        self.board.is_pending_removal(id)
    }

    /// Damage another entity, marking it for removal if that destroys it.
    ///
    /// Returns `false` if `target` is not on the board or is the entity
    /// being stepped; an entity damages itself through its own `hit`.
    pub fn hit(&mut self, target: EntityId, damage: u32) -> bool {
        if target == self.id {
            return false;
        }
        let Some(entity) = self.board.get_mut(target) else {
            return false;
        };
        if entity.hit(damage) {
            self.board.remove(target);
        }
        true
    }

    /// Same as [`StepContext::collide`] for an arbitrary box
    pub fn collide_rect(&self, bounds: &Rect, mask: EntityKind) -> Option<EntityId> {
        self.board.collide_rect(Some(self.id), bounds, mask)
    }
}
