//! Sample shooter built on the board engine
//!
//! A player ship at the bottom of the playfield, missiles it fires, and
//! enemies that drift down from the top. The demo binary runs this headless.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Entity, EntityKind, Sprite, SpriteProps, StepContext};
use crate::error::EngineError;
use crate::game::{Frame, Layer};
use crate::input::Action;
use crate::settings::GameSettings;
use crate::sprites::{SpriteSheet, Surface};

/// Horizontal speed of the player ship, px/s
pub const SHIP_MAX_VEL: f32 = 200.0;
/// Seconds between volleys
pub const SHIP_RELOAD: f32 = 0.25;
/// Missile speed, px/s (negative is up)
pub const MISSILE_VEL: f32 = -700.0;
pub const MISSILE_DAMAGE: u32 = 10;

pub struct PlayerShip {
    sprite: Sprite,
    reload: f32,
}

impl PlayerShip {
    /// Ship centered at the bottom of a `width` x `height` playfield
    pub fn new(sheet: &SpriteSheet, width: f32, height: f32) -> Result<Self, EngineError> {
        let mut sprite = Sprite::setup(sheet, "ship", EntityKind::PLAYER, &SpriteProps::default())?;
        let props = SpriteProps::at(width / 2.0 - sprite.w() / 2.0, height - 10.0 - sprite.h());
        sprite.merge(&props);
        Ok(Self {
            sprite,
            reload: 0.0,
        })
    }
}

impl Entity for PlayerShip {
    fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    fn sprite_mut(&mut self) -> &mut Sprite {
        &mut self.sprite
    }

    fn step(&mut self, ctx: &mut StepContext<'_>, dt: f32) -> Result<(), EngineError> {
        let input = ctx.input();
        let vx = if input.is_held(Action::Left) {
            -SHIP_MAX_VEL
        } else if input.is_held(Action::Right) {
            SHIP_MAX_VEL
        } else {
            0.0
        };
        let max_x = (ctx.frame.width - self.sprite.w()).max(0.0);
        self.sprite.pos.x = (self.sprite.pos.x + vx * dt).clamp(0.0, max_x);

        self.reload -= dt;
        if ctx.input().is_held(Action::Fire) && self.reload < 0.0 {
            self.reload = SHIP_RELOAD;
            let Vec2 { x, y } = self.sprite.pos;
            let muzzle_y = y + self.sprite.h() / 2.0;
            let left = PlayerMissile::new(ctx.sheet(), x, muzzle_y)?;
            let right = PlayerMissile::new(ctx.sheet(), x + self.sprite.w(), muzzle_y)?;
            ctx.add(left);
            ctx.add(right);
        }
        Ok(())
    }
}

pub struct PlayerMissile {
    sprite: Sprite,
}

impl PlayerMissile {
    /// Missile whose bottom-center sits at (`x`, `y`)
    pub fn new(sheet: &SpriteSheet, x: f32, y: f32) -> Result<Self, EngineError> {
        let mut sprite = Sprite::setup(
            sheet,
            "missile",
            EntityKind::PLAYER_PROJECTILE,
            &SpriteProps::default(),
        )?;
        sprite.merge(&SpriteProps::at(x - sprite.w() / 2.0, y - sprite.h()));
        Ok(Self { sprite })
    }
}

impl Entity for PlayerMissile {
    fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    fn sprite_mut(&mut self) -> &mut Sprite {
        &mut self.sprite
    }

    fn step(&mut self, ctx: &mut StepContext<'_>, dt: f32) -> Result<(), EngineError> {
        self.sprite.pos.y += MISSILE_VEL * dt;
        if let Some(target) = ctx.collide(&self.sprite, EntityKind::ENEMY) {
            ctx.hit(target, MISSILE_DAMAGE);
            ctx.remove_self();
        } else if self.sprite.pos.y < -self.sprite.h() {
            ctx.remove_self();
        }
        Ok(())
    }
}

/// Per-enemy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyBlueprint {
    pub sprite: String,
    /// Velocity, px/s
    pub vx: f32,
    pub vy: f32,
    pub health: u32,
    /// Damage dealt on contact with the player
    pub damage: u32,
}

impl Default for EnemyBlueprint {
    fn default() -> Self {
        Self {
            sprite: "enemy_purple".to_string(),
            vx: 0.0,
            vy: 100.0,
            health: 10,
            damage: 10,
        }
    }
}

pub struct Enemy {
    sprite: Sprite,
    vel: Vec2,
    health: u32,
    damage: u32,
}

impl Enemy {
    pub fn new(
        sheet: &SpriteSheet,
        blueprint: &EnemyBlueprint,
        x: f32,
        y: f32,
    ) -> Result<Self, EngineError> {
        let sprite = Sprite::setup(
            sheet,
            &blueprint.sprite,
            EntityKind::ENEMY,
            &SpriteProps::at(x, y),
        )?;
        Ok(Self {
            sprite,
            vel: Vec2::new(blueprint.vx, blueprint.vy),
            health: blueprint.health,
            damage: blueprint.damage,
        })
    }
}

impl Entity for Enemy {
    fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    fn sprite_mut(&mut self) -> &mut Sprite {
        &mut self.sprite
    }

    fn step(&mut self, ctx: &mut StepContext<'_>, dt: f32) -> Result<(), EngineError> {
        self.sprite.pos += self.vel * dt;

        if let Some(player) = ctx.collide(&self.sprite, EntityKind::PLAYER) {
            ctx.hit(player, self.damage);
            ctx.remove_self();
            return Ok(());
        }

        let Vec2 { x, y } = self.sprite.pos;
        if y > ctx.frame.height || x < -self.sprite.w() || x > ctx.frame.width {
            ctx.remove_self();
        }
        Ok(())
    }

    fn hit(&mut self, damage: u32) -> bool {
        self.health = self.health.saturating_sub(damage);
        self.health == 0
    }
}

/// Enemy variants the level picks from
pub fn default_blueprints() -> Vec<EnemyBlueprint> {
    vec![
        EnemyBlueprint::default(),
        EnemyBlueprint {
            sprite: "enemy_bee".to_string(),
            vx: 40.0,
            vy: 120.0,
            ..Default::default()
        },
        EnemyBlueprint {
            sprite: "enemy_ship".to_string(),
            vy: 60.0,
            health: 20,
            ..Default::default()
        },
        EnemyBlueprint {
            sprite: "enemy_circle".to_string(),
            vx: -40.0,
            vy: 150.0,
            ..Default::default()
        },
    ]
}

/// A board plus a timed enemy spawner
pub struct Level {
    board: Board,
    rng: Pcg32,
    blueprints: Vec<EnemyBlueprint>,
    interval: f32,
    timer: f32,
    spawned: u32,
}

impl Level {
    /// New level with the player ship already on the board.
    ///
    /// A non-positive (or NaN) `enemy_interval` falls back to the default.
    pub fn new(sheet: &SpriteSheet, settings: &GameSettings) -> Result<Self, EngineError> {
        let interval = if settings.enemy_interval > 0.0 {
            settings.enemy_interval
        } else {
            let fallback = GameSettings::default().enemy_interval;
            log::warn!(
                "enemy_interval {} is not positive, using {}",
                settings.enemy_interval,
                fallback
            );
            fallback
        };
        let mut board = Board::new();
        board.add(PlayerShip::new(
            sheet,
            settings.width as f32,
            settings.height as f32,
        )?);
        Ok(Self {
            board,
            rng: Pcg32::seed_from_u64(settings.seed),
            blueprints: default_blueprints(),
            interval,
            timer: interval,
            spawned: 0,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Enemies spawned so far
    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    fn spawn_enemy(&mut self, frame: &Frame<'_>) -> Result<(), EngineError> {
        if self.blueprints.is_empty() {
            return Ok(());
        }
        let blueprint = &self.blueprints[self.rng.random_range(0..self.blueprints.len())];
        let w = frame.sheet.lookup(&blueprint.sprite)?.w as f32;
        let h = frame.sheet.lookup(&blueprint.sprite)?.h as f32;
        let x = self.rng.random_range(0.0..(frame.width - w).max(1.0));
        let enemy = Enemy::new(frame.sheet, blueprint, x, -h)?;
        self.board.add(enemy);
        self.spawned += 1;
        log::debug!("Spawned {} at x={:.0}", blueprint.sprite, x);
        Ok(())
    }
}

impl Layer for Level {
    fn step(&mut self, dt: f32, frame: &Frame<'_>) -> Result<(), EngineError> {
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.timer += self.interval;
            self.spawn_enemy(frame)?;
        }
        self.board.step(dt, frame)
    }

    fn draw(&self, surface: &mut dyn Surface, frame: &Frame<'_>) -> Result<(), EngineError> {
        self.board.draw(surface, frame.sheet)
    }

    fn as_board(&self) -> Option<&Board> {
        Some(&self.board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputState;

    fn sheet() -> SpriteSheet {
        SpriteSheet::from_json(include_str!("../assets/sprites.json")).unwrap()
    }

    fn step(board: &mut Board, sheet: &SpriteSheet, input: &InputState) {
        let frame = Frame::new(input, sheet, 320.0, 480.0);
        board.step(0.03, &frame).unwrap();
    }

    fn still(health: u32) -> EnemyBlueprint {
        EnemyBlueprint {
            vy: 0.0,
            health,
            ..Default::default()
        }
    }

    #[test]
    fn test_ship_moves_and_clamps() {
        let sheet = sheet();
        let mut board = Board::new();
        let ship = board.add(PlayerShip::new(&sheet, 320.0, 480.0).unwrap());
        let start = board.get(ship).unwrap().sprite().pos;
        assert_eq!(start, Vec2::new(141.5, 428.0));

        let mut input = InputState::default();
        input.set(Action::Right, true);
        step(&mut board, &sheet, &input);
        let x = board.get(ship).unwrap().sprite().pos.x;
        assert!((x - 147.5).abs() < 1e-3);

        for _ in 0..100 {
            step(&mut board, &sheet, &input);
        }
        assert_eq!(board.get(ship).unwrap().sprite().pos.x, 320.0 - 37.0);
    }

    #[test]
    fn test_fire_spawns_pair_then_reloads() {
        let sheet = sheet();
        let mut board = Board::new();
        board.add(PlayerShip::new(&sheet, 320.0, 480.0).unwrap());

        let mut input = InputState::default();
        input.set(Action::Fire, true);
        step(&mut board, &sheet, &input);
        assert_eq!(board.count(EntityKind::PLAYER_PROJECTILE), 2);

        // Still reloading
        step(&mut board, &sheet, &input);
        assert_eq!(board.count(EntityKind::PLAYER_PROJECTILE), 2);
    }

    #[test]
    fn test_missile_destroys_enemy() {
        let sheet = sheet();
        let mut board = Board::new();
        board.add(Enemy::new(&sheet, &still(10), 100.0, 100.0).unwrap());
        board.add(PlayerMissile::new(&sheet, 110.0, 150.0).unwrap());

        step(&mut board, &sheet, &InputState::default());
        assert_eq!(board.count(EntityKind::ENEMY), 0);
        assert_eq!(board.count(EntityKind::PLAYER_PROJECTILE), 0);
        assert!(board.is_empty());
    }

    #[test]
    fn test_armored_enemy_survives_one_hit() {
        let sheet = sheet();
        let mut board = Board::new();
        board.add(Enemy::new(&sheet, &still(20), 100.0, 100.0).unwrap());
        board.add(PlayerMissile::new(&sheet, 110.0, 150.0).unwrap());

        step(&mut board, &sheet, &InputState::default());
        assert_eq!(board.count(EntityKind::ENEMY), 1);
        assert_eq!(board.count(EntityKind::PLAYER_PROJECTILE), 0);
    }

    #[test]
    fn test_missile_leaves_top_of_screen() {
        let sheet = sheet();
        let mut board = Board::new();
        board.add(PlayerMissile::new(&sheet, 50.0, 5.0).unwrap());
        for _ in 0..3 {
            step(&mut board, &sheet, &InputState::default());
        }
        assert!(board.is_empty());
    }

    #[test]
    fn test_enemy_rams_player() {
        let sheet = sheet();
        let mut board = Board::new();
        let ship = board.add(PlayerShip::new(&sheet, 320.0, 480.0).unwrap());
        board.add(Enemy::new(&sheet, &still(10), 141.0, 420.0).unwrap());

        step(&mut board, &sheet, &InputState::default());
        assert!(!board.contains(ship));
        assert!(board.is_empty());
    }

    #[test]
    fn test_enemy_off_screen_is_removed() {
        let sheet = sheet();
        let mut board = Board::new();
        board.add(Enemy::new(&sheet, &EnemyBlueprint::default(), 10.0, 479.0).unwrap());
        step(&mut board, &sheet, &InputState::default());
        assert_eq!(board.count(EntityKind::ENEMY), 0);
    }

    #[test]
    fn test_unknown_blueprint_sprite_fails() {
        let blueprint = EnemyBlueprint {
            sprite: "mothership".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            Enemy::new(&sheet(), &blueprint, 0.0, 0.0),
            Err(EngineError::UnknownSprite(_))
        ));
    }

    #[test]
    fn test_level_spawns_on_interval() {
        let sheet = sheet();
        let settings = GameSettings {
            enemy_interval: 0.05,
            ..Default::default()
        };
        let mut level = Level::new(&sheet, &settings).unwrap();
        let input = InputState::default();
        let frame = Frame::new(&input, &sheet, 320.0, 480.0);

        level.step(0.03, &frame).unwrap();
        assert_eq!(level.spawned(), 0);
        level.step(0.03, &frame).unwrap();
        assert_eq!(level.spawned(), 1);
        assert_eq!(level.board().count(EntityKind::ENEMY), 1);
        assert_eq!(level.board().count(EntityKind::PLAYER), 1);
    }

    #[test]
    fn test_level_rejects_non_positive_interval() {
        let sheet = sheet();
        let input = InputState::default();
        let frame = Frame::new(&input, &sheet, 320.0, 480.0);

        for enemy_interval in [0.0, -1.0, f32::NAN] {
            let settings = GameSettings {
                enemy_interval,
                ..Default::default()
            };
            let mut level = Level::new(&sheet, &settings).unwrap();
            for _ in 0..5 {
                level.step(0.03, &frame).unwrap();
            }
            assert_eq!(level.spawned(), 0);
        }
    }

    #[test]
    fn test_level_is_deterministic_for_seed() {
        let sheet = sheet();
        let settings = GameSettings {
            enemy_interval: 0.03,
            ..Default::default()
        };
        let input = InputState::default();
        let frame = Frame::new(&input, &sheet, 320.0, 480.0);

        let positions = |level: &Level| -> Vec<Vec2> {
            let board = level.board();
            board
                .ids()
                .iter()
                .map(|&id| board.get(id).unwrap().sprite().pos)
                .collect()
        };

        let mut a = Level::new(&sheet, &settings).unwrap();
        let mut b = Level::new(&sheet, &settings).unwrap();
        for _ in 0..10 {
            a.step(0.03, &frame).unwrap();
            b.step(0.03, &frame).unwrap();
        }
        assert_eq!(positions(&a), positions(&b));
    }
}
