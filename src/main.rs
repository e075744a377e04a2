//! Sprite Board entry point
//!
//! Runs the sample shooter headless for a fixed number of ticks, drawing
//! into a recording surface and driving the ship with scripted input.
//!
//! Usage: `RUST_LOG=info sprite-board [settings.json]`

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use sprite_board::invaders::Level;
use sprite_board::{
    Action, DrawList, EngineError, EntityKind, Game, GameSettings, Layer, SpriteSheet,
};

const SPRITE_DATA: &str = include_str!("../assets/sprites.json");

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), EngineError> {
    let settings = match std::env::args().nth(1) {
        Some(path) => GameSettings::load_or_default(path),
        None => GameSettings::default(),
    };
    let sheet = SpriteSheet::from_json(SPRITE_DATA)?;

    log::info!("Sprite Board starting...");
    let level = Level::new(&sheet, &settings)?;
    let ticks = settings.demo_ticks;
    let mut rng = Pcg32::seed_from_u64(settings.seed.wrapping_add(1));

    let mut game = Game::new(settings, sheet);
    game.set_board(0, level);

    let mut surface = DrawList::new();
    game.run_ticks(ticks, &mut surface, |game| {
        // Wander left and right, fire most of the time
        if rng.random_bool(0.1) {
            let left = rng.random_bool(0.5);
            game.input.set(Action::Left, left);
            game.input.set(Action::Right, !left);
        }
        game.input.set(Action::Fire, rng.random_bool(0.8));

        if game.ticks() % 33 == 0 {
            if let Some(board) = game.board(0).and_then(|layer| layer.as_board()) {
                log::info!(
                    "tick {}: {} entities ({} enemies, {} missiles)",
                    game.ticks(),
                    board.len(),
                    board.count(EntityKind::ENEMY),
                    board.count(EntityKind::PLAYER_PROJECTILE)
                );
            }
        }
    })?;

    let ship_alive = game
        .board(0)
        .and_then(|layer| layer.as_board())
        .is_some_and(|board| board.count(EntityKind::PLAYER) > 0);
    log::info!(
        "Ran {} ticks, {} draw calls, ship {}",
        game.ticks(),
        surface.len(),
        if ship_alive { "survived" } else { "destroyed" }
    );
    Ok(())
}
