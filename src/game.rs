//! Fixed-tick loop driver
//!
//! The game owns a sparse table of layer slots. Every tick it steps and then
//! draws each occupied slot in ascending slot order, with a constant `dt`.
//! The delay between ticks is fixed and applied after a tick completes, so a
//! slow tick slows the game down instead of dropping frames.

use std::convert::Infallible;
use std::time::Duration;

use crate::board::Board;
use crate::error::EngineError;
use crate::input::InputState;
use crate::settings::GameSettings;
use crate::sprites::{SpriteSheet, Surface};

/// Shared, read-only state for one tick
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    pub input: &'a InputState,
    pub sheet: &'a SpriteSheet,
    /// Playfield size in pixels
    pub width: f32,
    pub height: f32,
}

impl<'a> Frame<'a> {
    pub fn new(input: &'a InputState, sheet: &'a SpriteSheet, width: f32, height: f32) -> Self {
        Self {
            input,
            sheet,
            width,
            height,
        }
    }
}

/// Anything that can occupy a board slot
pub trait Layer {
    fn step(&mut self, dt: f32, frame: &Frame<'_>) -> Result<(), EngineError>;

    fn draw(&self, surface: &mut dyn Surface, frame: &Frame<'_>) -> Result<(), EngineError>;

    /// The layer as a board, if it is one
    fn as_board(&self) -> Option<&Board> {
        None
    }
}

impl Layer for Board {
    fn step(&mut self, dt: f32, frame: &Frame<'_>) -> Result<(), EngineError> {
        Board::step(self, dt, frame)
    }

    fn draw(&self, surface: &mut dyn Surface, frame: &Frame<'_>) -> Result<(), EngineError> {
        Board::draw(self, surface, frame.sheet)
    }

    fn as_board(&self) -> Option<&Board> {
        Some(self)
    }
}

/// Loop driver and owner of the board-slot table
pub struct Game {
    settings: GameSettings,
    sheet: SpriteSheet,
    pub input: InputState,
    boards: Vec<Option<Box<dyn Layer>>>,
    ticks: u64,
}

impl Game {
    pub fn new(settings: GameSettings, sheet: SpriteSheet) -> Self {
        let input = InputState::new(settings.key_bindings.clone());
        log::info!(
            "Game {}x{} @ {} ms/tick, {} sprites",
            settings.width,
            settings.height,
            settings.tick_ms,
            sheet.len()
        );
        Self {
            settings,
            sheet,
            input,
            boards: Vec::new(),
            ticks: 0,
        }
    }

    /// Put `layer` in `slot`, returning whatever was there.
    ///
    /// The previous occupant is handed back untouched; disposing of it is
    /// the caller's business.
    pub fn set_board(
        &mut self,
        slot: usize,
        layer: impl Layer + 'static,
    ) -> Option<Box<dyn Layer>> {
        if slot >= self.boards.len() {
            self.boards.resize_with(slot + 1, || None);
        }
        log::info!("Board slot {} set", slot);
        self.boards[slot].replace(Box::new(layer))
    }

    /// Empty `slot`, returning its occupant
    pub fn clear_board(&mut self, slot: usize) -> Option<Box<dyn Layer>> {
        let previous = self.boards.get_mut(slot).and_then(Option::take);
        if previous.is_some() {
            log::info!("Board slot {} cleared", slot);
        }
        previous
    }

    pub fn board(&self, slot: usize) -> Option<&dyn Layer> {
        self.boards.get(slot).and_then(|b| b.as_deref())
    }

    /// Number of occupied slots
    pub fn active_boards(&self) -> usize {
        self.boards.iter().flatten().count()
    }

    /// Run one tick: step then draw every occupied slot, lowest slot first.
    ///
    /// Stops at the first layer error.
    pub fn tick(&mut self, surface: &mut dyn Surface) -> Result<(), EngineError> {
        let dt = self.settings.tick_dt();
        let frame = Frame::new(
            &self.input,
            &self.sheet,
            self.settings.width as f32,
            self.settings.height as f32,
        );
        for layer in self.boards.iter_mut().flatten() {
            layer.step(dt, &frame)?;
            layer.draw(surface, &frame)?;
        }
        self.ticks += 1;
        log::trace!("Tick {}", self.ticks);
        Ok(())
    }

    /// Tick forever. `poll` runs before every tick so the host can refresh
    /// input or swap boards.
    ///
    /// Only returns if a tick fails.
    pub fn run<F>(&mut self, surface: &mut dyn Surface, mut poll: F) -> Result<Infallible, EngineError>
    where
        F: FnMut(&mut Game),
    {
        let interval = self.interval();
        loop {
            poll(self);
            self.tick(surface)?;
            std::thread::sleep(interval);
        }
    }

    /// Like [`Game::run`], but stops after `count` ticks
    pub fn run_ticks<F>(
        &mut self,
        count: u64,
        surface: &mut dyn Surface,
        mut poll: F,
    ) -> Result<(), EngineError>
    where
        F: FnMut(&mut Game),
    {
        let interval = self.interval();
        for _ in 0..count {
            poll(self);
            self.tick(surface)?;
            std::thread::sleep(interval);
        }
        Ok(())
    }

    /// Delay between the end of one tick and the start of the next
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.settings.tick_ms)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn sheet(&self) -> &SpriteSheet {
        &self.sheet
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprites::DrawList;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Layer that records its calls
    struct Recorder {
        name: &'static str,
        log: Log,
        fail: bool,
    }

    impl Recorder {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: Rc::clone(log),
                fail: false,
            }
        }
    }

    impl Layer for Recorder {
        fn step(&mut self, dt: f32, _frame: &Frame<'_>) -> Result<(), EngineError> {
            self.log
                .borrow_mut()
                .push(format!("{}.step({:.3})", self.name, dt));
            if self.fail {
                return Err(EngineError::UnknownSprite(self.name.to_string()));
            }
            Ok(())
        }

        fn draw(&self, _surface: &mut dyn Surface, _frame: &Frame<'_>) -> Result<(), EngineError> {
            self.log.borrow_mut().push(format!("{}.draw", self.name));
            Ok(())
        }
    }

    fn game() -> Game {
        Game::new(GameSettings::default(), SpriteSheet::new())
    }

    #[test]
    fn test_tick_visits_slots_in_order() {
        let log = Log::default();
        let mut game = game();
        game.set_board(3, Recorder::new("c", &log));
        game.set_board(0, Recorder::new("a", &log));
        game.set_board(1, Recorder::new("b", &log));
        assert_eq!(game.active_boards(), 3);

        let mut surface = DrawList::new();
        game.tick(&mut surface).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "a.step(0.030)",
                "a.draw",
                "b.step(0.030)",
                "b.draw",
                "c.step(0.030)",
                "c.draw"
            ]
        );
        assert_eq!(game.ticks(), 1);
    }

    #[test]
    fn test_set_board_replaces_last_writer_wins() {
        let log = Log::default();
        let mut game = game();
        assert!(game.set_board(0, Recorder::new("old", &log)).is_none());
        let previous = game.set_board(0, Recorder::new("new", &log));
        assert!(previous.is_some());

        let mut surface = DrawList::new();
        game.tick(&mut surface).unwrap();
        assert_eq!(*log.borrow(), vec!["new.step(0.030)", "new.draw"]);
    }

    #[test]
    fn test_clear_board_empties_slot() {
        let log = Log::default();
        let mut game = game();
        game.set_board(2, Recorder::new("a", &log));
        assert!(game.clear_board(2).is_some());
        assert!(game.clear_board(2).is_none());
        assert!(game.clear_board(9).is_none());
        assert_eq!(game.active_boards(), 0);

        let mut surface = DrawList::new();
        game.tick(&mut surface).unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_failed_step_stops_tick() {
        let log = Log::default();
        let mut game = game();
        let mut failing = Recorder::new("a", &log);
        failing.fail = true;
        game.set_board(0, failing);
        game.set_board(1, Recorder::new("b", &log));

        let mut surface = DrawList::new();
        assert!(game.tick(&mut surface).is_err());
        assert_eq!(*log.borrow(), vec!["a.step(0.030)"]);
        assert_eq!(game.ticks(), 0);
    }

    #[test]
    fn test_board_slot_exposes_board() {
        let mut game = game();
        game.set_board(0, Board::new());
        let board = game.board(0).and_then(|layer| layer.as_board()).unwrap();
        assert!(board.is_empty());
        assert!(game.board(1).is_none());
    }

    #[test]
    fn test_run_ticks_polls_before_each_tick() {
        let log = Log::default();
        let mut settings = GameSettings::default();
        settings.tick_ms = 1;
        let mut game = Game::new(settings, SpriteSheet::new());
        game.set_board(0, Recorder::new("a", &log));

        let mut polls = 0;
        let mut surface = DrawList::new();
        game.run_ticks(3, &mut surface, |game| {
            polls += 1;
            assert_eq!(game.ticks(), polls - 1);
        })
        .unwrap();

        assert_eq!(polls, 3);
        assert_eq!(game.ticks(), 3);
        assert_eq!(game.interval(), Duration::from_millis(1));
        assert_eq!(log.borrow()[0], "a.step(0.001)");
    }
}
