//! A single game: position, clock, mode and selection owned together.

use std::fmt;
use std::time::{Duration, Instant};

use shakmaty::{Color, Move, Square};

use crate::bot::Bot;
use crate::clock::Clock;
use crate::error::{ParlorError, Result};
use crate::room::RoomCode;
use crate::rules::{RulesEngine, ShakmatyRules, move_to_uci};
use crate::selection::{ClickOutcome, Selection};
use crate::types::EngineConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameMode {
    /// Human against the bot; the bot plays the other color.
    Bot { human: Color },
    /// Both sides at one keyboard.
    Local,
    Online { room: RoomCode, color: Color },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Checkmate { winner: Color },
    Stalemate,
    Draw,
    Timeout { winner: Color },
    Check(Color),
    ToMove(Color),
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::Check(_) | GameStatus::ToMove(_))
    }
}

pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Checkmate { winner } => {
                write!(f, "Checkmate! {} wins!", color_name(*winner))
            }
            GameStatus::Stalemate => f.write_str("Stalemate!"),
            GameStatus::Draw => f.write_str("Draw!"),
            GameStatus::Timeout { winner } => write!(f, "{} wins on time!", color_name(*winner)),
            GameStatus::Check(_) => f.write_str("Check!"),
            GameStatus::ToMove(side) => write!(f, "{} to move", color_name(*side)),
        }
    }
}

pub struct GameSession<R: RulesEngine + Clone = ShakmatyRules> {
    rules: R,
    initial: R,
    mode: GameMode,
    clock: Clock,
    selection: Selection,
    bot: Bot,
    config: EngineConfig,
    flagged: Option<Color>,
}

impl GameSession<ShakmatyRules> {
    pub fn start(mode: GameMode, config: EngineConfig) -> Self {
        Self::new(ShakmatyRules::new(), mode, config)
    }

    /// Plays a move given in UCI notation for the local player.
    pub fn play_uci(&mut self, text: &str) -> Result<Move> {
        let mv = self.rules.parse_uci(text)?;
        self.play(&mv)?;
        Ok(mv)
    }
}

impl<R: RulesEngine + Clone> GameSession<R> {
    /// Starts a game from `rules`; the clock runs immediately.
    pub fn new(rules: R, mode: GameMode, config: EngineConfig) -> Self {
        let mut clock = Clock::new(config.clock);
        clock.start();
        log::info!("new game: {:?}", mode);
        Self {
            initial: rules.clone(),
            rules,
            mode,
            clock,
            selection: Selection::default(),
            bot: Bot::new(config.bot, config.depth, config.seed),
            config,
            flagged: None,
        }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn mode(&self) -> &GameMode {
        &self.mode
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Applies new settings. Depth and bot kind take effect on the next bot move,
    /// the clock limit on the next reset.
    pub fn configure(&mut self, config: EngineConfig) {
        self.bot.set_depth(config.depth);
        self.bot.set_kind(config.bot);
        self.config = config;
    }

    /// Back to the starting position with full clocks.
    pub fn reset(&mut self) {
        self.rules = self.initial.clone();
        self.clock.reset(self.config.clock);
        self.clock.start();
        self.selection.clear();
        self.flagged = None;
        log::info!("game reset");
    }

    pub fn status(&self) -> GameStatus {
        let turn = self.rules.turn();
        if let Some(loser) = self.flagged {
            GameStatus::Timeout { winner: !loser }
        } else if self.rules.is_checkmate() {
            GameStatus::Checkmate { winner: !turn }
        } else if self.rules.is_stalemate() {
            GameStatus::Stalemate
        } else if self.rules.is_draw() {
            GameStatus::Draw
        } else if self.rules.is_check() {
            GameStatus::Check(turn)
        } else {
            GameStatus::ToMove(turn)
        }
    }

    pub fn is_over(&self) -> bool {
        self.status().is_over()
    }

    /// Whether the side to move is controlled from this keyboard.
    pub fn local_to_move(&self) -> bool {
        let turn = self.rules.turn();
        match &self.mode {
            GameMode::Bot { human } => turn == *human,
            GameMode::Local => true,
            GameMode::Online { color, .. } => turn == *color,
        }
    }

    pub fn bot_to_move(&self) -> bool {
        matches!(self.mode, GameMode::Bot { .. }) && !self.local_to_move() && !self.is_over()
    }

    pub fn click(&mut self, square: Square) -> Result<ClickOutcome> {
        if self.is_over() {
            return Err(ParlorError::GameOver);
        }
        if !self.local_to_move() {
            return Ok(ClickOutcome::Ignored);
        }
        let outcome = self.selection.click(&mut self.rules, square);
        if let ClickOutcome::Moved(ref mv) = outcome {
            self.after_move(mv);
        }
        Ok(outcome)
    }

    /// Plays a fully specified move for the local player.
    pub fn play(&mut self, mv: &Move) -> Result<()> {
        if self.is_over() {
            return Err(ParlorError::GameOver);
        }
        if !self.local_to_move() {
            return Err(ParlorError::NotYourTurn(self.rules.turn()));
        }
        self.rules.apply(mv)?;
        self.after_move(mv);
        Ok(())
    }

    /// Lets the bot choose and play. `None` if it is not the bot's turn or it has no move.
    pub fn play_bot_move(&mut self) -> Option<Move> {
        if !self.bot_to_move() {
            return None;
        }
        let started = Instant::now();
        let mv = self.bot.choose(&mut self.rules)?;
        // Thinking time is the bot's own; a flag fall forfeits the move.
        if self.tick(started.elapsed()).is_some() {
            return None;
        }
        if let Err(e) = self.rules.apply(&mv) {
            log::warn!("bot move rejected: {}", e);
            return None;
        }
        self.after_move(&mv);
        Some(mv)
    }

    /// Takes back one ply, or two against the bot so the human is to move again.
    pub fn undo(&mut self) -> Result<()> {
        let plies = match self.mode {
            GameMode::Bot { .. } => 2,
            _ => 1,
        };
        if self.rules.ply_count() == 0 {
            return Err(ParlorError::NothingToUndo);
        }
        for _ in 0..plies {
            if !self.rules.undo() {
                break;
            }
        }
        self.selection.clear();
        if self.flagged.is_none() && !self.rules.is_game_over() {
            self.clock.start();
        }
        log::debug!("undo {} ply, {} left", plies, self.rules.ply_count());
        Ok(())
    }

    /// Charges `elapsed` to the side to move. Returns the side that ran out of time.
    pub fn tick(&mut self, elapsed: Duration) -> Option<Color> {
        if self.flagged.is_some() {
            return None;
        }
        let flagged = self.clock.tick(self.rules.turn(), elapsed)?;
        log::info!("{} ran out of time", color_name(flagged));
        self.flagged = Some(flagged);
        self.selection.clear();
        Some(flagged)
    }

    fn after_move(&mut self, mv: &Move) {
        self.selection.clear();
        log::debug!("played {}", move_to_uci(mv));
        if self.rules.is_game_over() {
            self.clock.stop();
            log::info!("{}", self.status());
        }
    }
}
