//! Room handshake for two-player games.
//!
//! Nothing is sent over a network. [`SimulatedRoom`] plays the server's part locally: a
//! created room reports its opponent after a fixed wait, a joined room is ready at once.

use std::fmt;
use std::time::{Duration, Instant};

use rand::Rng;
use shakmaty::Color;

use crate::error::{ParlorError, Result};

const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomCode(String);

impl RoomCode {
    /// Validates a user-entered code: surrounding whitespace is dropped, case kept.
    pub fn parse(text: &str) -> Result<Self> {
        let code = text.trim();
        if code.is_empty() {
            return Err(ParlorError::EmptyRoomCode);
        }
        Ok(Self(code.to_string()))
    }

    /// Random uppercase base-36 code of 5 or 6 characters.
    pub fn generate<G: Rng>(rng: &mut G) -> Self {
        let len = rng.random_range(5..=6);
        let code = (0..len)
            .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoomEvent {
    OpponentJoined,
}

pub trait RoomTransport {
    /// Opens a room hosted by the local player, who plays white.
    fn create_room(&mut self) -> Result<RoomCode>;

    /// Enters an existing room. Returns the color assigned to the local player.
    fn join_room(&mut self, code: &str) -> Result<Color>;

    fn poll(&mut self) -> Option<RoomEvent>;

    fn room(&self) -> Option<&RoomCode>;

    fn color(&self) -> Option<Color>;
}

#[derive(Debug)]
enum Pending {
    Idle,
    WaitingSince(Instant),
    Ready,
}

#[derive(Debug)]
pub struct SimulatedRoom<G: Rng> {
    rng: G,
    join_wait: Duration,
    room: Option<RoomCode>,
    color: Option<Color>,
    pending: Pending,
}

impl<G: Rng> SimulatedRoom<G> {
    pub fn new(rng: G, join_wait: Duration) -> Self {
        Self {
            rng,
            join_wait,
            room: None,
            color: None,
            pending: Pending::Idle,
        }
    }
}

impl<G: Rng> RoomTransport for SimulatedRoom<G> {
    fn create_room(&mut self) -> Result<RoomCode> {
        let code = RoomCode::generate(&mut self.rng);
        log::info!("room {} created, waiting for opponent", code);
        self.room = Some(code.clone());
        self.color = Some(Color::White);
        self.pending = Pending::WaitingSince(Instant::now());
        Ok(code)
    }

    fn join_room(&mut self, code: &str) -> Result<Color> {
        let code = RoomCode::parse(code)?;
        log::info!("joining room {}", code);
        self.room = Some(code);
        self.color = Some(Color::Black);
        self.pending = Pending::Ready;
        Ok(Color::Black)
    }

    fn poll(&mut self) -> Option<RoomEvent> {
        match self.pending {
            Pending::WaitingSince(at) if at.elapsed() >= self.join_wait => {
                self.pending = Pending::Idle;
                Some(RoomEvent::OpponentJoined)
            }
            Pending::Ready => {
                self.pending = Pending::Idle;
                Some(RoomEvent::OpponentJoined)
            }
            _ => None,
        }
    }

    fn room(&self) -> Option<&RoomCode> {
        self.room.as_ref()
    }

    fn color(&self) -> Option<Color> {
        self.color
    }
}
