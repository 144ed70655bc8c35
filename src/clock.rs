use std::time::Duration;

use shakmaty::Color;

/// Two-sided countdown clock. Only the side to move loses time, and only while running.
#[derive(Clone, Debug)]
pub struct Clock {
    white: Duration,
    black: Duration,
    running: bool,
}

impl Clock {
    pub fn new(limit: Duration) -> Self {
        Self {
            white: limit,
            black: limit,
            running: false,
        }
    }

    pub fn reset(&mut self, limit: Duration) {
        self.white = limit;
        self.black = limit;
        self.running = false;
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self, side: Color) -> Duration {
        match side {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    /// Drains `elapsed` from `side`. Returns the side whose flag fell, which also stops
    /// the clock.
    pub fn tick(&mut self, side: Color, elapsed: Duration) -> Option<Color> {
        if !self.running {
            return None;
        }
        let left = match side {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        };
        *left = left.saturating_sub(elapsed);
        if left.is_zero() {
            self.running = false;
            return Some(side);
        }
        None
    }
}

/// `m:ss` from whole seconds
pub fn format_time(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
