//! Game time keeping: game time since level load, delta time, frame
//! counter, and time scale.
//!
//! The tick driver is the only writer (`advance` once per frame); the
//! scheduler and task bodies read from arbitrary threads, so every field is
//! an atomic. f64 values are stored as their bit patterns.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub struct GameClock {
    start: Instant,
    game_time: AtomicU64,
    delta: AtomicU64,
    time_scale: AtomicU64,
    frame: AtomicU64,
}

fn load_f64(cell: &AtomicU64) -> f64 {
    f64::from_bits(cell.load(Ordering::SeqCst))
}

fn store_f64(cell: &AtomicU64, value: f64) {
    cell.store(value.to_bits(), Ordering::SeqCst);
}

impl GameClock {
    pub fn new() -> Self {
        GameClock {
            start: Instant::now(),
            game_time: AtomicU64::new(0f64.to_bits()),
            delta: AtomicU64::new(0f64.to_bits()),
            time_scale: AtomicU64::new(1f64.to_bits()),
            frame: AtomicU64::new(0),
        }
    }

    /// Scaled game time in seconds since level load.
    pub fn game_time(&self) -> f64 {
        load_f64(&self.game_time)
    }

    /// Scaled duration of the last frame in seconds.
    pub fn delta_time(&self) -> f64 {
        load_f64(&self.delta)
    }

    /// Frames advanced since startup.
    pub fn frame(&self) -> u64 {
        self.frame.load(Ordering::SeqCst)
    }

    pub fn time_scale(&self) -> f64 {
        load_f64(&self.time_scale)
    }

    pub fn set_time_scale(&self, scale: f64) {
        store_f64(&self.time_scale, scale);
    }

    /// Unscaled wall-clock seconds since the clock was created.
    pub fn real_time_since_start(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Advance the clock by one frame. Called once per frame by the tick
    /// driver; the time scale is applied to `delta` before accumulation.
    pub fn advance(&self, delta: f64) {
        let scaled = delta * self.time_scale();
        store_f64(&self.game_time, self.game_time() + scaled);
        store_f64(&self.delta, scaled);
        self.frame.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for GameClock {
    fn default() -> Self {
        GameClock::new()
    }
}
