//! Fixed-timestep loop: simulation at a fixed 60 Hz, rendering at whatever
//! rate the display drives redraws. An accumulator carries fractional time
//! between frames so simulation stays deterministic under uneven frame
//! pacing.

use std::time::Instant;

/// Fixed simulation timestep (60 Hz).
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Frame time clamp. A longer frame accepts slowdown instead of running an
/// unbounded burst of catch-up steps.
pub const MAX_FRAME_TIME: f64 = 0.25;

pub struct GameLoop {
    previous_time: Instant,
    accumulator: f64,
    frame_count: u64,
    update_count: u64,
}

impl GameLoop {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            accumulator: 0.0,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Runs one frame: measures elapsed wall time, then calls `update_fn`
    /// zero or more times with `FIXED_DT`.
    pub fn tick(&mut self, mut update_fn: impl FnMut(f64)) {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;

        self.advance(frame_time, &mut update_fn);
    }

    fn advance(&mut self, frame_time: f64, update_fn: &mut impl FnMut(f64)) {
        self.accumulator += frame_time.min(MAX_FRAME_TIME);

        while self.accumulator >= FIXED_DT {
            update_fn(FIXED_DT);
            self.accumulator -= FIXED_DT;
            self.update_count += 1;
        }
        self.frame_count += 1;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}
