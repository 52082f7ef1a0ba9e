//! Frame clock

use std::time::Instant;

enum ClockSource {
    /// Measure real elapsed time between ticks
    Wall { last_instant: Instant, first_tick: bool },
    /// Advance by a constant step every tick (headless runs, tests)
    Fixed { step: f64 },
}

/// Tracks simulated time and the per-frame delta.
///
/// The delta is reported as measured: there is no clamping and no
/// fixed-step accumulation, so a stall shows up as one large step.
pub struct GameClock {
    /// Total elapsed time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Number of ticks so far
    pub frame_count: u64,
    source: ClockSource,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            frame_count: 0,
            source: ClockSource::Wall {
                last_instant: Instant::now(),
                first_tick: true,
            },
        }
    }
}

impl GameClock {
    /// Create a wall-clock driven clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock that advances by exactly `step` seconds per tick
    pub fn fixed(step: f64) -> Self {
        Self {
            source: ClockSource::Fixed { step },
            ..Self::default()
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.source, ClockSource::Fixed { .. })
    }

    /// Advance the clock. Call once per frame.
    pub fn tick(&mut self) {
        self.frame_count += 1;
        match &mut self.source {
            ClockSource::Fixed { step } => {
                self.delta_time = *step;
            }
            ClockSource::Wall {
                last_instant,
                first_tick,
            } => {
                let now = Instant::now();
                if *first_tick {
                    *first_tick = false;
                    *last_instant = now;
                    self.delta_time = 0.0;
                    return;
                }
                self.delta_time = now.duration_since(*last_instant).as_secs_f64();
                *last_instant = now;
            }
        }
        self.total_time += self.delta_time;
    }
}
