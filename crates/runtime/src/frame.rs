use foundation::time::TimeMs;

/// Largest frame delta fed to animations; longer gaps (background tabs) are treated as a stall.
pub const MAX_FRAME_DT_MS: f64 = 100.0;

/// Metadata for one display-refresh tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Host timestamp of this tick.
    pub time: TimeMs,
    /// Milliseconds since the previous tick, clamped to `[0, MAX_FRAME_DT_MS]`.
    pub dt_ms: f64,
}

impl Frame {
    pub fn new(index: u64, time: TimeMs, dt_ms: f64) -> Self {
        Self { index, time, dt_ms }
    }
}

/// Turns the timestamps handed to animation-frame callbacks into [`Frame`]s.
///
/// The clock never reads a wall clock itself so that a recorded timestamp sequence
/// replays identically.
#[derive(Debug, Default)]
pub struct FrameClock {
    next_index: u64,
    last: Option<TimeMs>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, now: TimeMs) -> Frame {
        let dt_ms = match self.last {
            Some(prev) => now.since(prev).min(MAX_FRAME_DT_MS),
            None => 0.0,
        };
        let frame = Frame::new(self.next_index, now, dt_ms);
        self.next_index = self.next_index.wrapping_add(1);
        self.last = Some(now);
        frame
    }

    pub fn frames_ticked(&self) -> u64 {
        self.next_index
    }
}
