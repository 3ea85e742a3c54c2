/// Render throttle.  The simulation runs on every frame callback; drawing
/// only happens once a full frame interval has passed since the last draw.

#[derive(Clone, Debug, PartialEq)]
pub struct FrameScheduler {
    interval_ms: f64,
    last_render: Option<u64>,
}

impl FrameScheduler {
    pub fn new(target_fps: u32) -> Self {
        FrameScheduler {
            interval_ms: 1000.0 / target_fps.max(1) as f64,
            last_render: None,
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// True (and `now` recorded) on the first call and whenever at least one
    /// interval has elapsed since the last render.
    pub fn should_render(&mut self, now: u64) -> bool {
        let due = self
            .last_render
            .map_or(true, |last| now.saturating_sub(last) as f64 >= self.interval_ms);
        if due {
            self.last_render = Some(now);
        }
        due
    }

    /// Force the next call to render, e.g. after a resize.
    pub fn invalidate(&mut self) {
        self.last_render = None;
    }
}
