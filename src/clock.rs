use std::cell::Cell;
use std::time::{Duration, Instant};

/// Millisecond time source for drift computation.
pub(crate) trait Clock {
    fn now_ms(&self) -> u64;
}

pub(crate) struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Clock that only moves when told to. Drives headless runs.
#[derive(Default)]
pub(crate) struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub(crate) fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Sleep granularity is too coarse below this; the pacer spins instead.
const SPIN_MARGIN: Duration = Duration::from_millis(2);

/// Presentation-tick source: paces the main loop to a fixed frame rate.
pub(crate) struct FramePacer {
    frame: Duration,
    frame_start: Instant,
}

impl FramePacer {
    pub(crate) fn new(fps: u32) -> Self {
        Self {
            frame: frame_period(fps),
            frame_start: Instant::now(),
        }
    }

    pub(crate) fn frame_period(&self) -> Duration {
        self.frame
    }

    /// Blocks until the next tick is due: one coarse sleep, then a short spin.
    pub(crate) fn wait(&mut self) {
        let deadline = self.frame_start + self.frame;
        if let Some(coarse) = deadline
            .checked_duration_since(Instant::now())
            .and_then(|left| left.checked_sub(SPIN_MARGIN))
        {
            std::thread::sleep(coarse);
        }
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
        self.frame_start = Instant::now();
    }
}

pub(crate) fn frame_period(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(fps.max(1)))
}
