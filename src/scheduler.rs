use crate::error::TankError;

/// Fixed-rate trigger evaluated once per presentation tick.
///
/// The host calls [`FrameScheduler::on_frame`] every tick. While armed and
/// running, the scheduler re-arms itself before doing any work, so stopping it
/// takes effect at the top of the next tick. When the elapsed time since the
/// reference exceeds the interval it reports a fire and moves the reference
/// forward by whole intervals, keeping the phase instead of snapping to `now`.
#[derive(Clone, Debug)]
pub(crate) struct FrameScheduler {
    interval_ms: u64,
    last_tick: u64,
    running: bool,
    armed: bool,
}

impl FrameScheduler {
    pub(crate) fn new(interval_ms: u64) -> Result<Self, TankError> {
        if interval_ms == 0 {
            return Err(TankError::ZeroInterval);
        }
        Ok(Self {
            interval_ms,
            last_tick: 0,
            running: false,
            armed: false,
        })
    }

    /// Starts the loop with `now` as the reference timestamp.
    pub(crate) fn start(&mut self, now: u64) {
        self.last_tick = now;
        self.running = true;
        self.armed = true;
    }

    /// Returns true when the behavior should run for this tick.
    pub(crate) fn on_frame(&mut self, now: u64) -> bool {
        if !self.armed {
            return false;
        }

        // One-shot registration: consumed here, renewed only while running.
        self.armed = false;
        if !self.running {
            return false;
        }
        self.armed = true;

        let elapsed = now.saturating_sub(self.last_tick);
        if elapsed > self.interval_ms {
            self.last_tick = now - elapsed % self.interval_ms;
            return true;
        }
        false
    }

    /// Flips the running flag. Re-enters the loop only if it is not already
    /// registered for the next tick.
    pub(crate) fn toggle(&mut self) {
        self.running = !self.running;
        if self.running && !self.armed {
            self.armed = true;
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    #[cfg(test)]
    pub(crate) fn is_armed(&self) -> bool {
        self.armed
    }

    #[cfg(test)]
    pub(crate) fn last_tick(&self) -> u64 {
        self.last_tick
    }

    #[cfg(test)]
    pub(crate) fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}
