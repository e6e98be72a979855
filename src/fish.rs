use crate::error::TankError;
use crate::motion::{Bounds, Drift, FloatState, Position, Size, Step, SubBehavior, SwimState};
use crate::scheduler::FrameScheduler;
use rand::Rng;
use serde::Serialize;

pub(crate) const DEFAULT_SWIM_INTERVAL_MS: u64 = 10;
pub(crate) const DEFAULT_FLOAT_INTERVAL_MS: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Timing {
    pub(crate) swim_ms: u64,
    pub(crate) float_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            swim_ms: DEFAULT_SWIM_INTERVAL_MS,
            float_ms: DEFAULT_FLOAT_INTERVAL_MS,
        }
    }
}

/// What the renderer needs to draw one fish.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct FishView {
    pub(crate) label: String,
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) scale_x: f32,
    pub(crate) scale_y: f32,
    pub(crate) swimming: bool,
    pub(crate) drift: Option<Drift>,
    pub(crate) bubble: Option<String>,
}

/// Which of the two animations ran on a presentation tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct FishTicks {
    pub(crate) swam: bool,
    pub(crate) floated: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct Fish {
    label: String,
    note: Option<String>,
    pos: Position,
    size: Size,
    flipped: bool,
    swim: SwimState,
    float: FloatState,
    drift: SubBehavior,
    swim_clock: FrameScheduler,
    float_clock: FrameScheduler,
    bubble_visible: bool,
}

impl Fish {
    /// Creates a fish at the origin with both animations started at `now`.
    pub(crate) fn new(
        label: impl Into<String>,
        note: Option<String>,
        size: Size,
        timing: Timing,
        now: u64,
    ) -> Result<Self, TankError> {
        let mut swim_clock = FrameScheduler::new(timing.swim_ms)?;
        let mut float_clock = FrameScheduler::new(timing.float_ms)?;
        swim_clock.start(now);
        float_clock.start(now);

        Ok(Self {
            label: label.into(),
            note,
            pos: Position::default(),
            size,
            flipped: false,
            swim: SwimState::default(),
            float: FloatState::default(),
            drift: SubBehavior::default(),
            swim_clock,
            float_clock,
            bubble_visible: false,
        })
    }

    /// Places the fish without any bounds check.
    pub(crate) fn teleport_to(&mut self, x: i32, y: i32) {
        self.pos = Position::new(x, y);
    }

    /// Evaluates both schedulers for one presentation tick, swim first.
    pub(crate) fn frame<R: Rng + ?Sized>(
        &mut self,
        now: u64,
        bounds: &Bounds,
        rng: &mut R,
    ) -> FishTicks {
        let mut ticks = FishTicks::default();
        if self.swim_clock.on_frame(now) {
            self.swim(bounds, rng);
            ticks.swam = true;
        }
        if self.float_clock.on_frame(now) {
            self.float(bounds);
            ticks.floated = true;
        }
        ticks
    }

    /// One swim tick: edge reversal and stroke, then the drift cycle.
    pub(crate) fn swim<R: Rng + ?Sized>(&mut self, bounds: &Bounds, rng: &mut R) {
        self.swim = self.swim.steer(self.pos.x, self.size.width, bounds);
        self.flipped = self.swim.reversing;
        self.commit(self.swim.stroke(), bounds);

        let (drift, active) = self.drift.advance(rng);
        self.drift = drift;
        if let Some(step) = active.and_then(|d| d.action()) {
            self.commit(step, bounds);
        }
    }

    /// One float tick.
    pub(crate) fn float(&mut self, bounds: &Bounds) {
        let (float, step) = self.float.advance();
        self.float = float;
        self.commit(step, bounds);
    }

    fn commit(&mut self, step: Step, bounds: &Bounds) -> bool {
        match self.pos.step(step, bounds) {
            Some(p) => {
                self.pos = p;
                true
            }
            None => false,
        }
    }

    /// Interaction toggle: pauses or resumes swimming and shows or hides the
    /// bubble. Floating is unaffected.
    pub(crate) fn toggle(&mut self) {
        self.swim_clock.toggle();
        self.bubble_visible = !self.bubble_visible;
    }

    pub(crate) fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.pos.x
            && x < self.pos.x + self.size.width
            && y >= self.pos.y
            && y < self.pos.y + self.size.height
    }

    pub(crate) fn view(&self) -> FishView {
        FishView {
            label: self.label.clone(),
            x: self.pos.x,
            y: self.pos.y,
            scale_x: if self.flipped { -1.0 } else { 1.0 },
            scale_y: 1.0,
            swimming: self.is_swimming(),
            drift: self.drift.active,
            bubble: self.bubble_visible.then(|| self.bubble_text().to_string()),
        }
    }

    /// The note if one was configured, otherwise the label.
    pub(crate) fn bubble_text(&self) -> &str {
        self.note.as_deref().unwrap_or(&self.label)
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn is_swimming(&self) -> bool {
        self.swim_clock.is_running()
    }

    pub(crate) fn bubble_visible(&self) -> bool {
        self.bubble_visible
    }

    pub(crate) fn position(&self) -> Position {
        self.pos
    }
}

#[cfg(test)]
impl Fish {
    pub(crate) fn size(&self) -> Size {
        self.size
    }

    pub(crate) fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub(crate) fn swim_state(&self) -> SwimState {
        self.swim
    }

    pub(crate) fn float_state(&self) -> FloatState {
        self.float
    }

    pub(crate) fn sub_behavior(&self) -> SubBehavior {
        self.drift
    }

    pub(crate) fn swim_clock(&self) -> &FrameScheduler {
        &self.swim_clock
    }
}
