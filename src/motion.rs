//! Per-fish motion rules: edge reversal, the randomized drift cycle, the float
//! bob, and the bounds-checked move primitives they all go through.
//!
//! Everything here is a plain value with pure transitions. The fish owns the
//! values and commits whatever the transitions hand back.

use rand::Rng;
use serde::Serialize;

/// Pixels moved horizontally per swim tick.
pub(crate) const SWIM_STROKE_PX: i32 = 2;
/// At or left of this x the fish turns back to the right.
pub(crate) const LEFT_TURN_X: i32 = 3;
/// Swim ticks in one drift cycle, idle tick included.
pub(crate) const DRIFT_CYCLE_TICKS: u8 = 100;
/// Height of the float band in pixels.
pub(crate) const FLOAT_SPAN_PX: i32 = 10;

/// Read-only view of the tank a fish moves in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Bounds {
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) water_line: i32,
}

impl Bounds {
    pub(crate) fn contains(&self, p: Position) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= self.water_line && p.y < self.height
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct Position {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl Position {
    pub(crate) fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position after `step`, or `None` if it would leave the water.
    pub(crate) fn step(self, step: Step, bounds: &Bounds) -> Option<Position> {
        match step {
            Step::Up(px) => {
                let y = self.y - px;
                (y >= bounds.water_line).then_some(Position { y, ..self })
            }
            Step::Down(px) => {
                let y = self.y + px;
                (y < bounds.height).then_some(Position { y, ..self })
            }
            Step::Left(px) => {
                let x = self.x - px;
                (x >= 0).then_some(Position { x, ..self })
            }
            Step::Right(px) => {
                let x = self.x + px;
                (x < bounds.width).then_some(Position { x, ..self })
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct Size {
    pub(crate) width: i32,
    pub(crate) height: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Up(i32),
    Down(i32),
    Left(i32),
    Right(i32),
}

/// Horizontal direction, with hysteresis between the two edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct SwimState {
    pub(crate) reversing: bool,
}

impl SwimState {
    /// Direction for this tick given the fish's left edge `x`.
    ///
    /// Reversal latches at the right edge and releases only at
    /// [`LEFT_TURN_X`]; between the two the previous direction holds.
    pub(crate) fn steer(self, x: i32, fish_width: i32, bounds: &Bounds) -> SwimState {
        if x >= bounds.width - fish_width {
            SwimState { reversing: true }
        } else if x <= LEFT_TURN_X {
            SwimState { reversing: false }
        } else {
            self
        }
    }

    pub(crate) fn stroke(self) -> Step {
        if self.reversing {
            Step::Left(SWIM_STROKE_PX)
        } else {
            Step::Right(SWIM_STROKE_PX)
        }
    }
}

/// Vertical variation layered on top of the horizontal swim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Drift {
    Upward,
    Downward,
    Straight,
}

impl Drift {
    const ALL: [Drift; 3] = [Drift::Upward, Drift::Downward, Drift::Straight];

    pub(crate) fn pick<R: Rng + ?Sized>(rng: &mut R) -> Drift {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub(crate) fn action(self) -> Option<Step> {
        match self {
            Drift::Upward => Some(Step::Up(1)),
            Drift::Downward => Some(Step::Down(1)),
            Drift::Straight => None,
        }
    }
}

/// Drift state machine. `active == None` is idle; `turn` counts the ticks the
/// current drift has run, starting at 1 on the tick it was picked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct SubBehavior {
    pub(crate) active: Option<Drift>,
    pub(crate) turn: u8,
}

impl SubBehavior {
    /// One swim tick of the drift cycle.
    ///
    /// From idle a drift is picked and runs on the same tick. It keeps running
    /// while `turn` is below [`DRIFT_CYCLE_TICKS`], then the machine spends one
    /// tick idle before the next pick. Returns the next state and the drift to
    /// execute this tick, if any.
    pub(crate) fn advance<R: Rng + ?Sized>(self, rng: &mut R) -> (SubBehavior, Option<Drift>) {
        let mut next = self;
        if next.turn == 0 {
            next = SubBehavior {
                active: Some(Drift::pick(rng)),
                turn: 1,
            };
        }

        if next.turn < DRIFT_CYCLE_TICKS {
            next.turn += 1;
            (next, next.active)
        } else {
            (SubBehavior::default(), None)
        }
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        self.active.is_none()
    }
}

/// Slow vertical bob within a [`FLOAT_SPAN_PX`] band.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct FloatState {
    pub(crate) offset: i32,
    pub(crate) reversing: bool,
}

impl FloatState {
    /// Next float state and the one-pixel step to attempt. The offset tracks
    /// intent, so it advances even when the step itself is dropped.
    pub(crate) fn advance(self) -> (FloatState, Step) {
        let reversing = if self.offset >= FLOAT_SPAN_PX {
            true
        } else if self.offset <= 0 {
            false
        } else {
            self.reversing
        };

        if reversing {
            (
                FloatState {
                    offset: self.offset - 1,
                    reversing,
                },
                Step::Up(1),
            )
        } else {
            (
                FloatState {
                    offset: self.offset + 1,
                    reversing,
                },
                Step::Down(1),
            )
        }
    }
}
