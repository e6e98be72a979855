use crate::error::TankError;
use crate::fish::{Fish, Timing};
use crate::motion::{Bounds, Size};
use rand::Rng;
use tracing::{debug, info, warn};

/// Lowest y used for random placement when nothing else is configured.
pub(crate) const DEFAULT_PLACEMENT_FLOOR_PX: i32 = 300;

/// Totals for one presentation tick across the whole tank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct FrameReport {
    pub(crate) swim_ticks: usize,
    pub(crate) float_ticks: usize,
}

#[derive(Clone, Debug)]
pub(crate) struct Tank {
    width: i32,
    height: i32,
    water_line: i32,
    placement_floor: i32,
    timing: Timing,
    fish: Vec<Fish>,
}

impl Tank {
    /// A tank with no size yet. Fish cannot be placed until [`Tank::resize`].
    pub(crate) fn without_size(timing: Timing, placement_floor: i32) -> Self {
        Self {
            width: 0,
            height: 0,
            water_line: 0,
            placement_floor,
            timing,
            fish: Vec::new(),
        }
    }

    pub(crate) fn new(
        width: i32,
        height: i32,
        timing: Timing,
        placement_floor: i32,
    ) -> Result<Self, TankError> {
        let mut tank = Self::without_size(timing, placement_floor);
        tank.resize(width, height)?;
        Ok(tank)
    }

    /// New bounds from the resize collaborator. Fish keep their positions;
    /// the move primitives check the new bounds from the next tick on.
    pub(crate) fn resize(&mut self, width: i32, height: i32) -> Result<(), TankError> {
        if width <= 0 || height <= 0 {
            return Err(TankError::InvalidDimensions { width, height });
        }
        self.width = width;
        self.height = height;
        self.water_line = height / 10;
        debug!(width, height, water_line = self.water_line, "tank resized");
        Ok(())
    }

    /// Creates a fish at a random spot in the water and returns its index.
    ///
    /// The vertical range ends at the placement floor rather than at the
    /// tank height.
    pub(crate) fn add_fish<R: Rng + ?Sized>(
        &mut self,
        label: impl Into<String>,
        note: Option<String>,
        size: Size,
        now: u64,
        rng: &mut R,
    ) -> Result<usize, TankError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(TankError::UnknownDimensions);
        }

        let mut fish = Fish::new(label, note, size, self.timing, now)?;
        // A floor that does not reach below the water line places fish on it.
        let floor = self.placement_floor.max(self.water_line + 1);
        let x = (rng.gen::<f64>() * f64::from(self.width)).floor() as i32;
        let span = f64::from(floor - self.water_line);
        let y = (rng.gen::<f64>() * span + f64::from(self.water_line)).floor() as i32;
        fish.teleport_to(x, y);

        if self.bounds().contains(fish.position()) {
            info!(label = fish.label(), x, y, "fish added");
        } else {
            warn!(label = fish.label(), x, y, "fish placed outside the water");
        }
        self.fish.push(fish);
        Ok(self.fish.len() - 1)
    }

    /// Drives every fish for one presentation tick, in insertion order.
    pub(crate) fn frame<R: Rng + ?Sized>(&mut self, now: u64, rng: &mut R) -> FrameReport {
        let bounds = self.bounds();
        let mut report = FrameReport::default();
        for fish in &mut self.fish {
            let ticks = fish.frame(now, &bounds, rng);
            report.swim_ticks += usize::from(ticks.swam);
            report.float_ticks += usize::from(ticks.floated);
        }
        report
    }

    pub(crate) fn toggle_fish(&mut self, index: usize) -> Result<(), TankError> {
        let fish = self
            .fish
            .get_mut(index)
            .ok_or(TankError::NoSuchFish(index))?;
        fish.toggle();
        info!(
            label = fish.label(),
            swimming = fish.is_swimming(),
            bubble = fish.bubble_visible(),
            "fish toggled"
        );
        Ok(())
    }

    /// Draw order: fish without a visible bubble first, then the raised ones.
    pub(crate) fn stacking_order(&self) -> Vec<usize> {
        let (raised, lowered): (Vec<usize>, Vec<usize>) =
            (0..self.fish.len()).partition(|&i| self.fish[i].bubble_visible());
        lowered.into_iter().chain(raised).collect()
    }

    /// Topmost fish covering the pixel, if any.
    pub(crate) fn fish_at(&self, x: i32, y: i32) -> Option<usize> {
        self.stacking_order()
            .into_iter()
            .rev()
            .find(|&i| self.fish[i].contains(x, y))
    }

    pub(crate) fn bounds(&self) -> Bounds {
        Bounds {
            width: self.width,
            height: self.height,
            water_line: self.water_line,
        }
    }

    pub(crate) fn dimensions(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub(crate) fn water_line(&self) -> i32 {
        self.water_line
    }

    pub(crate) fn fish(&self) -> &[Fish] {
        &self.fish
    }

    pub(crate) fn swimming_count(&self) -> usize {
        self.fish.iter().filter(|f| f.is_swimming()).count()
    }
}
