use thiserror::Error;

/// Integration faults in the tank core. Dropped moves are not errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum TankError {
    #[error("frame interval must be at least 1 ms")]
    ZeroInterval,

    #[error("tank dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("tank has no dimensions yet; resize it before placing fish")]
    UnknownDimensions,

    #[error("no fish at index {0}")]
    NoSuchFish(usize),
}
