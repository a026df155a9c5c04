//! The Piet interpreter: a 2-D color-grid state machine (§2 items 1-7).

pub mod color;
pub mod dp;
pub mod error;
pub mod executor;
pub mod grid;
pub mod image_io;
pub mod navigator;
pub mod region;

pub use color::{Color, UnknownColorPolicy};
pub use error::{Halt, PietError};
pub use grid::Grid;
pub use navigator::{Machine, StepOutcome};

/// Loads a Piet program from an image file and returns a fresh [`Machine`]
/// over it in one call — the common case for a CLI frontend (§6).
pub fn load(path: &str, codel_size: Option<u32>, policy: UnknownColorPolicy) -> Result<Grid, PietError> {
    image_io::load(path, codel_size, policy)
}
