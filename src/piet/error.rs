use std::fmt;

/// Fatal errors raised while loading or reducing a Piet image (§7).
///
/// Runtime conditions (insufficient stack operands, division by zero) are
/// *not* represented here: per §4.3/§9 they're silent no-ops on the running
/// machine, not errors a caller needs to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PietError {
    InvalidImage,
    InvalidCodelSize,
    UnknownColor((u8, u8, u8)),
}

impl fmt::Display for PietError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PietError::InvalidImage => write!(f, "invalid image: zero dimension or unreadable raster"),
            PietError::InvalidCodelSize => {
                write!(f, "codel size is zero or does not evenly divide the image dimensions")
            }
            PietError::UnknownColor((r, g, b)) => {
                write!(f, "pixel #{r:02x}{g:02x}{b:02x} is not in the Piet palette")
            }
        }
    }
}

impl std::error::Error for PietError {}

/// Why a [`crate::piet::Machine`] stopped running (§3, §7). `Terminated` is
/// a normal, successful halt, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// Eight consecutive exit attempts from the current block all failed.
    Terminated,
    /// The machine walked onto a black codel directly.
    TerminatedOnBlack,
    /// A host-imposed `max_steps` ceiling was reached.
    StepCapExceeded,
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Halt::Terminated => write!(f, "terminated: eight consecutive exit attempts failed"),
            Halt::TerminatedOnBlack => write!(f, "terminated: walked onto a black codel"),
            Halt::StepCapExceeded => write!(f, "step cap exceeded"),
        }
    }
}
