//! The 20-color Piet palette and the hue/lightness command table (§4.1).

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive)]
pub enum Hue {
    Red = 0,
    Yellow = 1,
    Green = 2,
    Cyan = 3,
    Blue = 4,
    Magenta = 5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive)]
pub enum Lightness {
    Light = 0,
    Normal = 1,
    Dark = 2,
}

/// A codel's color.
///
/// `Other` never appears on a clean grid: the loader resolves any
/// non-palette pixel according to the configured [`UnknownColorPolicy`]
/// before the interpreter ever sees it (§4.1). There is deliberately no
/// `Marker` variant here — the block finder (§4.4) tracks visited codels in
/// a side bitset instead of writing into the grid, so the "no cell ever
/// holds `Marker`" invariant holds structurally rather than by convention.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Chromatic(Hue, Lightness),
    Black,
    White,
}

#[allow(non_upper_case_globals)]
impl Color {
    pub const LightRed: Color = Color::Chromatic(Hue::Red, Lightness::Light);
    pub const LightYellow: Color = Color::Chromatic(Hue::Yellow, Lightness::Light);
    pub const LightGreen: Color = Color::Chromatic(Hue::Green, Lightness::Light);
    pub const LightCyan: Color = Color::Chromatic(Hue::Cyan, Lightness::Light);
    pub const LightBlue: Color = Color::Chromatic(Hue::Blue, Lightness::Light);
    pub const LightMagenta: Color = Color::Chromatic(Hue::Magenta, Lightness::Light);

    pub const Red: Color = Color::Chromatic(Hue::Red, Lightness::Normal);
    pub const Yellow: Color = Color::Chromatic(Hue::Yellow, Lightness::Normal);
    pub const Green: Color = Color::Chromatic(Hue::Green, Lightness::Normal);
    pub const Cyan: Color = Color::Chromatic(Hue::Cyan, Lightness::Normal);
    pub const Blue: Color = Color::Chromatic(Hue::Blue, Lightness::Normal);
    pub const Magenta: Color = Color::Chromatic(Hue::Magenta, Lightness::Normal);

    pub const DarkRed: Color = Color::Chromatic(Hue::Red, Lightness::Dark);
    pub const DarkYellow: Color = Color::Chromatic(Hue::Yellow, Lightness::Dark);
    pub const DarkGreen: Color = Color::Chromatic(Hue::Green, Lightness::Dark);
    pub const DarkCyan: Color = Color::Chromatic(Hue::Cyan, Lightness::Dark);
    pub const DarkBlue: Color = Color::Chromatic(Hue::Blue, Lightness::Dark);
    pub const DarkMagenta: Color = Color::Chromatic(Hue::Magenta, Lightness::Dark);
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match *self {
                Color::LightRed => "LightRed",
                Color::LightYellow => "LightYellow",
                Color::LightGreen => "LightGreen",
                Color::LightCyan => "LightCyan",
                Color::LightBlue => "LightBlue",
                Color::LightMagenta => "LightMagenta",
                Color::Red => "Red",
                Color::Yellow => "Yellow",
                Color::Green => "Green",
                Color::Cyan => "Cyan",
                Color::Blue => "Blue",
                Color::Magenta => "Magenta",
                Color::DarkRed => "DarkRed",
                Color::DarkYellow => "DarkYellow",
                Color::DarkGreen => "DarkGreen",
                Color::DarkCyan => "DarkCyan",
                Color::DarkBlue => "DarkBlue",
                Color::DarkMagenta => "DarkMagenta",
                Color::Black => "Black",
                Color::White => "White",
            }
        )
    }
}

impl Color {
    /// Decomposes a chromatic color into its `(hue, lightness)` pair.
    /// Returns `None` for `White`/`Black`, matching §4.1's "defined only
    /// for chromatic colors".
    pub fn decompose(self) -> Option<(Hue, Lightness)> {
        match self {
            Color::Chromatic(h, l) => Some((h, l)),
            _ => None,
        }
    }
}

/// One of the 20 canonical Piet palette RGB triples, or `None` if `rgb`
/// doesn't match any of them.
pub fn classify(rgb: (u8, u8, u8)) -> Option<Color> {
    Some(match rgb {
        (0xFF, 0xFF, 0xFF) => Color::White,
        (0x00, 0x00, 0x00) => Color::Black,
        (0xFF, 0xC0, 0xC0) => Color::LightRed,
        (0xFF, 0x00, 0x00) => Color::Red,
        (0xC0, 0x00, 0x00) => Color::DarkRed,
        (0xFF, 0xFF, 0xC0) => Color::LightYellow,
        (0xFF, 0xFF, 0x00) => Color::Yellow,
        (0xC0, 0xC0, 0x00) => Color::DarkYellow,
        (0xC0, 0xFF, 0xC0) => Color::LightGreen,
        (0x00, 0xFF, 0x00) => Color::Green,
        (0x00, 0xC0, 0x00) => Color::DarkGreen,
        (0xC0, 0xFF, 0xFF) => Color::LightCyan,
        (0x00, 0xFF, 0xFF) => Color::Cyan,
        (0x00, 0xC0, 0xC0) => Color::DarkCyan,
        (0xC0, 0xC0, 0xFF) => Color::LightBlue,
        (0x00, 0x00, 0xFF) => Color::Blue,
        (0x00, 0x00, 0xC0) => Color::DarkBlue,
        (0xFF, 0xC0, 0xFF) => Color::LightMagenta,
        (0xFF, 0x00, 0xFF) => Color::Magenta,
        (0xC0, 0x00, 0xC0) => Color::DarkMagenta,
        _ => return None,
    })
}

/// Policy applied by the loader when a pixel doesn't match the canonical
/// palette (§4.1, §7 `UnknownColor`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnknownColorPolicy {
    Strict,
    TreatAsWhite,
    TreatAsBlack,
}

impl Color {
    /// Converts an RGB triple into a clean `Color` per the policy. `Ok(None)`
    /// is never returned; `Err` only under `Strict`.
    pub fn classify_with_policy(
        rgb: (u8, u8, u8),
        policy: UnknownColorPolicy,
    ) -> Result<Color, (u8, u8, u8)> {
        match classify(rgb) {
            Some(c) => Ok(c),
            None => match policy {
                UnknownColorPolicy::Strict => Err(rgb),
                UnknownColorPolicy::TreatAsWhite => Ok(Color::White),
                UnknownColorPolicy::TreatAsBlack => Ok(Color::Black),
            },
        }
    }
}

/// The 17 Piet commands, plus `Nop` for the color's own identity transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive)]
pub enum Command {
    Nop = 0,
    Push = 1,
    Pop = 2,
    Add = 3,
    Subtract = 4,
    Multiply = 5,
    Divide = 6,
    Mod = 7,
    Not = 8,
    Greater = 9,
    Pointer = 10,
    Switch = 11,
    Duplicate = 12,
    Roll = 13,
    InNum = 14,
    InChar = 15,
    OutNum = 16,
    OutChar = 17,
}

/// Maps a hue/lightness transition to the command it encodes (§4.1).
/// Returns `None` if either endpoint is non-chromatic.
pub fn transition(from: Color, to: Color) -> Option<Command> {
    let (hue, lightness) = from.decompose()?;
    let (next_hue, next_lightness) = to.decompose()?;
    let hue_step = (next_hue as i32 - hue as i32).rem_euclid(6);
    let light_step = (next_lightness as i32 - lightness as i32).rem_euclid(3);
    Command::from_i32(light_step + hue_step * 3)
}
