//! The codel grid and codel-size reduction (§4.2).

use crate::piet::color::{Color, UnknownColorPolicy};
use crate::piet::error::PietError;
use itertools::iproduct;
use log::debug;

/// A rectangular buffer of codels. Coordinates are `(x, y)`, origin
/// top-left, X increasing right, Y increasing down.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    codels: Vec<Color>,
}

impl Grid {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Looks up the color at `(x, y)`. Any out-of-bounds coordinate reads as
    /// `Black` — the "wall" behavior that keeps the navigator simple (§4.2).
    pub fn at(&self, x: i64, y: i64) -> Color {
        if x < 0 || y < 0 {
            return Color::Black;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return Color::Black;
        }
        self.codels[y * self.width + x]
    }

    pub fn codels(&self) -> impl Iterator<Item = ((usize, usize), Color)> + '_ {
        let width = self.width;
        self.codels
            .iter()
            .enumerate()
            .map(move |(i, &c)| ((i % width, i / width), c))
    }

    /// Builds a grid directly from an already-classified raster, skipping
    /// codel-size reduction. Used by tests and by any embedder that has
    /// already reduced the image to one `Color` per codel.
    pub fn from_codels(width: usize, height: usize, codels: Vec<Color>) -> Result<Self, PietError> {
        if width == 0 || height == 0 || codels.len() != width * height {
            return Err(PietError::InvalidImage);
        }
        Ok(Grid { width, height, codels })
    }
}

/// Reduces a raw `width × height` RGB raster (one entry per raw pixel, row
/// major) to a `Grid` of codels, applying `codel_size` (or inferring it, see
/// [`infer_codel_size`]) and `policy` for non-palette pixels (§4.2, §6).
pub fn reduce(
    raw_width: usize,
    raw_height: usize,
    pixels: &[(u8, u8, u8)],
    codel_size: Option<u32>,
    policy: UnknownColorPolicy,
) -> Result<Grid, PietError> {
    if raw_width == 0 || raw_height == 0 || pixels.len() != raw_width * raw_height {
        return Err(PietError::InvalidImage);
    }

    let codel_size = match codel_size {
        Some(k) => k,
        None => infer_codel_size(raw_width, raw_height, pixels),
    };
    if codel_size == 0
        || raw_width % codel_size as usize != 0
        || raw_height % codel_size as usize != 0
    {
        return Err(PietError::InvalidCodelSize);
    }

    let width = raw_width / codel_size as usize;
    let height = raw_height / codel_size as usize;
    debug!(
        "reducing {raw_width}x{raw_height} raster at codel size {codel_size} -> {width}x{height} grid"
    );

    let codels: Result<Vec<Color>, PietError> = iproduct!(0..height, 0..width)
        .map(|(gy, gx)| {
            let px = gx * codel_size as usize;
            let py = gy * codel_size as usize;
            let rgb = pixels[py * raw_width + px];
            Color::classify_with_policy(rgb, policy).map_err(PietError::UnknownColor)
        })
        .collect();

    Ok(Grid { width, height, codels: codels? })
}

/// Infers the codel size as the minimum run length of identically-colored
/// pixels across every row and every column, treating row/column ends as
/// run boundaries (§4.2).
pub fn infer_codel_size(width: usize, height: usize, pixels: &[(u8, u8, u8)]) -> u32 {
    let mut min_run = u32::MAX;

    for y in 0..height {
        let mut run = 1u32;
        for x in 1..width {
            if pixels[y * width + x] == pixels[y * width + x - 1] {
                run += 1;
            } else {
                min_run = min_run.min(run);
                run = 1;
            }
        }
        min_run = min_run.min(run);
    }

    for x in 0..width {
        let mut run = 1u32;
        for y in 1..height {
            if pixels[y * width + x] == pixels[(y - 1) * width + x] {
                run += 1;
            } else {
                min_run = min_run.min(run);
                run = 1;
            }
        }
        min_run = min_run.min(run);
    }

    if min_run == u32::MAX { 1 } else { min_run.max(1) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, color: (u8, u8, u8)) -> Vec<(u8, u8, u8)> {
        vec![color; width * height]
    }

    #[test]
    fn infers_codel_size_two_from_upscaled_checkerboard() {
        // A 4x4 raster made of 2x2 blocks of red/white in a checkerboard.
        let red = (0xFF, 0x00, 0x00);
        let white = (0xFF, 0xFF, 0xFF);
        let mut pixels = vec![white; 16];
        for (gy, gx) in iproduct!(0..2, 0..2) {
            let color = if (gx + gy) % 2 == 0 { red } else { white };
            for (dy, dx) in iproduct!(0..2, 0..2) {
                let x = gx * 2 + dx;
                let y = gy * 2 + dy;
                pixels[y * 4 + x] = color;
            }
        }
        assert_eq!(infer_codel_size(4, 4, &pixels), 2);
    }

    #[test]
    fn uniform_image_infers_codel_size_as_image_extent() {
        // a uniform image has no color boundaries at all; the whole image
        // is one run per row/column, so the minimum run is the image extent.
        let pixels = solid(3, 3, (0, 0, 0));
        assert_eq!(infer_codel_size(3, 3, &pixels), 3);
    }

    #[test]
    fn non_divisor_codel_size_is_invalid() {
        let pixels = solid(5, 4, (0, 0, 0));
        let err = reduce(5, 4, &pixels, Some(3), UnknownColorPolicy::Strict).unwrap_err();
        assert!(matches!(err, PietError::InvalidCodelSize));
    }

    #[test]
    fn strict_policy_surfaces_unknown_color() {
        let pixels = vec![(1, 2, 3)];
        let err = reduce(1, 1, &pixels, Some(1), UnknownColorPolicy::Strict).unwrap_err();
        assert!(matches!(err, PietError::UnknownColor(_)));
    }

    #[test]
    fn out_of_bounds_lookup_is_black() {
        let grid = Grid::from_codels(1, 1, vec![Color::Red]).unwrap();
        assert_eq!(grid.at(-1, 0), Color::Black);
        assert_eq!(grid.at(5, 5), Color::Black);
        assert_eq!(grid.at(0, 0), Color::Red);
    }
}
