//! The external image-loading collaborator (§6). Its only contract is to
//! deliver a rectangular RGB raster to [`crate::piet::grid::reduce`]; PNG
//! decoding itself is handled entirely by the `image` crate.

use crate::piet::color::UnknownColorPolicy;
use crate::piet::error::PietError;
use crate::piet::grid::{reduce, Grid};
use image::{DynamicImage, GenericImageView};
use log::info;

/// Loads a Piet program from an image file.
///
/// 16-bit samples are down-sampled to 8-bit and alpha is discarded before
/// classification, per §6.
pub fn load(path: &str, codel_size: Option<u32>, policy: UnknownColorPolicy) -> Result<Grid, PietError> {
    let img = image::open(path).map_err(|_| PietError::InvalidImage)?;
    info!("loaded image {path} ({}x{})", img.width(), img.height());
    load_from_image(img, codel_size, policy)
}

fn load_from_image(
    img: DynamicImage,
    codel_size: Option<u32>,
    policy: UnknownColorPolicy,
) -> Result<Grid, PietError> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(PietError::InvalidImage);
    }
    // `into_rgb8` downsamples 16-bit channels to 8-bit and drops alpha,
    // matching §6's down-sampling/alpha-discard rule regardless of the
    // source format.
    let rgb = img.into_rgb8();
    let pixels: Vec<(u8, u8, u8)> = rgb.pixels().map(|p| (p[0], p[1], p[2])).collect();
    reduce(width as usize, height as usize, &pixels, codel_size, policy)
}
