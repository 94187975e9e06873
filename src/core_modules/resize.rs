// THEORY:
// Resizing is a collaborator, not part of the scanner. The pyramid only needs
// "give me this image at exactly w x h", so that capability is injected as the
// `Resize` trait. Any closure with the right shape qualifies, which lets tests hand
// in fakes that return synthetic buffers, and `FilterResizer` covers the common case
// of delegating to the `image` crate's resamplers.

use crate::core_modules::error::ResizeError;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Pixel};

/// Produces a new image resampled to exactly `width x height`.
///
/// Implementations must return an error for a zero target dimension rather than
/// clamping it.
pub trait Resize<I> {
    fn resize(&self, image: &I, width: u32, height: u32) -> Result<I, ResizeError>;
}

impl<I, F> Resize<I> for F
where
    F: Fn(&I, u32, u32) -> Result<I, ResizeError>,
{
    fn resize(&self, image: &I, width: u32, height: u32) -> Result<I, ResizeError> {
        self(image, width, height)
    }
}

/// `Resize` backed by `image::imageops` with a fixed sampling filter.
#[derive(Debug, Clone, Copy)]
pub struct FilterResizer {
    pub filter: FilterType,
}

impl FilterResizer {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl Default for FilterResizer {
    /// Bilinear, the usual choice for detection pyramids.
    fn default() -> Self {
        Self {
            filter: FilterType::Triangle,
        }
    }
}

fn ensure_target(width: u32, height: u32) -> Result<(), ResizeError> {
    if width == 0 || height == 0 {
        return Err(format!("cannot resize to an empty {width}x{height} target").into());
    }
    Ok(())
}

impl Resize<DynamicImage> for FilterResizer {
    fn resize(
        &self,
        image: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, ResizeError> {
        ensure_target(width, height)?;
        Ok(image.resize_exact(width, height, self.filter))
    }
}

impl<P> Resize<ImageBuffer<P, Vec<P::Subpixel>>> for FilterResizer
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    fn resize(
        &self,
        image: &ImageBuffer<P, Vec<P::Subpixel>>,
        width: u32,
        height: u32,
    ) -> Result<ImageBuffer<P, Vec<P::Subpixel>>, ResizeError> {
        ensure_target(width, height)?;
        Ok(imageops::resize(image, width, height, self.filter))
    }
}
