// THEORY:
// The `layer_producer` module builds the image pyramid one level at a time. A
// `Pyramid` is an iterator that starts with the untouched source image and keeps
// shrinking it by a constant factor until the next level would fall under the
// configured minimum size.
//
// Key architectural principles:
// 1.  **Laziness**: Nothing is resized until the caller pulls the next level. A caller
//     that stops early (for example after a confident detection) never pays for the
//     remaining levels, and dropping the iterator releases the current level.
// 2.  **Replace, Never Mutate**: The current level is held as an `Arc`. Advancing the
//     pyramid builds a brand new image and swaps the handle; layers already handed
//     out stay valid and unchanged for as long as the caller keeps them.
// 3.  **Fail Fast, Fail Once**: Parameters are checked by the constructor. A resize
//     failure mid-pyramid is reported as the last element and the iterator is fused
//     afterwards, so everything yielded before it remains usable.
// 4.  **Coordinate Bookkeeping**: Each `Layer` remembers the source dimensions, so a
//     window found on a small level can be mapped back onto the original image.

use crate::core_modules::error::ScanError;
use crate::core_modules::geometry::geometry::{Rect, Size};
use crate::core_modules::resize::Resize;
use image::GenericImageView;
use log::{debug, warn};
use std::sync::Arc;

/// One level of a pyramid.
#[derive(Debug)]
pub struct Layer<I> {
    level: usize,
    image: Arc<I>,
    size: Size,
    source_size: Size,
}

impl<I> Clone for Layer<I> {
    fn clone(&self) -> Self {
        Self {
            level: self.level,
            image: Arc::clone(&self.image),
            size: self.size,
            source_size: self.source_size,
        }
    }
}

impl<I> Layer<I> {
    /// 0 for the source image, increasing by one per downscale.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn image(&self) -> &I {
        &self.image
    }

    /// Shared handle to the level's pixels.
    pub fn shared(&self) -> Arc<I> {
        Arc::clone(&self.image)
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Dimensions of level 0.
    pub fn source_size(&self) -> Size {
        self.source_size
    }

    /// Maps a rectangle in this level's coordinates onto the source image.
    pub fn to_source(&self, rect: Rect) -> Rect {
        rect.scale_to(self.size, self.source_size)
    }
}

fn validate(scale: f64, min_size: Size) -> Result<(), ScanError> {
    if !(scale > 0.0 && scale < 1.0) {
        return Err(ScanError::invalid(
            "scale",
            format!("must lie strictly between 0 and 1, got {scale}"),
        ));
    }
    min_size.ensure_positive("min_size")
}

/// Lazily produced image pyramid.
pub struct Pyramid<I, R> {
    current: Option<Arc<I>>,
    current_size: Size,
    source_size: Size,
    next_level: usize,
    scale: f64,
    min_size: Size,
    resizer: R,
}

impl<I, R> Pyramid<I, R>
where
    I: GenericImageView,
    R: Resize<I>,
{
    pub fn new(
        image: I,
        scale: f64,
        min_size: impl Into<Size>,
        resizer: R,
    ) -> Result<Self, ScanError> {
        Self::from_shared(Arc::new(image), scale, min_size, resizer)
    }

    /// Same as [`Pyramid::new`] for an image the caller already shares.
    pub fn from_shared(
        image: Arc<I>,
        scale: f64,
        min_size: impl Into<Size>,
        resizer: R,
    ) -> Result<Self, ScanError> {
        let min_size = min_size.into();
        validate(scale, min_size)?;

        let source_size = Size::of(&*image);
        source_size.ensure_positive("image")?;

        debug!(
            "pyramid over {source_size}: scale {scale}, min size {min_size}, {} planned levels",
            levels_below(source_size, scale, min_size) + 1
        );

        Ok(Self {
            current: Some(image),
            current_size: source_size,
            source_size,
            next_level: 0,
            scale,
            min_size,
            resizer,
        })
    }

    /// Drives the pyramid as a `futures::Stream` for async consumers.
    ///
    /// Levels are still built one at a time on the polling task.
    pub fn into_stream(self) -> impl futures::Stream<Item = Result<Layer<I>, ScanError>> {
        futures::stream::iter(self)
    }

    fn finish(&mut self) {
        self.current = None;
    }
}

/// Dimensions every pyramid level would have, computed without resizing anything.
pub fn planned_sizes(
    source_size: Size,
    scale: f64,
    min_size: impl Into<Size>,
) -> Result<Vec<Size>, ScanError> {
    let min_size = min_size.into();
    validate(scale, min_size)?;
    source_size.ensure_positive("image")?;
    Ok(planned(source_size, scale, min_size))
}

/// How many levels a pyramid would still build beneath a level of `size`.
fn levels_below(mut size: Size, scale: f64, min_size: Size) -> usize {
    let mut count = 0;
    loop {
        size = size.scaled(scale);
        if size.is_empty() || !min_size.fits_within(size) {
            return count;
        }
        count += 1;
    }
}

fn planned(source_size: Size, scale: f64, min_size: Size) -> Vec<Size> {
    let mut sizes = vec![source_size];
    let mut size = source_size;
    loop {
        size = size.scaled(scale);
        if size.is_empty() || !min_size.fits_within(size) {
            return sizes;
        }
        sizes.push(size);
    }
}

impl<I, R> Iterator for Pyramid<I, R>
where
    I: GenericImageView,
    R: Resize<I>,
{
    type Item = Result<Layer<I>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = Arc::clone(self.current.as_ref()?);

        if self.next_level == 0 {
            self.next_level = 1;
            return Some(Ok(Layer {
                level: 0,
                image: current,
                size: self.source_size,
                source_size: self.source_size,
            }));
        }

        let level = self.next_level;
        let target = self.current_size.scaled(self.scale);
        if target.is_empty() || !self.min_size.fits_within(target) {
            debug!(
                "pyramid stops after {level} levels: next size {target} is under {}",
                self.min_size
            );
            self.finish();
            return None;
        }

        let resized = match self.resizer.resize(&*current, target.width, target.height) {
            Ok(resized) => resized,
            Err(source) => {
                warn!("resize to {target} failed at level {level}: {source}");
                self.finish();
                return Some(Err(ScanError::ResizeFailure {
                    level,
                    width: target.width,
                    height: target.height,
                    source,
                }));
            }
        };

        let actual = Size::of(&resized);
        if actual != target {
            warn!("resizer returned {actual} at level {level}, expected {target}");
            self.finish();
            return Some(Err(ScanError::ResizeFailure {
                level,
                width: target.width,
                height: target.height,
                source: format!("resizer returned {actual}, expected {target}").into(),
            }));
        }

        let image = Arc::new(resized);
        self.current = Some(Arc::clone(&image));
        self.current_size = target;
        self.next_level += 1;
        debug!("pyramid level {level}: {target}");

        Some(Ok(Layer {
            level,
            image,
            size: target,
            source_size: self.source_size,
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.current.is_none() {
            return (0, Some(0));
        }
        let below = levels_below(self.current_size, self.scale, self.min_size);
        // The current level itself is only still pending before level 0.
        let remaining = if self.next_level == 0 { below + 1 } else { below };
        (remaining.min(1), Some(remaining))
    }
}

impl<I, R> std::iter::FusedIterator for Pyramid<I, R>
where
    I: GenericImageView,
    R: Resize<I>,
{
}
