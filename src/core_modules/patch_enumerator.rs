// THEORY:
// The `patch_enumerator` module slides a fixed-size window across a single pyramid
// layer and hands out every position it stops at, together with a read-only view of
// the pixels underneath. It is the spatial counterpart of the pyramid: the pyramid
// varies scale, the enumerator varies position.
//
// Key architectural principles:
// 1.  **Positions Before Pixels**: `Positions` walks the window grid using nothing but
//     dimensions. `Patches` layers pixel views on top of it. Callers that only need
//     rectangles (planning, catalogues, tests) never touch an image.
// 2.  **Borrow, Don't Copy**: A `Patch` holds an `image::SubImage` borrowed from the
//     layer. The borrow checker guarantees the layer outlives every patch taken from
//     it, so no patch can observe a replaced or freed layer.
// 3.  **Row-Major Order**: All x offsets of one row, then the next row. Downstream
//     consumers rely on this ordering for reproducible output.
// 4.  **No Clipping, No Padding**: Windows that would cross the layer border are
//     dropped. A window larger than the layer simply yields nothing.

use crate::core_modules::error::ScanError;
use crate::core_modules::geometry::geometry::{Rect, Size, Step};
use image::{GenericImageView, ImageBuffer, Pixel, SubImage, imageops};
use log::trace;
use serde::{Deserialize, Serialize};

/// Which start offsets count along an axis.
///
/// With `Exclusive`, offsets run `0, step, 2*step, ...` strictly below
/// `layer - window`, so the window that would sit flush against the far border is
/// skipped. A layer that matches the window along only one axis therefore yields
/// nothing; a window exactly the size of the layer yields the single origin patch.
/// `Inclusive` keeps every offset up to and including `layer - window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMode {
    #[default]
    Exclusive,
    Inclusive,
}

impl EdgeMode {
    /// Number of window starts along one axis.
    fn starts(self, extent: u32, window: u32, step: u32) -> u32 {
        if window > extent {
            return 0;
        }
        let span = extent - window;
        match self {
            EdgeMode::Exclusive => span.div_ceil(step),
            EdgeMode::Inclusive => span / step + 1,
        }
    }
}

/// Window rectangles of one layer, in row-major order.
#[derive(Debug, Clone)]
pub struct Positions {
    step: Step,
    window: Size,
    rows: u32,
    cols: u32,
    next: u64,
    total: u64,
}

impl Positions {
    pub fn new(
        layer_size: Size,
        step: impl Into<Step>,
        window: impl Into<Size>,
        mode: EdgeMode,
    ) -> Result<Self, ScanError> {
        let step = step.into();
        let window = window.into();
        step.ensure_positive("step_size")?;
        window.ensure_positive("window_size")?;

        let (rows, cols) = if window == layer_size {
            (1, 1)
        } else {
            (
                mode.starts(layer_size.height, window.height, step.y),
                mode.starts(layer_size.width, window.width, step.x),
            )
        };
        trace!("{rows}x{cols} windows of {window} over {layer_size}, step ({}, {})", step.y, step.x);

        Ok(Self {
            step,
            window,
            rows,
            cols,
            next: 0,
            total: rows as u64 * cols as u64,
        })
    }

    /// Distinct y offsets.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Distinct x offsets.
    pub fn cols(&self) -> u32 {
        self.cols
    }
}

impl Iterator for Positions {
    type Item = Rect;

    fn next(&mut self) -> Option<Rect> {
        if self.next >= self.total {
            return None;
        }
        let row = (self.next / self.cols as u64) as u32;
        let col = (self.next % self.cols as u64) as u32;
        self.next += 1;
        Some(Rect::new(
            col * self.step.x,
            row * self.step.y,
            self.window.width,
            self.window.height,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.total - self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Positions {}
impl std::iter::FusedIterator for Positions {}

/// One window position with a borrowed view of its pixels.
pub struct Patch<'a, I> {
    /// Left edge in layer coordinates.
    pub x: u32,
    /// Top edge in layer coordinates.
    pub y: u32,
    pub view: SubImage<&'a I>,
}

impl<'a, I> Patch<'a, I>
where
    I: GenericImageView,
{
    pub fn bounds(&self) -> Rect {
        let (width, height) = self.view.dimensions();
        Rect::new(self.x, self.y, width, height)
    }

    /// Copies the view into an owned buffer.
    pub fn to_image(&self) -> ImageBuffer<I::Pixel, Vec<<I::Pixel as Pixel>::Subpixel>>
    where
        I: 'static,
    {
        self.view.to_image()
    }

    pub fn into_parts(self) -> (u32, u32, SubImage<&'a I>) {
        (self.x, self.y, self.view)
    }
}

/// Sliding-window patches over one layer.
pub struct Patches<'a, I> {
    layer: &'a I,
    positions: Positions,
}

impl<'a, I> Patches<'a, I>
where
    I: GenericImageView,
{
    /// Enumerates with [`EdgeMode::Exclusive`].
    pub fn new(
        layer: &'a I,
        step: impl Into<Step>,
        window: impl Into<Size>,
    ) -> Result<Self, ScanError> {
        Self::with_mode(layer, step, window, EdgeMode::default())
    }

    pub fn with_mode(
        layer: &'a I,
        step: impl Into<Step>,
        window: impl Into<Size>,
        mode: EdgeMode,
    ) -> Result<Self, ScanError> {
        let (width, height) = layer.dimensions();
        let positions = Positions::new(Size::new(height, width), step, window, mode)?;
        Ok(Self { layer, positions })
    }

    pub fn positions(&self) -> &Positions {
        &self.positions
    }
}

impl<'a, I> Iterator for Patches<'a, I>
where
    I: GenericImageView,
{
    type Item = Patch<'a, I>;

    fn next(&mut self) -> Option<Self::Item> {
        let rect = self.positions.next()?;
        Some(Patch {
            x: rect.x,
            y: rect.y,
            view: imageops::crop_imm(self.layer, rect.x, rect.y, rect.width, rect.height),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.positions.size_hint()
    }
}

impl<I> ExactSizeIterator for Patches<'_, I> where I: GenericImageView {}
impl<I> std::iter::FusedIterator for Patches<'_, I> where I: GenericImageView {}
