// THEORY:
// The `geometry` module holds the small value types shared by the pyramid and the
// sliding window: sizes, strides and rectangles. They are "dumb" data containers in
// the same spirit as `Pixel`; the iterators own all of the behavior.
//
// Key architectural principles:
// 1.  **One Axis Convention**: Every size-like pair in this crate is `(height, width)`
//     and every stride is `(step_y, step_x)`. Tuple conversions read in that order,
//     so `Size::from((480, 640))` is a 640 pixel wide, 480 pixel tall region.
// 2.  **Layer Space vs Source Space**: A `Rect` is just a rectangle. Whether it lives
//     in a pyramid layer or in the original image depends on who produced it; the
//     `scale_to` helper maps between the two.

pub mod geometry {
    use crate::core_modules::error::ScanError;
    use serde::{Deserialize, Serialize};

    /// A `(height, width)` pair in pixels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Size {
        pub height: u32,
        pub width: u32,
    }

    impl Size {
        pub const fn new(height: u32, width: u32) -> Self {
            Self { height, width }
        }

        /// Dimensions of any `image` view, reordered into `(height, width)`.
        pub fn of<I: image::GenericImageView>(image: &I) -> Self {
            let (width, height) = image.dimensions();
            Self { height, width }
        }

        pub fn is_empty(&self) -> bool {
            self.height == 0 || self.width == 0
        }

        /// True when a window of this size fits inside `outer` without clipping.
        pub fn fits_within(&self, outer: Size) -> bool {
            self.height <= outer.height && self.width <= outer.width
        }

        /// `floor(dim * scale)` on both axes.
        pub fn scaled(&self, scale: f64) -> Size {
            Size {
                height: (self.height as f64 * scale).floor() as u32,
                width: (self.width as f64 * scale).floor() as u32,
            }
        }

        pub(crate) fn ensure_positive(&self, name: &'static str) -> Result<(), ScanError> {
            if self.is_empty() {
                return Err(ScanError::invalid(
                    name,
                    format!("height and width must be positive, got {self}"),
                ));
            }
            Ok(())
        }
    }

    impl From<(u32, u32)> for Size {
        fn from((height, width): (u32, u32)) -> Self {
            Self { height, width }
        }
    }

    impl std::fmt::Display for Size {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}x{} (h x w)", self.height, self.width)
        }
    }

    /// Sliding-window stride, `(step_y, step_x)`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Step {
        pub y: u32,
        pub x: u32,
    }

    impl Step {
        pub const fn new(y: u32, x: u32) -> Self {
            Self { y, x }
        }

        pub(crate) fn ensure_positive(&self, name: &'static str) -> Result<(), ScanError> {
            if self.y == 0 || self.x == 0 {
                return Err(ScanError::invalid(
                    name,
                    format!("step_y and step_x must be positive, got ({}, {})", self.y, self.x),
                ));
            }
            Ok(())
        }
    }

    impl From<(u32, u32)> for Step {
        fn from((y, x): (u32, u32)) -> Self {
            Self { y, x }
        }
    }

    /// An axis-aligned rectangle anchored at its top-left pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Rect {
        pub x: u32,
        pub y: u32,
        pub width: u32,
        pub height: u32,
    }

    impl Rect {
        pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
            Self { x, y, width, height }
        }

        /// Exclusive right edge.
        pub fn right(&self) -> u32 {
            self.x + self.width
        }

        /// Exclusive bottom edge.
        pub fn bottom(&self) -> u32 {
            self.y + self.height
        }

        /// Maps a rectangle expressed in a `from`-sized image into a `to`-sized image.
        ///
        /// Edges are rounded outward so the mapped region always covers the pixels the
        /// original rectangle touched, then clamped to `to`.
        pub fn scale_to(&self, from: Size, to: Size) -> Rect {
            if from == to || from.is_empty() {
                return *self;
            }
            let sx = to.width as f64 / from.width as f64;
            let sy = to.height as f64 / from.height as f64;

            let x0 = ((self.x as f64 * sx).floor() as u32).min(to.width);
            let y0 = ((self.y as f64 * sy).floor() as u32).min(to.height);
            let x1 = ((self.right() as f64 * sx).ceil() as u32).min(to.width);
            let y1 = ((self.bottom() as f64 * sy).ceil() as u32).min(to.height);

            Rect::new(x0, y0, x1 - x0, y1 - y0)
        }
    }
}
