// THEORY:
// This file is the main entry point for the `image_scanner` library crate.
// It exposes the two lazy producers a multi-scale detector needs, the image
// pyramid (`Pyramid`) and the sliding window (`Patches`), plus the `ImageScanner`
// facade that builds both from one validated `ScannerConfig`.
//
// Resizing is injected through the `Resize` trait, so the scanning logic never
// depends on a particular resampler. `FilterResizer` is the ready-made one backed
// by the `image` crate.

pub mod core_modules;
pub mod scanner;

pub use crate::core_modules::error::{ResizeError, ScanError};
pub use crate::core_modules::geometry::geometry::{Rect, Size, Step};
pub use crate::core_modules::layer_producer::{Layer, Pyramid, planned_sizes};
pub use crate::core_modules::patch_enumerator::{EdgeMode, Patch, Patches, Positions};
pub use crate::core_modules::resize::{FilterResizer, Resize};
pub use crate::scanner::{ImageScanner, ScanWindow, ScannerConfig};
