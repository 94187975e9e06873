// THEORY:
// The `scanner` module is the top-level API of the crate. It bundles the four knobs of
// a multi-scale sliding-window scan (scale, minimum size, step, window) into one
// validated configuration and hands out the two lazy producers built from it. It
// deliberately does not wire them together: the caller decides how to walk levels and
// patches, and whether to stop early.

use crate::core_modules::error::ScanError;
use crate::core_modules::geometry::geometry::{Rect, Size, Step};
use crate::core_modules::layer_producer::{Layer, Pyramid, planned_sizes};
use crate::core_modules::patch_enumerator::{EdgeMode, Patches, Positions};
use crate::core_modules::resize::Resize;
use anyhow::Context;
use image::GenericImageView;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable parameters of a scan.
///
/// All pairs are `(height, width)`; the step is `(step_y, step_x)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Downscale factor between consecutive pyramid levels, in (0, 1).
    pub scale: f64,
    /// Levels smaller than this on either axis are not produced.
    pub min_size: Size,
    pub step: Step,
    pub window: Size,
    pub edge_mode: EdgeMode,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            scale: 0.7,
            min_size: Size::new(30, 30),
            step: Step::new(10, 10),
            window: Size::new(30, 30),
            edge_mode: EdgeMode::Exclusive,
        }
    }
}

impl ScannerConfig {
    pub fn validate(&self) -> Result<(), ScanError> {
        if !(self.scale > 0.0 && self.scale < 1.0) {
            return Err(ScanError::invalid(
                "scale",
                format!("must lie strictly between 0 and 1, got {}", self.scale),
            ));
        }
        self.min_size.ensure_positive("min_size")?;
        self.step.ensure_positive("step_size")?;
        self.window.ensure_positive("window_size")?;
        Ok(())
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("failed to parse scanner config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file; missing fields fall back to the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scanner config {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("invalid scanner config {}", path.display()))
    }
}

/// A window found during a full scan, located both in its level and in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWindow {
    pub level: usize,
    /// Rectangle in the level's own coordinates.
    pub layer_rect: Rect,
    /// The same region mapped back onto the source image.
    pub source_rect: Rect,
}

/// Hands out pyramids and sliding windows for one validated configuration.
#[derive(Debug, Clone)]
pub struct ImageScanner {
    config: ScannerConfig,
}

impl ImageScanner {
    pub fn new(config: ScannerConfig) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn layers<I, R>(&self, image: I, resizer: R) -> Result<Pyramid<I, R>, ScanError>
    where
        I: GenericImageView,
        R: Resize<I>,
    {
        Pyramid::new(image, self.config.scale, self.config.min_size, resizer)
    }

    pub fn patches<'a, I>(&self, layer: &'a Layer<I>) -> Result<Patches<'a, I>, ScanError>
    where
        I: GenericImageView,
    {
        Patches::with_mode(
            layer.image(),
            self.config.step,
            self.config.window,
            self.config.edge_mode,
        )
    }

    /// Every window of every level of a scan over an `image_size` image, located in
    /// its level and in the source. Computed from dimensions alone; nothing is resized.
    pub fn windows(&self, image_size: Size) -> Result<Vec<ScanWindow>, ScanError> {
        let mut out = Vec::new();
        for (level, size) in planned_sizes(image_size, self.config.scale, self.config.min_size)?
            .into_iter()
            .enumerate()
        {
            let positions = self.positions(size)?;
            out.reserve(positions.len());
            out.extend(positions.map(|rect| ScanWindow {
                level,
                layer_rect: rect,
                source_rect: rect.scale_to(size, image_size),
            }));
        }
        info!("scan of {image_size} has {} windows", out.len());
        Ok(out)
    }

    /// Number of patches a full scan of `image_size` yields, computed from
    /// dimensions alone.
    pub fn count_patches(&self, image_size: Size) -> Result<usize, ScanError> {
        let mut total = 0;
        for (level, size) in planned_sizes(image_size, self.config.scale, self.config.min_size)?
            .into_iter()
            .enumerate()
        {
            let count = self.positions(size)?.len();
            debug!("level {level} ({size}): {count} patches");
            total += count;
        }
        Ok(total)
    }

    fn positions(&self, layer_size: Size) -> Result<Positions, ScanError> {
        Positions::new(
            layer_size,
            self.config.step,
            self.config.window,
            self.config.edge_mode,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::error::ResizeError;
    use image::GrayImage;
    use std::io::Write;

    fn fake_resize(_: &GrayImage, w: u32, h: u32) -> Result<GrayImage, ResizeError> {
        Ok(GrayImage::new(w, h))
    }

    fn reference_config() -> ScannerConfig {
        ScannerConfig {
            scale: 0.5,
            min_size: Size::new(20, 20),
            step: Step::new(10, 10),
            window: Size::new(25, 25),
            edge_mode: EdgeMode::Exclusive,
        }
    }

    #[test]
    fn defaults_are_valid() {
        let config = ScannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scale, 0.7);
        assert_eq!(config.window, Size::new(30, 30));
    }

    #[test]
    fn new_rejects_invalid_configs() {
        let bad = [
            ScannerConfig { scale: 1.0, ..Default::default() },
            ScannerConfig { scale: 0.0, ..Default::default() },
            ScannerConfig { min_size: Size::new(0, 5), ..Default::default() },
            ScannerConfig { step: Step::new(0, 5), ..Default::default() },
            ScannerConfig { window: Size::new(5, 0), ..Default::default() },
        ];
        for config in bad {
            let err = ImageScanner::new(config).err().expect("must reject");
            assert!(err.is_invalid_parameter(), "{config:?}");
        }
    }

    #[test]
    fn count_matches_the_reference_regression_value() {
        let scanner = ImageScanner::new(reference_config()).expect("scanner");
        assert_eq!(scanner.count_patches(Size::new(512, 512)).expect("count"), 3115);
    }

    #[test]
    fn windows_agree_with_the_count_and_map_to_the_source() {
        let scanner = ImageScanner::new(reference_config()).expect("scanner");
        let windows = scanner.windows(Size::new(512, 512)).expect("windows");
        assert_eq!(windows.len(), 3115);

        let top = windows.iter().rev().find(|w| w.level == 4).expect("level 4");
        assert_eq!(top.layer_rect, Rect::new(0, 0, 25, 25));
        assert_eq!(top.source_rect, Rect::new(0, 0, 400, 400));

        for window in &windows {
            assert!(window.source_rect.right() <= 512);
            assert!(window.source_rect.bottom() <= 512);
        }
    }

    #[test]
    fn windows_match_the_layers_a_real_pyramid_builds() {
        let scanner = ImageScanner::new(reference_config()).expect("scanner");
        let windows = scanner.windows(Size::new(300, 420)).expect("windows");

        let mut expected = Vec::new();
        for layer in scanner.layers(GrayImage::new(420, 300), fake_resize).expect("layers") {
            let layer = layer.expect("layer");
            for patch in scanner.patches(&layer).expect("patches") {
                let rect = patch.bounds();
                expected.push(ScanWindow {
                    level: layer.level(),
                    layer_rect: rect,
                    source_rect: layer.to_source(rect),
                });
            }
        }
        assert_eq!(windows, expected);
    }

    #[test]
    fn windows_reject_an_empty_image() {
        let scanner = ImageScanner::new(reference_config()).expect("scanner");
        assert!(scanner.windows(Size::new(0, 64)).is_err());
    }

    #[test]
    fn patches_follow_the_config() {
        let scanner = ImageScanner::new(ScannerConfig {
            scale: 0.5,
            min_size: Size::new(30, 30),
            step: Step::new(10, 10),
            window: Size::new(30, 30),
            edge_mode: EdgeMode::Exclusive,
        })
        .expect("scanner");
        let mut layers = scanner.layers(GrayImage::new(100, 100), fake_resize).expect("layers");
        let level0 = layers.next().expect("level 0").expect("ok");
        assert_eq!(scanner.patches(&level0).expect("patches").count(), 49);
    }

    #[test]
    fn json_config_fills_in_defaults() {
        let config = ScannerConfig::from_json_str(
            r#"{ "scale": 0.5, "window": { "height": 64, "width": 32 }, "edge_mode": "inclusive" }"#,
        )
        .expect("config");
        assert_eq!(config.scale, 0.5);
        assert_eq!(config.window, Size::new(64, 32));
        assert_eq!(config.min_size, Size::new(30, 30));
        assert_eq!(config.edge_mode, EdgeMode::Inclusive);
    }

    #[test]
    fn json_config_is_validated() {
        assert!(ScannerConfig::from_json_str(r#"{ "scale": 2.0 }"#).is_err());
        assert!(ScannerConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn load_reads_a_config_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"{{ "step": {{ "y": 4, "x": 8 }} }}"#).expect("write");
        let config = ScannerConfig::load(file.path()).expect("load");
        assert_eq!(config.step, Step::new(4, 8));

        let missing = ScannerConfig::load("/definitely/not/here.json");
        assert!(missing.is_err());
    }
}
