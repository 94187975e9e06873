// This file is an example of how to use the `image_scanner` library.
// It scans a synthetic frame and logs how many patches each pyramid level yields.
// Pass a JSON config path as the first argument to override the defaults.

use anyhow::Result;
use image_scanner::core_modules::utils::image_helper::image_helper;
use image_scanner::{FilterResizer, ImageScanner, ScannerConfig};
use log::info;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => ScannerConfig::load(path)?,
        None => ScannerConfig::default(),
    };
    let scanner = ImageScanner::new(config)?;
    info!("Image Scanner - Example Runner ({config:?})");

    let frame = image_helper::gradient(512, 512);
    let mut total = 0;
    for layer in scanner.layers(frame, FilterResizer::default())? {
        let layer = layer?;
        let count = scanner.patches(&layer)?.count();
        info!("level {} ({}): {count} patches", layer.level(), layer.size());
        total += count;
    }
    info!("total: {total} patches");

    Ok(())
}
