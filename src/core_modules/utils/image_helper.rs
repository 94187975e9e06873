pub mod image_helper {
    use image::{GrayImage, Luma};

    /// Diagonal 8-bit gradient, handy as a stand-in for a camera frame.
    pub fn gradient(width: u32, height: u32) -> GrayImage {
        let span = (width + height).saturating_sub(2).max(1);
        GrayImage::from_fn(width, height, |x, y| {
            Luma([((x + y) as u64 * 255 / span as u64) as u8])
        })
    }

    /// Alternating black and white squares of `cell` pixels.
    pub fn checkerboard(width: u32, height: u32, cell: u32) -> GrayImage {
        let cell = cell.max(1);
        GrayImage::from_fn(width, height, |x, y| {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }
}
