pub mod error;
pub mod geometry;
pub mod layer_producer;
pub mod patch_enumerator;
pub mod resize;
pub mod utils;
