//! Image processing on top of the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Orientation** | EXIF tag via `ImageDecoder::orientation` |
//! | **Compress** | Lanczos3 downscale + JPEG/PNG re-encode |
//! | **Cover** | exact resize → JPEG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
pub mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, Rotation};
pub use operations::{
    CompressOutcome, CompressionConfig, compress_image, correct_orientation, create_cover,
    get_dimensions, read_orientation,
};
pub use params::{CoverParams, Encoding, Quality, RecompressParams};
pub use rust_backend::RustBackend;
