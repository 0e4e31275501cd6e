//! Conversion of raster photographs into paint-by-numbers templates.
//!
//! The pipeline reduces an RGBA image to a small palette of CIE Lab colors,
//! assigns every pixel to a palette entry, absorbs regions too small to paint
//! into their neighbors, traces the boundary of every remaining color region
//! as closed polygons, and places a number at the most interior point of each
//! region.
//!
//! ```
//! use paintnum::{process, ProcessSettings};
//!
//! let pixels = vec![200u8; 4 * 16 * 16];
//! let settings = ProcessSettings {
//!     k_colors: 2,
//!     min_region_size: 4,
//!     seed: Some(7),
//! };
//! let result = process(&pixels, 16, 16, &settings).unwrap();
//! assert_eq!(result.palette.len(), 2);
//! ```

pub mod color;
pub mod contour;
mod errors;
pub mod geom2;
pub mod labels;
pub mod pipeline;
pub mod quantize;
pub mod svg;

pub use errors::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

pub use color::Lab;
pub use contour::Region;
pub use geom2::{Aabb2, Point2, Polygon2, Ring2, Vector2};
pub use labels::LabelMap;
pub use pipeline::{
    process, process_observed, CancelToken, NumberPlacement, ProcessResult, ProcessSettings,
    ProgressEvent, ProgressFn, ProgressObserver,
};

// Re-exported so callers can build buffers against the same version used here.
pub use image;
