//! 2D geometry for region outlines: closed rings, polygons with holes, and
//! interior point search.
//!
//! All coordinates live in the raster frame of the source image: the origin
//! is the top-left corner, X grows to the right, and Y grows downward.

pub mod polylabel;
mod polygon2;
mod ring2;

pub type Point2 = parry2d_f64::na::Point2<f64>;
pub type Vector2 = parry2d_f64::na::Vector2<f64>;
pub type Aabb2 = parry2d_f64::bounding_volume::Aabb;

pub use self::polygon2::Polygon2;
pub use self::ring2::Ring2;
