//! Zip code geometry, price gradient coloring, neighbor search and the map
//! layers built from them.

pub mod colors;
pub mod geometry;
pub mod layers;
pub mod neighbors;

pub use colors::{ColorAssignment, Rgba, assign_colors_to_zip_codes};
pub use geometry::{GeometryIndex, ZipGeometry};
pub use layers::{MapLayers, build_layers};
pub use neighbors::{DEFAULT_RADIUS_MILES, haversine_miles, neighboring_zips};
