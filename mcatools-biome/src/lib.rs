//! Biome map images for region files.
//!
//! Renders a region's [`mcatools_anvil::BiomePlane`] to PNG through a fixed
//! biome colour table, and reads edited images back into a plane.

pub mod colors;
pub mod image;

pub use colors::{from_rgb, to_rgb, COLORS, UNKNOWN_COLOR};
pub use image::{export_mono, export_rgb, import_rgb, ImageError};
