//! Coordinate math for region files.
//!
//! Two orderings of the 1024 chunk slots exist side by side:
//! - sequence order (`x * 32 + z`): how [`crate::Region`] keeps its chunks,
//!   z increments and wraps around before x increments.
//! - table order (`z * 32 + x`): how the on-disk location and timestamp
//!   tables are indexed.
//!
//! Only [`table_to_sequence`] and [`sequence_to_table`] cross between them.

use crate::error::RegionError;
use crate::{CHUNK_WIDTH_BLOCKS, REGION_CHUNKS, REGION_WIDTH_BLOCKS_BITS, REGION_WIDTH_CHUNKS};

/// Area covered by one chunk in the region-wide block grid. Ends are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBounds {
    pub z_start: usize,
    pub z_end: usize,
    pub x_start: usize,
    pub x_end: usize,
}

fn check_index(index: usize) -> Result<(), RegionError> {
    if index >= REGION_CHUNKS {
        return Err(RegionError::OutOfDomain(index));
    }
    Ok(())
}

/// Bounds of the chunk at sequence index `index` within the 512x512 grid.
pub fn slot_bounds(index: usize) -> Result<ChunkBounds, RegionError> {
    check_index(index)?;
    let z_start = (index % REGION_WIDTH_CHUNKS) * CHUNK_WIDTH_BLOCKS;
    let x_start = (index / REGION_WIDTH_CHUNKS) * CHUNK_WIDTH_BLOCKS;
    Ok(ChunkBounds {
        z_start,
        z_end: z_start + CHUNK_WIDTH_BLOCKS,
        x_start,
        x_end: x_start + CHUNK_WIDTH_BLOCKS,
    })
}

/// Position of a chunk's entry in the header tables.
#[inline]
pub fn table_position(grid_x: usize, grid_z: usize) -> usize {
    grid_z * REGION_WIDTH_CHUNKS + grid_x
}

/// Position of a chunk in the in-memory sequence.
#[inline]
pub fn sequence_index(grid_x: usize, grid_z: usize) -> usize {
    grid_x * REGION_WIDTH_CHUNKS + grid_z
}

/// Grid coordinates `(grid_x, grid_z)` of a sequence index.
#[inline]
pub fn sequence_coords(index: usize) -> (usize, usize) {
    (index / REGION_WIDTH_CHUNKS, index % REGION_WIDTH_CHUNKS)
}

/// Header table position -> sequence index.
pub fn table_to_sequence(position: usize) -> Result<usize, RegionError> {
    check_index(position)?;
    let grid_x = position % REGION_WIDTH_CHUNKS;
    let grid_z = position / REGION_WIDTH_CHUNKS;
    Ok(sequence_index(grid_x, grid_z))
}

/// Sequence index -> header table position.
pub fn sequence_to_table(index: usize) -> Result<usize, RegionError> {
    check_index(index)?;
    let (grid_x, grid_z) = sequence_coords(index);
    Ok(table_position(grid_x, grid_z))
}

/// Name of the region file holding the block at `(block_x, block_z)`.
pub fn region_file_name(block_x: i32, block_z: i32) -> String {
    RegionPos::containing(block_x, block_z).file_name()
}

/// `(min_x, min_z, max_x, max_z)` block coordinates covered by a region. Max is inclusive.
pub fn region_block_bounds(region_x: i32, region_z: i32) -> (i32, i32, i32, i32) {
    RegionPos::new(region_x, region_z).block_bounds()
}

/// Lowest region coordinate whose blocks fit in an `i32`.
pub const MIN_REGION: i32 = i32::MIN >> REGION_WIDTH_BLOCKS_BITS;
/// Highest region coordinate whose blocks fit in an `i32`.
pub const MAX_REGION: i32 = i32::MAX >> REGION_WIDTH_BLOCKS_BITS;

/// Region file coordinates (parsed from filename like "r.0.-1.mca").
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct RegionPos {
    pub x: i32,
    pub z: i32,
}

impl RegionPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Region containing a block. Arithmetic shift, so negative blocks floor.
    pub fn containing(block_x: i32, block_z: i32) -> Self {
        Self {
            x: block_x >> REGION_WIDTH_BLOCKS_BITS,
            z: block_z >> REGION_WIDTH_BLOCKS_BITS,
        }
    }

    /// Parse region position from filename (e.g., "r.0.-1.mca").
    /// Coordinates outside [`MIN_REGION`]..=[`MAX_REGION`] are rejected.
    pub fn from_filename(name: &str) -> Option<Self> {
        let parts: Vec<&str> = name.split('.').collect();
        if parts.len() == 4 && parts[0] == "r" && parts[3] == "mca" {
            let x = parts[1].parse().ok()?;
            let z = parts[2].parse().ok()?;
            let range = MIN_REGION..=MAX_REGION;
            (range.contains(&x) && range.contains(&z)).then_some(Self { x, z })
        } else {
            None
        }
    }

    pub fn file_name(&self) -> String {
        format!("r.{}.{}.mca", self.x, self.z)
    }

    /// Inclusive block bounds. Only meaningful for coordinates within
    /// [`MIN_REGION`]..=[`MAX_REGION`]; others wrap instead of panicking.
    pub fn block_bounds(&self) -> (i32, i32, i32, i32) {
        const LAST: i32 = (1 << REGION_WIDTH_BLOCKS_BITS) - 1;
        let min_x = self.x << REGION_WIDTH_BLOCKS_BITS;
        let min_z = self.z << REGION_WIDTH_BLOCKS_BITS;
        (min_x, min_z, min_x.wrapping_add(LAST), min_z.wrapping_add(LAST))
    }
}
