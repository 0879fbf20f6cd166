//! Region-wide biome grid, stitched together from each chunk's 16x16 array.

use crate::coords::ChunkBounds;
use crate::error::RegionError;
use crate::{CHUNK_BLOCKS, REGION_BLOCKS, REGION_WIDTH_BLOCKS};

/// 512x512 biome ids, row-major, indexed `[z][x]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiomePlane {
    cells: Vec<i32>,
}

impl BiomePlane {
    /// All zeros.
    pub fn new() -> Self {
        Self {
            cells: vec![0; REGION_BLOCKS],
        }
    }

    pub fn from_vec(cells: Vec<i32>) -> Result<Self, RegionError> {
        if cells.len() != REGION_BLOCKS {
            return Err(RegionError::PlaneSize {
                expected: REGION_BLOCKS,
                actual: cells.len(),
            });
        }
        Ok(Self { cells })
    }

    #[inline]
    pub fn get(&self, z: usize, x: usize) -> i32 {
        self.cells[z * REGION_WIDTH_BLOCKS + x]
    }

    #[inline]
    pub fn set(&mut self, z: usize, x: usize, value: i32) {
        self.cells[z * REGION_WIDTH_BLOCKS + x] = value;
    }

    pub fn row(&self, z: usize) -> &[i32] {
        &self.cells[z * REGION_WIDTH_BLOCKS..(z + 1) * REGION_WIDTH_BLOCKS]
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.cells
    }

    pub fn into_vec(self) -> Vec<i32> {
        self.cells
    }

    pub fn max(&self) -> i32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Copy out one chunk's cells, z then x, the layout of the chunk's own array.
    pub fn sub_grid(&self, bounds: &ChunkBounds) -> Vec<i32> {
        let mut values = Vec::with_capacity(CHUNK_BLOCKS);
        for z in bounds.z_start..bounds.z_end {
            values.extend_from_slice(&self.row(z)[bounds.x_start..bounds.x_end]);
        }
        values
    }

    /// Inverse of [`BiomePlane::sub_grid`]. `values` must hold 256 entries.
    pub fn write_sub_grid(&mut self, bounds: &ChunkBounds, values: &[i32]) {
        let width = bounds.x_end - bounds.x_start;
        for (row, z) in values.chunks_exact(width).zip(bounds.z_start..bounds.z_end) {
            let start = z * REGION_WIDTH_BLOCKS + bounds.x_start;
            self.cells[start..start + width].copy_from_slice(row);
        }
    }
}

impl Default for BiomePlane {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::slot_bounds;

    #[test]
    fn test_from_vec_checks_size() {
        assert!(BiomePlane::from_vec(vec![0; REGION_BLOCKS]).is_ok());
        assert!(matches!(
            BiomePlane::from_vec(vec![0; 10]),
            Err(RegionError::PlaneSize { actual: 10, .. })
        ));
    }

    #[test]
    fn test_sub_grid_layout() {
        let mut plane = BiomePlane::new();
        // sequence index 33 is chunk (x=1, z=1): z 16..32, x 16..32
        let bounds = slot_bounds(33).unwrap();
        let values: Vec<i32> = (0..256).collect();
        plane.write_sub_grid(&bounds, &values);

        assert_eq!(plane.get(16, 16), 0);
        assert_eq!(plane.get(16, 17), 1); // x varies fastest
        assert_eq!(plane.get(17, 16), 16);
        assert_eq!(plane.get(31, 31), 255);
        assert_eq!(plane.get(15, 16), 0);
        assert_eq!(plane.sub_grid(&bounds), values);
        assert_eq!(plane.max(), 255);
    }
}
