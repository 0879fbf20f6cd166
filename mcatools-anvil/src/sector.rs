//! Sector allocation for writing a region from scratch.
//!
//! Every save is a full rebuild: chunks are laid out back to back in table
//! order starting right after the header, each padded to whole sectors.

use crate::region::Location;
use crate::{HEADER_SECTORS, MAX_SECTOR_COUNT, MAX_SECTOR_OFFSET, SECTOR_SIZE};

/// Whole sectors needed to hold `len` bytes.
#[inline]
pub fn sector_count(len: usize) -> usize {
    len.div_ceil(SECTOR_SIZE)
}

/// Zero bytes appended after `len` bytes to end on a sector boundary.
#[inline]
pub fn padding(len: usize) -> usize {
    sector_count(len) * SECTOR_SIZE - len
}

/// A blob that cannot be addressed by a location entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow {
    pub offset: u32,
    pub sectors: usize,
}

#[derive(Debug)]
pub struct SectorAllocator {
    next_sector: u32,
}

impl SectorAllocator {
    pub fn new() -> Self {
        Self {
            next_sector: HEADER_SECTORS,
        }
    }

    /// Sector the next allocation will start at.
    pub fn next_sector(&self) -> u32 {
        self.next_sector
    }

    /// Reserve sectors for a blob of `unpadded_len` bytes.
    pub fn allocate(&mut self, unpadded_len: usize) -> Result<Location, Overflow> {
        let sectors = sector_count(unpadded_len);
        let offset = self.next_sector;
        let end = offset as u64 + sectors as u64;
        if sectors > MAX_SECTOR_COUNT || end > MAX_SECTOR_OFFSET as u64 + 1 {
            return Err(Overflow { offset, sectors });
        }

        self.next_sector += sectors as u32;
        Ok(Location::new(offset, sectors as u8))
    }

    /// Append `blob` plus its padding to `stream`.
    pub fn append_padded(stream: &mut Vec<u8>, blob: &[u8]) {
        stream.extend_from_slice(blob);
        stream.resize(stream.len() + padding(blob.len()), 0);
    }
}

impl Default for SectorAllocator {
    fn default() -> Self {
        Self::new()
    }
}
