//! Region file header.
//!
//! The header consists of two tables, both in table order (`z * 32 + x`):
//! - Location table: where each chunk is stored
//! - Timestamp table: when each chunk was last saved

use crate::error::RegionError;
use crate::{HEADER_SIZE, REGION_CHUNKS, SECTOR_SIZE};

/// One location table entry: `[Offset: 3 bytes][Count: 1 byte]`, big endian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Location {
    /// First sector of the chunk (24 bits).
    pub offset: u32,
    pub sector_count: u8,
}

impl Location {
    pub const EMPTY: Location = Location { offset: 0, sector_count: 0 };

    pub fn new(offset: u32, sector_count: u8) -> Self {
        Self { offset, sector_count }
    }

    pub fn is_empty(&self) -> bool {
        self.offset == 0 && self.sector_count == 0
    }

    /// Byte range covered by the chunk's sectors.
    pub fn byte_range(&self) -> std::ops::Range<usize> {
        let start = self.offset as usize * SECTOR_SIZE;
        start..start + self.sector_count as usize * SECTOR_SIZE
    }

    fn read(entry: &[u8]) -> Self {
        Self {
            offset: u32::from_be_bytes([0, entry[0], entry[1], entry[2]]),
            sector_count: entry[3],
        }
    }

    fn write(&self, entry: &mut [u8]) {
        entry[0] = ((self.offset >> 16) & 0xFF) as u8;
        entry[1] = ((self.offset >> 8) & 0xFF) as u8;
        entry[2] = (self.offset & 0xFF) as u8;
        entry[3] = self.sector_count;
    }
}

/// Both header tables, indexed by table position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub locations: [Location; REGION_CHUNKS],
    pub timestamps: [u32; REGION_CHUNKS],
}

impl Header {
    pub fn new() -> Self {
        Self {
            locations: [Location::EMPTY; REGION_CHUNKS],
            timestamps: [0; REGION_CHUNKS],
        }
    }

    /// Read the first 8 KB of a region file.
    pub fn parse(data: &[u8]) -> Result<Self, RegionError> {
        if data.len() < HEADER_SIZE {
            return Err(RegionError::TruncatedHeader(data.len()));
        }

        let mut header = Self::new();
        let (location_table, rest) = data.split_at(SECTOR_SIZE);
        let timestamp_table = &rest[..SECTOR_SIZE];

        for (position, entry) in location_table.chunks_exact(4).enumerate() {
            header.locations[position] = Location::read(entry);
        }
        for (position, entry) in timestamp_table.chunks_exact(4).enumerate() {
            header.timestamps[position] = u32::from_be_bytes([entry[0], entry[1], entry[2], entry[3]]);
        }
        Ok(header)
    }

    /// Serialize both tables: exactly 8192 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut header = vec![0u8; HEADER_SIZE];
        let (location_table, timestamp_table) = header.split_at_mut(SECTOR_SIZE);

        for (location, entry) in self.locations.iter().zip(location_table.chunks_exact_mut(4)) {
            location.write(entry);
        }
        for (timestamp, entry) in self.timestamps.iter().zip(timestamp_table.chunks_exact_mut(4)) {
            entry.copy_from_slice(&timestamp.to_be_bytes());
        }
        header
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}
