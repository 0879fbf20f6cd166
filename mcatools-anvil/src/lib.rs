//! Minecraft Anvil region file format (.mca).
//!
//! Region files contain 32x32 chunks in a specific binary format:
//! - Bytes 0-4095: Location table (1024 entries × 4 bytes)
//! - Bytes 4096-8191: Timestamp table (1024 entries × 4 bytes)
//! - Bytes 8192+: Chunk data (whole 4 KB sectors per chunk)
//!
//! Both header tables are indexed `z * 32 + x`, while [`Region`] keeps its
//! chunks `x * 32 + z`. The conversion lives in [`coords`].

pub mod compression;
pub mod coords;
pub mod error;
pub mod plane;
pub mod region;
pub mod sector;
pub mod tree;

pub use coords::{ChunkBounds, RegionPos};
pub use error::{CodecError, RegionError};
pub use plane::BiomePlane;
pub use region::{ChunkSlot, Header, LoadMode, LoadReport, Location, Region, SlotFailure};
pub use tree::TagTree;

/// Width of a chunk in blocks.
pub const CHUNK_WIDTH_BLOCKS: usize = 16;

/// Number of chunks per region dimension.
pub const REGION_WIDTH_CHUNKS: usize = 32;

/// Width of a region in blocks.
pub const REGION_WIDTH_BLOCKS: usize = REGION_WIDTH_CHUNKS * CHUNK_WIDTH_BLOCKS;

/// `log2(REGION_WIDTH_BLOCKS)`, for shifting block coordinates to region coordinates.
pub const REGION_WIDTH_BLOCKS_BITS: u32 = 9;

/// Chunk slots in one region.
pub const REGION_CHUNKS: usize = REGION_WIDTH_CHUNKS * REGION_WIDTH_CHUNKS;

/// Block columns in one region.
pub const REGION_BLOCKS: usize = REGION_WIDTH_BLOCKS * REGION_WIDTH_BLOCKS;

/// Block columns in one chunk.
pub const CHUNK_BLOCKS: usize = CHUNK_WIDTH_BLOCKS * CHUNK_WIDTH_BLOCKS;

/// Size of one sector in bytes (4 KB).
pub const SECTOR_SIZE: usize = 4096;

/// Sectors taken by the header.
pub const HEADER_SECTORS: u32 = 2;

/// Total header size (location table + timestamp table).
pub const HEADER_SIZE: usize = SECTOR_SIZE * HEADER_SECTORS as usize; // 8192 bytes

/// `[Length: 4][Type: 1]` prefix in front of every chunk's compressed data.
pub const CHUNK_BLOB_HEADER: usize = 5;

/// The sector count is stored in a single byte.
pub const MAX_SECTOR_COUNT: usize = u8::MAX as usize;

/// The sector offset is stored in three bytes.
pub const MAX_SECTOR_OFFSET: u32 = 0x00FF_FFFF;
