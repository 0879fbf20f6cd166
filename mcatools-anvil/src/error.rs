use thiserror::Error;

use crate::{HEADER_SIZE, REGION_CHUNKS};

pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum RegionError {
    #[error("Region data is {0} bytes, shorter than the {header} byte header", header = HEADER_SIZE)]
    TruncatedHeader(usize),
    #[error("Region needs {chunks} chunks, not {0}", chunks = REGION_CHUNKS)]
    ChunkCount(usize),
    #[error("Slot {index} holds chunk ({x}, {z}), out of sequence order")]
    SlotOrder { index: usize, x: usize, z: usize },
    #[error("Chunk index {0} is outside 0..{chunks}", chunks = REGION_CHUNKS)]
    OutOfDomain(usize),
    #[error("Failed to decode chunk ({x}, {z}): {source}")]
    Decode {
        x: usize,
        z: usize,
        #[source]
        source: CodecError,
    },
    #[error("Failed to encode chunk ({x}, {z}): {source}")]
    Encode {
        x: usize,
        z: usize,
        #[source]
        source: CodecError,
    },
    #[error("Chunk ({x}, {z}) has a location but no payload")]
    MissingPayload { x: usize, z: usize },
    #[error("Chunk ({x}, {z}) has a payload but an empty location")]
    StrayPayload { x: usize, z: usize },
    #[error("Chunk ({x}, {z}) does not fit: sector offset {offset}, {sectors} sectors")]
    Oversized {
        x: usize,
        z: usize,
        offset: u32,
        sectors: usize,
    },
    #[error("Chunk ({x}, {z}) has no usable {path} array: {reason}")]
    Leaf {
        x: usize,
        z: usize,
        path: String,
        reason: String,
    },
    #[error("Biome plane needs {expected} cells, not {actual}")]
    PlaneSize { expected: usize, actual: usize },
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Chunk blob is {0} bytes, too short for its header")]
    TooShort(usize),
    #[error("Chunk blob declares a zero length")]
    EmptyPayload,
    #[error("Chunk blob declares {declared} bytes but only {available} are present")]
    Truncated { declared: usize, available: usize },
    #[error("Sectors {offset}+{count} are not a valid chunk location in a {file_len} byte file")]
    InvalidLocation {
        offset: u32,
        count: u8,
        file_len: usize,
    },
    #[error("Error while working with zlib compression: {0}")]
    Zlib(#[from] std::io::Error),
    #[error("Tag tree error: {0}")]
    Tree(BoxedError),
}
