//! Chunk blob wrapping: `[Length: 4][Type: 1][Data...]`.
//!
//! Length is big endian and counts the type byte plus the compressed data.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression as ZlibCompression;

use crate::error::CodecError;
use crate::tree::TagTree;
use crate::CHUNK_BLOB_HEADER;

/// Compression types used in Minecraft Anvil format.
/// Only ZLIB is written or decoded here.
pub mod scheme {
    pub const GZIP: u8 = 1;
    pub const ZLIB: u8 = 2;
    pub const NONE: u8 = 3;
    pub const LZ4: u8 = 4;
}

/// Split a chunk blob into its compression type and compressed bytes.
/// `chunk_blob` may carry trailing sector padding.
pub fn unwrap_chunk(chunk_blob: &[u8]) -> Result<(u8, &[u8]), CodecError> {
    if chunk_blob.len() < CHUNK_BLOB_HEADER {
        return Err(CodecError::TooShort(chunk_blob.len()));
    }

    let length = u32::from_be_bytes([chunk_blob[0], chunk_blob[1], chunk_blob[2], chunk_blob[3]]) as usize;
    if length == 0 {
        return Err(CodecError::EmptyPayload);
    }

    let compression_type = chunk_blob[4];
    let data_end = CHUNK_BLOB_HEADER + length - 1;
    if data_end > chunk_blob.len() {
        return Err(CodecError::Truncated {
            declared: length - 1,
            available: chunk_blob.len() - CHUNK_BLOB_HEADER,
        });
    }

    Ok((compression_type, &chunk_blob[CHUNK_BLOB_HEADER..data_end]))
}

/// Inflate a chunk blob into raw payload bytes.
///
/// Types other than ZLIB are still run through the zlib decoder; a mislabeled
/// blob decodes fine and anything else fails as a zlib error.
pub fn decompress_raw(chunk_blob: &[u8]) -> Result<Vec<u8>, CodecError> {
    let (compression_type, compressed_data) = unwrap_chunk(chunk_blob)?;
    if compression_type != scheme::ZLIB {
        log::warn!("Unsupported compression type {}; attempting zlib anyway", compression_type);
    }

    let mut decoder = ZlibDecoder::new(compressed_data);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

/// Inflate and parse a chunk blob.
pub fn decompress<T: TagTree>(chunk_blob: &[u8]) -> Result<T, CodecError> {
    parse_tree(&decompress_raw(chunk_blob)?)
}

pub fn parse_tree<T: TagTree>(raw: &[u8]) -> Result<T, CodecError> {
    T::parse(raw).map_err(|e| CodecError::Tree(Box::new(e)))
}

pub fn serialize_tree<T: TagTree>(tree: &T) -> Result<Vec<u8>, CodecError> {
    tree.serialize().map_err(|e| CodecError::Tree(Box::new(e)))
}

/// Deflate raw payload bytes at the best level and wrap them.
/// The result is unpadded; sector padding belongs to the writer.
pub fn compress_raw(raw: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), ZlibCompression::best());
    encoder.write_all(raw)?;
    let compressed = encoder.finish()?;

    let total_len = (compressed.len() + 1) as u32; // +1 byte for Type
    let mut chunk_blob = Vec::with_capacity(CHUNK_BLOB_HEADER + compressed.len());
    chunk_blob.extend_from_slice(&total_len.to_be_bytes());
    chunk_blob.push(scheme::ZLIB);
    chunk_blob.extend_from_slice(&compressed);
    Ok(chunk_blob)
}

/// Serialize and compress a payload.
pub fn compress<T: TagTree>(tree: &T) -> Result<Vec<u8>, CodecError> {
    compress_raw(&serialize_tree(tree)?)
}
