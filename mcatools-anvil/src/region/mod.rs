//! A whole region file held in memory.
//!
//! Loading decodes every present chunk; saving rebuilds the file from
//! scratch, so on-disk locations are never reused between saves.

mod header;

pub use header::{Header, Location};

use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use fastnbt::Value;
use mcatools_benchmark::RegionMetrics;
use rayon::prelude::*;

use crate::compression::{self, scheme};
use crate::coords::{sequence_coords, sequence_index, slot_bounds, table_to_sequence};
use crate::error::{CodecError, RegionError};
use crate::plane::BiomePlane;
use crate::sector::{padding, SectorAllocator};
use crate::tree::{TagTree, BIOMES_PATH};
use crate::{CHUNK_BLOB_HEADER, CHUNK_BLOCKS, HEADER_SECTORS, REGION_CHUNKS, REGION_WIDTH_CHUNKS, SECTOR_SIZE};

/// One of the 1024 chunk positions in a region.
///
/// A slot is empty when its location is `(0, 0)`; empty slots carry no
/// payload and are written with a zero timestamp.
pub struct ChunkSlot<T = Value> {
    grid_x: usize,
    grid_z: usize,
    location: Location,
    timestamp: u32,
    payload: Option<T>,
}

impl<T> ChunkSlot<T> {
    pub fn empty(grid_x: usize, grid_z: usize) -> Self {
        Self {
            grid_x,
            grid_z,
            location: Location::EMPTY,
            timestamp: 0,
            payload: None,
        }
    }

    pub fn new(grid_x: usize, grid_z: usize, location: Location, timestamp: u32, payload: Option<T>) -> Self {
        Self {
            grid_x,
            grid_z,
            location,
            timestamp,
            payload,
        }
    }

    pub fn grid_x(&self) -> usize {
        self.grid_x
    }

    pub fn grid_z(&self) -> usize {
        self.grid_z
    }

    /// Location from the last load or save.
    pub fn location(&self) -> Location {
        self.location
    }

    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    pub fn last_modified(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.timestamp as u64)
    }

    pub fn is_empty(&self) -> bool {
        self.location.is_empty()
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn payload_mut(&mut self) -> Option<&mut T> {
        self.payload.as_mut()
    }
}

impl<T> fmt::Debug for ChunkSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkSlot")
            .field("x", &self.grid_x)
            .field("z", &self.grid_z)
            .field("empty", &self.is_empty())
            .field("location", &self.location)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// What to do when a single chunk fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Log it, leave the slot empty and keep going.
    #[default]
    BestEffort,
    /// Fail the whole load.
    Strict,
}

#[derive(Debug)]
pub struct SlotFailure {
    pub x: usize,
    pub z: usize,
    pub error: CodecError,
}

/// Per-chunk problems seen during a best-effort load.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub failures: Vec<SlotFailure>,
    /// `(x, z, compression type)` of chunks not marked as zlib.
    pub unexpected_compression: Vec<(usize, usize, u8)>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.unexpected_compression.is_empty()
    }
}

/// Collection of 1024 chunk slots in sequence order (`x * 32 + z`).
pub struct Region<T = Value> {
    chunks: Vec<ChunkSlot<T>>,
    biomes: RwLock<Option<Arc<BiomePlane>>>,
}

impl<T> fmt::Debug for Region<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("occupied", &self.occupied())
            .finish()
    }
}

fn decode_chunk<T: TagTree>(
    data: &[u8],
    location: Location,
    metrics: Option<&RegionMetrics>,
) -> Result<(T, u8), CodecError> {
    let range = location.byte_range();
    if location.offset < HEADER_SECTORS || range.start >= data.len() {
        return Err(CodecError::InvalidLocation {
            offset: location.offset,
            count: location.sector_count,
            file_len: data.len(),
        });
    }
    // the final chunk of a file is not always padded out
    let chunk_blob = &data[range.start..range.end.min(data.len())];

    let start = Instant::now();
    let (compression_type, compressed) = compression::unwrap_chunk(chunk_blob)?;
    let raw = compression::decompress_raw(chunk_blob)?;
    let tree = compression::parse_tree(&raw)?;
    if let Some(bench) = metrics {
        bench.record_decode(start.elapsed());
        bench.record_chunk_sizes(raw.len(), compressed.len());
    }
    Ok((tree, compression_type))
}

impl<T: TagTree> Region<T> {
    pub fn new(chunks: Vec<ChunkSlot<T>>) -> Result<Self, RegionError> {
        if chunks.len() != REGION_CHUNKS {
            return Err(RegionError::ChunkCount(chunks.len()));
        }
        for (index, slot) in chunks.iter().enumerate() {
            if sequence_coords(index) != (slot.grid_x, slot.grid_z) {
                return Err(RegionError::SlotOrder {
                    index,
                    x: slot.grid_x,
                    z: slot.grid_z,
                });
            }
            let (x, z) = (slot.grid_x, slot.grid_z);
            match (slot.is_empty(), slot.payload.is_some()) {
                (false, false) => return Err(RegionError::MissingPayload { x, z }),
                (true, true) => return Err(RegionError::StrayPayload { x, z }),
                _ => {}
            }
        }
        Ok(Self {
            chunks,
            biomes: RwLock::new(None),
        })
    }

    /// A region with every slot empty.
    pub fn empty() -> Self {
        Self {
            chunks: (0..REGION_CHUNKS)
                .map(|index| {
                    let (x, z) = sequence_coords(index);
                    ChunkSlot::empty(x, z)
                })
                .collect(),
            biomes: RwLock::new(None),
        }
    }

    /// Best-effort load; failed chunks are logged and left empty.
    pub fn load(data: &[u8]) -> Result<Self, RegionError> {
        Self::load_with(data, LoadMode::BestEffort, None).map(|(region, _)| region)
    }

    pub fn load_with(
        data: &[u8],
        mode: LoadMode,
        metrics: Option<&RegionMetrics>,
    ) -> Result<(Self, LoadReport), RegionError> {
        let header = Header::parse(data)?;
        let start = Instant::now();

        // Chunks are independent, decode them in table order on the pool.
        let decoded: Vec<Option<Result<(T, u8), CodecError>>> = header
            .locations[..]
            .par_iter()
            .map(|location| {
                if location.is_empty() {
                    None
                } else {
                    Some(decode_chunk(data, *location, metrics))
                }
            })
            .collect();

        let mut region = Self::empty();
        let mut report = LoadReport::default();

        for (position, outcome) in decoded.into_iter().enumerate() {
            let Some(outcome) = outcome else { continue };
            let index = table_to_sequence(position)?;
            let (x, z) = sequence_coords(index);

            match outcome {
                Ok((tree, compression_type)) => {
                    if compression_type != scheme::ZLIB {
                        report.unexpected_compression.push((x, z, compression_type));
                    }
                    region.chunks[index] = ChunkSlot::new(
                        x,
                        z,
                        header.locations[position],
                        header.timestamps[position],
                        Some(tree),
                    );
                }
                Err(error) => {
                    if let Some(bench) = metrics {
                        bench.record_decode_failure();
                    }
                    match mode {
                        LoadMode::Strict => return Err(RegionError::Decode { x, z, source: error }),
                        LoadMode::BestEffort => {
                            log::warn!("Skipping chunk ({}, {}): {}", x, z, error);
                            report.failures.push(SlotFailure { x, z, error });
                        }
                    }
                }
            }
        }

        log::info!(
            "Loaded region: {} chunks, {} skipped in {:.2?}",
            region.occupied(),
            report.failures.len(),
            start.elapsed()
        );
        Ok((region, report))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, RegionError> {
        Self::load(&std::fs::read(path)?)
    }

    pub fn open_with(
        path: impl AsRef<Path>,
        mode: LoadMode,
        metrics: Option<&RegionMetrics>,
    ) -> Result<(Self, LoadReport), RegionError> {
        Self::load_with(&std::fs::read(path)?, mode, metrics)
    }

    pub fn save(&mut self) -> Result<Vec<u8>, RegionError> {
        self.save_with(None)
    }

    /// Rebuild the whole file: header tables followed by every chunk, packed
    /// into consecutive sectors in table order. Slot locations are updated
    /// only once the full file has been built.
    pub fn save_with(&mut self, metrics: Option<&RegionMetrics>) -> Result<Vec<u8>, RegionError> {
        let start = Instant::now();

        // Compression can run out of order; emission below cannot.
        let blobs: Vec<Option<Vec<u8>>> = self
            .chunks
            .par_iter()
            .map(|slot| -> Result<Option<Vec<u8>>, RegionError> {
                if slot.is_empty() {
                    return Ok(None);
                }
                let (x, z) = (slot.grid_x, slot.grid_z);
                let tree = slot
                    .payload
                    .as_ref()
                    .ok_or(RegionError::MissingPayload { x, z })?;

                let start_enc = Instant::now();
                let encoded = compression::serialize_tree(tree).and_then(|raw| {
                    let blob = compression::compress_raw(&raw)?;
                    Ok((raw.len(), blob))
                });
                let (raw_len, blob) = encoded.map_err(|source| RegionError::Encode { x, z, source })?;
                if let Some(bench) = metrics {
                    bench.record_encode(start_enc.elapsed());
                    bench.record_chunk_sizes(raw_len, blob.len() - CHUNK_BLOB_HEADER);
                }
                Ok(Some(blob))
            })
            .collect::<Result<_, RegionError>>()?;

        let mut header = Header::new();
        let mut allocator = SectorAllocator::new();
        let mut stream = Vec::new();
        let mut locations = vec![Location::EMPTY; REGION_CHUNKS];

        for position in 0..REGION_CHUNKS {
            let index = table_to_sequence(position)?;
            let Some(blob) = &blobs[index] else { continue };
            let slot = &self.chunks[index];

            let location = allocator.allocate(blob.len()).map_err(|overflow| RegionError::Oversized {
                x: slot.grid_x,
                z: slot.grid_z,
                offset: overflow.offset,
                sectors: overflow.sectors,
            })?;
            log::debug!(
                "Chunk ({}, {}): {} bytes at sector {} (+{})",
                slot.grid_x,
                slot.grid_z,
                blob.len(),
                location.offset,
                location.sector_count
            );

            header.locations[position] = location;
            header.timestamps[position] = slot.timestamp;
            SectorAllocator::append_padded(&mut stream, blob);
            if let Some(bench) = metrics {
                bench.record_padding(padding(blob.len()));
            }
            locations[index] = location;
        }

        for (slot, location) in self.chunks.iter_mut().zip(locations) {
            slot.location = location;
        }

        let mut data = header.to_bytes();
        data.extend_from_slice(&stream);
        log::info!(
            "Saved region: {} chunks, {} sectors in {:.2?}",
            self.occupied(),
            data.len() / SECTOR_SIZE,
            start.elapsed()
        );
        Ok(data)
    }

    /// Build the file in memory, then write it out in one go.
    pub fn write_to(&mut self, path: impl AsRef<Path>) -> Result<(), RegionError> {
        let data = self.save()?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Region-wide biome ids. Built on first use and cached until
    /// [`Region::set_plane`] or [`Region::invalidate_plane`].
    ///
    /// Empty chunks leave their cells at zero.
    pub fn plane(&self) -> Result<Arc<BiomePlane>, RegionError> {
        if let Some(plane) = self.biomes.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            return Ok(Arc::clone(plane));
        }

        let plane = Arc::new(self.build_plane()?);
        *self.biomes.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&plane));
        Ok(plane)
    }

    fn build_plane(&self) -> Result<BiomePlane, RegionError> {
        let mut plane = BiomePlane::new();
        for (index, slot) in self.chunks.iter().enumerate() {
            if slot.is_empty() {
                continue;
            }
            let (x, z) = (slot.grid_x, slot.grid_z);
            let tree = slot.payload.as_ref().ok_or(RegionError::MissingPayload { x, z })?;

            let values = tree.int_array(BIOMES_PATH).ok_or_else(|| leaf_error(x, z, "missing".to_string()))?;
            if values.len() != CHUNK_BLOCKS {
                return Err(leaf_error(
                    x,
                    z,
                    format!("expected {} entries, found {}", CHUNK_BLOCKS, values.len()),
                ));
            }
            plane.write_sub_grid(&slot_bounds(index)?, &values);
        }
        Ok(plane)
    }

    /// Overwrite every present chunk's biome array from `plane`.
    ///
    /// Either every chunk is updated or none is. Cells that fall on empty
    /// chunks are dropped.
    pub fn set_plane(&mut self, plane: BiomePlane) -> Result<(), RegionError> {
        let mut updates = Vec::with_capacity(self.occupied());
        for (index, slot) in self.chunks.iter().enumerate() {
            if slot.is_empty() {
                continue;
            }
            let (x, z) = (slot.grid_x, slot.grid_z);
            let tree = slot.payload.as_ref().ok_or(RegionError::MissingPayload { x, z })?;
            let values = plane.sub_grid(&slot_bounds(index)?);
            tree.check_int_array(BIOMES_PATH, &values)
                .map_err(|e| leaf_error(x, z, e.to_string()))?;
            updates.push((index, values));
        }

        self.invalidate_plane();
        for (index, values) in updates {
            let slot = &mut self.chunks[index];
            let (x, z) = (slot.grid_x, slot.grid_z);
            let tree = slot.payload.as_mut().ok_or(RegionError::MissingPayload { x, z })?;
            tree.set_int_array(BIOMES_PATH, &values)
                .map_err(|e| leaf_error(x, z, e.to_string()))?;
        }

        *self.biomes.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(plane));
        Ok(())
    }

    /// Drop the cached plane, e.g. after editing payloads through [`Region::chunk_mut`].
    pub fn invalidate_plane(&self) {
        *self.biomes.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn leaf_error(x: usize, z: usize, reason: String) -> RegionError {
    RegionError::Leaf {
        x,
        z,
        path: BIOMES_PATH.join("/"),
        reason,
    }
}

impl<T> Region<T> {
    pub fn slots(&self) -> &[ChunkSlot<T>] {
        &self.chunks
    }

    pub fn into_slots(self) -> Vec<ChunkSlot<T>> {
        self.chunks
    }

    pub fn slot(&self, grid_x: usize, grid_z: usize) -> Option<&ChunkSlot<T>> {
        if grid_x >= REGION_WIDTH_CHUNKS || grid_z >= REGION_WIDTH_CHUNKS {
            return None;
        }
        self.chunks.get(sequence_index(grid_x, grid_z))
    }

    pub fn chunk(&self, grid_x: usize, grid_z: usize) -> Option<&T> {
        self.slot(grid_x, grid_z)?.payload()
    }

    /// Direct payload access. Does not invalidate the cached plane.
    pub fn chunk_mut(&mut self, grid_x: usize, grid_z: usize) -> Option<&mut T> {
        if grid_x >= REGION_WIDTH_CHUNKS || grid_z >= REGION_WIDTH_CHUNKS {
            return None;
        }
        self.chunks
            .get_mut(sequence_index(grid_x, grid_z))?
            .payload_mut()
    }

    /// Number of non-empty slots.
    pub fn occupied(&self) -> usize {
        self.chunks.iter().filter(|slot| !slot.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::table_position;
    use crate::sector::sector_count;
    use crate::HEADER_SIZE;
    use fastnbt::{ByteArray, IntArray};
    use std::collections::HashMap;

    fn chunk_tree(x: usize, z: usize, biomes: Vec<i32>) -> Value {
        let mut level = HashMap::new();
        level.insert("xPos".to_string(), Value::Int(x as i32));
        level.insert("zPos".to_string(), Value::Int(z as i32));
        level.insert("Biomes".to_string(), Value::IntArray(IntArray::new(biomes)));
        let mut root = HashMap::new();
        root.insert("Level".to_string(), Value::Compound(level));
        Value::Compound(root)
    }

    fn noisy_chunk(x: usize, z: usize, noise_len: usize) -> Value {
        let mut tree = chunk_tree(x, z, vec![1; 256]);
        let mut state: u32 = 0x1234_5678;
        let noise: Vec<i8> = (0..noise_len)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 24) as i8
            })
            .collect();
        if let Value::Compound(root) = &mut tree {
            root.insert("Noise".to_string(), Value::ByteArray(ByteArray::new(noise)));
        }
        tree
    }

    /// Hand-built region file. Chunks are written in reverse of the given
    /// order so file order differs from table order.
    fn write_region(chunks: &[(usize, usize, u32, Value)]) -> Vec<u8> {
        let mut header = Header::new();
        let mut body = Vec::new();
        for (x, z, timestamp, tree) in chunks.iter().rev() {
            let mut blob = compression::compress(tree).unwrap();
            let sectors = blob.len().div_ceil(SECTOR_SIZE);
            blob.resize(sectors * SECTOR_SIZE, 0);

            let position = table_position(*x, *z);
            let offset = (HEADER_SIZE + body.len()) / SECTOR_SIZE;
            header.locations[position] = Location::new(offset as u32, sectors as u8);
            header.timestamps[position] = *timestamp;
            body.extend_from_slice(&blob);
        }
        let mut data = header.to_bytes();
        data.extend_from_slice(&body);
        data
    }

    fn sample_region_bytes() -> Vec<u8> {
        write_region(&[
            (0, 0, 1_600_000_000, chunk_tree(0, 0, vec![1; 256])),
            (1, 0, 1_600_000_001, chunk_tree(1, 0, vec![2; 256])),
            (0, 1, 1_600_000_002, chunk_tree(0, 1, vec![3; 256])),
            (31, 31, 1_600_000_003, noisy_chunk(31, 31, 10_000)),
        ])
    }

    #[test]
    fn test_empty_region() {
        let data = vec![0u8; HEADER_SIZE];
        let mut region: Region = Region::load(&data).unwrap();
        assert_eq!(region.occupied(), 0);
        assert_eq!(region.save().unwrap(), data);
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(
            Region::<Value>::load(&[0u8; 100]),
            Err(RegionError::TruncatedHeader(100))
        ));
    }

    #[test]
    fn test_table_order_is_transposed() {
        let data = sample_region_bytes();
        let region: Region = Region::load(&data).unwrap();
        assert_eq!(region.occupied(), 4);

        // chunk (1, 0) is table entry 1 and sequence entry 32
        let slot = &region.slots()[32];
        assert_eq!((slot.grid_x(), slot.grid_z()), (1, 0));
        assert_eq!(slot.timestamp(), 1_600_000_001);
        assert_eq!(slot.payload(), Some(&chunk_tree(1, 0, vec![2; 256])));

        let slot = &region.slots()[1];
        assert_eq!((slot.grid_x(), slot.grid_z()), (0, 1));
        assert_eq!(region.chunk(0, 1), Some(&chunk_tree(0, 1, vec![3; 256])));
        assert!(region.slot(2, 2).unwrap().is_empty());
        assert!(region.slot(32, 0).is_none());
    }

    #[test]
    fn test_round_trip() {
        let data = sample_region_bytes();
        let mut region: Region = Region::load(&data).unwrap();
        let saved = region.save().unwrap();
        let reloaded: Region = Region::load(&saved).unwrap();

        for (before, after) in region.slots().iter().zip(reloaded.slots()) {
            assert_eq!(before.is_empty(), after.is_empty());
            assert_eq!(before.timestamp(), after.timestamp());
            assert_eq!(before.payload(), after.payload());
            // save() updated the in-memory locations to the new layout
            assert_eq!(before.location(), after.location());
        }
    }

    #[test]
    fn test_save_layout() {
        let data = sample_region_bytes();
        let mut region: Region = Region::load(&data).unwrap();
        let saved = region.save().unwrap();
        let header = Header::parse(&saved).unwrap();

        let mut expected_offset = 2;
        for position in 0..REGION_CHUNKS {
            let location = header.locations[position];
            if location.is_empty() {
                assert_eq!(header.timestamps[position], 0);
                continue;
            }
            // contiguous, strictly increasing in table order
            assert_eq!(location.offset, expected_offset);
            expected_offset += location.sector_count as u32;

            let block = &saved[location.byte_range()];
            let (_, compressed) = compression::unwrap_chunk(block).unwrap();
            assert_eq!(location.sector_count as usize, sector_count(compressed.len() + 5));
            assert_eq!(block.len(), location.sector_count as usize * SECTOR_SIZE);
        }
        assert_eq!(saved.len(), expected_offset as usize * SECTOR_SIZE);

        // the noisy chunk needs more than one sector
        let big = header.locations[table_position(31, 31)];
        assert!(big.sector_count >= 3);
    }

    #[test]
    fn test_corrupt_chunk_best_effort() {
        let mut data = sample_region_bytes();
        let location = Header::parse(&data).unwrap().locations[table_position(1, 0)];
        data[location.byte_range().start + 5] = 0xFF;

        let metrics = RegionMetrics::new();
        let (region, report) =
            Region::<Value>::load_with(&data, LoadMode::BestEffort, Some(&metrics)).unwrap();
        assert_eq!(region.occupied(), 3);
        assert!(region.slot(1, 0).unwrap().is_empty());
        assert!(region.chunk(1, 0).is_none());
        assert_eq!(report.failures.len(), 1);
        assert_eq!((report.failures[0].x, report.failures[0].z), (1, 0));
        assert_eq!(
            metrics.total_decode_failures.load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[test]
    fn test_corrupt_chunk_strict() {
        let mut data = sample_region_bytes();
        let location = Header::parse(&data).unwrap().locations[table_position(1, 0)];
        data[location.byte_range().start + 5] = 0xFF;

        let result = Region::<Value>::load_with(&data, LoadMode::Strict, None);
        assert!(matches!(result, Err(RegionError::Decode { x: 1, z: 0, .. })));
    }

    #[test]
    fn test_location_past_end_of_file() {
        let mut data = sample_region_bytes();
        let mut header = Header::parse(&data).unwrap();
        header.locations[table_position(5, 5)] = Location::new(10_000, 1);
        data[..HEADER_SIZE].copy_from_slice(&header.to_bytes());

        let (_, report) = Region::<Value>::load_with(&data, LoadMode::BestEffort, None).unwrap();
        assert!(matches!(
            report.failures[0].error,
            CodecError::InvalidLocation { offset: 10_000, .. }
        ));
    }

    #[test]
    fn test_unexpected_compression_type() {
        let mut data = sample_region_bytes();
        let location = Header::parse(&data).unwrap().locations[table_position(0, 1)];
        data[location.byte_range().start + 4] = scheme::GZIP;

        let (region, report) = Region::<Value>::load_with(&data, LoadMode::Strict, None).unwrap();
        assert_eq!(report.unexpected_compression, vec![(0, 1, scheme::GZIP)]);
        assert!(region.chunk(0, 1).is_some());
    }

    #[test]
    fn test_new_checks_slots() {
        let slots: Vec<ChunkSlot> = Vec::new();
        assert!(matches!(Region::new(slots), Err(RegionError::ChunkCount(0))));

        let mut slots = Region::<Value>::empty().into_slots();
        slots.swap(0, 1);
        assert!(matches!(
            Region::new(slots),
            Err(RegionError::SlotOrder { index: 0, x: 0, z: 1 })
        ));
    }

    #[test]
    fn test_new_rejects_location_without_payload() {
        let mut slots = Region::<Value>::empty().into_slots();
        slots[33] = ChunkSlot::new(1, 1, Location::new(2, 1), 0, None);
        assert!(matches!(
            Region::new(slots),
            Err(RegionError::MissingPayload { x: 1, z: 1 })
        ));
    }

    #[test]
    fn test_new_rejects_payload_without_location() {
        let mut slots = Region::<Value>::empty().into_slots();
        let tree = chunk_tree(0, 0, vec![1; 256]);
        slots[0] = ChunkSlot::new(0, 0, Location::EMPTY, 123, Some(tree));
        assert!(matches!(
            Region::new(slots),
            Err(RegionError::StrayPayload { x: 0, z: 0 })
        ));
    }

    #[test]
    fn test_new_accepts_loaded_slots() {
        let loaded: Region = Region::load(&sample_region_bytes()).unwrap();
        let mut region = Region::new(loaded.into_slots()).unwrap();
        assert_eq!(region.occupied(), 4);
        let reloaded: Region = Region::load(&region.save().unwrap()).unwrap();
        assert_eq!(reloaded.occupied(), 4);
    }

    #[test]
    fn test_plane_placement() {
        let mut biomes = vec![7; 256];
        biomes[1] = 9; // row 0 (z), column 1 (x)
        let data = write_region(&[(2, 5, 0, chunk_tree(2, 5, biomes))]);
        let region: Region = Region::load(&data).unwrap();
        let plane = region.plane().unwrap();

        assert_eq!(plane.get(80, 32), 7);
        assert_eq!(plane.get(80, 33), 9);
        assert_eq!(plane.get(95, 47), 7);
        assert_eq!(plane.get(79, 32), 0);
        assert_eq!(plane.get(80, 48), 0);
        let nonzero = plane.as_slice().iter().filter(|&&v| v != 0).count();
        assert_eq!(nonzero, 256);
    }

    #[test]
    fn test_plane_is_cached() {
        let region: Region = Region::load(&sample_region_bytes()).unwrap();
        let first = region.plane().unwrap();
        let second = region.plane().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        region.invalidate_plane();
        let rebuilt = region.plane().unwrap();
        assert!(!Arc::ptr_eq(&first, &rebuilt));
        assert_eq!(*first, *rebuilt);
    }

    #[test]
    fn test_set_plane_idempotent() {
        let mut region: Region = Region::load(&sample_region_bytes()).unwrap();
        let first = region.plane().unwrap();
        region.set_plane((*first).clone()).unwrap();
        region.invalidate_plane();
        assert_eq!(*region.plane().unwrap(), *first);
    }

    #[test]
    fn test_set_plane_writes_chunks() {
        let mut region: Region = Region::load(&sample_region_bytes()).unwrap();
        let mut plane = BiomePlane::new();
        // chunk (1, 0): x 16..32, z 0..16
        plane.set(0, 16, 42);
        plane.set(15, 31, 43);
        // chunk (5, 5) is empty, this cell is dropped
        plane.set(80, 80, 99);
        region.set_plane(plane).unwrap();

        let saved = region.save().unwrap();
        let reloaded: Region = Region::load(&saved).unwrap();
        let biomes = reloaded.chunk(1, 0).unwrap().int_array(BIOMES_PATH).unwrap();
        assert_eq!(biomes[0], 42);
        assert_eq!(biomes[255], 43);
        assert_eq!(biomes[1], 0);

        let reread = reloaded.plane().unwrap();
        assert_eq!(reread.get(0, 16), 42);
        assert_eq!(reread.get(80, 80), 0);
        assert!(reloaded.slot(5, 5).unwrap().is_empty());
    }

    #[test]
    fn test_missing_biome_leaf() {
        let tree = Value::Compound(HashMap::new());
        let data = write_region(&[(3, 4, 0, tree)]);
        let region: Region = Region::load(&data).unwrap();
        assert!(matches!(region.plane(), Err(RegionError::Leaf { x: 3, z: 4, .. })));
    }

    #[test]
    fn test_failed_set_plane_changes_nothing() {
        let data = write_region(&[
            (0, 0, 0, chunk_tree(0, 0, vec![1; 256])),
            (0, 1, 0, Value::Compound(HashMap::new())),
        ]);
        let mut region: Region = Region::load(&data).unwrap();

        let mut plane = BiomePlane::new();
        plane.set(0, 0, 9);
        assert!(matches!(region.set_plane(plane), Err(RegionError::Leaf { x: 0, z: 1, .. })));
        assert_eq!(region.chunk(0, 0).unwrap().int_array(BIOMES_PATH), Some(vec![1; 256]));
        assert_eq!(region.chunk(0, 1), Some(&Value::Compound(HashMap::new())));
    }

    #[test]
    fn test_failed_set_plane_on_byte_array_changes_nothing() {
        let mut legacy = chunk_tree(0, 1, Vec::new());
        if let Value::Compound(root) = &mut legacy {
            if let Some(Value::Compound(level)) = root.get_mut("Level") {
                level.insert("Biomes".to_string(), Value::ByteArray(ByteArray::new(vec![2; 256])));
            }
        }
        let data = write_region(&[(0, 0, 0, chunk_tree(0, 0, vec![1; 256])), (0, 1, 0, legacy)]);
        let mut region: Region = Region::load(&data).unwrap();
        let before = region.plane().unwrap();

        let mut plane = (*before).clone();
        plane.set(0, 0, 5);
        plane.set(16, 0, 300); // first cell of chunk (0, 1)
        assert!(matches!(region.set_plane(plane), Err(RegionError::Leaf { x: 0, z: 1, .. })));
        assert_eq!(region.chunk(0, 0).unwrap().int_array(BIOMES_PATH), Some(vec![1; 256]));
        assert_eq!(*region.plane().unwrap(), *before);
    }

    #[test]
    fn test_decode_and_encode_count_the_same_bytes() {
        let mut level = HashMap::new();
        level.insert("Biomes".to_string(), Value::IntArray(IntArray::new((0..256).collect())));
        let mut root = HashMap::new();
        root.insert("Level".to_string(), Value::Compound(level));
        let data = write_region(&[(4, 9, 0, Value::Compound(root))]);

        let decoded = RegionMetrics::new();
        let (mut region, _): (Region, _) = Region::load_with(&data, LoadMode::Strict, Some(&decoded)).unwrap();
        let encoded = RegionMetrics::new();
        region.save_with(Some(&encoded)).unwrap();

        let compressed = |m: &RegionMetrics| m.total_compressed_bytes.load(std::sync::atomic::Ordering::Relaxed);
        let raw = |m: &RegionMetrics| m.total_raw_bytes.load(std::sync::atomic::Ordering::Relaxed);
        assert_eq!(compressed(&decoded), compressed(&encoded));
        assert_eq!(raw(&decoded), raw(&encoded));
        assert!(compressed(&encoded) > 0);
    }

    #[test]
    fn test_save_metrics() {
        let mut region: Region = Region::load(&sample_region_bytes()).unwrap();
        let metrics = RegionMetrics::new();
        region.save_with(Some(&metrics)).unwrap();
        assert_eq!(
            metrics.total_chunks_encoded.load(std::sync::atomic::Ordering::Relaxed),
            4
        );
    }
}
