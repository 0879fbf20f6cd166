use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use mcatools_anvil::coords::{region_block_bounds, region_file_name};
use mcatools_anvil::{LoadMode, LoadReport, Region, RegionPos, SECTOR_SIZE};
use mcatools_benchmark::RegionMetrics;

fn load(path: &Path, mode: LoadMode, benchmark: Option<&RegionMetrics>) -> Result<Region> {
    log::info!("Loading region data from: {}", path.display());
    let (region, report) = Region::open_with(path, mode, benchmark)
        .with_context(|| format!("Failed to load region {}", path.display()))?;
    warn_report(&report);
    Ok(region)
}

fn warn_report(report: &LoadReport) {
    for failure in &report.failures {
        log::warn!("Skipped chunk ({}, {}): {}", failure.x, failure.z, failure.error);
    }
    for (x, z, kind) in &report.unexpected_compression {
        log::warn!("Chunk ({}, {}) has compression type {}, decoded as zlib", x, z, kind);
    }
    if !report.failures.is_empty() {
        log::warn!("{} chunks skipped, pass --strict to fail instead", report.failures.len());
    }
}

pub fn export_biome(
    region_path: &Path,
    image_path: &Path,
    mono: bool,
    mode: LoadMode,
    benchmark: Option<&RegionMetrics>,
) -> Result<()> {
    let region = load(region_path, mode, benchmark)?;
    let plane = region.plane().context("Failed to extract biomes")?;

    let file = File::create(image_path)
        .with_context(|| format!("Failed to create {}", image_path.display()))?;
    let writer = BufWriter::new(file);
    if mono {
        mcatools_biome::export_mono(&plane, writer)?;
    } else {
        mcatools_biome::export_rgb(&plane, writer)?;
    }
    println!("Biome data saved to: {}", image_path.display());
    Ok(())
}

pub fn import_biome(
    image_path: &Path,
    region_path: &Path,
    output: &Path,
    mode: LoadMode,
    benchmark: Option<&RegionMetrics>,
) -> Result<()> {
    let file = File::open(image_path)
        .with_context(|| format!("Failed to open {}", image_path.display()))?;
    let plane = mcatools_biome::import_rgb(BufReader::new(file))
        .with_context(|| format!("Failed to read biomes from {}", image_path.display()))?;

    let mut region = load(region_path, mode, benchmark)?;
    region.set_plane(plane).context("Failed to write biomes into chunks")?;

    let data = region.save_with(benchmark).context("Failed to rebuild region")?;
    std::fs::write(output, &data).with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Region with new biomes saved to: {} ({} chunks, {} bytes)",
        output.display(),
        region.occupied(),
        data.len()
    );
    Ok(())
}

#[derive(Serialize)]
struct ChunkSummary {
    x: usize,
    z: usize,
    offset: u32,
    sectors: u8,
    timestamp: u32,
}

#[derive(Serialize)]
struct RegionSummary {
    file: String,
    region: Option<(i32, i32)>,
    block_bounds: Option<(i32, i32, i32, i32)>,
    file_size: usize,
    chunks: Vec<ChunkSummary>,
    skipped: Vec<(usize, usize, String)>,
    unexpected_compression: Vec<(usize, usize, u8)>,
}

pub fn info(path: &Path, json: bool, mode: LoadMode, benchmark: Option<&RegionMetrics>) -> Result<()> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let (region, report): (Region, LoadReport) = Region::load_with(&data, mode, benchmark)
        .with_context(|| format!("Failed to load region {}", path.display()))?;

    let pos = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(RegionPos::from_filename);

    let summary = RegionSummary {
        file: path.display().to_string(),
        region: pos.map(|p| (p.x, p.z)),
        block_bounds: pos.map(|p| p.block_bounds()),
        file_size: data.len(),
        chunks: region
            .slots()
            .iter()
            .filter(|slot| !slot.is_empty())
            .map(|slot| ChunkSummary {
                x: slot.grid_x(),
                z: slot.grid_z(),
                offset: slot.location().offset,
                sectors: slot.location().sector_count,
                timestamp: slot.timestamp(),
            })
            .collect(),
        skipped: report
            .failures
            .iter()
            .map(|f| (f.x, f.z, f.error.to_string()))
            .collect(),
        unexpected_compression: report.unexpected_compression.clone(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("File: {}", summary.file);
    if let (Some((rx, rz)), Some((min_x, min_z, max_x, max_z))) = (summary.region, summary.block_bounds) {
        println!("Region: ({}, {}), blocks ({}, {}) to ({}, {})", rx, rz, min_x, min_z, max_x, max_z);
    }
    println!("Size: {} bytes ({} sectors)", summary.file_size, summary.file_size.div_ceil(SECTOR_SIZE));
    println!("Chunks: {} present, {} skipped", summary.chunks.len(), summary.skipped.len());
    let oldest = summary.chunks.iter().map(|c| c.timestamp).min();
    let newest = summary.chunks.iter().map(|c| c.timestamp).max();
    if let (Some(oldest), Some(newest)) = (oldest, newest) {
        println!("Timestamps: {} to {}", oldest, newest);
    }
    warn_report(&report);
    Ok(())
}

pub fn verify(path: &Path, benchmark: Option<&RegionMetrics>) -> Result<()> {
    let mut region = load(path, LoadMode::Strict, benchmark)?;
    let rebuilt = region.save_with(benchmark).context("Failed to rebuild region")?;
    let (reloaded, _): (Region, LoadReport) = Region::load_with(&rebuilt, LoadMode::Strict, None)
        .context("Rebuilt region does not load")?;

    for (before, after) in region.slots().iter().zip(reloaded.slots()) {
        let (x, z) = (before.grid_x(), before.grid_z());
        if before.is_empty() != after.is_empty() {
            bail!("Chunk ({}, {}) changed presence after rebuild", x, z);
        }
        if before.timestamp() != after.timestamp() {
            bail!("Chunk ({}, {}) changed timestamp after rebuild", x, z);
        }
        if before.payload() != after.payload() {
            bail!("Chunk ({}, {}) changed content after rebuild", x, z);
        }
    }

    let original_size = std::fs::metadata(path)?.len();
    println!(
        "OK: {} chunks verified, {} bytes on disk, {} bytes rebuilt",
        region.occupied(),
        original_size,
        rebuilt.len()
    );
    Ok(())
}

pub fn locate(block_x: i32, block_z: i32) {
    let pos = RegionPos::containing(block_x, block_z);
    let (min_x, min_z, max_x, max_z) = region_block_bounds(pos.x, pos.z);
    println!("{}", region_file_name(block_x, block_z));
    println!("Blocks ({}, {}) to ({}, {})", min_x, min_z, max_x, max_z);
}
