//! PNG rendering of a region's biome plane.
//!
//! Image column is x, image row is z: pixel `(x, z)` shows `plane[z][x]`.

use std::io::{Read, Write};

use mcatools_anvil::{BiomePlane, RegionError, REGION_WIDTH_BLOCKS};
use thiserror::Error;

use crate::colors::{from_rgb, to_rgb};

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("PNG encoding error: {0}")]
    Encoding(#[from] png::EncodingError),
    #[error("PNG decoding error: {0}")]
    Decoding(#[from] png::DecodingError),
    #[error("Image is {width}x{height}, expected {expected}x{expected}", expected = REGION_WIDTH_BLOCKS)]
    Dimensions { width: u32, height: u32 },
    #[error("Unsupported image colour type {0:?}, expected RGB or RGBA")]
    ColorType(png::ColorType),
    #[error(transparent)]
    Plane(#[from] RegionError),
}

const SIDE: u32 = REGION_WIDTH_BLOCKS as u32;

fn write_png<W: Write>(writer: W, color: png::ColorType, data: &[u8]) -> Result<(), ImageError> {
    let mut encoder = png::Encoder::new(writer, SIDE, SIDE);
    encoder.set_color(color);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;
    writer.finish()?;
    Ok(())
}

/// Colour every cell through the biome colour table.
pub fn export_rgb<W: Write>(plane: &BiomePlane, writer: W) -> Result<(), ImageError> {
    let data: Vec<u8> = plane.as_slice().iter().flat_map(|&id| to_rgb(id)).collect();
    write_png(writer, png::ColorType::Rgb, &data)
}

/// Greyscale, scaled so the largest id is white.
pub fn export_mono<W: Write>(plane: &BiomePlane, writer: W) -> Result<(), ImageError> {
    let max = plane.max().max(1) as i64;
    let data: Vec<u8> = plane
        .as_slice()
        .iter()
        .map(|&id| (id.max(0) as i64 * 255 / max).min(255) as u8)
        .collect();
    write_png(writer, png::ColorType::Grayscale, &data)
}

/// Read a 512x512 RGB(A) image back into biome ids. Colours missing from
/// the table map to the nearest known colour.
pub fn import_rgb<R: Read>(reader: R) -> Result<BiomePlane, ImageError> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;

    if info.width != SIDE || info.height != SIDE {
        return Err(ImageError::Dimensions {
            width: info.width,
            height: info.height,
        });
    }
    let channels = match info.color_type {
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        other => return Err(ImageError::ColorType(other)),
    };

    let mut cells = Vec::with_capacity(REGION_WIDTH_BLOCKS * REGION_WIDTH_BLOCKS);
    let mut approximated = 0usize;
    for row in buf[..info.buffer_size()].chunks_exact(info.line_size) {
        for pixel in row.chunks_exact(channels).take(REGION_WIDTH_BLOCKS) {
            let rgb = [pixel[0], pixel[1], pixel[2]];
            let id = from_rgb(rgb);
            if to_rgb(id) != rgb {
                approximated += 1;
            }
            cells.push(id);
        }
    }
    if approximated > 0 {
        log::warn!("{} pixels had no exact biome colour, used the nearest one", approximated);
    }
    Ok(BiomePlane::from_vec(cells)?)
}
