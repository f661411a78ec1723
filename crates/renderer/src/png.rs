//! PNG encoding for rendered tiles.
//!
//! Two encodings are produced:
//! - **Indexed (color type 3)** when the tile holds at most 256 distinct
//!   RGBA values, which covers nearly every palette-colored tile.
//! - **RGBA (color type 6)** otherwise, e.g. a tile using all 256 palette
//!   entries plus transparent pixels.

use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Write;

use coverage_common::CoverageError;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors of an indexed PNG.
const MAX_PNG_PALETTE: usize = 256;

/// Pixel count above which palette extraction runs in parallel.
const PARALLEL_THRESHOLD: usize = 4096;

type Rgba = (u8, u8, u8, u8);

/// Encode RGBA pixels, choosing indexed mode when the colors fit.
pub fn encode_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, CoverageError> {
    check_len(pixels, width, height)?;
    let extracted = if width * height >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match extracted {
        Some((palette, indices)) => encode_indexed(width, height, &palette, &indices),
        None => encode_rgba(pixels, width, height),
    }
}

fn check_len(pixels: &[u8], width: usize, height: usize) -> Result<(), CoverageError> {
    if pixels.len() != width * height * 4 {
        return Err(CoverageError::EncodeError(format!(
            "expected {} RGBA bytes for {}x{}, got {}",
            width * height * 4,
            width,
            height,
            pixels.len()
        )));
    }
    Ok(())
}

#[inline(always)]
fn pack(r: u8, g: u8, b: u8, a: u8) -> u32 {
    u32::from_le_bytes([r, g, b, a])
}

#[inline(always)]
fn unpack(packed: u32) -> Rgba {
    let [r, g, b, a] = packed.to_le_bytes();
    (r, g, b, a)
}

fn extract_palette_sequential(pixels: &[u8]) -> Option<(Vec<Rgba>, Vec<u8>)> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PNG_PALETTE);
    let mut palette = Vec::with_capacity(MAX_PNG_PALETTE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let key = pack(px[0], px[1], px[2], px[3]);
        let idx = match lookup.get(&key) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PNG_PALETTE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push((px[0], px[1], px[2], px[3]));
                lookup.insert(key, idx);
                idx
            }
        };
        indices.push(idx);
    }

    Some((palette, indices))
}

/// Collect distinct colors per chunk in parallel, merge, then map pixels to
/// indices in parallel.
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Vec<Rgba>, Vec<u8>)> {
    let chunk_px = (pixels.len() / 4 / rayon::current_num_threads()).max(256);

    let distinct: Vec<u32> = pixels
        .par_chunks(chunk_px * 4)
        .flat_map(|chunk| {
            let mut local: HashMap<u32, ()> = HashMap::with_capacity(MAX_PNG_PALETTE);
            for px in chunk.chunks_exact(4) {
                local.insert(pack(px[0], px[1], px[2], px[3]), ());
                if local.len() > MAX_PNG_PALETTE {
                    break;
                }
            }
            local.into_keys().collect::<Vec<_>>()
        })
        .collect();

    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PNG_PALETTE);
    let mut palette = Vec::with_capacity(MAX_PNG_PALETTE);
    for key in distinct {
        if lookup.contains_key(&key) {
            continue;
        }
        if palette.len() >= MAX_PNG_PALETTE {
            return None;
        }
        lookup.insert(key, palette.len() as u8);
        palette.push(unpack(key));
    }

    let mut indices = vec![0u8; pixels.len() / 4];
    indices
        .par_chunks_mut(chunk_px)
        .zip(pixels.par_chunks(chunk_px * 4))
        .for_each(|(out, src)| {
            for (idx, px) in out.iter_mut().zip(src.chunks_exact(4)) {
                *idx = lookup.get(&pack(px[0], px[1], px[2], px[3])).copied().unwrap_or(0);
            }
        });

    Some((palette, indices))
}

/// Indexed PNG from a palette and one index per pixel. A tRNS chunk is
/// written when any palette entry is not fully opaque.
pub fn encode_indexed(
    width: usize,
    height: usize,
    palette: &[Rgba],
    indices: &[u8],
) -> Result<Vec<u8>, CoverageError> {
    if indices.len() != width * height {
        return Err(CoverageError::EncodeError(format!(
            "expected {} palette indices, got {}",
            width * height,
            indices.len()
        )));
    }

    let mut png = Vec::with_capacity(64 + palette.len() * 4 + indices.len() / 4);
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    let plte: Vec<u8> = palette.iter().flat_map(|&(r, g, b, _)| [r, g, b]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|&(_, _, _, a)| a < 255) {
        let trns: Vec<u8> = palette.iter().map(|&(_, _, _, a)| a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(indices, width, height)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Truecolor-with-alpha PNG.
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, CoverageError> {
    check_len(pixels, width, height)?;
    let mut png = Vec::with_capacity(64 + pixels.len() / 4);
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6));
    let idat = deflate_scanlines(pixels, width * 4, height)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn ihdr(width: usize, height: usize, color_type: u8) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[0..4].copy_from_slice(&(width as u32).to_be_bytes());
    data[4..8].copy_from_slice(&(height as u32).to_be_bytes());
    data[8] = 8; // bit depth
    data[9] = color_type;
    // compression, filter and interlace methods stay 0
    data
}

fn write_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(kind);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix each `row_bytes` scanline with filter type 0 and zlib-compress.
fn deflate_scanlines(data: &[u8], row_bytes: usize, height: usize) -> Result<Vec<u8>, CoverageError> {
    let mut raw = Vec::with_capacity(height * (1 + row_bytes));
    for row in data.chunks_exact(row_bytes.max(1)).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&raw)
        .and_then(|_| encoder.finish())
        .map_err(|e| CoverageError::EncodeError(format!("IDAT compression failed: {}", e)))
}
