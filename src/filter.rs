//! Undoing the per-scanline filter PNG applies before compression.
//!
//! Only the non-interlaced, 8-bit-sample path is implemented: it is the
//! one directly exercised by the DEFLATE output without also needing
//! palette resolution or Adam7 de-interleaving, both left as extension
//! points.
use crate::errors::PngDecodeErrors;

const NONE: u8 = 0;
const SUB: u8 = 1;
const UP: u8 = 2;
const AVERAGE: u8 = 3;
const PAETH: u8 = 4;

/// Reverse PNG's scanline filtering, consuming the leading filter-type byte
/// of every row. `bpp` is the number of bytes per complete pixel (minimum
/// 1), used by Sub/Average/Paeth to find the "left" neighbour.
pub fn defilter(uncompressed: &[u8], scanline_bytes: usize, bpp: usize) -> Result<Vec<u8>, PngDecodeErrors> {
    let stride = scanline_bytes + 1;
    if stride == 0 || uncompressed.len() % stride != 0 {
        return Err(PngDecodeErrors::CorruptedFile(format!(
            "uncompressed data length {} is not a multiple of the scanline stride {}",
            uncompressed.len(),
            stride
        )));
    }
    let rows = uncompressed.len() / stride;
    let mut out = vec![0u8; rows * scanline_bytes];

    for row in 0..rows {
        let src = &uncompressed[row * stride..(row + 1) * stride];
        let filter_type = src[0];
        let raw = &src[1..];

        let (above, current_start) = out.split_at_mut(row * scanline_bytes);
        let current = &mut current_start[..scanline_bytes];
        let prior: &[u8] = if row == 0 {
            &[]
        } else {
            &above[(row - 1) * scanline_bytes..row * scanline_bytes]
        };

        for i in 0..scanline_bytes {
            let a = if i >= bpp { current[i - bpp] } else { 0 };
            let b = if row == 0 { 0 } else { prior[i] };
            let c = if row == 0 || i < bpp {
                0
            } else {
                prior[i - bpp]
            };

            current[i] = match filter_type {
                NONE => raw[i],
                SUB => raw[i].wrapping_add(a),
                UP => raw[i].wrapping_add(b),
                AVERAGE => raw[i].wrapping_add(((u16::from(a) + u16::from(b)) / 2) as u8),
                PAETH => raw[i].wrapping_add(paeth_predictor(a, b, c)),
                other => {
                    return Err(PngDecodeErrors::CorruptedFile(format!(
                        "unknown filter type {other} on row {row}"
                    )))
                }
            };
        }
    }

    Ok(out)
}

/// The PNG-standard Paeth predictor (PNG §6.2): picks whichever of the
/// left, above, or upper-left neighbour is closest to `a + b - c`.
fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let p = i32::from(a) + i32::from(b) - i32::from(c);
    let pa = (p - i32::from(a)).abs();
    let pb = (p - i32::from(b)).abs();
    let pc = (p - i32::from(c)).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}
