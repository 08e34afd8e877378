//! The DEFLATE block decoder (RFC 1951) and its zlib envelope (RFC 1950).
use crate::bitstream::BitReader;
use crate::constants::{
    CL_ORDER, DIST_BASE, DIST_EXTRA, FIXED_DIST_LENS, FIXED_LIT_LENS, LEN_BASE, LEN_EXTRA,
    WINDOW_SIZE,
};
use crate::crc::Adler32;
use crate::errors::PngDecodeErrors;
use crate::huffman::HuffmanTable;

const BTYPE_STORED: u32 = 0;
const BTYPE_FIXED: u32 = 1;
const BTYPE_DYNAMIC: u32 = 2;

/// Reserve `additional` more bytes in `out`, turning an allocator failure
/// into a [`PngDecodeErrors::MemoryError`] instead of an abort.
fn try_grow(out: &mut Vec<u8>, additional: usize) -> Result<(), PngDecodeErrors> {
    out.try_reserve(additional)
        .map_err(|e| PngDecodeErrors::MemoryError(e.to_string()))
}

/// Inflate a zlib-wrapped DEFLATE stream (the form every `IDAT` payload
/// concatenates to). `max_output_bytes` bounds the decompressed size,
/// independent of how small the compressed input is, since a handful of
/// maximal-length back-references can otherwise inflate without bound.
pub fn decode_zlib(data: &[u8], max_output_bytes: usize) -> Result<Vec<u8>, PngDecodeErrors> {
    if data.len() < 2 {
        return Err(PngDecodeErrors::ZlibHeaderCorrupted(
            "stream shorter than the 2-byte header".to_string(),
        ));
    }
    let cmf = data[0];
    let flg = data[1];

    if (u16::from(cmf) * 256 + u16::from(flg)) % 31 != 0 {
        return Err(PngDecodeErrors::ZlibHeaderCorrupted(
            "FCHECK integrity not preserved".to_string(),
        ));
    }

    let method = cmf & 0x0F;
    if method != 8 {
        return Err(PngDecodeErrors::ZlibCompression(method));
    }
    let cinfo = cmf >> 4;
    if cinfo > 7 {
        return Err(PngDecodeErrors::ZlibHeaderCorrupted(format!(
            "cinfo {cinfo} greater than 7"
        )));
    }
    if flg & 0x20 != 0 {
        return Err(PngDecodeErrors::PresetDict);
    }
    debug!("zlib header accepted (cinfo={cinfo})");

    if data.len() < 6 {
        return Err(PngDecodeErrors::ZlibHeaderCorrupted(
            "no room for an Adler-32 trailer".to_string(),
        ));
    }
    let body = &data[2..data.len() - 4];
    let out = decode_deflate(body, max_output_bytes)?;

    let mut adler = Adler32::new();
    adler.update(&out);
    let expected = u32::from_be_bytes(data[data.len() - 4..].try_into().unwrap());
    if adler.finish() != expected {
        return Err(PngDecodeErrors::CorruptedFile(
            "adler-32 checksum mismatch".to_string(),
        ));
    }

    Ok(out)
}

/// Decode a raw DEFLATE stream (no zlib framing) into its output bytes,
/// rejecting growth past `max_output_bytes`.
pub fn decode_deflate(data: &[u8], max_output_bytes: usize) -> Result<Vec<u8>, PngDecodeErrors> {
    let mut reader = BitReader::new(data);
    let mut out = Vec::new();

    loop {
        let bfinal = reader.get_bits(1)?;
        let btype = reader.get_bits(2)?;
        trace!("deflate block: bfinal={bfinal} btype={btype}");

        match btype {
            BTYPE_STORED => decode_stored_block(&mut reader, &mut out, max_output_bytes)?,
            BTYPE_FIXED => {
                let lit = HuffmanTable::build(&FIXED_LIT_LENS)?;
                let dist = HuffmanTable::build(&FIXED_DIST_LENS)?;
                decode_huffman_block(&mut reader, &lit, &dist, &mut out, max_output_bytes)?;
            }
            BTYPE_DYNAMIC => {
                let (lit, dist) = read_dynamic_tables(&mut reader)?;
                decode_huffman_block(&mut reader, &lit, &dist, &mut out, max_output_bytes)?;
            }
            _ => {
                return Err(PngDecodeErrors::CorruptedFile(
                    "BTYPE 11 is reserved".to_string(),
                ))
            }
        }

        if bfinal == 1 {
            break;
        }
    }

    Ok(out)
}

fn decode_stored_block(
    reader: &mut BitReader, out: &mut Vec<u8>, max_output_bytes: usize,
) -> Result<(), PngDecodeErrors> {
    reader.align_to_byte();
    let len = reader.get_bits(16)?;
    let nlen = reader.get_bits(16)?;
    if len != (!nlen & 0xFFFF) {
        return Err(PngDecodeErrors::CorruptedFile(
            "stored block LEN/NLEN mismatch".to_string(),
        ));
    }
    if out.len() + len as usize > max_output_bytes {
        return Err(PngDecodeErrors::OutOfMemory);
    }
    let start = reader.byte_position();
    try_grow(out, len as usize)?;
    for i in 0..len as usize {
        out.push(
            *reader
                .underlying()
                .get(start + i)
                .ok_or_else(|| PngDecodeErrors::CorruptedFile("stored block truncated".into()))?,
        );
    }
    reader.skip_bytes(len as usize);
    Ok(())
}

fn read_dynamic_tables(
    reader: &mut BitReader,
) -> Result<(HuffmanTable, HuffmanTable), PngDecodeErrors> {
    let hlit = reader.get_bits(5)? as usize + 257;
    let hdist = reader.get_bits(5)? as usize + 1;
    let hclen = reader.get_bits(4)? as usize + 4;

    let mut cl_lens = [0u8; 19];
    for i in 0..hclen {
        cl_lens[CL_ORDER[i] as usize] = reader.get_bits(3)? as u8;
    }
    let cl_table = HuffmanTable::build(&cl_lens)?;

    let total = hlit + hdist;
    let mut lens = vec![0u8; total];
    let mut i = 0;
    while i < total {
        let sym = cl_table.decode(reader)?;
        match sym {
            0..=15 => {
                lens[i] = sym as u8;
                i += 1;
            }
            16 => {
                if i == 0 {
                    return Err(PngDecodeErrors::BadHuffmanCodeLengths(
                        "repeat code 16 with no previous length".to_string(),
                    ));
                }
                let rep = reader.get_bits(2)? as usize + 3;
                let val = lens[i - 1];
                fill_lengths(&mut lens, &mut i, total, val, rep)?;
            }
            17 => {
                let rep = reader.get_bits(3)? as usize + 3;
                fill_lengths(&mut lens, &mut i, total, 0, rep)?;
            }
            18 => {
                let rep = reader.get_bits(7)? as usize + 11;
                fill_lengths(&mut lens, &mut i, total, 0, rep)?;
            }
            _ => {
                return Err(PngDecodeErrors::BadHuffmanCodeLengths(format!(
                    "unexpected code-length symbol {sym}"
                )))
            }
        }
    }
    if i != total {
        return Err(PngDecodeErrors::BadHuffmanCodeLengths(
            "code length run overshot HLIT+HDIST".to_string(),
        ));
    }

    let lit = HuffmanTable::build(&lens[..hlit])?;
    let dist = HuffmanTable::build(&lens[hlit..])?;
    Ok((lit, dist))
}

fn fill_lengths(
    lens: &mut [u8], i: &mut usize, total: usize, val: u8, count: usize,
) -> Result<(), PngDecodeErrors> {
    if *i + count > total {
        return Err(PngDecodeErrors::BadHuffmanCodeLengths(
            "repeat run overshoots the code length vector".to_string(),
        ));
    }
    lens[*i..*i + count].fill(val);
    *i += count;
    Ok(())
}

fn decode_huffman_block(
    reader: &mut BitReader, lit: &HuffmanTable, dist: &HuffmanTable, out: &mut Vec<u8>,
    max_output_bytes: usize,
) -> Result<(), PngDecodeErrors> {
    loop {
        let sym = lit.decode(reader)?;
        if sym < 256 {
            if out.len() + 1 > max_output_bytes {
                return Err(PngDecodeErrors::OutOfMemory);
            }
            try_grow(out, 1)?;
            out.push(sym as u8);
            continue;
        }
        if sym == 256 {
            return Ok(());
        }
        let len_idx = (sym - 257) as usize;
        if len_idx >= LEN_BASE.len() {
            return Err(PngDecodeErrors::CorruptedFile(format!(
                "literal/length symbol {sym} out of range"
            )));
        }
        let extra = reader.get_bits(u32::from(LEN_EXTRA[len_idx]))?;
        let length = usize::from(LEN_BASE[len_idx]) + extra as usize;

        let dist_sym = dist.decode(reader)? as usize;
        if dist_sym >= DIST_BASE.len() {
            return Err(PngDecodeErrors::CorruptedFile(format!(
                "distance symbol {dist_sym} out of range"
            )));
        }
        let dextra = reader.get_bits(u32::from(DIST_EXTRA[dist_sym]))?;
        let distance = usize::from(DIST_BASE[dist_sym]) + dextra as usize;

        if distance == 0 || distance > out.len() {
            return Err(PngDecodeErrors::CorruptedFile(format!(
                "back-reference distance {distance} exceeds {} decoded bytes",
                out.len()
            )));
        }
        if distance > WINDOW_SIZE {
            return Err(PngDecodeErrors::CorruptedFile(format!(
                "back-reference distance {distance} exceeds the {WINDOW_SIZE}-byte sliding window"
            )));
        }
        if length > 258 {
            return Err(PngDecodeErrors::CorruptedFile(format!(
                "back-reference length {length} exceeds the DEFLATE maximum"
            )));
        }
        if out.len() + length > max_output_bytes {
            return Err(PngDecodeErrors::OutOfMemory);
        }

        // byte-by-byte so overlapping copies (distance < length) reproduce
        // the run-length pattern the encoder intended.
        try_grow(out, length)?;
        let start = out.len() - distance;
        for j in 0..length {
            let byte = out[start + j];
            out.push(byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deflate_stored_block(payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        // BFINAL=1, BTYPE=00 packed into the low 3 bits of the first byte.
        bytes.push(0b001);
        let len = payload.len() as u16;
        bytes.extend_from_slice(&len.to_le_bytes());
        bytes.extend_from_slice(&(!len).to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    const NO_LIMIT: usize = usize::MAX;

    fn adler32(data: &[u8]) -> u32 {
        let mut adler = Adler32::new();
        adler.update(data);
        adler.finish()
    }

    fn zlib_wrap(deflate: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut out = vec![0x78, 0x01];
        out.extend_from_slice(deflate);
        out.extend_from_slice(&adler32(payload).to_be_bytes());
        out
    }

    #[test]
    fn stored_block_round_trips() {
        let payload = b"hello, png".to_vec();
        let raw = deflate_stored_block(&payload);
        let out = decode_deflate(&raw, NO_LIMIT).unwrap();
        assert_eq!(out, payload);
    }

    #[test]
    fn stored_block_rejects_len_nlen_mismatch() {
        let mut raw = deflate_stored_block(b"abc");
        raw[3] ^= 0xFF; // corrupt one byte of NLEN
        assert!(decode_deflate(&raw, NO_LIMIT).is_err());
    }

    #[test]
    fn stored_block_rejects_output_over_the_configured_limit() {
        let raw = deflate_stored_block(b"hello, png");
        assert_eq!(decode_deflate(&raw, 4), Err(PngDecodeErrors::OutOfMemory));
    }

    #[test]
    fn zlib_header_rejects_bad_fcheck() {
        let bytes = [0x78, 0x00, 0, 0, 0, 0];
        assert!(matches!(
            decode_zlib(&bytes, NO_LIMIT),
            Err(PngDecodeErrors::ZlibHeaderCorrupted(_))
        ));
    }

    #[test]
    fn zlib_header_rejects_preset_dictionary() {
        // 0x78 0x3D has a valid FCHECK but sets the FDICT bit.
        let mut header = [0x78u8, 0x20];
        while (u16::from(header[0]) * 256 + u16::from(header[1])) % 31 != 0 {
            header[1] += 1;
        }
        header[1] |= 0x20;
        let mut bytes = header.to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        assert_eq!(
            decode_zlib(&bytes, NO_LIMIT),
            Err(PngDecodeErrors::PresetDict)
        );
    }

    #[test]
    fn zlib_rejects_bad_method_only_after_fcheck_passes() {
        // cmf=0x79 (method 9, cinfo 7), flg chosen so FCHECK also fails:
        // FCHECK is checked first, so it must be the error that wins.
        let bytes = [0x79, 0x00, 0, 0, 0, 0];
        assert_ne!((u16::from(bytes[0]) * 256 + u16::from(bytes[1])) % 31, 0);
        assert!(matches!(
            decode_zlib(&bytes, NO_LIMIT),
            Err(PngDecodeErrors::ZlibHeaderCorrupted(_))
        ));
    }

    /// S12: a malformed Adler-32 trailer is rejected even though the
    /// DEFLATE payload it wraps is perfectly valid.
    #[test]
    fn corrupted_adler32_trailer_is_rejected() {
        let payload = b"hello, png".to_vec();
        let deflate = deflate_stored_block(&payload);
        let mut zlib = zlib_wrap(&deflate, &payload);
        let last = zlib.len() - 1;
        zlib[last] ^= 0xFF;
        assert_eq!(
            decode_zlib(&zlib, NO_LIMIT),
            Err(PngDecodeErrors::CorruptedFile(
                "adler-32 checksum mismatch".to_string()
            ))
        );
    }
}
