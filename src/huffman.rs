#![allow(clippy::similar_names, clippy::module_name_repetitions)]
use crate::errors::PngDecodeErrors;

/// Bits of direct lookahead the fast table gives us before falling back to
/// the bit-by-bit walk.
pub const MAX_CODE_BITS: u32 = 15;

/// A canonical Huffman table built from a vector of per-symbol code lengths.
///
/// Entries are indexed by the *bit-reversed* next [`MAX_CODE_BITS`] bits of
/// the stream, which is what lets decoding be a single peek plus a table
/// lookup: DEFLATE codes are conceptually MSB-first, but our bit reader
/// hands out bits LSB-first, and reversing the code at table-build time
/// reconciles the two without reversing anything at decode time.
pub struct HuffmanTable {
    /// `bits_used == 0` marks an entry whose prefix is not a valid code.
    entries: Vec<(u8, u16)>,
    max_bits: u32,
}

impl HuffmanTable {
    /// Build a table from `lens[i]` = code length of symbol `i`, 0 meaning
    /// "symbol unused". `lens` may be shorter than its nominal alphabet
    /// size when building, e.g., the HDIST portion of a dynamic block.
    pub fn build(lens: &[u8]) -> Result<Self, PngDecodeErrors> {
        let max_bits = lens.iter().copied().max().unwrap_or(0) as u32;
        if max_bits == 0 {
            // An empty code is legal for the distance alphabet when a
            // dynamic block has no back-references at all.
            trace!("huffman table built: {} symbols, empty code", lens.len());
            return Ok(Self {
                entries: vec![(0, 0); 1],
                max_bits: 0,
            });
        }
        if max_bits > MAX_CODE_BITS {
            return Err(PngDecodeErrors::BadHuffmanCodeLengths(format!(
                "code length {max_bits} exceeds {MAX_CODE_BITS}"
            )));
        }

        let mut hist = [0u32; (MAX_CODE_BITS + 1) as usize];
        for &l in lens {
            if l > 0 {
                hist[l as usize] += 1;
            }
        }

        // verify the lengths form a complete (or legally incomplete, for
        // the single-symbol case) code before handing out codes.
        let mut used = 0u32;
        for len in 1..=max_bits {
            used = (used << 1) + hist[len as usize];
        }
        if used > 1 << max_bits {
            return Err(PngDecodeErrors::BadHuffmanCodeLengths(
                "code lengths overfill the codespace".to_string(),
            ));
        }

        let mut next_code = [0u32; (MAX_CODE_BITS + 2) as usize];
        let mut code = 0u32;
        for len in 1..=max_bits {
            code = (code + hist[(len - 1) as usize]) << 1;
            next_code[len as usize] = code;
        }

        let table_size = 1usize << max_bits;
        let mut entries = vec![(0u8, 0u16); table_size];

        for (symbol, &len) in lens.iter().enumerate() {
            if len == 0 {
                continue;
            }
            let len = u32::from(len);
            let c = next_code[len as usize];
            next_code[len as usize] += 1;

            let reversed = reverse_bits(c, len);
            let stride = 1u32 << len;
            let mut index = reversed;
            while index < table_size as u32 {
                entries[index as usize] = (len as u8, symbol as u16);
                index += stride;
            }
        }

        trace!(
            "huffman table built: {} symbols, max_bits={max_bits}",
            lens.len()
        );
        Ok(Self { entries, max_bits })
    }

    /// Decode one symbol, consuming its bits from `reader`.
    pub fn decode(
        &self, reader: &mut crate::bitstream::BitReader,
    ) -> Result<u16, PngDecodeErrors> {
        if self.max_bits == 0 {
            return Err(PngDecodeErrors::CorruptedFile(
                "attempted to decode from an empty huffman table".to_string(),
            ));
        }
        reader.refill();
        let peek = reader.peek(self.max_bits);
        let (bits_used, symbol) = self.entries[peek as usize];
        if bits_used == 0 {
            return Err(PngDecodeErrors::CorruptedFile(
                "invalid huffman code in bit stream".to_string(),
            ));
        }
        reader.consume(u32::from(bits_used));
        Ok(symbol)
    }
}

fn reverse_bits(code: u32, n: u32) -> u32 {
    let mut result = 0u32;
    let mut c = code;
    for _ in 0..n {
        result = (result << 1) | (c & 1);
        c >>= 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::BitReader;
    use crate::constants::{FIXED_DIST_LENS, FIXED_LIT_LENS};

    #[test]
    fn fixed_literal_table_decodes_byte_value_zero() {
        // symbol 0 has an 8-bit code; the fixed code assigns codes in
        // increasing order starting at 0b00110000 for symbol 0 (RFC 1951
        // 3.2.6), which bit-reversed is 0b00001100.
        let table = HuffmanTable::build(&FIXED_LIT_LENS).unwrap();
        let code: u32 = 0b0011_0000;
        let reversed = reverse_bits(code, 8);
        let mut reader = BitReader::new(&[reversed as u8]);
        assert_eq!(table.decode(&mut reader).unwrap(), 0);
    }

    #[test]
    fn fixed_distance_table_has_32_five_bit_codes() {
        let table = HuffmanTable::build(&FIXED_DIST_LENS).unwrap();
        assert_eq!(table.max_bits, 5);
        assert_eq!(table.entries.len(), 32);
    }

    #[test]
    fn overlong_code_length_is_rejected() {
        let mut lens = vec![0u8; 300];
        lens[0] = 16;
        assert!(HuffmanTable::build(&lens).is_err());
    }
}
