//! Fixed tables and magic numbers from the PNG and DEFLATE specifications.

/// The 8 magic bytes every PNG datastream must begin with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

pub const IHDR: [u8; 4] = *b"IHDR";
pub const PLTE: [u8; 4] = *b"PLTE";
pub const IDAT: [u8; 4] = *b"IDAT";
pub const IEND: [u8; 4] = *b"IEND";
pub const GAMA: [u8; 4] = *b"gAMA";

/// Default value for [`crate::options::PngOptions::max_width`]/`max_height`.
pub const PNG_MAX_IMAGE_SIZE: u32 = 1 << 24;

/// Default initial capacity for the accumulated `IDAT` buffer.
pub const IDAT_DEFAULT_BLOCK_SIZE: usize = 4096;

/// RFC 1951 length code base values, indexed by `symbol - 257`.
pub const LEN_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// RFC 1951 extra bits to read after each length base, same indexing.
pub const LEN_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// RFC 1951 distance code base values, indexed by distance symbol.
pub const DIST_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// RFC 1951 extra bits to read after each distance base, same indexing.
pub const DIST_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// The order code-length code lengths are transmitted in for a dynamic
/// Huffman block (RFC 1951 §3.2.7).
pub const CL_ORDER: [u8; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Code lengths for the fixed literal/length Huffman table (RFC 1951 §3.2.6).
pub const FIXED_LIT_LENS: [u8; 288] = fixed_lit_lengths();
/// Code lengths for the fixed distance Huffman table.
pub const FIXED_DIST_LENS: [u8; 32] = [5; 32];

const fn fixed_lit_lengths() -> [u8; 288] {
    let mut t = [0u8; 288];
    let mut i = 0;
    while i <= 143 {
        t[i] = 8;
        i += 1;
    }
    while i <= 255 {
        t[i] = 9;
        i += 1;
    }
    while i <= 279 {
        t[i] = 7;
        i += 1;
    }
    while i <= 287 {
        t[i] = 8;
        i += 1;
    }
    t
}

/// Size, in bytes, of the DEFLATE sliding window (RFC 1951 §2).
pub const WINDOW_SIZE: usize = 32 * 1024;
