//! Error types returned by a decode.
use std::fmt::{Display, Formatter};

/// All the ways a PNG decode can fail.
///
/// Every fallible function in this crate returns one of these through a
/// `Result`, matching the single non-zero error taxonomy a C caller would
/// see through an out-parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PngDecodeErrors {
    /// The first 8 bytes did not match the PNG magic.
    BadSignature,
    /// A chunk type this decoder has no handling for, and which is not
    /// marked ancillary, was encountered.
    TypeNotSupported(String),
    /// The byte stream ended, or a length field pointed past the end of the
    /// buffer.
    InvalidFile(String),
    /// The first chunk in the stream was not `IHDR`.
    IhdrNotFound,
    /// `IHDR` appeared more than once.
    MultipleIhdr,
    /// `IHDR` did not carry exactly 13 bytes of data.
    CorruptIhdr,
    /// `bit_depth` was not one of 1, 2, 4, 8, 16.
    BadBitDepth(u8),
    /// `colour_type` was not one of 0, 2, 3, 4, 6.
    BadColourType(u8),
    /// The (colour_type, bit_depth) pair is not a combination PNG allows.
    BadBitDepthCombination(u8, u8),
    /// `interlace_method` was not 0 or 1.
    BadInterlace(u8),
    /// `width` or `height` exceeded the configured maximum.
    ImageTooBig(u32, u32),
    /// `width` or `height` was zero.
    ZeroSize,
    /// No `IDAT` chunk was present before `IEND`.
    NoIdat,
    /// `colour_type == 3` but no `PLTE` chunk was present.
    NoPlte,
    /// `PLTE` appeared for a colour type that forbids it.
    UnexpectedPlte,
    /// `gAMA` appeared after `PLTE`.
    GamaAfterPlte,
    /// `gAMA` appeared more than once.
    MultipleGama,
    /// The accumulated `IDAT` payload exceeded the configured size limit.
    IdatSizeLimit,
    /// A chunk's CRC-32 did not match the value stored on the wire.
    CrcMismatch(String),
    /// The 2-byte zlib header failed its FCHECK or named an unsupported
    /// compression method.
    ZlibHeaderCorrupted(String),
    /// The zlib header's compression method field was not 8 (DEFLATE).
    ZlibCompression(u8),
    /// The zlib header requested a preset dictionary, which PNG forbids.
    PresetDict,
    /// A field inside the zlib/DEFLATE stream held a value outside its
    /// legal range.
    InvalidZlibValue(String),
    /// A dynamic Huffman block's code-length vector did not describe a
    /// valid canonical code.
    BadHuffmanCodeLengths(String),
    /// Decompression, CRC accumulation, or Adler-32 verification hit
    /// malformed data not covered by a more specific variant.
    CorruptedFile(String),
    /// A buffer grew past the size budget derived from the image's own
    /// declared dimensions (a decompression-bomb guard, not an allocator
    /// failure).
    OutOfMemory,
    /// The allocator itself refused to grow a buffer.
    MemoryError(String),
}

impl Display for PngDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadSignature => write!(f, "first 8 bytes are not the PNG signature"),
            Self::TypeNotSupported(t) => write!(f, "unsupported critical chunk type `{t}`"),
            Self::InvalidFile(msg) => write!(f, "invalid file: {msg}"),
            Self::IhdrNotFound => write!(f, "first chunk is not IHDR"),
            Self::MultipleIhdr => write!(f, "more than one IHDR chunk"),
            Self::CorruptIhdr => write!(f, "IHDR data is not 13 bytes"),
            Self::BadBitDepth(b) => write!(f, "bit depth {b} is not one of 1,2,4,8,16"),
            Self::BadColourType(c) => write!(f, "colour type {c} is not one of 0,2,3,4,6"),
            Self::BadBitDepthCombination(c, b) => {
                write!(f, "colour type {c} does not permit bit depth {b}")
            }
            Self::BadInterlace(i) => write!(f, "interlace method {i} is not 0 or 1"),
            Self::ImageTooBig(w, h) => write!(f, "image {w}x{h} exceeds the configured maximum"),
            Self::ZeroSize => write!(f, "width or height is zero"),
            Self::NoIdat => write!(f, "no IDAT chunk before IEND"),
            Self::NoPlte => write!(f, "indexed colour image has no PLTE chunk"),
            Self::UnexpectedPlte => write!(f, "PLTE chunk not allowed for this colour type"),
            Self::GamaAfterPlte => write!(f, "gAMA chunk appeared after PLTE"),
            Self::MultipleGama => write!(f, "more than one gAMA chunk"),
            Self::IdatSizeLimit => write!(f, "accumulated IDAT data exceeds the size limit"),
            Self::CrcMismatch(chunk) => write!(f, "CRC mismatch in {chunk} chunk"),
            Self::ZlibHeaderCorrupted(msg) => write!(f, "zlib header corrupted: {msg}"),
            Self::ZlibCompression(m) => write!(f, "zlib compression method {m} is not DEFLATE"),
            Self::PresetDict => write!(f, "zlib stream requests a preset dictionary"),
            Self::InvalidZlibValue(msg) => write!(f, "invalid value in zlib stream: {msg}"),
            Self::BadHuffmanCodeLengths(msg) => write!(f, "bad huffman code lengths: {msg}"),
            Self::CorruptedFile(msg) => write!(f, "corrupted deflate stream: {msg}"),
            Self::OutOfMemory => write!(f, "decode exceeded the allowed memory budget"),
            Self::MemoryError(msg) => write!(f, "allocation failed: {msg}"),
        }
    }
}

impl std::error::Error for PngDecodeErrors {}
