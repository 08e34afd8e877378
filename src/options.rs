//! Runtime-tunable limits for a decode.
//!
//! These mirror what a JPEG decoder in this family exposes through
//! `ZuneJpegOptions`: knobs that used to be compile-time constants become
//! fields on a small `Copy` struct so a single binary can decode untrusted
//! input conservatively and trusted input loosely without recompiling.
use crate::constants::{IDAT_DEFAULT_BLOCK_SIZE, PNG_MAX_IMAGE_SIZE};

#[derive(Debug, Clone, Copy)]
pub struct PngOptions {
    max_width: u32,
    max_height: u32,
    check_crc: bool,
    idat_initial_capacity: usize,
    skip_ancillary_unknown: bool,
}

impl Default for PngOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PngOptions {
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_width: PNG_MAX_IMAGE_SIZE,
            max_height: PNG_MAX_IMAGE_SIZE,
            // on by default: a disabled-by-default CRC check is how a lot
            // of image decoders end up shipping undetected bit-rot bugs.
            check_crc: true,
            idat_initial_capacity: IDAT_DEFAULT_BLOCK_SIZE,
            skip_ancillary_unknown: true,
        }
    }

    #[must_use]
    pub fn set_max_width(mut self, max_width: u32) -> Self {
        self.max_width = max_width;
        self
    }

    #[must_use]
    pub fn set_max_height(mut self, max_height: u32) -> Self {
        self.max_height = max_height;
        self
    }

    #[must_use]
    pub fn set_check_crc(mut self, check_crc: bool) -> Self {
        self.check_crc = check_crc;
        self
    }

    #[must_use]
    pub fn set_idat_initial_capacity(mut self, capacity: usize) -> Self {
        self.idat_initial_capacity = capacity;
        self
    }

    #[must_use]
    pub fn set_skip_ancillary_unknown(mut self, skip: bool) -> Self {
        self.skip_ancillary_unknown = skip;
        self
    }

    pub const fn max_width(&self) -> u32 {
        self.max_width
    }

    pub const fn max_height(&self) -> u32 {
        self.max_height
    }

    pub const fn check_crc(&self) -> bool {
        self.check_crc
    }

    pub const fn idat_initial_capacity(&self) -> usize {
        self.idat_initial_capacity
    }

    pub const fn skip_ancillary_unknown(&self) -> bool {
        self.skip_ancillary_unknown
    }
}
