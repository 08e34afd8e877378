//! CRC-32 (ISO 3309 / ITU-T V.42), the checksum every PNG chunk carries.
use std::sync::OnceLock;

const POLY: u32 = 0xEDB8_8320;

fn table() -> &'static [u32; 256] {
    static TABLE: OnceLock<[u32; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0u32; 256];
        let mut n = 0;
        while n < 256 {
            let mut c = n as u32;
            let mut k = 0;
            while k < 8 {
                c = if c & 1 != 0 { POLY ^ (c >> 1) } else { c >> 1 };
                k += 1;
            }
            table[n] = c;
            n += 1;
        }
        table
    })
}

/// CRC-32 over `type || data`, the exact span a PNG chunk's trailing CRC
/// field covers.
pub fn crc32(type_and_data: &[u8]) -> u32 {
    let table = table();
    let mut c = 0xFFFF_FFFFu32;
    for &byte in type_and_data {
        c = table[((c ^ u32::from(byte)) & 0xFF) as usize] ^ (c >> 8);
    }
    c ^ 0xFFFF_FFFF
}

/// Adler-32 (RFC 1950 §9), the trailer on a zlib stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Adler32 {
    const MOD: u32 = 65521;

    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        // NMAX would let us defer the modulo for speed; a plain per-byte
        // reduction is simpler and this crate never adler-checks images
        // bigger than a few megabytes in one call.
        for &byte in bytes {
            self.a = (self.a + u32::from(byte)) % Self::MOD;
            self.b = (self.b + self.a) % Self::MOD;
        }
    }

    pub fn finish(&self) -> u32 {
        (self.b << 16) | self.a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_of_iend_matches_known_value() {
        // IEND always carries this CRC since it never has a data field.
        assert_eq!(crc32(b"IEND"), 0xAE42_6082);
    }

    #[test]
    fn adler32_of_empty_input_is_one() {
        assert_eq!(Adler32::new().finish(), 1);
    }

    #[test]
    fn adler32_matches_known_value() {
        let mut a = Adler32::new();
        a.update(b"Wikipedia");
        assert_eq!(a.finish(), 0x11E6_0398);
    }
}
