//! Reading one PNG chunk off the byte stream.
use crate::errors::PngDecodeErrors;

/// One `length || type || data || crc` unit of a PNG datastream.
pub struct Chunk<'a> {
    pub length: u32,
    pub chunk_type: [u8; 4],
    pub data: &'a [u8],
    pub crc: u32,
}

impl<'a> Chunk<'a> {
    /// True when bit 5 of the type's first byte is set, marking this an
    /// ancillary (safely skippable) chunk rather than a critical one.
    pub fn is_ancillary(&self) -> bool {
        self.chunk_type[0] & 0x20 != 0
    }

    pub fn type_as_str(&self) -> String {
        String::from_utf8_lossy(&self.chunk_type).into_owned()
    }
}

/// A forward-only cursor over a PNG byte buffer.
pub struct Reader<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], PngDecodeErrors> {
        let end = self
            .cursor
            .checked_add(n)
            .filter(|&e| e <= self.data.len())
            .ok_or_else(|| {
                PngDecodeErrors::InvalidFile(format!(
                    "tried to read {n} bytes at offset {}, but only {} remain",
                    self.cursor,
                    self.data.len().saturating_sub(self.cursor)
                ))
            })?;
        let slice = &self.data[self.cursor..end];
        self.cursor = end;
        Ok(slice)
    }

    pub fn read_signature(&mut self) -> Result<(), PngDecodeErrors> {
        let sig = self.take(8)?;
        if sig != crate::constants::PNG_SIGNATURE {
            return Err(PngDecodeErrors::BadSignature);
        }
        Ok(())
    }

    /// Read one chunk header plus its data and trailing CRC.
    pub fn read_chunk(&mut self) -> Result<Chunk<'a>, PngDecodeErrors> {
        let length_bytes = self.take(4)?;
        let length = u32::from_be_bytes(length_bytes.try_into().unwrap());

        let type_bytes = self.take(4)?;
        let chunk_type: [u8; 4] = type_bytes.try_into().unwrap();

        let data = self.take(length as usize)?;

        let crc_bytes = self.take(4)?;
        let crc = u32::from_be_bytes(crc_bytes.try_into().unwrap());

        Ok(Chunk {
            length,
            chunk_type,
            data,
            crc,
        })
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_chunk(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
        bytes.extend_from_slice(chunk_type);
        bytes.extend_from_slice(data);
        let crc = crate::crc::crc32(&[chunk_type.as_slice(), data].concat());
        bytes.extend_from_slice(&crc.to_be_bytes());
        bytes
    }

    #[test]
    fn reads_a_well_formed_chunk() {
        let bytes = build_chunk(b"IDAT", &[1, 2, 3]);
        let mut reader = Reader::new(&bytes);
        let chunk = reader.read_chunk().unwrap();
        assert_eq!(&chunk.chunk_type, b"IDAT");
        assert_eq!(chunk.data, &[1, 2, 3]);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn truncated_chunk_is_an_error() {
        let mut bytes = build_chunk(b"IDAT", &[1, 2, 3]);
        bytes.truncate(bytes.len() - 2);
        let mut reader = Reader::new(&bytes);
        assert!(reader.read_chunk().is_err());
    }

    #[test]
    fn ancillary_bit_is_detected() {
        let bytes = build_chunk(b"tEXt", &[]);
        let chunk = Reader::new(&bytes).read_chunk().unwrap();
        assert!(chunk.is_ancillary());

        let bytes = build_chunk(b"IDAT", &[]);
        let chunk = Reader::new(&bytes).read_chunk().unwrap();
        assert!(!chunk.is_ancillary());
    }
}
