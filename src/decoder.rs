//! The chunk state machine: signature, `IHDR` validation, ordering and
//! multiplicity rules, `IDAT` accumulation, and the `IEND` handoff into
//! zlib/DEFLATE.
use crate::chunk::{Chunk, Reader};
use crate::constants::{GAMA, IDAT, IEND, IHDR, PLTE};
use crate::errors::PngDecodeErrors;
use crate::filter::defilter;
use crate::inflate::decode_zlib;
use crate::options::PngOptions;

/// The colour types PNG defines (PNG §11.2.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub enum ColourType {
    Greyscale,
    Truecolour,
    Indexed,
    GreyscaleAlpha,
    TruecolourAlpha,
}

impl ColourType {
    fn from_byte(b: u8) -> Result<Self, PngDecodeErrors> {
        match b {
            0 => Ok(Self::Greyscale),
            2 => Ok(Self::Truecolour),
            3 => Ok(Self::Indexed),
            4 => Ok(Self::GreyscaleAlpha),
            6 => Ok(Self::TruecolourAlpha),
            other => Err(PngDecodeErrors::BadColourType(other)),
        }
    }

    /// Number of samples per pixel, excluding the palette-index case where
    /// "sample" means "palette index" rather than a colour channel.
    pub fn channels(self) -> u32 {
        match self {
            Self::Greyscale | Self::Indexed => 1,
            Self::GreyscaleAlpha => 2,
            Self::Truecolour => 3,
            Self::TruecolourAlpha => 4,
        }
    }

    fn allows_bit_depth(self, bit_depth: u8) -> bool {
        match self {
            Self::Greyscale => matches!(bit_depth, 1 | 2 | 4 | 8 | 16),
            Self::Indexed => matches!(bit_depth, 1 | 2 | 4 | 8),
            Self::Truecolour | Self::GreyscaleAlpha | Self::TruecolourAlpha => {
                matches!(bit_depth, 8 | 16)
            }
        }
    }
}

/// Everything read from `IHDR`, plus the buffers filled in as the decode
/// progresses.
#[derive(Debug, Clone, Default)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub colour_type: Option<ColourType>,
    pub gamma: Option<u32>,
    pub has_palette: bool,
    pub interlaced: bool,
}

/// Non-fatal notes about what a decode did or did not do, so a caller can
/// tell "fully decoded" apart from "decoded, extension point skipped".
#[derive(Debug, Clone, Default)]
pub struct DecodeReport {
    pub notes: Vec<String>,
}

/// A single-use PNG decoder: construct one per input buffer.
pub struct Decoder {
    options: PngOptions,
    info: ImageInfo,
    compressed: Vec<u8>,
}

impl Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_options(PngOptions::new())
    }

    #[must_use]
    pub fn new_with_options(options: PngOptions) -> Self {
        let capacity = options.idat_initial_capacity();
        Self {
            options,
            info: ImageInfo::default(),
            compressed: Vec::with_capacity(capacity),
        }
    }

    /// Returns the parsed header information, available only after a
    /// successful call to [`Self::decode_buffer`].
    #[must_use]
    pub fn info(&self) -> Option<ImageInfo> {
        if self.info.colour_type.is_none() {
            return None;
        }
        Some(self.info.clone())
    }

    /// Decode a PNG datastream already in memory.
    ///
    /// # Errors
    /// See [`PngDecodeErrors`] for the full taxonomy.
    pub fn decode_buffer(&mut self, buf: &[u8]) -> Result<(Vec<u8>, DecodeReport), PngDecodeErrors> {
        let mut reader = Reader::new(buf);
        reader.read_signature()?;
        debug!("PNG signature accepted");

        let mut seen_ihdr = false;
        let mut seen_plte = false;
        let mut seen_gama = false;
        let mut seen_idat = false;
        let mut in_idat_run = false;
        let mut first_chunk = true;

        loop {
            let chunk = reader.read_chunk()?;
            trace!(
                "chunk {} ({} bytes)",
                chunk.type_as_str(),
                chunk.length
            );

            if self.options.check_crc() {
                self.verify_crc(&chunk)?;
            } else {
                warn!("CRC checking disabled by caller options");
            }

            if first_chunk && chunk.chunk_type != IHDR {
                return Err(PngDecodeErrors::IhdrNotFound);
            }
            first_chunk = false;

            match chunk.chunk_type {
                t if t == IHDR => {
                    if seen_ihdr {
                        return Err(PngDecodeErrors::MultipleIhdr);
                    }
                    self.parse_ihdr(&chunk)?;
                    seen_ihdr = true;
                    in_idat_run = false;
                }
                t if t == GAMA => {
                    if seen_gama {
                        return Err(PngDecodeErrors::MultipleGama);
                    }
                    if seen_plte {
                        return Err(PngDecodeErrors::GamaAfterPlte);
                    }
                    self.parse_gama(&chunk)?;
                    seen_gama = true;
                    in_idat_run = false;
                }
                t if t == PLTE => {
                    let colour_type = self.info.colour_type.ok_or(PngDecodeErrors::IhdrNotFound)?;
                    if matches!(colour_type, ColourType::Greyscale | ColourType::GreyscaleAlpha) {
                        return Err(PngDecodeErrors::UnexpectedPlte);
                    }
                    self.info.has_palette = true;
                    seen_plte = true;
                    in_idat_run = false;
                }
                t if t == IDAT => {
                    if seen_idat && !in_idat_run {
                        return Err(PngDecodeErrors::InvalidFile(
                            "IDAT chunks are not contiguous".to_string(),
                        ));
                    }
                    if self.info.colour_type == Some(ColourType::Indexed) && !seen_plte {
                        return Err(PngDecodeErrors::NoPlte);
                    }
                    self.compressed.extend_from_slice(chunk.data);
                    if self.compressed.len() > self.idat_size_limit() {
                        return Err(PngDecodeErrors::IdatSizeLimit);
                    }
                    seen_idat = true;
                    in_idat_run = true;
                }
                t if t == IEND => {
                    if !seen_idat {
                        return Err(PngDecodeErrors::NoIdat);
                    }
                    break;
                }
                other => {
                    if chunk.is_ancillary() && self.options.skip_ancillary_unknown() {
                        debug!("skipping unknown ancillary chunk {:?}", chunk.type_as_str());
                    } else {
                        return Err(PngDecodeErrors::TypeNotSupported(
                            String::from_utf8_lossy(&other).into_owned(),
                        ));
                    }
                    in_idat_run = false;
                }
            }

            if reader.is_exhausted() && chunk.chunk_type != IEND {
                return Err(PngDecodeErrors::InvalidFile(
                    "stream ended before IEND".to_string(),
                ));
            }
        }

        debug!("decompressing {} bytes of IDAT data", self.compressed.len());
        let uncompressed = decode_zlib(&self.compressed, self.decoded_size_limit())?;

        let mut report = DecodeReport::default();
        let pixels = self.maybe_defilter(&uncompressed, &mut report)?;

        Ok((pixels, report))
    }

    /// Bound on the *compressed* `IDAT` accumulator, derived from the
    /// caller's configured maximum dimensions (checked before `IHDR` is
    /// necessarily trustworthy, so it cannot use the image's own numbers).
    fn idat_size_limit(&self) -> usize {
        let w = u64::from(self.options.max_width());
        let h = u64::from(self.options.max_height());
        // +1 byte per scanline for the filter type, *4 for the widest
        // channel count (truecolour+alpha), generous since compressed
        // input is always smaller than raw pixels for real images.
        usize::try_from(w.saturating_mul(h).saturating_mul(4).saturating_add(h))
            .unwrap_or(usize::MAX)
    }

    /// Bound on the *decompressed* output, derived from the image's own
    /// `IHDR` dimensions. This is the guard against decompression bombs: a
    /// small compressed stream built from chained maximal-length
    /// back-references can otherwise inflate without limit, regardless of
    /// how small the compressed `IDAT` accumulator stayed.
    fn decoded_size_limit(&self) -> usize {
        let width = u64::from(self.info.width);
        let height = u64::from(self.info.height);
        let bytes_per_sample = u64::from(self.info.bit_depth == 16) + 1;
        let channels = u64::from(self.info.colour_type.map_or(4, ColourType::channels));
        let scanline = width
            .saturating_mul(channels)
            .saturating_mul(bytes_per_sample)
            .saturating_add(1);
        usize::try_from(scanline.saturating_mul(height)).unwrap_or(usize::MAX)
    }

    fn verify_crc(&self, chunk: &Chunk) -> Result<(), PngDecodeErrors> {
        let mut bytes = Vec::with_capacity(4 + chunk.data.len());
        bytes.extend_from_slice(&chunk.chunk_type);
        bytes.extend_from_slice(chunk.data);
        let computed = crate::crc::crc32(&bytes);
        if computed != chunk.crc {
            return Err(PngDecodeErrors::CrcMismatch(chunk.type_as_str()));
        }
        Ok(())
    }

    fn parse_ihdr(&mut self, chunk: &Chunk) -> Result<(), PngDecodeErrors> {
        if chunk.length != 13 {
            return Err(PngDecodeErrors::CorruptIhdr);
        }
        let d = chunk.data;
        let width = u32::from_be_bytes([d[0], d[1], d[2], d[3]]);
        let height = u32::from_be_bytes([d[4], d[5], d[6], d[7]]);
        let bit_depth = d[8];
        let colour_byte = d[9];
        let compression_method = d[10];
        let filter_method = d[11];
        let interlace_method = d[12];

        if width == 0 || height == 0 {
            return Err(PngDecodeErrors::ZeroSize);
        }
        if width > self.options.max_width() || height > self.options.max_height() {
            return Err(PngDecodeErrors::ImageTooBig(width, height));
        }

        let colour_type = ColourType::from_byte(colour_byte)?;
        if !matches!(bit_depth, 1 | 2 | 4 | 8 | 16) {
            return Err(PngDecodeErrors::BadBitDepth(bit_depth));
        }
        if !colour_type.allows_bit_depth(bit_depth) {
            return Err(PngDecodeErrors::BadBitDepthCombination(colour_byte, bit_depth));
        }
        if compression_method != 0 {
            return Err(PngDecodeErrors::InvalidFile(format!(
                "unsupported compression method {compression_method}"
            )));
        }
        if filter_method != 0 {
            return Err(PngDecodeErrors::InvalidFile(format!(
                "unsupported filter method {filter_method}"
            )));
        }
        if !matches!(interlace_method, 0 | 1) {
            return Err(PngDecodeErrors::BadInterlace(interlace_method));
        }

        info!("image {width}x{height}, colour type {colour_byte}, bit depth {bit_depth}");

        self.info.width = width;
        self.info.height = height;
        self.info.bit_depth = bit_depth;
        self.info.colour_type = Some(colour_type);
        self.info.interlaced = interlace_method == 1;
        Ok(())
    }

    fn parse_gama(&mut self, chunk: &Chunk) -> Result<(), PngDecodeErrors> {
        if chunk.data.len() != 4 {
            return Err(PngDecodeErrors::InvalidFile(
                "gAMA chunk must carry exactly 4 bytes".to_string(),
            ));
        }
        let gamma = u32::from_be_bytes(chunk.data.try_into().unwrap());
        self.info.gamma = Some(gamma);
        Ok(())
    }

    /// Undo scanline filtering when the image is on the directly-supported
    /// path (8-bit, non-interlaced); otherwise hand back the raw DEFLATE
    /// output and note why defiltering was skipped.
    fn maybe_defilter(
        &self, uncompressed: &[u8], report: &mut DecodeReport,
    ) -> Result<Vec<u8>, PngDecodeErrors> {
        let colour_type = self.info.colour_type.expect("IHDR parsed before IEND");

        if self.info.interlaced {
            report
                .notes
                .push("defiltering skipped: interlaced image".to_string());
            return Ok(uncompressed.to_vec());
        }
        if self.info.bit_depth != 8 {
            report.notes.push(format!(
                "defiltering skipped: bit depth {} is not 8",
                self.info.bit_depth
            ));
            return Ok(uncompressed.to_vec());
        }

        let channels = colour_type.channels();
        let scanline_bytes = (self.info.width * channels) as usize;
        let bpp = channels as usize;
        let pixels = defilter(uncompressed, scanline_bytes, bpp)?;

        if colour_type == ColourType::Indexed {
            report
                .notes
                .push("palette resolution into RGBA not performed".to_string());
        }

        Ok(pixels)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
