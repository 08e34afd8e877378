//! This crate provides a library for decoding valid PNG (ISO/IEC 15948,
//! W3C PNG 1.2) images.
//!
//! # Features
//!  - A from-scratch DEFLATE (RFC 1951) and zlib (RFC 1950) decompressor
//!  - CRC-32 verification of every chunk, on by default
//!  - Scanline defiltering (None/Sub/Up/Average/Paeth) for 8-bit,
//!    non-interlaced images
//!
//! # Usage
//! Add zune-png to the dependencies in the project Cargo.toml
//!
//! ```toml
//! [dependencies]
//! zune_png = "0.1.0"
//! ```
//! # Examples
//!
//! ## Decode a PNG already read into memory.
//! ```no_run
//! use zune_png::Decoder;
//! let data = std::fs::read("a_png_file.png").unwrap();
//! let mut decoder = Decoder::new();
//! let (pixels, _report) = decoder.decode_buffer(&data).unwrap();
//! ```
//!
//! ## Decode an image and get its width and height.
//! ```no_run
//! use zune_png::Decoder;
//! let data = std::fs::read("a_png_file.png").unwrap();
//! let mut decoder = Decoder::new();
//! decoder.decode_buffer(&data).unwrap();
//! let image_info = decoder.info().unwrap();
//! println!("{},{}", image_info.width, image_info.height);
//! ```
//!
//! ## Decode with CRC checking turned off.
//! ```no_run
//! use zune_png::{Decoder, PngOptions};
//! let data = std::fs::read("a_png_file.png").unwrap();
//! let mut decoder = Decoder::new_with_options(PngOptions::new().set_check_crc(false));
//! decoder.decode_buffer(&data).unwrap();
//! ```
//!
//! # Crate features.
//! This crate decodes the non-interlaced, non-progressive PNG subset most
//! encoders actually produce. Adam7 interlacing and palette resolution into
//! RGBA are not implemented; a successful decode of such an image still
//! returns the raw (or partially defiltered) bytes alongside a
//! [`decoder::DecodeReport`] explaining what was skipped and why.

#![warn(
    clippy::correctness,
    clippy::perf,
    clippy::pedantic,
    clippy::inline_always,
    clippy::missing_errors_doc,
    clippy::panic
)]
#![allow(
    clippy::needless_return,
    clippy::similar_names,
    clippy::inline_always,
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

#[macro_use]
extern crate log;

pub use crate::decoder::{ColourType, Decoder, DecodeReport, ImageInfo};
pub use crate::errors::PngDecodeErrors;
pub use crate::options::PngOptions;

mod bitstream;
mod chunk;
mod constants;
mod crc;
mod decoder;
pub mod errors;
mod filter;
mod huffman;
mod inflate;
mod options;
