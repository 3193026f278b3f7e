// smol-raster: small raster decoders producing one uniform RGBA buffer.
// image:  Pixel / Image, flat row-major pixel buffer with row views
// error:  DecodeError taxonomy and byte / pixel locations
// source: offset-tracking byte reader shared by the decoders
// sniff:  magic-byte format detection with stream rewind
// ppm:    P3 (ASCII) and P6 (binary) triplet decoder
// png:    chunk walker, zlib adapter, pixel reconstruction
// filter: scanline defiltering (None/Sub/Up/Average/Paeth)
// crc:    CRC-32 for optional chunk verification
// decode: format dispatch and DecodeOptions

mod crc;
mod source;

pub mod decode;
pub mod error;
pub mod filter;
pub mod image;
pub mod png;
pub mod ppm;
pub mod sniff;

pub use decode::{DecodeOptions, decode, decode_bytes, decode_reader, decode_with};
pub use error::{DecodeError, ErrorKind, Location, Result};
pub use image::{Image, Pixel};
pub use sniff::{Format, detect_format, sniff};
