//! Format dispatch.
//!
//! Each call is independent: the stream is sniffed, rewound, and handed
//! to exactly one decoder. Every intermediate buffer lives inside that
//! call and is dropped on return, success or failure.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;

use crate::error::{DecodeError, Result};
use crate::image::Image;
use crate::sniff::{Format, sniff};
use crate::{png, ppm};

// max total pixels we are willing to decode (memory guard); 256 MiB of RGBA
pub const DEFAULT_MAX_PIXELS: u64 = 64 * 1024 * 1024;

/// Per-decode settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Check each PNG chunk's CRC-32; mismatches are `CorruptPixelData`.
    pub verify_crc: bool,
    /// Largest `width * height` accepted from a header.
    pub max_pixels: u64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            verify_crc: false,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

impl DecodeOptions {
    pub fn with_crc_check(mut self, on: bool) -> Self {
        self.verify_crc = on;
        self
    }

    pub fn with_max_pixels(mut self, max: u64) -> Self {
        self.max_pixels = max;
        self
    }
}

/// Decode the image file at `path` with default options.
pub fn decode(path: impl AsRef<Path>) -> Result<Image> {
    decode_with(path, &DecodeOptions::default())
}

pub fn decode_with(path: impl AsRef<Path>, opts: &DecodeOptions) -> Result<Image> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DecodeError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("decoding {}", path.display());
    decode_reader(BufReader::new(file), opts)
}

pub fn decode_bytes(data: &[u8], opts: &DecodeOptions) -> Result<Image> {
    decode_reader(Cursor::new(data), opts)
}

/// Sniff `reader`, rewind it, and run the matching decoder.
pub fn decode_reader<R: BufRead + Seek>(mut reader: R, opts: &DecodeOptions) -> Result<Image> {
    let format = sniff(&mut reader)?;
    log::info!("detected {} image", format);

    match format {
        Format::Png => png::decode_png(reader, opts),
        Format::Ppm => ppm::decode_ppm(reader, opts),
        Format::Jpeg | Format::Gif | Format::Bmp => Err(DecodeError::UnsupportedFormat(format)),
        Format::Unknown => Err(DecodeError::UnknownFormat),
    }
}
