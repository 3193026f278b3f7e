//! Magic-byte format detection.
//!
//! Only fixed prefixes are compared; nothing past the magic is validated.

use core::fmt;
use std::io::{self, Read, Seek, SeekFrom};

pub const PNG_SIG: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const JPEG_SOI: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Number of bytes the sniffer looks at.
pub const SNIFF_LEN: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Ppm,
    Unknown,
}

impl Format {
    /// True when this crate ships a decoder for the format.
    pub fn is_decodable(self) -> bool {
        matches!(self, Format::Png | Format::Ppm)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Png => "PNG",
            Format::Jpeg => "JPEG",
            Format::Gif => "GIF",
            Format::Bmp => "BMP",
            Format::Ppm => "PPM",
            Format::Unknown => "unknown",
        })
    }
}

/// Classify a header prefix.
pub fn detect_format(head: &[u8]) -> Format {
    if head.starts_with(&PNG_SIG) {
        Format::Png
    } else if head.starts_with(&JPEG_SOI) {
        Format::Jpeg
    } else if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        Format::Gif
    } else if head.starts_with(b"BM") {
        Format::Bmp
    } else if head.starts_with(b"P3") || head.starts_with(b"P6") {
        Format::Ppm
    } else {
        Format::Unknown
    }
}

/// Read up to [`SNIFF_LEN`] bytes, classify them, and seek back to where
/// the stream was so the chosen decoder starts from the same position.
pub fn sniff<R: Read + Seek>(r: &mut R) -> io::Result<Format> {
    let start = r.stream_position()?;

    let mut head = [0u8; SNIFF_LEN];
    let mut n = 0usize;
    while n < SNIFF_LEN {
        match r.read(&mut head[n..]) {
            Ok(0) => break,
            Ok(k) => n += k,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                r.seek(SeekFrom::Start(start))?;
                return Err(e);
            }
        }
    }

    r.seek(SeekFrom::Start(start))?;
    Ok(detect_format(&head[..n]))
}
