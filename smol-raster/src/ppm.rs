// PPM triplet decoder: P3 (ASCII decimal) and P6 (packed binary).
// Header tokens: magic, width, height, max sample; '#' comments run to end
// of line and may sit between any two header tokens. Only max sample 255
// (8-bit) is accepted. One whitespace byte separates header from raster.
// Alpha is always 255.

use std::io::BufRead;

use crate::decode::DecodeOptions;
use crate::error::{DecodeError, Location, Result};
use crate::image::{Image, Pixel};
use crate::source::Source;

const MAX_SAMPLE: u32 = 255;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PpmMode {
    /// `P3`: whitespace-separated decimal samples
    Ascii,
    /// `P6`: three raw bytes per pixel
    Binary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PpmHeader {
    pub mode: PpmMode,
    pub width: u32,
    pub height: u32,
}

pub fn decode_ppm<R: BufRead>(reader: R, opts: &DecodeOptions) -> Result<Image> {
    let mut src = Source::new(reader);
    let (header, at_dims) = read_header(&mut src)?;

    if header.width as u64 * header.height as u64 > opts.max_pixels {
        return Err(DecodeError::header("image exceeds pixel limit", at_dims));
    }

    log::info!(
        "ppm: {:?} {}x{}, raster at byte {}",
        header.mode,
        header.width,
        header.height,
        src.position()
    );

    let mut img = Image::new(header.width, header.height)?;
    match header.mode {
        PpmMode::Binary => read_binary(&mut src, &mut img)?,
        PpmMode::Ascii => read_ascii(&mut src, &mut img)?,
    }

    if !src.at_eof()? {
        log::debug!("ppm: ignoring data after raster at byte {}", src.position());
    }
    Ok(img)
}

#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

// returns the header and where its width token starts
fn read_header<R: BufRead>(src: &mut Source<R>) -> Result<(PpmHeader, Location)> {
    let magic: [u8; 2] = src.read_array("magic number")?;
    let mode = match &magic {
        b"P3" => PpmMode::Ascii,
        b"P6" => PpmMode::Binary,
        _ => return Err(DecodeError::header("bad PPM magic", Location::Offset(0))),
    };
    match src.peek()? {
        Some(b) if is_space(b) || b == b'#' => {}
        Some(_) => return Err(DecodeError::header("no separator after magic", src.at())),
        None => return Err(DecodeError::truncated("header ends after magic", src.at())),
    }

    let (width, at_w) = read_header_value(src, "missing or invalid width")?;
    let (height, at_h) = read_header_value(src, "missing or invalid height")?;
    let (max_sample, at_max) = read_header_value(src, "missing or invalid maximum sample value")?;

    if width == 0 {
        return Err(DecodeError::header("zero width", at_w));
    }
    if height == 0 {
        return Err(DecodeError::header("zero height", at_h));
    }
    if max_sample != MAX_SAMPLE {
        log::warn!("ppm: maximum sample value {} not supported", max_sample);
        return Err(DecodeError::header("maximum sample value must be 255", at_max));
    }

    // exactly one whitespace byte before the raster
    match src.next_byte()? {
        Some(b) if is_space(b) => {}
        Some(_) => {
            return Err(DecodeError::header(
                "no whitespace after maximum sample value",
                Location::Offset(src.position() - 1),
            ));
        }
        None => return Err(DecodeError::truncated("no pixel data", src.at())),
    }

    Ok((
        PpmHeader {
            mode,
            width,
            height,
        },
        at_w,
    ))
}

// skip whitespace and '#' comments between header tokens
fn skip_separators<R: BufRead>(src: &mut Source<R>) -> Result<()> {
    while let Some(b) = src.peek()? {
        if b == b'#' {
            while let Some(c) = src.next_byte()? {
                if c == b'\n' {
                    break;
                }
            }
        } else if is_space(b) {
            src.next_byte()?;
        } else {
            break;
        }
    }
    Ok(())
}

// unsigned decimal header token; returns the value and where it started
fn read_header_value<R: BufRead>(
    src: &mut Source<R>,
    what: &'static str,
) -> Result<(u32, Location)> {
    skip_separators(src)?;
    let start = src.at();

    let mut value: u32 = 0;
    let mut digits = 0usize;
    while let Some(b) = src.peek()? {
        if !b.is_ascii_digit() {
            break;
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add((b - b'0') as u32))
            .ok_or(DecodeError::header("header value overflows 32 bits", start))?;
        src.next_byte()?;
        digits += 1;
    }

    if digits == 0 {
        return Err(match src.peek()? {
            None => DecodeError::truncated(what, start),
            Some(_) => DecodeError::header(what, start),
        });
    }
    Ok((value, start))
}

fn read_binary<R: BufRead>(src: &mut Source<R>, img: &mut Image) -> Result<()> {
    let mut line = vec![0u8; img.width() as usize * 3];
    for row in img.rows_mut() {
        src.read_exact(&mut line, "P6 pixel data ends early")?;
        for (px, rgb) in row.iter_mut().zip(line.chunks_exact(3)) {
            *px = Pixel::opaque(rgb[0], rgb[1], rgb[2]);
        }
    }
    Ok(())
}

fn read_ascii<R: BufRead>(src: &mut Source<R>, img: &mut Image) -> Result<()> {
    for y in 0..img.height() {
        let row = img.row_mut(y);
        for (x, px) in row.iter_mut().enumerate() {
            let at = Location::Pixel {
                row: y,
                col: x as u32,
            };
            let r = read_sample(src, at)?;
            let g = read_sample(src, at)?;
            let b = read_sample(src, at)?;
            *px = Pixel::opaque(r, g, b);
        }
    }
    Ok(())
}

// one decimal sample; values outside 0..=255 keep their low 8 bits
fn read_sample<R: BufRead>(src: &mut Source<R>, at: Location) -> Result<u8> {
    while let Some(b) = src.peek()? {
        if !is_space(b) {
            break;
        }
        src.next_byte()?;
    }

    let negative = match src.peek()? {
        Some(b'-') => {
            src.next_byte()?;
            true
        }
        Some(b'+') => {
            src.next_byte()?;
            false
        }
        Some(_) => false,
        None => return Err(DecodeError::truncated("missing RGB triple", at)),
    };

    let mut value: u32 = 0;
    let mut digits = 0usize;
    while let Some(b) = src.peek()? {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add((b - b'0') as u32);
        src.next_byte()?;
        digits += 1;
    }

    if digits == 0 {
        return Err(match src.peek()? {
            None => DecodeError::truncated("missing RGB triple", at),
            Some(_) => DecodeError::corrupt("malformed RGB triple", at),
        });
    }

    let value = if negative { value.wrapping_neg() } else { value };
    Ok(value as u8)
}
