// PNG decoder producing a full RGBA Image.
// Walks the chunk stream once: IHDR (first, once), PLTE, tRNS, IDAT
// (payloads concatenated in order), IEND; everything else is skipped.
// The concatenated zlib stream is inflated in one pass into a buffer of
// exactly (scanline_bytes + 1) * height bytes, then rows are defiltered
// and mapped to pixels one at a time.
// Colour types: 0=greyscale, 2=RGB, 3=palette, 4=grey+alpha, 6=RGBA.
// Sub-byte samples are unpacked MSB-first; 16-bit samples keep the high
// byte. Interlaced (Adam7) images are rejected.

use std::io::BufRead;

use miniz_oxide::inflate::TINFLStatus;

use crate::crc::chunk_crc;
use crate::decode::DecodeOptions;
use crate::error::{DecodeError, Location, Result};
use crate::filter::unfilter_row;
use crate::image::{Image, Pixel};
use crate::sniff::PNG_SIG;
use crate::source::Source;

// PNG constants

pub const CHUNK_IHDR: [u8; 4] = *b"IHDR";
pub const CHUNK_PLTE: [u8; 4] = *b"PLTE";
pub const CHUNK_TRNS: [u8; 4] = *b"tRNS";
pub const CHUNK_IDAT: [u8; 4] = *b"IDAT";
pub const CHUNK_IEND: [u8; 4] = *b"IEND";

const COLOR_GREYSCALE: u8 = 0;
const COLOR_RGB: u8 = 2;
const COLOR_PALETTE: u8 = 3;
const COLOR_GREY_ALPHA: u8 = 4;
const COLOR_RGBA: u8 = 6;

const IHDR_LEN: usize = 13;

// chunk lengths are limited to 2^31 - 1
const MAX_CHUNK_LEN: u32 = 0x7FFF_FFFF;

const MAX_PALETTE_ENTRIES: usize = 256;

// public types

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorType {
    Greyscale,
    Rgb,
    Indexed,
    GreyAlpha,
    Rgba,
}

impl ColorType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            COLOR_GREYSCALE => Some(ColorType::Greyscale),
            COLOR_RGB => Some(ColorType::Rgb),
            COLOR_PALETTE => Some(ColorType::Indexed),
            COLOR_GREY_ALPHA => Some(ColorType::GreyAlpha),
            COLOR_RGBA => Some(ColorType::Rgba),
            _ => None,
        }
    }

    /// Samples per pixel.
    pub fn channels(self) -> usize {
        match self {
            ColorType::Greyscale | ColorType::Indexed => 1,
            ColorType::GreyAlpha => 2,
            ColorType::Rgb => 3,
            ColorType::Rgba => 4,
        }
    }

    fn allows_depth(self, depth: u8) -> bool {
        match self {
            ColorType::Greyscale => matches!(depth, 1 | 2 | 4 | 8 | 16),
            ColorType::Indexed => matches!(depth, 1 | 2 | 4 | 8),
            ColorType::Rgb | ColorType::GreyAlpha | ColorType::Rgba => matches!(depth, 8 | 16),
        }
    }
}

/// IHDR fields this decoder acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PngHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: ColorType,
}

impl PngHeader {
    pub fn bits_per_pixel(&self) -> usize {
        self.color_type.channels() * self.bit_depth as usize
    }

    // filter stride; 1 for sub-byte depths
    pub fn bytes_per_pixel(&self) -> usize {
        self.bits_per_pixel().div_ceil(8).max(1)
    }

    // byte length of one unfiltered row (without the leading filter byte)
    pub fn scanline_bytes(&self) -> usize {
        (self.width as u64 * self.bits_per_pixel() as u64).div_ceil(8) as usize
    }

    // exact inflated size: one filter byte plus the scanline, per row
    pub fn raw_len(&self) -> Option<usize> {
        let row = self.scanline_bytes() as u64 + 1;
        row.checked_mul(self.height as u64)
            .and_then(|n| usize::try_from(n).ok())
    }
}

/// What survives the chunk walk.
#[derive(Clone, Debug)]
pub struct PngStream {
    pub header: PngHeader,
    pub palette: Vec<[u8; 3]>,
    /// tRNS payload; per-index alpha for palette images.
    pub transparency: Vec<u8>,
    /// Concatenated IDAT payloads.
    pub idat: Vec<u8>,
    /// Offset of the first IDAT chunk.
    pub idat_at: Location,
}

/// Palette lookup state for one decode.
#[derive(Clone, Copy)]
pub struct ColorTable<'a> {
    pub palette: &'a [[u8; 3]],
    pub alpha: &'a [u8],
}

// decode a PNG stream to RGBA; a stream without the PNG signature is
// reported as UnknownFormat
pub fn decode_png<R: BufRead>(reader: R, opts: &DecodeOptions) -> Result<Image> {
    let stream = read_chunks(reader, opts)?.ok_or(DecodeError::UnknownFormat)?;
    let header = &stream.header;

    let raw = inflate_scanlines(&stream.idat, stream.idat_at, header)?;
    let mut img = Image::new(header.width, header.height)?;
    let table = ColorTable {
        palette: &stream.palette,
        alpha: &stream.transparency,
    };

    let scanline_bytes = header.scanline_bytes();
    let bpp = header.bytes_per_pixel();
    let mut prev_row = vec![0u8; scanline_bytes];
    let mut curr_row = vec![0u8; scanline_bytes];

    for (y, line) in raw.chunks_exact(scanline_bytes + 1).enumerate() {
        let y = y as u32;
        curr_row.copy_from_slice(&line[1..]);
        unfilter_row(line[0], &mut curr_row, &prev_row, bpp, y)?;
        reconstruct_row(&curr_row, y, header, &table, img.row_mut(y))?;
        core::mem::swap(&mut prev_row, &mut curr_row);
    }

    log::info!(
        "png: decoded {}x{} {:?}/{}",
        header.width,
        header.height,
        header.color_type,
        header.bit_depth
    );
    Ok(img)
}

// IHDR / chunk parsing

struct Chunk {
    at: Location,
    ctype: [u8; 4],
    data: Vec<u8>,
}

fn is_known(ctype: &[u8; 4]) -> bool {
    matches!(
        *ctype,
        CHUNK_IHDR | CHUNK_PLTE | CHUNK_TRNS | CHUNK_IDAT | CHUNK_IEND
    )
}

// read one chunk; payloads of unknown types are skipped unread unless
// their CRC has to be checked
fn next_chunk<R: BufRead>(src: &mut Source<R>, opts: &DecodeOptions) -> Result<Chunk> {
    let at = src.at();
    let len = u32::from_be_bytes(src.read_array("chunk length")?);
    if len > MAX_CHUNK_LEN {
        return Err(DecodeError::header("chunk length exceeds 2^31-1", at));
    }
    let ctype: [u8; 4] = src.read_array("chunk type")?;

    if !is_known(&ctype) && !opts.verify_crc {
        log::debug!(
            "png: skipping {} chunk ({} bytes) at {}",
            String::from_utf8_lossy(&ctype),
            len,
            at
        );
        src.skip(len as u64 + 4, "chunk payload")?;
        return Ok(Chunk {
            at,
            ctype,
            data: Vec::new(),
        });
    }

    let data = src.read_vec(len as usize, "chunk payload")?;
    let crc = u32::from_be_bytes(src.read_array("chunk CRC")?);
    if opts.verify_crc && crc != chunk_crc(&ctype, &data) {
        return Err(DecodeError::corrupt("chunk CRC mismatch", at));
    }
    Ok(Chunk { at, ctype, data })
}

/// Walk the chunk stream up to IEND. Returns `Ok(None)` when the stream
/// does not start with the PNG signature.
pub fn read_chunks<R: BufRead>(reader: R, opts: &DecodeOptions) -> Result<Option<PngStream>> {
    let mut src = Source::new(reader);

    // signature; a short or different prefix is "not a PNG", not an error
    for &expected in &PNG_SIG {
        if src.next_byte()? != Some(expected) {
            return Ok(None);
        }
    }

    let first = next_chunk(&mut src, opts)?;
    if first.ctype != CHUNK_IHDR {
        return Err(DecodeError::header("first chunk is not IHDR", first.at));
    }
    let header = parse_ihdr(&first.data, first.at, opts)?;

    let mut palette: Vec<[u8; 3]> = Vec::new();
    let mut transparency = Vec::new();
    let mut idat = Vec::new();
    let mut idat_chunks = 0usize;
    let mut idat_at = Location::Unknown;

    let end = loop {
        let chunk = next_chunk(&mut src, opts)?;
        match chunk.ctype {
            CHUNK_IHDR => return Err(DecodeError::header("duplicate IHDR", chunk.at)),
            CHUNK_PLTE => {
                if !palette.is_empty() {
                    return Err(DecodeError::header("duplicate PLTE", chunk.at));
                }
                palette = parse_plte(&chunk.data, chunk.at)?;
            }
            CHUNK_TRNS => transparency = chunk.data,
            CHUNK_IDAT => {
                idat.try_reserve(chunk.data.len())
                    .map_err(|_| DecodeError::OutOfMemory {
                        bytes: idat.len() + chunk.data.len(),
                    })?;
                idat.extend_from_slice(&chunk.data);
                if idat_chunks == 0 {
                    idat_at = chunk.at;
                }
                idat_chunks += 1;
            }
            CHUNK_IEND => break chunk.at,
            _ => {}
        }
    };

    if header.color_type == ColorType::Indexed {
        if palette.is_empty() {
            return Err(DecodeError::header("palette image without PLTE", end));
        }
        if transparency.len() > palette.len() {
            log::warn!(
                "png: tRNS has {} entries for a {}-entry palette",
                transparency.len(),
                palette.len()
            );
        }
    }
    if idat.is_empty() {
        return Err(DecodeError::corrupt("no IDAT data", end));
    }
    if !src.at_eof()? {
        log::warn!("png: ignoring data after IEND at byte {}", src.position());
    }

    log::debug!(
        "png: {} IDAT chunk(s), {} compressed bytes, {} palette entries",
        idat_chunks,
        idat.len(),
        palette.len()
    );

    Ok(Some(PngStream {
        header,
        palette,
        transparency,
        idat,
        idat_at,
    }))
}

// big-endian u32 (PNG uses network byte order)
#[inline]
fn be_u32(d: &[u8], o: usize) -> u32 {
    u32::from_be_bytes([d[o], d[o + 1], d[o + 2], d[o + 3]])
}

fn parse_ihdr(data: &[u8], at: Location, opts: &DecodeOptions) -> Result<PngHeader> {
    if data.len() != IHDR_LEN {
        return Err(DecodeError::header("IHDR payload must be 13 bytes", at));
    }

    let width = be_u32(data, 0);
    let height = be_u32(data, 4);
    if width == 0 || height == 0 {
        return Err(DecodeError::header("zero dimensions", at));
    }
    if width > MAX_CHUNK_LEN || height > MAX_CHUNK_LEN {
        return Err(DecodeError::header("dimension exceeds 2^31-1", at));
    }

    let bit_depth = data[8];
    let color_type =
        ColorType::from_u8(data[9]).ok_or(DecodeError::header("unknown colour type", at))?;
    if !color_type.allows_depth(bit_depth) {
        return Err(DecodeError::header("unsupported colour type / bit depth", at));
    }
    if data[10] != 0 {
        return Err(DecodeError::header("unknown compression method", at));
    }
    if data[11] != 0 {
        return Err(DecodeError::header("unknown filter method", at));
    }
    if data[12] != 0 {
        return Err(DecodeError::header("interlaced PNGs not supported", at));
    }
    if width as u64 * height as u64 > opts.max_pixels {
        return Err(DecodeError::header("image exceeds pixel limit", at));
    }

    Ok(PngHeader {
        width,
        height,
        bit_depth,
        color_type,
    })
}

// PLTE payload: RGB triples, at most 256
fn parse_plte(data: &[u8], at: Location) -> Result<Vec<[u8; 3]>> {
    if data.len() % 3 != 0 {
        return Err(DecodeError::header("PLTE length not a multiple of 3", at));
    }
    if data.is_empty() || data.len() / 3 > MAX_PALETTE_ENTRIES {
        return Err(DecodeError::header("PLTE entry count out of range", at));
    }
    Ok(data.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
}

// zlib

/// Inflate the concatenated IDAT stream into exactly `raw_len` bytes of
/// filtered scanlines. Short output is an error, never zero-padded. The
/// output buffer grows with the data actually inflated, up to `raw_len`.
/// `idat_at` is where the compressed data starts, for error reports.
pub fn inflate_scanlines(idat: &[u8], idat_at: Location, header: &PngHeader) -> Result<Vec<u8>> {
    let expected = header.raw_len().ok_or(DecodeError::OutOfMemory { bytes: usize::MAX })?;

    match miniz_oxide::inflate::decompress_to_vec_zlib_with_limit(idat, expected) {
        Ok(raw) if raw.len() == expected => Ok(raw),
        Ok(raw) => {
            log::warn!("png: inflated {} of {} bytes", raw.len(), expected);
            let row = raw.len() / (header.scanline_bytes() + 1);
            Err(DecodeError::corrupt(
                "image data shorter than declared dimensions",
                Location::Row(row as u32),
            ))
        }
        Err(e) if e.status == TINFLStatus::HasMoreOutput => Err(DecodeError::corrupt(
            "image data longer than declared dimensions",
            idat_at,
        )),
        Err(e) => {
            log::debug!("png: inflate failed after {} bytes: {:?}", e.output.len(), e.status);
            Err(DecodeError::corrupt("zlib stream is corrupt", idat_at))
        }
    }
}

// pixel reconstruction

/// Map one defiltered scanline to `out.len()` pixels.
pub fn reconstruct_row(
    row: &[u8],
    y: u32,
    header: &PngHeader,
    table: &ColorTable<'_>,
    out: &mut [Pixel],
) -> Result<()> {
    let depth = header.bit_depth;
    // byte step between samples of one pixel
    let s = if depth == 16 { 2 } else { 1 };

    for (x, px) in out.iter_mut().enumerate() {
        *px = match header.color_type {
            ColorType::Greyscale => {
                let v = match depth {
                    8 => row[x],
                    16 => row[x * 2],
                    bd => unpack_sub_byte(row, x, bd),
                };
                Pixel::grey(v, 255)
            }
            ColorType::Rgb => {
                let o = x * 3 * s;
                Pixel::opaque(row[o], row[o + s], row[o + 2 * s])
            }
            ColorType::Indexed => {
                let idx = match depth {
                    8 => row[x],
                    bd => unpack_sub_byte_raw(row, x, bd),
                } as usize;
                let Some(&[r, g, b]) = table.palette.get(idx) else {
                    return Err(DecodeError::corrupt(
                        "palette index out of range",
                        Location::Pixel {
                            row: y,
                            col: x as u32,
                        },
                    ));
                };
                Pixel::rgba(r, g, b, table.alpha.get(idx).copied().unwrap_or(255))
            }
            ColorType::GreyAlpha => {
                let o = x * 2 * s;
                Pixel::grey(row[o], row[o + s])
            }
            ColorType::Rgba => {
                let o = x * 4 * s;
                Pixel::rgba(row[o], row[o + s], row[o + 2 * s], row[o + 3 * s])
            }
        };
    }
    Ok(())
}

// unpack a sub-byte greyscale sample (1/2/4 bit) and scale to 0-255
#[inline]
fn unpack_sub_byte(row: &[u8], x: usize, bit_depth: u8) -> u8 {
    let raw = unpack_sub_byte_raw(row, x, bit_depth);
    let max = (1u16 << bit_depth) - 1;
    (raw as u16 * 255 / max) as u8
}

// unpack a sub-byte sample without rescaling (for palette index)
#[inline]
fn unpack_sub_byte_raw(row: &[u8], x: usize, bit_depth: u8) -> u8 {
    let bpp = bit_depth as usize;
    let ppb = 8 / bpp; // pixels per byte
    let byte_idx = x / ppb;
    let bit_offset = (ppb - 1 - x % ppb) * bpp;
    let mask = (1u8 << bpp) - 1;
    (row[byte_idx] >> bit_offset) & mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use miniz_oxide::deflate::compress_to_vec_zlib;

    fn chunk(out: &mut Vec<u8>, ctype: &[u8; 4], data: &[u8]) {
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(ctype);
        out.extend_from_slice(data);
        out.extend_from_slice(&chunk_crc(ctype, data).to_be_bytes());
    }

    fn ihdr(w: u32, h: u32, depth: u8, color: u8, interlace: u8) -> Vec<u8> {
        let mut d = Vec::new();
        d.extend_from_slice(&w.to_be_bytes());
        d.extend_from_slice(&h.to_be_bytes());
        d.extend_from_slice(&[depth, color, 0, 0, interlace]);
        d
    }

    // signature + IHDR + extra chunks + one IDAT of `raw` + IEND
    fn png(w: u32, h: u32, depth: u8, color: u8, extra: &[(&[u8; 4], &[u8])], raw: &[u8]) -> Vec<u8> {
        let mut out = PNG_SIG.to_vec();
        chunk(&mut out, &CHUNK_IHDR, &ihdr(w, h, depth, color, 0));
        for (t, d) in extra {
            chunk(&mut out, t, d);
        }
        chunk(&mut out, &CHUNK_IDAT, &compress_to_vec_zlib(raw, 6));
        chunk(&mut out, &CHUNK_IEND, &[]);
        out
    }

    fn decode(data: &[u8]) -> Result<Image> {
        decode_png(data, &DecodeOptions::default())
    }

    #[test]
    fn header_layout() {
        let h = PngHeader {
            width: 5,
            height: 3,
            bit_depth: 2,
            color_type: ColorType::Greyscale,
        };
        assert_eq!(h.bits_per_pixel(), 2);
        assert_eq!(h.bytes_per_pixel(), 1);
        assert_eq!(h.scanline_bytes(), 2);
        assert_eq!(h.raw_len(), Some(9));

        let h = PngHeader {
            width: 3,
            height: 2,
            bit_depth: 16,
            color_type: ColorType::Rgba,
        };
        assert_eq!(h.bits_per_pixel(), 64);
        assert_eq!(h.bytes_per_pixel(), 8);
        assert_eq!(h.scanline_bytes(), 24);
        assert_eq!(h.raw_len(), Some(50));
    }

    #[test]
    fn rgb_with_sub_filter() {
        // 2x1 RGB, filter Sub: second pixel stored as delta
        let raw = [1, 10, 20, 30, 5, 5, 5];
        let img = decode(&png(2, 1, 8, 2, &[], &raw)).unwrap();
        assert_eq!(img.pixel(0, 0), Some(Pixel::opaque(10, 20, 30)));
        assert_eq!(img.pixel(1, 0), Some(Pixel::opaque(15, 25, 35)));
    }

    #[test]
    fn grey_alpha_with_up_filter() {
        let raw = [0, 100, 200, 2, 1, 1];
        let img = decode(&png(1, 2, 8, 4, &[], &raw)).unwrap();
        assert_eq!(img.pixel(0, 0), Some(Pixel::grey(100, 200)));
        assert_eq!(img.pixel(0, 1), Some(Pixel::grey(101, 201)));
    }

    #[test]
    fn palette_with_transparency() {
        let plte = [255, 0, 0, 0, 255, 0, 0, 0, 255];
        let trns = [0, 128];
        let raw = [0, 0, 1, 2];
        let img = decode(&png(3, 1, 8, 3, &[(&CHUNK_PLTE, &plte[..]), (&CHUNK_TRNS, &trns[..])], &raw))
            .unwrap();
        assert_eq!(img.row(0), &[
            Pixel::rgba(255, 0, 0, 0),
            Pixel::rgba(0, 255, 0, 128),
            Pixel::rgba(0, 0, 255, 255),
        ]);
    }

    #[test]
    fn palette_index_out_of_range() {
        let plte = [1, 1, 1, 2, 2, 2];
        let raw = [0, 0, 2];
        let err = decode(&png(2, 1, 8, 3, &[(&CHUNK_PLTE, &plte[..])], &raw)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptPixelData);
        assert_eq!(err.location(), Some(Location::Pixel { row: 0, col: 1 }));
    }

    #[test]
    fn palette_required_and_well_formed() {
        let err = decode(&png(1, 1, 8, 3, &[], &[0, 0])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHeader);
        let err = decode(&png(1, 1, 8, 3, &[(&CHUNK_PLTE, &[1, 2, 3, 4][..])], &[0, 0])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHeader);
    }

    #[test]
    fn sub_byte_grey_and_palette() {
        // 1-bit grey, 10 px: 1010_1010 11xx_xxxx
        let img = decode(&png(10, 1, 1, 0, &[], &[0, 0b1010_1010, 0b1100_0000])).unwrap();
        let vals: Vec<u8> = img.row(0).iter().map(|p| p.r).collect();
        assert_eq!(vals, [255, 0, 255, 0, 255, 0, 255, 0, 255, 255]);

        // 2-bit palette, 3 px: indices 3, 0, 1
        let plte = [0, 0, 0, 10, 10, 10, 20, 20, 20, 30, 30, 30];
        let img = decode(&png(3, 1, 2, 3, &[(&CHUNK_PLTE, &plte[..])], &[0, 0b1100_0100])).unwrap();
        assert_eq!(img.row(0), &[
            Pixel::opaque(30, 30, 30),
            Pixel::opaque(0, 0, 0),
            Pixel::opaque(10, 10, 10),
        ]);
    }

    #[test]
    fn sixteen_bit_keeps_high_byte() {
        let raw = [0, 0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];
        let img = decode(&png(1, 1, 16, 6, &[], &raw)).unwrap();
        assert_eq!(img.pixel(0, 0), Some(Pixel::rgba(0x12, 0x56, 0x9A, 0xDE)));
    }

    #[test]
    fn interlace_rejected() {
        let mut out = PNG_SIG.to_vec();
        chunk(&mut out, &CHUNK_IHDR, &ihdr(1, 1, 8, 0, 1));
        // no IDAT follows: the header alone must fail
        let err = decode(&out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHeader);
        assert_eq!(err.location(), Some(Location::Offset(8)));
    }

    #[test]
    fn bad_headers() {
        for (w, h, depth, color) in [(0, 1, 8, 2), (1, 0, 8, 2), (1, 1, 8, 5), (1, 1, 4, 2), (1, 1, 16, 3)] {
            let err = decode(&png(w, h, depth, color, &[], &[0, 0, 0, 0])).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedHeader, "{w}x{h} {depth}/{color}");
        }
    }

    #[test]
    fn first_chunk_must_be_ihdr() {
        let mut out = PNG_SIG.to_vec();
        chunk(&mut out, b"tEXt", b"k\0v");
        chunk(&mut out, &CHUNK_IHDR, &ihdr(1, 1, 8, 0, 0));
        assert_eq!(decode(&out).unwrap_err().kind(), ErrorKind::MalformedHeader);
    }

    #[test]
    fn unknown_chunks_skipped() {
        let raw = [0, 7];
        let data = png(1, 1, 8, 0, &[(b"tEXt", &b"Title\0x"[..]), (b"gAMA", &[0, 0, 0xB1, 0x8F][..])], &raw);
        assert_eq!(decode(&data).unwrap().pixel(0, 0), Some(Pixel::grey(7, 255)));
    }

    #[test]
    fn truncated_before_iend() {
        let data = png(1, 1, 8, 0, &[], &[0, 7]);
        // drop IEND (12 bytes)
        let err = decode(&data[..data.len() - 12]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedStream);
        assert_eq!(err.location(), Some(Location::Offset(data.len() as u64 - 12)));
    }

    #[test]
    fn short_image_data() {
        // 2 rows declared, one supplied
        let err = decode(&png(1, 2, 8, 0, &[], &[0, 7])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptPixelData);
        assert_eq!(err.location(), Some(Location::Row(1)));
    }

    #[test]
    fn long_image_data() {
        let err = decode(&png(1, 1, 8, 0, &[], &[0, 7, 0, 8])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptPixelData);
        // sig(8) + IHDR(25): the IDAT chunk
        assert_eq!(err.location(), Some(Location::Offset(33)));
    }

    #[test]
    fn huge_header_with_tiny_data() {
        // 8000 x 8000 RGBA16 declared, a single zero row supplied
        let row = vec![0u8; 8000 * 8 + 1];
        let data = png(8000, 8000, 16, 6, &[], &row);
        assert!(data.len() < 1024);
        let err = decode(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptPixelData);
        assert_eq!(err.location(), Some(Location::Row(1)));
    }

    #[test]
    fn garbage_zlib() {
        let mut out = PNG_SIG.to_vec();
        chunk(&mut out, &CHUNK_IHDR, &ihdr(1, 1, 8, 0, 0));
        chunk(&mut out, b"tEXt", b"a\0b");
        chunk(&mut out, &CHUNK_IDAT, &[0x78, 0x9C, 0xFF, 0xFF, 0xFF]);
        chunk(&mut out, &CHUNK_IEND, &[]);
        let err = decode(&out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptPixelData);
        // sig(8) + IHDR(25) + tEXt(15)
        assert_eq!(err.location(), Some(Location::Offset(48)));
    }

    #[test]
    fn missing_idat() {
        let mut out = PNG_SIG.to_vec();
        chunk(&mut out, &CHUNK_IHDR, &ihdr(1, 1, 8, 0, 0));
        chunk(&mut out, &CHUNK_IEND, &[]);
        assert_eq!(decode(&out).unwrap_err().kind(), ErrorKind::CorruptPixelData);
    }

    #[test]
    fn bad_filter_tag() {
        let err = decode(&png(1, 2, 8, 0, &[], &[0, 1, 9, 1])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptPixelData);
        assert_eq!(err.location(), Some(Location::Row(1)));
    }

    #[test]
    fn signature_mismatch_is_no_match() {
        let mut data = png(1, 1, 8, 0, &[], &[0, 7]);
        data[7] = 0;
        assert!(read_chunks(&data[..], &DecodeOptions::default()).unwrap().is_none());
        assert!(read_chunks(&data[..3], &DecodeOptions::default()).unwrap().is_none());
        assert_eq!(decode(&data).unwrap_err().kind(), ErrorKind::UnknownFormat);
    }

    #[test]
    fn crc_checked_only_when_asked() {
        let mut data = png(1, 1, 8, 0, &[(b"tEXt", &b"a\0b"[..])], &[0, 7]);
        // corrupt the tEXt CRC: sig(8) + IHDR(25) + len/type(8) + payload(3)
        data[8 + 25 + 8 + 3] ^= 0xFF;
        assert!(decode(&data).is_ok());

        let strict = DecodeOptions::default().with_crc_check(true);
        let err = decode_png(&data[..], &strict).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptPixelData);
        assert_eq!(err.location(), Some(Location::Offset(33)));
    }

    #[test]
    fn idat_split_points_are_irrelevant() {
        let raw = [0u8, 1, 2, 3, 4, 1, 5, 6, 7, 8];
        let z = compress_to_vec_zlib(&raw, 6);
        let whole = png(2, 2, 8, 4, &[], &raw);

        let mut split = PNG_SIG.to_vec();
        chunk(&mut split, &CHUNK_IHDR, &ihdr(2, 2, 8, 4, 0));
        for part in z.chunks(3) {
            chunk(&mut split, &CHUNK_IDAT, part);
        }
        chunk(&mut split, &CHUNK_IEND, &[]);

        assert_eq!(decode(&whole).unwrap(), decode(&split).unwrap());
    }
}
