//! Scanline defiltering.
//!
//! Each decompressed row is one filter-tag byte followed by the filtered
//! sample bytes. Reconstruction works byte-wise modulo 256 using the left
//! neighbour `a`, the byte above `b` and the upper-left byte `c`; `a` and
//! `c` are zero inside the first pixel, and the row above row 0 is zeros.

use crate::error::{DecodeError, Location, Result};

pub const FILTER_NONE: u8 = 0;
pub const FILTER_SUB: u8 = 1;
pub const FILTER_UP: u8 = 2;
pub const FILTER_AVERAGE: u8 = 3;
pub const FILTER_PAETH: u8 = 4;

/// Reconstruct `row` in place from its filtered bytes and the already
/// reconstructed `prev` row. `bpp` is the byte stride between
/// corresponding samples of neighbouring pixels (at least 1). `y` is only
/// used to report an invalid tag.
pub fn unfilter_row(filter: u8, row: &mut [u8], prev: &[u8], bpp: usize, y: u32) -> Result<()> {
    debug_assert_eq!(row.len(), prev.len());
    let bpp = bpp.max(1);
    let len = row.len();
    match filter {
        FILTER_NONE => {}
        FILTER_SUB => {
            for i in bpp..len {
                row[i] = row[i].wrapping_add(row[i - bpp]);
            }
        }
        FILTER_UP => {
            for i in 0..len {
                row[i] = row[i].wrapping_add(prev[i]);
            }
        }
        FILTER_AVERAGE => {
            for i in 0..len {
                let a = if i >= bpp { row[i - bpp] as u16 } else { 0 };
                let b = prev[i] as u16;
                row[i] = row[i].wrapping_add(((a + b) >> 1) as u8);
            }
        }
        FILTER_PAETH => {
            for i in 0..len {
                let a = if i >= bpp { row[i - bpp] } else { 0 };
                let b = prev[i];
                let c = if i >= bpp { prev[i - bpp] } else { 0 };
                row[i] = row[i].wrapping_add(paeth(a, b, c));
            }
        }
        _ => return Err(DecodeError::corrupt("invalid filter type", Location::Row(y))),
    }
    Ok(())
}

/// Paeth predictor: whichever of `a`, `b`, `c` is closest to `a + b - c`,
/// ties going to `a`, then `b`.
#[inline]
pub fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let a = a as i16;
    let b = b as i16;
    let c = c as i16;
    let p = a + b - c;
    let pa = (p - a).unsigned_abs();
    let pb = (p - b).unsigned_abs();
    let pc = (p - c).unsigned_abs();
    if pa <= pb && pa <= pc {
        a as u8
    } else if pb <= pc {
        b as u8
    } else {
        c as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn paeth_ties_and_nearest() {
        assert_eq!(paeth(0, 0, 0), 0);
        // p = 15, distances (5, 5, 0)
        assert_eq!(paeth(10, 20, 15), 15);
        // p = a when b == c
        assert_eq!(paeth(7, 3, 3), 7);
        // p = 0, a is nearest
        assert_eq!(paeth(10, 20, 30), 10);
        // p = 20, b and c both 10 away: b wins
        assert_eq!(paeth(0, 30, 10), 30);
    }

    #[test]
    fn none_is_identity() {
        let mut row = [9, 8, 7, 6];
        unfilter_row(FILTER_NONE, &mut row, &[1, 1, 1, 1], 2, 0).unwrap();
        assert_eq!(row, [9, 8, 7, 6]);
    }

    #[test]
    fn sub_uses_stride() {
        let mut row = [1, 2, 3, 4, 5, 6];
        unfilter_row(FILTER_SUB, &mut row, &[0; 6], 3, 0).unwrap();
        assert_eq!(row, [1, 2, 3, 5, 7, 9]);
    }

    #[test]
    fn up_wraps() {
        let mut row = [200, 1];
        unfilter_row(FILTER_UP, &mut row, &[100, 2], 1, 0).unwrap();
        assert_eq!(row, [44, 3]);
    }

    #[test]
    fn average_floors() {
        // a = 3 (reconstructed left), b = 4: added value 3
        let mut row = [3, 0];
        unfilter_row(FILTER_AVERAGE, &mut row, &[0, 4], 1, 0).unwrap();
        assert_eq!(row, [3, 3]);
    }

    #[test]
    fn average_first_pixel_uses_half_up() {
        let mut row = [10, 10];
        unfilter_row(FILTER_AVERAGE, &mut row, &[255, 255], 1, 0).unwrap();
        // 10 + 127 = 137, then 10 + (137 + 255) / 2 = 206
        assert_eq!(row, [137, 206]);
    }

    #[test]
    fn paeth_row() {
        let prev = [15, 20];
        let mut row = [1, 1];
        unfilter_row(FILTER_PAETH, &mut row, &prev, 1, 0).unwrap();
        // i=0: a=0 b=15 c=0 -> p=15, picks b -> 16
        // i=1: a=16 b=20 c=15 -> p=21, pa=5 pb=1 pc=6 -> b -> 21
        assert_eq!(row, [16, 21]);
    }

    #[test]
    fn bad_tag_names_row() {
        let mut row = [0u8; 3];
        let err = unfilter_row(5, &mut row, &[0; 3], 1, 9).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptPixelData);
        assert_eq!(err.location(), Some(Location::Row(9)));
    }
}
