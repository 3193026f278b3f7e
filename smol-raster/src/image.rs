//! Uniform decoded image: a flat, row-major RGBA pixel array.
//!
//! Rows are projections computed from `y * width`; nothing stores
//! pointers into the backing array, so there is no separate row table to
//! keep in sync with it. Dimensions are fixed at construction.

use core::slice::{ChunksExact, ChunksExactMut};

use crate::error::{DecodeError, Location, Result};

/// One RGBA sample, 8 bits per channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    // alpha fixed to fully opaque
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn grey(v: u8, a: u8) -> Self {
        Self { r: v, g: v, b: v, a }
    }
}

/// Decoded image. Invariant: `width > 0`, `height > 0`,
/// `data.len() == width * height`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<Pixel>,
}

impl Image {
    /// Allocate a zeroed `width x height` image.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(DecodeError::header("zero image dimensions", Location::Unknown));
        }
        let count = (width as usize)
            .checked_mul(height as usize)
            .ok_or(DecodeError::OutOfMemory { bytes: usize::MAX })?;

        let mut data = Vec::new();
        data.try_reserve_exact(count)
            .map_err(|_| DecodeError::OutOfMemory {
                bytes: count.saturating_mul(size_of::<Pixel>()),
            })?;
        data.resize(count, Pixel::default());

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Index of `(x, y)` in [`Image::pixels`].
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[self.offset(x, y)])
    }

    /// Row `y`; panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[Pixel] {
        let start = self.offset(0, y);
        &self.data[start..start + self.width as usize]
    }

    pub(crate) fn row_mut(&mut self, y: u32) -> &mut [Pixel] {
        let start = self.offset(0, y);
        let w = self.width as usize;
        &mut self.data[start..start + w]
    }

    pub fn rows(&self) -> ChunksExact<'_, Pixel> {
        self.data.chunks_exact(self.width as usize)
    }

    pub(crate) fn rows_mut(&mut self) -> ChunksExactMut<'_, Pixel> {
        let w = self.width as usize;
        self.data.chunks_exact_mut(w)
    }

    /// Flat `RGBA8` copy, 4 bytes per pixel, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.data.iter().flat_map(|p| [p.r, p.g, p.b, p.a]).collect()
    }
}
