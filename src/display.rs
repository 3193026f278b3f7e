// Host framebuffer: 32-bit 0x00RRGGBB words, rows `pitch` words apart.
// Decoded images are drawn through the embedded-graphics DrawTarget seam;
// translucent pixels are blended over white, the viewer's background.

use core::convert::Infallible;

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::{Rgb888, RgbColor},
};
use smol_raster::Image;

// row pitch granularity in words
const PITCH_ALIGN: usize = 4;

const WHITE: u32 = 0x00FF_FFFF;

#[derive(Debug)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pitch: usize,
    words: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let pitch = (width as usize).next_multiple_of(PITCH_ALIGN);
        Self {
            width,
            height,
            pitch,
            words: vec![WHITE; pitch * height as usize],
        }
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn word(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.words[y as usize * self.pitch + x as usize])
    }
}

#[inline]
fn map_rgb(c: Rgb888) -> u32 {
    (c.r() as u32) << 16 | (c.g() as u32) << 8 | c.b() as u32
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 {
                continue;
            }
            let (x, y) = (x as u32, y as u32);
            if x >= self.width || y >= self.height {
                continue;
            }
            self.words[y as usize * self.pitch + x as usize] = map_rgb(color);
        }
        Ok(())
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

// alpha-blend against white: out = c*a/255 + 255*(255-a)/255
#[inline]
fn blend_white(c: u8, alpha: u8) -> u8 {
    let c = c as u16;
    let a = alpha as u16;
    ((c * a + 255 * (255 - a)) / 255) as u8
}

/// Draw `image` with its top-left corner at the origin. The image is only
/// read.
pub fn draw_image<D>(image: &Image, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let pixels = image.rows().enumerate().flat_map(|(y, row)| {
        row.iter().enumerate().map(move |(x, p)| {
            let color = Rgb888::new(
                blend_white(p.r, p.a),
                blend_white(p.g, p.a),
                blend_white(p.b, p.a),
            );
            Pixel(Point::new(x as i32, y as i32), color)
        })
    });
    target.draw_iter(pixels)
}
