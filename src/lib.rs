// pulp-view: host image viewer around smol-raster.
// Decodes one file and renders it into a framebuffer for presentation.

pub mod display;

use std::path::Path;

use smol_raster::{DecodeError, DecodeOptions, Image};

use crate::display::{FrameBuffer, draw_image};

// environment switch for chunk CRC verification
pub const VERIFY_CRC_ENV: &str = "PULP_VIEW_VERIFY_CRC";

/// Decode options from the value of [`VERIFY_CRC_ENV`], if set.
pub fn options_from_env(verify_crc: Option<&str>) -> DecodeOptions {
    let on = matches!(
        verify_crc.map(str::trim),
        Some("1") | Some("true") | Some("yes") | Some("on")
    );
    DecodeOptions::default().with_crc_check(on)
}

/// Decode `path` and draw it into a fresh framebuffer of the same size.
pub fn load(path: &Path, opts: &DecodeOptions) -> Result<(Image, FrameBuffer), DecodeError> {
    let image = smol_raster::decode_with(path, opts)?;
    let mut fb = FrameBuffer::new(image.width(), image.height());
    if let Err(e) = draw_image(&image, &mut fb) {
        match e {}
    }
    Ok((image, fb))
}
