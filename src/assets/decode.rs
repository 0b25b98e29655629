use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::IgResult;
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> IgResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Read only the header of encoded image bytes and return `(width, height)`.
pub fn probe_dimensions(bytes: &[u8]) -> IgResult<(u32, u32)> {
    let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .context("guess image format")?;
    let dims = reader.into_dimensions().context("read image dimensions")?;
    Ok(dims)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
