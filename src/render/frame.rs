use std::sync::Arc;

use anyhow::Context as _;
use base64::Engine as _;

use crate::foundation::core::Canvas;
use crate::foundation::error::{IgError, IgResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;

/// A rendered frame as RGBA8 pixels.
///
/// Frames produced by the scene renderer are premultiplied alpha; the flag makes this explicit at
/// API boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixel data.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }
}

/// Owned handle to a finished canvas.
///
/// The pixels are immutable after rendering, so every export reads the same frame and exporting
/// more than once is always safe.
#[derive(Clone, Debug)]
pub struct RenderedCanvas {
    frame: Arc<FrameRGBA>,
}

impl RenderedCanvas {
    pub(crate) fn from_frame(frame: FrameRGBA) -> Self {
        Self {
            frame: Arc::new(frame),
        }
    }

    /// Wrap externally produced premultiplied pixels.
    pub fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> IgResult<Self> {
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if width == 0 || height == 0 || data.len() != expected {
            return Err(IgError::invalid_input(format!(
                "canvas data must be {width}x{height}x4 = {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self::from_frame(FrameRGBA {
            width,
            height,
            data,
            premultiplied: true,
        }))
    }

    pub fn width(&self) -> u32 {
        self.frame.width
    }

    pub fn height(&self) -> u32 {
        self.frame.height
    }

    pub fn size(&self) -> Canvas {
        Canvas {
            width: self.frame.width,
            height: self.frame.height,
        }
    }

    /// Borrow the raw frame.
    pub fn frame(&self) -> &FrameRGBA {
        &self.frame
    }

    /// Encode the canvas as a PNG.
    pub fn to_png_bytes(&self) -> IgResult<Vec<u8>> {
        let rgba = self.frame.to_straight_rgba8();
        let img = image::RgbaImage::from_raw(self.frame.width, self.frame.height, rgba)
            .ok_or_else(|| IgError::invalid_input("canvas buffer does not match its size"))?;
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .context("encode canvas as png")?;
        Ok(out.into_inner())
    }

    /// PNG encoded as a `data:image/png;base64,...` URI for previews.
    pub fn to_data_uri(&self) -> IgResult<String> {
        let png = self.to_png_bytes()?;
        Ok(png_data_uri(&png))
    }
}

pub(crate) fn png_data_uri(png: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(png);
    format!("data:image/png;base64,{b64}")
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
