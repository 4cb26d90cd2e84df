//! Image encoding: `DynamicImage` → base64 PNG [`PageImage`].
//!
//! PNG is lossless; JPEG artefacts on rendered text degrade transcription.

use crate::pipeline::document::PageImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

pub const PNG_MIME: &str = "image/png";

/// Encode a rasterised page as a base64 PNG.
pub fn encode_page(page: usize, img: &DynamicImage) -> Result<PageImage, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let data = STANDARD.encode(&buf);
    debug!("Encoded page {} → {} bytes base64", page, data.len());

    Ok(PageImage {
        page,
        data,
        mime_type: PNG_MIME.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let encoded = encode_page(4, &img).expect("encode should succeed");
        assert_eq!(encoded.page, 4);
        assert_eq!(encoded.mime_type, "image/png");
        let decoded = STANDARD.decode(&encoded.data).expect("valid base64");
        assert_eq!(&decoded[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn encoding_is_deterministic() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(7, 3, Rgba([0, 0, 0, 255])));
        assert_eq!(encode_page(1, &img).unwrap(), encode_page(1, &img).unwrap());
    }
}
