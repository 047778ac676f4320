use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageFormat};

use crate::domain::{common::entities::app_errors::CoreError, donation::entities::EncodedImage};

pub const TRANSPORT_MIME_TYPE: &str = "image/jpeg";

/// Decodes a base64 payload, tolerating `data:image/...;base64,` prefixes and line breaks.
pub fn decode_base64_image(payload: &str, max_bytes: usize) -> Result<Vec<u8>, CoreError> {
    let payload = payload.trim();
    let payload = match payload.split_once(";base64,") {
        Some((header, data)) if header.starts_with("data:") => data,
        _ => payload,
    };

    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| CoreError::InvalidImageData(format!("invalid base64: {}", e)))?;

    if bytes.is_empty() {
        return Err(CoreError::InvalidImageData("empty image payload".to_string()));
    }

    if bytes.len() > max_bytes {
        return Err(CoreError::ImageTooLarge { max_bytes });
    }

    Ok(bytes)
}

/// Decodes any supported image and re-encodes it as three-channel JPEG.
pub fn normalize_image(bytes: &[u8]) -> Result<EncodedImage, CoreError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| CoreError::InvalidImageData(format!("failed to decode image: {}", e)))?;

    let rgb = match image {
        DynamicImage::ImageRgb8(_) => image,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };

    let mut cursor = Cursor::new(Vec::new());
    rgb.write_to(&mut cursor, ImageFormat::Jpeg)
        .map_err(|e| CoreError::Internal(format!("failed to encode image: {}", e)))?;

    Ok(EncodedImage {
        data: cursor.into_inner(),
        mime_type: TRANSPORT_MIME_TYPE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_with_alpha() -> Vec<u8> {
        let image = RgbaImage::from_pixel(4, 4, Rgba([200, 10, 10, 128]));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut cursor, ImageFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_normalize_converts_rgba_png_to_jpeg() {
        let encoded = normalize_image(&png_with_alpha()).unwrap();

        assert_eq!(encoded.mime_type, "image/jpeg");
        assert_eq!(&encoded.data[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&encoded.data).unwrap();
        assert!(matches!(decoded, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        let error = normalize_image(b"definitely not an image").unwrap_err();
        assert!(matches!(error, CoreError::InvalidImageData(_)));
    }

    #[test]
    fn test_decode_accepts_data_url_and_line_breaks() {
        let png = png_with_alpha();
        let encoded = general_purpose::STANDARD.encode(&png);
        let (head, tail) = encoded.split_at(10);
        let payload = format!("data:image/png;base64,{}\n{}", head, tail);

        let bytes = decode_base64_image(&payload, 1024 * 1024).unwrap();
        assert_eq!(bytes, png);
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        let error = decode_base64_image("@@not base64@@", 1024).unwrap_err();
        assert!(matches!(error, CoreError::InvalidImageData(_)));
    }

    #[test]
    fn test_decode_rejects_empty_payload() {
        let error = decode_base64_image("", 1024).unwrap_err();
        assert!(matches!(error, CoreError::InvalidImageData(_)));
    }

    #[test]
    fn test_decode_enforces_size_limit() {
        let encoded = general_purpose::STANDARD.encode([0u8; 64]);
        let error = decode_base64_image(&encoded, 32).unwrap_err();
        assert_eq!(error, CoreError::ImageTooLarge { max_bytes: 32 });
    }
}
