use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use std::sync::Arc;

use crate::error::AppError;

/// Share of the symbol's edge reserved for the logo (48 of 256 units).
pub const LOGO_FRACTION: f64 = 48.0 / 256.0;

/// An uploaded logo: the embeddable data reference plus the decoded image
/// kept around for raster export. Clones share the decoded pixels.
#[derive(Debug, Clone)]
pub struct Logo {
    data_uri: String,
    image: Arc<DynamicImage>,
}

impl Logo {
    /// Accept raw upload bytes if they decode as a raster image, fit the byte
    /// cap, and are at most `max_dimension` pixels on each side.
    pub fn from_bytes(
        bytes: &[u8],
        max_bytes: usize,
        max_dimension: u32,
    ) -> Result<Self, AppError> {
        if bytes.is_empty() {
            return Err(AppError::RejectedConfiguration(
                "Logo upload is empty".to_string(),
            ));
        }
        if bytes.len() > max_bytes {
            return Err(AppError::RejectedConfiguration(format!(
                "Logo is {} bytes, the limit is {} bytes",
                bytes.len(),
                max_bytes
            )));
        }

        let format = image::guess_format(bytes).map_err(|_| {
            AppError::RejectedConfiguration("Logo is not a recognized image".to_string())
        })?;
        // Header only; a small file can still claim a huge canvas
        let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
            .into_dimensions()
            .map_err(|e| {
                AppError::RejectedConfiguration(format!("Logo could not be decoded: {}", e))
            })?;
        if width > max_dimension || height > max_dimension {
            return Err(AppError::RejectedConfiguration(format!(
                "Logo is {}x{} pixels, the limit is {}x{}",
                width, height, max_dimension, max_dimension
            )));
        }

        let image = image::load_from_memory_with_format(bytes, format).map_err(|e| {
            AppError::RejectedConfiguration(format!("Logo could not be decoded: {}", e))
        })?;

        let data_uri = format!(
            "data:{};base64,{}",
            format.to_mime_type(),
            STANDARD.encode(bytes)
        );

        Ok(Self {
            data_uri,
            image: Arc::new(image),
        })
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    pub fn image(&self) -> &Arc<DynamicImage> {
        &self.image
    }
}

impl PartialEq for Logo {
    fn eq(&self, other: &Self) -> bool {
        self.data_uri == other.data_uri
    }
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    use image::{ImageFormat, Rgba, RgbaImage};

    let img = RgbaImage::from_pixel(width, height, Rgba([220, 20, 60, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encoding a sample png");
    bytes
}
