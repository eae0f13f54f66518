use image::{ImageFormat, Rgb, RgbImage, imageops::FilterType};
use std::io::Cursor;

use crate::error::AppError;
use crate::services::renderer::RenderedSymbol;

/// Edge length of exported PNGs, independent of the preview size.
pub const RASTER_SIZE: u32 = 1024;

/// The on-screen SVG, byte for byte.
pub fn export_svg(symbol: Option<&RenderedSymbol>) -> Result<Vec<u8>, AppError> {
    let symbol = symbol.ok_or(AppError::NothingToExport)?;
    Ok(symbol.svg().as_bytes().to_vec())
}

/// Rasterize the symbol onto a `RASTER_SIZE` square canvas filled with the
/// background color, then encode it as PNG.
pub fn export_png(symbol: Option<&RenderedSymbol>) -> Result<Vec<u8>, AppError> {
    let symbol = symbol.ok_or(AppError::NothingToExport)?;
    let canvas = rasterize(symbol, RASTER_SIZE);

    let mut bytes = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Draw the symbol scaled to fill a `size` x `size` canvas.
pub fn rasterize(symbol: &RenderedSymbol, size: u32) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(size, size, symbol.background());
    let width = symbol.width() as u64;
    let foreground = symbol.foreground();

    for (px, py, pixel) in canvas.enumerate_pixels_mut() {
        let x = (px as u64 * width / size as u64) as usize;
        let y = (py as u64 * width / size as u64) as usize;
        if symbol.is_dark(x, y) {
            *pixel = foreground;
        }
    }

    if let Some((excavation, logo)) = symbol.logo() {
        let scale = size as f64 / width as f64;
        let left = (excavation.x as f64 * scale).round() as u32;
        let top = (excavation.y as f64 * scale).round() as u32;
        let edge = ((excavation.size as f64 * scale).round() as u32).max(1);
        let overlay = image::imageops::resize(&logo.to_rgba8(), edge, edge, FilterType::Triangle);

        for (ox, oy, src) in overlay.enumerate_pixels() {
            let (cx, cy) = (left + ox, top + oy);
            if cx >= size || cy >= size {
                continue;
            }
            let dst = canvas.get_pixel_mut(cx, cy);
            *dst = blend(*dst, src.0);
        }
    }

    canvas
}

// Source-over compositing of an RGBA pixel onto an opaque one
fn blend(dst: Rgb<u8>, src: [u8; 4]) -> Rgb<u8> {
    let alpha = src[3] as u32;
    let mut out = [0u8; 3];
    for i in 0..3 {
        out[i] = ((src[i] as u32 * alpha + dst.0[i] as u32 * (255 - alpha) + 127) / 255) as u8;
    }
    Rgb(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::logo::{Logo, sample_png};
    use crate::services::renderer::render;
    use crate::structs::render_config::RenderConfig;

    fn colored_config() -> RenderConfig {
        RenderConfig {
            foreground: "#112233".to_string(),
            background: "#FFEEDD".to_string(),
            ..RenderConfig::default()
        }
    }

    #[test]
    fn nothing_to_export_without_symbol() {
        assert!(matches!(export_svg(None), Err(AppError::NothingToExport)));
        assert!(matches!(export_png(None), Err(AppError::NothingToExport)));
    }

    #[test]
    fn svg_export_is_verbatim_and_idempotent() {
        let symbol = render("https://example.com", &colored_config()).unwrap();
        let first = export_svg(Some(&symbol)).unwrap();
        let second = export_svg(Some(&symbol)).unwrap();
        assert_eq!(first, symbol.svg().as_bytes());
        assert_eq!(first, second);
    }

    #[test]
    fn png_export_is_fixed_size_with_background_fill() {
        let symbol = render("https://example.com", &colored_config()).unwrap();
        let bytes = export_png(Some(&symbol)).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (RASTER_SIZE, RASTER_SIZE));

        let module = RASTER_SIZE as f64 / symbol.width() as f64;
        let center = |m: usize| ((m as f64 + 0.5) * module) as u32;
        // (0,0) is the dark finder corner, (1,1) its light ring
        assert_eq!(*decoded.get_pixel(center(0), center(0)), Rgb([0x11, 0x22, 0x33]));
        assert_eq!(*decoded.get_pixel(center(1), center(1)), Rgb([0xFF, 0xEE, 0xDD]));
    }

    #[test]
    fn png_export_is_idempotent() {
        let symbol = render("idempotent", &RenderConfig::default()).unwrap();
        assert_eq!(export_png(Some(&symbol)).unwrap(), export_png(Some(&symbol)).unwrap());
    }

    #[test]
    fn logo_is_composited_in_the_center() {
        let mut config = RenderConfig::default();
        config.set_logo(Logo::from_bytes(&sample_png(8, 8), 1024 * 1024, 1024).unwrap());
        let symbol = render("https://example.com", &config).unwrap();
        let canvas = rasterize(&symbol, RASTER_SIZE);
        let mid = RASTER_SIZE / 2;
        let pixel = canvas.get_pixel(mid, mid).0;
        for (got, want) in pixel.iter().zip([220u8, 20, 60]) {
            assert!(got.abs_diff(want) <= 1, "{pixel:?}");
        }
    }

    #[test]
    fn blend_respects_alpha() {
        assert_eq!(blend(Rgb([0, 0, 0]), [255, 255, 255, 255]), Rgb([255, 255, 255]));
        assert_eq!(blend(Rgb([10, 20, 30]), [255, 255, 255, 0]), Rgb([10, 20, 30]));
    }
}
