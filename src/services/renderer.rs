use image::{DynamicImage, Rgb};
use qrcode::QrCode;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::error::AppError;
use crate::services::logo::LOGO_FRACTION;
use crate::structs::render_config::RenderConfig;
use crate::utils::color::parse_color;

/// Nominal on-screen size of the SVG preview, in pixels.
pub const PREVIEW_SIZE: u32 = 256;

/// Square region of the module grid reserved for a logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Excavation {
    pub x: usize,
    pub y: usize,
    pub size: usize,
}

impl Excavation {
    /// Centered region covering `LOGO_FRACTION` of a grid `width` modules wide.
    pub fn centered(width: usize) -> Self {
        let extent = width as f64 * LOGO_FRACTION;
        let origin = (width as f64 - extent) / 2.0;
        Self {
            x: origin.floor() as usize,
            y: origin.floor() as usize,
            size: (extent.ceil() as usize).min(width),
        }
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.size && y >= self.y && y < self.y + self.size
    }
}

/// A rendered symbol: the SVG markup shown to the user plus what raster export needs.
#[derive(Debug, Clone)]
pub struct RenderedSymbol {
    svg: String,
    width: usize,
    modules: Vec<bool>,
    foreground: Rgb<u8>,
    background: Rgb<u8>,
    logo: Option<(Excavation, Arc<DynamicImage>)>,
}

impl RenderedSymbol {
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Width of the module grid (no quiet zone).
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.width + x]
    }

    pub fn foreground(&self) -> Rgb<u8> {
        self.foreground
    }

    pub fn background(&self) -> Rgb<u8> {
        self.background
    }

    pub fn logo(&self) -> Option<&(Excavation, Arc<DynamicImage>)> {
        self.logo.as_ref()
    }
}

/// Encode `payload` with the configured level and draw it.
pub fn render(payload: &str, config: &RenderConfig) -> Result<RenderedSymbol, AppError> {
    let foreground = parse_color(&config.foreground).ok_or_else(|| {
        AppError::RejectedConfiguration(format!("Invalid foreground color: {}", config.foreground))
    })?;
    let background = parse_color(&config.background).ok_or_else(|| {
        AppError::RejectedConfiguration(format!("Invalid background color: {}", config.background))
    })?;

    let code = QrCode::with_error_correction_level(payload.as_bytes(), config.level.into())?;
    let width = code.width();
    let mut modules: Vec<bool> = code
        .to_colors()
        .into_iter()
        .map(|color| color == qrcode::Color::Dark)
        .collect();

    let logo = config.logo.as_ref().map(|logo| {
        let excavation = Excavation::centered(width);
        for y in excavation.y..excavation.y + excavation.size {
            for x in excavation.x..excavation.x + excavation.size {
                modules[y * width + x] = false;
            }
        }
        (excavation, logo)
    });

    let mut svg = String::new();
    // Writing into a String cannot fail
    let _ = write!(
        svg,
        r#"<svg height="{size}" width="{size}" viewBox="0 0 {w} {w}" xmlns="http://www.w3.org/2000/svg">"#,
        size = PREVIEW_SIZE,
        w = width
    );
    let _ = write!(
        svg,
        r#"<path fill="{}" d="M0,0 h{w}v{w}H0z" shape-rendering="crispEdges"></path>"#,
        config.background,
        w = width
    );
    let _ = write!(
        svg,
        r#"<path fill="{}" d="{}" shape-rendering="crispEdges"></path>"#,
        config.foreground,
        module_path(&modules, width)
    );
    if let Some((excavation, logo)) = &logo {
        let _ = write!(
            svg,
            r#"<image href="{}" height="{s}" width="{s}" x="{x}" y="{y}" preserveAspectRatio="none"></image>"#,
            logo.data_uri(),
            s = excavation.size,
            x = excavation.x,
            y = excavation.y
        );
    }
    svg.push_str("</svg>");

    Ok(RenderedSymbol {
        svg,
        width,
        modules,
        foreground,
        background,
        logo: logo.map(|(excavation, logo)| (excavation, Arc::clone(logo.image()))),
    })
}

// One `h1v1h-1z` square per dark module, as in the usual path-based QR SVGs
fn module_path(modules: &[bool], width: usize) -> String {
    let mut path = String::new();
    for y in 0..width {
        for x in 0..width {
            if modules[y * width + x] {
                if !path.is_empty() {
                    path.push(' ');
                }
                let _ = write!(path, "M{},{}h1v1h-1z", x, y);
            }
        }
    }
    path
}
