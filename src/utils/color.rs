use image::Rgb;
use validator::ValidationError;

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0x00, 0x00, 0x00]),
    ("white", [0xFF, 0xFF, 0xFF]),
    ("red", [0xFF, 0x00, 0x00]),
    ("green", [0x00, 0x80, 0x00]),
    ("lime", [0x00, 0xFF, 0x00]),
    ("blue", [0x00, 0x00, 0xFF]),
    ("navy", [0x00, 0x00, 0x80]),
    ("yellow", [0xFF, 0xFF, 0x00]),
    ("orange", [0xFF, 0xA5, 0x00]),
    ("purple", [0x80, 0x00, 0x80]),
    ("indigo", [0x4B, 0x00, 0x82]),
    ("teal", [0x00, 0x80, 0x80]),
    ("maroon", [0x80, 0x00, 0x00]),
    ("gray", [0x80, 0x80, 0x80]),
    ("grey", [0x80, 0x80, 0x80]),
    ("silver", [0xC0, 0xC0, 0xC0]),
];

/// Parse `#RGB`, `#RRGGBB` or a known color name (case-insensitive).
pub fn parse_color(value: &str) -> Option<Rgb<u8>> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
        .map(|(_, rgb)| Rgb(*rgb))
}

fn parse_hex(hex: &str) -> Option<Rgb<u8>> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut channels = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let nibble = c.to_digit(16)? as u8;
                channels[i] = nibble * 17;
            }
            Some(Rgb(channels))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgb([r, g, b]))
        }
        _ => None,
    }
}

/// `validator` hook for color fields.
pub fn validate_color(value: &str) -> Result<(), ValidationError> {
    match parse_color(value) {
        Some(_) => Ok(()),
        None => {
            let mut error = ValidationError::new("color");
            error.message = Some(format!("'{}' is not a hex or named color", value).into());
            Err(error)
        }
    }
}
