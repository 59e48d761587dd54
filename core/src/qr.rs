//! QR code rendering for payloads
//!
//! Rendering sits behind [`QrImageEncoder`] so the payment service can treat
//! it as a fallible collaborator: a payload is valid and usable even when no
//! image could be produced for it.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use qrcode::{Color, EcLevel, QrCode};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Largest image side we agree to allocate
const MAX_IMAGE_SIDE: u32 = 8192;

/// RGBA color used for QR modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrColor(pub [u8; 4]);

impl QrColor {
    pub const BLACK: QrColor = QrColor([0x00, 0x00, 0x00, 0xFF]);
    pub const WHITE: QrColor = QrColor([0xFF, 0xFF, 0xFF, 0xFF]);

    /// Parse `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !(digits.len() == 6 || digits.len() == 8) || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::QrEncoding(format!("invalid color {:?}", hex)));
        }

        let mut rgba = [0xFF; 4];
        for (i, slot) in rgba.iter_mut().enumerate().take(digits.len() / 2) {
            *slot = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
                .map_err(|_| Error::QrEncoding(format!("invalid color {:?}", hex)))?;
        }
        Ok(Self(rgba))
    }

    /// `#RRGGBB`, with the alpha byte appended only when not opaque
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.0;
        if a == 0xFF {
            format!("#{:02X}{:02X}{:02X}", r, g, b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
        }
    }
}

impl FromStr for QrColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for QrColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Options for QR rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrOptions {
    /// Pixels per module side
    pub module_size: u32,
    /// Quiet zone around the symbol, in modules
    pub margin: u32,
    /// Color of dark modules
    pub foreground: QrColor,
    /// Color of light modules and the quiet zone
    pub background: QrColor,
}

impl Default for QrOptions {
    fn default() -> Self {
        // a typical Pix payload is a 45-49 module symbol, ~300 px at this size
        Self {
            module_size: 6,
            margin: 2,
            foreground: QrColor::BLACK,
            background: QrColor::WHITE,
        }
    }
}

/// Rendered QR image (PNG)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl QrImage {
    pub fn as_bytes(&self) -> &[u8] {
        &self.png
    }

    /// Embeddable `data:image/png;base64,...` form
    pub fn to_data_uri(&self) -> String {
        format!("data:image/png;base64,{}", BASE64.encode(&self.png))
    }
}

/// Something that can turn payload text into a QR image.
pub trait QrImageEncoder: Send + Sync {
    fn encode(&self, text: &str, options: &QrOptions) -> Result<QrImage>;
}

/// Default encoder: `qrcode` for the symbol, `image` for PNG output
#[derive(Debug, Clone, Copy)]
pub struct PngQrEncoder {
    ec_level: EcLevel,
}

impl PngQrEncoder {
    pub fn new() -> Self {
        Self { ec_level: EcLevel::M }
    }

    pub fn with_error_correction(ec_level: EcLevel) -> Self {
        Self { ec_level }
    }
}

impl Default for PngQrEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl QrImageEncoder for PngQrEncoder {
    fn encode(&self, text: &str, options: &QrOptions) -> Result<QrImage> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), self.ec_level)
            .map_err(|e| Error::QrEncoding(format!("QR generation failed: {}", e)))?;

        let image = rasterize(&code, options)?;

        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgba8)
            .map_err(|e| Error::QrEncoding(format!("PNG encoding failed: {}", e)))?;

        Ok(QrImage {
            png,
            width: image.width(),
            height: image.height(),
        })
    }
}

/// Paint the symbol module by module, honoring margin and colors exactly.
fn rasterize(code: &QrCode, options: &QrOptions) -> Result<RgbaImage> {
    if options.module_size == 0 {
        return Err(Error::QrEncoding("module size must be at least 1 pixel".to_string()));
    }

    let modules = code.width() as u32;
    let side = options
        .margin
        .checked_mul(2)
        .and_then(|m| m.checked_add(modules))
        .and_then(|n| n.checked_mul(options.module_size))
        .filter(|&side| side <= MAX_IMAGE_SIDE)
        .ok_or_else(|| Error::QrEncoding(format!("image would exceed {} px per side", MAX_IMAGE_SIDE)))?;

    let dark = Rgba(options.foreground.0);
    let mut img = RgbaImage::from_pixel(side, side, Rgba(options.background.0));
    let scale = options.module_size;

    for (i, color) in code.to_colors().iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let x = (i as u32 % modules + options.margin) * scale;
        let y = (i as u32 / modules + options.margin) * scale;
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(x + dx, y + dy, dark);
            }
        }
    }

    Ok(img)
}

/// Render `text` as an SVG document.
///
/// The SVG renderer only knows a fixed 4-module quiet zone, used whenever
/// `margin` is non-zero.
pub fn render_svg(text: &str, options: &QrOptions) -> Result<String> {
    use qrcode::render::svg;

    let code = QrCode::new(text.as_bytes())
        .map_err(|e| Error::QrEncoding(format!("QR generation failed: {}", e)))?;

    let dark = options.foreground.to_hex();
    let light = options.background.to_hex();
    let svg = code
        .render::<svg::Color>()
        .quiet_zone(options.margin > 0)
        .module_dimensions(options.module_size.max(1), options.module_size.max(1))
        .dark_color(svg::Color(&dark))
        .light_color(svg::Color(&light))
        .build();

    Ok(svg)
}
