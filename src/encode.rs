use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};

use crate::error::Result;

/// Turns a text payload into an encoded image artifact.
///
/// Must be deterministic: the same text always yields the same bytes.
/// Injectable so tests can substitute a failing implementation.
pub trait Encoder: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<u8>>;
}

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// QR-to-PNG encoder.
///
/// Defaults match the original deployment's readability tuning: medium error
/// correction, 20 px modules, and an 8-module quiet border so the code stays
/// scannable from across a room.
#[derive(Debug, Clone)]
pub struct QrPngEncoder {
    pub ec_level: EcLevel,
    /// Pixels per QR module
    pub module_size: u32,
    /// Quiet-zone width in modules
    pub border: u32,
}

impl Default for QrPngEncoder {
    fn default() -> Self {
        Self {
            ec_level: EcLevel::M,
            module_size: 20,
            border: 8,
        }
    }
}

impl QrPngEncoder {
    fn render(&self, code: &QrCode) -> GrayImage {
        let modules = code.width() as u32;
        let size = (modules + 2 * self.border) * self.module_size;
        let mut img = GrayImage::from_pixel(size, size, LIGHT);

        let colors = code.to_colors();
        for (i, color) in colors.iter().enumerate() {
            if *color != Color::Dark {
                continue;
            }
            let mx = (i as u32 % modules + self.border) * self.module_size;
            let my = (i as u32 / modules + self.border) * self.module_size;
            for y in my..my + self.module_size {
                for x in mx..mx + self.module_size {
                    img.put_pixel(x, y, DARK);
                }
            }
        }
        img
    }
}

impl Encoder for QrPngEncoder {
    fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let code = QrCode::with_error_correction_level(text, self.ec_level)?;
        let img = self.render(&code);

        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}
