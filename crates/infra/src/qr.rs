//! QR code rendering for deep links.

use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};

use labinv_inventory::{CodeRenderer, RenderError, RenderedCode};

/// Renders payloads as SVG QR codes with high (H) error correction, so labels
/// stay scannable when partly scratched or covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrSvgRenderer {
    /// Minimum width/height of the image in pixels.
    pub min_dimension: u32,
}

impl Default for QrSvgRenderer {
    fn default() -> Self {
        Self { min_dimension: 240 }
    }
}

impl CodeRenderer for QrSvgRenderer {
    fn render(&self, payload: &str) -> Result<RenderedCode, RenderError> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H)
            .map_err(|e| RenderError(format!("{e} (payload of {} bytes)", payload.len())))?;

        let image = code
            .render::<svg::Color<'_>>()
            .min_dimensions(self.min_dimension, self.min_dimension)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build();

        Ok(RenderedCode {
            media_type: "image/svg+xml",
            bytes: image.into_bytes(),
        })
    }

    fn file_extension(&self) -> &'static str {
        "svg"
    }
}
