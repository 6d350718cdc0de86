//! Renders payloads (typically vCards from [`crate::vcard`]) as QR code SVG
//! images.

use qrcode::render::svg;
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};

/// Pixels per QR module.
const MODULE_SIZE: u32 = 10;

/// Encodes `payload` at error-correction level Q and renders it as an SVG
/// document with a 4-module quiet zone.
pub fn to_svg(payload: &str) -> Result<String, QrError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::Q)?;
    Ok(code
        .render::<svg::Color>()
        .quiet_zone(true)
        .module_dimensions(MODULE_SIZE, MODULE_SIZE)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_svg() -> Result<(), QrError> {
        let svg = to_svg("BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Jane\r\nEND:VCARD\r\n")?;
        assert!(svg.contains("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        Ok(())
    }

    #[test]
    fn test_deterministic() -> Result<(), QrError> {
        assert_eq!(to_svg("hello")?, to_svg("hello")?);
        Ok(())
    }

    #[test]
    fn test_too_long() {
        assert!(to_svg(&"x".repeat(4000)).is_err());
    }
}
