//! QR code images for the link actions.

use egui::{Color32, ColorImage};

/// Decode a PNG served by `/api/qrcode`.
pub fn decode_png(bytes: &[u8]) -> Option<ColorImage> {
    let image = match image::load_from_memory_with_format(bytes, image::ImageFormat::Png) {
        Ok(image) => image.to_rgba8(),
        Err(err) => {
            log::warn!("Failed to decode QR code PNG: {err}");
            return None;
        }
    };

    let size = [image.width() as usize, image.height() as usize];
    Some(ColorImage::from_rgba_unmultiplied(size, image.as_raw()))
}

/// Generate a QR code image from data.
///
/// Used when the backend image is unavailable.
pub fn generate_qr_image(data: &str, size: usize) -> Option<ColorImage> {
    let code = qrcode::QrCode::new(data.as_bytes()).ok()?;
    let qr_width = code.width();

    let scale = (size / qr_width).max(1);
    let actual_size = qr_width * scale;

    let mut pixels = vec![Color32::WHITE; actual_size * actual_size];

    for (y, row) in code.to_colors().chunks(qr_width).enumerate() {
        for (x, color) in row.iter().enumerate() {
            if *color == qrcode::Color::Light {
                continue;
            }
            for py in y * scale..(y + 1) * scale {
                let start = py * actual_size + x * scale;
                pixels[start..start + scale].fill(Color32::BLACK);
            }
        }
    }

    Some(ColorImage::new([actual_size, actual_size], pixels))
}
