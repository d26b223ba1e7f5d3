//! 二维码 SVG 渲染

use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use shiroha_errors::{AppError, AppResult};

/// 二维码最小边长（像素）
pub const QR_MIN_SIZE: u32 = 200;

/// 以纠错等级 M 渲染二维码
pub fn render_qr_svg(content: &str, min_size: u32) -> AppResult<String> {
    let code = QrCode::with_error_correction_level(content.as_bytes(), EcLevel::M)
        .map_err(|e| AppError::internal(format!("Failed to encode QR code: {}", e)))?;

    Ok(code
        .render::<svg::Color>()
        .min_dimensions(min_size, min_size)
        .build())
}
