//! 验证码渲染

mod captcha;
mod qr;

pub use self::captcha::{CaptchaStyle, render_captcha_svg, svg_data_url};
pub use self::qr::{QR_MIN_SIZE, render_qr_svg};

use shiroha_errors::AppResult;

use crate::domain::ChallengeRenderer;

/// SVG 渲染器
#[derive(Debug, Clone)]
pub struct SvgChallengeRenderer {
    captcha_style: CaptchaStyle,
    qr_min_size: u32,
}

impl SvgChallengeRenderer {
    pub fn new(captcha_style: CaptchaStyle, qr_min_size: u32) -> Self {
        Self {
            captcha_style,
            qr_min_size,
        }
    }
}

impl Default for SvgChallengeRenderer {
    fn default() -> Self {
        Self::new(CaptchaStyle::default(), QR_MIN_SIZE)
    }
}

impl ChallengeRenderer for SvgChallengeRenderer {
    fn captcha_data_url(&self, code: &str) -> AppResult<String> {
        let svg = render_captcha_svg(&mut rand::thread_rng(), code, &self.captcha_style);
        Ok(svg_data_url(&svg))
    }

    fn qr_svg(&self, code: &str) -> AppResult<String> {
        render_qr_svg(code, self.qr_min_size)
    }
}
