//! 图形验证码 SVG 渲染

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;

/// 图形验证码样式
#[derive(Debug, Clone)]
pub struct CaptchaStyle {
    pub width: u32,
    pub height: u32,
    /// 单个字符最大倾斜系数
    pub max_skew: f64,
    /// 干扰点数量
    pub dot_count: usize,
}

impl Default for CaptchaStyle {
    fn default() -> Self {
        Self {
            width: 240,
            height: 80,
            max_skew: 0.7,
            dot_count: 80,
        }
    }
}

/// 渲染验证码 SVG
///
/// 每个字符独立倾斜和旋转，背景叠加随机干扰点
pub fn render_captcha_svg<R: Rng + ?Sized>(rng: &mut R, code: &str, style: &CaptchaStyle) -> String {
    let width = f64::from(style.width);
    let height = f64::from(style.height);
    let glyphs: Vec<char> = code.chars().collect();
    let slot = width / glyphs.len().max(1) as f64;

    let mut svg = String::with_capacity(4096);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = style.width,
        h = style.height
    ));
    svg.push_str(r##"<rect width="100%" height="100%" fill="#ffffff"/>"##);

    for _ in 0..style.dot_count {
        svg.push_str(&format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}"/>"#,
            rng.gen_range(0.0..width),
            rng.gen_range(0.0..height),
            rng.gen_range(0.8..2.4),
            random_color(rng, 120, 220)
        ));
    }

    for (index, glyph) in glyphs.iter().enumerate() {
        let font_size = rng.gen_range(height * 0.55..height * 0.75);
        let x = slot * index as f64 + slot / 2.0 + rng.gen_range(-slot * 0.15..=slot * 0.15);
        let y = height / 2.0 + font_size / 3.0 + rng.gen_range(-height * 0.08..=height * 0.08);
        // skewX 以角度表示，max_skew=1 对应 45 度
        let skew = rng.gen_range(-style.max_skew..=style.max_skew) * 45.0;
        let rotate = rng.gen_range(-15.0..=15.0);

        svg.push_str(&format!(
            r#"<text x="{x:.1}" y="{y:.1}" font-family="monospace" font-size="{font_size:.1}" font-weight="bold" text-anchor="middle" fill="{color}" transform="rotate({rotate:.1} {x:.1} {y:.1}) skewX({skew:.1})">{glyph}</text>"#,
            color = random_color(rng, 20, 110),
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// 以 base64 data URL 形式嵌入
pub fn svg_data_url(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

fn random_color<R: Rng + ?Sized>(rng: &mut R, min: u8, max: u8) -> String {
    format!(
        "#{:02x}{:02x}{:02x}",
        rng.gen_range(min..=max),
        rng.gen_range(min..=max),
        rng.gen_range(min..=max)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_svg_contains_every_glyph() {
        let mut rng = StdRng::seed_from_u64(7);
        let svg = render_captcha_svg(&mut rng, "402913", &CaptchaStyle::default());

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"width="240" height="80""#));
        assert_eq!(svg.matches("<text").count(), 6);
        for digit in ["4", "0", "2", "9", "1", "3"] {
            assert!(svg.contains(&format!(">{}</text>", digit)));
        }
    }

    #[test]
    fn test_noise_dot_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let style = CaptchaStyle {
            dot_count: 12,
            ..CaptchaStyle::default()
        };
        let svg = render_captcha_svg(&mut rng, "1", &style);
        assert_eq!(svg.matches("<circle").count(), 12);
    }

    #[test]
    fn test_data_url_decodes_back() {
        let url = svg_data_url("<svg></svg>");
        let encoded = url.strip_prefix("data:image/svg+xml;base64,").unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), b"<svg></svg>");
    }
}
