//! 验证码

use rand::Rng;
use serde::Deserialize;
use shiroha_errors::AppResult;

/// 图形验证码字符集
pub const DIGITS: &[u8] = b"0123456789";

/// 二维码验证码字符集
pub const ALPHANUMERIC: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// 缓存键前缀
pub const CHALLENGE_KEY_PREFIX: &str = "captcha";

/// 验证码类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeKind {
    /// 图形数字验证码
    Captcha,
    /// 二维码
    QrCode,
}

impl ChallengeKind {
    pub fn charset(&self) -> &'static [u8] {
        match self {
            Self::Captcha => DIGITS,
            Self::QrCode => ALPHANUMERIC,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Captcha => "captcha",
            Self::QrCode => "qrcode",
        }
    }
}

/// 已签发的验证码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub id: String,
    pub code: String,
    pub kind: ChallengeKind,
}

/// 提交的验证码答案
///
/// JSON 数字会丢掉前导零，比较时按存储值的长度左侧补零；字符串必须完全一致
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ChallengeAnswer {
    Text(String),
    Number(u64),
}

impl ChallengeAnswer {
    /// 空的存储值永远不匹配
    pub fn matches(&self, code: &str) -> bool {
        if code.is_empty() {
            return false;
        }
        match self {
            Self::Text(text) => text == code,
            Self::Number(number) => format!("{:0width$}", number, width = code.len()) == code,
        }
    }
}

impl From<&str> for ChallengeAnswer {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// 验证码图片渲染
pub trait ChallengeRenderer: Send + Sync {
    /// 图形验证码，返回 `data:image/svg+xml;base64,...`
    fn captcha_data_url(&self, code: &str) -> AppResult<String>;

    /// 二维码 SVG 文本
    fn qr_svg(&self, code: &str) -> AppResult<String>;
}

/// 从字符集中随机生成验证码
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R, charset: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| char::from(charset[rng.gen_range(0..charset.len())]))
        .collect()
}

/// 缓存键 `captcha:<id>`
pub fn challenge_key(id: &str) -> String {
    format!("{}:{}", CHALLENGE_KEY_PREFIX, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captcha_code_is_digits() {
        let mut rng = rand::thread_rng();
        let code = generate_code(&mut rng, ChallengeKind::Captcha.charset(), 6);
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_qr_code_is_upper_alphanumeric() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let code = generate_code(&mut rng, ChallengeKind::QrCode.charset(), 4);
            assert_eq!(code.len(), 4);
            assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_numeric_answer_padded_to_stored_length() {
        assert!(ChallengeAnswer::Number(42).matches("000042"));
        assert!(ChallengeAnswer::Number(42).matches("0042"));
        assert!(ChallengeAnswer::Number(1234).matches("1234"));
        assert!(!ChallengeAnswer::Number(42).matches("00042A"));
        assert!(!ChallengeAnswer::Number(1_234_567).matches("123456"));
    }

    #[test]
    fn test_text_answer_is_exact() {
        assert!(ChallengeAnswer::from("0042").matches("0042"));
        assert!(!ChallengeAnswer::from("42").matches("0042"));
        assert!(!ChallengeAnswer::from("ab12").matches("AB12"));
        assert!(!ChallengeAnswer::from("").matches(""));
    }

    #[test]
    fn test_answer_from_json() {
        let number: ChallengeAnswer = serde_json::from_str("42").unwrap();
        assert_eq!(number, ChallengeAnswer::Number(42));

        let text: ChallengeAnswer = serde_json::from_str("\"004211\"").unwrap();
        assert_eq!(text, ChallengeAnswer::from("004211"));
    }

    #[test]
    fn test_challenge_key() {
        assert_eq!(challenge_key("abc"), "captcha:abc");
    }
}
