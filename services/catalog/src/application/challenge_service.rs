//! 验证码服务
//!
//! 验证码存放在 `captcha:<id>`，校验时原子地取出并删除，
//! 因此无论结果如何同一个验证码只能校验一次。

use shiroha_config::ChallengeConfig;
use shiroha_errors::AppResult;
use shiroha_ports::CachePort;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::challenge::{challenge_key, generate_code};
use crate::domain::{Challenge, ChallengeAnswer, ChallengeKind, ChallengeRenderer};
use crate::infrastructure::observability::{record_challenge_issued, record_challenge_verification};

pub struct ChallengeService {
    cache: Arc<dyn CachePort>,
    renderer: Arc<dyn ChallengeRenderer>,
    config: ChallengeConfig,
}

impl ChallengeService {
    pub fn new(
        cache: Arc<dyn CachePort>,
        renderer: Arc<dyn ChallengeRenderer>,
        config: ChallengeConfig,
    ) -> Self {
        Self {
            cache,
            renderer,
            config,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.config.ttl_secs)
    }

    fn generate(&self, kind: ChallengeKind) -> Challenge {
        let length = match kind {
            ChallengeKind::Captcha => self.config.captcha_length,
            ChallengeKind::QrCode => self.config.qr_length,
        };
        let code = generate_code(&mut rand::thread_rng(), kind.charset(), length);

        Challenge {
            id: shiroha_common::random_id().to_string(),
            code,
            kind,
        }
    }

    async fn store(&self, challenge: &Challenge) -> AppResult<()> {
        self.cache
            .set(&challenge_key(&challenge.id), &challenge.code, Some(self.ttl()))
            .await?;

        record_challenge_issued(challenge.kind.as_str());
        debug!(challenge_id = %challenge.id, kind = challenge.kind.as_str(), "Challenge issued");
        Ok(())
    }

    /// 签发图形验证码，返回验证码和 base64 data URL
    pub async fn issue_captcha(&self) -> AppResult<(Challenge, String)> {
        let challenge = self.generate(ChallengeKind::Captcha);
        let image = self.renderer.captcha_data_url(&challenge.code)?;
        self.store(&challenge).await?;
        Ok((challenge, image))
    }

    /// 签发二维码验证码，返回验证码和 SVG
    pub async fn issue_qr(&self) -> AppResult<(Challenge, String)> {
        let challenge = self.generate(ChallengeKind::QrCode);
        let svg = self.renderer.qr_svg(&challenge.code)?;
        self.store(&challenge).await?;
        Ok((challenge, svg))
    }

    /// 校验答案，见 [`ChallengeAnswer::matches`]
    pub async fn verify(&self, id: &str, answer: &ChallengeAnswer) -> AppResult<bool> {
        if id.is_empty() {
            record_challenge_verification(false);
            return Ok(false);
        }

        let stored = self.cache.take(&challenge_key(id)).await?;
        let success = stored.is_some_and(|code| answer.matches(&code));

        record_challenge_verification(success);
        debug!(challenge_id = %id, success, "Challenge verified");
        Ok(success)
    }
}
