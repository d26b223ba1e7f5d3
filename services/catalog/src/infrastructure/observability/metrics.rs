//! Catalog Metrics
//!
//! 业务指标记录

use metrics::counter;

// ============================================================================
// 列表缓存 Metrics
// ============================================================================

/// 列表页缓存查询结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    Hit,
    Miss,
    Error,
}

impl CacheLookup {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Error => "error",
        }
    }
}

/// 记录列表页缓存查询
pub fn record_page_cache_lookup(result: CacheLookup) {
    let labels = [("result", result.as_str().to_string())];
    counter!("catalog_page_cache_lookups_total", &labels).increment(1);
}

/// 记录列表页缓存写入失败
pub fn record_page_cache_write_failure() {
    counter!("catalog_page_cache_write_failures_total").increment(1);
}

// ============================================================================
// 验证码 Metrics
// ============================================================================

/// 记录验证码签发
pub fn record_challenge_issued(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!("catalog_challenges_issued_total", &labels).increment(1);
}

/// 记录验证码校验
pub fn record_challenge_verification(success: bool) {
    let labels = [("success", success.to_string())];
    counter!("catalog_challenge_verifications_total", &labels).increment(1);
}

// ============================================================================
// 认证 Metrics
// ============================================================================

/// 记录登录尝试
pub fn record_login_attempt(success: bool) {
    let labels = [("success", success.to_string())];
    counter!("catalog_login_attempts_total", &labels).increment(1);
}

/// 记录注册
pub fn record_registration(success: bool) {
    let labels = [("success", success.to_string())];
    counter!("catalog_registrations_total", &labels).increment(1);
}

/// 记录会话刷新
pub fn record_session_refresh(success: bool) {
    let labels = [("success", success.to_string())];
    counter!("catalog_session_refreshes_total", &labels).increment(1);
}
