//! 应用状态

use metrics_exporter_prometheus::PrometheusHandle;
use shiroha_ports::IdentityProvider;
use std::sync::Arc;

use super::cookies::SessionCookies;
use crate::application::{AuthService, ChallengeService, GameListing, GameService};
use crate::infrastructure::health::ReadinessProbe;

#[derive(Clone)]
pub struct AppState {
    pub games: Arc<GameService>,
    pub listing: Arc<GameListing>,
    pub challenges: Arc<ChallengeService>,
    pub auth: Arc<AuthService>,
    pub identity: Arc<dyn IdentityProvider>,
    pub readiness: Arc<dyn ReadinessProbe>,
    pub metrics: PrometheusHandle,
    pub cookies: SessionCookies,
    /// 每页最大条数
    pub max_page_size: u32,
    /// 管理接口需要的 realm 角色
    pub admin_role: String,
    /// 邮箱验证成功后的跳转地址
    pub verified_redirect_url: String,
}
