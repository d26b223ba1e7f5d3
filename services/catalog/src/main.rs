//! Shiroha Catalog Service - 服务入口

use axum::http::{HeaderValue, Method, header};
use secrecy::ExposeSecret;
use shiroha_adapter_email::{EmailSender, MailApiClient, SmtpEmailClient};
use shiroha_adapter_keycloak::{KeycloakClient, KeycloakConfigBuilder};
use shiroha_adapter_postgres::{MigrationManager, PostgresConfig, create_pool};
use shiroha_adapter_redis::{RedisCache, create_connection_manager};
use shiroha_catalog::api::{self, AppState, SessionCookies};
use shiroha_catalog::application::{
    AuthService, AuthSettings, ChallengeService, GameListing, GameService, PageCache,
};
use shiroha_catalog::domain::GameRepository;
use shiroha_catalog::infrastructure::health::InfraReadiness;
use shiroha_catalog::infrastructure::persistence::{PostgresGameRepository, catalog_migrations};
use shiroha_catalog::infrastructure::render::SvgChallengeRenderer;
use shiroha_config::{AppConfig, EmailTransport, config_dir};
use shiroha_errors::AppError;
use shiroha_ports::{CachePort, HashCachePort, IdentityProvider};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

/// 邮件 HTTP 接口超时
const MAIL_API_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 不存在时忽略
    dotenvy::dotenv().ok();

    // 加载配置
    let dir = config_dir();
    let config = AppConfig::load(&dir.to_string_lossy())?;

    // 初始化 tracing 和 metrics
    shiroha_telemetry::init_for_env(&config.telemetry.log_level, config.is_production());
    let metrics = shiroha_telemetry::init_metrics()?;
    info!(app = %config.app_name, env = %config.app_env, "Starting catalog service");

    // PostgreSQL
    let pg_config = PostgresConfig::new(config.database.url.expose_secret())
        .with_max_connections(config.database.max_connections);
    let pool = create_pool(&pg_config).await?;

    let result = MigrationManager::new(pool.clone())
        .migrate(&catalog_migrations())
        .await?;
    if !result.is_success() {
        return Err(AppError::internal(format!(
            "Migration failed: {:?}",
            result.errors
        ))
        .into());
    }
    info!(applied = result.applied_count(), "Database migrations up to date");

    // Redis
    let redis = create_connection_manager(config.redis.url.expose_secret()).await?;
    let redis_cache = RedisCache::new(redis.clone());
    let cache: Arc<dyn CachePort> = Arc::new(redis_cache.clone());
    let hash_cache: Arc<dyn HashCachePort> = Arc::new(redis_cache);

    // Keycloak
    let kc = &config.keycloak;
    let keycloak_config = KeycloakConfigBuilder::new(kc.base_url.clone())
        .with_realms(kc.admin_realm.clone(), kc.client_realm.clone())
        .with_admin_client(
            kc.admin.client_id.clone(),
            kc.admin.client_secret.expose_secret().clone(),
        )
        .with_client(
            kc.client.client_id.clone(),
            kc.client.client_secret.expose_secret().clone(),
        )
        .with_request_timeout(kc.request_timeout_secs)
        .build();
    let identity: Arc<dyn IdentityProvider> = Arc::new(KeycloakClient::new(keycloak_config)?);

    // 邮件
    let email = build_email_sender(&config)?;

    // 组装服务
    let repo: Arc<dyn GameRepository> = Arc::new(PostgresGameRepository::new(pool.clone()));
    let games = Arc::new(GameService::new(repo));
    let page_cache = PageCache::new(
        hash_cache,
        Duration::from_secs(config.cache.page_ttl_secs),
    );
    let listing = Arc::new(GameListing::new(games.clone(), page_cache));
    let challenges = Arc::new(ChallengeService::new(
        cache,
        Arc::new(SvgChallengeRenderer::default()),
        config.challenge.clone(),
    ));
    let auth = Arc::new(AuthService::new(
        identity.clone(),
        email,
        challenges.clone(),
        AuthSettings {
            public_base_url: config.server.public_base_url.clone(),
            verification_template: config.email.verification_template.clone(),
            verification_subject: config.email.verification_subject.clone(),
            default_group_id: kc.default_group_id.clone(),
        },
    ));

    let state = AppState {
        games,
        listing,
        challenges,
        auth,
        identity,
        readiness: Arc::new(InfraReadiness::new(pool, redis)),
        metrics,
        cookies: SessionCookies::new(config.session.cookie_domain.clone(), config.session.secure),
        max_page_size: config.cache.max_page_size,
        admin_role: kc.admin_role.clone(),
        verified_redirect_url: config.session.verified_redirect_url.clone(),
    };

    let app = api::router(state).layer(cors_layer(&config.server.cors_allowed_origins));

    // 启动服务器
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| AppError::internal(format!("Invalid listen address: {}", e)))?;
    info!(%addr, "Catalog service listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Catalog service stopped");
    Ok(())
}

fn build_email_sender(config: &AppConfig) -> Result<Arc<dyn EmailSender>, AppError> {
    match config.email.transport {
        EmailTransport::MailApi => {
            let mail_api = config
                .email
                .mail_api
                .clone()
                .ok_or_else(|| AppError::internal("email.mail_api is not configured"))?;
            Ok(Arc::new(MailApiClient::new(mail_api, MAIL_API_TIMEOUT)?))
        }
        EmailTransport::Smtp => {
            let smtp = config
                .email
                .smtp
                .clone()
                .ok_or_else(|| AppError::internal("email.smtp is not configured"))?;
            Ok(Arc::new(SmtpEmailClient::from_config(smtp)?))
        }
    }
}

/// 未配置来源时放开全部来源
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::HeaderName::from_static("x-captcha-id")])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
