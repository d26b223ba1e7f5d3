//! 依赖就绪检查

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use shiroha_common::{ComponentHealth, HealthReport};
use sqlx::PgPool;
use std::time::Instant;

#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn check(&self) -> HealthReport;
}

/// PostgreSQL + Redis 就绪检查
pub struct InfraReadiness {
    pool: PgPool,
    redis: ConnectionManager,
}

impl InfraReadiness {
    pub fn new(pool: PgPool, redis: ConnectionManager) -> Self {
        Self { pool, redis }
    }

    async fn check_postgres(&self) -> ComponentHealth {
        let started = Instant::now();
        match shiroha_adapter_postgres::check_connection(&self.pool).await {
            Ok(()) => ComponentHealth::healthy("postgres", started.elapsed().as_millis() as u64),
            Err(e) => ComponentHealth::unhealthy("postgres", e.to_string()),
        }
    }

    async fn check_redis(&self) -> ComponentHealth {
        let started = Instant::now();
        let mut conn = self.redis.clone();
        match shiroha_adapter_redis::check_connection(&mut conn).await {
            Ok(()) => ComponentHealth::healthy("redis", started.elapsed().as_millis() as u64),
            Err(e) => ComponentHealth::unhealthy("redis", e.to_string()),
        }
    }
}

#[async_trait]
impl ReadinessProbe for InfraReadiness {
    async fn check(&self) -> HealthReport {
        let (postgres, redis) = tokio::join!(self.check_postgres(), self.check_redis());
        HealthReport::new(vec![postgres, redis])
    }
}
