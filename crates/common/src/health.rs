//! 通用健康检查类型

use serde::{Deserialize, Serialize};

/// 单个组件的健康检查结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// 组件名称
    pub name: String,
    /// 是否健康
    pub healthy: bool,
    /// 延迟（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// 错误信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentHealth {
    /// 创建健康结果
    pub fn healthy(name: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            name: name.into(),
            healthy: true,
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    /// 创建不健康结果
    pub fn unhealthy(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            healthy: false,
            latency_ms: None,
            error: Some(error.into()),
        }
    }
}

/// 汇总的就绪状态
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthReport {
    pub ready: bool,
    pub checks: Vec<ComponentHealth>,
}

impl HealthReport {
    pub fn new(checks: Vec<ComponentHealth>) -> Self {
        let ready = checks.iter().all(|c| c.healthy);
        Self { ready, checks }
    }
}
