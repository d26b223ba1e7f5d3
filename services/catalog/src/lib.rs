//! shiroha-catalog - 游戏目录服务
//!
//! - `domain`: 游戏实体、仓储 trait、验证码
//! - `application`: 游戏服务、列表页缓存、验证码服务、认证流程
//! - `infrastructure`: PostgreSQL 仓储、迁移、SVG 渲染、指标
//! - `api`: axum 路由、Cookie 会话和认证中间件

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
