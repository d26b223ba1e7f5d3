//! 基础设施层

pub mod health;
pub mod observability;
pub mod persistence;
pub mod render;
