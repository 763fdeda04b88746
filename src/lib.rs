//! Vigil - 人员检测服务客户端
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Detection Context: 检测记录只读模型（服务端产出）
//! - Submission Context: 待提交批次管理
//!
//! 应用层 (application/):
//! - Ports: 端口定义（DetectionService）
//! - Commands: 批次提交控制器（写侧）
//! - Queries: 分页查询控制器（读侧，含过期响应栅栏）
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP 检测客户端与脚本化测试替身

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
