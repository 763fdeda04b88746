//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（DetectionService）
//! - commands: 写侧（批次提交控制器）
//! - queries: 读侧（分页查询控制器）
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::BatchSubmitter;

pub use error::BatchError;

pub use ports::{
    DetectionPage, DetectionServiceError, DetectionServicePort, PageQuery, SubmitRequest,
};

pub use queries::{QueryController, QueryOptions, QuerySnapshot, SortField, SortOrder};
