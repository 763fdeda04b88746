//! 应用层错误定义

use thiserror::Error;

use crate::application::ports::DetectionServiceError;

/// 批次提交错误
#[derive(Debug, Clone, Error)]
pub enum BatchError {
    /// 客户端前置条件不满足，未发起任何网络调用
    #[error("Validation error: {0}")]
    Validation(String),

    /// 第 index 项（0 起始）提交失败，批次中止
    #[error("Batch submission failed at item {index}: {source}")]
    Submission {
        index: usize,
        #[source]
        source: DetectionServiceError,
    },
}

impl BatchError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
