//! Detection Service Port - 远程检测服务抽象
//!
//! 定义检测服务的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::application::queries::{SortField, SortOrder};
use crate::domain::detection::DetectionRecord;

/// 检测服务错误
#[derive(Debug, Clone, Error)]
pub enum DetectionServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// 单张图片提交请求
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// 原始文件名（服务端存档用）
    pub file_name: String,
    /// 图片二进制内容
    pub payload: Vec<u8>,
    /// 作者姓名（必填）
    pub author_name: String,
    /// 作者邮箱
    pub author_email: Option<String>,
    /// 标题（缺省为文件名）
    pub title: Option<String>,
    /// 描述
    pub description: Option<String>,
}

/// 分页查询请求
#[derive(Debug, Clone)]
pub struct PageQuery {
    /// 跳过的记录数
    pub skip: u64,
    /// 单页记录数
    pub limit: u32,
    /// 搜索词（为空时省略）
    pub search: Option<String>,
    /// 排序字段
    pub sort_by: SortField,
    /// 排序方向
    pub order: SortOrder,
}

/// 分页查询结果
#[derive(Debug, Clone)]
pub struct DetectionPage {
    /// 当前页记录（服务端已排序）
    pub items: Vec<DetectionRecord>,
    /// 过滤后的记录总数
    pub total: u64,
}

/// Detection Service Port
///
/// 远程人员检测服务的抽象接口
#[async_trait]
pub trait DetectionServicePort: Send + Sync {
    /// 提交一张图片及其元数据，返回服务端创建的检测记录
    async fn submit_detection(
        &self,
        request: SubmitRequest,
    ) -> Result<DetectionRecord, DetectionServiceError>;

    /// 按查询条件获取一页检测记录
    async fn query_detections(
        &self,
        query: PageQuery,
    ) -> Result<DetectionPage, DetectionServiceError>;

    /// 按 id 获取单条检测记录
    async fn fetch_detection(&self, id: i64) -> Result<DetectionRecord, DetectionServiceError>;
}
