//! HTTP Detection Client - 调用远程检测 HTTP 服务
//!
//! 实现 DetectionServicePort trait，通过 HTTP 调用远程检测服务
//!
//! 远程检测 API:
//! POST /api/detect          multipart: file + author_name (+ author_email, title, description)
//! GET  /api/detections      query: skip, limit, search?, sort_by, order -> {"items": [...], "total": n}
//! GET  /api/detections/{id} -> 单条检测记录

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use std::time::Duration;

use crate::application::ports::{
    DetectionPage, DetectionServiceError, DetectionServicePort, PageQuery, SubmitRequest,
};
use crate::domain::detection::DetectionRecord;

/// HTTP 检测客户端配置
#[derive(Debug, Clone)]
pub struct HttpDetectionClientConfig {
    /// 检测服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpDetectionClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpDetectionClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 检测客户端
///
/// 通过 HTTP 调用远程检测服务
pub struct HttpDetectionClient {
    client: Client,
    config: HttpDetectionClientConfig,
}

impl HttpDetectionClient {
    /// 创建新的 HTTP 检测客户端
    pub fn new(config: HttpDetectionClientConfig) -> Result<Self, DetectionServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DetectionServiceError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 使用默认配置创建客户端
    pub fn with_default_config() -> Result<Self, DetectionServiceError> {
        Self::new(HttpDetectionClientConfig::default())
    }

    /// 提交端点 URL
    fn detect_url(&self) -> String {
        format!("{}/api/detect", self.config.base_url)
    }

    /// 查询端点 URL
    fn detections_url(&self) -> String {
        format!("{}/api/detections", self.config.base_url)
    }

    /// 单条记录 URL
    fn detection_url(&self, id: i64) -> String {
        format!("{}/api/detections/{}", self.config.base_url, id)
    }

    /// 服务端托管资源（如可视化结果图片）的访问 URL
    pub fn resource_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// reqwest 传输层错误到端口错误的映射
fn transport_error(e: reqwest::Error) -> DetectionServiceError {
    if e.is_timeout() {
        DetectionServiceError::Timeout
    } else if e.is_connect() {
        DetectionServiceError::Network(format!("Cannot connect to detection service: {}", e))
    } else {
        DetectionServiceError::Network(e.to_string())
    }
}

/// 按扩展名推断图片 MIME 类型
fn image_mime(file_name: &str) -> &'static str {
    match file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// 校验分页响应的形状并反序列化
///
/// `items` 缺失或不是数组视为响应格式错误，`total` 必须是非负整数
fn parse_page(body: serde_json::Value) -> Result<DetectionPage, DetectionServiceError> {
    let items_value = body.get("items").ok_or_else(|| {
        DetectionServiceError::MalformedResponse("missing `items` field".to_string())
    })?;
    if !items_value.is_array() {
        return Err(DetectionServiceError::MalformedResponse(
            "`items` is not an array".to_string(),
        ));
    }
    let items: Vec<DetectionRecord> = serde_json::from_value(items_value.clone()).map_err(|e| {
        DetectionServiceError::MalformedResponse(format!("invalid record in `items`: {}", e))
    })?;
    let total = body.get("total").and_then(|v| v.as_u64()).ok_or_else(|| {
        DetectionServiceError::MalformedResponse("missing or invalid `total` field".to_string())
    })?;

    Ok(DetectionPage { items, total })
}

#[async_trait]
impl DetectionServicePort for HttpDetectionClient {
    async fn submit_detection(
        &self,
        request: SubmitRequest,
    ) -> Result<DetectionRecord, DetectionServiceError> {
        tracing::debug!(
            url = %self.detect_url(),
            file_name = %request.file_name,
            size_bytes = request.payload.len(),
            "Sending detection submit request"
        );

        let part = multipart::Part::bytes(request.payload)
            .file_name(request.file_name.clone())
            .mime_str(image_mime(&request.file_name))
            .map_err(|e| DetectionServiceError::Network(e.to_string()))?;

        let mut form = multipart::Form::new()
            .part("file", part)
            .text("author_name", request.author_name);
        if let Some(email) = request.author_email {
            form = form.text("author_email", email);
        }
        if let Some(title) = request.title {
            form = form.text("title", title);
        }
        if let Some(description) = request.description {
            form = form.text("description", description);
        }

        let response = self
            .client
            .post(self.detect_url())
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DetectionServiceError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let record = response
            .json::<DetectionRecord>()
            .await
            .map_err(|e| DetectionServiceError::MalformedResponse(e.to_string()))?;

        tracing::info!(
            id = record.id,
            persons = record.number_of_persons,
            status = %record.status,
            "Detection created"
        );

        Ok(record)
    }

    async fn query_detections(
        &self,
        query: PageQuery,
    ) -> Result<DetectionPage, DetectionServiceError> {
        let mut params: Vec<(&str, String)> = vec![
            ("skip", query.skip.to_string()),
            ("limit", query.limit.to_string()),
            ("sort_by", query.sort_by.as_query_param().to_string()),
            ("order", query.order.as_query_param().to_string()),
        ];
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }

        let response = self
            .client
            .get(self.detections_url())
            .query(&params)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DetectionServiceError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| DetectionServiceError::MalformedResponse(e.to_string()))?;
        let page = parse_page(body)?;

        tracing::debug!(
            items = page.items.len(),
            total = page.total,
            "Detection page fetched"
        );

        Ok(page)
    }

    async fn fetch_detection(&self, id: i64) -> Result<DetectionRecord, DetectionServiceError> {
        let response = self
            .client
            .get(self.detection_url(id))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DetectionServiceError::Service {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<DetectionRecord>()
            .await
            .map_err(|e| DetectionServiceError::MalformedResponse(e.to_string()))
    }
}
