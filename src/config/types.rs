//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 检测服务配置
    #[serde(default)]
    pub api: ApiConfig,

    /// 查询配置
    #[serde(default)]
    pub query: QueryConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 检测服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// 检测服务基础 URL
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_timeout() -> u64 {
    120
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: default_api_timeout(),
        }
    }
}

/// 查询配置
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// 单页记录数（会话内不可变）
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    10
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
