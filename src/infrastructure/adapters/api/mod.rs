//! Detection Service 适配器
//!
//! - HttpDetectionClient: 调用真实检测服务
//! - FakeDetectionClient: 脚本化测试替身

mod fake_client;
mod http_client;

pub use fake_client::FakeDetectionClient;
pub use http_client::{HttpDetectionClient, HttpDetectionClientConfig};
