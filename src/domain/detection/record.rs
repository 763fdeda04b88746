//! Detection Context - 检测记录

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 检测处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl DetectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionStatus::Pending => "pending",
            DetectionStatus::Processing => "processing",
            DetectionStatus::Completed => "completed",
            DetectionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for DetectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 检测记录 - 远程服务处理一张图片的产出
///
/// 不变量:
/// - id 由服务端分配，全局唯一
/// - 客户端视角下完全不可变
/// - visualized_image_path 仅在处理完成后存在
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub id: i64,
    pub original_image_path: String,
    #[serde(default)]
    pub visualized_image_path: Option<String>,
    pub number_of_persons: u32,
    pub author_name: String,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub status: DetectionStatus,
    /// 服务端处理耗时（毫秒）
    #[serde(default, rename = "processing_time")]
    pub processing_time_ms: Option<u64>,
}

impl DetectionRecord {
    /// 可视化结果是否可供查看
    pub fn is_viewable(&self) -> bool {
        self.status == DetectionStatus::Completed && self.visualized_image_path.is_some()
    }

    /// 展示用标题（无标题时退回文件路径）
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.original_image_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "id": 42,
            "original_image_path": "uploads/original/20240101_photo.jpg",
            "visualized_image_path": "uploads/visualized/20240101_photo.jpg",
            "number_of_persons": 3,
            "author_name": "Alice",
            "author_email": "alice@example.com",
            "title": "photo.jpg",
            "description": null,
            "created_at": "2024-01-01T12:00:00Z",
            "updated_at": "2024-01-01T12:00:01Z",
            "status": "completed",
            "processing_time": 843
        }"#
    }

    #[test]
    fn test_deserialize_full_record() {
        let record: DetectionRecord = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(record.id, 42);
        assert_eq!(record.number_of_persons, 3);
        assert_eq!(record.status, DetectionStatus::Completed);
        assert_eq!(record.processing_time_ms, Some(843));
        assert!(record.is_viewable());
    }

    #[test]
    fn test_deserialize_pending_record_without_optionals() {
        let json = r#"{
            "id": 7,
            "original_image_path": "uploads/original/x.png",
            "number_of_persons": 0,
            "author_name": "Bob",
            "created_at": "2024-01-01T12:00:00Z",
            "status": "pending"
        }"#;
        let record: DetectionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, DetectionStatus::Pending);
        assert!(record.visualized_image_path.is_none());
        assert!(!record.is_viewable());
        assert_eq!(record.display_title(), "uploads/original/x.png");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let json = sample_json().replace("completed", "exploded");
        assert!(serde_json::from_str::<DetectionRecord>(&json).is_err());
    }
}
