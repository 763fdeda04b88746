//! Fake Detection Client - 用于测试的检测服务替身
//!
//! 不发起任何网络调用。按 FIFO 脚本逐次返回预设响应，脚本耗尽后
//! 回落到合成的成功响应；所有收到的请求被记录，供测试断言调用次数
//! 与参数。带门控的脚本条目在测试放行前挂起，可用于构造乱序返回。

use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::{oneshot, Mutex};

use crate::application::ports::{
    DetectionPage, DetectionServiceError, DetectionServicePort, PageQuery, SubmitRequest,
};
use crate::domain::detection::{DetectionRecord, DetectionStatus};

struct SubmitScript {
    /// Ok(None) 表示按请求内容合成一条成功记录
    result: Result<Option<DetectionRecord>, DetectionServiceError>,
    gate: Option<oneshot::Receiver<()>>,
}

struct QueryScript {
    result: Result<DetectionPage, DetectionServiceError>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Fake Detection Client
pub struct FakeDetectionClient {
    submit_script: Mutex<VecDeque<SubmitScript>>,
    query_script: Mutex<VecDeque<QueryScript>>,
    fetch_script: Mutex<VecDeque<Result<DetectionRecord, DetectionServiceError>>>,
    submit_calls: Mutex<Vec<SubmitRequest>>,
    query_calls: Mutex<Vec<PageQuery>>,
    next_id: AtomicI64,
}

impl FakeDetectionClient {
    pub fn new() -> Self {
        Self {
            submit_script: Mutex::new(VecDeque::new()),
            query_script: Mutex::new(VecDeque::new()),
            fetch_script: Mutex::new(VecDeque::new()),
            submit_calls: Mutex::new(Vec::new()),
            query_calls: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// 预设一次合成的提交成功
    pub async fn push_submit_ok(&self) {
        self.submit_script.lock().await.push_back(SubmitScript {
            result: Ok(None),
            gate: None,
        });
    }

    /// 预设一次返回指定记录的提交成功
    pub async fn push_submit_record(&self, record: DetectionRecord) {
        self.submit_script.lock().await.push_back(SubmitScript {
            result: Ok(Some(record)),
            gate: None,
        });
    }

    /// 预设一次提交失败
    pub async fn push_submit_err(&self, err: DetectionServiceError) {
        self.submit_script.lock().await.push_back(SubmitScript {
            result: Err(err),
            gate: None,
        });
    }

    /// 预设一次查询成功
    pub async fn push_query_ok(&self, page: DetectionPage) {
        self.query_script.lock().await.push_back(QueryScript {
            result: Ok(page),
            gate: None,
        });
    }

    /// 预设一次查询失败
    pub async fn push_query_err(&self, err: DetectionServiceError) {
        self.query_script.lock().await.push_back(QueryScript {
            result: Err(err),
            gate: None,
        });
    }

    /// 预设一次门控的查询响应，返回放行端
    ///
    /// 对应的 query_detections 调用在收到放行信号前挂起
    pub async fn push_query_gated(
        &self,
        result: Result<DetectionPage, DetectionServiceError>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.query_script.lock().await.push_back(QueryScript {
            result,
            gate: Some(rx),
        });
        tx
    }

    /// 预设一次单条查询响应
    pub async fn push_fetch(&self, result: Result<DetectionRecord, DetectionServiceError>) {
        self.fetch_script.lock().await.push_back(result);
    }

    /// 已收到的提交请求
    pub async fn submit_calls(&self) -> Vec<SubmitRequest> {
        self.submit_calls.lock().await.clone()
    }

    /// 已收到的分页查询请求
    pub async fn query_calls(&self) -> Vec<PageQuery> {
        self.query_calls.lock().await.clone()
    }

    /// 模拟服务端行为合成一条已完成的检测记录
    fn synthesize_record(&self, request: &SubmitRequest) -> DetectionRecord {
        let now = Utc::now();
        DetectionRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            original_image_path: format!("uploads/original/{}", request.file_name),
            visualized_image_path: Some(format!("uploads/visualized/{}", request.file_name)),
            number_of_persons: 1,
            author_name: request.author_name.clone(),
            author_email: request.author_email.clone(),
            title: request
                .title
                .clone()
                .or_else(|| Some(request.file_name.clone())),
            description: request.description.clone(),
            created_at: now,
            updated_at: Some(now),
            status: DetectionStatus::Completed,
            processing_time_ms: Some(1),
        }
    }
}

impl Default for FakeDetectionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DetectionServicePort for FakeDetectionClient {
    async fn submit_detection(
        &self,
        request: SubmitRequest,
    ) -> Result<DetectionRecord, DetectionServiceError> {
        self.submit_calls.lock().await.push(request.clone());

        let entry = self.submit_script.lock().await.pop_front();
        match entry {
            Some(entry) => {
                if let Some(gate) = entry.gate {
                    let _ = gate.await;
                }
                match entry.result {
                    Ok(Some(record)) => Ok(record),
                    Ok(None) => Ok(self.synthesize_record(&request)),
                    Err(err) => Err(err),
                }
            }
            None => Ok(self.synthesize_record(&request)),
        }
    }

    async fn query_detections(
        &self,
        query: PageQuery,
    ) -> Result<DetectionPage, DetectionServiceError> {
        self.query_calls.lock().await.push(query.clone());

        let entry = self.query_script.lock().await.pop_front();
        match entry {
            Some(entry) => {
                if let Some(gate) = entry.gate {
                    let _ = gate.await;
                }
                entry.result
            }
            None => Ok(DetectionPage {
                items: Vec::new(),
                total: 0,
            }),
        }
    }

    async fn fetch_detection(&self, id: i64) -> Result<DetectionRecord, DetectionServiceError> {
        let entry = self.fetch_script.lock().await.pop_front();
        match entry {
            Some(result) => result,
            None => {
                let request = SubmitRequest {
                    file_name: format!("{}.jpg", id),
                    payload: Vec::new(),
                    author_name: "fake".to_string(),
                    author_email: None,
                    title: None,
                    description: None,
                };
                let mut record = self.synthesize_record(&request);
                record.id = id;
                Ok(record)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses_are_fifo() {
        let fake = FakeDetectionClient::new();
        fake.push_query_err(DetectionServiceError::Timeout).await;
        fake.push_query_ok(DetectionPage {
            items: Vec::new(),
            total: 3,
        })
        .await;

        let query = PageQuery {
            skip: 0,
            limit: 10,
            search: None,
            sort_by: crate::application::queries::SortField::CreatedAt,
            order: crate::application::queries::SortOrder::Desc,
        };

        assert!(fake.query_detections(query.clone()).await.is_err());
        assert_eq!(fake.query_detections(query.clone()).await.unwrap().total, 3);
        // 脚本耗尽后回落到空页
        assert_eq!(fake.query_detections(query).await.unwrap().total, 0);
        assert_eq!(fake.query_calls().await.len(), 3);
    }

    #[tokio::test]
    async fn test_scripted_record_and_fetch() {
        let fake = FakeDetectionClient::new();
        let request = SubmitRequest {
            file_name: "b.jpg".to_string(),
            payload: vec![9],
            author_name: "Bob".to_string(),
            author_email: None,
            title: None,
            description: None,
        };
        let mut scripted = fake.synthesize_record(&request);
        scripted.id = 99;
        fake.push_submit_record(scripted).await;
        fake.push_fetch(Err(DetectionServiceError::Service {
            status: 404,
            message: "Detection not found".to_string(),
        }))
        .await;

        let record = fake.submit_detection(request).await.unwrap();
        assert_eq!(record.id, 99);

        assert!(fake.fetch_detection(99).await.is_err());
        // 脚本耗尽后按 id 合成
        assert_eq!(fake.fetch_detection(7).await.unwrap().id, 7);
    }

    #[tokio::test]
    async fn test_synthesized_record_echoes_metadata() {
        let fake = FakeDetectionClient::new();
        let record = fake
            .submit_detection(SubmitRequest {
                file_name: "a.png".to_string(),
                payload: vec![1, 2, 3],
                author_name: "Alice".to_string(),
                author_email: None,
                title: None,
                description: Some("desc".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(record.author_name, "Alice");
        assert_eq!(record.title.as_deref(), Some("a.png"));
        assert_eq!(record.status, DetectionStatus::Completed);
        assert!(record.is_viewable());
    }
}
