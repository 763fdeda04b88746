//! Batch Submitter - 批次提交控制器
//!
//! 持有待提交队列与共享元数据模板，按入队顺序逐项提交，
//! 任一时刻最多一个未完成的网络调用。首个失败项中止剩余队列，
//! 已成功的结果保留；再次调用 submit 即从剩余队列恢复。

use std::collections::VecDeque;
use std::sync::Arc;

use crate::application::error::BatchError;
use crate::application::ports::{DetectionServicePort, SubmitRequest};
use crate::domain::detection::DetectionRecord;
use crate::domain::submission::{is_accepted_image, BatchPhase, FileItem, MetadataTemplate};

/// 批次提交控制器
pub struct BatchSubmitter {
    service: Arc<dyn DetectionServicePort>,
    pending: VecDeque<FileItem>,
    completed: Vec<DetectionRecord>,
    progress_percent: f64,
    phase: BatchPhase,
    current_error: Option<BatchError>,
}

impl BatchSubmitter {
    pub fn new(service: Arc<dyn DetectionServicePort>) -> Self {
        Self {
            service,
            pending: VecDeque::new(),
            completed: Vec::new(),
            progress_percent: 0.0,
            phase: BatchPhase::Idle,
            current_error: None,
        }
    }

    /// 追加可接受的图片文件到待提交队列，返回实际接受的数量
    ///
    /// 非图片文件静默丢弃；顺序保持；允许重复
    pub fn add_files(&mut self, files: impl IntoIterator<Item = FileItem>) -> usize {
        let mut accepted = 0;
        for file in files {
            if is_accepted_image(file.file_name()) {
                self.pending.push_back(file);
                accepted += 1;
            } else {
                tracing::debug!(file_name = %file.file_name(), "Dropped unsupported file");
            }
        }
        accepted
    }

    /// 移除仍在待提交队列中的一项；索引越界时无任何效果
    pub fn remove_file(&mut self, index: usize) -> Option<FileItem> {
        self.pending.remove(index)
    }

    /// 按入队顺序逐项提交整个待提交队列
    ///
    /// 前置条件：队列非空且模板作者姓名非空，否则立即返回
    /// `BatchError::Validation`，不发起任何网络调用。
    ///
    /// 每项成功后其结果追加到 completed_results、该项出队、进度更新为
    /// 已完成数 / 总数 × 100。首个失败项中止批次并返回
    /// `BatchError::Submission`（携带失败项索引），进度冻结在最后一次
    /// 成功的比例；不自动重试，再次调用即从剩余队列恢复。
    pub async fn submit(&mut self, template: &MetadataTemplate) -> Result<usize, BatchError> {
        if self.pending.is_empty() {
            return Err(self.record_error(BatchError::validation("提交队列为空")));
        }
        if let Err(reason) = template.validate() {
            return Err(self.record_error(BatchError::validation(reason)));
        }

        let total = self.pending.len();
        self.progress_percent = 0.0;
        self.current_error = None;

        tracing::info!(total = total, author = %template.author_name, "Batch submission started");

        let mut index = 0;
        while index < total {
            self.phase = BatchPhase::Submitting {
                current_index: index,
            };

            // 队首即当前项；仅在提交成功后出队
            let request = match self.pending.front() {
                Some(item) => SubmitRequest {
                    file_name: item.file_name().to_string(),
                    payload: item.payload().to_vec(),
                    author_name: template.author_name.clone(),
                    author_email: template.author_email.clone(),
                    title: Some(item.file_name().to_string()),
                    description: template.description.clone(),
                },
                None => break,
            };

            match self.service.submit_detection(request).await {
                Ok(record) => {
                    tracing::debug!(
                        index = index,
                        id = record.id,
                        persons = record.number_of_persons,
                        "Item submitted"
                    );
                    self.pending.pop_front();
                    self.completed.push(record);
                    index += 1;
                    self.progress_percent = index as f64 / total as f64 * 100.0;
                }
                Err(source) => {
                    tracing::error!(index = index, error = %source, "Batch submission aborted");
                    self.phase = BatchPhase::Failed { at_index: index };
                    let err = BatchError::Submission { index, source };
                    self.current_error = Some(err.clone());
                    return Err(err);
                }
            }
        }

        self.phase = BatchPhase::Succeeded;
        tracing::info!(submitted = total, "Batch submission completed");
        Ok(total)
    }

    fn record_error(&mut self, err: BatchError) -> BatchError {
        tracing::warn!(error = %err, "Batch submission rejected");
        self.current_error = Some(err.clone());
        err
    }

    // Getters

    pub fn pending(&self) -> &VecDeque<FileItem> {
        &self.pending
    }

    pub fn completed_results(&self) -> &[DetectionRecord] {
        &self.completed
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    pub fn current_error(&self) -> Option<&BatchError> {
        self.current_error.as_ref()
    }
}
