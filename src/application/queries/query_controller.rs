//! Query Controller - 分页查询控制器
//!
//! 持有四元查询状态（搜索词、排序字段、排序方向、页码）并与远程
//! 查询端点对账。输入变化快于网络往返时，用单调递增的 generation
//! 计数器在应用响应时丢弃过期结果（软件栅栏，无需网络层取消）。

use std::sync::Arc;
use tokio::sync::Mutex;

use super::listing::{self, SortField, SortOrder, DEFAULT_PAGE_SIZE};
use crate::application::ports::{DetectionServiceError, DetectionServicePort, PageQuery};
use crate::domain::detection::DetectionRecord;

/// 控制器初始状态
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// 单页记录数（会话内不可变）
    pub page_size: u32,
    /// 初始搜索词
    pub search: String,
    /// 初始排序字段
    pub sort_field: SortField,
    /// 初始排序方向
    pub sort_order: SortOrder,
    /// 初始页码（1 起始）
    pub page_index: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search: String::new(),
            sort_field: SortField::CreatedAt,
            sort_order: SortOrder::Desc,
            page_index: 1,
        }
    }
}

/// 渲染层消费的状态快照
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
    pub search_text: String,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub page_index: u32,
    pub page_size: u32,
    pub items: Vec<DetectionRecord>,
    pub total_pages: u32,
    pub is_loading: bool,
    pub error: Option<DetectionServiceError>,
}

struct QueryState {
    search_text: String,
    sort_field: SortField,
    sort_order: SortOrder,
    page_index: u32,
    items: Vec<DetectionRecord>,
    total_pages: u32,
    is_loading: bool,
    current_error: Option<DetectionServiceError>,
    generation: u64,
}

/// 分页查询控制器
///
/// 所有方法接受 `&self`，多个 refresh 可并发在途；
/// 过期响应按 generation 丢弃，最终状态只反映最新一次请求
pub struct QueryController {
    service: Arc<dyn DetectionServicePort>,
    page_size: u32,
    state: Mutex<QueryState>,
}

impl QueryController {
    pub fn new(service: Arc<dyn DetectionServicePort>, options: QueryOptions) -> Self {
        Self {
            service,
            page_size: options.page_size,
            state: Mutex::new(QueryState {
                search_text: options.search,
                sort_field: options.sort_field,
                sort_order: options.sort_order,
                page_index: options.page_index.max(1),
                items: Vec::new(),
                total_pages: 1,
                is_loading: false,
                current_error: None,
                generation: 0,
            }),
        }
    }

    /// 设置搜索词并刷新
    ///
    /// 页码刻意不重置（见 DESIGN.md）
    pub async fn set_search(&self, text: impl Into<String>) {
        {
            let mut state = self.state.lock().await;
            state.search_text = text.into();
        }
        self.refresh().await;
    }

    /// 设置排序字段并刷新
    ///
    /// 字段不变时翻转方向；字段变化时重置为升序
    pub async fn set_sort(&self, field: SortField) {
        {
            let mut state = self.state.lock().await;
            if state.sort_field == field {
                state.sort_order = state.sort_order.flipped();
            } else {
                state.sort_field = field;
                state.sort_order = SortOrder::Asc;
            }
        }
        self.refresh().await;
    }

    /// 无条件翻转排序方向并刷新
    pub async fn toggle_sort_order(&self) {
        {
            let mut state = self.state.lock().await;
            state.sort_order = state.sort_order.flipped();
        }
        self.refresh().await;
    }

    /// 跳转到第 n 页并刷新
    ///
    /// n 越界或与当前页相同时不做任何事（不发起请求）
    pub async fn set_page(&self, n: u32) {
        {
            let mut state = self.state.lock().await;
            if n < 1 || n > state.total_pages || n == state.page_index {
                tracing::debug!(
                    requested = n,
                    current = state.page_index,
                    total_pages = state.total_pages,
                    "Page change rejected"
                );
                return;
            }
            state.page_index = n;
        }
        self.refresh().await;
    }

    /// 依当前查询状态向远程端点发起一次取页
    ///
    /// 发起时捕获 generation；响应返回后若 generation 已前进则整体
    /// 丢弃（is_loading 留给更新的在途请求清除）。被采纳的成功响应
    /// 写入 items/total_pages 并清除错误；失败响应降级为空而有效的
    /// 状态（items=[], total_pages=1）并记录错误
    pub async fn refresh(&self) {
        let (generation, query) = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            state.is_loading = true;
            let query = PageQuery {
                skip: (state.page_index as u64 - 1) * self.page_size as u64,
                limit: self.page_size,
                search: if state.search_text.is_empty() {
                    None
                } else {
                    Some(state.search_text.clone())
                },
                sort_by: state.sort_field,
                order: state.sort_order,
            };
            (state.generation, query)
        };

        tracing::debug!(
            generation = generation,
            skip = query.skip,
            limit = query.limit,
            sort_by = %query.sort_by,
            order = %query.order,
            "Issuing page query"
        );

        let result = self.service.query_detections(query).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!(
                stale_generation = generation,
                current_generation = state.generation,
                "Discarding stale page response"
            );
            return;
        }

        state.is_loading = false;
        match result {
            Ok(page) => {
                state.total_pages = listing::total_pages(page.total, self.page_size);
                state.items = page.items;
                state.current_error = None;
                tracing::debug!(
                    generation = generation,
                    items = state.items.len(),
                    total = page.total,
                    total_pages = state.total_pages,
                    "Page applied"
                );
            }
            Err(err) => {
                tracing::warn!(generation = generation, error = %err, "Page query failed");
                state.items = Vec::new();
                state.total_pages = 1;
                state.current_error = Some(err);
            }
        }
    }

    /// 当前状态快照
    pub async fn snapshot(&self) -> QuerySnapshot {
        let state = self.state.lock().await;
        QuerySnapshot {
            search_text: state.search_text.clone(),
            sort_field: state.sort_field,
            sort_order: state.sort_order,
            page_index: state.page_index,
            page_size: self.page_size,
            items: state.items.clone(),
            total_pages: state.total_pages,
            is_loading: state.is_loading,
            error: state.current_error.clone(),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub async fn page_index(&self) -> u32 {
        self.state.lock().await.page_index
    }

    pub async fn total_pages(&self) -> u32 {
        self.state.lock().await.total_pages
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.is_loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::DetectionPage;
    use crate::domain::detection::{DetectionRecord, DetectionStatus};
    use crate::infrastructure::adapters::FakeDetectionClient;
    use tokio::task::yield_now;

    fn record(id: i64) -> DetectionRecord {
        DetectionRecord {
            id,
            original_image_path: format!("uploads/original/{}.jpg", id),
            visualized_image_path: Some(format!("uploads/visualized/{}.jpg", id)),
            number_of_persons: 1,
            author_name: "Alice".to_string(),
            author_email: None,
            title: Some(format!("{}.jpg", id)),
            description: None,
            created_at: chrono::Utc::now(),
            updated_at: None,
            status: DetectionStatus::Completed,
            processing_time_ms: None,
        }
    }

    fn page(ids: &[i64], total: u64) -> DetectionPage {
        DetectionPage {
            items: ids.iter().copied().map(record).collect(),
            total,
        }
    }

    fn controller(fake: Arc<FakeDetectionClient>) -> QueryController {
        QueryController::new(fake, QueryOptions::default())
    }

    #[tokio::test]
    async fn test_refresh_applies_page_and_total_pages() {
        let fake = Arc::new(FakeDetectionClient::new());
        fake.push_query_ok(page(&[1, 2, 3], 25)).await;
        let ctrl = controller(fake.clone());

        ctrl.refresh().await;

        let snapshot = ctrl.snapshot().await;
        assert_eq!(snapshot.items.len(), 3);
        assert_eq!(snapshot.total_pages, 3);
        assert!(!snapshot.is_loading);
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_set_sort_same_field_toggles_order() {
        let fake = Arc::new(FakeDetectionClient::new());
        let ctrl = controller(fake.clone());

        ctrl.set_sort(SortField::AuthorName).await;
        ctrl.set_sort(SortField::AuthorName).await;
        ctrl.set_sort(SortField::AuthorName).await;

        let calls = fake.query_calls().await;
        assert_eq!(calls.len(), 3);
        // 字段变化重置为升序，其后同字段反复翻转
        assert_eq!(
            (calls[0].sort_by, calls[0].order),
            (SortField::AuthorName, SortOrder::Asc)
        );
        assert_eq!(calls[1].order, SortOrder::Desc);
        assert_eq!(calls[2].order, SortOrder::Asc);
    }

    #[tokio::test]
    async fn test_set_sort_new_field_resets_to_asc() {
        let fake = Arc::new(FakeDetectionClient::new());
        let ctrl = controller(fake.clone());

        ctrl.set_sort(SortField::AuthorName).await;
        ctrl.toggle_sort_order().await;
        ctrl.set_sort(SortField::PersonCount).await;

        let calls = fake.query_calls().await;
        assert_eq!(
            (calls[2].sort_by, calls[2].order),
            (SortField::PersonCount, SortOrder::Asc)
        );
    }

    #[tokio::test]
    async fn test_set_page_bounds() {
        let fake = Arc::new(FakeDetectionClient::new());
        fake.push_query_ok(page(&[1], 25)).await;
        let ctrl = controller(fake.clone());
        ctrl.refresh().await;
        assert_eq!(ctrl.total_pages().await, 3);

        // 越界与原地跳页均被拒绝，不发起请求
        ctrl.set_page(4).await;
        ctrl.set_page(0).await;
        ctrl.set_page(1).await;
        assert_eq!(fake.query_calls().await.len(), 1);
        assert_eq!(ctrl.page_index().await, 1);

        fake.push_query_ok(page(&[11], 25)).await;
        ctrl.set_page(2).await;
        assert_eq!(ctrl.page_index().await, 2);
        let calls = fake.query_calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].skip, 10);
        assert_eq!(calls[1].limit, 10);
    }

    #[tokio::test]
    async fn test_empty_search_is_omitted() {
        let fake = Arc::new(FakeDetectionClient::new());
        let ctrl = controller(fake.clone());

        ctrl.refresh().await;
        ctrl.set_search("bridge").await;
        ctrl.set_search("").await;

        let calls = fake.query_calls().await;
        assert_eq!(calls[0].search, None);
        assert_eq!(calls[1].search.as_deref(), Some("bridge"));
        assert_eq!(calls[2].search, None);
    }

    #[tokio::test]
    async fn test_search_change_keeps_page_index() {
        let fake = Arc::new(FakeDetectionClient::new());
        fake.push_query_ok(page(&[1], 25)).await;
        let ctrl = controller(fake.clone());
        ctrl.refresh().await;
        ctrl.set_page(2).await;

        ctrl.set_search("bridge").await;

        // 搜索词变化不重置页码，skip 仍对应第 2 页
        let calls = fake.query_calls().await;
        assert_eq!(calls[2].skip, 10);
        assert_eq!(ctrl.page_index().await, 2);
    }

    #[tokio::test]
    async fn test_error_degrades_to_empty_valid_state() {
        let fake = Arc::new(FakeDetectionClient::new());
        fake.push_query_ok(page(&[1, 2], 25)).await;
        fake.push_query_err(DetectionServiceError::MalformedResponse(
            "missing `items` field".to_string(),
        ))
        .await;
        let ctrl = controller(fake.clone());

        ctrl.refresh().await;
        ctrl.refresh().await;

        let snapshot = ctrl.snapshot().await;
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.total_pages, 1);
        assert!(matches!(
            snapshot.error,
            Some(DetectionServiceError::MalformedResponse(_))
        ));

        // 下一次成功覆盖错误槽
        fake.push_query_ok(page(&[3], 5)).await;
        ctrl.refresh().await;
        let snapshot = ctrl.snapshot().await;
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.items.len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_surfaced_in_error_slot() {
        let fake = Arc::new(FakeDetectionClient::new());
        fake.push_query_err(DetectionServiceError::Timeout).await;
        let ctrl = controller(fake.clone());

        ctrl.refresh().await;

        let snapshot = ctrl.snapshot().await;
        assert!(matches!(snapshot.error, Some(DetectionServiceError::Timeout)));
        assert!(!snapshot.is_loading);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let fake = Arc::new(FakeDetectionClient::new());
        let gate_old = fake.push_query_gated(Ok(page(&[1, 2, 3], 30))).await;
        let gate_new = fake.push_query_gated(Ok(page(&[7], 5))).await;

        let ctrl = Arc::new(controller(fake.clone()));

        let first = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.refresh().await }
        });
        while fake.query_calls().await.len() < 1 {
            yield_now().await;
        }
        let second = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.refresh().await }
        });
        while fake.query_calls().await.len() < 2 {
            yield_now().await;
        }

        // 后发请求先返回并被采纳
        gate_new.send(()).unwrap();
        second.await.unwrap();
        assert!(!ctrl.is_loading().await);

        // 先发请求后返回，按 generation 丢弃，状态不回退
        gate_old.send(()).unwrap();
        first.await.unwrap();

        let snapshot = ctrl.snapshot().await;
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].id, 7);
        assert_eq!(snapshot.total_pages, 1);
        assert!(!snapshot.is_loading);
    }
}
