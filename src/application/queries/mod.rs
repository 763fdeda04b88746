//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：分页浏览检测记录

mod listing;
mod query_controller;

pub use listing::{total_pages, SortField, SortOrder, DEFAULT_PAGE_SIZE};
pub use query_controller::{QueryController, QueryOptions, QuerySnapshot};
