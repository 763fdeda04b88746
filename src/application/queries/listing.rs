//! 查询侧 - 排序与分页基础类型

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 会话内固定的默认单页记录数
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// 排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    AuthorName,
    #[serde(rename = "number_of_persons")]
    PersonCount,
    Status,
}

impl SortField {
    /// 查询端点使用的字段名
    pub fn as_query_param(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::AuthorName => "author_name",
            SortField::PersonCount => "number_of_persons",
            SortField::Status => "status",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(SortField::CreatedAt),
            "author_name" => Ok(SortField::AuthorName),
            "number_of_persons" => Ok(SortField::PersonCount),
            "status" => Ok(SortField::Status),
            other => Err(format!("unknown sort field: {}", other)),
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_query_param())
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// 取反方向
    pub fn flipped(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn as_query_param(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_query_param())
    }
}

/// 总页数 = ceil(total_count / page_size)，下限 1
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 1;
    }
    let pages = total_count.div_ceil(page_size as u64);
    pages.clamp(1, u32::MAX as u64) as u32
}
