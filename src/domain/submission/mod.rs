//! Submission Context - 提交批次限界上下文
//!
//! 职责:
//! - 待提交文件项实体
//! - 共享元数据模板与作者姓名校验
//! - 批次提交状态机

mod entities;
mod phase;
mod value_objects;

pub use entities::{is_accepted_image, FileItem};
pub use phase::BatchPhase;
pub use value_objects::{AuthorName, MetadataTemplate};
