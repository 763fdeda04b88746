//! Detection Context - 检测记录限界上下文
//!
//! 职责:
//! - 检测记录只读模型（服务端产出，客户端不可变更）
//! - 处理状态枚举

mod record;

pub use record::{DetectionRecord, DetectionStatus};
