//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：向远程服务提交检测批次

mod batch_submitter;

pub use batch_submitter::BatchSubmitter;
