//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod detection_service;

pub use detection_service::{
    DetectionPage, DetectionServiceError, DetectionServicePort, PageQuery, SubmitRequest,
};
