//! Submission Context - Value Objects

use serde::{Deserialize, Serialize};

/// 作者姓名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorName(String);

impl AuthorName {
    pub fn new(name: impl Into<String>) -> Result<Self, &'static str> {
        let name = name.into();
        if name.is_empty() {
            return Err("作者姓名不能为空");
        }
        if name.len() > 100 {
            return Err("作者姓名长度不能超过100字符");
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AuthorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 共享元数据模板
///
/// 一次 submit 调用中所有文件项共用；每个文件项的标题默认取其文件名
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataTemplate {
    pub author_name: String,
    pub author_email: Option<String>,
    pub description: Option<String>,
}

impl MetadataTemplate {
    pub fn new(author_name: impl Into<String>) -> Self {
        Self {
            author_name: author_name.into(),
            author_email: None,
            description: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.author_email = Some(email.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 校验模板是否满足提交前置条件
    pub fn validate(&self) -> Result<(), &'static str> {
        AuthorName::new(self.author_name.clone()).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_name_rejects_empty() {
        assert!(AuthorName::new("").is_err());
    }

    #[test]
    fn test_author_name_rejects_overlong() {
        assert!(AuthorName::new("x".repeat(101)).is_err());
        assert!(AuthorName::new("x".repeat(100)).is_ok());
    }

    #[test]
    fn test_template_builder() {
        let template = MetadataTemplate::new("Alice")
            .with_email("alice@example.com")
            .with_description("现场巡查照片");
        assert!(template.validate().is_ok());
        assert_eq!(template.author_email.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn test_template_validate_empty_author() {
        let template = MetadataTemplate::new("");
        assert!(template.validate().is_err());
    }
}
