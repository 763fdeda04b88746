//! Submission Context - Entities

use uuid::Uuid;

/// 可接受的图片扩展名（其余文件静默丢弃）
const ACCEPTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// 按扩展名判断文件是否为可接受的图片
pub fn is_accepted_image(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ACCEPTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// 待提交文件项
///
/// 不变量:
/// - 仅存在于待提交队列中，提交出队或用户移除后即销毁
/// - local id 仅用于客户端内部标识，与服务端 id 无关
#[derive(Debug, Clone)]
pub struct FileItem {
    id: Uuid,
    file_name: String,
    payload: Vec<u8>,
    size_bytes: u64,
}

impl FileItem {
    pub fn new(file_name: impl Into<String>, payload: Vec<u8>) -> Self {
        let size_bytes = payload.len() as u64;
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            payload,
            size_bytes,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_extensions() {
        assert!(is_accepted_image("photo.jpg"));
        assert!(is_accepted_image("photo.JPEG"));
        assert!(is_accepted_image("scan.Png"));
        assert!(is_accepted_image("anim.gif"));
        assert!(!is_accepted_image("notes.txt"));
        assert!(!is_accepted_image("archive.tar.gz"));
        assert!(!is_accepted_image("noextension"));
    }

    #[test]
    fn test_file_item_size() {
        let item = FileItem::new("a.png", vec![0u8; 1024]);
        assert_eq!(item.size_bytes(), 1024);
        assert_eq!(item.file_name(), "a.png");
    }

    #[test]
    fn test_duplicate_names_get_distinct_ids() {
        let a = FileItem::new("same.png", vec![1]);
        let b = FileItem::new("same.png", vec![1]);
        assert_ne!(a.id(), b.id());
    }
}
