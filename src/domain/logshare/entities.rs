//! LogShare Context - Entities

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{FileExt, ShareFileId};

/// 存放在数据库中的文本分享
#[derive(Debug, Clone)]
pub struct ShareTextRecord {
    pub file_id: ShareFileId,
    pub ext: FileExt,
    pub content: String,
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ShareTextRecord {
    /// 列表中展示的大小：字符数
    pub fn size(&self) -> u64 {
        self.content.chars().count() as u64
    }
}

/// 文件系统中的二进制分享
#[derive(Debug, Clone)]
pub struct ShareBlobInfo {
    pub file_id: String,
    pub ext: FileExt,
    pub size: u64,
    pub modified_at: DateTime<Utc>,
}

/// 日志列表中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLogEntry {
    pub id: String,
    pub ext: String,
    pub upload_time: String,
    pub size: u64,
}

impl From<&ShareTextRecord> for ShareLogEntry {
    fn from(record: &ShareTextRecord) -> Self {
        Self {
            id: record.file_id.to_string(),
            ext: record.ext.to_string(),
            upload_time: record.created_at.to_rfc3339(),
            size: record.size(),
        }
    }
}

impl From<&ShareBlobInfo> for ShareLogEntry {
    fn from(blob: &ShareBlobInfo) -> Self {
        Self {
            id: blob.file_id.clone(),
            ext: blob.ext.to_string(),
            upload_time: blob.modified_at.to_rfc3339(),
            size: blob.size,
        }
    }
}

/// 合并数据库与文件系统的列表
///
/// 数据库记录在前（新到旧），随后是非文本文件（新到旧）
pub fn merge_share_logs(
    mut texts: Vec<ShareTextRecord>,
    mut blobs: Vec<ShareBlobInfo>,
) -> Vec<ShareLogEntry> {
    texts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    blobs.retain(|b| !b.ext.is_text());
    blobs.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));

    texts
        .iter()
        .map(ShareLogEntry::from)
        .chain(blobs.iter().map(ShareLogEntry::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn text(id: &str, age_secs: i64) -> ShareTextRecord {
        ShareTextRecord {
            file_id: ShareFileId::parse(id).unwrap(),
            ext: FileExt::text_default(),
            content: "你好".to_string(),
            file_name: None,
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    fn blob(id: &str, ext: &str, age_secs: i64) -> ShareBlobInfo {
        ShareBlobInfo {
            file_id: id.to_string(),
            ext: FileExt::from_trusted(ext),
            size: 10,
            modified_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[test]
    fn test_text_size_counts_chars() {
        assert_eq!(text("aa", 0).size(), 2);
    }

    #[test]
    fn test_merge_orders_db_first_then_files() {
        let merged = merge_share_logs(
            vec![text("aa", 100), text("bb", 1)],
            vec![
                blob("cc", ".png", 50),
                blob("dd", ".zip", 5),
                blob("ee", ".txt", 0),
            ],
        );
        let ids: Vec<_> = merged.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["bb", "aa", "dd", "cc"]);
    }
}
