//! SQLite Share Text Repository

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{RepositoryError, ShareTextRepositoryPort};
use crate::domain::logshare::{FileExt, ShareFileId, ShareTextRecord};

/// SQLite Share Text Repository
pub struct SqliteShareTextRepository {
    pool: DbPool,
}

impl SqliteShareTextRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ShareTextRow {
    file_id: String,
    ext: String,
    content: String,
    file_name: Option<String>,
    created_at: String,
}

impl TryFrom<ShareTextRow> for ShareTextRecord {
    type Error = RepositoryError;

    fn try_from(row: ShareTextRow) -> Result<Self, Self::Error> {
        Ok(ShareTextRecord {
            file_id: ShareFileId::parse(&row.file_id).ok_or_else(|| {
                RepositoryError::SerializationError(format!("invalid file id: {}", row.file_id))
            })?,
            ext: FileExt::from_trusted(row.ext),
            content: row.content,
            file_name: row.file_name,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl ShareTextRepositoryPort for SqliteShareTextRepository {
    async fn save(&self, record: &ShareTextRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO logshare_files (file_id, ext, content, file_name, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.file_id.as_str())
        .bind(record.ext.as_str())
        .bind(&record.content)
        .bind(&record.file_name)
        .bind(record.created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(record.file_id.to_string())
            }
            _ => RepositoryError::DatabaseError(e.to_string()),
        })?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        file_id: &ShareFileId,
    ) -> Result<Option<ShareTextRecord>, RepositoryError> {
        let row: Option<ShareTextRow> = sqlx::query_as(
            "SELECT file_id, ext, content, file_name, created_at FROM logshare_files WHERE file_id = ?",
        )
        .bind(file_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(ShareTextRecord::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<ShareTextRecord>, RepositoryError> {
        let rows: Vec<ShareTextRow> = sqlx::query_as(
            "SELECT file_id, ext, content, file_name, created_at FROM logshare_files ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(ShareTextRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::create_test_pool;
    use chrono::Duration;

    fn record(age_secs: i64) -> ShareTextRecord {
        ShareTextRecord {
            file_id: ShareFileId::generate(),
            ext: FileExt::from_trusted(".log"),
            content: "line 1\nline 2".to_string(),
            file_name: Some("app.log".to_string()),
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = SqliteShareTextRepository::new(create_test_pool().await.unwrap());
        let r = record(0);
        repo.save(&r).await.unwrap();

        let found = repo.find_by_id(&r.file_id).await.unwrap().unwrap();
        assert_eq!(found.content, r.content);
        assert_eq!(found.ext.as_str(), ".log");
        assert_eq!(found.file_name.as_deref(), Some("app.log"));

        let missing = ShareFileId::parse("ffff").unwrap();
        assert!(repo.find_by_id(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_all_newest_first() {
        let repo = SqliteShareTextRepository::new(create_test_pool().await.unwrap());
        let old = record(120);
        let new = record(1);
        repo.save(&old).await.unwrap();
        repo.save(&new).await.unwrap();

        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].file_id, new.file_id);
        assert_eq!(all[1].file_id, old.file_id);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let repo = SqliteShareTextRepository::new(create_test_pool().await.unwrap());
        let r = record(0);
        repo.save(&r).await.unwrap();
        assert!(matches!(repo.save(&r).await, Err(RepositoryError::Duplicate(_))));
    }
}
