//! `TmEntry` metadata persistence using ScyllaDB. The embedding vector
//! itself lives in Qdrant (`farsub_tm::QdrantTmIndex`); this store only
//! holds the row described in §3's `TmEntry`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use farsub_core::TmEntry;
use scylla::frame::response::result::CqlValue;
use uuid::Uuid;

use crate::codec::{quality_grade_as_str, quality_grade_from_str};
use crate::{PersistenceError, ScyllaClient};

#[async_trait]
pub trait TmEntryStore: Send + Sync {
    /// Inserts `entry` unless an entry with the same `en_hash` already
    /// exists, in which case the insert is ignored silently (§7) and the
    /// already-stored `tm_entry_id` is returned.
    async fn insert_if_new(&self, entry: &TmEntry) -> Result<Uuid, PersistenceError>;
    async fn get(&self, tm_entry_id: Uuid) -> Result<Option<TmEntry>, PersistenceError>;
}

#[derive(Clone)]
pub struct ScyllaTmEntryStore {
    client: ScyllaClient,
}

impl ScyllaTmEntryStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    fn row_to_entry(
        &self,
        row: scylla::frame::response::result::Row,
    ) -> Result<TmEntry, PersistenceError> {
        #[allow(clippy::type_complexity)]
        let (
            tm_entry_id,
            created_at,
            updated_at,
            source_lang,
            target_lang,
            en_text,
            fa_text,
            version,
            quality_grade,
            qa_score,
            confidence,
            en_hash,
            domain_tags,
        ): (
            Uuid,
            i64,
            i64,
            String,
            String,
            String,
            String,
            i32,
            String,
            Option<f32>,
            Option<i8>,
            String,
            Option<Vec<String>>,
        ) = row
            .into_typed()
            .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

        Ok(TmEntry {
            tm_entry_id,
            created_at: DateTime::from_timestamp_millis(created_at).unwrap_or_else(Utc::now),
            updated_at: DateTime::from_timestamp_millis(updated_at).unwrap_or_else(Utc::now),
            source_lang,
            target_lang,
            en_text,
            fa_text,
            version: version as u32,
            quality_grade: quality_grade_from_str(&quality_grade),
            qa_score,
            confidence: confidence.map(|v| v as u8),
            en_hash,
            domain_tags: domain_tags.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl TmEntryStore for ScyllaTmEntryStore {
    async fn insert_if_new(&self, entry: &TmEntry) -> Result<Uuid, PersistenceError> {
        let claim = format!(
            "INSERT INTO {}.tm_entries_by_hash (en_hash, tm_entry_id) VALUES (?, ?) IF NOT EXISTS",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(claim, (&entry.en_hash, entry.tm_entry_id))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        let applied = result
            .rows
            .as_ref()
            .and_then(|rows| rows.first())
            .and_then(|row| row.columns.first())
            .and_then(|col| col.as_ref())
            .and_then(|value| match value {
                CqlValue::Boolean(applied) => Some(*applied),
                _ => None,
            })
            .unwrap_or(false);

        if !applied {
            let existing = format!(
                "SELECT tm_entry_id FROM {}.tm_entries_by_hash WHERE en_hash = ?",
                self.client.keyspace()
            );
            let result = self
                .client
                .session()
                .query_unpaged(existing, (&entry.en_hash,))
                .await
                .map_err(|e| PersistenceError::Query(e.to_string()))?;

            let tm_entry_id: Option<(Uuid,)> = result
                .rows
                .and_then(|rows| rows.into_iter().next())
                .and_then(|row| row.into_typed::<(Uuid,)>().ok());

            tracing::debug!(en_hash = %entry.en_hash, "tm entry with this hash already exists, ignoring insert");
            return tm_entry_id
                .map(|(id,)| id)
                .ok_or(PersistenceError::NotFound);
        }

        let insert = format!(
            "INSERT INTO {}.tm_entries (
                tm_entry_id, created_at, updated_at, source_lang, target_lang, en_text, fa_text,
                version, quality_grade, qa_score, confidence, en_hash, domain_tags
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                insert,
                (
                    entry.tm_entry_id,
                    entry.created_at.timestamp_millis(),
                    entry.updated_at.timestamp_millis(),
                    &entry.source_lang,
                    &entry.target_lang,
                    &entry.en_text,
                    &entry.fa_text,
                    entry.version as i32,
                    quality_grade_as_str(entry.quality_grade),
                    entry.qa_score,
                    entry.confidence.map(|v| v as i8),
                    &entry.en_hash,
                    &entry.domain_tags,
                ),
            )
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        tracing::info!(tm_entry_id = %entry.tm_entry_id, "tm entry stored");
        Ok(entry.tm_entry_id)
    }

    async fn get(&self, tm_entry_id: Uuid) -> Result<Option<TmEntry>, PersistenceError> {
        let query = format!(
            "SELECT tm_entry_id, created_at, updated_at, source_lang, target_lang, en_text, fa_text,
                    version, quality_grade, qa_score, confidence, en_hash, domain_tags
             FROM {}.tm_entries WHERE tm_entry_id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (tm_entry_id,))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        match result.rows {
            Some(rows) => match rows.into_iter().next() {
                Some(row) => Ok(Some(self.row_to_entry(row)?)),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }
}
