//! `JobCue` persistence using ScyllaDB. Cues are clustered by `cue_index`
//! within a job's partition so `list_by_job` returns them already ordered.

use async_trait::async_trait;
use farsub_core::{CueIssues, JobCue};
use uuid::Uuid;

use crate::{PersistenceError, ScyllaClient};

#[async_trait]
pub trait JobCueStore: Send + Sync {
    /// Deletes any cues already stored for `job_id`, then inserts `cues`.
    /// Re-segmentation on a rerun must not leave stale cues behind (§4.1).
    async fn replace_all(&self, job_id: Uuid, cues: &[JobCue]) -> Result<(), PersistenceError>;
    async fn upsert(&self, cue: &JobCue) -> Result<(), PersistenceError>;
    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<JobCue>, PersistenceError>;
}

#[derive(Clone)]
pub struct ScyllaJobCueStore {
    client: ScyllaClient,
}

impl ScyllaJobCueStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    fn row_to_cue(&self, row: scylla::frame::response::result::Row) -> Result<JobCue, PersistenceError> {
        #[allow(clippy::type_complexity)]
        let (
            job_id,
            cue_index,
            cue_id,
            start_ms,
            end_ms,
            en_text,
            fa_text,
            fa_text_qa,
            tm_reused,
            tm_entry_id,
            needs_translation,
            tm_confidence,
            qa_score,
            issues,
        ): (
            Uuid,
            i32,
            Uuid,
            i64,
            i64,
            String,
            Option<String>,
            Option<String>,
            bool,
            Option<Uuid>,
            bool,
            Option<f32>,
            Option<f32>,
            Option<Vec<String>>,
        ) = row
            .into_typed()
            .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

        Ok(JobCue {
            cue_id,
            job_id,
            cue_index: cue_index as u32,
            start_ms,
            end_ms,
            en_text,
            fa_text,
            fa_text_qa,
            tm_reused,
            tm_entry_id,
            needs_translation,
            tm_confidence,
            qa_score,
            issues: CueIssues(issues.unwrap_or_default()),
        })
    }

    async fn insert_one(&self, cue: &JobCue) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.job_cues (
                job_id, cue_index, cue_id, start_ms, end_ms, en_text, fa_text, fa_text_qa,
                tm_reused, tm_entry_id, needs_translation, tm_confidence, qa_score, issues
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    cue.job_id,
                    cue.cue_index as i32,
                    cue.cue_id,
                    cue.start_ms,
                    cue.end_ms,
                    &cue.en_text,
                    &cue.fa_text,
                    &cue.fa_text_qa,
                    cue.tm_reused,
                    cue.tm_entry_id,
                    cue.needs_translation,
                    cue.tm_confidence,
                    cue.qa_score,
                    &cue.issues.0,
                ),
            )
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl JobCueStore for ScyllaJobCueStore {
    async fn replace_all(&self, job_id: Uuid, cues: &[JobCue]) -> Result<(), PersistenceError> {
        let delete = format!("DELETE FROM {}.job_cues WHERE job_id = ?", self.client.keyspace());
        self.client
            .session()
            .query_unpaged(delete, (job_id,))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        for cue in cues {
            self.insert_one(cue).await?;
        }

        tracing::info!(job_id = %job_id, cue_count = cues.len(), "job cues replaced");
        Ok(())
    }

    async fn upsert(&self, cue: &JobCue) -> Result<(), PersistenceError> {
        self.insert_one(cue).await
    }

    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<JobCue>, PersistenceError> {
        let query = format!(
            "SELECT job_id, cue_index, cue_id, start_ms, end_ms, en_text, fa_text, fa_text_qa,
                    tm_reused, tm_entry_id, needs_translation, tm_confidence, qa_score, issues
             FROM {}.job_cues WHERE job_id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (job_id,))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        let mut cues = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                cues.push(self.row_to_cue(row)?);
            }
        }
        Ok(cues)
    }
}
