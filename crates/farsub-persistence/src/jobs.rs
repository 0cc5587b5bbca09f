//! `Job` persistence using ScyllaDB.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use farsub_core::{DomainTags, Job, JobStatus, RiskLevel};
use uuid::Uuid;

use crate::codec::{job_status_as_str, job_status_from_str, risk_level_as_str, risk_level_from_str};
use crate::{PersistenceError, ScyllaClient};

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: &Job) -> Result<(), PersistenceError>;
    async fn get(&self, job_id: Uuid) -> Result<Option<Job>, PersistenceError>;
    async fn update_status(&self, job_id: Uuid, status: JobStatus) -> Result<(), PersistenceError>;
    async fn update_uris(
        &self,
        job_id: Uuid,
        normalized_uri: Option<&str>,
        asr_json_uri: Option<&str>,
        final_srt_uri: Option<&str>,
    ) -> Result<(), PersistenceError>;
    #[allow(clippy::too_many_arguments)]
    async fn update_strategy(
        &self,
        job_id: Uuid,
        risk_level: RiskLevel,
        difficulty_score: u8,
        strategist_confidence: u8,
        genre: &str,
        tone: &str,
        domain_tags: &DomainTags,
        needs_terminologist: bool,
    ) -> Result<(), PersistenceError>;
}

#[derive(Clone)]
pub struct ScyllaJobStore {
    client: ScyllaClient,
}

impl ScyllaJobStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    fn row_to_job(&self, row: scylla::frame::response::result::Row) -> Result<Job, PersistenceError> {
        #[allow(clippy::type_complexity)]
        let (
            job_id,
            created_at,
            updated_at,
            source_lang,
            target_lang,
            status,
            input_uri,
            normalized_uri,
            asr_json_uri,
            final_srt_uri,
            max_lines,
            max_chars_per_line,
            target_cps,
            min_cue_ms,
            max_cue_ms,
            risk_level,
            difficulty_score,
            strategist_confidence,
            genre,
            tone,
            domain_tags,
            needs_terminologist,
        ): (
            Uuid,
            i64,
            i64,
            String,
            String,
            String,
            String,
            Option<String>,
            Option<String>,
            Option<String>,
            i32,
            i32,
            f32,
            i64,
            i64,
            Option<String>,
            Option<i8>,
            Option<i8>,
            Option<String>,
            Option<String>,
            Option<Vec<String>>,
            Option<bool>,
        ) = row
            .into_typed()
            .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

        Ok(Job {
            job_id,
            created_at: DateTime::from_timestamp_millis(created_at).unwrap_or_else(Utc::now),
            updated_at: DateTime::from_timestamp_millis(updated_at).unwrap_or_else(Utc::now),
            source_lang,
            target_lang,
            status: job_status_from_str(&status),
            input_uri,
            normalized_uri,
            asr_json_uri,
            final_srt_uri,
            max_lines: max_lines as u32,
            max_chars_per_line: max_chars_per_line as u32,
            target_cps,
            min_cue_ms,
            max_cue_ms,
            risk_level: risk_level.and_then(|s| risk_level_from_str(&s)),
            difficulty_score: difficulty_score.map(|v| v as u8),
            strategist_confidence: strategist_confidence.map(|v| v as u8),
            genre,
            tone,
            domain_tags: domain_tags.unwrap_or_default(),
            needs_terminologist,
        })
    }
}

#[async_trait]
impl JobStore for ScyllaJobStore {
    async fn create(&self, job: &Job) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.jobs (
                job_id, created_at, updated_at, source_lang, target_lang, status,
                input_uri, normalized_uri, asr_json_uri, final_srt_uri,
                max_lines, max_chars_per_line, target_cps, min_cue_ms, max_cue_ms,
                risk_level, difficulty_score, strategist_confidence, genre, tone, domain_tags,
                needs_terminologist
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    job.job_id,
                    job.created_at.timestamp_millis(),
                    job.updated_at.timestamp_millis(),
                    &job.source_lang,
                    &job.target_lang,
                    job_status_as_str(job.status),
                    &job.input_uri,
                    &job.normalized_uri,
                    &job.asr_json_uri,
                    &job.final_srt_uri,
                    job.max_lines as i32,
                    job.max_chars_per_line as i32,
                    job.target_cps,
                    job.min_cue_ms,
                    job.max_cue_ms,
                    job.risk_level.map(risk_level_as_str),
                    job.difficulty_score.map(|v| v as i8),
                    job.strategist_confidence.map(|v| v as i8),
                    &job.genre,
                    &job.tone,
                    &job.domain_tags,
                    job.needs_terminologist,
                ),
            )
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        tracing::info!(job_id = %job.job_id, input_uri = %job.input_uri, "job created");
        Ok(())
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<Job>, PersistenceError> {
        let query = format!(
            "SELECT job_id, created_at, updated_at, source_lang, target_lang, status,
                    input_uri, normalized_uri, asr_json_uri, final_srt_uri,
                    max_lines, max_chars_per_line, target_cps, min_cue_ms, max_cue_ms,
                    risk_level, difficulty_score, strategist_confidence, genre, tone, domain_tags,
                    needs_terminologist
             FROM {}.jobs WHERE job_id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (job_id,))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        match result.rows {
            Some(rows) => match rows.into_iter().next() {
                Some(row) => Ok(Some(self.row_to_job(row)?)),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }

    async fn update_status(&self, job_id: Uuid, status: JobStatus) -> Result<(), PersistenceError> {
        let query = format!(
            "UPDATE {}.jobs SET status = ?, updated_at = ? WHERE job_id = ?",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (job_status_as_str(status), Utc::now().timestamp_millis(), job_id),
            )
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        tracing::info!(job_id = %job_id, status = ?status, "job status updated");
        Ok(())
    }

    async fn update_uris(
        &self,
        job_id: Uuid,
        normalized_uri: Option<&str>,
        asr_json_uri: Option<&str>,
        final_srt_uri: Option<&str>,
    ) -> Result<(), PersistenceError> {
        let query = format!(
            "UPDATE {}.jobs SET normalized_uri = ?, asr_json_uri = ?, final_srt_uri = ?, updated_at = ?
             WHERE job_id = ?",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    normalized_uri,
                    asr_json_uri,
                    final_srt_uri,
                    Utc::now().timestamp_millis(),
                    job_id,
                ),
            )
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        Ok(())
    }

    async fn update_strategy(
        &self,
        job_id: Uuid,
        risk_level: RiskLevel,
        difficulty_score: u8,
        strategist_confidence: u8,
        genre: &str,
        tone: &str,
        domain_tags: &DomainTags,
        needs_terminologist: bool,
    ) -> Result<(), PersistenceError> {
        let query = format!(
            "UPDATE {}.jobs SET risk_level = ?, difficulty_score = ?, strategist_confidence = ?,
                    genre = ?, tone = ?, domain_tags = ?, needs_terminologist = ?, updated_at = ?
             WHERE job_id = ?",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    risk_level_as_str(risk_level),
                    difficulty_score as i8,
                    strategist_confidence as i8,
                    genre,
                    tone,
                    domain_tags,
                    needs_terminologist,
                    Utc::now().timestamp_millis(),
                    job_id,
                ),
            )
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        Ok(())
    }
}
