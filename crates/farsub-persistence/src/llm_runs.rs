//! `LlmRun` persistence using ScyllaDB. Every call through `farsub_llm` ends
//! up here for audit, dual-written by `run_id` and by `(job_id, started_at)`
//! so a job's call history can be listed without a secondary index.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use farsub_core::{LlmRun, LlmRunStatus};
use uuid::Uuid;

use crate::codec::{llm_run_status_as_str, llm_run_status_from_str};
use crate::{PersistenceError, ScyllaClient};

#[async_trait]
pub trait LlmRunStore: Send + Sync {
    async fn insert(&self, run: &LlmRun) -> Result<(), PersistenceError>;
    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<LlmRun>, PersistenceError>;
}

#[derive(Clone)]
pub struct ScyllaLlmRunStore {
    client: ScyllaClient,
}

impl ScyllaLlmRunStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    fn row_to_run(&self, row: scylla::frame::response::result::Row) -> Result<LlmRun, PersistenceError> {
        #[allow(clippy::type_complexity)]
        let (
            run_id,
            job_id,
            cue_id,
            agent_name,
            model,
            provider,
            started_at,
            finished_at,
            prompt_tokens,
            completion_tokens,
            status,
            error_message,
            input_sha,
            output_sha,
            meta,
        ): (
            Uuid,
            Option<Uuid>,
            Option<Uuid>,
            String,
            String,
            Option<String>,
            i64,
            Option<i64>,
            Option<i32>,
            Option<i32>,
            String,
            Option<String>,
            String,
            Option<String>,
            Option<String>,
        ) = row
            .into_typed()
            .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

        let meta = meta
            .map(|raw| serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null))
            .unwrap_or(serde_json::Value::Null);

        Ok(LlmRun {
            run_id,
            job_id,
            cue_id,
            agent_name,
            model,
            provider,
            started_at: DateTime::from_timestamp_millis(started_at).unwrap_or_else(Utc::now),
            finished_at: finished_at.and_then(DateTime::from_timestamp_millis),
            prompt_tokens: prompt_tokens.map(|v| v as u32),
            completion_tokens: completion_tokens.map(|v| v as u32),
            status: llm_run_status_from_str(&status),
            error_message,
            input_sha,
            output_sha,
            meta,
        })
    }
}

#[async_trait]
impl LlmRunStore for ScyllaLlmRunStore {
    async fn insert(&self, run: &LlmRun) -> Result<(), PersistenceError> {
        let meta = serde_json::to_string(&run.meta).unwrap_or_else(|_| "null".to_string());

        let query = format!(
            "INSERT INTO {}.llm_runs (
                run_id, job_id, cue_id, agent_name, model, provider, started_at, finished_at,
                prompt_tokens, completion_tokens, status, error_message, input_sha, output_sha, meta
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    run.run_id,
                    run.job_id,
                    run.cue_id,
                    &run.agent_name,
                    &run.model,
                    &run.provider,
                    run.started_at.timestamp_millis(),
                    run.finished_at.map(|t| t.timestamp_millis()),
                    run.prompt_tokens.map(|v| v as i32),
                    run.completion_tokens.map(|v| v as i32),
                    llm_run_status_as_str(run.status),
                    &run.error_message,
                    &run.input_sha,
                    &run.output_sha,
                    meta,
                ),
            )
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        if let Some(job_id) = run.job_id {
            let by_job = format!(
                "INSERT INTO {}.llm_runs_by_job (job_id, started_at, run_id) VALUES (?, ?, ?)",
                self.client.keyspace()
            );
            self.client
                .session()
                .query_unpaged(by_job, (job_id, run.started_at.timestamp_millis(), run.run_id))
                .await
                .map_err(|e| PersistenceError::Query(e.to_string()))?;
        }

        tracing::info!(
            run_id = %run.run_id,
            agent = %run.agent_name,
            model = %run.model,
            status = ?run.status,
            "llm run recorded"
        );
        Ok(())
    }

    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<LlmRun>, PersistenceError> {
        let ids_query = format!(
            "SELECT run_id FROM {}.llm_runs_by_job WHERE job_id = ?",
            self.client.keyspace()
        );
        let ids_result = self
            .client
            .session()
            .query_unpaged(ids_query, (job_id,))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        let run_ids: Vec<Uuid> = match ids_result.rows {
            Some(rows) => rows
                .into_iter()
                .filter_map(|row| row.into_typed::<(Uuid,)>().ok())
                .map(|(id,)| id)
                .collect(),
            None => Vec::new(),
        };

        let mut runs = Vec::with_capacity(run_ids.len());
        for run_id in run_ids {
            let query = format!(
                "SELECT run_id, job_id, cue_id, agent_name, model, provider, started_at, finished_at,
                        prompt_tokens, completion_tokens, status, error_message, input_sha, output_sha, meta
                 FROM {}.llm_runs WHERE run_id = ?",
                self.client.keyspace()
            );
            let result = self
                .client
                .session()
                .query_unpaged(query, (run_id,))
                .await
                .map_err(|e| PersistenceError::Query(e.to_string()))?;

            if let Some(row) = result.rows.and_then(|rows| rows.into_iter().next()) {
                runs.push(self.row_to_run(row)?);
            }
        }

        Ok(runs)
    }
}
