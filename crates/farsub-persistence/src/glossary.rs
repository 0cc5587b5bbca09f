//! `JobGlossaryTerm` persistence using ScyllaDB.

use async_trait::async_trait;
use farsub_core::JobGlossaryTerm;
use uuid::Uuid;

use crate::codec::{term_type_as_str, term_type_from_str};
use crate::{PersistenceError, ScyllaClient};

#[async_trait]
pub trait JobGlossaryStore: Send + Sync {
    /// Deletes any terms already stored for `job_id`, then inserts `terms`.
    async fn replace_all(&self, job_id: Uuid, terms: &[JobGlossaryTerm]) -> Result<(), PersistenceError>;
    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<JobGlossaryTerm>, PersistenceError>;
}

#[derive(Clone)]
pub struct ScyllaJobGlossaryStore {
    client: ScyllaClient,
}

impl ScyllaJobGlossaryStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    fn row_to_term(
        &self,
        row: scylla::frame::response::result::Row,
    ) -> Result<JobGlossaryTerm, PersistenceError> {
        let (job_id, term_id, en_term, fa_term, term_type, mandatory, confidence, notes): (
            Uuid,
            Uuid,
            String,
            String,
            Option<String>,
            bool,
            Option<i8>,
            Option<String>,
        ) = row
            .into_typed()
            .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

        Ok(JobGlossaryTerm {
            term_id,
            job_id,
            en_term,
            fa_term,
            term_type: term_type.and_then(|s| term_type_from_str(&s)),
            mandatory,
            confidence: confidence.map(|v| v as u8),
            notes,
        })
    }
}

#[async_trait]
impl JobGlossaryStore for ScyllaJobGlossaryStore {
    async fn replace_all(&self, job_id: Uuid, terms: &[JobGlossaryTerm]) -> Result<(), PersistenceError> {
        let delete = format!(
            "DELETE FROM {}.job_glossary_terms WHERE job_id = ?",
            self.client.keyspace()
        );
        self.client
            .session()
            .query_unpaged(delete, (job_id,))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        let insert = format!(
            "INSERT INTO {}.job_glossary_terms (
                job_id, term_id, en_term, fa_term, term_type, mandatory, confidence, notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        for term in terms {
            self.client
                .session()
                .query_unpaged(
                    insert.clone(),
                    (
                        term.job_id,
                        term.term_id,
                        &term.en_term,
                        &term.fa_term,
                        term.term_type.map(term_type_as_str),
                        term.mandatory,
                        term.confidence.map(|v| v as i8),
                        &term.notes,
                    ),
                )
                .await
                .map_err(|e| PersistenceError::Query(e.to_string()))?;
        }

        tracing::info!(job_id = %job_id, term_count = terms.len(), "glossary terms replaced");
        Ok(())
    }

    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<JobGlossaryTerm>, PersistenceError> {
        let query = format!(
            "SELECT job_id, term_id, en_term, fa_term, term_type, mandatory, confidence, notes
             FROM {}.job_glossary_terms WHERE job_id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (job_id,))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        let mut terms = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                terms.push(self.row_to_term(row)?);
            }
        }
        Ok(terms)
    }
}
