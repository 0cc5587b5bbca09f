//! ScyllaDB schema creation for the subtitle pipeline's data model (§3).

use crate::error::PersistenceError;
use scylla::Session;

pub async fn create_keyspace(
    session: &Session,
    keyspace: &str,
    replication_factor: u8,
) -> Result<(), PersistenceError> {
    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    );

    session
        .query_unpaged(query, &[])
        .await
        .map_err(|e| PersistenceError::Schema(format!("failed to create keyspace: {e}")))?;

    Ok(())
}

pub async fn create_tables(session: &Session, keyspace: &str) -> Result<(), PersistenceError> {
    let jobs_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {ks}.jobs (
            job_id UUID,
            created_at BIGINT,
            updated_at BIGINT,
            source_lang TEXT,
            target_lang TEXT,
            status TEXT,
            input_uri TEXT,
            normalized_uri TEXT,
            asr_json_uri TEXT,
            final_srt_uri TEXT,
            max_lines INT,
            max_chars_per_line INT,
            target_cps FLOAT,
            min_cue_ms BIGINT,
            max_cue_ms BIGINT,
            risk_level TEXT,
            difficulty_score TINYINT,
            strategist_confidence TINYINT,
            genre TEXT,
            tone TEXT,
            domain_tags LIST<TEXT>,
            needs_terminologist BOOLEAN,
            PRIMARY KEY (job_id)
        )
    "#,
        ks = keyspace
    );
    session
        .query_unpaged(jobs_table, &[])
        .await
        .map_err(|e| PersistenceError::Schema(format!("failed to create jobs table: {e}")))?;

    let job_cues_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {ks}.job_cues (
            job_id UUID,
            cue_index INT,
            cue_id UUID,
            start_ms BIGINT,
            end_ms BIGINT,
            en_text TEXT,
            fa_text TEXT,
            fa_text_qa TEXT,
            tm_reused BOOLEAN,
            tm_entry_id UUID,
            needs_translation BOOLEAN,
            tm_confidence FLOAT,
            qa_score FLOAT,
            issues LIST<TEXT>,
            PRIMARY KEY ((job_id), cue_index)
        ) WITH CLUSTERING ORDER BY (cue_index ASC)
    "#,
        ks = keyspace
    );
    session
        .query_unpaged(job_cues_table, &[])
        .await
        .map_err(|e| PersistenceError::Schema(format!("failed to create job_cues table: {e}")))?;

    let glossary_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {ks}.job_glossary_terms (
            job_id UUID,
            term_id UUID,
            en_term TEXT,
            fa_term TEXT,
            term_type TEXT,
            mandatory BOOLEAN,
            confidence TINYINT,
            notes TEXT,
            PRIMARY KEY ((job_id), term_id)
        )
    "#,
        ks = keyspace
    );
    session
        .query_unpaged(glossary_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::Schema(format!("failed to create job_glossary_terms table: {e}"))
        })?;

    let tm_entries_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {ks}.tm_entries (
            tm_entry_id UUID,
            created_at BIGINT,
            updated_at BIGINT,
            source_lang TEXT,
            target_lang TEXT,
            en_text TEXT,
            fa_text TEXT,
            version INT,
            quality_grade TEXT,
            qa_score FLOAT,
            confidence TINYINT,
            en_hash TEXT,
            domain_tags LIST<TEXT>,
            PRIMARY KEY (tm_entry_id)
        )
    "#,
        ks = keyspace
    );
    session
        .query_unpaged(tm_entries_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::Schema(format!("failed to create tm_entries table: {e}"))
        })?;

    // Companion table enforcing en_hash uniqueness via a lightweight
    // transaction (`IF NOT EXISTS`) on insert, since tm_entries itself is
    // keyed by tm_entry_id and can't express that constraint directly.
    let tm_entries_by_hash_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {ks}.tm_entries_by_hash (
            en_hash TEXT,
            tm_entry_id UUID,
            PRIMARY KEY (en_hash)
        )
    "#,
        ks = keyspace
    );
    session
        .query_unpaged(tm_entries_by_hash_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::Schema(format!("failed to create tm_entries_by_hash table: {e}"))
        })?;

    let llm_runs_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {ks}.llm_runs (
            run_id UUID,
            job_id UUID,
            cue_id UUID,
            agent_name TEXT,
            model TEXT,
            provider TEXT,
            started_at BIGINT,
            finished_at BIGINT,
            prompt_tokens INT,
            completion_tokens INT,
            status TEXT,
            error_message TEXT,
            input_sha TEXT,
            output_sha TEXT,
            meta TEXT,
            PRIMARY KEY (run_id)
        )
    "#,
        ks = keyspace
    );
    session
        .query_unpaged(llm_runs_table, &[])
        .await
        .map_err(|e| PersistenceError::Schema(format!("failed to create llm_runs table: {e}")))?;

    // Dual-write partition keyed by job for per-job audit queries, mirroring
    // the by-job/by-hash secondary-table pattern used above.
    let llm_runs_by_job_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {ks}.llm_runs_by_job (
            job_id UUID,
            started_at BIGINT,
            run_id UUID,
            PRIMARY KEY ((job_id), started_at, run_id)
        ) WITH CLUSTERING ORDER BY (started_at DESC, run_id DESC)
    "#,
        ks = keyspace
    );
    session
        .query_unpaged(llm_runs_by_job_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::Schema(format!("failed to create llm_runs_by_job table: {e}"))
        })?;

    tracing::info!("all tables created successfully");
    Ok(())
}
