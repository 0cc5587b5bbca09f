//! The stage machine driving a job from `UPLOADED` to `DONE` (§4.1).
//!
//! Each stage function commits everything it produces to storage or
//! persistence before returning, so a process restart can resume a job by
//! re-entering `run_job` and re-running only the stage it was on — nothing
//! lives in memory across a stage boundary that isn't also on disk or in
//! Scylla. `run_job` itself only ever advances `Job.status` after a stage
//! returns `Ok`; on error the status is left where it was, which (per the
//! `next()` ordering) names the stage that failed.

use std::collections::HashMap;

use farsub_agents::{librarian_should_store, qa, strategist, terminologist, translator};
use farsub_core::{
    AsrTranscript, ChatProvider, CueIssues, DomainTags, Job, JobCue, JobGlossaryTerm, JobStatus,
    QualityGrade, TmEntry,
};
use farsub_persistence::{JobCueStore, JobGlossaryStore, JobStore, LlmRunStore, TmEntryStore};
use farsub_text::{
    build_srt, clamp_non_overlapping, risk_level, segment_fallback, segment_from_words,
    SegmentShape, TimelineCue,
};
use farsub_tm::{en_hash, gate};
use serde::Serialize;
use uuid::Uuid;

use crate::deps::PipelineDeps;
use crate::PipelineError;

const MIN_GAP_MS: i64 = 1;

pub async fn run_job<P: ChatProvider>(
    deps: &PipelineDeps<'_, P>,
    job_id: Uuid,
) -> Result<(), PipelineError> {
    loop {
        let job = deps
            .persistence
            .jobs
            .get(job_id)
            .await?
            .ok_or(PipelineError::JobNotFound(job_id))?;

        if job.status.is_terminal() {
            return Ok(());
        }

        run_stage(deps, &job).await?;
    }
}

async fn run_stage<P: ChatProvider>(
    deps: &PipelineDeps<'_, P>,
    job: &Job,
) -> Result<(), PipelineError> {
    match job.status {
        JobStatus::Uploaded => stage_audio_prep(deps, job).await?,
        JobStatus::AudioPrep => stage_asr(deps, job).await?,
        JobStatus::Asr => stage_segment(deps, job).await?,
        JobStatus::Segment => stage_strategy(deps, job).await?,
        JobStatus::Strategy => stage_tm_gating(deps, job).await?,
        JobStatus::TmGating => stage_terms(deps, job).await?,
        JobStatus::Terms => stage_translate(deps, job).await?,
        JobStatus::Translate => stage_qa(deps, job).await?,
        JobStatus::Qa => stage_finalize(deps, job).await?,
        JobStatus::Finalize => stage_librarian(deps, job).await?,
        JobStatus::Librarian | JobStatus::Done | JobStatus::Failed => {}
    }

    let next = job
        .status
        .next()
        .ok_or_else(|| PipelineError::Invariant(format!("{:?} has no successor", job.status)))?;
    deps.persistence.jobs.update_status(job.job_id, next).await?;
    tracing::info!(job_id = %job.job_id, stage = ?next, "stage committed");
    Ok(())
}

async fn stage_audio_prep<P: ChatProvider>(
    deps: &PipelineDeps<'_, P>,
    job: &Job,
) -> Result<(), PipelineError> {
    deps.storage.ensure_work_dir(job.job_id).await?;
    let output_path = deps.storage.normalized_wav_path(job.job_id);
    deps.normalizer.normalize(&job.input_uri, &output_path).await?;
    deps.persistence
        .jobs
        .update_uris(job.job_id, Some(&output_path), None, None)
        .await?;
    Ok(())
}

async fn stage_asr<P: ChatProvider>(
    deps: &PipelineDeps<'_, P>,
    job: &Job,
) -> Result<(), PipelineError> {
    let wav_path = job
        .normalized_uri
        .as_deref()
        .ok_or_else(|| PipelineError::Invariant("audio_prep did not persist normalized_uri".into()))?;

    let transcript = deps.asr.transcribe(wav_path).await?;
    if transcript.text.trim().is_empty() {
        return Err(PipelineError::Invariant("ASR returned an empty transcript".into()));
    }

    let asr_path = deps.storage.asr_json_path(job.job_id);
    let body = serde_json::to_vec_pretty(&transcript)?;
    tokio::fs::write(&asr_path, body).await?;

    deps.persistence
        .jobs
        .update_uris(job.job_id, None, Some(&asr_path), None)
        .await?;
    Ok(())
}

async fn read_transcript<P: ChatProvider>(
    deps: &PipelineDeps<'_, P>,
    job: &Job,
) -> Result<AsrTranscript, PipelineError> {
    let asr_path = job
        .asr_json_uri
        .as_deref()
        .ok_or_else(|| PipelineError::Invariant("asr stage did not persist asr_json_uri".into()))?;
    let body = tokio::fs::read(asr_path).await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn stage_segment<P: ChatProvider>(
    deps: &PipelineDeps<'_, P>,
    job: &Job,
) -> Result<(), PipelineError> {
    let transcript = read_transcript(deps, job).await?;
    let shape = SegmentShape::new(job.max_lines, job.max_chars_per_line, job.min_cue_ms, job.max_cue_ms);

    let seg_cues = if transcript.words.is_empty() {
        segment_fallback(&transcript.text)
    } else {
        segment_from_words(&transcript.words, shape)
    };

    let cues: Vec<JobCue> = seg_cues
        .into_iter()
        .enumerate()
        .map(|(i, c)| JobCue::new(job.job_id, (i + 1) as u32, c.start_ms, c.end_ms, c.text))
        .collect();

    deps.persistence.cues.replace_all(job.job_id, &cues).await?;
    Ok(())
}

async fn stage_strategy<P: ChatProvider>(
    deps: &PipelineDeps<'_, P>,
    job: &Job,
) -> Result<(), PipelineError> {
    let transcript = read_transcript(deps, job).await?;
    let risk = risk_level(&transcript.text);
    let routing = &deps.settings.models;

    let (output, run) = match strategist::run(deps.router, routing, job.job_id, risk, &transcript.text).await {
        Ok(v) => v,
        Err(e) => {
            deps.persistence.llm_runs.insert(e.run()).await?;
            return Err(e.into());
        }
    };
    deps.persistence.llm_runs.insert(&run).await?;

    let domain_tags: DomainTags = output.domain_tags;
    deps.persistence
        .jobs
        .update_strategy(
            job.job_id,
            risk,
            output.difficulty_score,
            output.strategist_confidence,
            &output.genre,
            &output.tone,
            &domain_tags,
            output.needs_terminologist,
        )
        .await?;
    Ok(())
}

async fn stage_tm_gating<P: ChatProvider>(
    deps: &PipelineDeps<'_, P>,
    job: &Job,
) -> Result<(), PipelineError> {
    let cues = deps.persistence.cues.list_by_job(job.job_id).await?;
    if cues.is_empty() {
        return Ok(());
    }

    let texts: Vec<String> = cues.iter().map(|c| c.en_text.clone()).collect();
    let embeddings = deps.embedder.embed(&deps.settings.embedding.model, &texts).await?;

    let routing = &deps.settings.models;
    let thresholds = &deps.settings.tm;

    for (mut cue, embedding) in cues.into_iter().zip(embeddings.into_iter()) {
        let result = gate::decide(
            deps.router,
            routing,
            thresholds,
            deps.vector_index,
            job.job_id,
            &cue.en_text,
            &embedding,
        )
        .await?;

        if let Some(judge_run) = &result.judge_run {
            deps.persistence.llm_runs.insert(judge_run).await?;
        }

        match result.outcome {
            gate::GateOutcome::AutoReuse {
                tm_entry_id,
                fa_text,
                confidence,
            } => {
                cue.tm_reused = true;
                cue.tm_entry_id = Some(tm_entry_id);
                cue.tm_confidence = Some(confidence);
                cue.fa_text = Some(fa_text);
                cue.needs_translation = false;
            }
            gate::GateOutcome::NeedsTranslation => {
                cue.tm_reused = false;
                cue.needs_translation = true;
            }
        }

        deps.persistence.cues.upsert(&cue).await?;
    }

    Ok(())
}

/// `needs_terminologist == false` or `difficulty_score < 4` skips the
/// terminologist call entirely (§4.4).
fn should_run_terminologist(job: &Job) -> bool {
    job.needs_terminologist.unwrap_or(false) && job.difficulty_score.unwrap_or(0) >= 4
}

async fn stage_terms<P: ChatProvider>(
    deps: &PipelineDeps<'_, P>,
    job: &Job,
) -> Result<(), PipelineError> {
    if !should_run_terminologist(job) {
        tracing::info!(job_id = %job.job_id, "terminologist skipped");
        return Ok(());
    }

    let transcript = read_transcript(deps, job).await?;
    let routing = &deps.settings.models;
    let difficulty = job.difficulty_score.unwrap_or(5);

    let (output, run) =
        match terminologist::run(deps.router, routing, job.job_id, difficulty, &transcript.text).await {
            Ok(v) => v,
            Err(e) => {
                deps.persistence.llm_runs.insert(e.run()).await?;
                return Err(e.into());
            }
        };
    deps.persistence.llm_runs.insert(&run).await?;

    let terms: Vec<JobGlossaryTerm> = output
        .terms
        .into_iter()
        .map(|t| JobGlossaryTerm {
            term_id: Uuid::new_v4(),
            job_id: job.job_id,
            en_term: t.en_term,
            fa_term: t.fa_term,
            term_type: Some(t.term_type),
            mandatory: t.mandatory,
            confidence: Some(t.confidence),
            notes: t.notes,
        })
        .collect();

    deps.persistence.glossary.replace_all(job.job_id, &terms).await?;
    Ok(())
}

async fn stage_translate<P: ChatProvider>(
    deps: &PipelineDeps<'_, P>,
    job: &Job,
) -> Result<(), PipelineError> {
    let glossary = deps.persistence.glossary.list_by_job(job.job_id).await?;
    let cues = deps.persistence.cues.list_by_job(job.job_id).await?;
    let routing = &deps.settings.models;
    let difficulty = job.difficulty_score.unwrap_or(5);
    let batch_size = deps.settings.batching.translation_batch_size.max(1);

    let pending: Vec<&JobCue> = cues.iter().filter(|c| c.needs_translation).collect();
    let mut translations: HashMap<Uuid, String> = HashMap::new();

    for batch in pending.chunks(batch_size) {
        let inputs: Vec<translator::TranslatorCueInput> = batch
            .iter()
            .map(|c| translator::TranslatorCueInput {
                cue_id: c.cue_id,
                en_text: c.en_text.clone(),
            })
            .collect();

        let (mapped, run) =
            match translator::run(deps.router, routing, job.job_id, difficulty, &glossary, &inputs).await {
                Ok(v) => v,
                Err(e) => {
                    deps.persistence.llm_runs.insert(e.run()).await?;
                    return Err(e.into());
                }
            };
        deps.persistence.llm_runs.insert(&run).await?;

        for (cue_id, fa_text) in mapped {
            if let Ok(id) = cue_id.parse::<Uuid>() {
                translations.insert(id, fa_text);
            }
        }
    }

    for mut cue in cues {
        if let Some(fa_text) = translations.remove(&cue.cue_id) {
            cue.fa_text = Some(fa_text);
            deps.persistence.cues.upsert(&cue).await?;
        }
    }

    Ok(())
}

async fn stage_qa<P: ChatProvider>(
    deps: &PipelineDeps<'_, P>,
    job: &Job,
) -> Result<(), PipelineError> {
    let glossary = deps.persistence.glossary.list_by_job(job.job_id).await?;
    let cues = deps.persistence.cues.list_by_job(job.job_id).await?;
    let routing = &deps.settings.models;
    let difficulty = job.difficulty_score.unwrap_or(5);

    let inputs: Vec<translator::TranslatorCueInput> = cues
        .iter()
        .map(|c| translator::TranslatorCueInput {
            cue_id: c.cue_id,
            en_text: c.en_text.clone(),
        })
        .collect();
    let translations: HashMap<String, String> = cues
        .iter()
        .map(|c| (c.cue_id.to_string(), c.fa_text.clone().unwrap_or_default()))
        .collect();

    let (output, run) =
        match qa::run(deps.router, routing, job.job_id, difficulty, &glossary, &inputs, &translations).await {
            Ok(v) => v,
            Err(e) => {
                deps.persistence.llm_runs.insert(e.run()).await?;
                return Err(e.into());
            }
        };
    deps.persistence.llm_runs.insert(&run).await?;

    for mut cue in cues {
        let key = cue.cue_id.to_string();
        if let Some(polished) = output.polished.get(&key) {
            cue.fa_text_qa = Some(polished.clone());
        }
        if let Some(score) = output.qa_scores.get(&key) {
            cue.qa_score = Some(*score);
        }
        if let Some(issues) = output.issues.get(&key) {
            cue.issues = CueIssues(issues.clone());
        }
        deps.persistence.cues.upsert(&cue).await?;
    }

    Ok(())
}

#[derive(Serialize)]
struct QaReportCue {
    cue_index: u32,
    cue_id: Uuid,
    tm_reused: bool,
    tm_confidence: Option<f32>,
    qa_score: Option<f32>,
    issues: Vec<String>,
}

#[derive(Serialize)]
struct QaReport {
    job_id: Uuid,
    risk_level: Option<farsub_core::RiskLevel>,
    difficulty_score: Option<u8>,
    genre: Option<String>,
    tone: Option<String>,
    domain_tags: Vec<String>,
    cues: Vec<QaReportCue>,
}

async fn stage_finalize<P: ChatProvider>(
    deps: &PipelineDeps<'_, P>,
    job: &Job,
) -> Result<(), PipelineError> {
    let cues = deps.persistence.cues.list_by_job(job.job_id).await?;

    let en_timeline: Vec<TimelineCue> = cues
        .iter()
        .map(|c| TimelineCue {
            index: c.cue_index,
            start_ms: c.start_ms,
            end_ms: c.end_ms,
            text: c.en_text.clone(),
        })
        .collect();
    let fa_timeline: Vec<TimelineCue> = cues
        .iter()
        .map(|c| TimelineCue {
            index: c.cue_index,
            start_ms: c.start_ms,
            end_ms: c.end_ms,
            text: c.final_fa_text().to_string(),
        })
        .collect();

    let en_clamped = clamp_non_overlapping(&en_timeline, MIN_GAP_MS);
    let fa_clamped = clamp_non_overlapping(&fa_timeline, MIN_GAP_MS);

    tokio::fs::write(deps.storage.en_srt_path(job.job_id), build_srt(&en_clamped)).await?;
    let fa_path = deps.storage.fa_srt_path(job.job_id);
    tokio::fs::write(&fa_path, build_srt(&fa_clamped)).await?;

    let report = QaReport {
        job_id: job.job_id,
        risk_level: job.risk_level,
        difficulty_score: job.difficulty_score,
        genre: job.genre.clone(),
        tone: job.tone.clone(),
        domain_tags: job.domain_tags.clone(),
        cues: cues
            .iter()
            .map(|c| QaReportCue {
                cue_index: c.cue_index,
                cue_id: c.cue_id,
                tm_reused: c.tm_reused,
                tm_confidence: c.tm_confidence,
                qa_score: c.qa_score,
                issues: c.issues.0.clone(),
            })
            .collect(),
    };
    let report_body = serde_json::to_vec_pretty(&report)?;
    tokio::fs::write(deps.storage.qa_report_path(job.job_id), report_body).await?;

    deps.persistence
        .jobs
        .update_uris(job.job_id, None, None, Some(&fa_path))
        .await?;
    Ok(())
}

#[derive(Serialize)]
struct LibrarianReport {
    stored_tm_entries: usize,
}

async fn stage_librarian<P: ChatProvider>(
    deps: &PipelineDeps<'_, P>,
    job: &Job,
) -> Result<(), PipelineError> {
    let cues = deps.persistence.cues.list_by_job(job.job_id).await?;
    let mut stored = 0usize;

    for cue in &cues {
        if !librarian_should_store(cue.qa_score, &cue.issues) {
            continue;
        }

        let fa_text = cue.final_fa_text().to_string();
        if cue.en_text.trim().is_empty() || fa_text.trim().is_empty() {
            continue;
        }

        let now = job.updated_at;
        let entry = TmEntry {
            tm_entry_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            source_lang: job.source_lang.clone(),
            target_lang: job.target_lang.clone(),
            en_text: cue.en_text.clone(),
            fa_text: fa_text.clone(),
            version: 1,
            quality_grade: QualityGrade::Trusted,
            qa_score: cue.qa_score,
            confidence: Some(90),
            en_hash: en_hash(&cue.en_text),
            domain_tags: job.domain_tags.clone(),
        };

        let stored_id = deps.persistence.tm_entries.insert_if_new(&entry).await?;
        if stored_id == entry.tm_entry_id {
            let embedding = deps
                .embedder
                .embed(&deps.settings.embedding.model, &[cue.en_text.clone()])
                .await?;
            if let Some(vector) = embedding.into_iter().next() {
                deps.vector_index
                    .upsert(stored_id, &vector, &cue.en_text, &fa_text)
                    .await?;
            }
            stored += 1;
        }
    }

    let report = LibrarianReport { stored_tm_entries: stored };
    let body = serde_json::to_vec_pretty(&report)?;
    tokio::fs::write(deps.storage.librarian_report_path(job.job_id), body).await?;
    Ok(())
}
