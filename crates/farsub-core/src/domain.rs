//! Entities from the data model: `Job`, `JobCue`, `JobGlossaryTerm`,
//! `TmEntry`, `LlmRun`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stage machine on `Job.status`. Advances strictly in declaration order;
/// `Terms` is skipped (not visited) when the strategist's
/// `needs_terminologist` is false or `difficulty_score < 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Uploaded,
    AudioPrep,
    Asr,
    Segment,
    Strategy,
    TmGating,
    Terms,
    Translate,
    Qa,
    Finalize,
    Librarian,
    Done,
    Failed,
}

impl JobStatus {
    /// The stage that directly follows `self` in the happy path, ignoring
    /// the conditional skip of `Terms` (the orchestrator decides that skip,
    /// not the enum).
    pub fn next(self) -> Option<JobStatus> {
        use JobStatus::*;
        match self {
            Uploaded => Some(AudioPrep),
            AudioPrep => Some(Asr),
            Asr => Some(Segment),
            Segment => Some(Strategy),
            Strategy => Some(TmGating),
            TmGating => Some(Terms),
            Terms => Some(Translate),
            Translate => Some(Qa),
            Qa => Some(Finalize),
            Finalize => Some(Librarian),
            Librarian => Some(Done),
            Done | Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Ordered list of free-form domain labels (e.g. `["gaming", "hardware"]`).
pub type DomainTags = Vec<String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub source_lang: String,
    pub target_lang: String,
    pub status: JobStatus,
    pub input_uri: String,
    pub normalized_uri: Option<String>,
    pub asr_json_uri: Option<String>,
    pub final_srt_uri: Option<String>,

    pub max_lines: u32,
    pub max_chars_per_line: u32,
    pub target_cps: f32,
    pub min_cue_ms: i64,
    pub max_cue_ms: i64,

    pub risk_level: Option<RiskLevel>,
    pub difficulty_score: Option<u8>,
    pub strategist_confidence: Option<u8>,
    pub genre: Option<String>,
    pub tone: Option<String>,
    pub domain_tags: DomainTags,
    /// Strategist's verdict on whether the job needs the TERMS stage.
    /// Persisted alongside the rest of the strategy output so a rerun after
    /// a restart can re-derive the same skip/don't-skip decision without
    /// re-consulting the Strategist.
    pub needs_terminologist: Option<bool>,
}

impl Job {
    pub fn new(job_id: Uuid, input_uri: String, now: DateTime<Utc>) -> Self {
        Self {
            job_id,
            created_at: now,
            updated_at: now,
            source_lang: "en".to_string(),
            target_lang: "fa".to_string(),
            status: JobStatus::Uploaded,
            input_uri,
            normalized_uri: None,
            asr_json_uri: None,
            final_srt_uri: None,
            max_lines: 2,
            max_chars_per_line: 42,
            target_cps: 15.0,
            min_cue_ms: 900,
            max_cue_ms: 6500,
            risk_level: None,
            difficulty_score: None,
            strategist_confidence: None,
            genre: None,
            tone: None,
            domain_tags: Vec::new(),
            needs_terminologist: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CueIssues(pub Vec<String>);

impl CueIssues {
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCue {
    pub cue_id: Uuid,
    pub job_id: Uuid,
    pub cue_index: u32,
    pub start_ms: i64,
    pub end_ms: i64,
    pub en_text: String,
    pub fa_text: Option<String>,
    pub fa_text_qa: Option<String>,
    pub tm_reused: bool,
    pub tm_entry_id: Option<Uuid>,
    pub needs_translation: bool,
    pub tm_confidence: Option<f32>,
    pub qa_score: Option<f32>,
    pub issues: CueIssues,
}

impl JobCue {
    pub fn new(job_id: Uuid, cue_index: u32, start_ms: i64, end_ms: i64, en_text: String) -> Self {
        Self {
            cue_id: Uuid::new_v4(),
            job_id,
            cue_index,
            start_ms,
            end_ms,
            en_text,
            fa_text: None,
            fa_text_qa: None,
            tm_reused: false,
            tm_entry_id: None,
            needs_translation: true,
            tm_confidence: None,
            qa_score: None,
            issues: CueIssues::default(),
        }
    }

    /// The Persian text that should ship in the final subtitle: QA-polished
    /// if present, else the raw translation, else empty.
    pub fn final_fa_text(&self) -> &str {
        self.fa_text_qa
            .as_deref()
            .or(self.fa_text.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermType {
    Jargon,
    Product,
    Acronym,
    Name,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobGlossaryTerm {
    pub term_id: Uuid,
    pub job_id: Uuid,
    pub en_term: String,
    pub fa_term: String,
    pub term_type: Option<TermType>,
    pub mandatory: bool,
    pub confidence: Option<u8>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityGrade {
    Candidate,
    Trusted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmEntry {
    pub tm_entry_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub source_lang: String,
    pub target_lang: String,
    pub en_text: String,
    pub fa_text: String,
    pub version: u32,
    pub quality_grade: QualityGrade,
    pub qa_score: Option<f32>,
    pub confidence: Option<u8>,
    pub en_hash: String,
    pub domain_tags: DomainTags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmRunStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRun {
    pub run_id: Uuid,
    pub job_id: Option<Uuid>,
    pub cue_id: Option<Uuid>,
    pub agent_name: String,
    pub model: String,
    pub provider: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub status: LlmRunStatus,
    pub error_message: Option<String>,
    pub input_sha: String,
    pub output_sha: Option<String>,
    pub meta: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order_is_linear_and_terminates() {
        let mut stage = JobStatus::Uploaded;
        let mut hops = 0;
        while let Some(next) = stage.next() {
            stage = next;
            hops += 1;
            assert!(hops < 20, "stage machine did not terminate");
        }
        assert_eq!(stage, JobStatus::Done);
    }

    #[test]
    fn final_fa_text_prefers_qa_polish() {
        let mut cue = JobCue::new(Uuid::new_v4(), 1, 0, 1000, "Hello".into());
        assert_eq!(cue.final_fa_text(), "");
        cue.fa_text = Some("سلام".into());
        assert_eq!(cue.final_fa_text(), "سلام");
        cue.fa_text_qa = Some("سلام قشنگ".into());
        assert_eq!(cue.final_fa_text(), "سلام قشنگ");
    }

    #[test]
    fn cue_issues_contains() {
        let issues = CueIssues(vec!["meaning_drift".to_string()]);
        assert!(issues.contains("meaning_drift"));
        assert!(!issues.contains("numbers_mismatch"));
    }
}
