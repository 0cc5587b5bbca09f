//! `as_str`/`from_str` pairs for the domain enums stored as `TEXT` columns,
//! following the same convention as the teacher's `AppointmentStatus`.

use farsub_core::{JobStatus, LlmRunStatus, QualityGrade, RiskLevel, TermType};

pub fn job_status_as_str(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Uploaded => "UPLOADED",
        JobStatus::AudioPrep => "AUDIO_PREP",
        JobStatus::Asr => "ASR",
        JobStatus::Segment => "SEGMENT",
        JobStatus::Strategy => "STRATEGY",
        JobStatus::TmGating => "TM_GATING",
        JobStatus::Terms => "TERMS",
        JobStatus::Translate => "TRANSLATE",
        JobStatus::Qa => "QA",
        JobStatus::Finalize => "FINALIZE",
        JobStatus::Librarian => "LIBRARIAN",
        JobStatus::Done => "DONE",
        JobStatus::Failed => "FAILED",
    }
}

pub fn job_status_from_str(s: &str) -> JobStatus {
    match s {
        "AUDIO_PREP" => JobStatus::AudioPrep,
        "ASR" => JobStatus::Asr,
        "SEGMENT" => JobStatus::Segment,
        "STRATEGY" => JobStatus::Strategy,
        "TM_GATING" => JobStatus::TmGating,
        "TERMS" => JobStatus::Terms,
        "TRANSLATE" => JobStatus::Translate,
        "QA" => JobStatus::Qa,
        "FINALIZE" => JobStatus::Finalize,
        "LIBRARIAN" => JobStatus::Librarian,
        "DONE" => JobStatus::Done,
        "FAILED" => JobStatus::Failed,
        _ => JobStatus::Uploaded,
    }
}

pub fn risk_level_as_str(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "low",
        RiskLevel::Medium => "medium",
        RiskLevel::High => "high",
    }
}

pub fn risk_level_from_str(s: &str) -> Option<RiskLevel> {
    match s {
        "low" => Some(RiskLevel::Low),
        "medium" => Some(RiskLevel::Medium),
        "high" => Some(RiskLevel::High),
        _ => None,
    }
}

pub fn term_type_as_str(term_type: TermType) -> &'static str {
    match term_type {
        TermType::Jargon => "jargon",
        TermType::Product => "product",
        TermType::Acronym => "acronym",
        TermType::Name => "name",
        TermType::Other => "other",
    }
}

pub fn term_type_from_str(s: &str) -> Option<TermType> {
    match s {
        "jargon" => Some(TermType::Jargon),
        "product" => Some(TermType::Product),
        "acronym" => Some(TermType::Acronym),
        "name" => Some(TermType::Name),
        "other" => Some(TermType::Other),
        _ => None,
    }
}

pub fn quality_grade_as_str(grade: QualityGrade) -> &'static str {
    match grade {
        QualityGrade::Candidate => "candidate",
        QualityGrade::Trusted => "trusted",
    }
}

pub fn quality_grade_from_str(s: &str) -> QualityGrade {
    match s {
        "trusted" => QualityGrade::Trusted,
        _ => QualityGrade::Candidate,
    }
}

pub fn llm_run_status_as_str(status: LlmRunStatus) -> &'static str {
    match status {
        LlmRunStatus::Success => "success",
        LlmRunStatus::Error => "error",
    }
}

pub fn llm_run_status_from_str(s: &str) -> LlmRunStatus {
    match s {
        "error" => LlmRunStatus::Error,
        _ => LlmRunStatus::Success,
    }
}
