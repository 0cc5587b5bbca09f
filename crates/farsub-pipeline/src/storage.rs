//! Filesystem layout under a configurable data root (§6):
//!
//! ```text
//! uploads/{job_id}__{filename}
//! work/{job_id}/normalized.wav
//! work/{job_id}/asr.json
//! outputs/{job_id}__en.srt
//! outputs/{job_id}__fa.srt
//! reports/{job_id}__qa_report.json
//! reports/{job_id}__librarian.json
//! ```

use uuid::Uuid;

/// Replaces path separators in an uploaded filename so it can't escape the
/// upload directory; anything else (spaces, unicode) passes through as-is.
pub fn sanitize_filename(filename: &str) -> String {
    filename.replace(['/', '\\'], "_")
}

#[derive(Debug, Clone)]
pub struct StorageLayout {
    data_root: String,
}

impl StorageLayout {
    pub fn new(data_root: impl Into<String>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    pub fn upload_path(&self, job_id: Uuid, filename: &str) -> String {
        format!(
            "{}/uploads/{}__{}",
            self.data_root,
            job_id,
            sanitize_filename(filename)
        )
    }

    pub fn work_dir(&self, job_id: Uuid) -> String {
        format!("{}/work/{}", self.data_root, job_id)
    }

    pub fn normalized_wav_path(&self, job_id: Uuid) -> String {
        format!("{}/normalized.wav", self.work_dir(job_id))
    }

    pub fn asr_json_path(&self, job_id: Uuid) -> String {
        format!("{}/asr.json", self.work_dir(job_id))
    }

    pub fn en_srt_path(&self, job_id: Uuid) -> String {
        format!("{}/outputs/{}__en.srt", self.data_root, job_id)
    }

    pub fn fa_srt_path(&self, job_id: Uuid) -> String {
        format!("{}/outputs/{}__fa.srt", self.data_root, job_id)
    }

    pub fn qa_report_path(&self, job_id: Uuid) -> String {
        format!("{}/reports/{}__qa_report.json", self.data_root, job_id)
    }

    pub fn librarian_report_path(&self, job_id: Uuid) -> String {
        format!("{}/reports/{}__librarian.json", self.data_root, job_id)
    }

    /// Creates `uploads/`, `work/`, `outputs/`, `reports/` under the data
    /// root if they don't already exist. Call once at startup.
    pub async fn ensure_top_level_dirs(&self) -> std::io::Result<()> {
        for sub in ["uploads", "work", "outputs", "reports"] {
            tokio::fs::create_dir_all(format!("{}/{}", self.data_root, sub)).await?;
        }
        Ok(())
    }

    pub async fn ensure_work_dir(&self, job_id: Uuid) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.work_dir(job_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> StorageLayout {
        StorageLayout::new("/data")
    }

    #[test]
    fn sanitize_filename_strips_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("clip.mp4"), "clip.mp4");
        assert_eq!(sanitize_filename(r"a\b/c"), "a_b_c");
    }

    #[test]
    fn paths_follow_the_documented_layout() {
        let job_id = Uuid::nil();
        let l = layout();
        assert_eq!(
            l.upload_path(job_id, "clip.mp4"),
            format!("/data/uploads/{job_id}__clip.mp4")
        );
        assert_eq!(
            l.normalized_wav_path(job_id),
            format!("/data/work/{job_id}/normalized.wav")
        );
        assert_eq!(
            l.asr_json_path(job_id),
            format!("/data/work/{job_id}/asr.json")
        );
        assert_eq!(
            l.en_srt_path(job_id),
            format!("/data/outputs/{job_id}__en.srt")
        );
        assert_eq!(
            l.fa_srt_path(job_id),
            format!("/data/outputs/{job_id}__fa.srt")
        );
        assert_eq!(
            l.qa_report_path(job_id),
            format!("/data/reports/{job_id}__qa_report.json")
        );
        assert_eq!(
            l.librarian_report_path(job_id),
            format!("/data/reports/{job_id}__librarian.json")
        );
    }
}
