//! Concrete `AudioNormalizer`: shells out to `ffmpeg` to produce the 16 kHz
//! mono PCM-WAV file the ASR provider expects. Not DSP of our own — a thin
//! wrapper around an external binary, same boundary shape as the rest of
//! the provider adapters.

use async_trait::async_trait;
use farsub_core::{AudioNormalizer, Error, Result};
use tokio::process::Command;

pub struct FfmpegNormalizer {
    binary: String,
}

impl FfmpegNormalizer {
    pub fn new() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
        }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfmpegNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioNormalizer for FfmpegNormalizer {
    async fn normalize(&self, input_path: &str, output_path: &str) -> Result<()> {
        let output = Command::new(&self.binary)
            .args([
                "-y",
                "-i",
                input_path,
                "-ac",
                "1",
                "-ar",
                "16000",
                "-af",
                "loudnorm",
                output_path,
            ])
            .output()
            .await
            .map_err(|e| Error::Input(format!("failed to spawn ffmpeg: {e}")))?;

        if !output.status.success() {
            return Err(Error::Input(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(())
    }
}
