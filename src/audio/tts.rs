use async_trait::async_trait;
use log::{debug, error};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use uuid::Uuid;

use crate::app_config::AudioConfig;
use crate::audio::AudioSynthesizer;
use crate::errors::SynthesisError;

// @module: Command-line text-to-speech

/// Speech synthesizer backed by an espeak-compatible command
///
/// Text is fed on stdin and the clip is written as `voice_<uuid>.wav`.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    /// Binary to run (e.g. `espeak-ng`)
    command: String,
    /// Speaking rate in words per minute
    rate: u32,
    /// Optional voice name
    voice: Option<String>,
    /// Upper bound for one synthesis run
    timeout: Duration,
}

impl CommandSynthesizer {
    pub fn new(command: impl Into<String>, rate: u32, voice: Option<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            rate,
            voice,
            timeout,
        }
    }

    pub fn from_config(config: &AudioConfig) -> Self {
        Self::new(
            config.command.clone(),
            config.rate,
            config.voice.clone().filter(|v| !v.is_empty()),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Arguments for one run writing to `output_path`
    pub fn build_args(&self, output_path: &Path) -> Vec<String> {
        let mut args = vec!["-s".to_string(), self.rate.to_string()];
        if let Some(voice) = &self.voice {
            args.push("-v".to_string());
            args.push(voice.clone());
        }
        args.push("-w".to_string());
        args.push(output_path.to_string_lossy().to_string());
        args.push("--stdin".to_string());
        args
    }

    async fn run(&self, text: &str, output_path: &Path) -> Result<std::process::Output, SynthesisError> {
        let mut child = Command::new(&self.command)
            .args(self.build_args(output_path))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SynthesisError::CommandMissing(self.command.clone())
                } else {
                    SynthesisError::Failed(format!("failed to start {}: {}", self.command, e))
                }
            })?;

        let command = &self.command;
        // Stdin is fed inside the timed future; the child is killed on drop
        let finished = async move {
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(text.as_bytes())
                    .await
                    .map_err(|e| SynthesisError::Failed(format!("failed to write text: {}", e)))?;
            }
            child
                .wait_with_output()
                .await
                .map_err(|e| SynthesisError::Failed(format!("failed to wait for {}: {}", command, e)))
        };

        tokio::select! {
            result = finished => result,
            _ = tokio::time::sleep(self.timeout) => {
                Err(SynthesisError::TimedOut(self.timeout.as_secs()))
            }
        }
    }
}

#[async_trait]
impl AudioSynthesizer for CommandSynthesizer {
    async fn synthesize(&self, text: &str, output_dir: &Path) -> Result<PathBuf, SynthesisError> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| SynthesisError::Failed(format!("cannot create {:?}: {}", output_dir, e)))?;

        let output_path = output_dir.join(format!("voice_{}.wav", Uuid::new_v4()));
        let output_path = std::path::absolute(&output_path).unwrap_or(output_path);

        let output = self.run(text, &output_path).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("Speech synthesis failed: {}", stderr.trim());
            return Err(SynthesisError::Failed(format!("{} exited with {}: {}", self.command, output.status, stderr.trim())));
        }

        if !output_path.is_file() {
            return Err(SynthesisError::OutputMissing(output_path));
        }

        debug!("Synthesized {} chars into {:?}", text.len(), output_path);
        Ok(output_path)
    }
}
