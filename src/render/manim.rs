use async_trait::async_trait;
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::app_config::RenderConfig;
use crate::errors::RenderError;
use crate::render::{RenderQuality, RenderRequest, Renderer};

// @module: External scene renderer

/// Lines of renderer output kept in error messages
const OUTPUT_TAIL_LINES: usize = 40;

/// Terminal color and cursor sequences emitted by the renderer's rich console
static ANSI_ESCAPES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("valid ANSI escape pattern"));

/// Renderer that shells out to the Manim command-line tool
#[derive(Debug, Clone)]
pub struct ManimRenderer {
    /// Program followed by leading arguments, e.g. `["manim"]` or
    /// `["python3", "-m", "manim"]`
    command: Vec<String>,
    quality: RenderQuality,
    timeout: Duration,
}

impl ManimRenderer {
    pub fn new(command: Vec<String>, quality: RenderQuality, timeout: Duration) -> Self {
        Self {
            command,
            quality,
            timeout,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(
            config.command.clone(),
            config.quality,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn program(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or("manim")
    }

    /// Arguments after the program name
    pub fn build_args(&self, request: &RenderRequest) -> Vec<String> {
        let mut args: Vec<String> = self.command.iter().skip(1).cloned().collect();
        args.extend([
            "render".to_string(),
            format!("-q{}", self.quality.flag()),
            "--format".to_string(),
            "mp4".to_string(),
            "--media_dir".to_string(),
            request.media_dir.to_string_lossy().to_string(),
            request.script_path.to_string_lossy().to_string(),
            request.scene_name.clone(),
        ]);
        args
    }

    /// Keep only the end of a long renderer log, without terminal escapes
    fn output_tail(output: &str) -> String {
        let plain = ANSI_ESCAPES.replace_all(output, "");
        let lines: Vec<&str> = plain.trim().lines().map(str::trim_end).collect();
        let start = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
        lines[start..].join("\n")
    }

    async fn discard_partial_output(media_dir: &Path) {
        if media_dir.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(media_dir).await {
                warn!("Failed to discard partial render output {:?}: {}", media_dir, e);
            }
        }
    }
}

#[async_trait]
impl Renderer for ManimRenderer {
    fn quality(&self) -> RenderQuality {
        self.quality
    }

    async fn render(&self, request: &RenderRequest) -> Result<(), RenderError> {
        tokio::fs::create_dir_all(&request.media_dir)
            .await
            .map_err(|e| RenderError::Io(format!("cannot create {:?}: {}", request.media_dir, e)))?;

        let args = self.build_args(request);
        info!("Running command: {} {}", self.program(), args.join(" "));

        let mut command = Command::new(self.program());
        command
            .args(&args)
            .current_dir(&request.work_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        // The child is killed when the losing output future is dropped
        let finished = tokio::select! {
            result = command.output() => Some(result),
            _ = tokio::time::sleep(self.timeout) => None,
        };
        let Some(result) = finished else {
            error!("Render timed out after {} seconds", self.timeout.as_secs());
            Self::discard_partial_output(&request.media_dir).await;
            return Err(RenderError::TimedOut(self.timeout.as_secs()));
        };

        let output = match result {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                error!("Render command '{}' not found. Ensure it is installed and in PATH.", self.program());
                return Err(RenderError::RendererMissing(self.program().to_string()));
            }
            Err(e) => return Err(RenderError::Io(format!("failed to run {}: {}", self.program(), e))),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let message = if !stderr.trim().is_empty() {
                Self::output_tail(&stderr)
            } else if !stdout.trim().is_empty() {
                Self::output_tail(&stdout)
            } else {
                "Unknown error during animation rendering".to_string()
            };
            error!("Render failed ({}): {}", output.status, message);
            Self::discard_partial_output(&request.media_dir).await;
            return Err(RenderError::ProcessFailed {
                status: output.status.to_string(),
                output: message,
            });
        }

        debug!("Render finished for scene {}", request.scene_name);
        Ok(())
    }
}
