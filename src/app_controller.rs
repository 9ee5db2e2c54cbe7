use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{Config, GenerationProvider};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::narration::NarrationDocument;
use crate::pipeline::{VideoOutcome, VideoPipeline};
use crate::providers::anthropic::Anthropic;
use crate::providers::mock::MockProvider;
use crate::providers::ollama::Ollama;
use crate::providers::Provider;
use crate::script::{inject_audio, InjectionReport};

// @module: Application controller for video generation

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the client for the configured provider
    pub fn create_provider(&self) -> Arc<dyn Provider> {
        let timeout = Duration::from_secs(self.config.get_timeout_secs());
        match self.config.provider {
            GenerationProvider::Ollama => Arc::new(Ollama::new(self.config.get_endpoint(), self.config.get_model(), timeout)),
            GenerationProvider::Anthropic => Arc::new(Anthropic::new(
                self.config.get_api_key(),
                self.config.get_endpoint(),
                self.config.get_model(),
                self.config.get_max_tokens(),
                timeout,
            )),
            GenerationProvider::Mock => Arc::new(MockProvider::working()),
        }
    }

    /// Build the pipeline for this configuration
    pub fn create_pipeline(&self) -> VideoPipeline {
        VideoPipeline::from_config(&self.config, self.create_provider())
    }

    /// Generate one video per question with a progress bar
    ///
    /// Fails when any question failed, after every question has been tried.
    pub async fn run_questions(&self, questions: &[String]) -> Result<Vec<VideoOutcome>> {
        self.run_with_pipeline(&self.create_pipeline(), questions).await
    }

    /// Generate videos with an explicit pipeline
    pub async fn run_with_pipeline(&self, pipeline: &VideoPipeline, questions: &[String]) -> Result<Vec<VideoOutcome>> {
        if questions.is_empty() {
            return Err(anyhow!("At least one question is required"));
        }

        let start_time = std::time::Instant::now();
        FileManager::ensure_dir(pipeline.output_dir())?;

        let progress_bar = ProgressBar::new(questions.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} videos ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.enable_steady_tick(Duration::from_millis(120));

        let pb = progress_bar.clone();
        let results = pipeline
            .generate_batch(questions, move |current, _total| pb.set_position(current as u64))
            .await;
        progress_bar.finish_and_clear();

        let mut outcomes = Vec::new();
        let mut failures = Vec::new();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(outcome) => {
                    info!("Success: {:?} ({} audio cue(s))", outcome.video_path, outcome.cue_count);
                    outcomes.push(outcome);
                }
                Err(e) => {
                    error!("Question {} failed ({}): {}", index + 1, Self::describe_kind(&e), e);
                    failures.push(index + 1);
                }
            }
        }

        info!(
            "Finished {} of {} question(s) in {}",
            outcomes.len(),
            questions.len(),
            Self::format_duration(start_time.elapsed())
        );

        if !failures.is_empty() {
            return Err(anyhow!(
                "{} question(s) failed: {}",
                failures.len(),
                failures.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(", ")
            ));
        }

        Ok(outcomes)
    }

    /// Inject narration into an existing script without rendering
    ///
    /// Voiced segments are synthesized into `audio_dir`. The patched script is
    /// written to `output`, or next to the input as `<stem>_narrated.py`.
    pub async fn inject_file(
        &self,
        script_path: &Path,
        narration_path: &Path,
        audio_dir: &Path,
        output: Option<PathBuf>,
    ) -> Result<(PathBuf, InjectionReport)> {
        let script = FileManager::read_to_string(script_path)?;
        let narration = NarrationDocument::parse(&FileManager::read_to_string(narration_path)?)
            .with_context(|| format!("Invalid narration file: {:?}", narration_path))?;

        if narration.voiced_count() == 0 {
            warn!("Narration has no voiced segments; the script will be unchanged");
        }

        FileManager::ensure_dir(audio_dir)?;
        let pipeline = self.create_pipeline();
        let clips = pipeline
            .synthesize_segments(&narration.segments, audio_dir)
            .await
            .map_err(|e| anyhow!("Speech synthesis failed: {}", e))?;

        let report = inject_audio(&script, &narration.segments, &clips)?;

        let output_path = output.unwrap_or_else(|| Self::default_injection_output(script_path));
        FileManager::write_to_file(&output_path, &report.script)?;
        info!("Success: {:?} ({} audio cue(s))", output_path, report.plan.len());

        Ok((output_path, report))
    }

    /// `<dir>/<stem>_narrated.py` for an input script
    pub fn default_injection_output(script_path: &Path) -> PathBuf {
        let stem = script_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "scene".to_string());
        script_path.with_file_name(format!("{}_narrated.py", stem))
    }

    fn describe_kind(error: &AppError) -> &'static str {
        match error.kind() {
            crate::errors::ErrorKind::Content => "content problem",
            crate::errors::ErrorKind::Input => "invalid input",
            crate::errors::ErrorKind::Environment => "environment problem",
        }
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
