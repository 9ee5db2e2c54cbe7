/*!
 * End-to-end video generation.
 *
 * One question flows through the stages strictly in order:
 * explanation → concept → script → narration → speech → injection →
 * render → locate → publish. Each invocation works inside its own scratch
 * directory under the configured work directory, so concurrent jobs never
 * share audio, scripts or media trees. The scratch directory is removed when
 * the job finishes, whether it succeeded or not.
 */

use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::app_config::Config;
use crate::audio::{AudioSynthesizer, CommandSynthesizer};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::generation::{build_concept, ExplanationSteps, LlmGenerator, NarrationGenerator, ScriptGenerator, TutorGenerator};
use crate::narration::NarrationSegment;
use crate::providers::Provider;
use crate::render::{ArtifactLocator, ManimRenderer, RenderRequest, Renderer};
use crate::script::{discover_scene_name, inject_audio};

/// File name of the patched script inside the scratch directory
pub const SCENE_FILE_NAME: &str = "scene.py";

/// Prefix of per-job scratch directories
pub const SCRATCH_PREFIX: &str = "scene_";

/// Result of one successful generation
#[derive(Debug, Clone)]
pub struct VideoOutcome {
    /// Identifier of the job, also the published file's stem
    pub job_id: String,
    /// Published video
    pub video_path: PathBuf,
    /// Scene class that was rendered
    pub scene_name: String,
    /// Narration title
    pub title: String,
    /// Worked explanation of the question
    pub explanation: String,
    /// Patched script that was rendered
    pub script: String,
    /// Number of audio cues injected
    pub cue_count: usize,
}

/// The collaborators and settings a pipeline runs with
#[derive(Debug, Clone)]
pub struct VideoPipeline {
    tutor: Arc<dyn TutorGenerator>,
    script_generator: Arc<dyn ScriptGenerator>,
    narrator: Arc<dyn NarrationGenerator>,
    synthesizer: Arc<dyn AudioSynthesizer>,
    renderer: Arc<dyn Renderer>,
    locator: ArtifactLocator,
    output_dir: PathBuf,
    work_dir: PathBuf,
    concurrent_jobs: usize,
}

impl VideoPipeline {
    /// Assemble a pipeline from explicit collaborators
    pub fn new(
        tutor: Arc<dyn TutorGenerator>,
        script_generator: Arc<dyn ScriptGenerator>,
        narrator: Arc<dyn NarrationGenerator>,
        synthesizer: Arc<dyn AudioSynthesizer>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            tutor,
            script_generator,
            narrator,
            synthesizer,
            renderer,
            locator: ArtifactLocator::default(),
            output_dir: PathBuf::from("videos"),
            work_dir: std::env::temp_dir(),
            concurrent_jobs: 1,
        }
    }

    /// Build the standard pipeline: one provider for every generation stage,
    /// command-line speech synthesis and the Manim renderer
    pub fn from_config(config: &Config, provider: Arc<dyn Provider>) -> Self {
        let generator = Arc::new(LlmGenerator::new(provider, config.generation.clone()));
        Self::new(
            generator.clone(),
            generator.clone(),
            generator,
            Arc::new(CommandSynthesizer::from_config(&config.audio)),
            Arc::new(ManimRenderer::from_config(&config.render)),
        )
        .with_locator(ArtifactLocator::new(config.render.media_extension.clone()))
        .with_output_dir(config.output_dir.clone())
        .with_work_dir(config.work_dir.clone())
        .with_concurrent_jobs(config.concurrent_jobs)
    }

    pub fn with_locator(mut self, locator: ArtifactLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn with_concurrent_jobs(mut self, concurrent_jobs: usize) -> Self {
        self.concurrent_jobs = concurrent_jobs.max(1);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Synthesize every voiced segment into `audio_dir`
    ///
    /// Returns segment index → clip path. Unvoiced segments get no entry.
    pub async fn synthesize_segments(
        &self,
        segments: &[NarrationSegment],
        audio_dir: &Path,
    ) -> Result<BTreeMap<usize, PathBuf>, AppError> {
        let mut clips = BTreeMap::new();
        for (index, segment) in segments.iter().enumerate() {
            if !segment.is_voiced() {
                debug!("Segment {} has no text, skipping synthesis", index);
                continue;
            }
            let path = self.synthesizer.synthesize(segment.text.trim(), audio_dir).await?;
            clips.insert(index, path);
        }
        Ok(clips)
    }

    /// Turn one question into a published video
    pub async fn generate(&self, question: &str) -> Result<VideoOutcome, AppError> {
        let job_id = Uuid::new_v4().to_string();
        info!("[{}] Generating video for: {}", job_id, question.trim());

        let explanation = self.tutor.explain(question).await?;
        let steps = ExplanationSteps::from_explanation(&explanation);
        let concept = build_concept(question, &steps);

        let script = self.script_generator.generate_script(&concept).await?;
        let narration = self.narrator.generate_narration(&script).await?;
        info!(
            "[{}] Narration '{}' has {} voiced segment(s)",
            job_id,
            narration.title,
            narration.voiced_count()
        );

        FileManager::ensure_dir(&self.work_dir)?;
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(&self.work_dir)?;
        let scratch_path = std::path::absolute(scratch.path())?;

        let clips = self
            .synthesize_segments(&narration.segments, &scratch_path.join("audio"))
            .await?;

        let report = inject_audio(&script, &narration.segments, &clips)?;

        let script_path = scratch_path.join(SCENE_FILE_NAME);
        FileManager::write_to_file(&script_path, &report.script)?;
        let scene_name = discover_scene_name(&report.script);

        let media_dir = scratch_path.join("media");
        let request = RenderRequest {
            script_path: script_path.clone(),
            scene_name: scene_name.clone(),
            media_dir: media_dir.clone(),
            work_dir: scratch_path.clone(),
        };
        info!("[{}] Rendering scene {}...", job_id, scene_name);
        self.renderer.render(&request).await?;

        let script_stem = script_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let artifact = self
            .locator
            .locate(&media_dir, &script_stem, &scene_name, self.renderer.quality())?;

        let extension = artifact
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "mp4".to_string());
        let video_path = FileManager::generate_output_path(&self.output_dir, &job_id, &extension);
        FileManager::move_file(&artifact, &video_path)?;

        if let Err(e) = scratch.close() {
            warn!("[{}] Failed to remove scratch directory: {}", job_id, e);
        }

        info!("[{}] Video ready: {:?}", job_id, video_path);
        Ok(VideoOutcome {
            job_id,
            video_path,
            scene_name,
            title: narration.title,
            explanation,
            script: report.script,
            cue_count: report.plan.len(),
        })
    }

    /// Generate videos for independent questions concurrently
    ///
    /// At most `concurrent_jobs` run at once. One result per question, in
    /// input order; a failure does not affect the other questions.
    pub async fn generate_batch<F>(&self, questions: &[String], progress_callback: F) -> Vec<Result<VideoOutcome, AppError>>
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        let total = questions.len();
        let finished = AtomicUsize::new(0);
        let finished = &finished;
        let progress_callback = &progress_callback;

        let mut results = stream::iter(questions.iter().enumerate())
            .map(|(index, question)| async move {
                let result = self.generate(question).await;
                if let Err(e) = &result {
                    error!("Question {} failed: {}", index + 1, e);
                }
                let current = finished.fetch_add(1, Ordering::SeqCst) + 1;
                progress_callback(current, total);
                (index, result)
            })
            .buffer_unordered(self.concurrent_jobs)
            .collect::<Vec<_>>()
            .await;

        // Restore input order
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }
}
