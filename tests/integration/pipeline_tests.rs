/*!
 * Integration tests for the end-to-end video pipeline
 */

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use edudiff::app_config::GenerationConfig;
use edudiff::errors::{AppError, ErrorKind};
use edudiff::generation::LlmGenerator;
use edudiff::pipeline::{VideoPipeline, SCRATCH_PREFIX};
use edudiff::providers::mock::MockProvider;
use edudiff::providers::{CompletionRequest, Provider};

use crate::common::stubs::{FailingRenderer, FileRenderer, WavSynthesizer};
use crate::common::{create_temp_dir, init_test_logging};

fn pipeline_with(
    provider: MockProvider,
    synthesizer: Arc<WavSynthesizer>,
    renderer: Arc<dyn edudiff::render::Renderer>,
    root: &Path,
) -> VideoPipeline {
    let provider: Arc<dyn Provider> = Arc::new(provider);
    let generator = Arc::new(LlmGenerator::new(provider, GenerationConfig::default()));
    VideoPipeline::new(generator.clone(), generator.clone(), generator, synthesizer, renderer)
        .with_output_dir(root.join("videos"))
        .with_work_dir(root.join("work"))
}

fn leftover_scratch_dirs(work_dir: &Path) -> usize {
    std::fs::read_dir(work_dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.file_name().to_string_lossy().starts_with(SCRATCH_PREFIX))
                .count()
        })
        .unwrap_or(0)
}

fn empty_for_bad_questions(request: &CompletionRequest) -> String {
    if request.prompt.contains("bad") {
        String::new()
    } else {
        MockProvider::canned_response(request)
    }
}

#[tokio::test]
async fn test_generate_withMockCollaborators_shouldPublishNarratedVideo() -> Result<()> {
    init_test_logging();
    let temp_dir = create_temp_dir()?;
    let synthesizer = Arc::new(WavSynthesizer::new(1.0));
    let renderer = Arc::new(FileRenderer::default());
    let pipeline = pipeline_with(MockProvider::working(), synthesizer.clone(), renderer.clone(), temp_dir.path());

    let outcome = pipeline.generate("Why is (a + b)^2 bigger than a^2 + b^2?").await?;

    assert_eq!(outcome.scene_name, "SquareScene");
    assert_eq!(outcome.title, "Growing a square");
    assert_eq!(outcome.cue_count, 2);
    assert!(outcome.video_path.is_file());
    assert_eq!(outcome.video_path.parent(), Some(temp_dir.path().join("videos").as_path()));
    assert_eq!(synthesizer.calls(), 2);

    let rendered = renderer.rendered_scripts();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0], outcome.script);
    assert_eq!(rendered[0].matches("self.add_sound(").count(), 2);
    assert_eq!(rendered[0].matches("self.wait(2.00)").count(), 2);

    assert_eq!(leftover_scratch_dirs(&temp_dir.path().join("work")), 0);
    Ok(())
}

#[tokio::test]
async fn test_generate_withFailingRenderer_shouldReportEnvironmentError() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let pipeline = pipeline_with(
        MockProvider::working(),
        Arc::new(WavSynthesizer::new(1.0)),
        Arc::new(FailingRenderer),
        temp_dir.path(),
    );

    let err = pipeline.generate("What is a derivative?").await.unwrap_err();

    assert!(matches!(err, AppError::Render(_)));
    assert_eq!(err.kind(), ErrorKind::Environment);
    assert_eq!(leftover_scratch_dirs(&temp_dir.path().join("work")), 0);
    Ok(())
}

#[tokio::test]
async fn test_generate_withBlankQuestion_shouldFailAsInvalidInput() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let provider = MockProvider::working();
    let pipeline = pipeline_with(
        provider.clone(),
        Arc::new(WavSynthesizer::new(1.0)),
        Arc::new(FileRenderer::default()),
        temp_dir.path(),
    );

    let err = pipeline.generate("   ").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Input);
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_generate_batch_withOneBadQuestion_shouldIsolateFailureAndKeepOrder() -> Result<()> {
    init_test_logging();
    let temp_dir = create_temp_dir()?;
    let provider = MockProvider::working().with_custom_response(empty_for_bad_questions);
    let pipeline = pipeline_with(
        provider,
        Arc::new(WavSynthesizer::new(0.5)),
        Arc::new(FileRenderer::default()),
        temp_dir.path(),
    )
    .with_concurrent_jobs(2);

    let questions = vec![
        "first question".to_string(),
        "bad question".to_string(),
        "third question".to_string(),
    ];
    let calls = std::sync::atomic::AtomicUsize::new(0);
    let results = pipeline
        .generate_batch(&questions, |_, total| {
            assert_eq!(total, 3);
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        })
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);
    assert!(results[0].is_ok());
    assert_eq!(results[1].as_ref().unwrap_err().kind(), ErrorKind::Content);
    assert!(results[2].is_ok());

    let first = results[0].as_ref().unwrap();
    let third = results[2].as_ref().unwrap();
    assert_ne!(first.video_path, third.video_path);
    assert!(first.video_path.is_file() && third.video_path.is_file());
    Ok(())
}
