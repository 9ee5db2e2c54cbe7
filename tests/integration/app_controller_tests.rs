/*!
 * Integration tests for the application controller
 */

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use edudiff::app_config::{Config, GenerationProvider};
use edudiff::app_controller::Controller;
use edudiff::generation::LlmGenerator;
use edudiff::pipeline::VideoPipeline;
use edudiff::providers::mock::MockProvider;

use crate::common::stubs::{FailingRenderer, WavSynthesizer};
use crate::common::{create_temp_dir, create_test_file, TWO_EVENT_SCENE};

fn mock_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.provider = GenerationProvider::Mock;
    config.output_dir = root.join("videos");
    config.work_dir = root.join("work");
    config
}

#[test]
fn test_controller_withInvalidConfig_shouldRefuseToStart() {
    let mut config = Config::default();
    config.provider = GenerationProvider::Anthropic;
    config.active_provider_config_mut().api_key.clear();

    assert!(Controller::with_config(config).is_err());
}

#[test]
fn test_default_injection_output_shouldSitNextToInput() {
    let output = Controller::default_injection_output(Path::new("/tmp/scenes/tangent.py"));
    assert_eq!(output, PathBuf::from("/tmp/scenes/tangent_narrated.py"));
}

#[tokio::test]
async fn test_inject_file_withSilentNarration_shouldWriteUnchangedScript() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let controller = Controller::with_config(mock_config(temp_dir.path()))?;
    let script = create_test_file(temp_dir.path(), "tangent.py", TWO_EVENT_SCENE)?;
    let narration = create_test_file(
        temp_dir.path(),
        "narration.json",
        r#"{"title": "Quiet", "segments": [{"start_after_animation": 0, "text": "  "}]}"#,
    )?;

    let (output, report) = controller
        .inject_file(&script, &narration, &temp_dir.path().join("audio"), None)
        .await?;

    assert_eq!(output, temp_dir.path().join("tangent_narrated.py"));
    assert_eq!(std::fs::read_to_string(&output)?, TWO_EVENT_SCENE);
    assert!(report.plan.is_empty());
    assert_eq!(report.timeline.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_inject_file_withMalformedNarration_shouldFail() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let controller = Controller::with_config(mock_config(temp_dir.path()))?;
    let script = create_test_file(temp_dir.path(), "tangent.py", TWO_EVENT_SCENE)?;
    let narration = create_test_file(temp_dir.path(), "narration.json", "[1, 2")?;
    let output = temp_dir.path().join("out.py");

    let result = controller
        .inject_file(&script, &narration, &temp_dir.path().join("audio"), Some(output.clone()))
        .await;

    assert!(result.is_err());
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_run_with_pipeline_withNoQuestions_shouldFail() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let controller = Controller::with_config(mock_config(temp_dir.path()))?;
    let pipeline = controller.create_pipeline();

    assert!(controller.run_with_pipeline(&pipeline, &[]).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_run_with_pipeline_withFailingRender_shouldReportFailedQuestion() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let config = mock_config(temp_dir.path());
    let controller = Controller::with_config(config.clone())?;

    let generator = Arc::new(LlmGenerator::new(Arc::new(MockProvider::working()), config.generation.clone()));
    let pipeline = VideoPipeline::new(
        generator.clone(),
        generator.clone(),
        generator,
        Arc::new(WavSynthesizer::new(1.0)),
        Arc::new(FailingRenderer),
    )
    .with_output_dir(config.output_dir.clone())
    .with_work_dir(config.work_dir.clone());

    let err = controller
        .run_with_pipeline(&pipeline, &["What is a limit?".to_string()])
        .await
        .unwrap_err();

    assert!(err.to_string().contains("1 question(s) failed"));
    Ok(())
}
