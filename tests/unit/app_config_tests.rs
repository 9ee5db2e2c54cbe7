/*!
 * Tests for application configuration
 */

use std::str::FromStr;

use edudiff::app_config::{Config, GenerationProvider, LogLevel};
use edudiff::render::RenderQuality;

use crate::common::{create_temp_dir, create_test_file};

#[test]
fn test_default_config_shouldMatchDocumentedDefaults() {
    let config = Config::default();

    assert_eq!(config.provider, GenerationProvider::Ollama);
    assert_eq!(config.audio.command, "espeak-ng");
    assert_eq!(config.audio.rate, 160);
    assert_eq!(config.render.command, vec!["manim".to_string()]);
    assert_eq!(config.render.quality, RenderQuality::Low);
    assert_eq!(config.render.timeout_secs, 300);
    assert_eq!(config.generation.script_temperature, 0.2);
    assert_eq!(config.generation.narration_temperature, 0.3);
    assert_eq!(config.generation.tutor_temperature, 0.35);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_json_shouldFillDefaults() {
    let config: Config = serde_json::from_str(r#"{"provider": "mock", "render": {"quality": "high"}}"#).unwrap();

    assert_eq!(config.provider, GenerationProvider::Mock);
    assert_eq!(config.render.quality, RenderQuality::High);
    assert_eq!(config.render.timeout_secs, 300);
    assert_eq!(config.concurrent_jobs, 2);
}

#[test]
fn test_validate_withAnthropicWithoutKey_shouldFail() {
    let mut config = Config::default();
    config.provider = GenerationProvider::Anthropic;
    assert!(config.validate().is_err());

    config.active_provider_config_mut().api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withZeroLimits_shouldFail() {
    let mut config = Config::default();
    config.concurrent_jobs = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.render.timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.render.command.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_active_provider_config_mut_withMissingEntry_shouldCreateIt() {
    let mut config = Config::default();
    config.available_providers.clear();
    config.active_provider_config_mut().model = "qwen2.5".to_string();

    assert_eq!(config.get_model(), "qwen2.5");
    assert_eq!(config.available_providers.len(), 1);
}

#[test]
fn test_get_endpoint_withEmptyEntry_shouldFallBackToDefault() {
    let mut config = Config::default();
    config.active_provider_config_mut().endpoint.clear();
    assert_eq!(config.get_endpoint(), "http://localhost:11434");
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.render.command, config.render.command);
}

#[test]
fn test_load_or_create_withInvalidJson_shouldFail() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(dir.path(), "conf.json", "{ not json").unwrap();

    assert!(Config::load_or_create(&path).is_err());
}

#[test]
fn test_provider_and_quality_fromStr_shouldAcceptNames() {
    assert_eq!(GenerationProvider::from_str("Anthropic").unwrap(), GenerationProvider::Anthropic);
    assert!(GenerationProvider::from_str("openai").is_err());
    assert_eq!(RenderQuality::from_str("k").unwrap(), RenderQuality::Ultra);
    assert_eq!(RenderQuality::from_str("medium").unwrap().directory(), "720p30");
}
