use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::render::RenderQuality;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Active language model provider
    #[serde(default)]
    pub provider: GenerationProvider,

    /// Available provider configurations
    #[serde(default = "default_available_providers")]
    pub available_providers: Vec<ProviderConfig>,

    /// Sampling settings for the generation stages
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Speech synthesis settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Renderer settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Where finished videos are moved
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Parent directory for per-job scratch directories
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Maximum questions processed at the same time
    #[serde(default = "default_concurrent_jobs")]
    pub concurrent_jobs: usize,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Language model provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: Anthropic
    Anthropic,
    // @provider: Canned offline responses
    Mock,
}

impl GenerationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::Anthropic => "Anthropic",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }

    // @returns: Whether the provider needs an API key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Anthropic)
    }
}

impl std::fmt::Display for GenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for GenerationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "anthropic" => Ok(Self::Anthropic),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Max tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: GenerationProvider) -> Self {
        let (model, endpoint) = match provider_type {
            GenerationProvider::Ollama => (default_ollama_model(), default_ollama_endpoint()),
            GenerationProvider::Anthropic => (default_anthropic_model(), default_anthropic_endpoint()),
            GenerationProvider::Mock => (String::new(), String::new()),
        };
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model,
            api_key: String::new(),
            endpoint,
            timeout_secs: default_provider_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Sampling temperatures per generation stage
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Worked explanation of the question
    #[serde(default = "default_tutor_temperature")]
    pub tutor_temperature: f32,

    /// Animation script
    #[serde(default = "default_script_temperature")]
    pub script_temperature: f32,

    /// Narration document
    #[serde(default = "default_narration_temperature")]
    pub narration_temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            tutor_temperature: default_tutor_temperature(),
            script_temperature: default_script_temperature(),
            narration_temperature: default_narration_temperature(),
        }
    }
}

/// Speech synthesis configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AudioConfig {
    /// Text-to-speech binary
    #[serde(default = "default_tts_command")]
    pub command: String,

    /// Speaking rate in words per minute
    #[serde(default = "default_tts_rate")]
    pub rate: u32,

    /// Optional voice name
    #[serde(default)]
    pub voice: Option<String>,

    /// Timeout for one clip in seconds
    #[serde(default = "default_tts_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            command: default_tts_command(),
            rate: default_tts_rate(),
            voice: None,
            timeout_secs: default_tts_timeout_secs(),
        }
    }
}

/// Renderer configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RenderConfig {
    /// Renderer program and leading arguments
    #[serde(default = "default_render_command")]
    pub command: Vec<String>,

    /// Quality preset
    #[serde(default)]
    pub quality: RenderQuality,

    /// Timeout for one render in seconds
    #[serde(default = "default_render_timeout_secs")]
    pub timeout_secs: u64,

    /// Extension of the rendered media file
    #[serde(default = "default_media_extension")]
    pub media_extension: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            command: default_render_command(),
            quality: RenderQuality::default(),
            timeout_secs: default_render_timeout_secs(),
            media_extension: default_media_extension(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_available_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(GenerationProvider::Ollama),
        ProviderConfig::new(GenerationProvider::Anthropic),
    ]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("videos")
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_concurrent_jobs() -> usize {
    2
}

fn default_provider_timeout_secs() -> u64 {
    120
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_tutor_temperature() -> f32 {
    0.35
}

fn default_script_temperature() -> f32 {
    0.2
}

fn default_narration_temperature() -> f32 {
    0.3
}

fn default_tts_command() -> String {
    "espeak-ng".to_string()
}

fn default_tts_rate() -> u32 {
    160
}

fn default_tts_timeout_secs() -> u64 {
    60
}

fn default_render_command() -> Vec<String> {
    vec!["manim".to_string()]
}

fn default_render_timeout_secs() -> u64 {
    300
}

fn default_media_extension() -> String {
    "mp4".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

impl Config {
    /// Load configuration from `path`, writing a default file when missing
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.provider.requires_api_key() && self.get_api_key().is_empty() {
            return Err(anyhow!(
                "API key is required for {} provider",
                self.provider.display_name()
            ));
        }

        if self.concurrent_jobs == 0 {
            return Err(anyhow!("concurrent_jobs must be at least 1"));
        }

        if self.audio.command.trim().is_empty() {
            return Err(anyhow!("audio.command must not be empty"));
        }
        if self.audio.timeout_secs == 0 {
            return Err(anyhow!("audio.timeout_secs must be greater than 0"));
        }

        if self.render.command.first().is_none_or(|c| c.trim().is_empty()) {
            return Err(anyhow!("render.command must name a program"));
        }
        if self.render.timeout_secs == 0 {
            return Err(anyhow!("render.timeout_secs must be greater than 0"));
        }
        if self.render.media_extension.trim_start_matches('.').is_empty() {
            return Err(anyhow!("render.media_extension must not be empty"));
        }

        Ok(())
    }

    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration, created on demand
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let index = match self
            .available_providers
            .iter()
            .position(|p| p.provider_type == provider_str)
        {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        // Default fallback based on provider type
        match self.provider {
            GenerationProvider::Ollama => default_ollama_model(),
            GenerationProvider::Anthropic => default_anthropic_model(),
            GenerationProvider::Mock => String::new(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            GenerationProvider::Ollama => default_ollama_endpoint(),
            GenerationProvider::Anthropic => default_anthropic_endpoint(),
            GenerationProvider::Mock => String::new(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|t| *t > 0)
            .unwrap_or_else(default_provider_timeout_secs)
    }

    /// Get the completion token limit for the active provider
    pub fn get_max_tokens(&self) -> u32 {
        self.get_active_provider_config()
            .map(|p| p.max_tokens)
            .filter(|t| *t > 0)
            .unwrap_or_else(default_max_tokens)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            provider: GenerationProvider::default(),
            available_providers: default_available_providers(),
            generation: GenerationConfig::default(),
            audio: AudioConfig::default(),
            render: RenderConfig::default(),
            output_dir: default_output_dir(),
            work_dir: default_work_dir(),
            concurrent_jobs: default_concurrent_jobs(),
            log_level: LogLevel::default(),
        }
    }
}
