// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use edudiff::app_config::{Config, GenerationProvider, LogLevel};
use edudiff::app_controller::Controller;
use edudiff::render::RenderQuality;

/// CLI Wrapper for GenerationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Ollama,
    Anthropic,
    Mock,
}

impl From<CliProvider> for GenerationProvider {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Ollama => GenerationProvider::Ollama,
            CliProvider::Anthropic => GenerationProvider::Anthropic,
            CliProvider::Mock => GenerationProvider::Mock,
        }
    }
}

/// CLI Wrapper for RenderQuality to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliQuality {
    Low,
    Medium,
    High,
    Production,
    Ultra,
}

impl From<CliQuality> for RenderQuality {
    fn from(cli_quality: CliQuality) -> Self {
        match cli_quality {
            CliQuality::Low => RenderQuality::Low,
            CliQuality::Medium => RenderQuality::Medium,
            CliQuality::High => RenderQuality::High,
            CliQuality::Production => RenderQuality::Production,
            CliQuality::Ultra => RenderQuality::Ultra,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// Options shared by every command that loads the configuration
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Language model provider to use
    #[arg(short, long, global = true, value_enum)]
    provider: Option<CliProvider>,

    /// Model name for the provider
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Render quality preset
    #[arg(short, long, global = true, value_enum)]
    quality: Option<CliQuality>,

    /// Directory receiving finished videos
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a narrated video for each question
    Generate {
        /// Questions to explain, one video each
        #[arg(value_name = "QUESTION", required = true)]
        questions: Vec<String>,
    },

    /// Inject narration audio into an existing script without rendering
    Inject {
        /// Scene script to patch
        #[arg(long)]
        script: PathBuf,

        /// Narration JSON document
        #[arg(long)]
        narration: PathBuf,

        /// Directory receiving synthesized clips
        #[arg(long)]
        audio_dir: PathBuf,

        /// Patched script path (defaults to <script>_narrated.py)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions for edudiff
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// edudiff - narrated math animations
///
/// Turns math questions into narrated Manim videos: a language model writes
/// the explanation, the scene and its narration; the narration is spoken,
/// cued into the scene after the right animations, and rendered.
#[derive(Parser, Debug)]
#[command(name = "edudiff")]
#[command(version)]
#[command(about = "Narrated math animation generator")]
#[command(long_about = "edudiff turns math questions into narrated animation videos.

EXAMPLES:
    edudiff generate \"What is the derivative of x^2?\"
    edudiff generate -q high \"Prove (a+b)^2 = a^2 + 2ab + b^2\" \"What is a limit?\"
    edudiff -p anthropic generate \"Explain the unit circle\"
    edudiff inject --script scene.py --narration narration.json --audio-dir audio/
    edudiff completions bash > edudiff.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: llama3.2:3b)
    anthropic - Anthropic Claude API (requires API key)
    mock      - Canned offline responses")]
struct CommandLineOptions {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set via set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "edudiff", &mut std::io::stdout());
            Ok(())
        }
        Commands::Generate { questions } => {
            let controller = Controller::with_config(load_config(&cli.common)?)?;
            let outcomes = controller.run_questions(&questions).await?;
            for outcome in outcomes {
                println!("{}", outcome.video_path.display());
            }
            Ok(())
        }
        Commands::Inject {
            script,
            narration,
            audio_dir,
            output,
        } => {
            let controller = Controller::with_config(load_config(&cli.common)?)?;
            let (path, report) = controller.inject_file(&script, &narration, &audio_dir, output).await?;
            info!("Injected {} cue(s) into {:?}", report.plan.len(), path);
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Load the configuration file and apply command-line overrides
fn load_config(options: &CommonArgs) -> Result<Config> {
    // Apply the command-line level before loading so config warnings respect it
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(LogLevel::from(cmd_log_level.clone()).to_level_filter());
    }

    let mut config = Config::load_or_create(Path::new(&options.config_path))
        .with_context(|| format!("Failed to load configuration from {:?}", options.config_path))?;

    if let Some(provider) = &options.provider {
        config.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.active_provider_config_mut().model = model.clone();
    }
    if let Some(quality) = &options.quality {
        config.render.quality = quality.clone().into();
    }
    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }
    match &options.log_level {
        Some(log_level) => config.log_level = log_level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}
