/*!
 * # edudiff - narrated math animation videos
 *
 * A Rust library that turns a math question into a narrated animation video.
 *
 * ## Features
 *
 * - Generate a worked explanation, a Manim scene and a synchronized narration
 *   with a language model:
 *   - Ollama (local LLM)
 *   - Anthropic API
 * - Synthesize narration clips with a command-line TTS engine
 * - Inject audio cues after the right animation calls, verified after patching
 * - Render the scene and locate the produced video
 * - Bounded concurrent batches of independent questions
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `script`: Script synchronization and injection engine:
 *   - `script::timeline`: animation events of the generated scene
 *   - `script::cues`: cue placement and wait times
 *   - `script::patcher`: line-preserving source insertion
 *   - `script::verifier`: post-patch verification
 * - `audio`: clip durations and speech synthesis
 * - `render`: renderer invocation and artifact location
 * - `narration`: narration document model
 * - `generation`: explanation, script and narration generators
 * - `providers`: Client implementations for various LLM providers
 * - `pipeline`: question to published video
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod audio;
pub mod errors;
pub mod file_utils;
pub mod generation;
pub mod narration;
pub mod pipeline;
pub mod providers;
pub mod render;
pub mod script;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ErrorKind, InjectionError, RenderError};
pub use narration::{NarrationDocument, NarrationSegment};
pub use pipeline::{VideoOutcome, VideoPipeline};
pub use script::{extract_timeline, inject_audio, inject_clips, InjectionReport, Timeline};
