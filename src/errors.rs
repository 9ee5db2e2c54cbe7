/*!
 * Error types for the edudiff application.
 *
 * This module contains custom error types for the different stages of the
 * narrated-animation pipeline, using the thiserror crate for ergonomic error
 * definitions. Engine errors are split by severity:
 * - `InjectionError`: fatal, structural problems with the generated script
 * - `DurationError`: recoverable, the caller substitutes a fallback wait time
 * - `RenderError` / `SynthesisError`: environment problems (external tools)
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors raised while reading a narration document
#[derive(Error, Debug)]
pub enum NarrationError {
    /// The document is not valid narration JSON
    #[error("Narration document is not valid JSON: {reason}")]
    Malformed {
        /// Parser message
        reason: String,
        /// The raw content that failed to parse
        content: String,
    },
}

/// Errors raised by the text generators (tutor, script, narration)
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error with the generated narration document
    #[error("Narration error: {0}")]
    Narration(#[from] NarrationError),

    /// The input handed to a generator was unusable
    #[error("Invalid generator input: {0}")]
    InvalidInput(String),

    /// The model returned nothing usable
    #[error("Generator returned empty {0}")]
    EmptyOutput(&'static str),
}

/// Fatal errors from the script synchronization engine
///
/// Any of these aborts the pipeline; no partially patched script is returned.
#[derive(Error, Debug)]
pub enum InjectionError {
    /// The generated script does not parse
    #[error("Generated script is syntactically invalid: {0}")]
    InvalidScript(String),

    /// The script has no `construct` routine
    #[error("Generated script has no 'construct' method")]
    MissingConstruct,

    /// A narration segment needs an anchor but the timeline is empty
    #[error(
        "Narration segment {segment_index} needs an anchor, but construct() contains no self.play/self.add calls ({pending} segment(s) pending)"
    )]
    NoAnimationAnchors {
        /// Index of the first segment that could not be anchored
        segment_index: usize,
        /// Number of segments that carried audio
        pending: usize,
    },

    /// The anchor statement shares its line with the `construct` header,
    /// so no line can be placed after it inside the method
    #[error(
        "Narration segment {segment_index} is anchored to line {line}, where construct()'s body is written on the def line; cues cannot be inserted there"
    )]
    InlineConstructBody {
        /// Index of the segment that needed the anchor
        segment_index: usize,
        /// 1-based line of the inline body
        line: usize,
    },

    /// An insertion anchor points past the end of the script
    #[error("Insertion anchor line {anchor} is outside the script ({line_count} lines)")]
    AnchorOutOfRange {
        /// The 1-based line after which lines were to be inserted
        anchor: usize,
        /// Number of lines in the script
        line_count: usize,
    },

    /// The patched script does not contain the expected playback cues
    #[error("Audio injection verification failed: expected {expected} playback cue(s), found {found}")]
    VerificationFailed {
        /// Number of cues that should have been inserted
        expected: usize,
        /// Number of cues actually present
        found: usize,
    },

    /// The patched script no longer parses
    #[error("Patched script is syntactically invalid: {0}")]
    PatchedScriptInvalid(String),
}

/// Recoverable error reading a clip's duration
#[derive(Error, Debug)]
#[error("Failed to read duration of {path:?}: {reason}")]
pub struct DurationError {
    /// The clip that could not be measured
    pub path: PathBuf,
    /// Underlying I/O or format message
    pub reason: String,
}

/// Errors raised by the speech synthesizer
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The synthesizer binary is not installed
    #[error("Speech synthesizer '{0}' not found. Ensure it is installed and on PATH")]
    CommandMissing(String),

    /// The synthesizer exited with an error
    #[error("Speech synthesis failed: {0}")]
    Failed(String),

    /// The synthesizer did not finish in time
    #[error("Speech synthesis timed out after {0} seconds")]
    TimedOut(u64),

    /// The synthesizer reported success but wrote nothing
    #[error("Speech synthesis produced no file at {0:?}")]
    OutputMissing(PathBuf),
}

/// Errors raised by the external renderer and the artifact locator
#[derive(Error, Debug)]
pub enum RenderError {
    /// The renderer binary is not installed
    #[error("Renderer command '{0}' not found. Ensure it is installed and on PATH")]
    RendererMissing(String),

    /// The renderer exited with a non-zero status
    #[error("Render failed ({status}): {output}")]
    ProcessFailed {
        /// Exit status description
        status: String,
        /// Captured stderr, or stdout when stderr was empty
        output: String,
    },

    /// The renderer did not finish in time
    #[error("Render timed out after {0} seconds")]
    TimedOut(u64),

    /// The renderer succeeded but no media file could be found
    #[error("Render artifact missing: no '{fragment}' media file under {root:?}")]
    ArtifactMissing {
        /// Directory that was searched
        root: PathBuf,
        /// Name fragment that was searched for
        fragment: String,
    },

    /// Any other I/O failure around the render step
    #[error("Render I/O error: {0}")]
    Io(String),
}

/// Coarse classification of a failure for user-facing reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The generated content is unusable (bad script, no anchors, bad narration)
    Content,
    /// The request itself was unusable
    Input,
    /// The environment failed (missing tools, timeouts, network, disk)
    Environment,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from a generator
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Error from the injection engine
    #[error("Injection error: {0}")]
    Injection(#[from] InjectionError),

    /// Error from the speech synthesizer
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Error from rendering or locating the video
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Classify the error as a content, input or environment problem
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Injection(_) => ErrorKind::Content,
            Self::Generation(GenerationError::InvalidInput(_)) => ErrorKind::Input,
            Self::Generation(GenerationError::Provider(_)) => ErrorKind::Environment,
            Self::Generation(_) => ErrorKind::Content,
            Self::Provider(_) | Self::Synthesis(_) | Self::Render(_) | Self::File(_) => {
                ErrorKind::Environment
            }
            Self::Unknown(_) => ErrorKind::Environment,
        }
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<NarrationError> for AppError {
    fn from(error: NarrationError) -> Self {
        Self::Generation(GenerationError::Narration(error))
    }
}
