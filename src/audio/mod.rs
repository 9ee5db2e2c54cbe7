/*!
 * Narration audio: speech synthesis and clip measurement.
 *
 * - `duration`: reads a clip's playable length
 * - `tts`: command-line speech synthesizer
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::errors::SynthesisError;

pub mod duration;
pub mod tts;

pub use duration::resolve_duration;
pub use tts::CommandSynthesizer;

/// Turns narration text into a playable audio file
///
/// Implementations write the clip into `output_dir` and return its path.
#[async_trait]
pub trait AudioSynthesizer: Send + Sync + Debug {
    /// Synthesize `text` into a new file inside `output_dir`
    async fn synthesize(&self, text: &str, output_dir: &Path) -> Result<PathBuf, SynthesisError>;
}
