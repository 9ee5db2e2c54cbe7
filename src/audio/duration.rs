use std::path::Path;

use lofty::file::AudioFile;
use log::debug;

use crate::errors::DurationError;

// @module: Clip duration resolution

/// Playable duration of an audio clip in seconds
///
/// Reads the container's stream properties (for PCM WAV: sample count over
/// sample rate). Any I/O or format problem is returned as a
/// [`DurationError`]; callers treat it as recoverable.
pub fn resolve_duration(path: &Path) -> Result<f64, DurationError> {
    let tagged_file = lofty::read_from_path(path).map_err(|e| DurationError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let seconds = tagged_file.properties().duration().as_secs_f64();
    debug!("Clip {:?} lasts {:.3}s", path, seconds);

    Ok(seconds)
}
