use log::{debug, error};

use crate::errors::InjectionError;
use crate::script::cues::PLAYBACK_MARKER;
use crate::script::syntax::check_syntax;

// @module: Post-injection integrity check

/// Count playback cues in script text
pub fn count_playback_cues(script: &str) -> usize {
    script.matches(PLAYBACK_MARKER).count()
}

/// Confirm that the expected number of playback cues landed in the script
/// and that the patched script still parses
///
/// `original` is the script before patching, so cues that were already
/// present are not credited to the injection.
pub fn verify_injection(original: &str, patched: &str, expected: usize) -> Result<(), InjectionError> {
    if expected == 0 {
        return Ok(());
    }

    let found = count_playback_cues(patched).saturating_sub(count_playback_cues(original));
    if found != expected {
        error!(
            "Audio injection verification failed: expected {} '{}' cue(s), found {}",
            expected, PLAYBACK_MARKER, found
        );
        return Err(InjectionError::VerificationFailed { expected, found });
    }

    check_syntax(patched).map_err(InjectionError::PatchedScriptInvalid)?;

    debug!("Verified {} injected playback cue(s)", found);
    Ok(())
}
