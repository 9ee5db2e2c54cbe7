/*!
 * Audio cue injection: timeline → durations → plan → patch → verify.
 *
 * Every stage's output is the next stage's precondition, so the stages run
 * strictly in sequence and the first fatal error aborts the whole pass.
 */

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::info;

use crate::errors::InjectionError;
use crate::narration::NarrationSegment;
use crate::script::cues::{plan_insertions, InsertionPlan, ResolvedClip};
use crate::script::patcher::apply_plan;
use crate::script::timeline::{extract_timeline, Timeline};
use crate::script::verifier::verify_injection;

/// Outcome of a successful injection pass
#[derive(Debug, Clone)]
pub struct InjectionReport {
    /// The patched script
    pub script: String,
    /// Animation events found in the original script
    pub timeline: Timeline,
    /// Cues that were inserted, in segment order
    pub plan: InsertionPlan,
}

impl InjectionReport {
    /// Number of cues anchored to a clamped (out-of-range) ordinal
    pub fn clamped_count(&self) -> usize {
        self.plan.iter().filter(|cue| cue.clamped).count()
    }
}

/// Inject playback cues for already-measured clips
pub fn inject_clips(
    script: &str,
    segments: &[NarrationSegment],
    clips: &BTreeMap<usize, ResolvedClip>,
) -> Result<InjectionReport, InjectionError> {
    let timeline = extract_timeline(script)?;
    let plan = plan_insertions(&timeline, segments, clips)?;
    let patched = apply_plan(script, &plan)?;
    verify_injection(script, &patched, plan.len())?;

    info!(
        "Injected {} audio cue(s) across {} animation event(s)",
        plan.len(),
        timeline.len()
    );

    Ok(InjectionReport {
        script: patched,
        timeline,
        plan,
    })
}

/// Inject playback cues for synthesized audio files
///
/// `audio_files` maps narration segment index to its clip. Each clip's
/// duration is read here; unreadable clips fall back to the minimum wait.
pub fn inject_audio(
    script: &str,
    segments: &[NarrationSegment],
    audio_files: &BTreeMap<usize, PathBuf>,
) -> Result<InjectionReport, InjectionError> {
    let clips: BTreeMap<usize, ResolvedClip> = audio_files
        .iter()
        .map(|(&index, path)| (index, ResolvedClip::resolve(path.clone())))
        .collect();

    inject_clips(script, segments, &clips)
}
