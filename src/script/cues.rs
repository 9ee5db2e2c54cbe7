/*!
 * Cue planning: maps narration segments onto the animation timeline.
 *
 * Each voiced segment becomes one cue, a playback line followed by a wait
 * line, anchored after the animation event the segment refers to.
 */

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, error, warn};

use crate::audio::duration::resolve_duration;
use crate::errors::{DurationError, InjectionError};
use crate::narration::NarrationSegment;
use crate::script::timeline::Timeline;

/// Substring that identifies an injected playback line
pub const PLAYBACK_MARKER: &str = "self.add_sound(";

/// Substring that identifies an injected wait line
pub const WAIT_MARKER: &str = "self.wait(";

/// Silence added after each clip
pub const WAIT_PADDING_SECS: f64 = 0.5;

/// Shortest wait ever emitted, also used when a clip cannot be measured
pub const MIN_WAIT_SECS: f64 = 2.0;

/// A synthesized clip with its measured duration
#[derive(Debug)]
pub struct ResolvedClip {
    /// Path embedded in the playback line
    pub path: PathBuf,
    /// Duration in seconds, or why it could not be read
    pub duration: Result<f64, DurationError>,
}

impl ResolvedClip {
    /// Measure a clip on disk
    pub fn resolve(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let duration = resolve_duration(&path);
        Self { path, duration }
    }

    /// Clip with a known duration
    pub fn with_duration(path: impl Into<PathBuf>, seconds: f64) -> Self {
        Self {
            path: path.into(),
            duration: Ok(seconds),
        }
    }
}

/// One planned insertion: lines to place after an anchor line
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCue {
    /// Index of the narration segment this cue voices
    pub segment_index: usize,
    /// 1-based script line after which the lines go
    pub anchor_line: usize,
    /// Generated lines, without line terminators
    pub lines: Vec<String>,
    /// Seconds the scene waits for the clip
    pub wait_secs: f64,
    /// Whether the segment's ordinal was out of range and clamped
    pub clamped: bool,
}

/// Ordered cues, in narration-segment order
pub type InsertionPlan = Vec<PlannedCue>;

/// Seconds to wait after starting a clip of the given length
///
/// `None` (unmeasurable clip) yields the floor value.
pub fn wait_seconds(duration: Option<f64>) -> f64 {
    match duration {
        Some(secs) if secs.is_finite() => (secs + WAIT_PADDING_SECS).max(MIN_WAIT_SECS),
        _ => MIN_WAIT_SECS,
    }
}

/// Render a path as a single-quoted Python string literal
fn python_path_literal(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    format!("'{}'", normalized.replace('\'', "\\'"))
}

/// Build the playback and wait lines for one cue
pub fn cue_lines(indent: &str, clip: &Path, wait_secs: f64) -> Vec<String> {
    vec![
        format!("{}{}{})", indent, PLAYBACK_MARKER, python_path_literal(clip)),
        format!("{}{}{:.2})", indent, WAIT_MARKER, wait_secs),
    ]
}

/// Plan where each voiced segment's cue is inserted
///
/// `clips` maps segment index to its synthesized clip. Segments with empty
/// text are skipped; voiced segments without a clip are skipped with a
/// warning. Out-of-range ordinals anchor to the last event.
///
/// # Errors
/// * `InjectionError::NoAnimationAnchors` if a cue is needed but the
///   timeline is empty
/// * `InjectionError::InlineConstructBody` if the anchor sits on a one-line
///   `def construct(self): ...`
pub fn plan_insertions(
    timeline: &Timeline,
    segments: &[NarrationSegment],
    clips: &BTreeMap<usize, ResolvedClip>,
) -> Result<InsertionPlan, InjectionError> {
    let pending = segments
        .iter()
        .enumerate()
        .filter(|(i, s)| s.is_voiced() && clips.contains_key(i))
        .count();

    let mut plan = Vec::with_capacity(pending);

    for (index, segment) in segments.iter().enumerate() {
        if !segment.is_voiced() {
            debug!("Narration segment {} has no text, nothing to inject", index);
            continue;
        }

        let Some(clip) = clips.get(&index) else {
            warn!("Narration segment {} has no corresponding audio file. Skipping injection.", index);
            continue;
        };

        let duration = match &clip.duration {
            Ok(secs) => Some(*secs),
            Err(e) => {
                warn!("{}; using fallback wait of {:.2}s", e, MIN_WAIT_SECS);
                None
            }
        };
        let wait_secs = wait_seconds(duration);

        let (event, clamped) = match timeline.get(segment.target_event) {
            Some(event) => (event, false),
            None => {
                let Some(last) = timeline.last() else {
                    error!(
                        "Narration segment {} requested animation {}, but construct() has no animations",
                        index, segment.target_event
                    );
                    return Err(InjectionError::NoAnimationAnchors {
                        segment_index: index,
                        pending,
                    });
                };
                warn!(
                    "Narration segment {} requested after animation {} but only {} found. Anchoring to the last animation.",
                    index,
                    segment.target_event,
                    timeline.len()
                );
                (last, true)
            }
        };

        if event.inline_body {
            error!(
                "Narration segment {} is anchored to line {}, but construct() is written on one line",
                index, event.end_line
            );
            return Err(InjectionError::InlineConstructBody {
                segment_index: index,
                line: event.end_line,
            });
        }

        plan.push(PlannedCue {
            segment_index: index,
            anchor_line: event.end_line,
            lines: cue_lines(&event.indent, &clip.path, wait_secs),
            wait_secs,
            clamped,
        });
    }

    Ok(plan)
}
