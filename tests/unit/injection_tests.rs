/*!
 * Tests for cue planning, patching and verification
 */

use std::collections::BTreeMap;
use std::path::PathBuf;

use edudiff::errors::InjectionError;
use edudiff::narration::NarrationSegment;
use edudiff::script::cues::{wait_seconds, MIN_WAIT_SECS};
use edudiff::script::patcher::{insert_after_lines, SourceLines};
use edudiff::script::syntax::check_syntax;
use edudiff::script::verifier::{count_playback_cues, verify_injection};
use edudiff::script::{extract_timeline, inject_audio, inject_clips, ResolvedClip};

use crate::common::{create_temp_dir, init_test_logging, write_wav, NO_EVENT_SCENE, TWO_EVENT_SCENE};

fn segments() -> Vec<NarrationSegment> {
    vec![NarrationSegment::new(0, "intro"), NarrationSegment::new(1, "detail")]
}

#[test]
fn test_inject_audio_withMeasuredClips_shouldPlaceCuesAfterEachAnchor() {
    init_test_logging();
    let dir = create_temp_dir().unwrap();
    let intro = write_wav(&dir.path().join("intro.wav"), 1.0).unwrap();
    let detail = write_wav(&dir.path().join("detail.wav"), 4.0).unwrap();

    let mut audio = BTreeMap::new();
    audio.insert(0, intro.clone());
    audio.insert(1, detail.clone());

    let report = inject_audio(TWO_EVENT_SCENE, &segments(), &audio).unwrap();

    let original: Vec<&str> = TWO_EVENT_SCENE.lines().collect();
    let patched: Vec<&str> = report.script.lines().collect();
    assert_eq!(patched.len(), original.len() + 4);

    // First pair directly after line 10
    assert_eq!(&patched[..10], &original[..10]);
    assert_eq!(patched[10], format!("        self.add_sound('{}')", intro.display()));
    assert_eq!(patched[11], "        self.wait(2.00)");
    // Original lines 11-14 follow unchanged, then the second pair
    assert_eq!(&patched[12..16], &original[10..14]);
    assert_eq!(patched[16], format!("        self.add_sound('{}')", detail.display()));
    assert_eq!(patched[17], "        self.wait(4.50)");
    assert_eq!(patched[18], original[14]);

    assert!(report.script.ends_with('\n'));
    assert_eq!(report.plan.len(), 2);
    assert_eq!(report.clamped_count(), 0);
}

#[test]
fn test_inject_clips_withOrdinalOnePastEnd_shouldClampToLastEvent() {
    let mut clips = BTreeMap::new();
    clips.insert(0, ResolvedClip::with_duration("/a/one.wav", 3.0));

    let report = inject_clips(TWO_EVENT_SCENE, &[NarrationSegment::new(2, "late")], &clips).unwrap();

    assert_eq!(report.plan[0].anchor_line, 14);
    assert!(report.plan[0].clamped);
    let patched: Vec<&str> = report.script.lines().collect();
    assert_eq!(patched[14], "        self.add_sound('/a/one.wav')");
    assert_eq!(patched[15], "        self.wait(3.50)");
}

#[test]
fn test_inject_clips_withNegativeOrdinal_shouldClampToLastEvent() {
    let mut clips = BTreeMap::new();
    clips.insert(0, ResolvedClip::with_duration("/a/one.wav", 1.0));

    let report = inject_clips(TWO_EVENT_SCENE, &[NarrationSegment::new(-1, "before")], &clips).unwrap();
    assert_eq!(report.plan[0].anchor_line, 14);
}

#[test]
fn test_inject_clips_withSharedAnchor_shouldKeepSegmentOrder() {
    let mut clips = BTreeMap::new();
    clips.insert(0, ResolvedClip::with_duration("/a/first.wav", 1.0));
    clips.insert(1, ResolvedClip::with_duration("/a/second.wav", 1.0));
    let segments = vec![NarrationSegment::new(0, "first"), NarrationSegment::new(0, "second")];

    let report = inject_clips(TWO_EVENT_SCENE, &segments, &clips).unwrap();

    let first = report.script.find("first.wav").unwrap();
    let second = report.script.find("second.wav").unwrap();
    assert!(first < second);
}

#[test]
fn test_inject_clips_withNoAnimations_shouldFailWithNoAnchors() {
    let mut clips = BTreeMap::new();
    clips.insert(0, ResolvedClip::with_duration("/a/one.wav", 1.0));

    let err = inject_clips(NO_EVENT_SCENE, &[NarrationSegment::new(0, "hello")], &clips).unwrap_err();
    assert!(matches!(err, InjectionError::NoAnimationAnchors { segment_index: 0, pending: 1 }));
}

#[test]
fn test_inject_clips_withNoSegmentsAndNoAnimations_shouldReturnScriptUnchanged() {
    let report = inject_clips(NO_EVENT_SCENE, &[], &BTreeMap::new()).unwrap();
    assert_eq!(report.script, NO_EVENT_SCENE);
}

#[test]
fn test_inject_clips_withUnvoicedAndUnsynthesizedSegments_shouldSkipThem() {
    let mut clips = BTreeMap::new();
    clips.insert(2, ResolvedClip::with_duration("/a/third.wav", 1.0));
    let segments = vec![
        NarrationSegment::new(0, "   "),
        NarrationSegment::new(0, "no clip for me"),
        NarrationSegment::new(1, "third"),
    ];

    let report = inject_clips(TWO_EVENT_SCENE, &segments, &clips).unwrap();

    assert_eq!(report.plan.len(), 1);
    assert_eq!(report.plan[0].segment_index, 2);
    assert_eq!(count_playback_cues(&report.script), 1);
}

#[test]
fn test_inject_audio_withUnreadableClip_shouldFallBackToMinimumWait() {
    let dir = create_temp_dir().unwrap();
    let bogus = dir.path().join("bogus.wav");
    std::fs::write(&bogus, b"not audio").unwrap();

    let mut audio = BTreeMap::new();
    audio.insert(0, bogus);
    let report = inject_audio(TWO_EVENT_SCENE, &[NarrationSegment::new(0, "x")], &audio).unwrap();

    assert_eq!(report.plan[0].wait_secs, MIN_WAIT_SECS);
    assert!(report.script.contains("self.wait(2.00)"));
}

#[test]
fn test_inject_clips_withExistingSoundCalls_shouldOnlyCountNewCues() {
    let script = TWO_EVENT_SCENE.replace("self.wait(1)", "self.add_sound('bg.wav')");
    let mut clips = BTreeMap::new();
    clips.insert(0, ResolvedClip::with_duration("/a/one.wav", 1.0));

    let report = inject_clips(&script, &[NarrationSegment::new(0, "x")], &clips).unwrap();
    assert_eq!(count_playback_cues(&report.script), 2);
}

#[test]
fn test_inject_clips_withCrlfScript_shouldKeepLineEndings() {
    let script = TWO_EVENT_SCENE.replace('\n', "\r\n");
    let mut clips = BTreeMap::new();
    clips.insert(0, ResolvedClip::with_duration("/a/one.wav", 1.0));

    let report = inject_clips(&script, &[NarrationSegment::new(0, "x")], &clips).unwrap();

    assert_eq!(report.script.matches("\r\n").count(), report.script.matches('\n').count());
    assert!(report.script.contains("        self.add_sound('/a/one.wav')\r\n"));
}

#[test]
fn test_inject_clips_withTwoEventScene_shouldProduceValidPython() {
    let mut clips = BTreeMap::new();
    clips.insert(0, ResolvedClip::with_duration("/a/one.wav", 1.0));
    clips.insert(1, ResolvedClip::with_duration("/a/two.wav", 2.0));

    let report = inject_clips(TWO_EVENT_SCENE, &segments(), &clips).unwrap();

    assert!(check_syntax(&report.script).is_ok());
    assert_eq!(extract_timeline(&report.script).unwrap().len(), 2);
}

#[test]
fn test_inject_clips_withSemicolonChain_shouldIndentCuesLikeTheLine() {
    let script = "class S(Scene):\n    def construct(self):\n        c = Circle(); self.play(Create(c))\n        self.wait()\n";
    let mut clips = BTreeMap::new();
    clips.insert(0, ResolvedClip::with_duration("/a/one.wav", 1.0));

    let report = inject_clips(script, &[NarrationSegment::new(0, "x")], &clips).unwrap();

    let patched: Vec<&str> = report.script.lines().collect();
    assert_eq!(patched[3], "        self.add_sound('/a/one.wav')");
    assert_eq!(patched[4], "        self.wait(2.00)");
    assert!(check_syntax(&report.script).is_ok());
    assert_eq!(extract_timeline(&report.script).unwrap().len(), 1);
}

#[test]
fn test_inject_clips_withOneLineConstruct_shouldFail() {
    let script = "class S(Scene):\n    def construct(self): self.play(x)\n";
    let mut clips = BTreeMap::new();
    clips.insert(0, ResolvedClip::with_duration("/a/one.wav", 1.0));

    let err = inject_clips(script, &[NarrationSegment::new(0, "x")], &clips).unwrap_err();
    assert!(matches!(err, InjectionError::InlineConstructBody { segment_index: 0, line: 2 }));
}

#[test]
fn test_inject_clips_withCrlfAndNoTrailingNewline_shouldTerminateAnchorLine() {
    let script = "class S(Scene):\r\n    def construct(self):\r\n        self.play(x)";
    let mut clips = BTreeMap::new();
    clips.insert(0, ResolvedClip::with_duration("/a/one.wav", 1.0));

    let report = inject_clips(script, &[NarrationSegment::new(0, "x")], &clips).unwrap();

    assert!(report.script.contains("        self.play(x)\r\n        self.add_sound('/a/one.wav')\r\n"));
    assert!(!report.script.ends_with('\n'));
    assert!(check_syntax(&report.script).is_ok());
}

#[test]
fn test_inject_clips_withWindowsPath_shouldUseForwardSlashes() {
    let mut clips = BTreeMap::new();
    clips.insert(0, ResolvedClip::with_duration(PathBuf::from(r"C:\tmp\it's.wav"), 1.0));

    let report = inject_clips(TWO_EVENT_SCENE, &[NarrationSegment::new(0, "x")], &clips).unwrap();
    assert!(report.script.contains(r"self.add_sound('C:/tmp/it\'s.wav')"));
}

#[test]
fn test_wait_seconds_shouldApplyPaddingAndFloor() {
    assert_eq!(wait_seconds(Some(0.3)), 2.0);
    assert_eq!(wait_seconds(Some(3.0)), 3.5);
    assert_eq!(wait_seconds(None), 2.0);
}

#[test]
fn test_insert_after_lines_withDistinctAnchors_shouldNotDependOnOrder() {
    let text = "a\nb\nc\nd\n";
    let first = vec!["x".to_string()];
    let second = vec!["y".to_string(), "z".to_string()];

    let mut forward = SourceLines::split(text);
    insert_after_lines(&mut forward, vec![(1, first.as_slice()), (3, second.as_slice())]).unwrap();
    let mut backward = SourceLines::split(text);
    insert_after_lines(&mut backward, vec![(3, second.as_slice()), (1, first.as_slice())]).unwrap();

    assert_eq!(forward.join(), "a\nx\nb\nc\ny\nz\nd\n");
    assert_eq!(forward, backward);
}

#[test]
fn test_insert_after_lines_withAnchorPastEnd_shouldFail() {
    let mut source = SourceLines::split("a\nb");
    let lines = vec!["x".to_string()];
    let err = insert_after_lines(&mut source, vec![(3, lines.as_slice())]).unwrap_err();

    assert!(matches!(err, InjectionError::AnchorOutOfRange { anchor: 3, line_count: 2 }));
}

#[test]
fn test_verify_injection_withMissingCue_shouldFail() {
    let err = verify_injection("x\n", "x\n", 1).unwrap_err();
    assert!(matches!(err, InjectionError::VerificationFailed { expected: 1, found: 0 }));
}
