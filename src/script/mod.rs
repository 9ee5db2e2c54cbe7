/*!
 * Script synchronization and injection engine.
 *
 * - `timeline`: parses the generated script and lists animation events
 * - `cues`: plans where each narration clip is cued
 * - `patcher`: applies the plan without disturbing line references
 * - `syntax`: strict Python grammar check
 * - `verifier`: checks that the cues actually landed
 * - `injector`: runs the stages above in order
 */

pub mod cues;
pub mod injector;
pub mod patcher;
pub mod syntax;
pub mod timeline;
pub mod verifier;

// Re-export main types
pub use cues::{InsertionPlan, PlannedCue, ResolvedClip};
pub use injector::{inject_audio, inject_clips, InjectionReport};
pub use timeline::{discover_scene_name, extract_timeline, AnimationEvent, Timeline};
