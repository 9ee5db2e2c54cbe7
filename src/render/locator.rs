use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::RenderError;
use crate::render::RenderQuality;

// @module: Rendered artifact discovery

/// Finds the video a render produced inside its media directory
///
/// Known output locations are checked first. When none exist the whole tree
/// is walked in file-name order and the first media file whose name contains
/// the scene name wins.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    /// Extension of the produced media, without the dot
    extension: String,
}

impl Default for ArtifactLocator {
    fn default() -> Self {
        Self::new("mp4")
    }
}

impl ArtifactLocator {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    /// Fixed candidate locations, most specific first
    pub fn candidate_paths(&self, media_dir: &Path, script_stem: &str, scene_name: &str, quality: RenderQuality) -> Vec<PathBuf> {
        let file_name = format!("{}.{}", scene_name, self.extension);
        let videos = media_dir.join("videos");
        let per_script = videos.join(script_stem);

        let mut candidates = vec![per_script.join(quality.directory()).join(&file_name)];
        candidates.extend(
            RenderQuality::ALL
                .iter()
                .filter(|q| **q != quality)
                .map(|q| per_script.join(q.directory()).join(&file_name)),
        );
        candidates.push(videos.join(&file_name));
        candidates.push(media_dir.join(&file_name));
        candidates
    }

    /// Locate the artifact for `scene_name`, or fail with the searched root
    pub fn locate(&self, media_dir: &Path, script_stem: &str, scene_name: &str, quality: RenderQuality) -> Result<PathBuf, RenderError> {
        for candidate in self.candidate_paths(media_dir, script_stem, scene_name, quality) {
            if candidate.is_file() {
                debug!("Found rendered video at {:?}", candidate);
                return Ok(candidate);
            }
        }

        debug!("No video at known locations, walking {:?}", media_dir);
        if let Some(found) = self.search_tree(media_dir, scene_name) {
            warn!("Rendered video found outside the expected layout: {:?}", found);
            return Ok(found);
        }

        Err(RenderError::ArtifactMissing {
            root: media_dir.to_path_buf(),
            fragment: scene_name.to_string(),
        })
    }

    fn search_tree(&self, root: &Path, fragment: &str) -> Option<PathBuf> {
        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .find(|entry| self.matches(entry.path(), fragment))
            .map(|entry| entry.into_path())
    }

    fn matches(&self, path: &Path, fragment: &str) -> bool {
        let has_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false);
        let has_fragment = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.contains(fragment))
            .unwrap_or(false);
        has_extension && has_fragment
    }
}
