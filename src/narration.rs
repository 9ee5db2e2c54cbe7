use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::NarrationError;
use crate::generation::steps::strip_code_fences;

// @module: Narration document model

/// One unit of narration text with the animation it follows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationSegment {
    /// Ordinal of the animation event this segment plays after (0 = first
    /// `self.play`/`self.add`). Signed because models occasionally emit -1.
    #[serde(rename = "start_after_animation", default)]
    pub target_event: i64,

    /// Spoken text; empty text produces no audio
    #[serde(default)]
    pub text: String,
}

impl NarrationSegment {
    pub fn new(target_event: i64, text: impl Into<String>) -> Self {
        Self {
            target_event,
            text: text.into(),
        }
    }

    /// Whether this segment will be voiced
    pub fn is_voiced(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Narration for a whole script
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrationDocument {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub segments: Vec<NarrationSegment>,
}

impl NarrationDocument {
    pub fn new(title: impl Into<String>, segments: Vec<NarrationSegment>) -> Self {
        Self {
            title: title.into(),
            segments,
        }
    }

    /// Parse a narration document from model output
    ///
    /// Markdown code fences are tolerated; anything that is not a JSON object
    /// of the expected shape is rejected with the offending content attached.
    pub fn parse(content: &str) -> Result<Self, NarrationError> {
        let body = strip_code_fences(content);

        let document: NarrationDocument =
            serde_json::from_str(&body).map_err(|e| NarrationError::Malformed {
                reason: e.to_string(),
                content: content.to_string(),
            })?;

        debug!(
            "Parsed narration '{}' with {} segment(s)",
            document.title,
            document.segments.len()
        );

        Ok(document)
    }

    /// Number of segments that will produce audio
    pub fn voiced_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_voiced()).count()
    }
}
