/*!
 * Rendering of patched scripts into video files.
 *
 * - `manim`: runs the external renderer with a hard timeout
 * - `locator`: finds the produced media file in the renderer's output tree
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::PathBuf;

use crate::errors::RenderError;

pub mod locator;
pub mod manim;

pub use locator::ArtifactLocator;
pub use manim::ManimRenderer;

/// Render quality presets and their output directory conventions
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderQuality {
    #[default]
    Low,
    Medium,
    High,
    Production,
    Ultra,
}

impl RenderQuality {
    /// All presets, in the order their directories are searched
    pub const ALL: [RenderQuality; 5] = [
        RenderQuality::High,
        RenderQuality::Medium,
        RenderQuality::Low,
        RenderQuality::Production,
        RenderQuality::Ultra,
    ];

    /// Single-letter quality flag (`-q<flag>`)
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Low => "l",
            Self::Medium => "m",
            Self::High => "h",
            Self::Production => "p",
            Self::Ultra => "k",
        }
    }

    /// Directory name the renderer uses for this preset
    pub fn directory(&self) -> &'static str {
        match self {
            Self::Low => "480p15",
            Self::Medium => "720p30",
            Self::High => "1080p60",
            Self::Production => "2160p60",
            Self::Ultra => "4320p60",
        }
    }
}

impl std::fmt::Display for RenderQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Production => "production",
            Self::Ultra => "ultra",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for RenderQuality {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "low" | "l" => Ok(Self::Low),
            "medium" | "m" => Ok(Self::Medium),
            "high" | "h" => Ok(Self::High),
            "production" | "p" => Ok(Self::Production),
            "ultra" | "k" => Ok(Self::Ultra),
            _ => Err(anyhow::anyhow!("Invalid render quality: {}", s)),
        }
    }
}

/// Everything the renderer needs for one scene
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Patched script on disk
    pub script_path: PathBuf,
    /// Scene class to render
    pub scene_name: String,
    /// Root of the renderer's output tree
    pub media_dir: PathBuf,
    /// Working directory for the renderer process
    pub work_dir: PathBuf,
}

/// Turns a script file into a video somewhere under `media_dir`
#[async_trait]
pub trait Renderer: Send + Sync + Debug {
    /// Quality the renderer was configured with
    fn quality(&self) -> RenderQuality;

    /// Render the requested scene; partial output is discarded on failure
    async fn render(&self, request: &RenderRequest) -> Result<(), RenderError>;
}
