/*!
 * Stub collaborators for pipeline tests.
 *
 * - `WavSynthesizer` writes silent WAV clips of a fixed length
 * - `FileRenderer` writes a fake video where the real renderer would
 * - `FailingRenderer` always fails like a crashed render
 */

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use edudiff::audio::AudioSynthesizer;
use edudiff::errors::{RenderError, SynthesisError};
use edudiff::render::{RenderQuality, RenderRequest, Renderer};

use super::write_wav;

/// Synthesizer producing silent clips of `seconds`
#[derive(Debug)]
pub struct WavSynthesizer {
    seconds: f64,
    calls: AtomicUsize,
}

impl WavSynthesizer {
    pub fn new(seconds: f64) -> Self {
        Self {
            seconds,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioSynthesizer for WavSynthesizer {
    async fn synthesize(&self, _text: &str, output_dir: &Path) -> Result<PathBuf, SynthesisError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        write_wav(&output_dir.join(format!("voice_{}.wav", n)), self.seconds)
            .map_err(|e| SynthesisError::Failed(e.to_string()))
    }
}

/// Renderer writing `videos/<stem>/<quality>/<Scene>.mp4` and remembering scripts
#[derive(Debug, Default)]
pub struct FileRenderer {
    scripts: Mutex<Vec<String>>,
}

impl FileRenderer {
    pub fn rendered_scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Renderer for FileRenderer {
    fn quality(&self) -> RenderQuality {
        RenderQuality::Low
    }

    async fn render(&self, request: &RenderRequest) -> Result<(), RenderError> {
        let script = std::fs::read_to_string(&request.script_path).map_err(|e| RenderError::Io(e.to_string()))?;
        self.scripts.lock().unwrap().push(script);

        let stem = request.script_path.file_stem().unwrap().to_string_lossy().to_string();
        let target = request
            .media_dir
            .join("videos")
            .join(stem)
            .join(RenderQuality::Low.directory())
            .join(format!("{}.mp4", request.scene_name));
        std::fs::create_dir_all(target.parent().unwrap()).map_err(|e| RenderError::Io(e.to_string()))?;
        std::fs::write(&target, b"fake video").map_err(|e| RenderError::Io(e.to_string()))?;
        Ok(())
    }
}

/// Renderer that always exits with an error
#[derive(Debug, Default)]
pub struct FailingRenderer;

#[async_trait]
impl Renderer for FailingRenderer {
    fn quality(&self) -> RenderQuality {
        RenderQuality::Low
    }

    async fn render(&self, _request: &RenderRequest) -> Result<(), RenderError> {
        Err(RenderError::ProcessFailed {
            status: "exit status: 1".to_string(),
            output: "NameError: name 'Circl' is not defined".to_string(),
        })
    }
}
