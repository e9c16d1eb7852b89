//! Frame sources.

use std::path::{Path, PathBuf};

use image::{imageops::FilterType, ImageReader, RgbImage};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::CaptureConfig;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to open frame {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode frame {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("frame {path} is empty")]
    Empty { path: PathBuf },
    #[error("failed to list frames in {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Supplies one color frame per call.
pub trait FrameSource {
    /// `Ok(None)` means the stream has ended.
    fn next_frame(&mut self) -> Result<Option<RgbImage>, CaptureError>;
}

/// What the frame loop does when a source fails to deliver a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureFailurePolicy {
    /// Stop the loop and return the error.
    #[default]
    FailFast,
    /// Log the failure and move on to the next frame.
    Skip,
}

const FRAME_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Reads frames from image files in order, scaled to the capture resolution.
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    position: usize,
    width: u32,
    height: u32,
    looping: bool,
}

impl ImageSequence {
    pub fn new(paths: Vec<PathBuf>, config: &CaptureConfig) -> Self {
        Self {
            paths,
            position: 0,
            width: config.width,
            height: config.height,
            looping: false,
        }
    }

    /// Build a sequence from files and directories. Directories contribute
    /// their image files sorted by name.
    pub fn from_inputs(inputs: &[PathBuf], config: &CaptureConfig) -> Result<Self, CaptureError> {
        let mut paths = Vec::new();
        for input in inputs {
            if input.is_dir() {
                paths.extend(list_frames(input)?);
            } else {
                paths.push(input.clone());
            }
        }
        info!(frames = paths.len(), "frame sequence ready");
        Ok(Self::new(paths, config))
    }

    /// Start over from the first frame once the last one has been read.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn load(&self, path: &Path) -> Result<RgbImage, CaptureError> {
        let img = ImageReader::open(path)
            .map_err(|source| CaptureError::Open {
                path: path.to_path_buf(),
                source,
            })?
            .decode()
            .map_err(|source| CaptureError::Decode {
                path: path.to_path_buf(),
                source,
            })?;

        if img.width() == 0 || img.height() == 0 {
            return Err(CaptureError::Empty {
                path: path.to_path_buf(),
            });
        }

        let rgb = img.to_rgb8();
        if rgb.dimensions() == (self.width, self.height) {
            Ok(rgb)
        } else {
            debug!(
                from_width = rgb.width(),
                from_height = rgb.height(),
                to_width = self.width,
                to_height = self.height,
                "resizing frame"
            );
            Ok(image::imageops::resize(
                &rgb,
                self.width,
                self.height,
                FilterType::Triangle,
            ))
        }
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, CaptureError> {
        if self.position >= self.paths.len() {
            if !self.looping || self.paths.is_empty() {
                return Ok(None);
            }
            self.position = 0;
        }

        let index = self.position;
        self.position += 1;
        self.load(&self.paths[index]).map(Some)
    }
}

fn list_frames(dir: &Path) -> Result<Vec<PathBuf>, CaptureError> {
    let entries = std::fs::read_dir(dir).map_err(|source| CaptureError::List {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut frames = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| CaptureError::List {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        let is_frame = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if is_frame {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}
