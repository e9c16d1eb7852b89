//! Output side of the tracker: the data file read by the guidance routine
//! and the markers drawn on the display frame.

use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_text_mut};
use tracing::debug;

use crate::config::GuidanceConfig;
use crate::models::{Direction, FrameOutcome, Report};

const MARKER_RADIUS: i32 = 10;
const LABEL_OFFSET: i32 = 20;

const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
const RED: Rgb<u8> = Rgb([255, 0, 0]);

/// Three-line text file: x, y, candidate count.
pub struct DataFile {
    path: PathBuf,
}

impl DataFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file contents with `report`
    pub fn write(&self, report: &Report) -> Result<()> {
        std::fs::write(&self.path, format_report(report))
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        debug!(x = report.x, y = report.y, count = report.count, "wrote report");
        Ok(())
    }
}

pub fn format_report(report: &Report) -> String {
    format!("{}\n{}\n{}\n", report.x, report.y, report.count)
}

/// Draws detection results onto the display frame.
pub struct Annotator {
    guidance: GuidanceConfig,
    font: Option<FontArc>,
}

impl Annotator {
    pub fn new(guidance: GuidanceConfig) -> Self {
        Self {
            guidance,
            font: None,
        }
    }

    /// Load a TrueType/OpenType font for labels. Without one only markers
    /// are drawn.
    pub fn with_font_file(mut self, path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read font {}", path.display()))?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| anyhow::anyhow!("Failed to load font {}: {}", path.display(), e))?;
        self.font = Some(font);
        Ok(self)
    }

    pub fn direction(&self, x: u32) -> Direction {
        Direction::from_x(x, self.guidance.left_bound, self.guidance.right_bound)
    }

    pub fn annotate(&self, frame: &mut RgbImage, outcome: &FrameOutcome) {
        match outcome {
            FrameOutcome::TooNoisy { .. } => {
                self.text(frame, RED, 0, 50, 24.0, "TOO MUCH NOISE! ADJUST FILTER");
            }
            FrameOutcome::Nothing { .. } => {}
            FrameOutcome::Found {
                candidates,
                selection,
            } => {
                for (i, candidate) in candidates.iter().enumerate() {
                    let center = (candidate.x as i32, candidate.y as i32);
                    let color = if selection.is_marked(i) { GREEN } else { RED };
                    draw_hollow_circle_mut(frame, center, MARKER_RADIUS, color);

                    let label = format!("{} , {}", candidate.x, candidate.y);
                    self.text(frame, GREEN, center.0, center.1 + LABEL_OFFSET, 14.0, &label);
                }

                let chosen = candidates[selection.index];
                let direction = self.direction(chosen.x);
                let color = if direction == Direction::Centered { GREEN } else { RED };
                self.text(frame, color, 0, 25, 24.0, direction.label());
            }
        }
    }

    fn text(&self, frame: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, size: f32, text: &str) {
        if let Some(font) = &self.font {
            draw_text_mut(frame, color, x, y, PxScale::from(size), font, text);
        }
    }
}
