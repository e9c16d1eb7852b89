pub mod preprocessing;
pub mod contours;
pub mod selection;

use image::{GrayImage, RgbImage};
use tracing::{debug, warn};

use crate::config::DetectorConfig;
use crate::models::{FrameOutcome, HsvBand};

/// Result of running the detector on one frame.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Cleaned binary mask, kept for display.
    pub mask: GrayImage,
    pub outcome: FrameOutcome,
}

/// Threshold, clean, extract and select on a single frame
pub struct Detector {
    pub config: DetectorConfig,
}

impl Detector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Run the full detection pipeline on a frame.
    ///
    /// Never fails: noisy and empty frames come back as outcomes.
    pub fn detect(&self, frame: &RgbImage, band: &HsvBand) -> Detection {
        if band.is_inverted() {
            debug!(?band, "band is inverted; mask will be empty");
        }

        let hsv = preprocessing::to_hsv(frame);
        let mut mask = preprocessing::threshold(&hsv, band);
        preprocessing::clean_mask(&mut mask, &self.config);

        let outcome = self.analyze_mask(&mask);
        Detection { mask, outcome }
    }

    /// Extract, filter and select on an already cleaned mask
    pub fn analyze_mask(&self, mask: &GrayImage) -> FrameOutcome {
        let scan = contours::find_regions(mask);
        debug!(
            regions = scan.regions.len(),
            contours = scan.contours,
            "found regions"
        );

        if scan.contours >= self.config.max_contours {
            warn!(
                contours = scan.contours,
                limit = self.config.max_contours,
                "too much noise, adjust filter"
            );
            return FrameOutcome::TooNoisy {
                contours: scan.contours,
            };
        }

        let max_area = selection::max_object_area(
            mask.width(),
            mask.height(),
            self.config.max_object_fraction,
        );
        let candidates =
            selection::filter_candidates(&scan.regions, self.config.min_object_area, max_area);

        match selection::select_topmost(&candidates) {
            Some(selection) => {
                if selection.tied.len() > 1 {
                    debug!(tied = selection.tied.len(), "several candidates share the top row");
                }
                FrameOutcome::Found {
                    candidates,
                    selection,
                }
            }
            None => FrameOutcome::Nothing {
                regions: scan.regions.len(),
            },
        }
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}
