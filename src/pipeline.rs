use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use image::{GrayImage, RgbImage};
use tracing::{debug, info, warn};

use crate::capture::{CaptureFailurePolicy, FrameSource};
use crate::config::{BandFile, BandStore, TrackerConfig};
use crate::detection::Detector;
use crate::models::{FrameOutcome, HsvBand, Report};
use crate::report::{Annotator, DataFile};

/// Receives the two images produced by every iteration.
pub trait FrameSink {
    fn show(&mut self, index: u64, mask: &GrayImage, annotated: &RgbImage) -> Result<()>;
}

/// Discards everything.
pub struct NullSink;

impl FrameSink for NullSink {
    fn show(&mut self, _index: u64, _mask: &GrayImage, _annotated: &RgbImage) -> Result<()> {
        Ok(())
    }
}

/// Writes each iteration's mask and annotated frame as PNGs.
pub struct DebugDirSink {
    output_dir: PathBuf,
}

impl DebugDirSink {
    /// The directory must be empty or non-existent
    pub fn new(output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        Ok(Self { output_dir })
    }
}

impl FrameSink for DebugDirSink {
    fn show(&mut self, index: u64, mask: &GrayImage, annotated: &RgbImage) -> Result<()> {
        let mask_path = self.output_dir.join(format!("{:06}_mask.png", index));
        mask.save(&mask_path)
            .map_err(|e| anyhow::anyhow!("Failed to save debug mask: {}", e))?;

        let frame_path = self.output_dir.join(format!("{:06}_annotated.png", index));
        annotated
            .save(&frame_path)
            .map_err(|e| anyhow::anyhow!("Failed to save debug frame: {}", e))?;

        debug!(index, dir = %self.output_dir.display(), "saved debug images");
        Ok(())
    }
}

/// Everything one iteration produced.
#[derive(Debug, Clone)]
pub struct FrameResult {
    pub band: HsvBand,
    pub mask: GrayImage,
    pub annotated: RgbImage,
    pub outcome: FrameOutcome,
}

/// Counters for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub reported: u64,
    pub noisy: u64,
    pub empty: u64,
    pub capture_failures: u64,
    pub last_report: Option<Report>,
}

/// Skipped capture failures in a row before a run gives up.
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 30;

/// Frame-at-a-time loop: capture, detect, report, display.
pub struct Pipeline {
    detector: Detector,
    annotator: Annotator,
    band: Arc<BandStore>,
    band_file: Option<BandFile>,
    output: Option<DataFile>,
    failure_policy: CaptureFailurePolicy,
    max_frames: Option<u64>,
    max_consecutive_failures: u32,
    stop: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            detector: Detector::new(config.detector.clone()),
            annotator: Annotator::new(config.guidance.clone()),
            band: Arc::new(BandStore::new(config.band)),
            band_file: None,
            output: None,
            failure_policy: CaptureFailurePolicy::default(),
            max_frames: None,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Persist each selection to this file
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(DataFile::new(path));
        self
    }

    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    /// Poll a JSON band file before every iteration
    pub fn with_band_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.band_file = Some(BandFile::new(path));
        self
    }

    pub fn with_failure_policy(mut self, policy: CaptureFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Limit on capture attempts; skipped frames count towards it
    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Under `CaptureFailurePolicy::Skip`, fail the run once this many
    /// captures in a row have failed
    pub fn with_max_consecutive_failures(mut self, limit: u32) -> Self {
        self.max_consecutive_failures = limit.max(1);
        self
    }

    /// Store shared with control surfaces.
    pub fn band_store(&self) -> Arc<BandStore> {
        Arc::clone(&self.band)
    }

    /// Setting this flag ends the loop at the next iteration boundary.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Detect, report and annotate a single frame.
    pub fn process_frame(&self, frame: &RgbImage, band: HsvBand) -> Result<FrameResult> {
        let detection = self.detector.detect(frame, &band);

        if let Some(report) = detection.outcome.report() {
            if let Some(output) = &self.output {
                output.write(&report)?;
            }
        }

        let mut annotated = frame.clone();
        self.annotator.annotate(&mut annotated, &detection.outcome);

        Ok(FrameResult {
            band,
            mask: detection.mask,
            annotated,
            outcome: detection.outcome,
        })
    }

    /// Run until the source ends, the stop flag is raised or the frame limit
    /// is reached.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut index: u64 = 0;
        let mut consecutive_failures: u32 = 0;

        loop {
            if self.stop.load(Ordering::Relaxed) {
                info!("stop requested");
                break;
            }
            let attempts = summary.frames + summary.capture_failures;
            if self.max_frames.is_some_and(|max| attempts >= max) {
                info!(frames = summary.frames, attempts, "frame limit reached");
                break;
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("frame source exhausted");
                    break;
                }
                Err(e) => match self.failure_policy {
                    CaptureFailurePolicy::FailFast => {
                        return Err(anyhow::Error::new(e).context("capture failed"));
                    }
                    CaptureFailurePolicy::Skip => {
                        summary.capture_failures += 1;
                        consecutive_failures += 1;
                        if consecutive_failures >= self.max_consecutive_failures {
                            return Err(anyhow::Error::new(e).context(format!(
                                "capture failed {} times in a row",
                                consecutive_failures
                            )));
                        }
                        warn!("skipping frame: {e}");
                        continue;
                    }
                },
            };
            consecutive_failures = 0;

            if let Some(band_file) = &mut self.band_file {
                band_file.poll(&self.band);
            }
            let band = self.band.snapshot();

            let result = self.process_frame(&frame, band)?;
            summary.frames += 1;
            match &result.outcome {
                FrameOutcome::TooNoisy { .. } => summary.noisy += 1,
                FrameOutcome::Nothing { .. } => summary.empty += 1,
                FrameOutcome::Found { .. } => {
                    summary.reported += 1;
                    summary.last_report = result.outcome.report();
                    if let Some(report) = summary.last_report {
                        info!(
                            frame = index,
                            x = report.x,
                            y = report.y,
                            count = report.count,
                            direction = self.annotator.direction(report.x).label(),
                            "object found"
                        );
                    }
                }
            }

            sink.show(index, &result.mask, &result.annotated)?;
            index += 1;
        }

        Ok(summary)
    }
}
