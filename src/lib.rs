pub mod capture;
pub mod config;
pub mod detection;
pub mod models;
pub mod pipeline;
pub mod report;

pub use capture::{CaptureError, CaptureFailurePolicy, FrameSource, ImageSequence};
pub use config::{
    BandFile, BandStore, BandUpdate, Channel, ConfigError, DetectorConfig, TrackerConfig,
};
pub use detection::{Detection, Detector};
pub use models::{Candidate, Direction, FrameOutcome, HsvBand, Region, Report, Selection};
pub use pipeline::{DebugDirSink, FrameSink, NullSink, Pipeline, RunSummary};
pub use report::{Annotator, DataFile};
