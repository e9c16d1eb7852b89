mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from colortrack for tests
pub use colortrack::{
    Candidate, Detector, DetectorConfig, FrameOutcome, HsvBand, Pipeline, Report, Selection,
    TrackerConfig,
};
