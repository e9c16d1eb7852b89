use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::HsvBand;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Detector thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Regions must be strictly larger than this (40 x 40 px).
    pub min_object_area: u64,
    /// Regions must be strictly smaller than this share of the frame.
    pub max_object_fraction: f64,
    /// At or above this many contours the frame is treated as noise.
    pub max_contours: usize,
    pub erode_size: u32,
    pub dilate_size: u32,
    pub morph_passes: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_object_area: 40 * 40,
            max_object_fraction: 1.0 / 1.5,
            max_contours: 50,
            erode_size: 3,
            dilate_size: 9,
            morph_passes: 2,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_object_fraction > 0.0 && self.max_object_fraction <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "max_object_fraction must be in (0, 1], got {}",
                self.max_object_fraction
            )));
        }
        if self.erode_size % 2 == 0 || self.dilate_size % 2 == 0 {
            return Err(ConfigError::Invalid(
                "structuring element sizes must be odd".to_string(),
            ));
        }
        if self.erode_size > 511 || self.dilate_size > 511 {
            return Err(ConfigError::Invalid(
                "structuring element sizes must be at most 511".to_string(),
            ));
        }
        Ok(())
    }
}

/// Horizontal bounds for the steering hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    pub left_bound: u32,
    pub right_bound: u32,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            left_bound: 300,
            right_bound: 340,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// Everything the tracker reads at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub band: HsvBand,
    pub detector: DetectorConfig,
    pub guidance: GuidanceConfig,
    pub capture: CaptureConfig,
}

impl TrackerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: TrackerConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.detector.validate()?;
        info!(path = %path.display(), "loaded tracker config");
        Ok(config)
    }
}

/// One of the six adjustable band bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    LowH,
    HighH,
    LowS,
    HighS,
    LowV,
    HighV,
}

impl Channel {
    pub const ALL: [Channel; 6] = [
        Channel::LowH,
        Channel::HighH,
        Channel::LowS,
        Channel::HighS,
        Channel::LowV,
        Channel::HighV,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

/// Canonical store for the band, shared between control surfaces and the
/// frame loop.
///
/// Each bound is its own atomic. A snapshot taken while a control surface is
/// writing may mix old and new values; the next iteration picks up the rest.
#[derive(Debug)]
pub struct BandStore {
    bounds: [AtomicU8; 6],
}

impl BandStore {
    pub fn new(band: HsvBand) -> Self {
        let store = Self {
            bounds: Default::default(),
        };
        store.store(&band);
        store
    }

    pub fn set(&self, channel: Channel, value: u8) {
        self.bounds[channel.slot()].store(value, Ordering::Relaxed);
    }

    pub fn get(&self, channel: Channel) -> u8 {
        self.bounds[channel.slot()].load(Ordering::Relaxed)
    }

    pub fn store(&self, band: &HsvBand) {
        self.set(Channel::LowH, band.low_h);
        self.set(Channel::HighH, band.high_h);
        self.set(Channel::LowS, band.low_s);
        self.set(Channel::HighS, band.high_s);
        self.set(Channel::LowV, band.low_v);
        self.set(Channel::HighV, band.high_v);
    }

    /// Immutable copy for one processing cycle.
    pub fn snapshot(&self) -> HsvBand {
        HsvBand {
            low_h: self.get(Channel::LowH),
            high_h: self.get(Channel::HighH),
            low_s: self.get(Channel::LowS),
            high_s: self.get(Channel::HighS),
            low_v: self.get(Channel::LowV),
            high_v: self.get(Channel::HighV),
        }
    }
}

impl Default for BandStore {
    fn default() -> Self {
        Self::new(HsvBand::default())
    }
}

/// Bounds named by a band file. Absent bounds keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct BandUpdate {
    pub low_h: Option<u8>,
    pub high_h: Option<u8>,
    pub low_s: Option<u8>,
    pub high_s: Option<u8>,
    pub low_v: Option<u8>,
    pub high_v: Option<u8>,
}

impl BandUpdate {
    /// Write the present bounds into `store`. Returns how many were set.
    pub fn apply(&self, store: &BandStore) -> usize {
        let bounds = [
            (Channel::LowH, self.low_h),
            (Channel::HighH, self.high_h),
            (Channel::LowS, self.low_s),
            (Channel::HighS, self.high_s),
            (Channel::LowV, self.low_v),
            (Channel::HighV, self.high_v),
        ];
        let mut applied = 0;
        for (channel, value) in bounds {
            if let Some(value) = value {
                store.set(channel, value);
                applied += 1;
            }
        }
        applied
    }
}

/// Headless control surface: a JSON band file re-read whenever its
/// modification time changes.
pub struct BandFile {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl BandFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_modified: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Push the bounds named in the file into `store` if the file changed
    /// since the last poll. Returns whether the store was updated.
    ///
    /// Bounds the file leaves out are not touched. A missing or malformed
    /// file leaves the store untouched.
    pub fn poll(&mut self, store: &BandStore) -> bool {
        let modified = match std::fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                debug!(path = %self.path.display(), "band file unavailable: {e}");
                return false;
            }
        };
        if self.last_modified == Some(modified) {
            return false;
        }
        self.last_modified = Some(modified);

        let update = std::fs::read_to_string(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str::<BandUpdate>(&text).map_err(|e| e.to_string()));
        match update {
            Ok(update) => {
                let applied = update.apply(store);
                info!(applied, band = ?store.snapshot(), "band updated from file");
                applied > 0
            }
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring band file: {e}");
                false
            }
        }
    }
}
