//! Data types shared by the detector, the reporter and the frame loop.
//!
//! Coordinates follow image convention: the origin is the top-left pixel,
//! x grows to the right and y grows downwards. A smaller y is therefore
//! higher on screen, and "topmost" always means "minimum y".

use serde::{Deserialize, Serialize};

/// Inclusive per-channel HSV bounds.
///
/// `low <= high` is not enforced. An inverted channel simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HsvBand {
    pub low_h: u8,
    pub high_h: u8,
    pub low_s: u8,
    pub high_s: u8,
    pub low_v: u8,
    pub high_v: u8,
}

impl HsvBand {
    pub fn contains(&self, h: u8, s: u8, v: u8) -> bool {
        (self.low_h..=self.high_h).contains(&h)
            && (self.low_s..=self.high_s).contains(&s)
            && (self.low_v..=self.high_v).contains(&v)
    }

    pub fn is_inverted(&self) -> bool {
        self.low_h > self.high_h || self.low_s > self.high_s || self.low_v > self.high_v
    }
}

impl Default for HsvBand {
    /// Green, as tuned for the default camera.
    fn default() -> Self {
        Self {
            low_h: 52,
            high_h: 88,
            low_s: 91,
            high_s: 255,
            low_v: 0,
            high_v: 255,
        }
    }
}

/// A connected set of mask pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub label: u32,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    /// Zeroth moment (pixel count).
    pub m00: u64,
    /// First moment along x (sum of x coordinates).
    pub m10: u64,
    /// First moment along y (sum of y coordinates).
    pub m01: u64,
}

impl Region {
    pub fn area(&self) -> u64 {
        self.m00
    }

    /// Centroid in whole pixels, truncated towards zero.
    pub fn centroid(&self) -> (u32, u32) {
        if self.m00 == 0 {
            return (self.min_x, self.min_y);
        }
        ((self.m10 / self.m00) as u32, (self.m01 / self.m00) as u32)
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

/// A region that passed the area filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub x: u32,
    pub y: u32,
    pub area: u64,
}

impl From<&Region> for Candidate {
    fn from(region: &Region) -> Self {
        let (x, y) = region.centroid();
        Self {
            x,
            y,
            area: region.area(),
        }
    }
}

/// The topmost candidate of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Index into the candidate list of the candidate that gets reported.
    ///
    /// When several candidates share the minimum y this is the last of them
    /// in extraction order.
    pub index: usize,
    /// Every candidate index sharing the minimum y, in extraction order.
    pub tied: Vec<usize>,
    /// Total number of candidates in the frame.
    pub count: usize,
}

impl Selection {
    pub fn is_marked(&self, index: usize) -> bool {
        self.tied.contains(&index)
    }
}

/// What a single frame produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Too many contours; the band is probably too loose.
    TooNoisy { contours: usize },
    /// No region made it through the area filter.
    Nothing { regions: usize },
    Found {
        candidates: Vec<Candidate>,
        selection: Selection,
    },
}

impl FrameOutcome {
    /// The values handed to the reporter, if any.
    pub fn report(&self) -> Option<Report> {
        match self {
            FrameOutcome::Found {
                candidates,
                selection,
            } => {
                let chosen = candidates[selection.index];
                Some(Report {
                    x: chosen.x,
                    y: chosen.y,
                    count: selection.count,
                })
            }
            _ => None,
        }
    }

    pub fn is_noisy(&self) -> bool {
        matches!(self, FrameOutcome::TooNoisy { .. })
    }
}

/// Coordinates and candidate count of one reported selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub x: u32,
    pub y: u32,
    pub count: usize,
}

/// Steering hint derived from the selection's x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Centered,
    Right,
}

impl Direction {
    pub fn from_x(x: u32, left_bound: u32, right_bound: u32) -> Self {
        if x > right_bound {
            Direction::Right
        } else if x < left_bound {
            Direction::Left
        } else {
            Direction::Centered
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Left => "move left",
            Direction::Centered => "perfect",
            Direction::Right => "move right",
        }
    }
}
