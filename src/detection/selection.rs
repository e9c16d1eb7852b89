use crate::models::{Candidate, Region, Selection};

/// Largest area a region may have in a frame of the given size.
///
/// Regions at or above this are treated as a runaway band matching most of
/// the frame.
pub fn max_object_area(width: u32, height: u32, fraction: f64) -> f64 {
    (width as u64 * height as u64) as f64 * fraction
}

/// Keep regions whose area lies strictly between the two bounds.
///
/// Extraction order is preserved.
pub fn filter_candidates(regions: &[Region], min_area: u64, max_area: f64) -> Vec<Candidate> {
    regions
        .iter()
        .filter(|r| r.area() > min_area && (r.area() as f64) < max_area)
        .map(Candidate::from)
        .collect()
}

/// Pick the topmost candidate (minimum y).
///
/// Every candidate sharing the minimum y is recorded in `tied`; the one
/// reported is the last of them in extraction order.
pub fn select_topmost(candidates: &[Candidate]) -> Option<Selection> {
    let least_y = candidates.iter().map(|c| c.y).min()?;

    let tied: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.y == least_y)
        .map(|(i, _)| i)
        .collect();
    let index = *tied.last()?;

    Some(Selection {
        index,
        tied,
        count: candidates.len(),
    })
}
