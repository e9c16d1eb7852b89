mod common;

use colortrack::detection::selection::{filter_candidates, max_object_area, select_topmost};
use colortrack::{Direction, Region};
use common::*;

fn region(label: u32, area: u64) -> Region {
    Region {
        label,
        min_x: 0,
        min_y: 0,
        max_x: 0,
        max_y: 0,
        m00: area,
        m10: area * 10 * label as u64,
        m01: area * 20,
    }
}

fn candidate(x: u32, y: u32) -> Candidate {
    Candidate { x, y, area: 2500 }
}

#[test]
fn test_max_object_area_is_two_thirds_of_frame() {
    let max = max_object_area(640, 480, DetectorConfig::default().max_object_fraction);
    assert!((max - 204_800.0).abs() < 1e-6);
}

#[test]
fn test_area_bounds_are_strict() {
    let regions = vec![
        region(1, 1600),
        region(2, 1601),
        region(3, 204_799),
        region(4, 204_800),
    ];

    let candidates = filter_candidates(&regions, 1600, 204_800.0);
    let areas: Vec<u64> = candidates.iter().map(|c| c.area).collect();
    assert_eq!(areas, vec![1601, 204_799]);
}

#[test]
fn test_filter_keeps_extraction_order() {
    let regions = vec![region(3, 5000), region(1, 100), region(2, 3000)];

    let candidates = filter_candidates(&regions, 1600, 1e9);
    let xs: Vec<u32> = candidates.iter().map(|c| c.x).collect();
    assert_eq!(xs, vec![30, 20]);
}

#[test]
fn test_no_candidates_no_selection() {
    assert_eq!(select_topmost(&[]), None);
}

#[test]
fn test_single_candidate_is_selected() {
    let selection = select_topmost(&[candidate(400, 470)]).unwrap();
    assert_eq!(
        selection,
        Selection {
            index: 0,
            tied: vec![0],
            count: 1
        }
    );
}

#[test]
fn test_topmost_has_minimum_y() {
    let candidates = [
        candidate(10, 300),
        candidate(20, 120),
        candidate(30, 450),
        candidate(40, 121),
    ];

    let selection = select_topmost(&candidates).unwrap();
    assert_eq!(selection.index, 1);
    assert_eq!(selection.tied, vec![1]);
    assert_eq!(selection.count, 4);
    for c in &candidates {
        assert!(candidates[selection.index].y <= c.y);
    }
}

#[test]
fn test_tie_reports_last_in_extraction_order() {
    let candidates = [
        candidate(100, 200),
        candidate(500, 80),
        candidate(300, 300),
        candidate(50, 80),
    ];

    let selection = select_topmost(&candidates).unwrap();
    // Both tied candidates get marked, only the later one is reported
    assert_eq!(selection.tied, vec![1, 3]);
    assert_eq!(selection.index, 3);
    assert!(selection.is_marked(1));
    assert!(selection.is_marked(3));
    assert!(!selection.is_marked(0));
}

#[test]
fn test_direction_thresholds() {
    assert_eq!(Direction::from_x(0, 300, 340), Direction::Left);
    assert_eq!(Direction::from_x(299, 300, 340), Direction::Left);
    assert_eq!(Direction::from_x(300, 300, 340), Direction::Centered);
    assert_eq!(Direction::from_x(340, 300, 340), Direction::Centered);
    assert_eq!(Direction::from_x(341, 300, 340), Direction::Right);
    assert_eq!(Direction::Right.label(), "move right");
    assert_eq!(Direction::Left.label(), "move left");
    assert_eq!(Direction::Centered.label(), "perfect");
}
