//! Silhouette geometry used to square up a photographed key.
//!
//! The key is assumed to occupy one contiguous vertical band of rows. Its
//! first and last rows come from a binary search, the outline from ~24
//! sampled rows, and the principal axis from the furthest pair among four
//! extreme outline points. That is a cheap hull stand-in which is good
//! enough for near-rectangular silhouettes.

use serde::Serialize;

use crate::error::Error;
use crate::surface::{ColorGrid, MirrorV};

use super::edge::EdgeLocator;

/// Number of evenly spaced rows sampled across the key span.
pub const BOUNDARY_SAMPLES: f64 = 24.0;

/// First key row and one past the last key row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowSpan {
    pub start: u32,
    pub end: u32,
}

impl RowSpan {
    pub fn len(&self) -> i64 {
        i64::from(self.end) - i64::from(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }
}

/// Outline point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgePoint {
    pub row: u32,
    pub col: u32,
}

impl EdgePoint {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    pub fn distance(&self, other: &EdgePoint) -> f64 {
        let dr = f64::from(other.row) - f64::from(self.row);
        let dc = f64::from(other.col) - f64::from(self.col);
        dr.hypot(dc)
    }
}

/// Left and right outline samples, in scan order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoundaryPoints {
    pub left: Vec<EdgePoint>,
    pub right: Vec<EdgePoint>,
}

impl BoundaryPoints {
    /// Left points followed by right points.
    pub fn merged(&self) -> Vec<EdgePoint> {
        self.left.iter().chain(self.right.iter()).copied().collect()
    }

    /// Key width at every row sampled on both sides, in left-point order.
    pub fn row_widths(&self) -> Vec<f64> {
        let mut widths = Vec::new();
        for l in &self.left {
            for r in self.right.iter().filter(|r| r.row == l.row) {
                widths.push(l.distance(r));
            }
        }
        widths
    }
}

/// Binary search for the first row where `hits` reports key pixels.
///
/// The interval starts at `[2, round(height / 2)]` and shrinks strictly on
/// every probe, so at most `O(log height)` rows are tested. Returns `None`
/// when no probe ever hit.
pub fn first_key_row(height: u32, mut hits: impl FnMut(u32) -> bool) -> Option<u32> {
    let mut start: i64 = 2;
    let mut end: i64 = half_round(i64::from(height));
    let mut probe: i64 = half_round(end);
    let mut hit_any = false;

    loop {
        let hit = probe >= 0 && probe < i64::from(height) && hits(probe as u32);
        if hit {
            hit_any = true;
            end = probe;
        } else {
            start = probe;
        }
        probe = start + half_round(end - start);
        if end - start < 2 {
            break;
        }
    }

    tracing::trace!(probe, hit_any, "first key row search finished");
    if hit_any {
        u32::try_from(probe).ok()
    } else {
        None
    }
}

fn half_round(v: i64) -> i64 {
    (v as f64 / 2.0).round() as i64
}

/// First key row and one past the last, searched on the grid and on its
/// vertical mirror.
pub fn locate_row_span<G: ColorGrid + ?Sized>(
    grid: &G,
    locator: &EdgeLocator,
) -> Result<RowSpan, Error> {
    let h = grid.height();
    let start =
        first_key_row(h, |row| locator.row_has_key(grid, row)).ok_or(Error::KeyNotFound)?;
    let flipped = MirrorV(grid);
    let from_bottom =
        first_key_row(h, |row| locator.row_has_key(&flipped, row)).ok_or(Error::KeyNotFound)?;
    let span = RowSpan {
        start,
        end: h.saturating_sub(from_bottom),
    };
    tracing::debug!(start = span.start, end = span.end, "key row span");
    Ok(span)
}

/// Sample the outline on both sides across `span`.
///
/// Rows are `start`, every `max(1, round(len / 24))` rows from `start + 1`
/// through `end + step`, and a closing point at `end` using the edge of row
/// `end - 1`. Rows without an edge are skipped.
pub fn collect_boundary_points<G: ColorGrid + ?Sized>(
    grid: &G,
    locator: &EdgeLocator,
    span: RowSpan,
) -> BoundaryPoints {
    let step = ((span.len() as f64 / BOUNDARY_SAMPLES).round() as i64).max(1);
    let mut rows: Vec<(u32, u32)> = Vec::new();
    rows.push((span.start, span.start));
    let mut row = i64::from(span.start) + 1;
    let last = i64::from(span.end) + step;
    while row <= last {
        if let Ok(r) = u32::try_from(row) {
            rows.push((r, r));
        }
        row += step;
    }
    if span.end > 0 {
        rows.push((span.end, span.end - 1));
    }

    let mut points = BoundaryPoints::default();
    for (label_row, scan_row) in rows {
        if let Some(col) = locator.left_edge(grid, scan_row) {
            points.left.push(EdgePoint::new(label_row, col));
        }
        if let Some(col) = locator.right_edge(grid, scan_row) {
            points.right.push(EdgePoint::new(label_row, col));
        }
    }
    tracing::trace!(
        left = points.left.len(),
        right = points.right.len(),
        step,
        "boundary points collected"
    );
    points
}

/// Furthest pair among the max-row, max-col, min-row and min-col points.
///
/// Extremes keep the first point reaching them. Pairs are compared in the
/// order AB, AC, AD, BC, BD, CD and only a strictly larger distance replaces
/// the current best.
///
/// Each pair runs from an earlier extreme to a later one, so its direction
/// never falls strictly inside `(0, 90)` degrees. The first-quadrant branch
/// of [`rotation_needed`] is reached only by pairs built by hand.
pub fn furthest_point_pair(points: &[EdgePoint]) -> Result<(EdgePoint, EdgePoint), Error> {
    let first = *points.first().ok_or(Error::DegenerateSilhouette)?;
    let (mut max_row, mut max_col, mut min_row, mut min_col) = (first, first, first, first);
    for &p in points {
        if p.row > max_row.row {
            max_row = p;
        }
        if p.col > max_col.col {
            max_col = p;
        }
        if p.row < min_row.row {
            min_row = p;
        }
        if p.col < min_col.col {
            min_col = p;
        }
    }

    let extremes = [max_row, max_col, min_row, min_col];
    let mut best: Option<(EdgePoint, EdgePoint)> = None;
    let mut best_dist = 0.0;
    for i in 0..extremes.len() {
        for j in (i + 1)..extremes.len() {
            let d = extremes[i].distance(&extremes[j]);
            if d > best_dist {
                best_dist = d;
                best = Some((extremes[i], extremes[j]));
            }
        }
    }
    best.ok_or(Error::DegenerateSilhouette)
}

/// Direction from `a` to `b` in degrees, `atan2(d_row, d_col)` in `[0, 360)`.
pub fn key_angle_deg(a: &EdgePoint, b: &EdgePoint) -> f64 {
    let dr = f64::from(b.row) - f64::from(a.row);
    let dc = f64::from(b.col) - f64::from(a.col);
    let angle = dr.atan2(dc).to_degrees();
    if angle < 0.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// Turn that brings an axis at `angle_deg` to vertical.
pub fn rotation_needed(angle_deg: f64) -> Result<f64, Error> {
    let a = angle_deg;
    if a > 0.0 && a <= 90.0 {
        Ok(90.0 - a)
    } else if a > 90.0 && a <= 270.0 {
        Ok(270.0 - a)
    } else if a > 270.0 && a <= 360.0 {
        Ok(360.0 - a + 90.0)
    } else {
        Err(Error::AngleUndetermined { angle_deg: a })
    }
}

/// The widest sampled row marks the shoulder. Flip when it falls in the
/// second half of the samples.
pub fn needs_vertical_flip(points: &BoundaryPoints) -> bool {
    let widths = points.row_widths();
    let mut widest: Option<usize> = None;
    let mut widest_width = 0.0;
    for (i, &w) in widths.iter().enumerate() {
        if w > widest_width {
            widest_width = w;
            widest = Some(i);
        }
    }
    match widest {
        Some(i) => i as f64 >= widths.len() as f64 / 2.0,
        None => false,
    }
}
