use std::{cmp::Ordering, collections::VecDeque};

use pcd_core::raster::ElevationRaster;
use serde::{Deserialize, Serialize};

use crate::error::MoundError;

/// A local maximum of the smoothed surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub row: usize,
    pub col: usize,
    pub value: f64,
}

impl Peak {
    fn chebyshev(&self, other: &Peak) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

/// Finds local maxima at or above an absolute threshold.
///
/// A cell is a candidate when it is finite, `>= threshold`, and no finite cell
/// within `min_distance` (square window) is greater. Equal-valued candidates
/// that touch (8-connected) form a plateau reported once, at its first cell in
/// row-major order. Candidates are then accepted greedily, highest first,
/// dropping any within `min_distance` of one already accepted.
///
/// Output is ordered by descending value, ties by ascending `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtremaDetector {
    pub threshold: f64,
    pub min_distance: usize,
    pub exclude_border: bool,
}

impl ExtremaDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            min_distance: 1,
            exclude_border: true,
        }
    }

    pub fn with_min_distance(mut self, min_distance: usize) -> Self {
        self.min_distance = min_distance;
        self
    }

    pub fn with_exclude_border(mut self, exclude_border: bool) -> Self {
        self.exclude_border = exclude_border;
        self
    }

    pub fn validate(&self) -> Result<(), MoundError> {
        if self.threshold.is_nan() {
            return Err(MoundError::InvalidConfig("threshold is NaN".into()));
        }
        if self.min_distance == 0 {
            return Err(MoundError::InvalidConfig(
                "min_distance must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn detect(&self, raster: &ElevationRaster) -> Result<Vec<Peak>, MoundError> {
        self.validate()?;
        let (nrow, ncol) = (raster.nrow(), raster.ncol());
        let margin = if self.exclude_border { self.min_distance } else { 0 };
        if nrow <= margin.saturating_mul(2) || ncol <= margin.saturating_mul(2) {
            return Ok(Vec::new());
        }

        let mut candidate = vec![false; nrow * ncol];
        for r in margin..nrow - margin {
            for c in margin..ncol - margin {
                candidate[r * ncol + c] = self.is_candidate(raster, r, c);
            }
        }

        let mut peaks = plateau_representatives(raster, &candidate);
        peaks.sort_by(descending_value);

        let mut accepted: Vec<Peak> = Vec::with_capacity(peaks.len());
        for peak in peaks {
            if accepted
                .iter()
                .all(|kept| kept.chebyshev(&peak) > self.min_distance)
            {
                accepted.push(peak);
            }
        }

        log::debug!(
            "{} peaks >= {} (min_distance {}, exclude_border {})",
            accepted.len(),
            self.threshold,
            self.min_distance,
            self.exclude_border
        );
        Ok(accepted)
    }

    fn is_candidate(&self, raster: &ElevationRaster, r: usize, c: usize) -> bool {
        let v = raster[(r, c)];
        if !v.is_finite() || v < self.threshold {
            return false;
        }
        let d = self.min_distance;
        let rows = r.saturating_sub(d)..=r.saturating_add(d).min(raster.nrow() - 1);
        for rr in rows {
            let cols = c.saturating_sub(d)..=c.saturating_add(d).min(raster.ncol() - 1);
            for cc in cols {
                let n = raster[(rr, cc)];
                if n.is_finite() && n > v {
                    return false;
                }
            }
        }
        true
    }
}

/// Collapses 8-connected equal-valued candidates to their first cell.
fn plateau_representatives(raster: &ElevationRaster, candidate: &[bool]) -> Vec<Peak> {
    let (nrow, ncol) = (raster.nrow(), raster.ncol());
    let mut visited = vec![false; candidate.len()];
    let mut peaks = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..candidate.len() {
        if !candidate[start] || visited[start] {
            continue;
        }
        let value = raster.data()[start];
        peaks.push(Peak {
            row: start / ncol,
            col: start % ncol,
            value,
        });

        visited[start] = true;
        queue.push_back(start);
        while let Some(i) = queue.pop_front() {
            let (r, c) = (i / ncol, i % ncol);
            for rr in r.saturating_sub(1)..=(r + 1).min(nrow - 1) {
                for cc in c.saturating_sub(1)..=(c + 1).min(ncol - 1) {
                    let j = rr * ncol + cc;
                    if candidate[j] && !visited[j] && raster.data()[j] == value {
                        visited[j] = true;
                        queue.push_back(j);
                    }
                }
            }
        }
    }
    peaks
}

fn descending_value(a: &Peak, b: &Peak) -> Ordering {
    b.value
        .total_cmp(&a.value)
        .then(a.row.cmp(&b.row))
        .then(a.col.cmp(&b.col))
}
