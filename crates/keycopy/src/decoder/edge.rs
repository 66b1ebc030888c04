//! Per-row key edge location.
//!
//! A row is scanned left to right. The first column whose colour lies strictly
//! inside the key-colour band is a candidate; it is accepted unless the next
//! `noise_range` columns contain a run of at least `noise_range / 2`
//! non-key samples. A rejected candidate does not stop the scan: the next
//! column is tried as a fresh candidate.

use crate::background::BackgroundStats;
use crate::surface::{ColorGrid, MirrorH, COLOR_MAX, SPECTRUM_MID};

use super::config::DecoderConfig;

/// Packed-colour interval that counts as key, not background.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct KeyColorBand {
    pub low: f64,
    pub high: f64,
}

impl KeyColorBand {
    /// Half of the spectrum away from the background, inset by `threshold`
    /// on the side next to the background.
    pub fn from_background(background_avg: f64, threshold: f64) -> Self {
        let max = f64::from(COLOR_MAX);
        if background_avg < f64::from(SPECTRUM_MID) {
            Self {
                low: background_avg + threshold,
                high: max - threshold,
            }
        } else {
            Self {
                low: threshold,
                high: background_avg - threshold,
            }
        }
    }

    /// Candidate test: strictly inside the band.
    #[inline]
    pub fn admits(&self, color: u32) -> bool {
        let c = f64::from(color);
        c > self.low && c < self.high
    }

    /// Noise/sampling test: inside the band, bounds included.
    #[inline]
    pub fn covers(&self, color: u32) -> bool {
        let c = f64::from(color);
        c >= self.low && c <= self.high
    }
}

/// Share of a coarse sampling grid that falls inside `band`.
///
/// The grid starts at `(1, 1)` and steps by `width / cols` in both
/// directions, with `cols = max(width * sample_amount, min_col_sample_count)`.
pub fn key_color_fraction<G: ColorGrid + ?Sized>(
    grid: &G,
    band: &KeyColorBand,
    config: &DecoderConfig,
) -> f64 {
    let (w, h) = (grid.width(), grid.height());
    let cols = ((f64::from(w) * config.sample_amount).floor() as u32)
        .max(config.min_col_sample_count)
        .max(1);
    let step = (w / cols).max(1) as usize;

    let mut total = 0usize;
    let mut key = 0usize;
    for x in (1..w).step_by(step) {
        for y in (1..h).step_by(step) {
            total += 1;
            if band.covers(grid.color(x, y)) {
                key += 1;
            }
        }
    }

    if total == 0 {
        0.0
    } else {
        key as f64 / total as f64
    }
}

/// Width of the noise-check window.
pub fn noise_range(width: u32, key_fraction: f64, noise_scale: f64) -> usize {
    (f64::from(width) * key_fraction * noise_scale).round().max(0.0) as usize
}

/// Key edge scanner for one analysis pass.
///
/// Band and noise window are fixed at construction; rebuild after the
/// surface is rotated or replaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeLocator {
    band: KeyColorBand,
    noise_range: usize,
}

impl EdgeLocator {
    pub fn new(band: KeyColorBand, noise_range: usize) -> Self {
        Self { band, noise_range }
    }

    /// Derive band and noise window from a surface and its background stats.
    pub fn calibrate<G: ColorGrid + ?Sized>(
        grid: &G,
        stats: &BackgroundStats,
        config: &DecoderConfig,
    ) -> Self {
        let band = KeyColorBand::from_background(
            stats.meta.avg_averages,
            config.background_color_threshold,
        );
        let fraction = key_color_fraction(grid, &band, config);
        let range = noise_range(grid.width(), fraction, config.noise_scale);
        tracing::debug!(
            band_low = band.low,
            band_high = band.high,
            key_fraction = fraction,
            noise_range = range,
            "edge locator calibrated"
        );
        Self::new(band, range)
    }

    pub fn band(&self) -> &KeyColorBand {
        &self.band
    }

    pub fn noise_range(&self) -> usize {
        self.noise_range
    }

    /// First accepted key column in `row`, or `None` when the row holds no
    /// key (including rows outside the grid).
    pub fn left_edge<G: ColorGrid + ?Sized>(&self, grid: &G, row: u32) -> Option<u32> {
        if row >= grid.height() {
            return None;
        }
        (0..grid.width())
            .find(|&col| self.band.admits(grid.color(col, row)) && !self.is_noise(grid, col, row))
    }

    /// Last key column in `row`, found by scanning the mirrored row.
    pub fn right_edge<G: ColorGrid + ?Sized>(&self, grid: &G, row: u32) -> Option<u32> {
        let w = grid.width();
        self.left_edge(&MirrorH(grid), row).map(|col| w - 1 - col)
    }

    pub fn row_has_key<G: ColorGrid + ?Sized>(&self, grid: &G, row: u32) -> bool {
        self.left_edge(grid, row).is_some()
    }

    fn is_noise<G: ColorGrid + ?Sized>(&self, grid: &G, col: u32, row: u32) -> bool {
        let threshold = self.noise_range as f64 / 2.0;
        let mut run = 0usize;
        for i in 0..self.noise_range {
            // Past the right border reads as background.
            let is_key = grid
                .color_checked(i64::from(col) + i as i64, i64::from(row))
                .is_some_and(|c| self.band.covers(c));
            if is_key {
                run = 0;
            } else {
                run += 1;
                if run as f64 >= threshold {
                    return true;
                }
            }
        }
        false
    }
}
