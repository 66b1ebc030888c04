//! Background survey and brightness normalization.
//!
//! The decoder expects a photo whose border is one solid colour. The survey
//! samples the border rows/columns and the middle row; normalization pushes
//! the brightness toward the nearer end of the spectrum until the border
//! reads as uniform while the middle row still shows the key.

use crate::error::Error;
use crate::surface::{ColorGrid, KeySurface, SPECTRUM_MID};

/// Direction in which brightness is pushed to flatten the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContrastDirection {
    /// Background is in the dark half; push toward black.
    Darken,
    /// Background is in the bright half; push toward white.
    Brighten,
}

impl ContrastDirection {
    pub fn from_average(avg: f64) -> Self {
        if avg < f64::from(SPECTRUM_MID) {
            Self::Darken
        } else {
            Self::Brighten
        }
    }
}

/// One value per sampled region.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct RegionValues {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    pub middle: f64,
}

impl RegionValues {
    fn edges(&self) -> [f64; 4] {
        [self.top, self.bottom, self.left, self.right]
    }
}

/// Derived summary over the four border regions.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BackgroundMeta {
    pub contrast: ContrastDirection,
    /// Mean of the four border averages.
    pub avg_averages: f64,
    pub std_averages: f64,
    /// Mean of the four border standard deviations.
    pub avg_std_devs: f64,
    pub std_std_devs: f64,
}

/// Region statistics consumed read-only by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BackgroundStats {
    pub averages: RegionValues,
    pub std_devs: RegionValues,
    pub meta: BackgroundMeta,
}

impl BackgroundStats {
    /// Stats for a perfectly uniform background of `color` around a key.
    ///
    /// Handy when the caller already knows the background, e.g. a scanner
    /// bed or a synthetic render.
    pub fn uniform(color: u32) -> Self {
        let c = f64::from(color);
        let averages = RegionValues {
            top: c,
            bottom: c,
            left: c,
            right: c,
            middle: c,
        };
        Self {
            averages,
            std_devs: RegionValues::default(),
            meta: BackgroundMeta {
                contrast: ContrastDirection::from_average(c),
                avg_averages: c,
                std_averages: 0.0,
                avg_std_devs: 0.0,
                std_std_devs: 0.0,
            },
        }
    }

    /// Sample row 2, row `h - 2`, column 2, column `w - 2` and the middle row.
    ///
    /// Requires at least 5x5 pixels.
    pub fn survey<G: ColorGrid + ?Sized>(grid: &G) -> Result<Self, Error> {
        let (w, h) = (grid.width(), grid.height());
        if w < MIN_SURVEY_SIDE || h < MIN_SURVEY_SIDE {
            return Err(Error::validation(
                "surface",
                format!(
                    "{}x{} is too small to survey (need {}x{})",
                    w, h, MIN_SURVEY_SIDE, MIN_SURVEY_SIDE
                ),
            ));
        }

        let middle_row = ((f64::from(h) / 2.0).round() as u32).min(h - 1);
        let top = sample_row(grid, 2);
        let bottom = sample_row(grid, h - 2);
        let left = sample_col(grid, 2);
        let right = sample_col(grid, w - 2);
        let middle = sample_row(grid, middle_row);

        let averages = RegionValues {
            top: mean(&top),
            bottom: mean(&bottom),
            left: mean(&left),
            right: mean(&right),
            middle: mean(&middle),
        };
        let std_devs = RegionValues {
            top: sample_std_dev(&top),
            bottom: sample_std_dev(&bottom),
            left: sample_std_dev(&left),
            right: sample_std_dev(&right),
            middle: sample_std_dev(&middle),
        };

        let edge_avgs = averages.edges();
        let edge_stds = std_devs.edges();
        let avg_averages = mean(&edge_avgs);
        let meta = BackgroundMeta {
            contrast: ContrastDirection::from_average(avg_averages),
            avg_averages,
            std_averages: sample_std_dev(&edge_avgs),
            avg_std_devs: mean(&edge_stds),
            std_std_devs: sample_std_dev(&edge_stds),
        };

        Ok(Self {
            averages,
            std_devs,
            meta,
        })
    }

    /// Border reads as one colour while the middle row still varies.
    pub fn is_uniform(&self) -> bool {
        self.meta.avg_std_devs == 0.0 && self.std_devs.middle != 0.0
    }

    /// Packed colour of the top border, used to fill rotated corners.
    pub fn fill_color(&self) -> u32 {
        self.averages
            .top
            .round()
            .clamp(0.0, f64::from(crate::surface::COLOR_MAX)) as u32
    }
}

const MIN_SURVEY_SIDE: u32 = 5;

/// Brightness normalization controls.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Per-channel brightness step applied on each pass.
    pub contrast_step: i32,
    /// Adjustments allowed before giving up.
    pub max_passes: usize,
}

impl BackgroundConfig {
    pub const DEFAULT_CONTRAST_STEP: i32 = 20;
    pub const DEFAULT_MAX_PASSES: usize = 15;

    pub fn validate(&self) -> Result<(), Error> {
        if self.contrast_step <= 0 || self.contrast_step > 255 {
            return Err(Error::validation(
                "background.contrast_step",
                "must be in 1..=255",
            ));
        }
        if self.max_passes == 0 {
            return Err(Error::validation("background.max_passes", "must be >= 1"));
        }
        Ok(())
    }
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            contrast_step: Self::DEFAULT_CONTRAST_STEP,
            max_passes: Self::DEFAULT_MAX_PASSES,
        }
    }
}

/// Push brightness until the border is uniform.
///
/// Returns the adjusted surface together with the stats of its final survey.
pub fn normalize_background(
    mut surface: KeySurface,
    config: &BackgroundConfig,
) -> Result<(KeySurface, BackgroundStats), Error> {
    config.validate()?;

    let mut passes = 0usize;
    loop {
        let stats = BackgroundStats::survey(&surface)?;
        if stats.is_uniform() {
            tracing::debug!(
                passes,
                avg_averages = stats.meta.avg_averages,
                contrast = ?stats.meta.contrast,
                "background normalized"
            );
            return Ok((surface, stats));
        }

        let step = match stats.meta.contrast {
            ContrastDirection::Darken => -config.contrast_step,
            ContrastDirection::Brighten => config.contrast_step,
        };
        tracing::trace!(
            pass = passes,
            step,
            avg_std_devs = stats.meta.avg_std_devs,
            "adjusting brightness"
        );
        let adjusted = image::imageops::brighten(surface.as_image(), step);
        *surface.as_image_mut() = adjusted;
        passes += 1;

        if passes >= config.max_passes {
            tracing::warn!(passes, "background did not settle");
            return Err(Error::BackgroundNotUniform { passes });
        }
    }
}

fn sample_row<G: ColorGrid + ?Sized>(grid: &G, row: u32) -> Vec<f64> {
    (0..grid.width())
        .map(|x| f64::from(grid.color(x, row)))
        .collect()
}

fn sample_col<G: ColorGrid + ?Sized>(grid: &G, col: u32) -> Vec<f64> {
    (0..grid.height())
        .map(|y| f64::from(grid.color(col, y)))
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with the n-1 denominator.
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}
