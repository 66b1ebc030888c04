//! Cut measurement on a squared-up key.
//!
//! The key span in rows gives a pixels-per-unit scale. Cut rows sit at the
//! profile's calibrated offsets from the bow; the key width at each cut row
//! is matched against a depth table whose bands are the midpoints between
//! neighbouring theoretical widths.

use serde::Serialize;

use crate::error::{EdgeSide, Error};
use crate::key_code::KeyCode;
use crate::profile::DecodeProfile;
use crate::surface::ColorGrid;

use super::config::DecoderConfig;
use super::edge::EdgeLocator;
use super::orientation::RowSpan;

/// Pixels per profile unit along the key.
pub fn key_scale(span: RowSpan, key_length: f64) -> Result<f64, Error> {
    let span_px = span.len() as f64;
    if span_px <= 0.0 || key_length <= 0.0 || !key_length.is_finite() {
        return Err(Error::InvalidScale {
            span_px,
            key_length,
        });
    }
    Ok(span_px / key_length)
}

/// Image row of every cut, nearest pixel.
pub fn cut_rows(profile: &DecodeProfile, span: RowSpan, scale: f64) -> Vec<i64> {
    let first = (profile.bow_to_shoulder_distance + profile.shoulder_to_first_cut) * scale
        + f64::from(span.start);
    let spacing = profile.cylinder_spacing * scale;
    (0..profile.cylinder_count)
        .map(|i| (first + i as f64 * spacing).round() as i64)
        .collect()
}

/// One row of the depth table, bounds in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepthBand {
    pub digit: u8,
    /// Theoretical key width at this depth.
    pub width_px: f64,
    pub low_px: f64,
    pub high_px: f64,
}

impl DepthBand {
    pub fn contains(&self, width: f64) -> bool {
        width >= self.low_px && width <= self.high_px
    }
}

/// Depth table ordered by digit ascending (width descending).
///
/// The first entry is unbounded above, the last is bounded below by zero.
pub fn depth_table(profile: &DecodeProfile, scale: f64) -> Vec<DepthBand> {
    let levels = profile.levels;
    let widths: Vec<(u8, f64)> = levels
        .digits()
        .map(|d| {
            (
                d,
                profile.blade_height - levels.root_depth(d, profile.depth_spacing),
            )
        })
        .collect();

    let n = widths.len();
    widths
        .iter()
        .enumerate()
        .map(|(i, &(digit, width))| {
            let high = if i == 0 {
                f64::INFINITY
            } else {
                (width + widths[i - 1].1) / 2.0
            };
            let low = if i + 1 == n {
                0.0
            } else {
                (width + widths[i + 1].1) / 2.0
            };
            DepthBand {
                digit,
                width_px: width * scale,
                low_px: low * scale,
                high_px: high * scale,
            }
        })
        .collect()
}

/// Digit of the first band containing `width`.
pub fn lookup_digit(table: &[DepthBand], width: i64) -> Option<u8> {
    let w = width as f64;
    table.iter().find(|b| b.contains(w)).map(|b| b.digit)
}

/// Key code plus the measurements behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BittingMeasurement {
    pub code: KeyCode,
    pub key_scale: f64,
    pub cut_rows: Vec<i64>,
    pub widths_px: Vec<i64>,
}

/// Measure every cut and map widths to digits.
pub fn measure_bitting<G: ColorGrid + ?Sized>(
    grid: &G,
    locator: &EdgeLocator,
    profile: &DecodeProfile,
    span: RowSpan,
) -> Result<BittingMeasurement, Error> {
    let scale = key_scale(span, profile.key_length)?;
    let rows = cut_rows(profile, span, scale);
    let table = depth_table(profile, scale);

    let mut widths = Vec::with_capacity(rows.len());
    let mut digits = Vec::with_capacity(rows.len());
    for (cut, &row) in rows.iter().enumerate() {
        let scan_row = u32::try_from(row).map_err(|_| Error::MissingEdge {
            row,
            side: EdgeSide::Left,
        })?;
        let left = locator
            .left_edge(grid, scan_row)
            .ok_or(Error::MissingEdge {
                row,
                side: EdgeSide::Left,
            })?;
        let right = locator
            .right_edge(grid, scan_row)
            .ok_or(Error::MissingEdge {
                row,
                side: EdgeSide::Right,
            })?;
        let width = i64::from(right) - i64::from(left);
        let digit = lookup_digit(&table, width).ok_or(Error::UnmatchedDepth {
            cut,
            width_px: width,
        })?;
        tracing::trace!(cut, row, left, right, width, digit, "cut measured");
        widths.push(width);
        digits.push(digit);
    }

    let code = KeyCode::from_digits(digits)?;
    tracing::debug!(code = %code, scale, "bitting measured");
    Ok(BittingMeasurement {
        code,
        key_scale: scale,
        cut_rows: rows,
        widths_px: widths,
    })
}

/// Reject codes whose numeric value is outside the accepted range.
pub fn check_quality(code: &KeyCode, config: &DecoderConfig) -> Result<(), Error> {
    let value = code.numeric_value();
    if value < u128::from(config.key_code_min) || value > u128::from(config.key_code_max) {
        return Err(Error::CodeOutOfRange {
            code: code.to_string(),
            min: config.key_code_min,
            max: config.key_code_max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::edge::KeyColorBand;
    use crate::key_code::DepthLevels;
    use crate::test_utils::{draw_cut_key, synthetic_decode_profile};
    use approx::assert_abs_diff_eq;

    fn locator() -> EdgeLocator {
        EdgeLocator::new(KeyColorBand::from_background(0.0, 1_000_000.0), 6)
    }

    #[test]
    fn scale_needs_positive_span_and_length() {
        let span = RowSpan { start: 20, end: 180 };
        assert_abs_diff_eq!(key_scale(span, 160.0).expect("scale"), 1.0);
        let flat = RowSpan { start: 50, end: 50 };
        assert!(matches!(
            key_scale(flat, 160.0),
            Err(Error::InvalidScale { .. })
        ));
        assert!(key_scale(span, 0.0).is_err());
    }

    #[test]
    fn cut_rows_follow_profile_offsets() {
        let profile = synthetic_decode_profile();
        let span = RowSpan { start: 20, end: 180 };
        assert_eq!(cut_rows(&profile, span, 1.0), vec![50, 70, 90, 110, 130]);
        // Half scale halves every offset from the first key row.
        assert_eq!(cut_rows(&profile, span, 0.5), vec![35, 45, 55, 65, 75]);
    }

    #[test]
    fn depth_table_bands_are_midpoints() {
        let profile = synthetic_decode_profile();
        let table = depth_table(&profile, 2.0);
        assert_eq!(table.len(), 7);
        assert_eq!(table[0].digit, 1);
        assert_eq!(table[0].high_px, f64::INFINITY);
        assert_abs_diff_eq!(table[0].width_px, 74.0);
        assert_abs_diff_eq!(table[0].low_px, 71.0);
        assert_abs_diff_eq!(table[1].high_px, 71.0);
        assert_eq!(table[6].digit, 7);
        assert_eq!(table[6].low_px, 0.0);
    }

    #[test]
    fn zero_based_levels_shift_one_step() {
        let mut profile = synthetic_decode_profile();
        profile.levels = DepthLevels { first: 0, count: 3 };
        let table = depth_table(&profile, 1.0);
        let digits: Vec<u8> = table.iter().map(|b| b.digit).collect();
        assert_eq!(digits, vec![0, 1, 2]);
        assert_abs_diff_eq!(table[0].width_px, 37.0);
    }

    #[test]
    fn lookup_takes_first_matching_band() {
        let profile = synthetic_decode_profile();
        let table = depth_table(&profile, 2.0);
        assert_eq!(lookup_digit(&table, 500), Some(1));
        // 71 bounds both digit 1 and digit 2; the first wins.
        assert_eq!(lookup_digit(&table, 71), Some(1));
        assert_eq!(lookup_digit(&table, 65), Some(2));
        assert_eq!(lookup_digit(&table, 0), Some(7));
        assert_eq!(lookup_digit(&table, -1), None);
    }

    #[test]
    fn measures_synthetic_key() {
        let profile = synthetic_decode_profile();
        let s = draw_cut_key(&[3, 5, 2, 6, 4]);
        let span = RowSpan { start: 20, end: 180 };
        let m = measure_bitting(&s, &locator(), &profile, span).expect("measure");
        assert_eq!(m.code.to_string(), "35264");
        assert_eq!(m.cut_rows, vec![50, 70, 90, 110, 130]);
        assert_eq!(m.widths_px, vec![31, 25, 34, 22, 28]);
    }

    #[test]
    fn cut_row_outside_image_is_missing_edge() {
        let mut profile = synthetic_decode_profile();
        profile.cylinder_spacing = 60.0;
        let s = draw_cut_key(&[3, 5, 2, 6, 4]);
        let span = RowSpan { start: 20, end: 180 };
        let err = measure_bitting(&s, &locator(), &profile, span).unwrap_err();
        assert!(matches!(err, Error::MissingEdge { .. }));
        assert_eq!(err.kind(), crate::ErrorKind::Measurement);
    }

    #[test]
    fn quality_gate_checks_numeric_range() {
        let cfg = DecoderConfig::default();
        let good: KeyCode = "55555".parse().expect("code");
        let bad: KeyCode = "00000".parse().expect("code");
        assert!(check_quality(&good, &cfg).is_ok());
        let err = check_quality(&bad, &cfg).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Quality);
    }
}
