use crate::background::BackgroundStats;
use crate::decoder::bitting::{check_quality, measure_bitting};
use crate::decoder::orientation::{
    collect_boundary_points, furthest_point_pair, key_angle_deg, locate_row_span,
    needs_vertical_flip, rotation_needed,
};
use crate::decoder::{DecoderConfig, EdgeLocator};
use crate::error::Error;
use crate::profile::DecodeProfile;
use crate::surface::{ColorGrid, KeySurface};

use super::DecodeReport;

/// Run the full decode cycle on a request-owned surface.
///
/// Returns the report together with the normalized surface.
pub(crate) fn decode_surface(
    surface: KeySurface,
    stats: &BackgroundStats,
    profile: &DecodeProfile,
    config: &DecoderConfig,
) -> Result<(DecodeReport, KeySurface), Error> {
    config.validate()?;
    tracing::info!(
        width = surface.width(),
        height = surface.height(),
        "decoding key photo"
    );

    // Pass 1: principal axis on the photo as taken.
    let locator = EdgeLocator::calibrate(&surface, stats, config);
    let span = locate_row_span(&surface, &locator)?;
    let points = collect_boundary_points(&surface, &locator, span);
    let (a, b) = furthest_point_pair(&points.merged())?;
    let angle = key_angle_deg(&a, &b);
    let rotation = rotation_needed(angle)?;
    tracing::info!(
        angle_deg = angle,
        rotation_deg = rotation,
        "key axis measured"
    );

    let mut surface = surface.rotated(rotation, stats.fill_color());

    // Pass 2: the span moves once the surface is turned.
    let locator = EdgeLocator::calibrate(&surface, stats, config);
    let span = locate_row_span(&surface, &locator)?;
    let points = collect_boundary_points(&surface, &locator, span);
    let mirrored = needs_vertical_flip(&points);

    let (locator, span) = if mirrored {
        surface.flip_vertical();
        let locator = EdgeLocator::calibrate(&surface, stats, config);
        let span = locate_row_span(&surface, &locator)?;
        (locator, span)
    } else {
        (locator, span)
    };
    tracing::info!(
        mirrored,
        start = span.start,
        end = span.end,
        "key squared up"
    );

    let measurement = measure_bitting(&surface, &locator, profile, span)?;
    check_quality(&measurement.code, config)?;
    tracing::info!(code = %measurement.code, "key decoded");

    let report = DecodeReport {
        code: measurement.code,
        key_angle_deg: angle,
        rotation_deg: rotation,
        mirrored,
        row_span: span,
        key_scale: measurement.key_scale,
        cut_rows: measurement.cut_rows,
        widths_px: measurement.widths_px,
        image_size: [surface.width(), surface.height()],
    };
    Ok((report, surface))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::synthetic_decode_profile;

    #[test]
    fn blank_photo_fails_with_geometry_error() {
        let surface = KeySurface::filled(80, 120, 0);
        let stats = BackgroundStats::uniform(0);
        let err = decode_surface(
            surface,
            &stats,
            &synthetic_decode_profile(),
            &DecoderConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, Error::KeyNotFound);
    }

    #[test]
    fn invalid_config_is_rejected_before_scanning() {
        let surface = KeySurface::filled(80, 120, 0);
        let stats = BackgroundStats::uniform(0);
        let config = DecoderConfig {
            sample_amount: 0.0,
            ..Default::default()
        };
        let err =
            decode_surface(surface, &stats, &synthetic_decode_profile(), &config).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }
}
