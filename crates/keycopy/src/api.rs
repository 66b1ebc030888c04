//! High-level decode API.
//!
//! [`KeyDecoder`] is the entry point for reading a bitting code off a key
//! photo. It pairs a [`DecodeProfile`] with a [`DecoderConfig`]; create it
//! once per key blank and decode many photos.
//!
//! # Examples
//!
//! ```no_run
//! use keycopy::{BackgroundConfig, KeyDecoder, KeySurface};
//! use std::path::Path;
//!
//! let decoder = KeyDecoder::from_profile_json_file(Path::new("profiles/kw1.json")).unwrap();
//! let photo = KeySurface::open(Path::new("key.jpg")).unwrap();
//! let report = decoder.decode_photo(photo, &BackgroundConfig::default()).unwrap();
//! println!("code {}", report.code);
//! ```

use std::path::Path;

use crate::background::{normalize_background, BackgroundConfig, BackgroundStats};
use crate::decoder::DecoderConfig;
use crate::error::Error;
use crate::pipeline::{self, DecodeReport};
use crate::profile::{DecodeProfile, KeyProfile};
use crate::surface::KeySurface;

/// Primary decode interface.
#[derive(Debug, Clone)]
pub struct KeyDecoder {
    profile: DecodeProfile,
    config: DecoderConfig,
}

impl KeyDecoder {
    pub fn new(profile: DecodeProfile, config: DecoderConfig) -> Self {
        Self { profile, config }
    }

    /// Load a key blank profile and decode with default tunables.
    pub fn from_profile_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let profile = KeyProfile::from_json_file(path)?;
        Ok(Self::new(profile.decode_profile(), DecoderConfig::default()))
    }

    pub fn profile(&self) -> &DecodeProfile {
        &self.profile
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut DecoderConfig {
        &mut self.config
    }

    /// Decode a surface whose background has already been surveyed.
    pub fn decode(&self, surface: KeySurface, stats: &BackgroundStats) -> Result<DecodeReport, Error> {
        self.decode_keep_surface(surface, stats).map(|(report, _)| report)
    }

    /// Decode and hand back the rotated, possibly flipped surface the cuts
    /// were measured on.
    pub fn decode_keep_surface(
        &self,
        surface: KeySurface,
        stats: &BackgroundStats,
    ) -> Result<(DecodeReport, KeySurface), Error> {
        pipeline::decode_surface(surface, stats, &self.profile, &self.config)
    }

    /// Normalize the photo background, then decode.
    pub fn decode_photo(
        &self,
        photo: KeySurface,
        background: &BackgroundConfig,
    ) -> Result<DecodeReport, Error> {
        let (surface, stats) = normalize_background(photo, background)?;
        self.decode(surface, &stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{draw_cut_key, synthetic_decode_profile};
    use approx::assert_abs_diff_eq;

    fn decoder() -> KeyDecoder {
        KeyDecoder::new(synthetic_decode_profile(), DecoderConfig::default())
    }

    #[test]
    fn upright_key_decodes_without_turning() {
        let report = decoder()
            .decode(draw_cut_key(&[3, 5, 2, 6, 4]), &BackgroundStats::uniform(0))
            .expect("decode");
        assert_eq!(report.code.to_string(), "35264");
        assert!(!report.mirrored);
        assert_eq!(report.rotation_deg, 0.0);
        assert_eq!(report.cut_rows, vec![50, 70, 90, 110, 130]);
        assert_eq!(report.image_size, [60, 200]);
    }

    #[test]
    fn upside_down_key_is_flipped_back() {
        let mut photo = draw_cut_key(&[3, 5, 2, 6, 4]);
        photo.flip_vertical();
        let report = decoder()
            .decode(photo, &BackgroundStats::uniform(0))
            .expect("decode");
        assert!(report.mirrored);
        assert_eq!(report.code.to_string(), "35264");
    }

    #[test]
    fn tilted_key_is_turned_upright_and_decoded() {
        let photo = draw_cut_key(&[3, 5, 2, 6, 4]).rotated(-5.0, 0);
        let report = decoder()
            .decode(photo, &BackgroundStats::uniform(0))
            .expect("decode");
        assert_eq!(report.code.to_string(), "35264");
        assert_abs_diff_eq!(report.key_angle_deg, 273.55, epsilon = 0.01);
        assert_abs_diff_eq!(report.rotation_deg, 176.45, epsilon = 0.01);
        assert!(report.mirrored);
    }

    #[test]
    fn quarter_turned_key_is_read_along_a_skewed_axis() {
        // On a horizontal bar the extreme points pair a corner with the far
        // side of the opposite edge, so the axis is read about 14 degrees
        // off and the cut rows miss the cuts. The misread code still passes
        // the default range gate.
        let photo = draw_cut_key(&[3, 5, 2, 6, 4]).rotated(90.0, 0);
        let report = decoder()
            .decode(photo, &BackgroundStats::uniform(0))
            .expect("decode");
        assert_abs_diff_eq!(report.key_angle_deg, 346.22, epsilon = 0.01);
        assert_abs_diff_eq!(report.rotation_deg, 103.78, epsilon = 0.01);
        assert!(report.mirrored);
        assert_eq!(report.code.to_string(), "11164");
    }

    #[test]
    fn background_survey_feeds_the_decoder() {
        let report = decoder()
            .decode_photo(draw_cut_key(&[1, 2, 3, 4, 5]), &BackgroundConfig::default())
            .expect("decode");
        assert_eq!(report.code.to_string(), "12345");
    }

    #[test]
    fn blank_photo_has_no_key() {
        let err = decoder()
            .decode(KeySurface::filled(60, 200, 0), &BackgroundStats::uniform(0))
            .unwrap_err();
        assert_eq!(err, Error::KeyNotFound);
        assert_eq!(err.kind(), crate::ErrorKind::Geometry);
    }

    #[test]
    fn out_of_range_code_is_rejected() {
        let mut decoder = decoder();
        decoder.config_mut().key_code_max = 20_000;
        let err = decoder
            .decode(draw_cut_key(&[3, 5, 2, 6, 4]), &BackgroundStats::uniform(0))
            .unwrap_err();
        assert!(matches!(err, Error::CodeOutOfRange { .. }));
    }
}
