//! Shared fixtures for image-based and mesh unit tests.

use std::ops::Range;

use crate::key_code::DepthLevels;
use crate::profile::{CutProfile, DecodeProfile, KeyProfile};
use crate::surface::KeySurface;

/// Mid-grey key colour, well inside the band for a black background.
pub(crate) const KEY_COLOR: u32 = 0xC0_C0_C0;

/// Render a rectangular key bar on a uniform background.
pub(crate) fn draw_key_bar(
    w: u32,
    h: u32,
    bg: u32,
    cols: Range<u32>,
    rows: Range<u32>,
) -> KeySurface {
    let mut s = KeySurface::filled(w, h, bg);
    fill_rect(&mut s, cols, rows, KEY_COLOR);
    s
}

fn fill_rect(s: &mut KeySurface, cols: Range<u32>, rows: Range<u32>, color: u32) {
    for y in rows {
        for x in cols.clone() {
            s.set_color(x, y, color);
        }
    }
}

/// One pixel per profile unit for a 160-row key on a 200-row photo.
pub(crate) fn synthetic_decode_profile() -> DecodeProfile {
    DecodeProfile {
        key_length: 160.0,
        shoulder_to_first_cut: 10.0,
        cylinder_spacing: 20.0,
        cylinder_count: 5,
        bow_to_shoulder_distance: 20.0,
        depth_spacing: 3.0,
        blade_height: 40.0,
        levels: DepthLevels { first: 1, count: 7 },
    }
}

/// Upright key drawn for [`synthetic_decode_profile`].
///
/// 60x200 photo, black background, key on rows 20..180 starting at column 10
/// and 38 px wide. Cut `i` narrows rows `50 + 20 i ± 3` to `40 - 3 d` px. A
/// 44 px bulge on rows 80..=86 puts the widest boundary sample in the top
/// half so the key decodes without a flip.
pub(crate) fn draw_cut_key(digits: &[u8]) -> KeySurface {
    let mut s = draw_key_bar(60, 200, 0, 10..49, 20..180);
    for (i, &d) in digits.iter().enumerate() {
        let row = 50 + 20 * i as u32;
        let right = 10 + 40 - 3 * u32::from(d);
        fill_rect(&mut s, 10..60, row - 3..row + 4, 0);
        fill_rect(&mut s, 10..right + 1, row - 3..row + 4, KEY_COLOR);
    }
    fill_rect(&mut s, 10..55, 80..87, KEY_COLOR);
    s
}

pub(crate) fn synthetic_profile() -> KeyProfile {
    KeyProfile::from_json_str(crate::profile::tests::KW1_JSON).expect("fixture profile")
}

pub(crate) fn synthetic_cut_profile() -> CutProfile {
    synthetic_profile().cut_profile(None)
}
