use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use keycopy::decoder::{EdgeLocator, KeyColorBand};
use keycopy::{
    pack_rgb, BackgroundStats, BladeBuilder, DecodeProfile, DecoderConfig, DepthLevels, KeyCode,
    KeyDecoder, KeyProfile, KeySurface,
};

const KEY_GREY: u8 = 0xC0;

const PROFILE_JSON: &str = r#"{
    "id": 7,
    "profileName": "bench-blank",
    "landingWidth": 1.0,
    "shoulderToFirstCut": 6.0,
    "cylinderSpacing": 3.8,
    "depthSpacing": 0.58,
    "depthLevels": 7,
    "depthFirstLevel": 1,
    "bladeHeight": 8.5,
    "bladeLowerHeight": 3.9,
    "bladeUpperOriginY": 0.0,
    "bladeUpperOriginX": 0.0,
    "bladeUpperOriginZ": 0.0,
    "bladeWidth": 2.0,
    "bladeTipLength": 3.0,
    "betweenLandingAngle": 1.0,
    "minimumAdjacentCutSpecification": 4,
    "shaftPath": "shafts/bench.stl",
    "keyLength": 56.0,
    "bowToShoulderDistance": 27.5,
    "cylinderCount": 6
}"#;

/// Upright key with random edge jitter and sensor noise on a dark background.
fn make_key_photo(width: u32, height: u32, seed: u64) -> KeySurface {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut surface = KeySurface::filled(width, height, 0);
    let left = width / 6;
    let nominal = width / 2;
    let (top, bottom) = (height / 10, height - height / 10);

    for y in 0..height {
        let in_key = (top..bottom).contains(&y);
        let jitter: i32 = rng.gen_range(-2..=2);
        let right = (left + nominal).saturating_add_signed(jitter);
        for x in 0..width {
            let px = if in_key && x >= left && x <= right {
                let n: i16 = rng.gen_range(-6..=6);
                (i16::from(KEY_GREY) + n) as u8
            } else {
                rng.gen_range(0..4u8)
            };
            surface.set_color(x, y, pack_rgb(image::Rgb([px, px, px])));
        }
    }
    surface
}

fn decode_profile() -> DecodeProfile {
    DecodeProfile {
        key_length: 56.0,
        shoulder_to_first_cut: 6.0,
        cylinder_spacing: 3.8,
        cylinder_count: 6,
        bow_to_shoulder_distance: 27.5,
        depth_spacing: 0.58,
        blade_height: 8.5,
        levels: DepthLevels { first: 1, count: 7 },
    }
}

fn bench_edge_scan(c: &mut Criterion) {
    let photo = make_key_photo(1280, 960, 7);
    let locator = EdgeLocator::new(KeyColorBand::from_background(0.0, 1_000_000.0), 160);

    c.bench_function("edge_scan_1280x960_rows", |b| {
        b.iter(|| {
            let mut found = 0u32;
            for y in (0..960).step_by(8) {
                if let (Some(l), Some(r)) = (
                    locator.left_edge(black_box(&photo), y),
                    locator.right_edge(black_box(&photo), y),
                ) {
                    found += r - l;
                }
            }
            black_box(found)
        })
    });
}

fn bench_decode(c: &mut Criterion) {
    let photo = make_key_photo(640, 1600, 11);
    let stats = BackgroundStats::survey(&photo).expect("survey");
    let decoder = KeyDecoder::new(decode_profile(), DecoderConfig::default());

    c.bench_function("decode_640x1600", |b| {
        b.iter(|| {
            let report = decoder.decode(black_box(photo.clone()), black_box(&stats));
            black_box(report.is_ok())
        })
    });
}

fn bench_rotate(c: &mut Criterion) {
    let photo = make_key_photo(640, 960, 3);

    c.bench_function("rotate_640x960_37deg", |b| {
        b.iter(|| black_box(photo.rotated(black_box(37.0), 0)))
    });
}

fn bench_blade_build(c: &mut Criterion) {
    let profile = KeyProfile::from_json_str(PROFILE_JSON)
        .expect("bench profile")
        .cut_profile(None);
    let code: KeyCode = "352645".parse().expect("bench code");
    let builder = BladeBuilder::new(&profile);

    c.bench_function("blade_build_6_cuts", |b| {
        b.iter(|| {
            let mesh = builder.build(black_box(&code)).expect("blade");
            black_box(mesh.len())
        })
    });
}

criterion_group!(
    hotpaths,
    bench_edge_scan,
    bench_decode,
    bench_rotate,
    bench_blade_build
);
criterion_main!(hotpaths);
