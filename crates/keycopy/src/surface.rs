//! Packed-colour image surface and zero-copy mirrored views.
//!
//! Colours are handled as packed 24-bit integers `r << 16 | g << 8 | b`, so
//! "key colour" tests are plain numeric range checks.

use std::path::Path;

use image::{DynamicImage, Rgb, RgbImage};
use nalgebra::{Rotation2, Vector2};

use crate::error::Error;

/// Largest packed colour value (white).
pub const COLOR_MAX: u32 = 0xFF_FFFF;

/// Midpoint of the packed colour spectrum, `round(COLOR_MAX / 2)`.
pub const SPECTRUM_MID: u32 = 8_388_608;

const SIZE_EPS: f64 = 1e-9;
const ANGLE_EPS_DEG: f64 = 1e-9;

/// Pack an RGB pixel into a 24-bit integer.
#[inline]
pub fn pack_rgb(px: Rgb<u8>) -> u32 {
    let [r, g, b] = px.0;
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Unpack a 24-bit integer into an RGB pixel. Bits above 24 are ignored.
#[inline]
pub fn unpack_rgb(color: u32) -> Rgb<u8> {
    Rgb([
        ((color >> 16) & 0xFF) as u8,
        ((color >> 8) & 0xFF) as u8,
        (color & 0xFF) as u8,
    ])
}

/// Read-only grid of packed colours.
pub trait ColorGrid {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Packed colour at `(x, y)`. Callers keep coordinates in bounds.
    fn color(&self, x: u32, y: u32) -> u32;

    /// Packed colour at signed coordinates, or `None` outside the grid.
    fn color_checked(&self, x: i64, y: i64) -> Option<u32> {
        if x < 0 || y < 0 || x >= i64::from(self.width()) || y >= i64::from(self.height()) {
            return None;
        }
        Some(self.color(x as u32, y as u32))
    }
}

impl<G: ColorGrid + ?Sized> ColorGrid for &G {
    fn width(&self) -> u32 {
        (**self).width()
    }
    fn height(&self) -> u32 {
        (**self).height()
    }
    fn color(&self, x: u32, y: u32) -> u32 {
        (**self).color(x, y)
    }
}

/// Horizontally mirrored view: column `x` reads column `w - 1 - x`.
#[derive(Debug, Clone, Copy)]
pub struct MirrorH<G>(pub G);

impl<G: ColorGrid> ColorGrid for MirrorH<G> {
    fn width(&self) -> u32 {
        self.0.width()
    }
    fn height(&self) -> u32 {
        self.0.height()
    }
    fn color(&self, x: u32, y: u32) -> u32 {
        self.0.color(self.0.width() - 1 - x, y)
    }
}

/// Vertically mirrored view: row `y` reads row `h - 1 - y`.
#[derive(Debug, Clone, Copy)]
pub struct MirrorV<G>(pub G);

impl<G: ColorGrid> ColorGrid for MirrorV<G> {
    fn width(&self) -> u32 {
        self.0.width()
    }
    fn height(&self) -> u32 {
        self.0.height()
    }
    fn color(&self, x: u32, y: u32) -> u32 {
        self.0.color(x, self.0.height() - 1 - y)
    }
}

/// Photographed key, owned by a single decode request.
#[derive(Debug, Clone, PartialEq)]
pub struct KeySurface {
    img: RgbImage,
}

impl KeySurface {
    pub fn new(img: RgbImage) -> Self {
        Self { img }
    }

    /// Surface of uniform colour.
    pub fn filled(width: u32, height: u32, color: u32) -> Self {
        Self::new(RgbImage::from_pixel(width, height, unpack_rgb(color)))
    }

    pub fn from_dynamic(img: &DynamicImage) -> Self {
        Self::new(img.to_rgb8())
    }

    /// Decode an image file from disk.
    pub fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let img = image::open(path)?;
        Ok(Self::from_dynamic(&img))
    }

    /// Build from a row-major packed colour buffer.
    pub fn from_packed(width: u32, height: u32, data: &[u32]) -> Result<Self, Error> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::validation(
                "surface",
                format!(
                    "buffer holds {} colours, {}x{} needs {}",
                    data.len(),
                    width,
                    height,
                    expected
                ),
            ));
        }
        if let Some(bad) = data.iter().find(|&&c| c > COLOR_MAX) {
            return Err(Error::validation(
                "surface",
                format!("colour {:#x} exceeds 24 bits", bad),
            ));
        }
        let img = RgbImage::from_fn(width, height, |x, y| {
            unpack_rgb(data[y as usize * width as usize + x as usize])
        });
        Ok(Self::new(img))
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.img
    }

    pub fn as_image_mut(&mut self) -> &mut RgbImage {
        &mut self.img
    }

    pub fn into_image(self) -> RgbImage {
        self.img
    }

    pub fn set_color(&mut self, x: u32, y: u32, color: u32) {
        self.img.put_pixel(x, y, unpack_rgb(color));
    }

    pub fn flip_horizontal(&mut self) {
        image::imageops::flip_horizontal_in_place(&mut self.img);
    }

    pub fn flip_vertical(&mut self) {
        image::imageops::flip_vertical_in_place(&mut self.img);
    }

    /// Rotate by `degrees` about the image centre.
    ///
    /// A positive angle turns image-space +x toward +y (clockwise as
    /// displayed). The canvas grows to the rotated bounding box; pixels not
    /// covered by the source take `fill`. Sampling is nearest-neighbour.
    pub fn rotated(&self, degrees: f64, fill: u32) -> KeySurface {
        let turn = degrees.rem_euclid(360.0);
        if turn < ANGLE_EPS_DEG || 360.0 - turn < ANGLE_EPS_DEG {
            return self.clone();
        }

        let theta = turn.to_radians();
        let (sin, cos) = theta.sin_cos();
        let (w, h) = (f64::from(self.img.width()), f64::from(self.img.height()));
        let out_w = fit_extent(w * cos.abs() + h * sin.abs());
        let out_h = fit_extent(w * sin.abs() + h * cos.abs());

        let inverse = Rotation2::new(-theta);
        let src_center = Vector2::new(w / 2.0, h / 2.0);
        let dst_center = Vector2::new(f64::from(out_w) / 2.0, f64::from(out_h) / 2.0);
        let fill_px = unpack_rgb(fill);

        let img = RgbImage::from_fn(out_w, out_h, |x, y| {
            let d = Vector2::new(f64::from(x) + 0.5, f64::from(y) + 0.5) - dst_center;
            let s = inverse * d + src_center;
            match self.color_checked(s.x.floor() as i64, s.y.floor() as i64) {
                Some(c) => unpack_rgb(c),
                None => fill_px,
            }
        });
        KeySurface::new(img)
    }
}

impl ColorGrid for KeySurface {
    fn width(&self) -> u32 {
        self.img.width()
    }
    fn height(&self) -> u32 {
        self.img.height()
    }
    fn color(&self, x: u32, y: u32) -> u32 {
        pack_rgb(*self.img.get_pixel(x, y))
    }
}

fn fit_extent(v: f64) -> u32 {
    (v - SIZE_EPS).ceil().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(w: u32, h: u32) -> KeySurface {
        let data: Vec<u32> = (0..w * h).collect();
        KeySurface::from_packed(w, h, &data).expect("valid buffer")
    }

    #[test]
    fn pack_roundtrip_preserves_channels() {
        let c = 0x12_34_56;
        assert_eq!(pack_rgb(unpack_rgb(c)), c);
        assert_eq!(unpack_rgb(COLOR_MAX), Rgb([255, 255, 255]));
    }

    #[test]
    fn packed_buffer_size_is_checked() {
        let err = KeySurface::from_packed(3, 3, &[0; 8]).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn mirrored_views_reflect_indices() {
        let s = numbered(4, 3);
        let mh = MirrorH(&s);
        let mv = MirrorV(&s);
        assert_eq!(mh.color(0, 1), s.color(3, 1));
        assert_eq!(mv.color(2, 0), s.color(2, 2));
        assert_eq!(mh.width(), 4);
        assert_eq!(mv.height(), 3);
    }

    #[test]
    fn flips_match_mirrored_views() {
        let s = numbered(5, 4);
        let mut flipped = s.clone();
        flipped.flip_horizontal();
        for y in 0..4 {
            for x in 0..5 {
                assert_eq!(flipped.color(x, y), MirrorH(&s).color(x, y));
            }
        }
        let mut vflipped = s.clone();
        vflipped.flip_vertical();
        assert_eq!(vflipped.color(1, 0), s.color(1, 3));
    }

    #[test]
    fn quarter_turn_swaps_dimensions_and_turns_clockwise() {
        let s = numbered(4, 2);
        let r = s.rotated(90.0, COLOR_MAX);
        assert_eq!((r.width(), r.height()), (2, 4));
        // Top-left source pixel ends up top-right.
        assert_eq!(r.color(1, 0), s.color(0, 0));
        // Bottom-left source pixel ends up top-left.
        assert_eq!(r.color(0, 0), s.color(0, 1));
        assert_eq!(r.color(0, 3), s.color(3, 1));
    }

    #[test]
    fn full_turn_is_identity() {
        let s = numbered(6, 3);
        assert_eq!(s.rotated(360.0, 0), s);
        assert_eq!(s.rotated(0.0, 0), s);
    }

    #[test]
    fn diagonal_turn_grows_canvas_and_fills_corners() {
        let s = KeySurface::filled(10, 10, 0x00_00_00);
        let r = s.rotated(45.0, COLOR_MAX);
        assert_eq!(r.width(), 15);
        assert_eq!(r.height(), 15);
        assert_eq!(r.color(0, 0), COLOR_MAX);
        assert_eq!(r.color(7, 7), 0);
    }
}
