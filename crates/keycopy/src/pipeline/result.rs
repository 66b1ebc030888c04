use crate::decoder::RowSpan;
use crate::key_code::KeyCode;

/// Outcome of a successful decode.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DecodeReport {
    /// Decoded bitting, one digit per cylinder.
    pub code: KeyCode,
    /// Principal-axis angle measured on the input photo, degrees.
    pub key_angle_deg: f64,
    /// Clockwise turn applied to square the key up, degrees.
    pub rotation_deg: f64,
    /// Whether the squared-up key was flipped to put the bow on top.
    pub mirrored: bool,
    /// Key rows on the normalized surface.
    pub row_span: RowSpan,
    /// Pixels per profile unit along the key.
    pub key_scale: f64,
    /// Image row of every cut on the normalized surface.
    pub cut_rows: Vec<i64>,
    /// Measured key width at every cut, pixels.
    pub widths_px: Vec<i64>,
    /// Normalized surface size `[width, height]`.
    pub image_size: [u32; 2],
}
