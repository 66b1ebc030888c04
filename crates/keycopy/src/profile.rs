//! Key blank profiles.
//!
//! A profile JSON describes one key blank with a fixed camelCase field
//! whitelist: every field is required and unknown fields are rejected.
//! `profileName` and `shaftPath` are the only text fields. After parsing,
//! values are range-checked once and split into the immutable records the
//! decoder ([`DecodeProfile`]) and the blade builder ([`CutProfile`]) consume.

use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::key_code::DepthLevels;

/// Maximum byte length of the text fields.
pub const MAX_TEXT_LEN: usize = 80;
/// Maximum cylinder count.
pub const MAX_CYLINDERS: usize = 20;

/// Validated key blank profile.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyProfile {
    pub id: u64,
    pub profile_name: String,
    /// Width of the flat landing a pin rests on.
    pub landing_width: f64,
    /// Shoulder to the centre of the first cut.
    pub shoulder_to_first_cut: f64,
    /// Centre-to-centre distance between cuts.
    pub cylinder_spacing: f64,
    /// Depth step between adjacent digits.
    pub depth_spacing: f64,
    pub depth_levels: u8,
    pub depth_first_level: u8,
    /// Blade bottom to uncut top.
    pub blade_height: f64,
    /// Blade bottom to the bottom of the cuttable upper part.
    pub blade_lower_height: f64,
    pub blade_upper_origin_y: f64,
    pub blade_upper_origin_x: f64,
    pub blade_upper_origin_z: f64,
    /// Blade thickness along the depth axis.
    pub blade_width: f64,
    /// Last landing's right end to the blade tip.
    pub blade_tip_length: f64,
    /// Rise over run of the walls between landings.
    pub between_landing_angle: f64,
    pub minimum_adjacent_cut_specification: u8,
    /// Pre-built bow and base mesh fragment (ASCII STL facets).
    pub shaft_path: String,
    /// Bow tip to blade tip, as seen in a photo.
    pub key_length: f64,
    pub bow_to_shoulder_distance: f64,
    pub cylinder_count: usize,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct KeyProfileSpec {
    id: u64,
    profile_name: String,
    landing_width: f64,
    shoulder_to_first_cut: f64,
    cylinder_spacing: f64,
    depth_spacing: f64,
    depth_levels: u8,
    depth_first_level: u8,
    blade_height: f64,
    blade_lower_height: f64,
    blade_upper_origin_y: f64,
    blade_upper_origin_x: f64,
    blade_upper_origin_z: f64,
    blade_width: f64,
    blade_tip_length: f64,
    between_landing_angle: f64,
    minimum_adjacent_cut_specification: u8,
    shaft_path: String,
    key_length: f64,
    bow_to_shoulder_distance: f64,
    cylinder_count: usize,
}

impl KeyProfile {
    /// Parse and validate a profile document.
    pub fn from_json_str(raw: &str) -> Result<Self, Error> {
        let spec: KeyProfileSpec =
            serde_json::from_str(raw).map_err(|e| Error::validation("profile", e.to_string()))?;
        Self::from_spec(spec)
    }

    /// Load a profile from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data).map_err(Into::into)
    }

    fn from_spec(spec: KeyProfileSpec) -> Result<Self, Error> {
        validate_profile_spec(&spec)?;
        Ok(Self {
            id: spec.id,
            profile_name: spec.profile_name,
            landing_width: spec.landing_width,
            shoulder_to_first_cut: spec.shoulder_to_first_cut,
            cylinder_spacing: spec.cylinder_spacing,
            depth_spacing: spec.depth_spacing,
            depth_levels: spec.depth_levels,
            depth_first_level: spec.depth_first_level,
            blade_height: spec.blade_height,
            blade_lower_height: spec.blade_lower_height,
            blade_upper_origin_y: spec.blade_upper_origin_y,
            blade_upper_origin_x: spec.blade_upper_origin_x,
            blade_upper_origin_z: spec.blade_upper_origin_z,
            blade_width: spec.blade_width,
            blade_tip_length: spec.blade_tip_length,
            between_landing_angle: spec.between_landing_angle,
            minimum_adjacent_cut_specification: spec.minimum_adjacent_cut_specification,
            shaft_path: spec.shaft_path,
            key_length: spec.key_length,
            bow_to_shoulder_distance: spec.bow_to_shoulder_distance,
            cylinder_count: spec.cylinder_count,
        })
    }

    pub fn depth_levels(&self) -> DepthLevels {
        DepthLevels {
            first: self.depth_first_level,
            count: self.depth_levels,
        }
    }

    /// Constants the decoder needs.
    pub fn decode_profile(&self) -> DecodeProfile {
        DecodeProfile {
            key_length: self.key_length,
            shoulder_to_first_cut: self.shoulder_to_first_cut,
            cylinder_spacing: self.cylinder_spacing,
            cylinder_count: self.cylinder_count,
            bow_to_shoulder_distance: self.bow_to_shoulder_distance,
            depth_spacing: self.depth_spacing,
            blade_height: self.blade_height,
            levels: self.depth_levels(),
        }
    }

    /// Constants the blade builder needs. A relative `shaftPath` resolves
    /// against `base_dir` when one is given.
    pub fn cut_profile(&self, base_dir: Option<&Path>) -> CutProfile {
        let shaft = PathBuf::from(&self.shaft_path);
        let shaft_path = match base_dir {
            Some(dir) if shaft.is_relative() => dir.join(shaft),
            _ => shaft,
        };
        CutProfile {
            landing_width: self.landing_width,
            shoulder_to_first_cut: self.shoulder_to_first_cut,
            cylinder_spacing: self.cylinder_spacing,
            cylinder_count: self.cylinder_count,
            depth_spacing: self.depth_spacing,
            levels: self.depth_levels(),
            blade_height: self.blade_height,
            blade_lower_height: self.blade_lower_height,
            origin_y: self.blade_upper_origin_y,
            origin_x: self.blade_upper_origin_x,
            origin_z: self.blade_upper_origin_z,
            blade_width: self.blade_width,
            tip_length: self.blade_tip_length,
            slope: self.between_landing_angle,
            macs: self.minimum_adjacent_cut_specification,
            shaft_path,
        }
    }
}

fn validate_profile_spec(spec: &KeyProfileSpec) -> Result<(), Error> {
    for (field, text) in [
        ("profileName", &spec.profile_name),
        ("shaftPath", &spec.shaft_path),
    ] {
        if text.trim().is_empty() {
            return Err(Error::validation(field, "must not be empty"));
        }
        if text.len() > MAX_TEXT_LEN {
            return Err(Error::validation(
                field,
                format!("{} bytes exceeds {}", text.len(), MAX_TEXT_LEN),
            ));
        }
    }

    let numbers = [
        ("landingWidth", spec.landing_width),
        ("shoulderToFirstCut", spec.shoulder_to_first_cut),
        ("cylinderSpacing", spec.cylinder_spacing),
        ("depthSpacing", spec.depth_spacing),
        ("bladeHeight", spec.blade_height),
        ("bladeLowerHeight", spec.blade_lower_height),
        ("bladeUpperOriginY", spec.blade_upper_origin_y),
        ("bladeUpperOriginX", spec.blade_upper_origin_x),
        ("bladeUpperOriginZ", spec.blade_upper_origin_z),
        ("bladeWidth", spec.blade_width),
        ("bladeTipLength", spec.blade_tip_length),
        ("betweenLandingAngle", spec.between_landing_angle),
        ("keyLength", spec.key_length),
        ("bowToShoulderDistance", spec.bow_to_shoulder_distance),
    ];
    if let Some((field, _)) = numbers.iter().find(|(_, v)| !v.is_finite()) {
        return Err(Error::validation(*field, "must be finite"));
    }

    for (field, v) in [
        ("landingWidth", spec.landing_width),
        ("cylinderSpacing", spec.cylinder_spacing),
        ("depthSpacing", spec.depth_spacing),
        ("bladeHeight", spec.blade_height),
        ("bladeWidth", spec.blade_width),
        ("betweenLandingAngle", spec.between_landing_angle),
        ("keyLength", spec.key_length),
    ] {
        if v <= 0.0 {
            return Err(Error::validation(field, "must be > 0"));
        }
    }
    for (field, v) in [
        ("shoulderToFirstCut", spec.shoulder_to_first_cut),
        ("bladeLowerHeight", spec.blade_lower_height),
        ("bladeTipLength", spec.blade_tip_length),
        ("bowToShoulderDistance", spec.bow_to_shoulder_distance),
    ] {
        if v < 0.0 {
            return Err(Error::validation(field, "must be >= 0"));
        }
    }

    if spec.blade_lower_height >= spec.blade_height {
        return Err(Error::validation(
            "bladeLowerHeight",
            "must be < bladeHeight",
        ));
    }

    if spec.depth_levels == 0 {
        return Err(Error::validation("depthLevels", "must be >= 1"));
    }
    if u16::from(spec.depth_first_level) + u16::from(spec.depth_levels) - 1 > 9 {
        return Err(Error::validation(
            "depthLevels",
            "highest depth digit must be <= 9",
        ));
    }

    if spec.cylinder_count == 0 || spec.cylinder_count > MAX_CYLINDERS {
        return Err(Error::validation(
            "cylinderCount",
            format!("must be in 1..={}", MAX_CYLINDERS),
        ));
    }

    Ok(())
}

/// Physical constants the decoder reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeProfile {
    pub key_length: f64,
    pub shoulder_to_first_cut: f64,
    pub cylinder_spacing: f64,
    pub cylinder_count: usize,
    pub bow_to_shoulder_distance: f64,
    pub depth_spacing: f64,
    pub blade_height: f64,
    pub levels: DepthLevels,
}

/// Physical and tool constants the blade builder reads.
#[derive(Debug, Clone, PartialEq)]
pub struct CutProfile {
    pub landing_width: f64,
    pub shoulder_to_first_cut: f64,
    pub cylinder_spacing: f64,
    pub cylinder_count: usize,
    pub depth_spacing: f64,
    pub levels: DepthLevels,
    pub blade_height: f64,
    pub blade_lower_height: f64,
    /// Blade-upper origin along the vertical axis.
    pub origin_y: f64,
    /// Blade-upper origin along the key length; the shoulder sits here.
    pub origin_x: f64,
    /// Blade-upper origin along the depth axis.
    pub origin_z: f64,
    pub blade_width: f64,
    pub tip_length: f64,
    /// Rise over run of the walls between landings.
    pub slope: f64,
    /// Largest allowed depth difference between adjacent cuts.
    pub macs: u8,
    pub shaft_path: PathBuf,
}

impl CutProfile {
    /// Height of the cuttable upper blade.
    pub fn upper_height(&self) -> f64 {
        self.blade_height - self.blade_lower_height
    }
}
