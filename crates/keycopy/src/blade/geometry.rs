use nalgebra::Point3;

use crate::error::Error;
use crate::key_code::DepthLevels;
use crate::mesh::Triangle;
use crate::profile::CutProfile;

/// Point on the blade side profile: `y` vertical, `x` along the key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfilePoint {
    pub y: f64,
    pub x: f64,
}

impl ProfilePoint {
    #[inline]
    pub const fn new(y: f64, x: f64) -> Self {
        Self { y, x }
    }

    /// Lift to 3D at `depth`, in `(vertical, horizontal, depth)` order.
    #[inline]
    pub fn at(&self, depth: f64) -> Point3<f64> {
        Point3::new(self.y, self.x, depth)
    }
}

/// Side-profile triangle standing on the blade base:
/// `[(base, foot_x), from, to]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileFace {
    pub foot_x: f64,
    pub from: ProfilePoint,
    pub to: ProfilePoint,
}

impl ProfileFace {
    pub fn foot(&self, base: f64) -> ProfilePoint {
        ProfilePoint::new(base, self.foot_x)
    }

    pub fn triangle(&self, base: f64, depth: f64) -> Triangle {
        Triangle::new(self.foot(base).at(depth), self.from.at(depth), self.to.at(depth))
    }
}

/// Line `Y = slope * x + intercept` in the upward frame `Y = -y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeLine {
    pub slope: f64,
    pub intercept: f64,
}

impl SlopeLine {
    pub fn through(p: ProfilePoint, slope: f64) -> Self {
        Self {
            slope,
            intercept: -p.y - slope * p.x,
        }
    }

    /// Level line at vertical coordinate `y`.
    pub fn horizontal(y: f64) -> Self {
        Self {
            slope: 0.0,
            intercept: -y,
        }
    }

    /// Crossing point, `None` for parallel lines.
    pub fn intersection(&self, other: &SlopeLine) -> Option<ProfilePoint> {
        let dm = other.slope - self.slope;
        if dm == 0.0 {
            return None;
        }
        let x = (self.intercept - other.intercept) / dm;
        let up = self.slope * x + self.intercept;
        Some(ProfilePoint::new(-up, x))
    }

    pub(crate) fn meet(&self, other: &SlopeLine) -> Result<ProfilePoint, Error> {
        self.intersection(other).ok_or(Error::ParallelSlopes { slope: self.slope })
    }
}

/// Fixed reference heights and positions of one blade.
///
/// Vertical values grow downward: the uncut top is more negative than the
/// base, and deeper cuts sit closer to the base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BladeFrame {
    pub base: f64,
    pub top: f64,
    /// Front face depth.
    pub z0: f64,
    /// Back face depth.
    pub z1: f64,
    /// Shoulder position along the key.
    pub shoulder_x: f64,
    pub slope: f64,
    upper_height: f64,
    origin_y: f64,
    first_center: f64,
    spacing: f64,
    depth_spacing: f64,
    levels: DepthLevels,
}

impl BladeFrame {
    pub fn new(profile: &CutProfile) -> Self {
        let upper_height = profile.upper_height();
        Self {
            base: -profile.origin_y,
            top: -(upper_height + profile.origin_y),
            z0: profile.origin_z,
            z1: profile.origin_z + profile.blade_width,
            shoulder_x: profile.origin_x,
            slope: profile.slope,
            upper_height,
            origin_y: profile.origin_y,
            first_center: profile.origin_x + profile.shoulder_to_first_cut,
            spacing: profile.cylinder_spacing,
            depth_spacing: profile.depth_spacing,
            levels: profile.levels,
        }
    }

    /// Vertical coordinate of a landing cut to `digit`.
    pub fn level(&self, digit: u8) -> f64 {
        -(self.origin_y + self.upper_height - self.levels.root_depth(digit, self.depth_spacing))
    }

    /// Nominal centre of cut `index`.
    pub fn center(&self, index: usize) -> f64 {
        self.first_center + index as f64 * self.spacing
    }
}
