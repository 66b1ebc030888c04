//! Triangles that close the side profile into a solid: under-fill down to
//! the base, the walls joining front and back faces, and the back face.

use crate::mesh::Triangle;

use super::geometry::{BladeFrame, ProfileFace, ProfilePoint};

/// Fill between a face's far edge and the base:
/// `[(base, foot_x), to, (base, to.x)]`.
pub fn under_faces(frame: &BladeFrame, faces: &[ProfileFace]) -> Vec<Triangle> {
    faces
        .iter()
        .map(|f| {
            Triangle::new(
                f.foot(frame.base).at(frame.z0),
                f.to.at(frame.z0),
                ProfilePoint::new(frame.base, f.to.x).at(frame.z0),
            )
        })
        .collect()
}

/// Quad between `a` and `b` spanning the blade thickness.
fn wall(frame: &BladeFrame, a: ProfilePoint, b: ProfilePoint) -> [Triangle; 2] {
    let (z0, z1) = (frame.z0, frame.z1);
    [
        Triangle::new(a.at(z0), a.at(z1), b.at(z0)),
        Triangle::new(b.at(z1), b.at(z0), a.at(z1)),
    ]
}

fn base_wall(frame: &BladeFrame, a: ProfilePoint, b: ProfilePoint) -> [Triangle; 2] {
    let (z0, z1) = (frame.z0, frame.z1);
    [
        Triangle::new(a.at(z0), a.at(z1), b.at(z0)),
        Triangle::new(a.at(z1), b.at(z0), b.at(z1)),
    ]
}

/// Vertical end cap from the base up to `upper`.
fn cap(frame: &BladeFrame, x: f64, upper: f64) -> [Triangle; 2] {
    let (z0, z1) = (frame.z0, frame.z1);
    let lo = ProfilePoint::new(frame.base, x);
    let hi = ProfilePoint::new(upper, x);
    [
        Triangle::new(lo.at(z0), hi.at(z1), hi.at(z0)),
        Triangle::new(lo.at(z1), hi.at(z1), lo.at(z0)),
    ]
}

/// Side walls: one quad per upper edge, one per base edge, then the
/// shoulder and tip caps.
pub fn walls(frame: &BladeFrame, faces: &[ProfileFace], tip: ProfilePoint) -> Vec<Triangle> {
    let mut out = Vec::with_capacity(4 * faces.len() + 4);
    for f in faces {
        out.extend(wall(frame, f.from, f.to));
    }
    for f in faces {
        out.extend(base_wall(
            frame,
            f.foot(frame.base),
            ProfilePoint::new(frame.base, f.to.x),
        ));
    }
    out.extend(cap(frame, frame.shoulder_x, frame.top));
    out.extend(cap(frame, tip.x, tip.y).map(|t| t.reversed()));
    out
}

/// Back face: every front triangle moved to `z1` with its winding flipped.
pub fn back_face(frame: &BladeFrame, front: &[Triangle]) -> Vec<Triangle> {
    front
        .iter()
        .map(|t| t.at_depth(frame.z1).reversed())
        .collect()
}
