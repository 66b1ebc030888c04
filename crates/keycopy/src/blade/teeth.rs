use crate::error::Error;

use super::geometry::{BladeFrame, ProfileFace, ProfilePoint, SlopeLine};
use super::landings::Landing;

/// Peak reached by a wall rising from `start` and one falling to `end`.
pub fn tooth_peak(start: ProfilePoint, end: ProfilePoint, slope: f64) -> Result<ProfilePoint, Error> {
    SlopeLine::through(start, slope).meet(&SlopeLine::through(end, -slope))
}

fn tooth_faces(start: ProfilePoint, end: ProfilePoint, slope: f64) -> Result<[ProfileFace; 2], Error> {
    let peak = tooth_peak(start, end, slope)?;
    Ok([
        ProfileFace {
            foot_x: start.x,
            from: start,
            to: peak,
        },
        ProfileFace {
            foot_x: peak.x,
            from: peak,
            to: end,
        },
    ])
}

/// Teeth between every pair of neighbouring landings.
pub fn gap_faces(frame: &BladeFrame, landings: &[Landing]) -> Result<Vec<ProfileFace>, Error> {
    let mut faces = Vec::with_capacity(2 * landings.len().saturating_sub(1));
    for pair in landings.windows(2) {
        faces.extend(tooth_faces(pair[0].right(), pair[1].left(), frame.slope)?);
    }
    Ok(faces)
}

/// Right end of the blade: the tip sits `tip_length` past the last landing.
pub fn tip_end(last: &Landing, tip_length: f64) -> ProfilePoint {
    ProfilePoint::new(last.level, last.right_x + tip_length)
}

/// Tooth from the last landing out to the tip.
pub fn tip_faces(frame: &BladeFrame, last: &Landing, tip_length: f64) -> Result<[ProfileFace; 2], Error> {
    tooth_faces(last.right(), tip_end(last, tip_length), frame.slope)
}

/// Uncut top from the shoulder to where the first wall starts falling.
pub fn shoulder_faces(frame: &BladeFrame, first: &Landing) -> Result<[ProfileFace; 2], Error> {
    let start = first.left();
    let corner = SlopeLine::horizontal(frame.top).meet(&SlopeLine::through(start, -frame.slope))?;
    let shoulder_top = ProfilePoint::new(frame.top, frame.shoulder_x);
    Ok([
        ProfileFace {
            foot_x: frame.shoulder_x,
            from: shoulder_top,
            to: corner,
        },
        ProfileFace {
            foot_x: corner.x,
            from: corner,
            to: start,
        },
    ])
}
