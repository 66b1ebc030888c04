use super::geometry::{BladeFrame, ProfileFace, ProfilePoint};

/// Flat cut a pin rests on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    pub digit: u8,
    /// Vertical coordinate of the flat.
    pub level: f64,
    /// Nominal centre along the key.
    pub center: f64,
    pub left_x: f64,
    pub right_x: f64,
}

impl Landing {
    pub fn left(&self) -> ProfilePoint {
        ProfilePoint::new(self.level, self.left_x)
    }

    pub fn right(&self) -> ProfilePoint {
        ProfilePoint::new(self.level, self.right_x)
    }

    /// Left and right halves, split at the nominal centre.
    pub fn faces(&self) -> [ProfileFace; 2] {
        let mid = ProfilePoint::new(self.level, self.center);
        [
            ProfileFace {
                foot_x: self.left_x,
                from: self.left(),
                to: mid,
            },
            ProfileFace {
                foot_x: self.center,
                from: mid,
                to: self.right(),
            },
        ]
    }
}

/// Lay out one landing per digit, then clip every gap so a wall of the
/// blade slope fits between neighbours.
pub fn place_landings(frame: &BladeFrame, digits: &[u8], landing_width: f64) -> Vec<Landing> {
    let half = landing_width / 2.0;
    let mut landings: Vec<Landing> = digits
        .iter()
        .enumerate()
        .map(|(i, &digit)| {
            let center = frame.center(i);
            Landing {
                digit,
                level: frame.level(digit),
                center,
                left_x: center - half,
                right_x: center + half,
            }
        })
        .collect();

    for i in 1..landings.len() {
        let (head, tail) = landings.split_at_mut(i);
        clip_gap(&mut head[i - 1], &mut tail[0], frame.slope);
    }
    landings
}

/// Shorten the higher of two neighbouring landings so the wall down to the
/// lower one keeps the blade slope.
fn clip_gap(cur: &mut Landing, next: &mut Landing, slope: f64) {
    if cur.level <= next.level {
        // Next cut is deeper: pull the current right end back.
        let proposed = next.left_x + (cur.level - next.level) / slope;
        if cur.right_x >= proposed {
            tracing::trace!(digit = cur.digit, from = cur.right_x, to = proposed, "landing clipped");
            cur.right_x = proposed;
        }
    } else {
        let proposed = (cur.level - next.level) / slope + cur.right_x;
        if next.left_x <= proposed {
            tracing::trace!(digit = next.digit, from = next.left_x, to = proposed, "landing clipped");
            next.left_x = proposed;
        }
    }
}
