use crate::error::Error;
use crate::key_code::KeyCode;
use crate::mesh::{Mesh, MeshLimits, Stage, Triangle};
use crate::profile::CutProfile;

use super::closure::{back_face, under_faces, walls};
use super::geometry::{BladeFrame, ProfileFace};
use super::landings::place_landings;
use super::teeth::{gap_faces, shoulder_faces, tip_end, tip_faces};

/// Builds the blade mesh for one key code.
///
/// The builder validates the code against the profile before any geometry
/// is produced, and checks the finished mesh against its [`MeshLimits`].
#[derive(Debug, Clone)]
pub struct BladeBuilder<'a> {
    profile: &'a CutProfile,
    limits: MeshLimits,
}

impl<'a> BladeBuilder<'a> {
    pub fn new(profile: &'a CutProfile) -> Self {
        Self {
            profile,
            limits: MeshLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: MeshLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &MeshLimits {
        &self.limits
    }

    pub fn build(&self, code: &KeyCode) -> Result<Mesh, Error> {
        let profile = self.profile;
        code.check_against(profile.levels, profile.cylinder_count)?;
        if let Some((first, second)) = code.macs_violation(profile.macs) {
            return Err(Error::MacsViolation {
                first,
                second,
                limit: profile.macs,
            });
        }

        let frame = BladeFrame::new(profile);
        let landings = place_landings(&frame, code.digits(), profile.landing_width);
        let (first, last) = match (landings.first(), landings.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(Error::validation("key_code", "must not be empty")),
        };

        let landing_faces: Vec<ProfileFace> = landings.iter().flat_map(|l| l.faces()).collect();
        let between = gap_faces(&frame, &landings)?;
        let tip = tip_faces(&frame, last, profile.tip_length)?;
        let shoulder = shoulder_faces(&frame, first)?;

        let profile_faces: Vec<ProfileFace> = landing_faces
            .iter()
            .chain(&between)
            .chain(&tip)
            .chain(&shoulder)
            .copied()
            .collect();
        let front = |faces: &[ProfileFace]| -> Vec<Triangle> {
            faces
                .iter()
                .map(|f| f.triangle(frame.base, frame.z0))
                .collect()
        };

        let mut mesh = Mesh::default();
        mesh.push_stage(Stage::Landings, front(&landing_faces));
        mesh.push_stage(Stage::BetweenLandings, front(&between));
        mesh.push_stage(Stage::Tip, front(&tip));
        mesh.push_stage(Stage::Shoulder, front(&shoulder));
        mesh.push_stage(Stage::UnderLandings, under_faces(&frame, &profile_faces));

        let front_face = mesh.triangles().to_vec();
        mesh.push_stage(
            Stage::Walls,
            walls(&frame, &profile_faces, tip_end(last, profile.tip_length)),
        );
        mesh.push_stage(Stage::TopCap, back_face(&frame, &front_face));

        self.limits.check(&mesh)?;
        tracing::debug!(code = %code, triangles = mesh.len(), "blade built");
        Ok(mesh)
    }
}

/// Build with default limits.
pub fn build_blade(profile: &CutProfile, code: &KeyCode) -> Result<Mesh, Error> {
    BladeBuilder::new(profile).build(code)
}
