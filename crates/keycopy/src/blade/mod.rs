//! Blade mesh construction.
//!
//! The blade is modelled as a side profile in the `(vertical, horizontal)`
//! plane and extruded across the blade thickness. Build order:
//!
//! 1. landings, split into left and right halves at the cut centre,
//! 2. teeth between neighbouring landings,
//! 3. the tooth out to the tip,
//! 4. the uncut shoulder run before the first cut,
//! 5. under-fill from every profile edge down to the base,
//! 6. walls across the thickness plus the shoulder and tip caps,
//! 7. the back face.
//!
//! Stages 1-5 are the front face at the near depth; stage 7 repeats them
//! at the far depth with reversed winding.

mod builder;
mod closure;
mod geometry;
mod landings;
mod teeth;

pub use builder::{build_blade, BladeBuilder};
pub use geometry::{BladeFrame, ProfileFace, ProfilePoint, SlopeLine};
pub use landings::{place_landings, Landing};
pub use teeth::tooth_peak;
