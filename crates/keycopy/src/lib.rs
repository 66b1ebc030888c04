//! keycopy: read pin-tumbler key bitting from a photo and rebuild the
//! blade as a printable mesh.
//!
//! Decoding runs these stages on a request-owned surface:
//!
//! 1. **Background** – survey the photo border and push brightness until
//!    it is uniform.
//! 2. **Edges** – calibrate a key-colour band and noise window, then scan
//!    rows for the left and right key edges.
//! 3. **Orientation** – find the key's row span, its principal axis from
//!    the furthest pair of boundary points, rotate it upright and flip it
//!    so the shoulder sits on top.
//! 4. **Bitting** – measure the blade width at every cut row and map each
//!    width to the nearest depth digit, then gate the code's value.
//!
//! Cutting turns a [`KeyCode`] back into geometry:
//!
//! 5. **Blade** – landings, teeth, tip and shoulder in the side profile,
//!    closed into a solid across the blade thickness.
//! 6. **STL** – validate the mesh and write it with the profile's shaft
//!    fragment as one ASCII STL document.
//!
//! # Public API
//! - [`KeyDecoder`] and [`BladeBuilder`] as the entry points
//! - [`KeyProfile`] for key blank definitions, split into [`DecodeProfile`]
//!   and [`CutProfile`]
//! - [`ToolConfig`] grouping [`DecoderConfig`], [`BackgroundConfig`] and
//!   [`MeshLimits`]

mod api;
pub mod background;
pub mod blade;
mod config;
pub mod decoder;
mod error;
mod key_code;
pub mod mesh;
mod pipeline;
mod profile;
pub mod stl;
mod surface;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::KeyDecoder;
pub use background::{normalize_background, BackgroundConfig, BackgroundStats, ContrastDirection};
pub use blade::{build_blade, BladeBuilder};
pub use config::ToolConfig;
pub use decoder::DecoderConfig;
pub use error::{EdgeSide, Error, ErrorKind};
pub use key_code::{DepthLevels, KeyCode};
pub use mesh::{format_coordinate, Mesh, MeshLimits, Stage, StageSpan, Triangle};
pub use pipeline::DecodeReport;
pub use profile::{CutProfile, DecodeProfile, KeyProfile, MAX_CYLINDERS, MAX_TEXT_LEN};
pub use stl::{default_file_name, StlError, StlWriter};
pub use surface::{pack_rgb, unpack_rgb, ColorGrid, KeySurface, MirrorH, MirrorV};
