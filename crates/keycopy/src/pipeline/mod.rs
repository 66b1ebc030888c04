//! Decode pipeline.
//!
//! This module is the glue that wires decoder stages together:
//! analyze -> rotate -> re-analyze -> mirror -> measure -> quality gate.
//!
//! Algorithmic primitives live in `crate::decoder`. The pipeline layer owns
//! call order, the per-pass recalibration of the edge locator, and the
//! hand-off of the request-local surface between transforms.

mod result;
mod run;

pub use result::DecodeReport;

pub(crate) use run::decode_surface;
