//! Decoder primitives: edge location, orientation geometry, bitting
//! measurement. The decode cycle that chains them lives in
//! `crate::pipeline`.

pub mod bitting;
pub mod config;
pub mod edge;
pub mod orientation;

pub use bitting::{BittingMeasurement, DepthBand};
pub use config::DecoderConfig;
pub use edge::{EdgeLocator, KeyColorBand};
pub use orientation::{BoundaryPoints, EdgePoint, RowSpan};
