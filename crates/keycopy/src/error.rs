//! Error type shared by the decoder, the blade builder and the mesh checks.

// ── Classification ─────────────────────────────────────────────────────────

/// Coarse failure class, for callers that only need to branch on the kind
/// of problem rather than the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed profile, config, key code or mesh shape.
    Validation,
    /// The silhouette could not be located or oriented.
    Geometry,
    /// A cut could not be measured or matched to a depth.
    Measurement,
    /// The decoded code falls outside the accepted numeric range.
    Quality,
    /// Adjacent cuts differ by more than the profile allows.
    MacsViolation,
    /// The photo background never settled to a uniform colour.
    Background,
}

/// Which side of the key an edge scan looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeSide {
    Left,
    Right,
}

impl std::fmt::Display for EdgeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

// ── Error type ─────────────────────────────────────────────────────────────

/// Terminal failure of a decode or cut request.
///
/// Every variant carries the values that tripped it. There is no partial
/// key code or partial mesh on failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A profile, config or input value is out of shape or out of range.
    Validation {
        /// Offending field (whitelist name for profile fields).
        field: String,
        /// Human-readable reason.
        reason: String,
    },
    /// No scanned row contains key-coloured pixels.
    KeyNotFound,
    /// All candidate boundary points coincide.
    DegenerateSilhouette,
    /// The principal-axis angle fell outside every rotation quadrant.
    AngleUndetermined {
        /// Angle in degrees, normalized into `[0, 360)`.
        angle_deg: f64,
    },
    /// Two slope lines that must cross are parallel.
    ParallelSlopes {
        /// Slope shared by both lines.
        slope: f64,
    },
    /// The key span in rows is not positive or the key length is not.
    InvalidScale {
        /// Measured row span in pixels.
        span_px: f64,
        /// Physical key length from the profile.
        key_length: f64,
    },
    /// A cut row lies outside the image or has no edge on one side.
    MissingEdge {
        /// Image row that was scanned.
        row: i64,
        /// Side on which the edge was not found.
        side: EdgeSide,
    },
    /// A measured width matched no entry of the depth table.
    UnmatchedDepth {
        /// Zero-based cut position.
        cut: usize,
        /// Measured width in pixels.
        width_px: i64,
    },
    /// The decoded code is outside `[min, max]`.
    CodeOutOfRange {
        /// Decoded code as rendered.
        code: String,
        /// Accepted lower bound.
        min: u64,
        /// Accepted upper bound.
        max: u64,
    },
    /// `|first - second|` exceeds the MACS limit.
    MacsViolation {
        /// Digit at the lower position.
        first: u8,
        /// Digit at the next position.
        second: u8,
        /// Allowed difference.
        limit: u8,
    },
    /// A key-code digit lies outside the profile's depth levels.
    DigitOutOfRange {
        /// Zero-based digit position.
        position: usize,
        /// Offending digit.
        digit: u8,
        /// Lowest allowed digit.
        min: u8,
        /// Highest allowed digit.
        max: u8,
    },
    /// Key code length differs from the profile's cylinder count.
    CodeLengthMismatch {
        /// Cylinder count from the profile.
        expected: usize,
        /// Number of digits supplied.
        got: usize,
    },
    /// Mesh has fewer triangles than the configured minimum.
    TooFewTriangles {
        /// Triangles in the mesh.
        count: usize,
        /// Required minimum.
        min: usize,
    },
    /// A coordinate renders to too many characters.
    CoordinateTooLong {
        /// Rendered coordinate.
        rendered: String,
        /// Exclusive length bound.
        max_len: usize,
    },
    /// Background normalization ran out of passes.
    BackgroundNotUniform {
        /// Brightness adjustments applied before giving up.
        passes: usize,
    },
}

impl Error {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. }
            | Self::DigitOutOfRange { .. }
            | Self::CodeLengthMismatch { .. }
            | Self::TooFewTriangles { .. }
            | Self::CoordinateTooLong { .. } => ErrorKind::Validation,
            Self::KeyNotFound
            | Self::DegenerateSilhouette
            | Self::AngleUndetermined { .. }
            | Self::ParallelSlopes { .. } => ErrorKind::Geometry,
            Self::InvalidScale { .. } | Self::MissingEdge { .. } | Self::UnmatchedDepth { .. } => {
                ErrorKind::Measurement
            }
            Self::CodeOutOfRange { .. } => ErrorKind::Quality,
            Self::MacsViolation { .. } => ErrorKind::MacsViolation,
            Self::BackgroundNotUniform { .. } => ErrorKind::Background,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { field, reason } => write!(f, "invalid {}: {}", field, reason),
            Self::KeyNotFound => write!(f, "no image row contains the key"),
            Self::DegenerateSilhouette => {
                write!(f, "degenerate silhouette: all boundary points coincide")
            }
            Self::AngleUndetermined { angle_deg } => {
                write!(f, "key rotation not determined (angle {:.3} deg)", angle_deg)
            }
            Self::ParallelSlopes { slope } => {
                write!(f, "slope lines are parallel (slope {})", slope)
            }
            Self::InvalidScale {
                span_px,
                key_length,
            } => write!(
                f,
                "cannot derive key scale from span {} px and key length {}",
                span_px, key_length
            ),
            Self::MissingEdge { row, side } => {
                write!(f, "no {} key edge at row {}", side, row)
            }
            Self::UnmatchedDepth { cut, width_px } => write!(
                f,
                "cut {} width {} px matches no depth level",
                cut, width_px
            ),
            Self::CodeOutOfRange { code, min, max } => write!(
                f,
                "key code {} is poor quality (accepted range {}..={})",
                code, min, max
            ),
            Self::MacsViolation {
                first,
                second,
                limit,
            } => write!(
                f,
                "minimum adjacent cut specification ({}) between {} and {} violated",
                limit, first, second
            ),
            Self::DigitOutOfRange {
                position,
                digit,
                min,
                max,
            } => write!(
                f,
                "digit {} at position {} outside depth levels {}..={}",
                digit, position, min, max
            ),
            Self::CodeLengthMismatch { expected, got } => write!(
                f,
                "key code has {} digits, profile expects {}",
                got, expected
            ),
            Self::TooFewTriangles { count, min } => {
                write!(f, "too few triangles: need {}, got {}", min, count)
            }
            Self::CoordinateTooLong { rendered, max_len } => write!(
                f,
                "coordinate '{}' is too long (must be under {} characters)",
                rendered, max_len
            ),
            Self::BackgroundNotUniform { passes } => write!(
                f,
                "image background is not solid after {} adjustments, or the key is not fully in frame",
                passes
            ),
        }
    }
}

impl std::error::Error for Error {}
