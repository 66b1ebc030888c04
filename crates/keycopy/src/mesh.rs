//! Triangle soup produced by the blade builder.
//!
//! Vertices are `(vertical, horizontal, depth)` in that fixed order, stored
//! in `nalgebra::Point3` as `(x, y, z) = (vertical, horizontal, depth)`.

use std::ops::Range;

use nalgebra::Point3;

use crate::error::Error;

/// A triangle with concrete vertex positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    #[inline]
    pub fn vertices(&self) -> [&Point3<f64>; 3] {
        [&self.v0, &self.v1, &self.v2]
    }

    /// Same triangle with the last two vertices swapped.
    #[inline]
    pub fn reversed(&self) -> Self {
        Self::new(self.v0, self.v2, self.v1)
    }

    /// Copy with every vertex moved to `depth`.
    pub fn at_depth(&self, depth: f64) -> Self {
        let move_to = |p: &Point3<f64>| Point3::new(p.x, p.y, depth);
        Self::new(move_to(&self.v0), move_to(&self.v1), move_to(&self.v2))
    }

    /// Every coordinate, vertex by vertex.
    pub fn coordinates(&self) -> impl Iterator<Item = f64> + '_ {
        self.vertices()
            .into_iter()
            .flat_map(|p| [p.x, p.y, p.z])
    }
}

/// Blade construction stage, in build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Landings,
    BetweenLandings,
    Tip,
    Shoulder,
    UnderLandings,
    Walls,
    TopCap,
}

/// Triangles contributed by one stage.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StageSpan {
    pub stage: Stage,
    pub range: Range<usize>,
}

/// Ordered triangle sequence with per-stage bookkeeping.
///
/// Append-only while the builder owns it; read-only once returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    triangles: Vec<Triangle>,
    spans: Vec<StageSpan>,
}

impl Mesh {
    pub(crate) fn push_stage(&mut self, stage: Stage, triangles: Vec<Triangle>) {
        let start = self.triangles.len();
        self.triangles.extend(triangles);
        self.spans.push(StageSpan {
            stage,
            range: start..self.triangles.len(),
        });
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn spans(&self) -> &[StageSpan] {
        &self.spans
    }

    /// Triangles produced by `stage` (empty if the stage never ran).
    pub fn stage(&self, stage: Stage) -> &[Triangle] {
        self.spans
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| &self.triangles[s.range.clone()])
            .unwrap_or(&[])
    }

    pub fn into_triangles(self) -> Vec<Triangle> {
        self.triangles
    }
}

/// Render a coordinate with at most six fractional digits, trailing zeros
/// trimmed (`1.500000` -> `1.5`, `-0.000000` -> `0`).
pub fn format_coordinate(v: f64) -> String {
    let mut s = format!("{:.6}", v);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Structural bounds every emitted mesh must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MeshLimits {
    /// Minimum triangle count.
    pub min_triangles: usize,
    /// Rendered coordinates must be shorter than this many characters.
    pub max_coordinate_len: usize,
}

impl MeshLimits {
    pub const DEFAULT_MIN_TRIANGLES: usize = 50;
    pub const DEFAULT_MAX_COORDINATE_LEN: usize = 20;

    pub fn validate(&self) -> Result<(), Error> {
        if self.min_triangles == 0 {
            return Err(Error::validation("mesh.min_triangles", "must be >= 1"));
        }
        if self.max_coordinate_len < 2 {
            return Err(Error::validation("mesh.max_coordinate_len", "must be >= 2"));
        }
        Ok(())
    }

    pub fn check(&self, mesh: &Mesh) -> Result<(), Error> {
        self.check_triangles(mesh.triangles())
    }

    pub fn check_triangles(&self, triangles: &[Triangle]) -> Result<(), Error> {
        if triangles.is_empty() || triangles.len() < self.min_triangles {
            return Err(Error::TooFewTriangles {
                count: triangles.len(),
                min: self.min_triangles,
            });
        }
        for v in triangles.iter().flat_map(Triangle::coordinates) {
            if !v.is_finite() {
                return Err(Error::validation("mesh", format!("coordinate {} is not finite", v)));
            }
            let rendered = format_coordinate(v);
            if rendered.len() >= self.max_coordinate_len {
                return Err(Error::CoordinateTooLong {
                    rendered,
                    max_len: self.max_coordinate_len,
                });
            }
        }
        Ok(())
    }
}

impl Default for MeshLimits {
    fn default() -> Self {
        Self {
            min_triangles: Self::DEFAULT_MIN_TRIANGLES,
            max_coordinate_len: Self::DEFAULT_MAX_COORDINATE_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(z: f64) -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(0.0, 1.0, z),
        )
    }

    #[test]
    fn coordinates_render_compactly() {
        assert_eq!(format_coordinate(1.5), "1.5");
        assert_eq!(format_coordinate(-2.0), "-2");
        assert_eq!(format_coordinate(-0.0000001), "0");
        assert_eq!(format_coordinate(0.1 + 0.2), "0.3");
        assert_eq!(format_coordinate(123.456789), "123.456789");
    }

    #[test]
    fn stages_are_addressable_by_name() {
        let mut mesh = Mesh::default();
        mesh.push_stage(Stage::Landings, vec![tri(0.0), tri(0.0)]);
        mesh.push_stage(Stage::TopCap, vec![tri(1.0)]);
        assert_eq!(mesh.len(), 3);
        assert_eq!(mesh.stage(Stage::Landings).len(), 2);
        assert_eq!(mesh.stage(Stage::TopCap)[0], tri(1.0));
        assert!(mesh.stage(Stage::Walls).is_empty());
        assert_eq!(mesh.spans()[1].range, 2..3);
    }

    #[test]
    fn reversed_swaps_last_two_vertices() {
        let t = tri(0.0);
        let r = t.reversed();
        assert_eq!((r.v0, r.v1, r.v2), (t.v0, t.v2, t.v1));
        assert_eq!(t.at_depth(2.0).v1.z, 2.0);
    }

    #[test]
    fn limits_enforce_count_and_length() {
        let limits = MeshLimits {
            min_triangles: 2,
            max_coordinate_len: 6,
        };
        let mut mesh = Mesh::default();
        mesh.push_stage(Stage::Landings, vec![tri(0.0)]);
        assert_eq!(
            limits.check(&mesh),
            Err(Error::TooFewTriangles { count: 1, min: 2 })
        );
        mesh.push_stage(Stage::Walls, vec![tri(0.0)]);
        assert!(limits.check(&mesh).is_ok());
        mesh.push_stage(Stage::TopCap, vec![tri(12.34567)]);
        assert!(matches!(
            limits.check(&mesh),
            Err(Error::CoordinateTooLong { .. })
        ));
        assert!(MeshLimits::default().check(&Mesh::default()).is_err());
    }
}
