//! ASCII STL output for a blade mesh plus the profile's shaft fragment.

use std::io::{self, Write};
use std::path::Path;

use crate::error::Error;
use crate::key_code::KeyCode;
use crate::mesh::{format_coordinate, Mesh, MeshLimits, Triangle};

/// Failure while writing an STL document.
#[derive(Debug)]
pub enum StlError {
    /// The mesh failed its limits check; nothing was written.
    Mesh(Error),
    Io(io::Error),
}

impl std::fmt::Display for StlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mesh(e) => write!(f, "mesh rejected: {}", e),
            Self::Io(e) => write!(f, "STL write failed: {}", e),
        }
    }
}

impl std::error::Error for StlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Mesh(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<Error> for StlError {
    fn from(e: Error) -> Self {
        Self::Mesh(e)
    }
}

impl From<io::Error> for StlError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Writes `solid ascii` documents.
#[derive(Debug, Clone, Default)]
pub struct StlWriter {
    limits: MeshLimits,
}

impl StlWriter {
    pub fn new(limits: MeshLimits) -> Self {
        Self { limits }
    }

    /// Validate `mesh`, then write it followed by `shaft` verbatim.
    pub fn write<W: Write>(&self, mesh: &Mesh, shaft: &str, mut writer: W) -> Result<(), StlError> {
        self.limits.check(mesh)?;

        writeln!(writer, "solid ascii")?;
        for t in mesh.triangles() {
            write_facet(&mut writer, t)?;
        }
        if !shaft.is_empty() {
            writer.write_all(shaft.as_bytes())?;
            if !shaft.ends_with('\n') {
                writeln!(writer)?;
            }
        }
        writeln!(writer, "endsolid ascii")?;
        writer.flush()?;
        Ok(())
    }

    /// Render to a string.
    pub fn render(&self, mesh: &Mesh, shaft: &str) -> Result<String, StlError> {
        let mut buf = Vec::new();
        self.write(mesh, shaft, &mut buf)?;
        String::from_utf8(buf).map_err(|e| StlError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    /// Write to `path`, reading the shaft fragment from `shaft_path`.
    pub fn write_file(&self, mesh: &Mesh, shaft_path: &Path, path: &Path) -> Result<(), StlError> {
        let shaft = std::fs::read_to_string(shaft_path)?;
        // Validate before touching the output file.
        self.limits.check(mesh)?;
        let file = std::fs::File::create(path)?;
        self.write(mesh, &shaft, io::BufWriter::new(file))?;
        tracing::info!(path = %path.display(), triangles = mesh.len(), "STL written");
        Ok(())
    }
}

fn write_facet<W: Write>(writer: &mut W, t: &Triangle) -> io::Result<()> {
    writeln!(writer, "facet normal 0 0 0")?;
    writeln!(writer, "outer loop")?;
    for v in t.vertices() {
        writeln!(
            writer,
            "vertex {} {} {}",
            format_coordinate(v.x),
            format_coordinate(v.y),
            format_coordinate(v.z)
        )?;
    }
    writeln!(writer, "endloop")?;
    writeln!(writer, "endfacet")
}

/// `<profileName>-<code>-<unix seconds>.stl`
pub fn default_file_name(profile_name: &str, code: &KeyCode, unix_secs: u64) -> String {
    format!("{}-{}-{}.stl", profile_name, code, unix_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blade::build_blade;
    use crate::test_utils::synthetic_cut_profile;

    const SHAFT: &str = "facet normal 0 0 0\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nendloop\nendfacet";

    fn mesh() -> Mesh {
        let code: KeyCode = "35264".parse().expect("code");
        build_blade(&synthetic_cut_profile(), &code).expect("mesh")
    }

    #[test]
    fn document_is_framed_around_blade_and_shaft() {
        let mesh = mesh();
        let text = StlWriter::default().render(&mesh, SHAFT).expect("stl");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "solid ascii");
        assert_eq!(lines[1], "facet normal 0 0 0");
        assert_eq!(*lines.last().expect("lines"), "endsolid ascii");
        assert_eq!(lines[lines.len() - 2], "endfacet");
        // Seven lines per blade facet plus the one shaft facet.
        assert_eq!(lines.len(), 2 + 7 * (mesh.len() + 1));
        assert!(text.ends_with("endsolid ascii\n"));
    }

    #[test]
    fn vertices_use_compact_numbers() {
        let text = StlWriter::default().render(&mesh(), "").expect("stl");
        let first_vertex = text
            .lines()
            .find(|l| l.starts_with("vertex "))
            .expect("vertex line");
        assert!(!first_vertex.contains("-0 ") && !first_vertex.contains(".000000"));
        assert_eq!(first_vertex, "vertex 0 5.5 0");
    }

    #[test]
    fn rejected_mesh_writes_nothing() {
        let writer = StlWriter::new(MeshLimits {
            min_triangles: 10_000,
            ..MeshLimits::default()
        });
        let mut buf = Vec::new();
        let err = writer.write(&mesh(), SHAFT, &mut buf).unwrap_err();
        assert!(matches!(err, StlError::Mesh(Error::TooFewTriangles { .. })));
        assert!(buf.is_empty());
    }

    #[test]
    fn file_name_joins_profile_code_and_time() {
        let code: KeyCode = "35264".parse().expect("code");
        assert_eq!(
            default_file_name("kwikset-kw1", &code, 1_700_000_000),
            "kwikset-kw1-35264-1700000000.stl"
        );
    }
}
