#![doc(hidden)]
//! Line scanning and header parsers for legacy PolyData files

// internal modules
use crate::mesh::PolyData;

// standard library
use std::path::Path;

// external crates
use anyhow::Result;

// files under the readers module
pub mod parsers;
mod scanner;

// inline important the reader modules for a nice API
#[doc(inline)]
pub use crate::readers::scanner::{payload_size, Preamble, SectionScanner};

/// Read a whole legacy PolyData file
///
/// Returns a result containing a [PolyData] with points, cells and any point
/// or cell attribute widened to `f64`.
///
/// - `path` - Path to the vtk file, can be [&str], [String], [Path], etc...
///
/// Example
/// ```ignore
/// // Read every section of the file
/// let mesh: PolyData = vtkpoly::read_polydata("path/to/mesh.vtk")?;
/// ```
pub fn read_polydata<P: AsRef<Path>>(path: P) -> Result<PolyData> {
    PolyData::read(path)
}
