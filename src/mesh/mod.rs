//! Core mesh data model
//!
//! # Overview
//!
//! Module for describing polygonal meshes as they are exchanged with the
//! legacy codec. The codec itself never owns a mesh, it only sees flat buffers
//! and a [MeshInfo] record describing them.
//!
//! - [MeshInfo] and [AttributeInfo] are the typed header of a file
//! - [Cell] and [PolylineCell] are the owned forms of the topology
//! - [PolyData] is a small container that drives the codec for whole files
//!
//! ```rust
//! # use vtkpoly::mesh::{Cell, PolyData};
//! // Build a single triangle from scratch
//! let mut mesh = PolyData::new();
//! mesh.points = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
//! mesh.cells.push(Cell::Triangle([0, 1, 2]));
//!
//! assert_eq!(mesh.number_of_points(), 3);
//! assert_eq!(mesh.connectivity(), vec![2, 3, 0, 1, 2]);
//! ```
//!
//! Reading any legacy PolyData file is a one-liner.
//!
//! ```ignore
//! let mesh = vtkpoly::read_polydata("./data/mixed_ascii.vtk")?;
//! println!("{}", mesh.info());
//! ```

// Split into subfiles for development, but anything important is re-exported
mod cell;
mod core;
mod polydata;

// inline important the mesh-related modules for a nice public API
#[doc(inline)]
pub use crate::mesh::core::{AttributeInfo, ComponentType, FileType, MeshInfo, PixelKind};

#[doc(inline)]
pub use crate::mesh::cell::{
    cells_from_connectivity, cells_to_connectivity, Cell, CellKind, CellRecord, PolylineCell,
    Records,
};

#[doc(inline)]
pub use crate::mesh::polydata::{AttributeData, PolyData};
