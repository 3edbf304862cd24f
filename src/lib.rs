//! # The vtkpoly crate
//!
//! A reader and writer for legacy VTK PolyData files
//!
//! ## Installation
//!
//! Install the command line tool from a local checkout:
//!
//! ```shell
//! cargo install --path .
//! ```
//!
//! ## Overview
//!
//! Legacy `.vtk` files with `DATASET POLYDATA` hold points, vertex/line/polygon
//! cells, and one attribute per point and per cell. Both the `ASCII` and the
//! big-endian `BINARY` encodings are supported in both directions.
//!
//! | Command line  | Description                                          |
//! | ------------- | ---------------------------------------------------- |
//! | `polyconvert` | Re-encode a PolyData file as ASCII or binary         |
//!
//! ### Supported sections
//!
//! | Section                                  | Notes                                  |
//! | ---------------------------------------- | -------------------------------------- |
//! | `POINTS n type`                          | any of the ten element types           |
//! | `VERTICES`, `LINES`, `POLYGONS`          | any order, triangles read as polygons  |
//! | `SCALARS name type [n]` + `LOOKUP_TABLE` | multi-component scalars included       |
//! | `VECTORS`, `NORMALS`, `TENSORS`          | normals read back as vectors           |
//! | `COLOR_SCALARS name n`                   | always narrowed to unsigned bytes      |
//!
//! ## Advanced use
//!
//! The whole file can be read into a [PolyData](crate::mesh::PolyData) with a
//! one-liner.
//!
//! ```rust
//! // import the crate
//! use vtkpoly::read_polydata;
//!
//! // read any legacy PolyData file, ascii or binary
//! let mesh = read_polydata("./data/mixed_ascii.vtk").unwrap();
//!
//! // now do whatever you want with it:
//! //  - look at the points and cells,
//! //  - change the attributes,
//! //  - write it back out in the other encoding,
//! //  - etc...
//! ```
//!
//! Containers that manage their own buffers drive the codec directly through
//! the [MeshIo] trait implemented by [VtkPolyDataIo]: read the
//! [MeshInfo](crate::mesh::MeshInfo) first, size the buffers from it, then
//! read each one.
//!
//! As an overview:
//! - The [mesh] module contains the data model, cells and the container
//! - The [sections] module has the codec for every section of a file
//! - The [byte_order] and [element] modules deal with typed binary payloads
//! - The [ledger] module carries per-kind cell counts between passes
//!
//! In the background, the `nom` parser combinator library handles the header
//! lines, `thiserror` defines the domain errors that come back wrapped in
//! `anyhow`, and `clap` is used for the command line interface.

// Public facing modules
pub mod byte_order;
pub mod element;
pub mod error;
pub mod ledger;
pub mod mesh;
pub mod mesh_io;
pub mod polydata_io;
pub mod sections;
pub mod utils;

// note that docs are hidden to prevent confusing the current simple API
pub mod readers;

// Re-exports of useful data structures
#[doc(inline)]
pub use crate::error::PolyDataError;

#[doc(inline)]
pub use crate::mesh_io::MeshIo;

#[doc(inline)]
pub use crate::polydata_io::VtkPolyDataIo;

#[doc(inline)]
pub use crate::readers::read_polydata;
