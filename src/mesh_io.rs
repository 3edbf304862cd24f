//! Contract between a mesh container and a file format codec
//!
//! The container never looks at a file itself. It asks the codec for the
//! [MeshInfo] first, sizes its buffers from the counts in there, and then asks
//! for each buffer in turn. Writing is the reverse: the container hands over a
//! filled [MeshInfo] and then each buffer.

// internal modules
use crate::element::Element;
use crate::mesh::{FileType, MeshInfo};

// standard library
use std::path::Path;

// external crates
use anyhow::Result;

/// Read and write entry points of a mesh file format
///
/// Buffers are always owned by the caller and must be sized exactly as the
/// counts in [MeshIo::info] imply.
pub trait MeshIo {
    /// True if the file at `path` looks like something this format can read
    fn can_read_file(&self, path: &Path) -> bool;

    /// True if the format can write to `path`
    fn can_write_file(&self, path: &Path) -> bool;

    /// File every operation works on
    fn file_name(&self) -> &Path;

    /// Change the file every operation works on
    fn set_file_name(&mut self, path: &Path);

    /// Current description of the mesh
    fn info(&self) -> &MeshInfo;

    /// Mutable access for containers filling in a description to write
    fn info_mut(&mut self) -> &mut MeshInfo;

    /// Replace the whole description before a write cycle
    fn set_mesh_information(&mut self, info: MeshInfo) {
        *self.info_mut() = info;
    }

    fn set_file_type(&mut self, file_type: FileType) {
        self.info_mut().file_type = file_type;
    }

    fn set_file_type_as_ascii(&mut self) {
        self.set_file_type(FileType::Ascii);
    }

    fn set_file_type_as_binary(&mut self) {
        self.set_file_type(FileType::Binary);
    }

    /// Parse the headers of the file, replacing the current [MeshInfo]
    fn read_mesh_information(&mut self) -> Result<&MeshInfo>;

    fn read_points<T: Element>(&mut self, buffer: &mut [T]) -> Result<()>;

    /// Fill a flat tagged connectivity buffer
    fn read_cells(&mut self, buffer: &mut [u32]) -> Result<()>;

    fn read_point_data<T: Element>(&mut self, buffer: &mut [T]) -> Result<()>;

    fn read_cell_data<T: Element>(&mut self, buffer: &mut [T]) -> Result<()>;

    /// Start a new file from the current [MeshInfo]
    fn write_mesh_information(&mut self) -> Result<()>;

    fn write_points<T: Element>(&mut self, buffer: &[T]) -> Result<()>;

    /// Write a flat tagged connectivity buffer
    fn write_cells(&mut self, buffer: &[u32]) -> Result<()>;

    fn write_point_data<T: Element>(&mut self, buffer: &[T]) -> Result<()>;

    fn write_cell_data<T: Element>(&mut self, buffer: &[T]) -> Result<()>;
}
