//! Legacy VTK PolyData implementation of [MeshIo]
//!
//! Every operation opens the file on its own and drops the handle before
//! returning, errors included. The only state kept between operations is the
//! [MeshInfo] record, which carries the cell ledger from a header read or a
//! [MeshIo::write_cells] call to whoever needs it next.
//!
//! A write cycle must start with [MeshIo::write_mesh_information], which
//! truncates the file, and every later write appends a section to it.
//!
//! ```no_run
//! # use vtkpoly::{MeshIo, VtkPolyDataIo};
//! # use vtkpoly::mesh::{AttributeInfo, ComponentType, PixelKind};
//! # fn main() -> anyhow::Result<()> {
//! let mut io = VtkPolyDataIo::with_file_name("triangle.vtk");
//! io.set_file_type_as_binary();
//! io.info_mut().number_of_points = 3;
//! io.info_mut().number_of_cells = 1;
//! io.info_mut().point_data = Some(AttributeInfo::new(PixelKind::Scalar, ComponentType::Float, 1));
//!
//! io.write_mesh_information()?;
//! io.write_points(&[0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])?;
//! io.write_cells(&[2, 3, 0, 1, 2])?;
//! io.write_point_data(&[0.5f32, 1.5, 2.5])?;
//! # Ok(())
//! # }
//! ```

// internal modules
use crate::element::Element;
use crate::mesh::MeshInfo;
use crate::mesh_io::MeshIo;
use crate::readers::SectionScanner;
use crate::sections::{self, Association};
use crate::utils::*;

// standard library
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

// external crates
use anyhow::{anyhow, Context, Result};
use log::debug;

/// Codec for `DATASET POLYDATA` legacy files, ASCII or BINARY
#[derive(Debug, Default)]
pub struct VtkPolyDataIo {
    /// File every operation works on
    file_name: PathBuf,
    /// Header of the last file read, or of the next one written
    info: MeshInfo,
}

impl VtkPolyDataIo {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }

    /// Codec bound to `path` from the start
    pub fn with_file_name<P: AsRef<Path>>(path: P) -> Self {
        Self {
            file_name: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    fn open_scanner(&self) -> Result<SectionScanner<BufReader<File>>> {
        SectionScanner::open(&self.file_name)
    }

    fn open_append(&self) -> Result<BufWriter<File>> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.file_name)
            .with_context(|| {
                f!(
                    "Could not open {} for writing, was write_mesh_information() called?",
                    self.file_name.display()
                )
            })?;
        Ok(BufWriter::new(file))
    }

    fn append_with<F>(&self, write: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<()>,
    {
        let mut writer = self.open_append()?;
        write(&mut writer)?;
        writer
            .flush()
            .with_context(|| f!("Could not write to {}", self.file_name.display()))
    }
}

impl MeshIo for VtkPolyDataIo {
    fn can_read_file(&self, path: &Path) -> bool {
        if !has_extension(path, "vtk") {
            return false;
        }
        match SectionScanner::open(path) {
            Ok(_) => true,
            Err(e) => {
                debug!("Cannot read {}: {e}", path.display());
                false
            }
        }
    }

    fn can_write_file(&self, path: &Path) -> bool {
        has_extension(path, "vtk")
    }

    fn file_name(&self) -> &Path {
        &self.file_name
    }

    fn set_file_name(&mut self, path: &Path) {
        self.file_name = path.to_path_buf();
    }

    fn info(&self) -> &MeshInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut MeshInfo {
        &mut self.info
    }

    fn read_mesh_information(&mut self) -> Result<&MeshInfo> {
        debug!("Reading mesh information from {}", self.file_name.display());
        let mut scanner = self.open_scanner()?;
        self.info = sections::read_mesh_info(&mut scanner)?;
        Ok(&self.info)
    }

    fn read_points<T: Element>(&mut self, buffer: &mut [T]) -> Result<()> {
        let mut scanner = self.open_scanner()?;
        self.info.point_component =
            sections::read_points(&mut scanner, self.info.point_dimension, buffer)?;
        Ok(())
    }

    fn read_cells(&mut self, buffer: &mut [u32]) -> Result<()> {
        let mut scanner = self.open_scanner()?;
        let ledger = sections::read_cells(&mut scanner, buffer)?;
        self.info.ledger = ledger;
        self.info.number_of_cells = ledger.total_cells();
        self.info.cell_buffer_size = buffer.len();
        Ok(())
    }

    fn read_point_data<T: Element>(&mut self, buffer: &mut [T]) -> Result<()> {
        let mut scanner = self.open_scanner()?;
        sections::read_attribute(&mut scanner, Association::Point, buffer)?;
        Ok(())
    }

    fn read_cell_data<T: Element>(&mut self, buffer: &mut [T]) -> Result<()> {
        let mut scanner = self.open_scanner()?;
        sections::read_attribute(&mut scanner, Association::Cell, buffer)?;
        Ok(())
    }

    fn write_mesh_information(&mut self) -> Result<()> {
        debug!("Starting {} as {}", self.file_name.display(), self.info.file_type);
        let file = File::create(&self.file_name)
            .with_context(|| f!("Could not create {}", self.file_name.display()))?;
        let mut writer = BufWriter::new(file);
        sections::write_preamble(&mut writer, &self.info)?;
        writer
            .flush()
            .with_context(|| f!("Could not write to {}", self.file_name.display()))
    }

    fn write_points<T: Element>(&mut self, buffer: &[T]) -> Result<()> {
        let info = &self.info;
        self.append_with(|w| {
            sections::write_points(
                w,
                info.number_of_points,
                info.point_dimension,
                buffer,
                info.file_type,
            )
        })
    }

    fn write_cells(&mut self, buffer: &[u32]) -> Result<()> {
        // the ledger has to be complete before the first header goes out
        let ledger = sections::update_cell_information(buffer, self.info.number_of_cells)?;
        self.info.ledger = ledger;
        self.info.cell_buffer_size = ledger.tagged_buffer_size();

        let info = &self.info;
        self.append_with(|w| {
            sections::write_cells(w, buffer, info.number_of_cells, &info.ledger, info.file_type)
        })
    }

    fn write_point_data<T: Element>(&mut self, buffer: &[T]) -> Result<()> {
        let info = &self.info;
        let attribute = info
            .point_data
            .as_ref()
            .ok_or_else(|| anyhow!("No point data described in the mesh information"))?;
        self.append_with(|w| {
            sections::write_attribute(
                w,
                Association::Point,
                info.number_of_points,
                attribute,
                buffer,
                info.file_type,
            )
        })
    }

    fn write_cell_data<T: Element>(&mut self, buffer: &[T]) -> Result<()> {
        let info = &self.info;
        let attribute = info
            .cell_data
            .as_ref()
            .ok_or_else(|| anyhow!("No cell data described in the mesh information"))?;
        self.append_with(|w| {
            sections::write_attribute(
                w,
                Association::Cell,
                info.number_of_cells,
                attribute,
                buffer,
                info.file_type,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PolyDataError;
    use crate::mesh::{AttributeInfo, ComponentType, FileType, PixelKind};
    use rstest::rstest;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(f!("vtkpoly_io_{}_{name}", std::process::id()))
    }

    #[rstest]
    #[case("mesh.vtk", true)]
    #[case("MESH.VTK", true)]
    #[case("mesh.vtp", false)]
    #[case("mesh", false)]
    fn writable_extensions(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(VtkPolyDataIo::new().can_write_file(Path::new(name)), expected);
    }

    #[test]
    fn readable_only_with_a_polydata_preamble() {
        let good = temp_path("good.vtk");
        let bad = temp_path("bad.vtk");
        std::fs::write(&good, "# vtk DataFile Version 3.0\nt\nASCII\nDATASET POLYDATA\n").unwrap();
        std::fs::write(&bad, "# vtk DataFile Version 3.0\nt\nASCII\nDATASET STRUCTURED_POINTS\n").unwrap();

        let io = VtkPolyDataIo::new();
        assert!(io.can_read_file(&good));
        assert!(!io.can_read_file(&bad));
        assert!(!io.can_read_file(&temp_path("missing.vtk")));

        std::fs::remove_file(good).unwrap();
        std::fs::remove_file(bad).unwrap();
    }

    #[rstest]
    #[case(FileType::Ascii)]
    #[case(FileType::Binary)]
    fn write_cycle_then_read_cycle(#[case] file_type: FileType) {
        let path = temp_path(&f!("cycle_{file_type}.vtk"));
        let points = [0.0f64, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let cells = [0, 1, 3, 4, 4, 0, 1, 2, 3];
        let normals = [0.0f32, 0.0, 1.0, 0.0, 0.0, -1.0];

        let mut io = VtkPolyDataIo::with_file_name(&path);
        io.set_file_type(file_type);
        io.info_mut().number_of_points = 4;
        io.info_mut().number_of_cells = 2;
        io.info_mut().cell_data =
            Some(AttributeInfo::new(PixelKind::CovariantVector, ComponentType::Float, 3));

        io.write_mesh_information().unwrap();
        io.write_points(&points).unwrap();
        io.write_cells(&cells).unwrap();
        io.write_cell_data(&normals).unwrap();
        assert_eq!(io.info().cell_buffer_size, cells.len());

        let mut io = VtkPolyDataIo::with_file_name(&path);
        let info = io.read_mesh_information().unwrap().clone();
        assert_eq!(info.file_type, file_type);
        assert_eq!(info.point_component, ComponentType::Double);
        assert_eq!(info.number_of_cells, 2);
        assert_eq!(info.cell_buffer_size, cells.len());
        assert!(info.point_data.is_none());

        let cell_data = info.cell_data.as_ref().unwrap();
        assert_eq!(cell_data.pixel, PixelKind::Vector);
        assert_eq!(cell_data.components, 3);

        let mut decoded_points = vec![0.0f64; info.point_buffer_size()];
        io.read_points(&mut decoded_points).unwrap();
        assert_eq!(decoded_points, points);

        let mut decoded_cells = vec![0u32; info.cell_buffer_size];
        io.read_cells(&mut decoded_cells).unwrap();
        assert_eq!(decoded_cells, cells);

        let mut decoded_normals = vec![0.0f32; 6];
        io.read_cell_data(&mut decoded_normals).unwrap();
        assert_eq!(decoded_normals, normals);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn failed_cell_write_leaves_no_section() {
        let path = temp_path("bad_cells.vtk");
        let mut io = VtkPolyDataIo::with_file_name(&path);
        io.info_mut().number_of_cells = 1;
        io.write_mesh_information().unwrap();

        let error = io.write_cells(&[5, 3, 0, 1, 2]).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<PolyDataError>(),
            Some(PolyDataError::UnsupportedCellKind { tag: 5 })
        ));

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 4);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn writing_without_a_preamble_fails() {
        let mut io = VtkPolyDataIo::with_file_name(temp_path("never_started.vtk"));
        io.info_mut().number_of_points = 1;
        assert!(io.write_points(&[0.0f32; 3]).is_err());
    }
}
