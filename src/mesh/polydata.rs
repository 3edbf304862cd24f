// internal modules
use crate::element::Element;
use crate::mesh::{
    cells_from_connectivity, cells_to_connectivity, AttributeInfo, Cell, ComponentType, FileType,
    MeshInfo, PixelKind,
};
use crate::mesh_io::MeshIo;
use crate::polydata_io::VtkPolyDataIo;
use crate::utils::*;

// standard library
use std::path::Path;

// external crates
use anyhow::{bail, Result};
use log::{debug, info};

/// Attribute values attached to every point or every cell
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeData {
    /// Shape, element type, component count and name
    pub info: AttributeInfo,
    /// `entities * info.components` values, widened to `f64`
    pub values: Vec<f64>,
}

/// Minimal in-memory polygonal mesh
///
/// Holds everything a legacy PolyData file can describe, with numeric data
/// widened to `f64` and topology as owned [Cell]s. Reading and writing go
/// through the [MeshIo] contract, so this is also the reference for how a
/// container is expected to drive the codec.
///
/// ```rust
/// # use vtkpoly::mesh::{Cell, PolyData, PolylineCell};
/// let mut mesh = PolyData::new();
/// mesh.points = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 1.0, 0.0];
/// mesh.cells.push(Cell::Polyline(PolylineCell::from_point_ids(&[0, 1, 2])));
///
/// assert_eq!(mesh.number_of_cells(), 1);
/// assert_eq!(mesh.info().point_component, vtkpoly::mesh::ComponentType::Float);
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PolyData {
    /// Title, encoding and element types used when written
    info: MeshInfo,
    /// Flat `x y z` coordinates, three per point
    pub points: Vec<f64>,
    /// Topology in the order it was read or built
    pub cells: Vec<Cell>,
    /// Optional attribute on every point
    pub point_data: Option<AttributeData>,
    /// Optional attribute on every cell
    pub cell_data: Option<AttributeData>,
}

/// Buffers of the file, used to pick the typed read or write call
#[derive(Debug, Clone, Copy)]
enum Target {
    Points,
    PointData,
    CellData,
}

/// Run a generic function with the element type matching a [ComponentType]
macro_rules! with_component {
    ($component:expr, $function:ident($($arg:expr),*)) => {
        match $component {
            ComponentType::UnsignedChar => $function::<u8>($($arg),*),
            ComponentType::Char => $function::<i8>($($arg),*),
            ComponentType::UnsignedShort => $function::<u16>($($arg),*),
            ComponentType::Short => $function::<i16>($($arg),*),
            ComponentType::UnsignedInt => $function::<u32>($($arg),*),
            ComponentType::Int => $function::<i32>($($arg),*),
            ComponentType::UnsignedLong => $function::<u64>($($arg),*),
            ComponentType::Long => $function::<i64>($($arg),*),
            ComponentType::Float => $function::<f32>($($arg),*),
            ComponentType::Double => $function::<f64>($($arg),*),
        }
    };
}

impl PolyData {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }

    /// Description of the mesh as it would be written
    ///
    /// Counts and attribute descriptors always reflect the current contents.
    pub fn info(&self) -> MeshInfo {
        let mut info = self.info.clone();
        info.number_of_points = self.number_of_points();
        info.number_of_cells = self.number_of_cells();
        info.point_data = self.point_data.as_ref().map(|a| a.info.clone());
        info.cell_data = self.cell_data.as_ref().map(|a| a.info.clone());
        info
    }

    pub fn number_of_points(&self) -> usize {
        self.points.len() / 3
    }

    pub fn number_of_cells(&self) -> usize {
        self.cells.len()
    }

    /// Free text second line of the file
    pub fn set_title(&mut self, title: &str) {
        self.info.title = title.to_string();
    }

    /// Element type the coordinates are written as
    pub fn set_point_component(&mut self, component: ComponentType) {
        self.info.point_component = component;
    }

    /// Cells flattened into a tagged connectivity buffer
    pub fn connectivity(&self) -> Vec<u32> {
        cells_to_connectivity(&self.cells)
    }

    /// Read a whole legacy PolyData file
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Reading {}", path.display());

        let mut io = VtkPolyDataIo::with_file_name(path);
        if !io.can_read_file(path) {
            bail!("{} is not a readable legacy PolyData file", path.display());
        }
        let info = io.read_mesh_information()?.clone();

        let points = with_component!(
            info.point_component,
            read_widened(&mut io, Target::Points, info.point_buffer_size())
        )?;

        let mut connectivity = vec![0u32; info.cell_buffer_size];
        io.read_cells(&mut connectivity)?;
        let cells = cells_from_connectivity(&connectivity, info.number_of_cells)?;

        let point_data = match &info.point_data {
            Some(attribute) => Some(AttributeData {
                info: attribute.clone(),
                values: with_component!(
                    read_component(attribute, info.file_type),
                    read_widened(&mut io, Target::PointData, info.point_data_size())
                )?,
            }),
            None => None,
        };

        let cell_data = match &info.cell_data {
            Some(attribute) => Some(AttributeData {
                info: attribute.clone(),
                values: with_component!(
                    read_component(attribute, info.file_type),
                    read_widened(&mut io, Target::CellData, info.cell_data_size())
                )?,
            }),
            None => None,
        };

        debug!(
            "Read {} points and {} cells",
            info.number_of_points, info.number_of_cells
        );

        Ok(Self {
            info,
            points,
            cells,
            point_data,
            cell_data,
        })
    }

    /// Write the whole mesh as a legacy PolyData file
    ///
    /// Values are narrowed to the element types in the attribute descriptors,
    /// and to [MeshInfo::point_component] for the coordinates.
    pub fn write<P: AsRef<Path>>(&self, path: P, file_type: FileType) -> Result<()> {
        let path = path.as_ref();
        info!("Writing {} as {file_type}", path.display());

        if self.points.len() % 3 != 0 {
            bail!(
                "Point buffer of {} values is not a whole number of points",
                self.points.len()
            );
        }

        let mut io = VtkPolyDataIo::with_file_name(path);
        if !io.can_write_file(path) {
            bail!("{} does not have a .vtk extension", path.display());
        }

        let mut info = self.info();
        info.file_type = file_type;
        io.set_mesh_information(info.clone());

        io.write_mesh_information()?;
        with_component!(
            info.point_component,
            write_narrowed(&mut io, Target::Points, &self.points)
        )?;

        if !self.cells.is_empty() {
            io.write_cells(&self.connectivity())?;
        }

        if let Some(data) = &self.point_data {
            with_component!(
                data.info.component,
                write_narrowed(&mut io, Target::PointData, &data.values)
            )?;
        }

        if let Some(data) = &self.cell_data {
            with_component!(
                data.info.component,
                write_narrowed(&mut io, Target::CellData, &data.values)
            )?;
        }

        Ok(())
    }
}

impl std::fmt::Display for PolyData {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = f!("PolyData \"{}\"\n", self.info.title);
        s += &f!("    points: {}\n", self.number_of_points());
        s += &f!("    cells: {}\n", self.number_of_cells());
        for (label, data) in [("point", &self.point_data), ("cell", &self.cell_data)] {
            if let Some(a) = data {
                s += &f!(
                    "    {label} data: \"{}\" {:?} x{}\n",
                    a.info.name,
                    a.info.pixel,
                    a.info.components
                );
            }
        }
        write!(f, "{}", s.trim_end())
    }
}

/// Element type an attribute is read through
///
/// Text colours are often written as fractions in `[0, 1]`, which would not
/// survive a byte buffer.
fn read_component(attribute: &AttributeInfo, file_type: FileType) -> ComponentType {
    match (attribute.pixel, file_type) {
        (PixelKind::VariableLengthVector, FileType::Ascii) => ComponentType::Double,
        _ => attribute.component,
    }
}

/// Read one buffer as `T` and widen every value to `f64`
fn read_widened<T: Element>(io: &mut VtkPolyDataIo, target: Target, len: usize) -> Result<Vec<f64>> {
    let mut buffer = vec![T::default(); len];
    match target {
        Target::Points => io.read_points(&mut buffer)?,
        Target::PointData => io.read_point_data(&mut buffer)?,
        Target::CellData => io.read_cell_data(&mut buffer)?,
    }
    Ok(buffer.into_iter().map(|v| v.to_f64()).collect())
}

/// Narrow every value to `T` and write one buffer
fn write_narrowed<T: Element>(io: &mut VtkPolyDataIo, target: Target, values: &[f64]) -> Result<()> {
    let buffer = values.iter().map(|v| T::from_f64(*v)).collect::<Vec<T>>();
    match target {
        Target::Points => io.write_points(&buffer),
        Target::PointData => io.write_point_data(&buffer),
        Target::CellData => io.write_cell_data(&buffer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PolylineCell;
    use rstest::rstest;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(f!("vtkpoly_polydata_{}_{name}", std::process::id()))
    }

    fn sample() -> PolyData {
        let mut mesh = PolyData::new();
        mesh.set_title("sample mesh");
        mesh.set_point_component(ComponentType::Double);
        mesh.points = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.25];
        mesh.cells = vec![
            Cell::Vertex(vec![3]),
            Cell::Polyline(PolylineCell::from_point_ids(&[0, 1, 2])),
            Cell::Polygon(vec![0, 1, 2, 3]),
        ];
        mesh.point_data = Some(AttributeData {
            info: AttributeInfo::new(PixelKind::Scalar, ComponentType::Float, 1)
                .with_name("temperature"),
            values: vec![290.5, 291.0, 300.25, 310.0],
        });
        mesh.cell_data = Some(AttributeData {
            info: AttributeInfo::new(PixelKind::Array, ComponentType::UnsignedChar, 3),
            values: vec![255.0, 0.0, 0.0, 0.0, 255.0, 0.0, 0.0, 0.0, 255.0],
        });
        mesh
    }

    #[test]
    fn info_tracks_contents() {
        let mesh = sample();
        let info = mesh.info();
        assert_eq!(info.title, "sample mesh");
        assert_eq!(info.number_of_points, 4);
        assert_eq!(info.number_of_cells, 3);
        assert_eq!(info.cell_data_size(), 9);
        assert_eq!(info.point_data.unwrap().name, "temperature");
    }

    #[rstest]
    #[case(FileType::Ascii)]
    #[case(FileType::Binary)]
    fn whole_mesh_round_trip(#[case] file_type: FileType) {
        let path = temp_path(&f!("sample_{file_type}.vtk"));
        let mesh = sample();
        mesh.write(&path, file_type).unwrap();

        let read = PolyData::read(&path).unwrap();
        assert_eq!(read.info().title, "sample mesh");
        assert_eq!(read.info().file_type, file_type);
        assert_eq!(read.points, mesh.points);
        assert_eq!(read.cells, mesh.cells);

        let point_data = read.point_data.unwrap();
        assert_eq!(point_data.info.name, "temperature");
        assert_eq!(point_data.values, mesh.point_data.unwrap().values);

        let cell_data = read.cell_data.unwrap();
        assert_eq!(cell_data.info.pixel, PixelKind::VariableLengthVector);
        assert_eq!(cell_data.values, mesh.cell_data.unwrap().values);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn text_colour_fractions_are_kept() {
        let path = temp_path("fractions.vtk");
        std::fs::write(
            &path,
            "# vtk DataFile Version 3.0\nfractions\nASCII\nDATASET POLYDATA\n\
             POINTS 2 float\n0 0 0 1 0 0\nPOINT_DATA 2\nCOLOR_SCALARS rgb 3\n\
             0.5 0.25 1\n0 0.75 0.125\n",
        )
        .unwrap();

        let mesh = PolyData::read(&path).unwrap();
        let colours = mesh.point_data.unwrap();
        assert_eq!(colours.info.component, ComponentType::UnsignedChar);
        assert_eq!(colours.values, vec![0.5, 0.25, 1.0, 0.0, 0.75, 0.125]);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn wrong_extension_is_refused() {
        assert!(sample().write(temp_path("sample.txt"), FileType::Ascii).is_err());
    }
}
