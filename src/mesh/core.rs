// internal modules
use crate::ledger::CellLedger;
use crate::utils::*;

// standard library
use std::str::FromStr;

// external crates
use anyhow::{anyhow, Result};
use serde::Serialize;

/// Text or raw big-endian binary payloads
///
/// The header lines are always text, this only decides how the numeric blocks
/// that follow them are encoded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileType {
    /// Whitespace separated tokens
    #[default]
    Ascii,
    /// Big-endian byte blocks followed by a newline
    Binary,
}

impl FileType {
    /// Keyword used on the third line of the file
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Ascii => "ASCII",
            Self::Binary => "BINARY",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Element types as named in section headers
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComponentType {
    UnsignedChar,
    Char,
    UnsignedShort,
    Short,
    UnsignedInt,
    Int,
    UnsignedLong,
    Long,
    #[default]
    Float,
    Double,
}

impl ComponentType {
    /// Size in bytes of one element of this type
    ///
    /// ```rust
    /// # use vtkpoly::mesh::ComponentType;
    /// assert_eq!(ComponentType::Double.width(), 8);
    /// assert_eq!(ComponentType::UnsignedChar.width(), 1);
    /// ```
    pub fn width(&self) -> usize {
        match self {
            Self::UnsignedChar | Self::Char => 1,
            Self::UnsignedShort | Self::Short => 2,
            Self::UnsignedInt | Self::Int | Self::Float => 4,
            Self::UnsignedLong | Self::Long | Self::Double => 8,
        }
    }

    /// Name written in POINTS, SCALARS, VECTORS and TENSORS headers
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::UnsignedChar => "unsigned_char",
            Self::Char => "char",
            Self::UnsignedShort => "unsigned_short",
            Self::Short => "short",
            Self::UnsignedInt => "unsigned_int",
            Self::Int => "int",
            Self::UnsignedLong => "unsigned_long",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

impl FromStr for ComponentType {
    type Err = anyhow::Error;

    /// Case-insensitive, also accepts the `vtktypeint64` style aliases
    fn from_str(s: &str) -> Result<Self> {
        let component = match s.to_lowercase().as_str() {
            "unsigned_char" | "vtktypeuint8" => Self::UnsignedChar,
            "char" | "signed_char" | "vtktypeint8" => Self::Char,
            "unsigned_short" | "vtktypeuint16" => Self::UnsignedShort,
            "short" | "vtktypeint16" => Self::Short,
            "unsigned_int" | "vtktypeuint32" => Self::UnsignedInt,
            "int" | "vtktypeint32" => Self::Int,
            "unsigned_long" | "vtktypeuint64" | "vtkidtype" => Self::UnsignedLong,
            "long" | "vtktypeint64" => Self::Long,
            "float" | "vtktypefloat32" => Self::Float,
            "double" | "vtktypefloat64" => Self::Double,
            _ => return Err(anyhow!("Unknown component type \"{s}\"")),
        };
        Ok(component)
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Semantic shape of an attribute value
///
/// Mirrors the full set of pixel types a mesh container can declare. Only some
/// of these have a keyword in the legacy format, the rest are rejected when
/// writing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PixelKind {
    #[default]
    Scalar,
    Offset,
    Point,
    CovariantVector,
    Vector,
    SymmetricSecondRankTensor,
    DiffusionTensor3D,
    Array,
    VariableLengthVector,
    Rgb,
    Rgba,
    FixedArray,
    Matrix,
    Complex,
    Unknown,
}

/// Description of the attribute attached to points or cells
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeInfo {
    /// Declared shape of each value
    pub pixel: PixelKind,
    /// Element type of the components
    pub component: ComponentType,
    /// Components per point or cell
    pub components: usize,
    /// Data name written after the shape keyword
    pub name: String,
}

impl AttributeInfo {
    /// Convenience constructor, the name falls back to a default per shape
    ///
    /// ```rust
    /// # use vtkpoly::mesh::{AttributeInfo, ComponentType, PixelKind};
    /// let info = AttributeInfo::new(PixelKind::Vector, ComponentType::Float, 3);
    /// assert_eq!(info.name, "vectors");
    /// ```
    pub fn new(pixel: PixelKind, component: ComponentType, components: usize) -> Self {
        Self {
            pixel,
            component,
            components,
            name: Self::default_name(pixel).to_string(),
        }
    }

    /// Builder-style name override
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Name used when the container did not provide one
    pub fn default_name(pixel: PixelKind) -> &'static str {
        match pixel {
            PixelKind::Scalar => "scalars",
            PixelKind::Offset
            | PixelKind::Point
            | PixelKind::CovariantVector
            | PixelKind::Vector => "vectors",
            PixelKind::SymmetricSecondRankTensor | PixelKind::DiffusionTensor3D => "tensors",
            PixelKind::Array | PixelKind::VariableLengthVector => "colors",
            _ => "data",
        }
    }
}

/// Everything known about a mesh before its buffers are read or written
///
/// This is the typed stand-in for a free-form metadata dictionary. The reader
/// fills it from the file header, the writer takes it from the container and
/// refreshes the cell [CellLedger] from the connectivity buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshInfo {
    /// Free text second line of the file
    pub title: String,
    /// Encoding of the numeric blocks
    pub file_type: FileType,
    /// Coordinates per point, always 3 for the legacy format
    pub point_dimension: usize,
    /// Number of points in the POINTS section
    pub number_of_points: usize,
    /// Element type of the point coordinates
    pub point_component: ComponentType,
    /// Total cells across VERTICES, LINES and POLYGONS
    pub number_of_cells: usize,
    /// Length of the flat tagged connectivity buffer
    pub cell_buffer_size: usize,
    /// Per-kind cell and index counts
    pub ledger: CellLedger,
    /// Attribute attached to every point, if any
    pub point_data: Option<AttributeInfo>,
    /// Attribute attached to every cell, if any
    pub cell_data: Option<AttributeInfo>,
}

impl Default for MeshInfo {
    fn default() -> Self {
        Self {
            title: "File written by vtkpoly".to_string(),
            file_type: FileType::Ascii,
            point_dimension: 3,
            number_of_points: 0,
            point_component: ComponentType::Float,
            number_of_cells: 0,
            cell_buffer_size: 0,
            ledger: CellLedger::default(),
            point_data: None,
            cell_data: None,
        }
    }
}

impl MeshInfo {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }

    /// Length of the flat point coordinate buffer
    pub fn point_buffer_size(&self) -> usize {
        self.number_of_points * self.point_dimension
    }

    /// Length of the point attribute buffer, zero without point data
    pub fn point_data_size(&self) -> usize {
        self.point_data
            .as_ref()
            .map_or(0, |a| a.components * self.number_of_points)
    }

    /// Length of the cell attribute buffer, zero without cell data
    pub fn cell_data_size(&self) -> usize {
        self.cell_data
            .as_ref()
            .map_or(0, |a| a.components * self.number_of_cells)
    }
}

impl std::fmt::Display for MeshInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = "MeshInfo {\n".to_string();
        s += &f!("    file type: {}\n", self.file_type);
        s += &f!(
            "    points: {} ({}, dimension {})\n",
            self.number_of_points,
            self.point_component,
            self.point_dimension
        );
        s += &f!(
            "    cells: {} (buffer of {})\n",
            self.number_of_cells,
            self.cell_buffer_size
        );
        s += &f!("    {}\n", self.ledger);
        for (label, data) in [("point", &self.point_data), ("cell", &self.cell_data)] {
            if let Some(a) = data {
                s += &f!(
                    "    {label} data: \"{}\" {:?} x{} ({})\n",
                    a.name,
                    a.pixel,
                    a.components,
                    a.component
                );
            }
        }
        s += "}";
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("float", ComponentType::Float)]
    #[case("DOUBLE", ComponentType::Double)]
    #[case("unsigned_char", ComponentType::UnsignedChar)]
    #[case("vtktypeint64", ComponentType::Long)]
    fn component_names(#[case] name: &str, #[case] expected: ComponentType) {
        assert_eq!(name.parse::<ComponentType>().unwrap(), expected);
    }

    #[test]
    fn unknown_component_name() {
        assert!("quaternion".parse::<ComponentType>().is_err());
    }

    #[test]
    fn buffer_sizes_follow_counts() {
        let mut info = MeshInfo::new();
        info.number_of_points = 4;
        info.number_of_cells = 2;
        info.point_data = Some(AttributeInfo::new(PixelKind::Vector, ComponentType::Float, 3));
        assert_eq!(info.point_buffer_size(), 12);
        assert_eq!(info.point_data_size(), 12);
        assert_eq!(info.cell_data_size(), 0);
    }
}
