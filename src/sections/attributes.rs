// internal modules
use crate::byte_order::write_wire;
use crate::element::Element;
use crate::error::PolyDataError;
use crate::mesh::{AttributeInfo, ComponentType, FileType, PixelKind};
use crate::readers::parsers;
use crate::readers::SectionScanner;
use crate::utils::*;

// standard library
use std::io::{BufRead, Write};

// external crates
use anyhow::{bail, Result};
use log::{debug, trace};
use serde::Serialize;

/// Entities an attribute section is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Association {
    Point,
    Cell,
}

impl Association {
    /// Keyword of the data section header, e.g. `POINT_DATA <n>`
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Point => "POINT_DATA",
            Self::Cell => "CELL_DATA",
        }
    }

    /// Lowercase name used in messages
    pub fn context(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Cell => "cell",
        }
    }
}

/// Attribute shapes with a keyword in the legacy format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttributeShape {
    Scalars,
    Vectors,
    Normals,
    Tensors,
    ColorScalars,
}

impl AttributeShape {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Scalars => "SCALARS",
            Self::Vectors => "VECTORS",
            Self::Normals => "NORMALS",
            Self::Tensors => "TENSORS",
            Self::ColorScalars => "COLOR_SCALARS",
        }
    }

    /// Components per entity for shapes that do not declare their own
    pub fn components(&self) -> usize {
        match self {
            Self::Vectors | Self::Normals => 3,
            Self::Tensors => 9,
            Self::Scalars | Self::ColorScalars => 1,
        }
    }

    /// Pixel kind given to an attribute read from a section of this shape
    pub fn pixel(&self) -> PixelKind {
        match self {
            Self::Scalars => PixelKind::Scalar,
            Self::Vectors | Self::Normals => PixelKind::Vector,
            Self::Tensors => PixelKind::SymmetricSecondRankTensor,
            Self::ColorScalars => PixelKind::VariableLengthVector,
        }
    }

    /// Shape a declared pixel kind is written as
    ///
    /// ```rust
    /// # use vtkpoly::sections::{Association, AttributeShape};
    /// # use vtkpoly::mesh::PixelKind;
    /// let shape = AttributeShape::from_pixel(PixelKind::CovariantVector, Association::Point);
    /// assert_eq!(shape.unwrap(), AttributeShape::Vectors);
    /// assert!(AttributeShape::from_pixel(PixelKind::Matrix, Association::Cell).is_err());
    /// ```
    pub fn from_pixel(pixel: PixelKind, association: Association) -> Result<Self, PolyDataError> {
        match pixel {
            PixelKind::Scalar => Ok(Self::Scalars),
            PixelKind::Offset
            | PixelKind::Point
            | PixelKind::CovariantVector
            | PixelKind::Vector => Ok(Self::Vectors),
            PixelKind::SymmetricSecondRankTensor | PixelKind::DiffusionTensor3D => {
                Ok(Self::Tensors)
            }
            PixelKind::Array | PixelKind::VariableLengthVector => Ok(Self::ColorScalars),
            _ => Err(PolyDataError::UnknownPixelKind {
                context: association.context(),
                pixel,
            }),
        }
    }
}

/// Parsed attribute classification line
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeHeader {
    pub shape: AttributeShape,
    pub name: String,
    /// Element type, `None` for COLOR_SCALARS which are always bytes
    pub component: Option<ComponentType>,
    pub components: usize,
}

impl AttributeHeader {
    /// Element type of the payload, unsigned bytes for COLOR_SCALARS
    pub fn component_type(&self) -> ComponentType {
        self.component.unwrap_or(ComponentType::UnsignedChar)
    }

    /// Bytes per element of a binary payload
    pub fn width(&self) -> usize {
        self.component_type().width()
    }

    /// Descriptor handed to the mesh container
    pub fn info(&self) -> AttributeInfo {
        AttributeInfo::new(self.shape.pixel(), self.component_type(), self.components)
            .with_name(&self.name)
    }
}

/// Read the classification line that follows a data section header
///
/// Plain SCALARS must be followed by a LOOKUP_TABLE line, which is consumed
/// here too. A missing line is fatal in every case.
pub fn read_attribute_header<R: BufRead>(
    scanner: &mut SectionScanner<R>,
    association: Association,
) -> Result<AttributeHeader> {
    let Some(line) = scanner.next_line()? else {
        bail!(PolyDataError::malformed(
            association.keyword(),
            "end of file before the attribute header"
        ));
    };

    let header = match parsers::attribute_header(line.trim_start()) {
        Ok((_, header)) => header,
        Err(_) => bail!(PolyDataError::malformed(
            association.keyword(),
            f!("expected an attribute header, found \"{line}\"")
        )),
    };
    trace!("[{}] {line}", header.shape.keyword());

    if header.shape == AttributeShape::Scalars {
        match scanner.next_line()? {
            Some(line) if parsers::is_lookup_table(&line) => trace!("[LOOKUP_TABLE] {line}"),
            Some(line) => bail!(PolyDataError::malformed(
                "SCALARS",
                f!("expected LOOKUP_TABLE, found \"{line}\"")
            )),
            None => bail!(PolyDataError::malformed(
                "SCALARS",
                "end of file while looking for LOOKUP_TABLE"
            )),
        }
    }

    Ok(header)
}

/// Read the first attribute of the point or cell data section into `buffer`
///
/// Returns the parsed header, or `None` if the file has no such data section,
/// in which case `buffer` has to be empty.
pub fn read_attribute<R: BufRead, T: Element>(
    scanner: &mut SectionScanner<R>,
    association: Association,
    buffer: &mut [T],
) -> Result<Option<AttributeHeader>> {
    let keyword = association.keyword();
    let Some(line) = scanner.seek(keyword)? else {
        if !buffer.is_empty() {
            bail!(PolyDataError::SizeMismatch {
                what: "attribute",
                expected: 0,
                actual: buffer.len(),
            });
        }
        debug!("No {keyword} section found");
        return Ok(None);
    };

    let entities = match parsers::data_header(keyword)(&line) {
        Ok((_, n)) => n,
        Err(_) => bail!(PolyDataError::malformed(keyword, f!("bad header \"{line}\""))),
    };

    let header = read_attribute_header(scanner, association)?;
    let expected = entities * header.components;
    if buffer.len() != expected {
        bail!(PolyDataError::SizeMismatch {
            what: "attribute",
            expected,
            actual: buffer.len(),
        });
    }

    debug!(
        "Reading {} {} \"{}\" x{}",
        association.context(),
        header.shape.keyword(),
        header.name,
        header.components
    );

    let section = header.shape.keyword();
    match (header.shape, scanner.file_type()) {
        (AttributeShape::ColorScalars, FileType::Binary) => {
            let bytes = scanner.read_bytes(section, expected)?;
            for (value, byte) in buffer.iter_mut().zip(bytes) {
                *value = T::from_f64(byte as f64);
            }
        }
        (AttributeShape::ColorScalars, FileType::Ascii) => {
            let mut values = vec![0.0f64; expected];
            scanner.read_ascii_into(section, &mut values)?;
            for (value, v) in buffer.iter_mut().zip(values) {
                *value = T::from_f64(v);
            }
        }
        _ => scanner.read_values(section, header.component_type(), buffer)?,
    }

    Ok(Some(header))
}

/// Write a complete point or cell data section
///
/// The pixel kind and buffer length are validated before anything is written,
/// so a failure never leaves a partial section behind.
pub fn write_attribute<W: Write, T: Element>(
    writer: &mut W,
    association: Association,
    entities: usize,
    info: &AttributeInfo,
    buffer: &[T],
    file_type: FileType,
) -> Result<()> {
    let shape = AttributeShape::from_pixel(info.pixel, association)?;

    // symmetric tensors are stored as xx xy xz yy yz zz
    let symmetric = shape == AttributeShape::Tensors && info.components == 6;
    if matches!(shape, AttributeShape::Vectors | AttributeShape::Tensors)
        && info.components != shape.components()
        && !symmetric
    {
        bail!(PolyDataError::SizeMismatch {
            what: shape.keyword(),
            expected: shape.components(),
            actual: info.components,
        });
    }

    let expected = entities * info.components;
    if buffer.len() != expected {
        bail!(PolyDataError::SizeMismatch {
            what: "attribute",
            expected,
            actual: buffer.len(),
        });
    }

    debug!(
        "Writing {} {} \"{}\" x{}",
        association.context(),
        shape.keyword(),
        info.name,
        info.components
    );
    writeln!(writer, "{} {entities}", association.keyword())?;

    match shape {
        AttributeShape::ColorScalars => {
            writeln!(writer, "COLOR_SCALARS {} {}", info.name, info.components)?;
            return write_color_scalars(writer, buffer, info.components, file_type);
        }
        AttributeShape::Scalars => {
            write!(writer, "SCALARS {} {}", info.name, T::COMPONENT)?;
            if info.components != 1 {
                write!(writer, " {}", info.components)?;
            }
            writeln!(writer, "\nLOOKUP_TABLE default")?;
        }
        _ => writeln!(writer, "{} {} {}", shape.keyword(), info.name, T::COMPONENT)?,
    }

    let full;
    let (values, components) = if symmetric {
        full = expand_symmetric_tensors(buffer);
        (full.as_slice(), shape.components())
    } else {
        (buffer, info.components)
    };

    match file_type {
        FileType::Ascii => write_rows(writer, values, components)?,
        FileType::Binary => {
            write_wire(writer, values)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// Full row-major 3x3 tensors from their six unique components
fn expand_symmetric_tensors<T: Element>(buffer: &[T]) -> Vec<T> {
    const FULL: [usize; 9] = [0, 1, 2, 1, 3, 4, 2, 4, 5];
    buffer
        .chunks_exact(6)
        .flat_map(|t| FULL.iter().map(move |i| t[*i]))
        .collect()
}

/// Every value narrowed to a single unsigned byte
///
/// Text files show the narrowed values as floating point numbers.
fn write_color_scalars<W: Write, T: Element>(
    writer: &mut W,
    buffer: &[T],
    components: usize,
    file_type: FileType,
) -> Result<()> {
    let bytes = buffer.iter().map(|v| v.to_u8()).collect::<Vec<u8>>();
    match file_type {
        FileType::Ascii => {
            let display = bytes.iter().map(|b| *b as f32).collect::<Vec<f32>>();
            write_rows(writer, &display, components)?;
        }
        FileType::Binary => {
            writer.write_all(&bytes)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// One entity per line, columns separated by two spaces
fn write_rows<W: Write, T: Element>(writer: &mut W, buffer: &[T], components: usize) -> Result<()> {
    if components == 0 {
        return Ok(());
    }
    for row in buffer.chunks(components) {
        writeln!(writer, "{}", join_row(row))?;
    }
    Ok(())
}
