//! Parsers for the header lines of legacy PolyData files
//!
//! Every parser expects the line to start at the keyword, i.e. the scanner
//! slices the line from the position the keyword was found at. Payload lines
//! are never parsed here, they are split on whitespace directly.

// internal modules
use crate::ledger::SectionCount;
use crate::mesh::{ComponentType, FileType};
use crate::sections::{AttributeHeader, AttributeShape};

// external crates
use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_till1};
use nom::character::complete::{char, digit1, space0, space1};
use nom::combinator::{map, map_res, opt, recognize, value};
use nom::sequence::{pair, preceded, separated_pair, tuple};
use nom::IResult;

/// Version number from the `# vtk DataFile Version x.y` identifier line
///
/// ```rust
/// # use vtkpoly::readers::parsers::version;
/// assert_eq!(version("# vtk DataFile Version 2.0").unwrap().1, "2.0");
/// assert!(version("solid ascii").is_err());
/// ```
pub fn version(i: &str) -> IResult<&str, &str> {
    preceded(
        tuple((
            space0,
            char('#'),
            space0,
            tag_no_case("vtk"),
            space1,
            tag_no_case("DataFile"),
            space1,
            tag_no_case("Version"),
            space1,
        )),
        recognize(tuple((digit1, char('.'), digit1))),
    )(i)
}

/// Payload encoding from the third line of the file
pub fn file_type(i: &str) -> IResult<&str, FileType> {
    preceded(
        space0,
        alt((
            value(FileType::Ascii, tag_no_case("ASCII")),
            value(FileType::Binary, tag_no_case("BINARY")),
        )),
    )(i)
}

/// Dataset name from the `DATASET <type>` line
pub fn dataset(i: &str) -> IResult<&str, &str> {
    preceded(tuple((space0, tag_no_case("DATASET"), space1)), word)(i)
}

/// Point count and element type from `POINTS <n> <type>`
///
/// ```rust
/// # use vtkpoly::readers::parsers::points_header;
/// # use vtkpoly::mesh::ComponentType;
/// let (_, (n, component)) = points_header("POINTS 8 double").unwrap();
/// assert_eq!((n, component), (8, ComponentType::Double));
/// ```
pub fn points_header(i: &str) -> IResult<&str, (usize, ComponentType)> {
    preceded(
        pair(tag("POINTS"), space1),
        separated_pair(count, space1, component),
    )(i)
}

/// Cell and index counts from `VERTICES|LINES|POLYGONS <n> <size>`
pub fn cells_header<'a>(
    keyword: &'static str,
) -> impl FnMut(&'a str) -> IResult<&'a str, SectionCount> {
    map(
        preceded(pair(tag(keyword), space1), separated_pair(count, space1, count)),
        |(cells, indices)| SectionCount { cells, indices },
    )
}

/// Entity count from `POINT_DATA <n>` or `CELL_DATA <n>`
pub fn data_header<'a>(keyword: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, usize> {
    preceded(pair(tag(keyword), space1), count)
}

/// Any of the attribute classification lines
///
/// COLOR_SCALARS has to be tried before SCALARS, the rest are unambiguous.
///
/// ```rust
/// # use vtkpoly::readers::parsers::attribute_header;
/// # use vtkpoly::sections::AttributeShape;
/// let (_, header) = attribute_header("SCALARS temperature float 2").unwrap();
/// assert_eq!(header.shape, AttributeShape::Scalars);
/// assert_eq!((header.name.as_str(), header.components), ("temperature", 2));
///
/// let (_, header) = attribute_header("TENSORS stress double").unwrap();
/// assert_eq!(header.components, 9);
/// ```
pub fn attribute_header(i: &str) -> IResult<&str, AttributeHeader> {
    alt((color_scalars_header, scalars_header, fixed_shape_header))(i)
}

/// True for the `LOOKUP_TABLE <name>` line that follows SCALARS
pub fn is_lookup_table(i: &str) -> bool {
    lookup_table(i).is_ok()
}

/// Table name, which may be omitted
fn lookup_table(i: &str) -> IResult<&str, Option<&str>> {
    preceded(
        pair(space0, tag("LOOKUP_TABLE")),
        opt(preceded(space1, word)),
    )(i)
}

/// `COLOR_SCALARS <name> <numComp>`, always stored as unsigned bytes
fn color_scalars_header(i: &str) -> IResult<&str, AttributeHeader> {
    map(
        preceded(
            pair(tag("COLOR_SCALARS"), space1),
            separated_pair(word, space1, count),
        ),
        |(name, components)| AttributeHeader {
            shape: AttributeShape::ColorScalars,
            name: name.to_string(),
            component: None,
            components,
        },
    )(i)
}

/// `SCALARS <name> <type> [numComp]`
fn scalars_header(i: &str) -> IResult<&str, AttributeHeader> {
    map(
        preceded(
            pair(tag("SCALARS"), space1),
            tuple((word, space1, component, opt(preceded(space1, count)))),
        ),
        |(name, _, component, components)| AttributeHeader {
            shape: AttributeShape::Scalars,
            name: name.to_string(),
            component: Some(component),
            components: components.unwrap_or(1),
        },
    )(i)
}

/// `VECTORS|NORMALS|TENSORS <name> <type>`
fn fixed_shape_header(i: &str) -> IResult<&str, AttributeHeader> {
    let shape = alt((
        value(AttributeShape::Vectors, tag("VECTORS")),
        value(AttributeShape::Normals, tag("NORMALS")),
        value(AttributeShape::Tensors, tag("TENSORS")),
    ));
    map(
        tuple((shape, space1, word, space1, component)),
        |(shape, _, name, _, component)| AttributeHeader {
            shape,
            name: name.to_string(),
            component: Some(component),
            components: shape.components(),
        },
    )(i)
}

/// Any run of non-whitespace
fn word(i: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace())(i)
}

fn count(i: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(i)
}

fn component(i: &str) -> IResult<&str, ComponentType> {
    map_res(word, str::parse::<ComponentType>)(i)
}
