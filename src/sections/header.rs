// internal modules
use crate::error::PolyDataError;
use crate::ledger::SectionKind;
use crate::mesh::MeshInfo;
use crate::readers::parsers;
use crate::readers::{payload_size, SectionScanner};
use crate::sections::{Association, AttributeShape};

// standard library
use std::io::{BufRead, Write};

// external crates
use anyhow::{bail, Result};
use log::{debug, trace};

/// Titles are a single line of at most 256 characters
const MAX_TITLE_LENGTH: usize = 256;

/// Collect everything the headers of a file say about the mesh
///
/// One pass over the whole file. Only the first attribute of each data
/// section is described, later ones are skipped like any other payload.
pub fn read_mesh_info<R: BufRead>(scanner: &mut SectionScanner<R>) -> Result<MeshInfo> {
    let mut info = MeshInfo::new();
    info.title = scanner.preamble().title.clone();
    info.file_type = scanner.file_type();

    let mut association = None;
    let mut entities = 0;

    while let Some(line) = scanner.next_line()? {
        let trimmed = line.trim_start();

        if let Ok((_, (n, component))) = parsers::points_header(trimmed) {
            trace!("[POINTS] {line}");
            payload_size("POINTS", &[n, info.point_dimension, component.width()])?;
            info.number_of_points = n;
            info.point_component = component;
        } else if let Some((section, count)) = SectionKind::ALL.iter().find_map(|s| {
            parsers::cells_header(s.keyword())(trimmed)
                .ok()
                .map(|(_, count)| (*s, count))
        }) {
            trace!("[{}] {line}", section.keyword());
            info.ledger.set(section, count)?;
        } else if let Ok((_, n)) = parsers::data_header("POINT_DATA")(trimmed) {
            trace!("[POINT_DATA] {line}");
            association = Some(Association::Point);
            entities = n;
        } else if let Ok((_, n)) = parsers::data_header("CELL_DATA")(trimmed) {
            trace!("[CELL_DATA] {line}");
            association = Some(Association::Cell);
            entities = n;
        } else if let Ok((_, header)) = parsers::attribute_header(trimmed) {
            trace!("[{}] {line}", header.shape.keyword());
            payload_size(
                header.shape.keyword(),
                &[entities, header.components, header.width()],
            )?;
            let slot = match association {
                Some(Association::Point) => &mut info.point_data,
                Some(Association::Cell) => &mut info.cell_data,
                None => bail!(PolyDataError::malformed(
                    header.shape.keyword(),
                    "attribute outside of POINT_DATA or CELL_DATA"
                )),
            };
            if slot.is_none() {
                *slot = Some(header.info());
            }

            if header.shape == AttributeShape::Scalars {
                scanner.pass_over(&line)?;
                match scanner.next_line()? {
                    Some(lookup) if parsers::is_lookup_table(&lookup) => {
                        scanner.pass_over(&lookup)?
                    }
                    _ => bail!(PolyDataError::malformed(
                        "SCALARS",
                        "expected LOOKUP_TABLE after the SCALARS header"
                    )),
                }
                continue;
            }
        }

        scanner.pass_over(&line)?;
    }

    info.number_of_cells = info.ledger.total_cells();
    info.cell_buffer_size = info.ledger.tagged_buffer_size();
    debug!("{info}");
    Ok(info)
}

/// Write the four-line preamble
///
/// The title is cut down to a single line of the maximum length allowed.
pub fn write_preamble<W: Write>(writer: &mut W, info: &MeshInfo) -> Result<()> {
    let title = info
        .title
        .replace(['\n', '\r'], " ")
        .chars()
        .take(MAX_TITLE_LENGTH)
        .collect::<String>();

    writeln!(writer, "# vtk DataFile Version 2.0")?;
    writeln!(writer, "{title}")?;
    writeln!(writer, "{}", info.file_type)?;
    writeln!(writer, "DATASET POLYDATA")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::SectionCount;
    use crate::mesh::{ComponentType, FileType, PixelKind};
    use rstest::rstest;
    use std::io::Cursor;

    const MIXED: &str = "# vtk DataFile Version 2.0
mixed cells
ASCII
DATASET POLYDATA
POINTS 4 double
0 0 0 1 0 0
1 1 0 0 1 0
VERTICES 1 2
1 3
LINES 1 3
2 0 1
POLYGONS 2 8
3 0 1 2
3 0 2 3
CELL_DATA 4
COLOR_SCALARS rgb 3
1 0 0
0 1 0
0 0 1
1 1 1
POINT_DATA 4
SCALARS temperature float 1
LOOKUP_TABLE default
1 2 3 4
VECTORS velocity float
0 0 0 1 0 0 1 1 0 0 1 0
";

    #[test]
    fn header_describes_the_mesh() {
        let mut scanner = SectionScanner::new(Cursor::new(MIXED), "mixed.vtk").unwrap();
        let info = read_mesh_info(&mut scanner).unwrap();

        assert_eq!(info.title, "mixed cells");
        assert_eq!(info.file_type, FileType::Ascii);
        assert_eq!(info.number_of_points, 4);
        assert_eq!(info.point_component, ComponentType::Double);
        assert_eq!(info.ledger.lookup(SectionKind::Polygons), SectionCount { cells: 2, indices: 8 });
        assert_eq!(info.number_of_cells, 4);
        assert_eq!(info.cell_buffer_size, 2 + 3 + 8 + 4);

        let point_data = info.point_data.unwrap();
        assert_eq!(point_data.pixel, PixelKind::Scalar);
        assert_eq!(point_data.name, "temperature");
        assert_eq!(point_data.components, 1);

        let cell_data = info.cell_data.unwrap();
        assert_eq!(cell_data.pixel, PixelKind::VariableLengthVector);
        assert_eq!(cell_data.component, ComponentType::UnsignedChar);
        assert_eq!(cell_data.components, 3);
    }

    #[test]
    fn scalars_without_lookup_table() {
        let text = "# vtk DataFile Version 2.0\nt\nASCII\nDATASET POLYDATA\nPOINT_DATA 1\nSCALARS temperature float";
        let mut scanner = SectionScanner::new(Cursor::new(text), "t.vtk").unwrap();
        let error = read_mesh_info(&mut scanner).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<PolyDataError>(),
            Some(PolyDataError::MalformedSection { .. })
        ));
    }

    #[rstest]
    #[case("POLYGONS 18446744073709551615 18446744073709551615")]
    #[case("VERTICES 1 2\nLINES 1 18446744073709551615")]
    #[case("POINTS 9999999999999999999 double")]
    #[case("CELL_DATA 9999999999999999999\nTENSORS stress float")]
    fn oversized_counts_are_malformed(#[case] body: &str) {
        let text = format!("# vtk DataFile Version 2.0\nt\nASCII\nDATASET POLYDATA\n{body}\n");
        let mut scanner = SectionScanner::new(Cursor::new(text), "t.vtk").unwrap();
        let error = read_mesh_info(&mut scanner).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<PolyDataError>(),
            Some(PolyDataError::MalformedSection { .. })
        ));
    }

    #[test]
    fn preamble_layout() {
        let mut info = MeshInfo::new();
        info.title = "two\nlines".to_string();
        info.file_type = FileType::Binary;

        let mut out = Vec::new();
        write_preamble(&mut out, &info).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "# vtk DataFile Version 2.0\ntwo lines\nBINARY\nDATASET POLYDATA\n"
        );
    }

    #[test]
    fn long_titles_are_cut() {
        let mut info = MeshInfo::new();
        info.title = "x".repeat(1000);
        let mut out = Vec::new();
        write_preamble(&mut out, &info).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().nth(1).unwrap().len(), MAX_TITLE_LENGTH);
    }
}
