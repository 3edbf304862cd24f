// internal modules
use crate::byte_order::write_wire;
use crate::element::Element;
use crate::error::PolyDataError;
use crate::mesh::{ComponentType, FileType};
use crate::readers::parsers;
use crate::readers::SectionScanner;
use crate::utils::*;

// standard library
use std::io::{BufRead, Write};

// external crates
use anyhow::{bail, Result};
use itertools::Itertools;
use log::debug;

/// Read the POINTS section into a flat coordinate buffer
///
/// The buffer must hold exactly `n * dimension` values for the `n` points
/// declared in the header. Returns the declared element type.
pub fn read_points<R: BufRead, T: Element>(
    scanner: &mut SectionScanner<R>,
    dimension: usize,
    buffer: &mut [T],
) -> Result<ComponentType> {
    let Some(line) = scanner.seek("POINTS")? else {
        bail!(PolyDataError::malformed("POINTS", "section not found"));
    };

    let (n, component) = match parsers::points_header(&line) {
        Ok((_, header)) => header,
        Err(_) => bail!(PolyDataError::malformed("POINTS", f!("bad header \"{line}\""))),
    };

    if buffer.len() != n * dimension {
        bail!(PolyDataError::SizeMismatch {
            what: "point",
            expected: n * dimension,
            actual: buffer.len(),
        });
    }

    debug!("Reading {n} points of {component}");
    scanner.read_values("POINTS", component, buffer)?;
    Ok(component)
}

/// Write the POINTS section, the element type taken from the buffer
pub fn write_points<W: Write, T: Element>(
    writer: &mut W,
    number_of_points: usize,
    dimension: usize,
    buffer: &[T],
    file_type: FileType,
) -> Result<()> {
    if buffer.len() != number_of_points * dimension {
        bail!(PolyDataError::SizeMismatch {
            what: "point",
            expected: number_of_points * dimension,
            actual: buffer.len(),
        });
    }

    debug!("Writing {number_of_points} points of {}", T::COMPONENT);
    writeln!(writer, "POINTS {number_of_points} {}", T::COMPONENT)?;

    match file_type {
        FileType::Ascii if dimension > 0 => {
            for point in buffer.chunks(dimension) {
                writeln!(writer, "{}", point.iter().join(" "))?;
            }
        }
        FileType::Ascii => (),
        FileType::Binary => {
            write_wire(writer, buffer)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    fn round_trip<T: Element>(values: &[T], file_type: FileType) -> Vec<T> {
        let mut out = f!(
            "# vtk DataFile Version 2.0\npoints\n{file_type}\nDATASET POLYDATA\n"
        )
        .into_bytes();
        write_points(&mut out, values.len() / 3, 3, values, file_type).unwrap();

        let mut scanner = SectionScanner::new(Cursor::new(out), "points.vtk").unwrap();
        let mut decoded = vec![T::default(); values.len()];
        let component = read_points(&mut scanner, 3, &mut decoded).unwrap();
        assert_eq!(component, T::COMPONENT);
        decoded
    }

    #[rstest]
    #[case(FileType::Ascii)]
    #[case(FileType::Binary)]
    fn float_points_are_exact(#[case] file_type: FileType) {
        let values = [0.1f32, -2.5e-8, 3.0e20, 1.0 / 3.0, f32::MIN_POSITIVE, -0.0];
        assert_eq!(round_trip(&values, file_type), values);
    }

    #[rstest]
    #[case(FileType::Ascii)]
    #[case(FileType::Binary)]
    fn double_points_are_exact(#[case] file_type: FileType) {
        let values = [0.1f64, 1.0e-300, -7.123456789012345, 2.0f64.sqrt(), 1.0e15, 42.0];
        assert_eq!(round_trip(&values, file_type), values);
    }

    #[test]
    fn integer_points() {
        let values = [1i32, -2, 3, i32::MAX, i32::MIN, 0];
        assert_eq!(round_trip(&values, FileType::Binary), values);
    }

    #[test]
    fn ascii_layout_is_one_point_per_line() {
        let mut out = Vec::new();
        write_points(&mut out, 2, 3, &[0.5f32, 1.0, 2.0, 3.0, 4.0, 5.25], FileType::Ascii).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "POINTS 2 float\n0.5 1 2\n3 4 5.25\n"
        );
    }

    #[test]
    fn length_must_match_count() {
        let mut out = Vec::new();
        let error = write_points(&mut out, 2, 3, &[0.0f64; 5], FileType::Ascii).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<PolyDataError>(),
            Some(PolyDataError::SizeMismatch { expected: 6, actual: 5, .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn missing_points_section() {
        let text = "# vtk DataFile Version 2.0\nt\nASCII\nDATASET POLYDATA\n";
        let mut scanner = SectionScanner::new(Cursor::new(text), "t.vtk").unwrap();
        assert!(read_points::<_, f32>(&mut scanner, 3, &mut []).is_err());
    }
}
