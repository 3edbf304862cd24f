// internal modules
use crate::byte_order::read_wire;
use crate::element::Element;
use crate::error::PolyDataError;
use crate::ledger::SectionKind;
use crate::mesh::{ComponentType, FileType};
use crate::readers::parsers;
use crate::sections::AttributeShape;
use crate::utils::*;

// standard library
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

// external crates
use anyhow::{anyhow, bail, Context, Result};
use itertools::Itertools;
use log::{debug, trace, warn};
use serde::Serialize;

/// Versions of the legacy format known to share the PolyData layout
const KNOWN_VERSIONS: [&str; 8] = ["1.0", "2.0", "3.0", "4.0", "4.1", "4.2", "5.0", "5.1"];

/// The four fixed lines at the top of every legacy file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preamble {
    /// Format version from the identifier line, e.g. "2.0"
    pub version: String,
    /// Free text second line
    pub title: String,
    /// Payload encoding
    pub file_type: FileType,
    /// Dataset structure, always POLYDATA once validated
    pub dataset: String,
}

/// Forward-only keyword scanner over a legacy PolyData stream
///
/// The preamble is consumed and validated on construction. After that the
/// scanner hands out lines, finds section keywords anywhere within a line, and
/// reads the fixed-size payloads that follow section headers as text tokens or
/// raw big-endian blocks.
///
/// In binary mode any section passed over while seeking has its payload
/// skipped by its declared size, so raw bytes are never mistaken for text.
///
/// Example:
/// ```rust
/// # use vtkpoly::readers::SectionScanner;
/// # use std::io::Cursor;
/// let text = "# vtk DataFile Version 2.0\ntitle\nASCII\nDATASET POLYDATA\nPOINTS 1 float\n1 2 3\n";
/// let mut scanner = SectionScanner::new(Cursor::new(text), "memory.vtk").unwrap();
/// assert_eq!(scanner.seek("POINTS").unwrap().unwrap(), "POINTS 1 float");
///
/// let mut point = [0.0f32; 3];
/// scanner.read_ascii_into("POINTS", &mut point).unwrap();
/// assert_eq!(point, [1.0, 2.0, 3.0]);
/// ```
#[derive(Debug)]
pub struct SectionScanner<R: BufRead> {
    /// Underlying buffered stream
    reader: R,
    /// Origin of the stream, only used for messages
    path: PathBuf,
    /// Validated preamble
    preamble: Preamble,
    /// Lines consumed so far, preamble included
    line_number: usize,
    /// Entity count of the last POINT_DATA/CELL_DATA passed over
    entities: usize,
    /// SCALARS payload size waiting on its LOOKUP_TABLE line
    pending_skip: Option<usize>,
}

impl SectionScanner<BufReader<File>> {
    /// Open a file and validate its preamble
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| f!("Could not open {}", path.display()))?;
        Self::new(BufReader::new(file), path)
    }
}

impl<R: BufRead> SectionScanner<R> {
    /// Wrap any buffered stream and validate its preamble
    pub fn new<P: Into<PathBuf>>(reader: R, path: P) -> Result<Self> {
        let mut scanner = Self {
            reader,
            path: path.into(),
            preamble: Preamble {
                version: String::new(),
                title: String::new(),
                file_type: FileType::Ascii,
                dataset: String::new(),
            },
            line_number: 0,
            entities: 0,
            pending_skip: None,
        };
        scanner.preamble = scanner.read_preamble()?;
        debug!(
            "Opened {} (version {}, {})",
            scanner.path.display(),
            scanner.preamble.version,
            scanner.preamble.file_type
        );
        Ok(scanner)
    }

    pub fn preamble(&self) -> &Preamble {
        &self.preamble
    }

    pub fn file_type(&self) -> FileType {
        self.preamble.file_type
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Next line without its terminator, `None` at the end of the stream
    ///
    /// Invalid UTF-8 is replaced rather than rejected, so stray bytes in a
    /// binary file never abort a scan.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        let mut raw = Vec::new();
        let n = self.reader.read_until(b'\n', &mut raw).with_context(|| {
            f!(
                "Could not read line {} of {}",
                self.line_number + 1,
                self.path.display()
            )
        })?;

        if n == 0 {
            return Ok(None);
        }

        self.line_number += 1;
        if raw.last() == Some(&b'\n') {
            raw.pop();
        }
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
        Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
    }

    /// Find the next line containing `keyword`
    ///
    /// Returns the line sliced from the keyword onwards, or `None` if the
    /// stream ends first.
    pub fn seek(&mut self, keyword: &str) -> Result<Option<String>> {
        Ok(self.seek_any(&[keyword])?.map(|(_, line)| line))
    }

    /// Find the next line containing any of `keywords`
    ///
    /// Returns the index of the keyword that matched along with the line sliced
    /// from that keyword onwards.
    pub fn seek_any(&mut self, keywords: &[&str]) -> Result<Option<(usize, String)>> {
        while let Some(line) = self.next_line()? {
            for (i, keyword) in keywords.iter().enumerate() {
                if let Some(position) = line.find(keyword) {
                    trace!("[{keyword}] {line}");
                    return Ok(Some((i, line[position..].to_string())));
                }
            }
            self.pass_over(&line)?;
        }
        Ok(None)
    }

    /// Account for a line the caller is not going to read the payload of
    ///
    /// A no-op for text files. For binary files this skips the raw block that
    /// follows a section header, so the next line read is the next header.
    pub fn pass_over(&mut self, line: &str) -> Result<()> {
        if self.file_type() == FileType::Ascii {
            return Ok(());
        }

        let line = line.trim_start();
        let (section, skip) = if parsers::is_lookup_table(line) {
            ("LOOKUP_TABLE", self.pending_skip.take().unwrap_or(0))
        } else if let Ok((_, (n, component))) = parsers::points_header(line) {
            ("POINTS", payload_size("POINTS", &[n, 3, component.width()])?)
        } else if let Some((section, count)) = SectionKind::ALL.iter().find_map(|s| {
            parsers::cells_header(s.keyword())(line)
                .ok()
                .map(|(_, count)| (s.keyword(), count))
        }) {
            (section, payload_size(section, &[count.indices, <u32 as Element>::WIDTH])?)
        } else if let Ok((_, n)) = parsers::data_header("POINT_DATA")(line)
            .or_else(|_| parsers::data_header("CELL_DATA")(line))
        {
            self.entities = n;
            ("DATA", 0)
        } else if let Ok((_, header)) = parsers::attribute_header(line) {
            let bytes = payload_size(
                header.shape.keyword(),
                &[self.entities, header.components, header.width()],
            )?;
            if header.shape == AttributeShape::Scalars {
                self.pending_skip = Some(bytes);
                ("SCALARS", 0)
            } else {
                (header.shape.keyword(), bytes)
            }
        } else {
            ("", 0)
        };

        if skip > 0 {
            trace!("Skipping {skip} bytes of {section} payload");
            self.skip_bytes(section, skip)?;
        }
        Ok(())
    }

    /// Discard exactly `n` bytes of payload
    pub fn skip_bytes(&mut self, section: &str, n: usize) -> Result<()> {
        let skipped = std::io::copy(&mut (&mut self.reader).take(n as u64), &mut std::io::sink())?;
        if skipped < n as u64 {
            bail!(PolyDataError::malformed(
                section,
                f!("binary payload ended after {skipped} of {n} bytes")
            ));
        }
        Ok(())
    }

    /// Fill `buffer` from text tokens in whichever encoding the file uses
    ///
    /// The `declared` type only matters for binary files, where the block has
    /// to hold exactly the element type of `buffer`.
    pub fn read_values<T: Element>(
        &mut self,
        section: &str,
        declared: ComponentType,
        buffer: &mut [T],
    ) -> Result<()> {
        match self.file_type() {
            FileType::Ascii => self.read_ascii_into(section, buffer),
            FileType::Binary => self.read_binary_into(section, declared, buffer),
        }
    }

    /// Fill `buffer` with whitespace separated tokens, across as many lines
    /// as it takes
    ///
    /// Tokens left over on the last line once the buffer is full are dropped.
    pub fn read_ascii_into<T: Element>(&mut self, section: &str, buffer: &mut [T]) -> Result<()> {
        let mut filled = 0;
        while filled < buffer.len() {
            let Some(line) = self.next_line()? else {
                bail!(PolyDataError::malformed(
                    section,
                    f!("end of file after {filled} of {} values", buffer.len())
                ));
            };

            for token in line.split_whitespace() {
                if filled == buffer.len() {
                    break;
                }
                buffer[filled] = T::parse_token(token).ok_or_else(|| {
                    PolyDataError::malformed(
                        section,
                        f!(
                            "could not read \"{token}\" as {} on line {}",
                            T::COMPONENT,
                            self.line_number
                        ),
                    )
                })?;
                filled += 1;
            }
        }
        Ok(())
    }

    /// Fill `buffer` from a raw block, checking the declared element type
    pub fn read_binary_into<T: Element>(
        &mut self,
        section: &str,
        declared: ComponentType,
        buffer: &mut [T],
    ) -> Result<()> {
        if declared != T::COMPONENT {
            bail!(PolyDataError::TypeMismatch {
                section: section.to_string(),
                declared,
                requested: T::COMPONENT,
            });
        }
        self.read_wire_into(section, buffer)
    }

    /// Fill `buffer` from a raw block of wire ordered values
    pub fn read_wire_into<T: Element>(&mut self, section: &str, buffer: &mut [T]) -> Result<()> {
        read_wire(&mut self.reader, buffer).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => anyhow!(PolyDataError::malformed(
                section,
                f!("binary payload shorter than {} bytes", buffer.len() * T::WIDTH)
            )),
            _ => anyhow!(e).context(f!("Could not read {section} payload")),
        })
    }

    /// Raw block of `n` single bytes
    pub fn read_bytes(&mut self, section: &str, n: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; n];
        self.read_wire_into(section, &mut bytes)?;
        Ok(bytes)
    }

    fn unsupported(&self, reason: String) -> PolyDataError {
        PolyDataError::UnsupportedFile {
            path: self.path.clone(),
            reason,
        }
    }

    fn read_preamble(&mut self) -> Result<Preamble> {
        // identifier line
        let line = self
            .next_line()?
            .ok_or_else(|| self.unsupported("file is empty".into()))?;
        let version = match parsers::version(&line) {
            Ok((_, version)) => version.to_string(),
            Err(_) => bail!(self.unsupported(f!("\"{line}\" is not a vtk identifier line"))),
        };
        if !KNOWN_VERSIONS.contains(&version.as_str()) {
            warn!("Unexpected file version {version}, reading as legacy anyway");
        }
        trace!("[Version] {line}");

        // title is free text, possibly empty
        let title = self
            .next_line()?
            .ok_or_else(|| self.unsupported("missing title line".into()))?;
        trace!("[ Title ] {title}");

        let line = self
            .next_line()?
            .ok_or_else(|| self.unsupported("missing ASCII/BINARY line".into()))?;
        let file_type = match parsers::file_type(&line) {
            Ok((_, file_type)) => file_type,
            Err(_) => bail!(self.unsupported(f!("\"{line}\" is neither ASCII nor BINARY"))),
        };
        trace!("[Encoding] {line}");

        // blank lines before the dataset line are tolerated
        let dataset = loop {
            let line = self
                .next_line()?
                .ok_or_else(|| self.unsupported("missing DATASET line".into()))?;
            if line.trim().is_empty() {
                continue;
            }
            match parsers::dataset(&line) {
                Ok((_, dataset)) => break dataset.to_string(),
                Err(_) => bail!(self.unsupported(f!("expected DATASET, found \"{line}\""))),
            }
        };
        if !dataset.eq_ignore_ascii_case("POLYDATA") {
            bail!(self.unsupported(f!("dataset is {dataset}, only POLYDATA is supported")));
        }
        trace!("[Dataset] {dataset}");

        Ok(Preamble {
            version,
            title,
            file_type,
            dataset,
        })
    }
}

/// Product of the declared counts of a section, refused if it overflows
pub fn payload_size(section: &str, factors: &[usize]) -> Result<usize, PolyDataError> {
    factors
        .iter()
        .try_fold(1usize, |size, f| size.checked_mul(*f))
        .ok_or_else(|| {
            PolyDataError::malformed(
                section,
                f!("declared size {} is too large", factors.iter().join(" x ")),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_order::write_wire;
    use rstest::rstest;
    use std::io::Cursor;

    fn scanner(text: &str) -> Result<SectionScanner<Cursor<Vec<u8>>>> {
        SectionScanner::new(Cursor::new(text.as_bytes().to_vec()), "test.vtk")
    }

    const HEADER: &str = "# vtk DataFile Version 2.0\nsome POINTS in a title\nASCII\nDATASET POLYDATA\n";

    #[test]
    fn preamble_is_consumed() {
        let text = f!("{HEADER}POINTS 2 float\n0 0 0 1 1 1\n");
        let mut scanner = scanner(&text).unwrap();
        assert_eq!(scanner.preamble().title, "some POINTS in a title");
        assert_eq!(scanner.line_number(), 4);
        assert_eq!(scanner.seek("POINTS").unwrap().unwrap(), "POINTS 2 float");
    }

    #[test]
    fn other_datasets_are_rejected() {
        let text = "# vtk DataFile Version 2.0\nt\nASCII\nDATASET UNSTRUCTURED_GRID\n";
        let error = scanner(text).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<PolyDataError>(),
            Some(PolyDataError::UnsupportedFile { .. })
        ));
    }

    #[test]
    fn missing_identifier_is_rejected() {
        assert!(scanner("solid cube\nfacet normal 0 0 1\n").is_err());
        assert!(scanner("").is_err());
    }

    #[test]
    fn keywords_match_anywhere_in_a_line() {
        let text = f!("{HEADER}\n  junk LINES 1 3\n2 0 1\n");
        let mut scanner = scanner(&text).unwrap();
        let (index, line) = scanner
            .seek_any(&["VERTICES", "LINES", "POLYGONS"])
            .unwrap()
            .unwrap();
        assert_eq!((index, line.as_str()), (1, "LINES 1 3"));
        assert!(scanner.seek("POLYGONS").unwrap().is_none());
    }

    #[test]
    fn tokens_span_lines() {
        let text = f!("{HEADER}1 2\n3\n\n4 5 6 7\n");
        let mut scanner = scanner(&text).unwrap();
        let mut values = [0u32; 6];
        scanner.read_ascii_into("POINTS", &mut values).unwrap();
        assert_eq!(values, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn early_end_of_payload_is_malformed() {
        let text = f!("{HEADER}1 2\n");
        let mut scanner = scanner(&text).unwrap();
        let mut values = [0.0f64; 3];
        let error = scanner.read_ascii_into("POINTS", &mut values).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<PolyDataError>(),
            Some(PolyDataError::MalformedSection { .. })
        ));
    }

    #[test]
    fn bad_tokens_are_malformed() {
        let text = f!("{HEADER}1 two 3\n");
        let mut scanner = scanner(&text).unwrap();
        let mut values = [0i32; 3];
        assert!(scanner.read_ascii_into("LINES", &mut values).is_err());
    }

    #[test]
    fn binary_payloads_are_skipped_while_seeking() {
        let mut bytes = b"# vtk DataFile Version 2.0\nb\nBINARY\nDATASET POLYDATA\nPOINTS 1 float\n"
            .to_vec();
        // a newline byte inside the block must not end a line
        write_wire(&mut bytes, &[f32::from_bits(0x0a0a_0a0a), 1.0, 2.0]).unwrap();
        bytes.extend_from_slice(b"\nPOINT_DATA 1\nSCALARS s double\nLOOKUP_TABLE default\n");
        write_wire(&mut bytes, &[10.0f64]).unwrap();
        bytes.extend_from_slice(b"\nCELL_DATA 2\nSCALARS c int\nLOOKUP_TABLE default\n");
        write_wire(&mut bytes, &[7i32, -7]).unwrap();
        bytes.push(b'\n');

        let mut scanner = SectionScanner::new(Cursor::new(bytes), "test.vtk").unwrap();
        assert_eq!(scanner.seek("CELL_DATA").unwrap().unwrap(), "CELL_DATA 2");
        assert_eq!(scanner.next_line().unwrap().unwrap(), "SCALARS c int");
        assert!(parsers::is_lookup_table(&scanner.next_line().unwrap().unwrap()));

        let mut values = [0i32; 2];
        scanner
            .read_binary_into("SCALARS", ComponentType::Int, &mut values)
            .unwrap();
        assert_eq!(values, [7, -7]);
    }

    #[rstest]
    #[case("POINTS 9999999999999999999 float")]
    #[case("POLYGONS 1 9999999999999999999")]
    #[case("VECTORS v double")]
    fn oversized_binary_payloads_are_malformed(#[case] header: &str) {
        let text = f!(
            "# vtk DataFile Version 2.0\nt\nBINARY\nDATASET POLYDATA\n\
             POINT_DATA 9999999999999999999\n{header}\nLINES 1 2\n"
        );
        let mut scanner = scanner(&text).unwrap();
        let error = scanner.seek("LINES").unwrap_err();
        assert!(matches!(
            error.downcast_ref::<PolyDataError>(),
            Some(PolyDataError::MalformedSection { .. })
        ));
    }

    #[test]
    fn payload_sizes_multiply() {
        assert_eq!(payload_size("POINTS", &[4, 3, 8]).unwrap(), 96);
        assert!(payload_size("POINTS", &[usize::MAX, 3]).is_err());
    }

    #[test]
    fn binary_type_mismatch() {
        let mut bytes = b"# vtk DataFile Version 2.0\nb\nBINARY\nDATASET POLYDATA\n".to_vec();
        write_wire(&mut bytes, &[1.0f64]).unwrap();
        let mut scanner = SectionScanner::new(Cursor::new(bytes), "test.vtk").unwrap();

        let mut values = [0.0f32; 2];
        let error = scanner
            .read_binary_into("POINTS", ComponentType::Double, &mut values)
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<PolyDataError>(),
            Some(PolyDataError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn short_binary_blocks_are_malformed() {
        let mut bytes = b"# vtk DataFile Version 2.0\nb\nBINARY\nDATASET POLYDATA\n".to_vec();
        bytes.extend_from_slice(&[0, 0, 0]);
        let mut scanner = SectionScanner::new(Cursor::new(bytes), "test.vtk").unwrap();

        let mut values = [0u32; 1];
        let error = scanner.read_wire_into("LINES", &mut values).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<PolyDataError>(),
            Some(PolyDataError::MalformedSection { .. })
        ));
    }
}
