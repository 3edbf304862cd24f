// internal modules
use crate::byte_order::write_wire;
use crate::error::PolyDataError;
use crate::ledger::{CellLedger, SectionCount, SectionKind};
use crate::mesh::{FileType, Records};
use crate::readers::parsers;
use crate::readers::SectionScanner;
use crate::utils::*;

// standard library
use std::io::{BufRead, Write};

// external crates
use anyhow::{bail, Result};
use itertools::Itertools;
use log::{debug, trace};

/// Fill a ledger with one pass over a flat tagged connectivity buffer
///
/// Every record is classified by its kind tag, so an unknown tag or a
/// truncated record fails here before any section is written.
///
/// ```rust
/// # use vtkpoly::sections::update_cell_information;
/// # use vtkpoly::ledger::SectionKind;
/// // a vertex, then a triangle and a quad which both count as polygons
/// let buffer = [0, 1, 4, 2, 3, 0, 1, 2, 4, 4, 0, 1, 2, 3];
/// let ledger = update_cell_information(&buffer, 3).unwrap();
///
/// let polygons = ledger.lookup(SectionKind::Polygons);
/// assert_eq!((polygons.cells, polygons.indices), (2, 9));
/// assert_eq!(ledger.tagged_buffer_size(), buffer.len());
/// ```
pub fn update_cell_information(buffer: &[u32], number_of_cells: usize) -> Result<CellLedger> {
    let mut ledger = CellLedger::new();
    for record in Records::new(buffer, number_of_cells) {
        let record = record?;
        ledger.record(record.kind, record.index_count());
    }
    debug!("Cell ledger: {ledger}");
    Ok(ledger)
}

/// Write the VERTICES, LINES and POLYGONS sections in that order
///
/// Each section header is sized from `ledger`, then only the records of the
/// matching kinds are written under it. Empty sections are omitted.
pub fn write_cells<W: Write>(
    writer: &mut W,
    buffer: &[u32],
    number_of_cells: usize,
    ledger: &CellLedger,
    file_type: FileType,
) -> Result<()> {
    for section in SectionKind::ALL {
        let count = ledger.lookup(section);
        if count.is_empty() {
            continue;
        }

        debug!("Writing {} {}", count.cells, section.keyword());
        writeln!(writer, "{} {} {}", section.keyword(), count.cells, count.indices)?;

        let records = Records::new(buffer, number_of_cells)
            .filter_ok(|r| SectionKind::from(r.kind) == section);

        match file_type {
            FileType::Ascii => {
                for record in records {
                    let record = record?;
                    let row = std::iter::once(record.point_ids.len() as u32)
                        .chain(record.point_ids.iter().copied())
                        .join(" ");
                    writeln!(writer, "{row}")?;
                }
            }
            FileType::Binary => {
                // kind tags stripped, point counts kept
                let mut grouped = Vec::with_capacity(count.indices);
                for record in records {
                    let record = record?;
                    grouped.push(record.point_ids.len() as u32);
                    grouped.extend_from_slice(record.point_ids);
                }
                if grouped.len() != count.indices {
                    bail!(PolyDataError::SizeMismatch {
                        what: section.keyword(),
                        expected: count.indices,
                        actual: grouped.len(),
                    });
                }
                write_wire(writer, &grouped)?;
                writeln!(writer)?;
            }
        }
    }
    Ok(())
}

/// Read every cell section into a flat tagged buffer
///
/// Sections may appear in any order. Cells are re-tagged by the section they
/// came from and concatenated as vertices, then lines, then polygons. Returns
/// the ledger built from the section headers.
pub fn read_cells<R: BufRead>(scanner: &mut SectionScanner<R>, buffer: &mut [u32]) -> Result<CellLedger> {
    let keywords = SectionKind::ALL.map(|s| s.keyword());
    let mut ledger = CellLedger::new();
    let mut staged: [Vec<u32>; 3] = Default::default();
    let mut found = [false; 3];

    while !found.iter().all(|f| *f) {
        let Some((index, line)) = scanner.seek_any(&keywords)? else {
            break;
        };
        let section = SectionKind::ALL[index];
        if found[index] {
            bail!(PolyDataError::malformed(section.keyword(), "section appears twice"));
        }
        found[index] = true;

        let count = match parsers::cells_header(section.keyword())(&line) {
            Ok((_, count)) => count,
            Err(_) => bail!(PolyDataError::malformed(
                section.keyword(),
                f!("bad header \"{line}\"")
            )),
        };

        ledger.set(section, count)?;

        // the declared sizes can never add up to more than the caller buffer
        if ledger.tagged_buffer_size() > buffer.len() {
            bail!(PolyDataError::SizeMismatch {
                what: "cell",
                expected: ledger.tagged_buffer_size(),
                actual: buffer.len(),
            });
        }

        let mut grouped = vec![0u32; count.indices];
        match scanner.file_type() {
            FileType::Ascii => scanner.read_ascii_into(section.keyword(), &mut grouped)?,
            FileType::Binary => scanner.read_wire_into(section.keyword(), &mut grouped)?,
        }

        staged[index] = retag(section, count, &grouped)?;
        trace!("Read {} {}", count.cells, section.keyword());
    }

    let total = staged.iter().map(|s| s.len()).sum::<usize>();
    if total != buffer.len() {
        bail!(PolyDataError::SizeMismatch {
            what: "cell",
            expected: total,
            actual: buffer.len(),
        });
    }

    for (target, source) in buffer
        .iter_mut()
        .zip(staged.iter().flat_map(|s| s.iter()))
    {
        *target = *source;
    }

    debug!("Read {} cells ({ledger})", ledger.total_cells());
    Ok(ledger)
}

/// Prefix every `point_count, ids...` group of a section with its kind tag
fn retag(section: SectionKind, count: SectionCount, grouped: &[u32]) -> Result<Vec<u32>> {
    let tag = section.cell_kind().tag();
    let mut tagged = Vec::with_capacity(count.indices + count.cells);
    let mut position = 0;

    for _ in 0..count.cells {
        let Some(&n) = grouped.get(position) else {
            bail!(PolyDataError::malformed(
                section.keyword(),
                f!("size {} is too small for {} cells", count.indices, count.cells)
            ));
        };
        let end = position + 1 + n as usize;
        let Some(ids) = grouped.get(position + 1..end) else {
            bail!(PolyDataError::malformed(
                section.keyword(),
                f!("cell with {n} points runs past the declared size {}", count.indices)
            ));
        };

        tagged.push(tag);
        tagged.push(n);
        tagged.extend_from_slice(ids);
        position = end;
    }

    if position != grouped.len() {
        bail!(PolyDataError::malformed(
            section.keyword(),
            f!("declared size {} but cells only use {position}", count.indices)
        ));
    }
    Ok(tagged)
}
