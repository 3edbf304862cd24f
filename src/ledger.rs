//! Per-kind cell counts shared between a read pass and a write pass
//!
//! Every cell section header states its cell count and total index count
//! before the data, so these have to be known up front. The [CellLedger] is
//! filled either from the section headers of a file being read, or by a full
//! pass over a flat connectivity buffer right before it is written.
//!
//! ```rust
//! # use vtkpoly::ledger::{CellLedger, SectionKind};
//! # use vtkpoly::mesh::CellKind;
//! let mut ledger = CellLedger::new();
//! ledger.record(CellKind::Triangle, 4);
//! ledger.record(CellKind::Polygon, 5);
//!
//! let polygons = ledger.lookup(SectionKind::Polygons);
//! assert_eq!((polygons.cells, polygons.indices), (2, 9));
//!
//! // kinds never recorded are simply zero
//! assert_eq!(ledger.lookup(SectionKind::Lines).cells, 0);
//! ```

// internal modules
use crate::error::PolyDataError;
use crate::mesh::CellKind;
use crate::utils::*;

// external crates
use serde::Serialize;

/// The three grouped connectivity sections of the legacy format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SectionKind {
    Vertices,
    Lines,
    Polygons,
}

impl SectionKind {
    /// All sections, in the order they are written to file
    pub const ALL: [SectionKind; 3] = [Self::Vertices, Self::Lines, Self::Polygons];

    /// Keyword introducing the section
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Vertices => "VERTICES",
            Self::Lines => "LINES",
            Self::Polygons => "POLYGONS",
        }
    }

    /// Kind tag given to cells read from this section
    pub fn cell_kind(&self) -> CellKind {
        match self {
            Self::Vertices => CellKind::Vertex,
            Self::Lines => CellKind::Polyline,
            Self::Polygons => CellKind::Polygon,
        }
    }
}

impl From<CellKind> for SectionKind {
    fn from(kind: CellKind) -> Self {
        match kind {
            CellKind::Vertex => Self::Vertices,
            CellKind::Polyline => Self::Lines,
            CellKind::Triangle | CellKind::Polygon => Self::Polygons,
        }
    }
}

/// Cell count and total index count of one section
///
/// The index count includes the leading point count of every cell, i.e. it is
/// the sum of `point_count + 1` and matches the size field of the header.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionCount {
    pub cells: usize,
    pub indices: usize,
}

impl SectionCount {
    /// True if the section should be omitted from the file
    pub fn is_empty(&self) -> bool {
        self.cells == 0
    }
}

/// Derived per-kind counts for the VERTICES, LINES and POLYGONS sections
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellLedger {
    pub vertices: SectionCount,
    pub lines: SectionCount,
    pub polygons: SectionCount,
}

impl CellLedger {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }

    /// Account for one more cell of `kind` taking `index_count` indices
    pub fn record(&mut self, kind: CellKind, index_count: usize) {
        let count = self.entry_mut(kind.into());
        count.cells += 1;
        count.indices += index_count;
    }

    /// Counts for a section, zero if nothing was recorded for it
    pub fn lookup(&self, section: SectionKind) -> SectionCount {
        match section {
            SectionKind::Vertices => self.vertices,
            SectionKind::Lines => self.lines,
            SectionKind::Polygons => self.polygons,
        }
    }

    /// Overwrite the counts of a section, used when parsing section headers
    ///
    /// Every cell takes at least its point count, so a section declaring more
    /// cells than indices is refused, as are counts that push the tagged
    /// buffer size past `usize::MAX`. The ledger is unchanged on failure.
    pub fn set(&mut self, section: SectionKind, count: SectionCount) -> Result<(), PolyDataError> {
        if count.cells > count.indices {
            return Err(PolyDataError::malformed(
                section.keyword(),
                f!("{} cells cannot fit in a size of {}", count.cells, count.indices),
            ));
        }

        let mut updated = *self;
        *updated.entry_mut(section) = count;
        if updated.checked_buffer_size().is_none() {
            return Err(PolyDataError::malformed(
                section.keyword(),
                f!("size {} overflows the cell buffer", count.indices),
            ));
        }

        *self = updated;
        Ok(())
    }

    /// Reset every counter to zero
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Total cells across all sections
    pub fn total_cells(&self) -> usize {
        self.vertices.cells + self.lines.cells + self.polygons.cells
    }

    /// Length of the flat tagged buffer holding every recorded cell
    ///
    /// Each cell adds one kind tag on top of its section indices.
    pub fn tagged_buffer_size(&self) -> usize {
        SectionKind::ALL
            .iter()
            .map(|s| {
                let count = self.lookup(*s);
                count.indices + count.cells
            })
            .sum()
    }

    fn checked_buffer_size(&self) -> Option<usize> {
        SectionKind::ALL.iter().try_fold(0usize, |total, s| {
            let count = self.lookup(*s);
            total.checked_add(count.indices)?.checked_add(count.cells)
        })
    }

    fn entry_mut(&mut self, section: SectionKind) -> &mut SectionCount {
        match section {
            SectionKind::Vertices => &mut self.vertices,
            SectionKind::Lines => &mut self.lines,
            SectionKind::Polygons => &mut self.polygons,
        }
    }
}

impl std::fmt::Display for CellLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "vertices {}/{}, lines {}/{}, polygons {}/{}",
            self.vertices.cells,
            self.vertices.indices,
            self.lines.cells,
            self.lines.indices,
            self.polygons.cells,
            self.polygons.indices
        )
    }
}
