//! Cell kinds, the flat tagged connectivity buffer, and polyline edges
//!
//! The mesh container exchanges topology with the codec as one flat buffer of
//! records, each laid out as `kind, point_count, point_id * point_count`. The
//! [Cell] enum is the owned form of one record, and [Records] walks a buffer
//! record by record.

// internal modules
use crate::error::PolyDataError;

// external crates
use anyhow::{bail, Result};
use log::trace;
use serde::Serialize;

/// Kind tag of a connectivity record
///
/// The numeric values are the cell geometry codes used by mesh containers in
/// the flat buffer. Any other tag is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CellKind {
    Vertex = 0,
    Triangle = 2,
    Polygon = 4,
    Polyline = 9,
}

impl CellKind {
    /// Tag value stored in the flat buffer
    pub fn tag(&self) -> u32 {
        *self as u32
    }
}

impl TryFrom<u32> for CellKind {
    type Error = PolyDataError;

    fn try_from(tag: u32) -> std::result::Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Vertex),
            2 => Ok(Self::Triangle),
            4 => Ok(Self::Polygon),
            9 => Ok(Self::Polyline),
            _ => Err(PolyDataError::UnsupportedCellKind { tag }),
        }
    }
}

/// One record of a flat connectivity buffer, borrowed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRecord<'a> {
    pub kind: CellKind,
    pub point_ids: &'a [u32],
}

impl CellRecord<'_> {
    /// Indices taken by this cell in a grouped section, point count included
    pub fn index_count(&self) -> usize {
        self.point_ids.len() + 1
    }
}

/// Iterator over the first `number_of_cells` records of a tagged buffer
///
/// Yields an error and stops on an unknown kind tag or a record that runs past
/// the end of the buffer.
///
/// ```rust
/// # use vtkpoly::mesh::{CellKind, Records};
/// let buffer = [0, 1, 5, 4, 3, 0, 1, 2];
/// let kinds = Records::new(&buffer, 2)
///     .map(|r| r.unwrap().kind)
///     .collect::<Vec<CellKind>>();
/// assert_eq!(kinds, vec![CellKind::Vertex, CellKind::Polygon]);
/// ```
#[derive(Debug)]
pub struct Records<'a> {
    buffer: &'a [u32],
    position: usize,
    remaining: usize,
}

impl<'a> Records<'a> {
    pub fn new(buffer: &'a [u32], number_of_cells: usize) -> Self {
        Self {
            buffer,
            position: 0,
            remaining: number_of_cells,
        }
    }

    fn next_record(&mut self) -> Result<CellRecord<'a>> {
        let Some(&tag) = self.buffer.get(self.position) else {
            bail!(PolyDataError::malformed(
                "connectivity",
                format!("buffer ended with {} cells left to read", self.remaining)
            ));
        };
        let kind = CellKind::try_from(tag)?;

        let Some(&n) = self.buffer.get(self.position + 1) else {
            bail!(PolyDataError::malformed(
                "connectivity",
                format!("record at {} has no point count", self.position)
            ));
        };

        let start = self.position + 2;
        let end = start + n as usize;
        let Some(point_ids) = self.buffer.get(start..end) else {
            bail!(PolyDataError::malformed(
                "connectivity",
                format!("record at {} needs {n} point ids", self.position)
            ));
        };

        self.position = end;
        Ok(CellRecord { kind, point_ids })
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<CellRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let record = self.next_record();
        self.remaining = match record {
            Ok(_) => self.remaining - 1,
            Err(_) => 0,
        };
        Some(record)
    }
}

/// Owned cell of one of the four kinds the legacy format can carry
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Single point, or several for a poly-vertex
    Vertex(Vec<u32>),
    /// Open chain of segments through its points
    Polyline(PolylineCell),
    /// Exactly three points
    Triangle([u32; 3]),
    /// Closed loop through any number of points
    Polygon(Vec<u32>),
}

impl Cell {
    /// Build a cell from a kind and its point ids
    pub fn from_record(kind: CellKind, point_ids: &[u32]) -> Result<Self> {
        let cell = match kind {
            CellKind::Vertex => Self::Vertex(point_ids.to_vec()),
            CellKind::Polyline => Self::Polyline(PolylineCell::from_point_ids(point_ids)),
            CellKind::Polygon => Self::Polygon(point_ids.to_vec()),
            CellKind::Triangle => match point_ids {
                &[a, b, c] => Self::Triangle([a, b, c]),
                _ => bail!(PolyDataError::malformed(
                    "connectivity",
                    format!("triangle with {} points", point_ids.len())
                )),
            },
        };
        Ok(cell)
    }

    pub fn kind(&self) -> CellKind {
        match self {
            Self::Vertex(_) => CellKind::Vertex,
            Self::Polyline(_) => CellKind::Polyline,
            Self::Triangle(_) => CellKind::Triangle,
            Self::Polygon(_) => CellKind::Polygon,
        }
    }

    pub fn point_ids(&self) -> &[u32] {
        match self {
            Self::Vertex(ids) | Self::Polygon(ids) => ids,
            Self::Polyline(polyline) => polyline.point_ids(),
            Self::Triangle(ids) => ids,
        }
    }
}

/// Flatten cells into a tagged connectivity buffer
///
/// ```rust
/// # use vtkpoly::mesh::{cells_to_connectivity, Cell};
/// let cells = vec![Cell::Vertex(vec![5]), Cell::Triangle([0, 1, 2])];
/// assert_eq!(cells_to_connectivity(&cells), vec![0, 1, 5, 2, 3, 0, 1, 2]);
/// ```
pub fn cells_to_connectivity(cells: &[Cell]) -> Vec<u32> {
    let size = cells.iter().map(|c| c.point_ids().len() + 2).sum();
    let mut buffer = Vec::with_capacity(size);
    for cell in cells {
        buffer.push(cell.kind().tag());
        buffer.push(cell.point_ids().len() as u32);
        buffer.extend_from_slice(cell.point_ids());
    }
    buffer
}

/// Rebuild owned cells from the first `number_of_cells` records of a buffer
pub fn cells_from_connectivity(buffer: &[u32], number_of_cells: usize) -> Result<Vec<Cell>> {
    let mut cells = Vec::with_capacity(number_of_cells);
    for record in Records::new(buffer, number_of_cells) {
        let record = record?;
        cells.push(Cell::from_record(record.kind, record.point_ids)?);
    }
    Ok(cells)
}

/// A polyline whose points can be changed after construction
///
/// The edge list always covers the full current point sequence as consecutive
/// pairs. It is thrown away and rebuilt on every change to the point ids.
///
/// ```rust
/// # use vtkpoly::mesh::PolylineCell;
/// let mut polyline = PolylineCell::from_point_ids(&[7, 3, 9, 1]);
/// assert_eq!(polyline.edges(), vec![(7, 3), (3, 9), (9, 1)]);
///
/// polyline.set_point_ids(&[5]);
/// assert!(polyline.edges().is_empty());
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PolylineCell {
    point_ids: Vec<u32>,
    /// Pairs of positions into `point_ids`
    edges: Vec<[usize; 2]>,
}

impl PolylineCell {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }

    /// Polyline through `point_ids`, in order
    pub fn from_point_ids(point_ids: &[u32]) -> Self {
        let mut polyline = Self::new();
        polyline.set_point_ids(point_ids);
        polyline
    }

    /// Polyline of `n` points with unassigned (`u32::MAX`) ids
    pub fn with_number_of_points(n: usize) -> Self {
        Self::from_point_ids(&vec![u32::MAX; n])
    }

    /// Replace the whole point sequence
    pub fn set_point_ids(&mut self, point_ids: &[u32]) {
        self.point_ids = point_ids.to_vec();
        self.build_edges();
    }

    /// Change the id at one position of the sequence
    pub fn set_point_id(&mut self, position: usize, point_id: u32) -> Result<()> {
        match self.point_ids.get_mut(position) {
            Some(id) => *id = point_id,
            None => bail!(
                "Position {position} is out of range for a polyline of {} points",
                self.point_ids.len()
            ),
        }
        self.build_edges();
        Ok(())
    }

    /// Append a point to the end of the line
    pub fn add_point_id(&mut self, point_id: u32) {
        self.point_ids.push(point_id);
        self.build_edges();
    }

    /// Remove every occurrence of `point_id` from the sequence
    pub fn remove_point_id(&mut self, point_id: u32) {
        self.point_ids.retain(|id| *id != point_id);
        self.build_edges();
    }

    /// Drop all points and edges
    pub fn clear_points(&mut self) {
        self.point_ids.clear();
        self.build_edges();
    }

    pub fn point_ids(&self) -> &[u32] {
        &self.point_ids
    }

    pub fn number_of_points(&self) -> usize {
        self.point_ids.len()
    }

    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    /// Edges as pairs of positions into the point sequence
    pub fn edge_positions(&self) -> &[[usize; 2]] {
        &self.edges
    }

    /// Point ids at either end of edge `index`
    pub fn edge(&self, index: usize) -> Option<(u32, u32)> {
        self.edges
            .get(index)
            .map(|[a, b]| (self.point_ids[*a], self.point_ids[*b]))
    }

    /// Every edge as a pair of point ids, in order along the line
    pub fn edges(&self) -> Vec<(u32, u32)> {
        (0..self.edges.len()).filter_map(|i| self.edge(i)).collect()
    }

    fn build_edges(&mut self) {
        self.edges = (1..self.point_ids.len()).map(|i| [i - 1, i]).collect();
        trace!("Rebuilt {} polyline edges", self.edges.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, CellKind::Vertex)]
    #[case(2, CellKind::Triangle)]
    #[case(4, CellKind::Polygon)]
    #[case(9, CellKind::Polyline)]
    fn known_tags(#[case] tag: u32, #[case] kind: CellKind) {
        assert_eq!(CellKind::try_from(tag).unwrap(), kind);
        assert_eq!(kind.tag(), tag);
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(255)]
    fn unknown_tags(#[case] tag: u32) {
        assert!(matches!(
            CellKind::try_from(tag),
            Err(PolyDataError::UnsupportedCellKind { .. })
        ));
    }

    #[test]
    fn records_stop_on_bad_kind() {
        let buffer = [0, 1, 5, 6, 2, 0, 1, 4, 3, 0, 1, 2];
        let mut records = Records::new(&buffer, 3);
        assert!(records.next().unwrap().is_ok());
        let error = records.next().unwrap().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<PolyDataError>(),
            Some(PolyDataError::UnsupportedCellKind { tag: 6 })
        ));
        assert!(records.next().is_none());
    }

    #[test]
    fn records_reject_truncated_buffers() {
        let buffer = [4, 4, 0, 1, 2];
        let error = Records::new(&buffer, 1).next().unwrap().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<PolyDataError>(),
            Some(PolyDataError::MalformedSection { .. })
        ));
    }

    #[test]
    fn cells_survive_flattening() {
        let cells = vec![
            Cell::Polygon(vec![0, 1, 2, 3]),
            Cell::Vertex(vec![4]),
            Cell::Polyline(PolylineCell::from_point_ids(&[1, 2, 3])),
            Cell::Triangle([3, 2, 1]),
        ];
        let buffer = cells_to_connectivity(&cells);
        assert_eq!(buffer.len(), 4 * 2 + 4 + 1 + 3 + 3);
        assert_eq!(cells_from_connectivity(&buffer, 4).unwrap(), cells);
    }

    #[test]
    fn triangles_need_three_points() {
        assert!(Cell::from_record(CellKind::Triangle, &[0, 1]).is_err());
    }

    #[test]
    fn polyline_edges_follow_every_mutation() {
        let mut polyline = PolylineCell::from_point_ids(&[7, 3, 9, 1]);
        assert_eq!(polyline.edges(), vec![(7, 3), (3, 9), (9, 1)]);
        assert_eq!(polyline.edge_positions(), &[[0, 1], [1, 2], [2, 3]]);

        polyline.add_point_id(4);
        assert_eq!(polyline.number_of_edges(), 4);
        assert_eq!(polyline.edge(3), Some((1, 4)));

        polyline.remove_point_id(9);
        assert_eq!(polyline.edges(), vec![(7, 3), (3, 1), (1, 4)]);

        polyline.set_point_id(0, 8).unwrap();
        assert_eq!(polyline.edge(0), Some((8, 3)));
        assert!(polyline.set_point_id(10, 0).is_err());

        polyline.set_point_ids(&[5]);
        assert!(polyline.edges().is_empty());

        polyline.clear_points();
        assert_eq!(polyline.number_of_points(), 0);
        assert!(polyline.edge(0).is_none());
    }

    #[test]
    fn placeholder_polyline() {
        let polyline = PolylineCell::with_number_of_points(3);
        assert_eq!(polyline.point_ids(), &[u32::MAX; 3]);
        assert_eq!(polyline.number_of_edges(), 2);
    }
}
