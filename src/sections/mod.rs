//! Codecs for the individual sections of a legacy PolyData file
//!
//! Readers work over a [SectionScanner](crate::readers::SectionScanner) that
//! has already consumed the preamble, writers over anything implementing
//! [std::io::Write]. Both directions handle the text and binary encodings.
//!
//! | Section                         | Read                | Write               |
//! | ------------------------------- | ------------------- | ------------------- |
//! | preamble and headers            | [read_mesh_info]    | [write_preamble]    |
//! | `POINTS`                        | [read_points]       | [write_points]      |
//! | `VERTICES`, `LINES`, `POLYGONS` | [read_cells]        | [write_cells]       |
//! | `POINT_DATA`, `CELL_DATA`       | [read_attribute]    | [write_attribute]   |

// Split into subfiles for development, but anything important is re-exported
mod attributes;
mod cells;
mod header;
mod points;

#[doc(inline)]
pub use crate::sections::attributes::{
    read_attribute, read_attribute_header, write_attribute, Association, AttributeHeader,
    AttributeShape,
};

#[doc(inline)]
pub use crate::sections::cells::{read_cells, update_cell_information, write_cells};

#[doc(inline)]
pub use crate::sections::header::{read_mesh_info, write_preamble};

#[doc(inline)]
pub use crate::sections::points::{read_points, write_points};
