//! Common small functions used throughout the crate
//!
//! These are left public for the convenience of the user, for example checking
//! file extensions or laying out rows of numbers the way the text files do.

// standard library
use std::fmt::Display;
use std::path::Path;

// external crates
use itertools::Itertools;

// Alias for the format! macro out of laziness
pub use std::format as f;

/// Separator between columns of an attribute row in text files
pub const COLUMN_SEPARATOR: &str = "  ";

/// Case-insensitive check of a file extension
///
/// ```rust
/// # use vtkpoly::utils::has_extension;
/// assert!(has_extension("mesh.VTK", "vtk"));
/// assert!(!has_extension("mesh.vtu", "vtk"));
/// assert!(!has_extension("vtk", "vtk"));
/// ```
pub fn has_extension<P: AsRef<Path>>(path: P, extension: &str) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Join any displayable values with the column separator
///
/// ```rust
/// # use vtkpoly::utils::join_row;
/// assert_eq!(join_row(&[1.5, 2.0, -3.0]), "1.5  2  -3");
/// ```
pub fn join_row<T: Display>(values: &[T]) -> String {
    values.iter().join(COLUMN_SEPARATOR)
}

/// Capilalises the first letter in a string
///
/// ```rust
/// # use vtkpoly::utils::capitalise;
/// assert_eq!(capitalise("point data"), "Point data".to_string());
/// ```
pub fn capitalise(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
        None => String::new(),
    }
}
