//! Command line tool to inspect and re-encode legacy PolyData files
//!
//! Reads any legacy `DATASET POLYDATA` file, ASCII or binary, logs a summary
//! of what it contains, and optionally writes it back out in either encoding.
//!
//! # Usage
//!
//! ```text
//! Usage: polyconvert <input> [output] [options]
//! ```
//!
//! Help is printed with the `-h` flag, and `--help` will show examples, default
//! values, examples, and any important behaviour.
//!
//! ## Options
//!
//! By default a simple summary of the file is logged.
//!
//! ```bash
//! # Print a summary of the points, cells and attributes
//! polyconvert surface.vtk
//! ```
//!
//! ### Convert between encodings
//!
//! Providing an output path writes the mesh back out. The encoding of the input
//! is kept unless `--binary` or `--ascii` is given.
//!
//! ```bash
//! # Write a big-endian binary copy of a text file
//! polyconvert surface.vtk surface_binary.vtk --binary
//! ```
//!
//! Note that COLOR_SCALARS are always written as single unsigned bytes, so
//! colours outside of `[0, 255]` are clamped on the way out.
//!
//! ### Dump the header to JSON
//!
//! The parsed header, including the per-kind cell counts, can be written as
//! JSON for use elsewhere.
//!
//! ```bash
//! # Output a file named 'polydata.json'
//! polyconvert surface.vtk --json
//! ```

// standard libraries
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

// crate modules
use vtkpoly::mesh::{FileType, PolyData};
use vtkpoly::utils::*;

// external crates
use anyhow::{Context, Result};
use clap::Parser;
use log::*;

#[doc(hidden)]
fn main() -> Result<()> {
    // set up the command line interface and match arguments
    let cli: Cli = Cli::parse();

    // set up logging (+2 to make 'Info' the default)
    let verbosity = cli.verbose as usize + 2;
    logging_init(verbosity, cli.quiet)?;

    // Try to read the whole file
    let mut mesh = PolyData::read(&cli.input)?;
    debug!("{}", mesh.info());

    // Log a summary of the file for reference
    if !cli.quiet {
        print_summary(&mesh);
    }

    if cli.json {
        write_json(&mesh, &cli)?;
    }

    if let Some(title) = &cli.title {
        mesh.set_title(title);
    }

    if let Some(output) = &cli.output {
        let file_type = output_file_type(&mesh, &cli);
        info!("Writing {output} as {file_type}");
        mesh.write(output, file_type)?;
    }

    Ok(())
}

/// Inspect and convert legacy VTK PolyData files
///
/// Reads points, vertices, lines, polygons and the first point and cell
/// attributes of a legacy file in either encoding.
///
/// Examples
/// --------
///
///  Print a summary of the file
///     $ polyconvert surface.vtk
///
///  Convert to binary
///     $ polyconvert surface.vtk copy.vtk --binary
///
///  Convert to ASCII with a new title
///     $ polyconvert surface.vtk copy.vtk --ascii --title "Cleaned surface"
///
///  Dump the header to JSON
///     $ polyconvert surface.vtk --json
///
/// Notes
/// -----
///
/// Triangles are stored under POLYGONS in the file and so come back as
/// generic polygons. COLOR_SCALARS are narrowed to unsigned bytes.
#[doc(hidden)]
#[derive(Parser)]
#[command(
    verbatim_doc_comment,
    arg_required_else_help(true),
    before_help(banner()),
    after_help(
        "Typical use: polyconvert surface.vtk copy.vtk --binary\n\nNOTE: --help shows more detail and examples"
    ),
    term_width(70),
    hide_possible_values(true),
    override_usage("polyconvert <input> [output] [options]")
)]
struct Cli {
    // * Positional
    /// Path to input vtk file
    #[arg(name = "input")]
    input: String,

    /// Path to output vtk file
    ///
    /// Nothing is written unless this is provided.
    #[arg(name = "output")]
    output: Option<String>,

    // * Optional
    /// Write the output as big-endian binary
    #[arg(help_heading("Vtk options"))]
    #[arg(short, long)]
    #[arg(conflicts_with = "ascii")]
    binary: bool,

    /// Write the output as ASCII text
    #[arg(help_heading("Vtk options"))]
    #[arg(short, long)]
    ascii: bool,

    /// Replace the title line of the output
    #[arg(help_heading("Vtk options"))]
    #[arg(short, long)]
    #[arg(value_name = "text")]
    title: Option<String>,

    /// Generate a JSON file of the header ('polydata.json' default)
    ///
    /// Uses the output file name with a .json extension if one is given.
    #[arg(help_heading("Inspection options"))]
    #[arg(short, long)]
    json: bool,

    // * Flags
    /// Verbose logging (-v, -vv)
    ///
    /// If specified, the default log level of INFO is increased to DEBUG (-v)
    /// or TRACE (-vv). Errors and Warnings are always logged unless in quiet
    /// (-q) mode.
    #[arg(short, long)]
    #[arg(action = clap::ArgAction::Count)]
    verbose: u8,

    /// Supress all log output (overrules --verbose)
    #[arg(short, long)]
    quiet: bool,
}

/// Sets up logging at runtime to allow for multiple verbosity levels
#[doc(hidden)]
fn logging_init(verbosity: usize, quiet: bool) -> Result<()> {
    stderrlog::new()
        .modules(vec![module_path!(), "vtkpoly"])
        .quiet(quiet)
        .verbosity(verbosity)
        .show_level(false)
        .color(stderrlog::ColorChoice::Never)
        .timestamp(stderrlog::Timestamp::Off)
        .init()
        .context("Could not initialise logging")
}

/// Creates a banner fot the command line
#[doc(hidden)]
fn banner() -> String {
    let mut s = f!("{:-<1$}\n", "", 70);
    s += &f!("{:^70}\n", "Vtkpoly :: PolyData Converter");
    s += &f!("{:-<1$}", "", 70);
    s
}

/// Keep the input encoding unless told otherwise
#[doc(hidden)]
fn output_file_type(mesh: &PolyData, cli: &Cli) -> FileType {
    if cli.binary {
        FileType::Binary
    } else if cli.ascii {
        FileType::Ascii
    } else {
        mesh.info().file_type
    }
}

#[doc(hidden)]
/// Write the parsed header to json
fn write_json(mesh: &PolyData, cli: &Cli) -> Result<()> {
    let output = match &cli.output {
        Some(o) => Path::new(o).with_extension("json"),
        None => Path::new("polydata.json").to_path_buf(),
    };

    debug!("Writing JSON header to {}", output.display());
    let file = File::create(&output).with_context(|| f!("Could not create {}", output.display()))?;
    Ok(serde_json::to_writer_pretty(BufWriter::new(file), &mesh.info())?)
}

#[doc(hidden)]
/// Write summary to the terminal
fn print_summary(mesh: &PolyData) {
    let info = mesh.info();
    let mut s = f!("{}\n", textwrap::fill(&info.title, 70));
    s += &f!("encoding : {}\n", info.file_type);
    s += &f!(
        "points   : {} ({})\n",
        info.number_of_points, info.point_component
    );
    s += &f!(
        "cells    : {} ({})\n",
        info.number_of_cells, info.ledger
    );
    for (label, data) in [("point data", &info.point_data), ("cell data", &info.cell_data)] {
        if let Some(a) = data {
            s += &f!(
                "{:<9}: \"{}\" {:?} x{} ({})\n",
                capitalise(label),
                a.name,
                a.pixel,
                a.components,
                a.component
            );
        }
    }
    println!("{}", s.trim_end())
}
