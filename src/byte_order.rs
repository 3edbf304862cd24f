//! Conversion between native and big-endian wire order
//!
//! The binary variant of the legacy format stores every numeric block in
//! big-endian order regardless of the machine that wrote it. The conversions
//! are done by `byteorder`, so on a big-endian host they cost nothing.
//!
//! ```rust
//! # use vtkpoly::byte_order::{to_native_order, to_wire_order};
//! let mut values = [1.0f32, -2.5, 3.25];
//! to_wire_order(&mut values);
//! to_native_order(&mut values);
//! assert_eq!(values, [1.0, -2.5, 3.25]);
//! ```

// internal modules
use crate::element::Element;

// standard library
use std::io::{Read, Result, Write};

/// Convert native values to wire order in place
pub fn to_wire_order<T: Element>(buffer: &mut [T]) {
    T::swap_big_endian(buffer)
}

/// Convert wire ordered values back to native order in place
///
/// The swap is its own inverse, this exists so call sites say what they mean.
pub fn to_native_order<T: Element>(buffer: &mut [T]) {
    T::swap_big_endian(buffer)
}

/// Write values to the output in wire order
///
/// The caller buffer is left untouched, values are encoded as they are
/// streamed out.
pub fn write_wire<W: Write, T: Element>(writer: &mut W, buffer: &[T]) -> Result<()> {
    T::write_big_endian(writer, buffer)
}

/// Fill `buffer` with exactly `buffer.len()` wire ordered values
pub fn read_wire<R: Read, T: Element>(reader: &mut R, buffer: &mut [T]) -> Result<()> {
    T::read_big_endian(reader, buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn round_trip<T: Element>(values: &[T]) {
        let mut buffer = values.to_vec();
        to_wire_order(&mut buffer);
        to_native_order(&mut buffer);
        assert_eq!(buffer, values);
    }

    #[test]
    fn swap_round_trips_for_every_width() {
        round_trip(&[0u8, 1, 255]);
        round_trip(&[i8::MIN, -1, i8::MAX]);
        round_trip(&[0u16, 0x1234, u16::MAX]);
        round_trip(&[i16::MIN, -300, i16::MAX]);
        round_trip(&[0u32, 0x0102_0304, u32::MAX]);
        round_trip(&[i32::MIN, -7, i32::MAX]);
        round_trip(&[0u64, 0x0102_0304_0506_0708, u64::MAX]);
        round_trip(&[i64::MIN, -9, i64::MAX]);
        round_trip(&[0.0f32, -0.0, 1.5e-30, f32::MAX, f32::INFINITY]);
        round_trip(&[0.0f64, -1.0e300, f64::MIN_POSITIVE, f64::NEG_INFINITY]);
    }

    #[test]
    fn wire_bytes_are_big_endian() {
        let mut out = Vec::new();
        write_wire(&mut out, &[1.0f32, 2.0]).unwrap();
        assert_eq!(out, [0x3f, 0x80, 0, 0, 0x40, 0, 0, 0]);

        let mut out = Vec::new();
        write_wire(&mut out, &[0x0102_0304u32]).unwrap();
        assert_eq!(out, [1, 2, 3, 4]);

        let mut out = Vec::new();
        write_wire(&mut out, &[-2.0f64]).unwrap();
        assert_eq!(out, (-2.0f64).to_be_bytes());
    }

    #[test]
    fn writing_leaves_the_caller_buffer_alone() {
        let values = [1u32, 2, 3];
        let mut out = Vec::new();
        write_wire(&mut out, &values).unwrap();
        assert_eq!(values, [1, 2, 3]);
    }

    #[test]
    fn read_reverses_write() {
        let values = [3.5f64, -0.125, 1.0e-12];
        let mut bytes = Vec::new();
        write_wire(&mut bytes, &values).unwrap();

        let mut decoded = [0.0f64; 3];
        read_wire(&mut Cursor::new(bytes), &mut decoded).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn short_reads_fail() {
        let mut decoded = [0u32; 2];
        let result = read_wire(&mut Cursor::new(vec![0u8; 7]), &mut decoded);
        assert!(result.is_err());
    }
}
