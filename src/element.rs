//! Numeric element types that can live in a PolyData buffer
//!
//! The legacy format names its element types (`float`, `unsigned_int`, ...)
//! and every buffer handed to the codec is a slice of one of them. The
//! [Element] trait carries the per-type knowledge needed by the text and binary
//! paths so that all buffer operations can be written once as generics.

// internal modules
use crate::mesh::ComponentType;

// standard library
use std::fmt::{Debug, Display};
use std::io::{Read, Result, Write};

// external crates
use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};

/// A fixed width numeric type supported by the legacy format
///
/// Implemented for `u8`, `i8`, `u16`, `i16`, `u32`, `i32`, `u64`, `i64`, `f32`
/// and `f64`.
///
/// ```rust
/// # use vtkpoly::element::Element;
/// # use vtkpoly::mesh::ComponentType;
/// assert_eq!(<f32 as Element>::COMPONENT, ComponentType::Float);
/// assert_eq!(<u32 as Element>::WIDTH, 4);
/// assert_eq!(f64::parse_token("1.5e2"), Some(150.0));
/// ```
pub trait Element: Copy + Default + PartialEq + Debug + Display + 'static {
    /// The name this type goes by in section headers
    const COMPONENT: ComponentType;

    /// Size in bytes of one element
    const WIDTH: usize;

    /// Swap native values to big-endian in place, or back again
    fn swap_big_endian(buffer: &mut [Self]);

    /// Stream values out as big-endian bytes
    fn write_big_endian<W: Write>(writer: &mut W, buffer: &[Self]) -> Result<()>;

    /// Fill the whole buffer from big-endian bytes
    fn read_big_endian<R: Read>(reader: &mut R, buffer: &mut [Self]) -> Result<()>;

    /// Parse a whitespace-free text token
    fn parse_token(token: &str) -> Option<Self>;

    /// Lossless for everything but 64-bit integers above 2^53
    fn to_f64(self) -> f64;

    /// Saturating conversion, fractional parts truncated for integer types
    fn from_f64(value: f64) -> Self;

    /// Saturating narrowing to a single unsigned byte
    fn to_u8(self) -> u8;
}

/// Conversions that are the same for every element type
macro_rules! numeric_conversions {
    ($t:ty) => {
        fn parse_token(token: &str) -> Option<Self> {
            token.parse::<$t>().ok()
        }

        #[inline]
        fn to_f64(self) -> f64 {
            self as f64
        }

        #[inline]
        fn from_f64(value: f64) -> Self {
            value as $t
        }

        #[inline]
        fn to_u8(self) -> u8 {
            // float to int casts saturate, int to int casts wrap
            (self as f64) as u8
        }
    };
}

macro_rules! impl_element {
    ($($t:ty => $component:ident, $from_slice:ident, $write:ident, $read_into:ident;)*) => {
        $(
            impl Element for $t {
                const COMPONENT: ComponentType = ComponentType::$component;
                const WIDTH: usize = std::mem::size_of::<$t>();

                #[inline]
                fn swap_big_endian(buffer: &mut [Self]) {
                    BigEndian::$from_slice(buffer)
                }

                fn write_big_endian<W: Write>(writer: &mut W, buffer: &[Self]) -> Result<()> {
                    buffer.iter().try_for_each(|v| writer.$write::<BigEndian>(*v))
                }

                fn read_big_endian<R: Read>(reader: &mut R, buffer: &mut [Self]) -> Result<()> {
                    reader.$read_into::<BigEndian>(buffer)
                }

                numeric_conversions!($t);
            }
        )*
    };
}

impl_element! {
    u16 => UnsignedShort, from_slice_u16, write_u16, read_u16_into;
    i16 => Short, from_slice_i16, write_i16, read_i16_into;
    u32 => UnsignedInt, from_slice_u32, write_u32, read_u32_into;
    i32 => Int, from_slice_i32, write_i32, read_i32_into;
    u64 => UnsignedLong, from_slice_u64, write_u64, read_u64_into;
    i64 => Long, from_slice_i64, write_i64, read_i64_into;
    f32 => Float, from_slice_f32, write_f32, read_f32_into;
    f64 => Double, from_slice_f64, write_f64, read_f64_into;
}

// single bytes have no order to speak of

impl Element for u8 {
    const COMPONENT: ComponentType = ComponentType::UnsignedChar;
    const WIDTH: usize = 1;

    #[inline]
    fn swap_big_endian(_buffer: &mut [Self]) {}

    fn write_big_endian<W: Write>(writer: &mut W, buffer: &[Self]) -> Result<()> {
        writer.write_all(buffer)
    }

    fn read_big_endian<R: Read>(reader: &mut R, buffer: &mut [Self]) -> Result<()> {
        reader.read_exact(buffer)
    }

    numeric_conversions!(u8);
}

impl Element for i8 {
    const COMPONENT: ComponentType = ComponentType::Char;
    const WIDTH: usize = 1;

    #[inline]
    fn swap_big_endian(_buffer: &mut [Self]) {}

    fn write_big_endian<W: Write>(writer: &mut W, buffer: &[Self]) -> Result<()> {
        buffer.iter().try_for_each(|v| writer.write_i8(*v))
    }

    fn read_big_endian<R: Read>(reader: &mut R, buffer: &mut [Self]) -> Result<()> {
        reader.read_i8_into(buffer)
    }

    numeric_conversions!(i8);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-1.0, 0)]
    #[case(12.9, 12)]
    #[case(255.0, 255)]
    #[case(300.0, 255)]
    #[case(f64::NAN, 0)]
    fn narrowing_saturates(#[case] value: f64, #[case] expected: u8) {
        assert_eq!(value.to_u8(), expected);
    }

    #[test]
    fn wide_integers_saturate_into_a_byte() {
        assert_eq!(70_000u32.to_u8(), 255);
        assert_eq!((-5i32).to_u8(), 0);
        assert_eq!(200i16.to_u8(), 200);
    }

    #[test]
    fn big_endian_swap_matches_wire_bytes() {
        let mut values = [1.0f32, -2.5];
        f32::swap_big_endian(&mut values);
        assert_eq!(values[0].to_bits().to_ne_bytes(), 1.0f32.to_be_bytes());
        assert_eq!(values[1].to_bits().to_ne_bytes(), (-2.5f32).to_be_bytes());

        f32::swap_big_endian(&mut values);
        assert_eq!(values, [1.0, -2.5]);
    }

    #[test]
    fn signed_bytes_stream_unchanged() {
        let mut out = Vec::new();
        i8::write_big_endian(&mut out, &[-1, 5]).unwrap();
        assert_eq!(out, [0xff, 5]);

        let mut decoded = [0i8; 2];
        i8::read_big_endian(&mut out.as_slice(), &mut decoded).unwrap();
        assert_eq!(decoded, [-1, 5]);
    }

    #[rstest]
    #[case("42", Some(42))]
    #[case("-1", None)]
    #[case("4.0", None)]
    fn unsigned_tokens(#[case] token: &str, #[case] expected: Option<u32>) {
        assert_eq!(u32::parse_token(token), expected);
    }
}
