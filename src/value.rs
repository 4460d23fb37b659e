//! Decoded values and byte-array inputs

use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::header::ValueType;

/// A value read from the wire
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `PositiveNumber` or `NegativeNumber`
    Int(i64),
    /// `String` or `ByteArray`; both are kept as raw bytes
    Bytes(Vec<u8>),
    /// `BoolTrue` or `BoolFalse`
    Bool(bool),
    /// `Double`
    Double(f64),
}

impl Value {
    /// Whether this value can have been read from an element of `value_type`
    pub fn matches(&self, value_type: ValueType) -> bool {
        matches!(
            (self, value_type),
            (Value::Int(_), ValueType::PositiveNumber | ValueType::NegativeNumber)
                | (Value::Bytes(_), ValueType::String | ValueType::ByteArray)
                | (Value::Bool(true), ValueType::BoolTrue)
                | (Value::Bool(false), ValueType::BoolFalse)
                | (Value::Double(_), ValueType::Double)
        )
    }
}

/// Element accepted by `MessageBuilder::add_byte_array`
///
/// Anything that names exactly one byte: a `u8`, an integer in `0..=255`, an
/// ASCII `char`, or a one-byte string.
pub trait InputByte {
    /// Convert to a byte, failing with `Error::InvalidInputByte`
    fn to_byte(&self) -> Result<u8>;
}

impl InputByte for u8 {
    #[inline]
    fn to_byte(&self) -> Result<u8> {
        Ok(*self)
    }
}

impl InputByte for char {
    fn to_byte(&self) -> Result<u8> {
        if self.is_ascii() {
            Ok(*self as u8)
        } else {
            Err(Error::InvalidInputByte("is not a single byte"))
        }
    }
}

impl InputByte for &str {
    fn to_byte(&self) -> Result<u8> {
        match self.as_bytes() {
            [byte] => Ok(*byte),
            _ => Err(Error::InvalidInputByte("is a non-char string")),
        }
    }
}

macro_rules! impl_input_byte_for_int {
    ($($ty:ty),*) => {
        $(
            impl InputByte for $ty {
                fn to_byte(&self) -> Result<u8> {
                    u8::try_from(*self).map_err(|_| Error::InvalidInputByte("is not a valid byte"))
                }
            }
        )*
    };
}

impl_input_byte_for_int!(i8, i16, i32, i64, u16, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_matches_type() {
        assert!(Value::Int(-3).matches(ValueType::NegativeNumber));
        assert!(Value::Int(3).matches(ValueType::PositiveNumber));
        assert!(Value::Bytes(Vec::new()).matches(ValueType::String));
        assert!(Value::Bool(false).matches(ValueType::BoolFalse));
        assert!(!Value::Bool(false).matches(ValueType::BoolTrue));
        assert!(!Value::Double(1.0).matches(ValueType::PositiveNumber));
    }

    #[test]
    fn test_input_bytes() {
        assert_eq!(0xFFu8.to_byte(), Ok(0xFF));
        assert_eq!('h'.to_byte(), Ok(b'h'));
        assert_eq!("i".to_byte(), Ok(b'i'));
        assert_eq!(255i32.to_byte(), Ok(255));
        assert_eq!(0usize.to_byte(), Ok(0));
    }

    #[test]
    fn test_invalid_input_bytes() {
        assert_eq!(
            'ö'.to_byte(),
            Err(Error::InvalidInputByte("is not a single byte"))
        );
        assert!("ab".to_byte().is_err());
        assert!("".to_byte().is_err());
        assert!("ö".to_byte().is_err());
        assert!(256i32.to_byte().is_err());
        assert!((-1i64).to_byte().is_err());
    }
}
