//! Element header: tag plus value type
//!
//! ```text
//!   7   6   5   4   3   2   1   0
//! +-------------------+-----------+
//! |  tag (0..=30)     |   type    |     simple header
//! +-------------------+-----------+
//! |  1   1   1   1   1|   type    | varint(tag)   extended header
//! +-------------------+-----------+
//! ```

use crate::channel::ByteSink;
use crate::error::{Error, Result};
use crate::varint;
use crate::{EXTENDED_TAG_MARKER, MAX_TAG};

/// Wire type of an element's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueType {
    /// Non-negative integer, body is varint(value)
    PositiveNumber = 0,
    /// Negative integer, body is varint(-value)
    NegativeNumber = 1,
    /// UTF-8 text, body is varint(len) + bytes
    String = 2,
    /// Raw bytes, body is varint(len) + bytes
    ByteArray = 3,
    /// `true`, no body
    BoolTrue = 4,
    /// `false`, no body
    BoolFalse = 5,
    /// IEEE-754 binary64, body is 8 bytes little-endian
    Double = 6,
}

impl ValueType {
    /// Mask selecting the type bits of a header byte
    pub const MASK: u8 = 0x07;

    /// Wire code of this type
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Look up a type by wire code; code 7 is reserved
    #[inline]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ValueType::PositiveNumber),
            1 => Some(ValueType::NegativeNumber),
            2 => Some(ValueType::String),
            3 => Some(ValueType::ByteArray),
            4 => Some(ValueType::BoolTrue),
            5 => Some(ValueType::BoolFalse),
            6 => Some(ValueType::Double),
            _ => None,
        }
    }
}

impl TryFrom<u8> for ValueType {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        Self::from_code(code).ok_or(Error::UnknownValueType(code))
    }
}

/// Tag and type of one element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Caller-assigned field tag
    pub tag: u32,
    /// Type of the value that follows
    pub value_type: ValueType,
}

impl Header {
    /// Create a header, rejecting tags above [`MAX_TAG`]
    #[inline]
    pub fn new(tag: u32, value_type: ValueType) -> Result<Self> {
        if tag > MAX_TAG {
            return Err(Error::InvalidTag(tag));
        }
        Ok(Self { tag, value_type })
    }

    /// Whether the tag needs the extended form
    #[inline]
    pub fn is_extended(&self) -> bool {
        self.tag >= EXTENDED_TAG_MARKER
    }

    /// Write the header, returning the number of bytes written
    pub fn encode<S: ByteSink + ?Sized>(&self, sink: &mut S) -> Result<usize> {
        if self.tag > MAX_TAG {
            return Err(Error::InvalidTag(self.tag));
        }

        if self.is_extended() {
            sink.write_byte(((EXTENDED_TAG_MARKER as u8) << 3) | self.value_type.code())?;
            let tag_len = varint::write(sink, u64::from(self.tag))?;
            return Ok(1 + tag_len);
        }

        sink.write_byte(((self.tag as u8) << 3) | self.value_type.code())?;
        Ok(1)
    }

    /// Split a header byte into its inline tag and raw type code
    #[inline]
    pub const fn split(byte: u8) -> (u32, u8) {
        ((byte >> 3) as u32, byte & ValueType::MASK)
    }
}
