//! Message builder
//!
//! Appends tagged values to a [`ByteSink`]. Each `add_*` call writes one
//! header followed by the value body and advances the builder position by
//! the number of bytes written.

use alloc::vec::Vec;

use tracing::{debug, trace};

use crate::channel::ByteSink;
use crate::error::{Error, Result};
use crate::header::{Header, ValueType};
use crate::value::InputByte;
use crate::varint;

/// Serializes tagged values into a byte sink
#[derive(Debug)]
pub struct MessageBuilder<S> {
    sink: S,
    pos: usize,
}

impl<S: ByteSink> MessageBuilder<S> {
    /// Create a builder writing to `sink`, reporting positions from `position`
    #[inline]
    pub fn new(sink: S, position: usize) -> Self {
        Self {
            sink,
            pos: position,
        }
    }

    /// Get current position: the start position plus bytes written so far
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Give back the sink
    #[inline]
    pub fn into_inner(self) -> S {
        self.sink
    }

    /// Add a signed integer
    ///
    /// Zero and positive values use `PositiveNumber`, negative values use
    /// `NegativeNumber`; the body is the varint of the magnitude.
    pub fn add_int(&mut self, tag: u32, value: i64) -> Result<()> {
        let value_type = if value < 0 {
            ValueType::NegativeNumber
        } else {
            ValueType::PositiveNumber
        };
        let magnitude = value.unsigned_abs();

        let header = self.header(tag, value_type)?;
        // checked before the header goes out so a failing call writes nothing
        if magnitude > varint::MAX_VARINT_VALUE {
            debug!(tag, value, "integer magnitude exceeds varint limit");
            return Err(Error::VarintOutOfRange(magnitude));
        }

        self.put_header(header)?;
        self.put_varint(magnitude)
    }

    /// Add a UTF-8 string
    pub fn add_string(&mut self, tag: u32, value: &str) -> Result<()> {
        let header = self.header(tag, ValueType::String)?;
        self.put_header(header)?;
        self.put_varbytes(value.as_bytes())
    }

    /// Add a byte array
    ///
    /// Every element must name exactly one byte (see [`InputByte`]); the whole
    /// array is checked before anything is written.
    pub fn add_byte_array<T: InputByte>(&mut self, tag: u32, value: &[T]) -> Result<()> {
        let header = self.header(tag, ValueType::ByteArray)?;
        let bytes = value
            .iter()
            .map(InputByte::to_byte)
            .collect::<Result<Vec<u8>>>()
            .inspect_err(|err| debug!(tag, %err, "rejected byte array"))?;

        self.put_header(header)?;
        self.put_varbytes(&bytes)
    }

    /// Add a boolean; the value lives entirely in the header type
    pub fn add_boolean(&mut self, tag: u32, value: bool) -> Result<()> {
        let value_type = if value {
            ValueType::BoolTrue
        } else {
            ValueType::BoolFalse
        };
        let header = self.header(tag, value_type)?;
        self.put_header(header)
    }

    /// Add a double as 8 little-endian bytes
    pub fn add_double(&mut self, tag: u32, value: f64) -> Result<()> {
        let header = self.header(tag, ValueType::Double)?;
        self.put_header(header)?;
        self.put_bytes(&value.to_le_bytes())
    }

    #[inline]
    fn header(&self, tag: u32, value_type: ValueType) -> Result<Header> {
        Header::new(tag, value_type).inspect_err(|err| debug!(tag, %err, "rejected tag"))
    }

    #[inline]
    fn put_header(&mut self, header: Header) -> Result<()> {
        trace!(
            tag = header.tag,
            value_type = ?header.value_type,
            position = self.pos,
            "writing element"
        );
        self.pos += header.encode(&mut self.sink)?;
        Ok(())
    }

    #[inline]
    fn put_varint(&mut self, value: u64) -> Result<()> {
        self.pos += varint::write(&mut self.sink, value)?;
        Ok(())
    }

    #[inline]
    fn put_varbytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.put_varint(bytes.len() as u64)?;
        self.put_bytes(bytes)
    }

    #[inline]
    fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink.write_bytes(bytes)?;
        self.pos += bytes.len();
        Ok(())
    }
}
