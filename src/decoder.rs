//! Message parser
//!
//! A pull parser over a bounded range of a [`ByteSource`]. Each call to
//! [`MessageParser::next`] reads one element and reports the outcome as a
//! [`State`]; malformed data never surfaces as an `Err`. When a value body is
//! cut short the parser reports [`State::EndOfDocument`] rather than
//! [`State::Error`], so a caller feeding a growing buffer can retry once more
//! bytes arrive.

use alloc::format;
use alloc::string::String;
use alloc::vec;

use tracing::{debug, trace};

use crate::channel::{ByteSource, Window};
use crate::error::{Error, Result};
use crate::header::{Header, ValueType};
use crate::value::Value;
use crate::varint;
use crate::{DOUBLE_SIZE, EXTENDED_TAG_MARKER, MAX_TAG};

/// Outcome of one parser step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// An element was read; its tag and value are available
    FoundTag,
    /// No complete element left within the range
    EndOfDocument,
    /// The data is malformed; see [`MessageParser::last_error_message`]
    Error,
}

/// Pulls tagged values out of a byte source
#[derive(Debug)]
pub struct MessageParser<S> {
    source: S,
    pos: usize,
    end: usize,
    tag: u32,
    value_type: Option<ValueType>,
    value: Option<Value>,
    last_error: Option<String>,
}

/// Why a step stopped short of `FoundTag`
enum Stop {
    End,
    Malformed(String),
}

impl<S: ByteSource> MessageParser<S> {
    /// Create a parser reading `length` bytes of `source` from `position`
    ///
    /// Fails with `Error::InvalidLength` for an empty range, and with
    /// `Error::SourceTooShort` when an in-memory source ends before the range.
    pub fn new(source: S, position: usize, length: usize) -> Result<Self> {
        if length == 0 {
            return Err(Error::InvalidLength);
        }

        let end = position.checked_add(length).ok_or(Error::InvalidLength)?;
        if let Some(available) = source.len_hint() {
            if available < end {
                return Err(Error::SourceTooShort {
                    available,
                    required: end,
                });
            }
        }

        Ok(Self {
            source,
            pos: position,
            end,
            tag: 0,
            value_type: None,
            value: None,
            last_error: None,
        })
    }

    /// Advance to the next element
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> State {
        self.last_error = None;
        self.value_type = None;
        self.value = None;

        if self.pos >= self.end {
            return State::EndOfDocument;
        }

        match self.step() {
            Ok(()) => {
                trace!(
                    tag = self.tag,
                    value_type = ?self.value_type,
                    position = self.pos,
                    "found element"
                );
                State::FoundTag
            }
            Err(Stop::End) => {
                debug!(position = self.pos, "element truncated, treating as end of document");
                State::EndOfDocument
            }
            Err(Stop::Malformed(message)) => {
                debug!(position = self.pos, %message, "malformed element");
                self.last_error = Some(message);
                State::Error
            }
        }
    }

    /// Message explaining the last `State::Error`, cleared by every `next()`
    pub fn last_error_message(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Tag of the current element
    #[inline]
    pub fn tag(&self) -> u32 {
        self.tag
    }

    /// Wire type of the current element, if one was found
    #[inline]
    pub fn value_type(&self) -> Option<ValueType> {
        self.value_type
    }

    /// Current value, if one was found
    #[inline]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Position reached so far: the start position plus bytes consumed
    #[inline]
    pub fn consumed(&self) -> usize {
        self.pos
    }

    /// Move past `bytes` bytes without interpreting them
    ///
    /// In-memory sources just move the position; streams have to read and
    /// discard the bytes. Fails with `Error::InvalidLength` if the new
    /// position would overflow.
    pub fn consume(&mut self, bytes: usize) -> Result<()> {
        let pos = self.pos.checked_add(bytes).ok_or(Error::InvalidLength)?;
        self.source.skip(self.pos, bytes)?;
        self.pos = pos;
        Ok(())
    }

    /// Current value as an integer
    pub fn get_int(&self) -> Result<i64> {
        match self.value {
            Some(Value::Int(value)) => Ok(value),
            _ => Err(Error::ValueMismatch {
                expected: "an integer",
            }),
        }
    }

    /// Current value as a boolean
    pub fn get_boolean(&self) -> Result<bool> {
        match self.value {
            Some(Value::Bool(value)) => Ok(value),
            _ => Err(Error::ValueMismatch {
                expected: "a boolean",
            }),
        }
    }

    /// Current value as a string
    ///
    /// Works for both `String` and `ByteArray` elements as long as the bytes
    /// are valid UTF-8.
    pub fn get_string(&self) -> Result<&str> {
        core::str::from_utf8(self.bytes()?).map_err(|_| Error::InvalidUtf8)
    }

    /// Current value as raw bytes; works for `String` and `ByteArray` elements
    pub fn get_byte_array(&self) -> Result<&[u8]> {
        self.bytes()
    }

    /// Current value as a double
    pub fn get_double(&self) -> Result<f64> {
        match self.value {
            Some(Value::Double(value)) => Ok(value),
            _ => Err(Error::ValueMismatch {
                expected: "a double",
            }),
        }
    }

    #[inline]
    fn bytes(&self) -> Result<&[u8]> {
        match &self.value {
            Some(Value::Bytes(bytes)) => Ok(bytes.as_slice()),
            _ => Err(Error::ValueMismatch {
                expected: "a byte array",
            }),
        }
    }

    /// Read one element starting at the current position
    fn step(&mut self) -> core::result::Result<(), Stop> {
        let byte = self.read_byte().map_err(|err| match err {
            Error::UnexpectedEof => Stop::End,
            err => Stop::Malformed(format!("Unable to read header; {err}")),
        })?;

        let (inline_tag, code) = Header::split(byte);
        let value_type = ValueType::from_code(code).ok_or_else(|| {
            Stop::Malformed(format!("Malformed tag-type; unknown value type {code}"))
        })?;

        self.tag = inline_tag;
        if inline_tag == EXTENDED_TAG_MARKER {
            // the real tag follows as a varint
            let (tag, len) = self
                .peek_varint()
                .map_err(|err| Stop::Malformed(format!("Malformed varint; {err}")))?;
            if tag > u64::from(MAX_TAG) {
                return Err(Stop::Malformed(format!(
                    "Malformed tag-type {tag} is a too large enum value"
                )));
            }
            self.pos += len;
            self.tag = tag as u32;
        }

        let value = match value_type {
            ValueType::PositiveNumber | ValueType::NegativeNumber => {
                let (magnitude, len) = self.peek_varint().map_err(|err| {
                    Stop::Malformed(format!(
                        "Malformed negative number or positive number; {err}"
                    ))
                })?;
                self.pos += len;

                // at most MAX_VARINT_VALUE, well inside i64
                let magnitude = magnitude as i64;
                if value_type == ValueType::NegativeNumber {
                    Value::Int(-magnitude)
                } else {
                    Value::Int(magnitude)
                }
            }
            ValueType::String | ValueType::ByteArray => {
                let (length, len) = self.peek_varint().map_err(|err| {
                    Stop::Malformed(format!("Malformed byte array or string; {err}"))
                })?;
                self.pos += len;

                let remaining = self.end - self.pos;
                let length = match usize::try_from(length) {
                    Ok(length) if length <= remaining => length,
                    _ => return Err(Stop::End),
                };

                let mut bytes = vec![0u8; length];
                self.read_bytes(&mut bytes).map_err(|err| match err {
                    Error::UnexpectedEof => Stop::End,
                    err => Stop::Malformed(format!("Malformed byte array or string; {err}")),
                })?;
                Value::Bytes(bytes)
            }
            ValueType::BoolTrue => Value::Bool(true),
            ValueType::BoolFalse => Value::Bool(false),
            ValueType::Double => {
                let mut bytes = [0u8; DOUBLE_SIZE];
                self.read_bytes(&mut bytes).map_err(|err| match err {
                    Error::UnexpectedEof => Stop::End,
                    err => Stop::Malformed(format!("Malformed double; {err}")),
                })?;
                Value::Double(f64::from_le_bytes(bytes))
            }
        };

        debug_assert!(value.matches(value_type));
        self.value_type = Some(value_type);
        self.value = Some(value);
        Ok(())
    }

    #[inline]
    fn window(&mut self) -> Window<'_, S> {
        Window::new(&mut self.source, self.end)
    }

    #[inline]
    fn read_byte(&mut self) -> Result<u8> {
        let pos = self.pos;
        let byte = self.window().read_byte(pos)?;
        self.pos += 1;
        Ok(byte)
    }

    /// Fill `out` and advance past it; the position is untouched on failure
    #[inline]
    fn read_bytes(&mut self, out: &mut [u8]) -> Result<()> {
        let pos = self.pos;
        self.window().read_bytes(pos, out)?;
        self.pos += out.len();
        Ok(())
    }

    /// Decode a varint at the current position without moving the position
    #[inline]
    fn peek_varint(&mut self) -> Result<(u64, usize)> {
        let pos = self.pos;
        varint::read(&mut self.window(), pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(input: &[u8]) -> MessageParser<&[u8]> {
        MessageParser::new(input, 0, input.len()).unwrap()
    }

    #[test]
    fn test_rejects_empty_range() {
        let input = [0x1C];
        assert!(matches!(
            MessageParser::new(&input[..], 0, 0),
            Err(Error::InvalidLength)
        ));
    }

    #[test]
    fn test_rejects_range_past_source() {
        let input = [0x82, 0xFE, 0x7F];
        assert!(matches!(
            MessageParser::new(&input[..], 1, 3),
            Err(Error::SourceTooShort {
                available: 3,
                required: 4
            })
        ));
    }

    #[test]
    fn test_read_positive_integer() {
        let input = [0x78, 0xB1, 0x70];
        let mut sut = parser(&input);

        assert_eq!(sut.next(), State::FoundTag);
        assert_eq!(sut.tag(), 15);
        assert_eq!(sut.value_type(), Some(ValueType::PositiveNumber));
        assert_eq!(sut.get_int().unwrap(), 6512);
        assert_eq!(sut.next(), State::EndOfDocument);
        assert_eq!(sut.consumed(), input.len());
    }

    #[test]
    fn test_read_negative_integer() {
        let input = [0x79, 0xB1, 0x70];
        let mut sut = parser(&input);

        assert_eq!(sut.next(), State::FoundTag);
        assert_eq!(sut.tag(), 15);
        assert_eq!(sut.get_int().unwrap(), -6512);
        assert_eq!(sut.next(), State::EndOfDocument);
        assert_eq!(sut.consumed(), input.len());
    }

    #[test]
    fn test_read_higher_tag() {
        let input = [0xF8, 0x80, 0x01, 0xB1, 0x70];
        let mut sut = parser(&input);

        assert_eq!(sut.next(), State::FoundTag);
        assert_eq!(sut.tag(), 129);
        assert_eq!(sut.get_int().unwrap(), 6512);
        assert_eq!(sut.next(), State::EndOfDocument);
    }

    #[test]
    fn test_read_string_and_bytes() {
        let input = [0xFB, 0x80, 0x48, 0x04, 0x68, 0x69, 0x68, 0x69];
        let mut sut = parser(&input);

        assert_eq!(sut.next(), State::FoundTag);
        assert_eq!(sut.tag(), 200);
        assert_eq!(sut.value_type(), Some(ValueType::ByteArray));
        assert_eq!(sut.get_byte_array().unwrap(), b"hihi");
        assert_eq!(sut.get_string().unwrap(), "hihi");
        assert_eq!(sut.consumed(), input.len());
    }

    #[test]
    fn test_read_booleans() {
        let input = [0x1C, 0xFD, 0x28];
        let mut sut = parser(&input);

        assert_eq!(sut.next(), State::FoundTag);
        assert_eq!(sut.tag(), 3);
        assert!(sut.get_boolean().unwrap());

        assert_eq!(sut.next(), State::FoundTag);
        assert_eq!(sut.tag(), 40);
        assert!(!sut.get_boolean().unwrap());
        assert_eq!(sut.next(), State::EndOfDocument);
    }

    #[test]
    fn test_read_double() {
        let input = [0x6E, 0x60, 0x3C, 0x83, 0x86, 0x4A, 0x51, 0xC2, 0xC0];
        let mut sut = parser(&input);

        assert_eq!(sut.next(), State::FoundTag);
        assert_eq!(sut.tag(), 13);
        assert_eq!(sut.get_double().unwrap(), -9378.58223);
        assert_eq!(sut.next(), State::EndOfDocument);
    }

    #[test]
    fn test_truncated_double_ends_document() {
        let input = [0x6E, 0x60, 0x3C, 0x83, 0x86, 0x4A, 0x51, 0xC2];
        let mut sut = parser(&input);

        assert_eq!(sut.next(), State::EndOfDocument);
        assert_eq!(sut.consumed(), 1);
        assert_eq!(sut.last_error_message(), None);
    }

    #[test]
    fn test_truncated_string_ends_document() {
        let input = [0x0A, 0x04, 0x46, 0xC3, 0xB6];
        let mut sut = parser(&input);

        assert_eq!(sut.next(), State::EndOfDocument);
        assert_eq!(sut.consumed(), 2);
    }

    #[test]
    fn test_reads_stop_at_range_end() {
        // the double is complete in the buffer but not inside the range
        let input = [0x6E, 0x60, 0x3C, 0x83, 0x86, 0x4A, 0x51, 0xC2, 0xC0];
        let mut sut = MessageParser::new(&input[..], 0, 5).unwrap();
        assert_eq!(sut.next(), State::EndOfDocument);
    }

    #[test]
    fn test_tag_limit() {
        let mut sut = parser(&[0xFC, 0x82, 0xFE, 0x7F]);
        assert_eq!(sut.next(), State::FoundTag);
        assert_eq!(sut.tag(), 65_535);
        assert!(sut.get_boolean().unwrap());

        let mut sut = parser(&[0xFC, 0x82, 0xFF, 0x00]);
        assert_eq!(sut.next(), State::Error);
        assert_eq!(
            sut.last_error_message(),
            Some("Malformed tag-type 65536 is a too large enum value")
        );
    }

    #[test]
    fn test_malformed_tag_varint() {
        let mut sut = parser(&[0xFC, 0x82, 0xFE]);
        assert_eq!(sut.next(), State::Error);
        assert!(sut.last_error_message().unwrap().contains("Malformed varint"));
    }

    #[test]
    fn test_malformed_number() {
        let mut sut = parser(&[0x78, 0xB1]);
        assert_eq!(sut.next(), State::Error);
        assert!(sut
            .last_error_message()
            .unwrap()
            .contains("Malformed negative number or positive number"));
    }

    #[test]
    fn test_malformed_string_length() {
        let mut sut = parser(&[0x0A, 0x82, 0xFF]);
        assert_eq!(sut.next(), State::Error);
        assert!(sut
            .last_error_message()
            .unwrap()
            .contains("Malformed byte array or string"));
    }

    #[test]
    fn test_overlong_varint() {
        let mut sut = parser(&[0x78, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x00]);
        assert_eq!(sut.next(), State::Error);
        assert!(sut
            .last_error_message()
            .unwrap()
            .contains("past maximum length"));
    }

    #[test]
    fn test_reserved_type_code() {
        let mut sut = parser(&[0x0F]);
        assert_eq!(sut.next(), State::Error);
        assert_eq!(
            sut.last_error_message(),
            Some("Malformed tag-type; unknown value type 7")
        );
    }

    #[test]
    fn test_error_message_cleared_by_next() {
        let input = [0x0F];
        let mut sut = MessageParser::new(&input[..], 0, 1).unwrap();
        assert_eq!(sut.next(), State::Error);
        assert!(sut.last_error_message().is_some());
        assert_eq!(sut.next(), State::EndOfDocument);
        assert_eq!(sut.last_error_message(), None);
    }

    #[test]
    fn test_consume_skips_bytes() {
        let input = [0x78, 0xB1, 0x70, 0x0A, 0x04, 0x46, 0xC3, 0xB6, 0x6F];
        let mut sut = parser(&input);

        sut.consume(3).unwrap();
        assert_eq!(sut.consumed(), 3);
        assert_eq!(sut.next(), State::FoundTag);
        assert_eq!(sut.tag(), 1);
        assert_eq!(sut.get_string().unwrap(), "Föo");
        assert_eq!(sut.next(), State::EndOfDocument);
        assert_eq!(sut.consumed(), input.len());
    }

    #[test]
    fn test_consume_overflow_is_rejected() {
        let input = [0x1C, 0x1C];
        let mut sut = parser(&input);

        assert_eq!(sut.next(), State::FoundTag);
        assert_eq!(sut.consume(usize::MAX), Err(Error::InvalidLength));
        assert_eq!(sut.consumed(), 1);
        assert_eq!(sut.next(), State::FoundTag);
        assert_eq!(sut.next(), State::EndOfDocument);
    }

    #[test]
    fn test_getter_mismatch_after_integer() {
        let mut sut = parser(&[0x78, 0xB1, 0x70]);
        assert_eq!(sut.next(), State::FoundTag);
        assert_eq!(sut.get_int().unwrap(), 6512);

        assert!(matches!(sut.get_boolean(), Err(Error::ValueMismatch { .. })));
        assert!(matches!(sut.get_string(), Err(Error::ValueMismatch { .. })));
        assert!(matches!(sut.get_byte_array(), Err(Error::ValueMismatch { .. })));
        assert!(matches!(sut.get_double(), Err(Error::ValueMismatch { .. })));
    }

    #[test]
    fn test_getter_mismatch_after_boolean() {
        let mut sut = parser(&[0x1C]);
        assert_eq!(sut.next(), State::FoundTag);
        assert_eq!(
            sut.get_int(),
            Err(Error::ValueMismatch {
                expected: "an integer"
            })
        );
    }

    #[test]
    fn test_invalid_utf8_string() {
        let mut sut = parser(&[0x0A, 0x02, 0xC3, 0x28]);
        assert_eq!(sut.next(), State::FoundTag);
        assert_eq!(sut.get_byte_array().unwrap(), [0xC3, 0x28]);
        assert_eq!(sut.get_string(), Err(Error::InvalidUtf8));
    }

    #[test]
    fn test_starts_at_offset() {
        let input = [0xAA, 0xBB, 0x1C, 0x78, 0xB1, 0x70];
        let mut sut = MessageParser::new(&input[..], 2, 4).unwrap();

        assert_eq!(sut.next(), State::FoundTag);
        assert!(sut.get_boolean().unwrap());
        assert_eq!(sut.next(), State::FoundTag);
        assert_eq!(sut.get_int().unwrap(), 6512);
        assert_eq!(sut.next(), State::EndOfDocument);
        assert_eq!(sut.consumed(), 6);
    }
}
