//! tagwire: compact tag-type-value binary message codec
//!
//! Messages are a flat sequence of elements. Each element carries a small
//! integer tag chosen by the caller, a 3-bit value type and the value body.
//! There is no schema on the wire: mapping tags to fields is up to the layer
//! above.
//!
//! # Wire Format
//!
//! ```text
//! message  := element*
//! element  := header body
//! header   := [tag:5 | type:3]                     tag 0..=30
//!           | [11111 | type:3] varint(tag)         tag 31..=65535
//! body     := varint(|n|)                          PositiveNumber(0) / NegativeNumber(1)
//!           | varint(len) bytes                    String(2) / ByteArray(3)
//!           | (empty)                              BoolTrue(4) / BoolFalse(5)
//!           | f64 little-endian (8 bytes)          Double(6)
//! ```
//!
//! Varints use a canonical big-endian base-128 form with at most 8 bytes; see
//! [`varint`].
//!
//! # Features
//!
//! - Builder and pull parser over any [`ByteSink`] / [`ByteSource`]
//! - In-memory buffers and `std::io` streams behind the same traits
//! - Truncated input is reported as end of document, not as corruption
//! - `no_std` support with `alloc` (disable the default `std` feature)
//!
//! # Example
//!
//! ```rust
//! use tagwire::{MessageBuilder, MessageParser, State};
//!
//! let mut buf = Vec::new();
//! let mut builder = MessageBuilder::new(&mut buf, 0);
//! builder.add_int(15, 6512)?;
//! builder.add_string(1, "Föo")?;
//! builder.add_boolean(40, false)?;
//! let len = builder.position();
//!
//! let mut parser = MessageParser::new(&buf[..], 0, len)?;
//! assert_eq!(parser.next(), State::FoundTag);
//! assert_eq!((parser.tag(), parser.get_int()?), (15, 6512));
//! assert_eq!(parser.next(), State::FoundTag);
//! assert_eq!(parser.get_string()?, "Föo");
//! assert_eq!(parser.next(), State::FoundTag);
//! assert_eq!((parser.tag(), parser.get_boolean()?), (40, false));
//! assert_eq!(parser.next(), State::EndOfDocument);
//! # Ok::<(), tagwire::Error>(())
//! ```

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod channel;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod header;
pub mod value;
pub mod varint;

// Re-export main types
pub use channel::{ByteSink, ByteSource};
#[cfg(feature = "std")]
pub use channel::{IoSink, IoSource};
pub use decoder::{MessageParser, State};
pub use encoder::MessageBuilder;
pub use error::{Error, ErrorKind};
pub use header::{Header, ValueType};
pub use value::{InputByte, Value};

/// Largest tag an element may carry
pub const MAX_TAG: u32 = 65_535;

/// Inline tag value signalling that the real tag follows as a varint
pub const EXTENDED_TAG_MARKER: u32 = 31;

/// Size of a `Double` body in bytes
pub const DOUBLE_SIZE: usize = 8;
