//! Canonical variable-length integer encoding
//!
//! Values are split into 7-bit groups written most significant group first.
//! Every byte except the last has its high bit set. Unlike LEB128, each
//! group after the least significant one stores `(remaining >> 7) - 1`, so a
//! number has exactly one encoding and there are no redundant leading groups.
//!
//! ```text
//! 127                    -> 7F
//! 128                    -> 80 00
//! 6512                   -> B1 70
//! 65535                  -> 82 FE 7F
//! 72624976668147839      -> FF FF FF FF FF FF FF 7F
//! ```

use crate::channel::{ByteSink, ByteSource};
use crate::error::{Error, Result};

/// Maximum number of bytes in one varint
pub const MAX_VARINT_SIZE: usize = 8;

/// Largest value that fits in [`MAX_VARINT_SIZE`] bytes
pub const MAX_VARINT_VALUE: u64 = 72_624_976_668_147_839;

/// Encode into a scratch array, filling it from the back
///
/// Returns the array and the index of the first encoded byte.
#[inline]
fn encode_groups(value: u64) -> Result<([u8; MAX_VARINT_SIZE], usize)> {
    if value > MAX_VARINT_VALUE {
        return Err(Error::VarintOutOfRange(value));
    }

    let mut scratch = [0u8; MAX_VARINT_SIZE];
    let mut start = MAX_VARINT_SIZE;
    let mut value = value;
    let mut continuation = 0x00;

    loop {
        // MAX_VARINT_VALUE guarantees at most MAX_VARINT_SIZE groups
        start = start
            .checked_sub(1)
            .ok_or(Error::Internal("varint needs more than eight groups"))?;
        scratch[start] = (value & 0x7F) as u8 | continuation;

        if value <= 0x7F {
            return Ok((scratch, start));
        }

        value = (value >> 7) - 1;
        continuation = 0x80;
    }
}

/// Number of bytes `value` occupies once encoded
///
/// Returns `None` when the value exceeds [`MAX_VARINT_VALUE`].
pub fn encoded_len(value: u64) -> Option<usize> {
    encode_groups(value)
        .ok()
        .map(|(_, start)| MAX_VARINT_SIZE - start)
}

/// Encode `value` into the given buffer
///
/// Returns the number of bytes written, or `Error::ShortBuffer` if the buffer
/// cannot hold the encoding.
#[inline]
pub fn encode(value: u64, buf: &mut [u8]) -> Result<usize> {
    let (scratch, start) = encode_groups(value)?;
    let encoded = &scratch[start..];

    let out = buf.get_mut(..encoded.len()).ok_or(Error::ShortBuffer)?;
    out.copy_from_slice(encoded);
    Ok(encoded.len())
}

/// Decode a varint from the start of the given buffer
///
/// Returns (value, bytes_consumed) or an error.
#[inline]
pub fn decode(buf: &[u8]) -> Result<(u64, usize)> {
    let mut source = buf;
    read(&mut source, 0)
}

/// Append `value` to a sink
///
/// Returns the number of bytes written.
#[inline]
pub fn write<S: ByteSink + ?Sized>(sink: &mut S, value: u64) -> Result<usize> {
    let (scratch, start) = encode_groups(value)?;
    sink.write_bytes(&scratch[start..])?;
    Ok(MAX_VARINT_SIZE - start)
}

/// Read a varint starting at `position`
///
/// Returns (value, bytes_consumed). Fails with `Error::VarintTooLong` when no
/// terminating byte shows up within [`MAX_VARINT_SIZE`] bytes, and passes on
/// any read failure from the source.
#[inline]
pub fn read<S: ByteSource + ?Sized>(source: &mut S, position: usize) -> Result<(u64, usize)> {
    let mut result = 0u64;

    for consumed in 0..MAX_VARINT_SIZE {
        let byte = source.read_byte(position + consumed)?;

        result = (result << 7) | u64::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok((result, consumed + 1));
        }
        result += 1;
    }

    Err(Error::VarintTooLong)
}
