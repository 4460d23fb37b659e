//! Byte channels the codec reads from and writes to
//!
//! The builder and parser only see the [`ByteSink`] and [`ByteSource`] traits.
//! In-memory channels (`Vec<u8>` for writing, `&[u8]` for reading) have random
//! access; the [`IoSink`] and [`IoSource`] adapters wrap sequential streams,
//! which ignore the position argument and simply move forward.

use alloc::vec::Vec;

use crate::error::{Error, Result};

/// Destination for encoded bytes
pub trait ByteSink {
    /// Append one byte
    fn write_byte(&mut self, byte: u8) -> Result<()>;

    /// Append a run of bytes
    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }
}

/// Source of encoded bytes
pub trait ByteSource {
    /// Read the byte at `position`
    ///
    /// Sequential sources ignore `position` and return their next byte.
    fn read_byte(&mut self, position: usize) -> Result<u8>;

    /// Fill `out` with the bytes starting at `position`
    #[inline]
    fn read_bytes(&mut self, position: usize, out: &mut [u8]) -> Result<()> {
        for (offset, slot) in out.iter_mut().enumerate() {
            *slot = self.read_byte(position + offset)?;
        }
        Ok(())
    }

    /// Move past `count` bytes starting at `position` without interpreting them
    ///
    /// Random-access sources have nothing to do; sequential sources must read
    /// and discard.
    #[inline]
    fn skip(&mut self, position: usize, count: usize) -> Result<()> {
        let _ = (position, count);
        Ok(())
    }

    /// Total number of bytes held, if the source knows it
    #[inline]
    fn len_hint(&self) -> Option<usize> {
        None
    }
}

impl ByteSink for Vec<u8> {
    #[inline]
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.push(byte);
        Ok(())
    }

    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    #[inline]
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }

    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(bytes)
    }
}

impl ByteSource for &[u8] {
    #[inline]
    fn read_byte(&mut self, position: usize) -> Result<u8> {
        self.get(position).copied().ok_or(Error::UnexpectedEof)
    }

    #[inline]
    fn read_bytes(&mut self, position: usize, out: &mut [u8]) -> Result<()> {
        let end = position.checked_add(out.len()).ok_or(Error::UnexpectedEof)?;
        let bytes = self.get(position..end).ok_or(Error::UnexpectedEof)?;
        out.copy_from_slice(bytes);
        Ok(())
    }

    #[inline]
    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn read_byte(&mut self, position: usize) -> Result<u8> {
        (**self).read_byte(position)
    }

    #[inline]
    fn read_bytes(&mut self, position: usize, out: &mut [u8]) -> Result<()> {
        (**self).read_bytes(position, out)
    }

    #[inline]
    fn skip(&mut self, position: usize, count: usize) -> Result<()> {
        (**self).skip(position, count)
    }

    #[inline]
    fn len_hint(&self) -> Option<usize> {
        (**self).len_hint()
    }
}

/// Restricts reads to positions before `end`
///
/// Anything at or past `end` reads as end of data, the same as running off
/// the end of the underlying source.
pub(crate) struct Window<'s, S: ?Sized> {
    source: &'s mut S,
    end: usize,
}

impl<'s, S: ByteSource + ?Sized> Window<'s, S> {
    #[inline]
    pub(crate) fn new(source: &'s mut S, end: usize) -> Self {
        Self { source, end }
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Window<'_, S> {
    #[inline]
    fn read_byte(&mut self, position: usize) -> Result<u8> {
        if position >= self.end {
            return Err(Error::UnexpectedEof);
        }
        self.source.read_byte(position)
    }

    #[inline]
    fn read_bytes(&mut self, position: usize, out: &mut [u8]) -> Result<()> {
        match position.checked_add(out.len()) {
            Some(end) if end <= self.end => self.source.read_bytes(position, out),
            _ => Err(Error::UnexpectedEof),
        }
    }

    #[inline]
    fn skip(&mut self, position: usize, count: usize) -> Result<()> {
        self.source.skip(position, count)
    }

    #[inline]
    fn len_hint(&self) -> Option<usize> {
        self.source.len_hint().map(|len| len.min(self.end))
    }
}

#[cfg(feature = "std")]
pub use self::io::{IoSink, IoSource};

#[cfg(feature = "std")]
mod io {
    use std::io::{Read, Write};

    use super::{ByteSink, ByteSource};
    use crate::error::Result;

    /// Writes encoded bytes to a [`std::io::Write`] stream
    #[derive(Debug)]
    pub struct IoSink<W> {
        inner: W,
    }

    impl<W: Write> IoSink<W> {
        /// Wrap a writer
        pub fn new(inner: W) -> Self {
            Self { inner }
        }

        /// Borrow the wrapped writer
        pub fn get_ref(&self) -> &W {
            &self.inner
        }

        /// Unwrap the writer
        pub fn into_inner(self) -> W {
            self.inner
        }
    }

    impl<W: Write> ByteSink for IoSink<W> {
        #[inline]
        fn write_byte(&mut self, byte: u8) -> Result<()> {
            self.inner.write_all(&[byte])?;
            Ok(())
        }

        #[inline]
        fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
            self.inner.write_all(bytes)?;
            Ok(())
        }
    }

    /// Reads encoded bytes from a [`std::io::Read`] stream, one at a time
    #[derive(Debug)]
    pub struct IoSource<R> {
        inner: R,
    }

    impl<R: Read> IoSource<R> {
        /// Wrap a reader
        pub fn new(inner: R) -> Self {
            Self { inner }
        }

        /// Unwrap the reader
        pub fn into_inner(self) -> R {
            self.inner
        }
    }

    impl<R: Read> ByteSource for IoSource<R> {
        #[inline]
        fn read_byte(&mut self, _position: usize) -> Result<u8> {
            let mut byte = [0u8; 1];
            self.inner.read_exact(&mut byte)?;
            Ok(byte[0])
        }

        #[inline]
        fn read_bytes(&mut self, _position: usize, out: &mut [u8]) -> Result<()> {
            self.inner.read_exact(out)?;
            Ok(())
        }

        fn skip(&mut self, _position: usize, count: usize) -> Result<()> {
            for _ in 0..count {
                self.read_byte(0)?;
            }
            Ok(())
        }
    }
}
