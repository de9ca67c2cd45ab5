//! Blocking little-endian reads over any byte-oriented source.

use std::io::Read;

use crate::BufferError;

/// A blocking reader over any [`Read`] source (file, socket, byte slice).
///
/// All multi-byte reads are little-endian. Fixed-width reads use
/// `read_exact`; zero-terminated strings and resynchronization scans read
/// one byte at a time, which keeps the cursor exact on an undelimited
/// stream at the cost of per-byte reads. Callers that need buffering can
/// wrap the source in [`std::io::BufReader`] before handing it over.
pub struct StreamReader<R: Read> {
    inner: R,
}

impl<R: Read> StreamReader<R> {
    /// Creates a new reader over the given source.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Consumes the reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads exactly `buf.len()` bytes into `buf`.
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<(), BufferError> {
        self.inner.read_exact(buf)?;
        Ok(())
    }

    /// Reads exactly `n` bytes into a new vector.
    pub fn exact(&mut self, n: usize) -> Result<Vec<u8>, BufferError> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads a single byte.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Reads a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self) -> Result<i8, BufferError> {
        Ok(self.u8()? as i8)
    }

    /// Reads an unsigned 16-bit integer (little-endian).
    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        let mut buf = [0u8; 2];
        self.inner.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Reads a signed 16-bit integer (little-endian).
    #[inline]
    pub fn i16(&mut self) -> Result<i16, BufferError> {
        let mut buf = [0u8; 2];
        self.inner.read_exact(&mut buf)?;
        Ok(i16::from_le_bytes(buf))
    }

    /// Reads an unsigned 32-bit integer (little-endian).
    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads a signed 32-bit integer (little-endian).
    #[inline]
    pub fn i32(&mut self) -> Result<i32, BufferError> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    /// Reads a signed 64-bit integer (little-endian).
    #[inline]
    pub fn i64(&mut self) -> Result<i64, BufferError> {
        let mut buf = [0u8; 8];
        self.inner.read_exact(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    /// Reads a 32-bit float (little-endian).
    #[inline]
    pub fn f32(&mut self) -> Result<f32, BufferError> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    /// Reads a 64-bit float (little-endian).
    #[inline]
    pub fn f64(&mut self) -> Result<f64, BufferError> {
        let mut buf = [0u8; 8];
        self.inner.read_exact(&mut buf)?;
        Ok(f64::from_le_bytes(buf))
    }

    /// Reads bytes one at a time until a zero terminator, returning the
    /// string without the terminator.
    pub fn cstr(&mut self) -> Result<String, BufferError> {
        let mut bytes = Vec::new();
        loop {
            let b = self.u8()?;
            if b == 0 {
                break;
            }
            bytes.push(b);
        }
        String::from_utf8(bytes).map_err(|_| BufferError::InvalidUtf8)
    }

    /// Reads a single byte, returning `None` on a clean end-of-stream.
    ///
    /// Used by resynchronization scans, where running out of bytes between
    /// records is not an error.
    pub fn u8_or_eof(&mut self) -> Result<Option<u8>, BufferError> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
