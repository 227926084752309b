use std::io::{self, Read};

use super::InputError;

/// A blocking source of raw terminal bytes.
pub trait ByteSource {
    /// Returns the next byte, blocking until one is available.
    ///
    /// End of stream is reported as [`InputError::EndOfInput`].
    fn next_byte(&mut self) -> Result<u8, InputError>;
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn next_byte(&mut self) -> Result<u8, InputError> {
        (**self).next_byte()
    }
}

/// Adapts any [`Read`] (stdin, a pipe, an in-memory slice) into a byte source.
pub struct ByteReader<R> {
    bytes: io::Bytes<R>,
}

impl<R: Read> ByteReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: reader.bytes(),
        }
    }
}

impl<R: Read> ByteSource for ByteReader<R> {
    fn next_byte(&mut self) -> Result<u8, InputError> {
        loop {
            match self.bytes.next() {
                Some(Ok(byte)) => return Ok(byte),
                Some(Err(err)) if err.kind() == io::ErrorKind::Interrupted => continue,
                Some(Err(err)) => return Err(InputError::Io(err)),
                None => return Err(InputError::EndOfInput),
            }
        }
    }
}
