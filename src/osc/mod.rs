/// OSC decoder and encoder, Eos dialect
///
/// Supported types
/// s :: string - string value (padded to 32 bit block with nulls)
/// i :: integer - 32-bit BE
/// h :: big int - 64-bit BE
/// f :: float - 32-bit BE
/// d :: double - 64-bit BE
/// T :: true - no value (0 bits)
/// F :: false - no value (0 bits)
/// N :: null - no value (0 bits)
///
/// Anything else fails the decode; callers log and drop the message.
/// The console sends flat messages only, so bundles are not handled.
use std::fmt;

/// [`Type`] definitions
mod types;
/// [`Message`] definitions
mod message;

use super::enums;

pub use types::Type;
pub use message::Message;

/// hexdump row width
const DUMP_WIDTH: usize = 8;

// MARK: Buffer
/// Raw OSC bytes. OSC is built from 4-byte blocks; the reader methods
/// consume whole blocks from the front and leave the remainder.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Buffer {
    /// Internal vector data
    data: Vec<u8>,
}

// MARK: Buffer->String
/// Offset, hex pairs, and a printable-ascii gutter, eight bytes per
/// row. Debug aid only; nothing on the wire depends on it.
impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (row, bytes) in self.data.chunks(DUMP_WIDTH).enumerate() {
            let mut hex = String::with_capacity(DUMP_WIDTH * 3);
            let mut text = String::with_capacity(DUMP_WIDTH);

            for byte in bytes {
                hex.push_str(&format!("{byte:02x} "));
                text.push(if byte.is_ascii_graphic() || *byte == b' ' {
                    *byte as char
                } else {
                    '.'
                });
            }

            writeln!(f, "{:04}  {:24} {}", row * DUMP_WIDTH, hex, text)?;
        }
        Ok(())
    }
}

// MARK: Vec<u8>->Buffer
impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self { Self { data } }
}

impl From<&[u8]> for Buffer {
    fn from(data: &[u8]) -> Self { Self { data: data.to_vec() } }
}

// MARK: Iter<Type>->Buffer
impl FromIterator<types::Type> for Buffer {
    fn from_iter<T: IntoIterator<Item = types::Type>>(iter: T) -> Self {
        let mut buffer: Vec<u8> = vec![];

        for i in iter {
            buffer.extend(<types::Type as Into<Vec<u8>>>::into(i));
        }

        Self::from(buffer)
    }
}

// MARK: Buffer impl
impl Buffer {
    /// get length
    #[must_use]
    pub fn len(&self) -> usize { self.data.len() }

    /// check if buffer has a valid length
    #[must_use]
    pub fn is_valid(&self) -> bool { self.data.len() % 4 == 0 }

    /// check if buffer is empty
    #[must_use]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// extend buffer with another buffer
    pub fn extend(&mut self, item: &Self) {
        self.data.extend(item.as_slice());
    }

    /// get buffer as a `&[u8]` slice
    #[must_use]
    pub fn as_slice(&self) -> &[u8] { self.data.as_slice() }

    /// get buffer as a vector
    #[must_use]
    pub fn as_vec(&self) -> Vec<u8> { self.data.clone() }

    /// Split the front `length` bytes off, leaving the rest
    fn take_front(&mut self, length: usize) -> Vec<u8> {
        let rest = self.data.split_off(length);
        std::mem::replace(&mut self.data, rest)
    }

    /// Consume the next padded string: every 4-byte block up to and
    /// including the first one that ends in a null (padding nulls
    /// stay attached; the type layer strips them).
    ///
    /// # Errors
    /// - empty buffer
    /// - buffer is not a 4-byte multiple
    /// - no null-terminated block before the data runs out
    pub fn next_string(&mut self) -> Result<Vec<u8>, enums::Error> {
        if self.is_empty() {
            return Err(enums::Error::Packet(enums::PacketError::Underrun));
        }
        if !self.is_valid() {
            return Err(enums::Error::Packet(enums::PacketError::NotFourByte));
        }

        let terminator = self.data
            .chunks_exact(4)
            .position(|block| block[3] == 0)
            .ok_or(enums::Error::Packet(enums::PacketError::UnterminatedString))?;

        Ok(self.take_front((terminator + 1) * 4))
    }

    /// Consume a fixed run of bytes (4-byte multiples only)
    ///
    /// # Errors
    /// - empty buffer
    /// - buffer or request is not a 4-byte multiple
    /// - buffer not large enough
    pub fn next_bytes(&mut self, length: usize) -> Result<Vec<u8>, enums::Error> {
        if length == 0 {
            return Ok(vec![]);
        }
        if self.is_empty() {
            return Err(enums::Error::Packet(enums::PacketError::Underrun));
        }
        if !self.is_valid() || length % 4 != 0 {
            return Err(enums::Error::Packet(enums::PacketError::NotFourByte));
        }
        if self.len() < length {
            return Err(enums::Error::Packet(enums::PacketError::Underrun));
        }

        Ok(self.take_front(length))
    }
}

#[cfg(test)]
mod buffer_test {
    use super::Buffer;

    #[test]
    fn string_reads_stop_at_the_terminated_block() {
        let mut buffer = Buffer::from(b"abc\0def\0\0\0\0\0".to_vec());

        assert_eq!(buffer.next_string().expect("first string"), b"abc\0");
        assert_eq!(buffer.next_string().expect("second string"), b"def\0");
        assert_eq!(buffer.next_string().expect("padding block"), b"\0\0\0\0");
        assert!(buffer.next_string().is_err(), "buffer exhausted");
    }
}
