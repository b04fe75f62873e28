//! Wire message abstraction

use bytes::{BufMut, Bytes, BytesMut};

use super::{Error, MessageKind, Result};

/// Attributes shared by every bus message.
///
/// `extended` is passed through untouched; its meaning belongs to the
/// transport that frames and addresses the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireHeader {
    id: u32,
    len: usize,
    extended: bool,
}

impl WireHeader {
    /// Create a new header
    #[must_use]
    pub const fn new(id: u32, len: usize, extended: bool) -> Self {
        Self { id, len, extended }
    }

    /// Get bus identifier
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Get encoded length in bytes
    #[must_use]
    pub const fn payload_len(&self) -> usize {
        self.len
    }

    /// Get the transport capability flag
    #[must_use]
    pub const fn extended(&self) -> bool {
        self.extended
    }
}

/// A fixed-length, bit-packed bus message.
///
/// Implementors supply the raw layout operations; buffer length checks and
/// byte-buffer conveniences are provided.
pub trait WireMessage {
    /// Shared attributes
    fn header(&self) -> &WireHeader;

    /// Kind of this message
    fn kind(&self) -> MessageKind;

    /// Pack fields into `buf`, which holds at least `encoded_len()` bytes.
    fn write_payload(&self, buf: &mut [u8]);

    /// Overwrite every field from `buf`, which holds at least `encoded_len()` bytes.
    fn read_payload(&mut self, buf: &[u8]);

    /// Reject field values wider than their layout allows
    fn check_ranges(&self) -> Result<()> {
        Ok(())
    }

    /// Get bus identifier
    fn id(&self) -> u32 {
        self.header().id()
    }

    /// Get encoded length in bytes
    fn encoded_len(&self) -> usize {
        self.header().payload_len()
    }

    /// Get the transport capability flag
    fn is_extended(&self) -> bool {
        self.header().extended()
    }

    /// Encode into the front of `buf`, returning the number of bytes written.
    fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let needed = self.encoded_len();
        if buf.len() < needed {
            return Err(Error::BufferTooSmall {
                needed,
                got: buf.len(),
            });
        }
        self.write_payload(&mut buf[..needed]);
        Ok(needed)
    }

    /// Decode from the front of `buf`; trailing bytes are ignored.
    fn decode(&mut self, buf: &[u8]) -> Result<()> {
        let needed = self.encoded_len();
        if buf.len() < needed {
            return Err(Error::BufferTooSmall {
                needed,
                got: buf.len(),
            });
        }
        self.read_payload(&buf[..needed]);
        Ok(())
    }

    /// Append the encoded payload to `dst`.
    fn encode_into(&self, dst: &mut BytesMut) {
        let len = self.encoded_len();
        dst.reserve(len);
        let start = dst.len();
        dst.put_bytes(0, len);
        self.write_payload(&mut dst[start..]);
    }

    /// Encode to a freshly allocated buffer.
    fn to_bytes(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut dst);
        dst.freeze()
    }
}
