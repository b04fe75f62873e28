//! Data-driven bit layouts
//!
//! Every message is described by a static table of [`BitField`]s. Offsets are
//! absolute and LSB-first: bit `n` of the payload lives in byte `n / 8` at bit
//! position `n % 8` (0 = least significant).
//!
//! ```text
//! byte:    0               1
//! bit:     0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
//! offset:  0 1 2 3 4 5 6 7 8 9 ...
//! ```
//!
//! A field spanning a byte boundary keeps its low-order value bits in the lower
//! byte, so a 10-bit field at offset 6 puts value bits 0-1 in byte 0 bits 6-7
//! and value bits 2-9 in byte 1.

use super::{Error, Result};

/// One packed field of a fixed-length payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Field name used in diagnostics
    pub name: &'static str,
    /// Absolute LSB-first bit offset
    pub offset: u16,
    /// Number of bits recovered on decode
    pub width: u8,
    /// Number of bits written on encode
    pub wire_width: u8,
}

impl BitField {
    /// Create a field whose encoded and decoded widths agree.
    #[must_use]
    pub const fn new(name: &'static str, offset: u16, width: u8) -> Self {
        Self {
            name,
            offset,
            width,
            wire_width: width,
        }
    }

    /// Single-bit flag.
    #[must_use]
    pub const fn flag(name: &'static str, offset: u16) -> Self {
        Self::new(name, offset, 1)
    }

    /// Override how many value bits the encoder writes.
    ///
    /// A wire width larger than `width` makes the high-order bits spill into
    /// whatever follows the field.
    #[must_use]
    pub const fn with_wire_width(mut self, wire_width: u8) -> Self {
        self.wire_width = wire_width;
        self
    }

    /// Largest value the decoder can recover.
    #[must_use]
    pub const fn max_value(&self) -> u32 {
        mask(self.width)
    }

    /// Last bit (exclusive) touched by the encoder.
    #[must_use]
    pub const fn wire_end(&self) -> u16 {
        self.offset + self.wire_width as u16
    }

    /// OR `value` into `buf`, masked to the wire width.
    pub fn insert(&self, buf: &mut [u8], value: u32) {
        let value = value & mask(self.wire_width);
        for bit in 0..u16::from(self.wire_width) {
            if (value >> bit) & 1 == 1 {
                let pos = self.offset + bit;
                buf[usize::from(pos / 8)] |= 1 << (pos % 8);
            }
        }
    }

    /// Read the field back out of `buf`.
    #[must_use]
    pub fn extract(&self, buf: &[u8]) -> u32 {
        let mut value = 0u32;
        for bit in 0..u16::from(self.width) {
            let pos = self.offset + bit;
            if (buf[usize::from(pos / 8)] >> (pos % 8)) & 1 == 1 {
                value |= 1 << bit;
            }
        }
        value
    }

    fn wire_overlaps(&self, other: &Self) -> bool {
        self.offset < other.wire_end() && other.offset < self.wire_end()
    }
}

const fn mask(width: u8) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1u32 << width) - 1
    }
}

/// Complete bit layout of one message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Message name used in diagnostics
    pub name: &'static str,
    /// Encoded length in bytes
    pub len: usize,
    /// Fields in wire order
    pub fields: &'static [BitField],
}

impl Layout {
    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&BitField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Zero the first `len` bytes of `buf` and pack `values` into them.
    ///
    /// `values` is indexed like `fields`.
    pub fn pack(&self, values: &[u32], buf: &mut [u8]) {
        debug_assert_eq!(values.len(), self.fields.len(), "{} value count", self.name);
        buf[..self.len].fill(0);
        for (field, &value) in self.fields.iter().zip(values) {
            field.insert(buf, value);
        }
    }

    /// Unpack every field of `buf` into `values`.
    pub fn unpack(&self, buf: &[u8], values: &mut [u32]) {
        debug_assert_eq!(values.len(), self.fields.len(), "{} value count", self.name);
        for (field, slot) in self.fields.iter().zip(values.iter_mut()) {
            *slot = field.extract(buf);
        }
    }

    /// Reject the first value that does not fit its decodable width.
    pub fn check(&self, values: &[u32]) -> Result<()> {
        for (field, &value) in self.fields.iter().zip(values) {
            if value > field.max_value() {
                return Err(Error::FieldOverflow {
                    message: self.name,
                    field: field.name,
                    value,
                    max: field.max_value(),
                });
            }
        }
        Ok(())
    }

    /// Pairs of fields whose encoded bit ranges intersect.
    #[must_use]
    pub fn overlaps(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs = Vec::new();
        for (i, a) in self.fields.iter().enumerate() {
            for b in &self.fields[i + 1..] {
                if a.wire_overlaps(b) {
                    pairs.push((a.name, b.name));
                }
            }
        }
        pairs
    }

    /// Per-byte mask of bits no field ever writes.
    #[must_use]
    pub fn reserved_mask(&self) -> Vec<u8> {
        let mut used = vec![0u8; self.len];
        for field in self.fields {
            field.insert(&mut used, u32::MAX);
        }
        used.iter().map(|b| !b).collect()
    }
}
