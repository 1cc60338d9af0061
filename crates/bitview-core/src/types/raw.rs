//! Byte order, pointer width, and raw byte buffers.

use std::fmt;

use smallvec::SmallVec;

use crate::error::{DecodeError, DecodeResult};

/// Byte order of the inspected process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder
{
    #[default]
    Little,
    Big,
}

impl fmt::Display for ByteOrder
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            ByteOrder::Little => write!(f, "little-endian"),
            ByteOrder::Big => write!(f, "big-endian"),
        }
    }
}

/// Width of a pointer in the inspected process
///
/// Only 32-bit and 64-bit targets are supported; anything else is rejected
/// with [`DecodeError::UnsupportedWidth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerWidth
{
    /// 4-byte pointers
    Bits32,
    /// 8-byte pointers
    #[default]
    Bits64,
}

impl PointerWidth
{
    /// Validate a byte width reported by the type system.
    ///
    /// ```rust
    /// use bitview_core::types::PointerWidth;
    ///
    /// assert_eq!(PointerWidth::from_bytes(8).unwrap(), PointerWidth::Bits64);
    /// assert!(PointerWidth::from_bytes(2).is_err());
    /// ```
    pub fn from_bytes(bytes: u64) -> DecodeResult<Self>
    {
        match bytes {
            4 => Ok(PointerWidth::Bits32),
            8 => Ok(PointerWidth::Bits64),
            other => Err(DecodeError::UnsupportedWidth(other)),
        }
    }

    /// Size of a pointer in bytes
    pub const fn bytes(self) -> usize
    {
        match self {
            PointerWidth::Bits32 => 4,
            PointerWidth::Bits64 => 8,
        }
    }

    /// Size of a pointer in bits
    pub const fn bits(self) -> u32
    {
        match self {
            PointerWidth::Bits32 => 32,
            PointerWidth::Bits64 => 64,
        }
    }

    /// All bits a pointer of this width can hold
    pub const fn mask(self) -> u64
    {
        match self {
            PointerWidth::Bits32 => 0xFFFF_FFFF,
            PointerWidth::Bits64 => u64::MAX,
        }
    }
}

/// Immutable bytes with a declared byte order
///
/// Produced by a memory read or synthesized by the engine. Values up to
/// eight bytes (every scalar the decoder produces) stay inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBytes
{
    bytes: SmallVec<[u8; 8]>,
    order: ByteOrder,
}

impl RawBytes
{
    /// Wrap bytes read from memory.
    pub fn new(bytes: &[u8], order: ByteOrder) -> Self
    {
        Self {
            bytes: SmallVec::from_slice(bytes),
            order,
        }
    }

    /// Pack an unsigned integer into `width` bytes (1 to 8), truncating high bits.
    pub fn from_unsigned(value: u64, width: usize, order: ByteOrder) -> DecodeResult<Self>
    {
        if width == 0 || width > 8 {
            return Err(DecodeError::UnsupportedLayout(format!(
                "cannot pack an integer into {width} bytes"
            )));
        }
        let bytes: SmallVec<[u8; 8]> = match order {
            ByteOrder::Little => value.to_le_bytes()[..width].iter().copied().collect(),
            ByteOrder::Big => value.to_be_bytes()[8 - width..].iter().copied().collect(),
        };
        Ok(Self { bytes, order })
    }

    /// Decode the bytes as an unsigned integer.
    pub fn to_unsigned(&self) -> DecodeResult<u64>
    {
        decode_unsigned(&self.bytes, self.order)
    }

    pub fn as_slice(&self) -> &[u8]
    {
        &self.bytes
    }

    pub fn len(&self) -> usize
    {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.bytes.is_empty()
    }

    pub fn byte_order(&self) -> ByteOrder
    {
        self.order
    }
}

/// Decode 1 to 8 bytes as an unsigned integer, without sign extension.
///
/// ```rust
/// use bitview_core::types::{decode_unsigned, ByteOrder};
///
/// assert_eq!(decode_unsigned(&[0x05, 0x00, 0x00, 0x10], ByteOrder::Little).unwrap(), 0x1000_0005);
/// assert_eq!(decode_unsigned(&[0x10, 0x00, 0x00, 0x05], ByteOrder::Big).unwrap(), 0x1000_0005);
/// ```
pub fn decode_unsigned(bytes: &[u8], order: ByteOrder) -> DecodeResult<u64>
{
    if bytes.is_empty() || bytes.len() > 8 {
        return Err(DecodeError::UnsupportedLayout(format!(
            "cannot decode {} bytes as an integer",
            bytes.len()
        )));
    }
    let mut buffer = [0u8; 8];
    let value = match order {
        ByteOrder::Little => {
            buffer[..bytes.len()].copy_from_slice(bytes);
            u64::from_le_bytes(buffer)
        }
        ByteOrder::Big => {
            buffer[8 - bytes.len()..].copy_from_slice(bytes);
            u64::from_be_bytes(buffer)
        }
    };
    Ok(value)
}
