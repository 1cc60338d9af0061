//! # Raw Value Reader
//!
//! Reads pointer-sized integers out of the inspected process. This is the only
//! place in the engine that turns a [`MemoryReader`] result into a number; every
//! tagged-pointer decode starts here.
//!
//! ## Widths
//!
//! Pointer-sized reads accept exactly 4 or 8 bytes. Anything else fails with
//! [`DecodeError::UnsupportedWidth`] before memory is touched, so a decode on
//! an exotic target fails fast instead of returning a misaligned value.

use crate::error::{DecodeError, DecodeResult};
use crate::host::MemoryReader;
use crate::types::{decode_unsigned, Address, ByteOrder, PointerWidth, RawBytes};

/// Read a pointer-sized unsigned integer at `address`.
///
/// Performs exactly one memory read. A failed or short read is reported as
/// [`DecodeError::ReadFailed`].
///
/// ## Example
///
/// ```rust
/// use bitview_core::memory::SnapshotMemory;
/// use bitview_core::reader::read_unsigned;
/// use bitview_core::types::{Address, ByteOrder};
///
/// let mut memory = SnapshotMemory::new();
/// memory.add_region(0x1000, vec![0x05, 0x00, 0x00, 0x10]);
///
/// let raw = read_unsigned(&memory, Address::new(0x1000), 4, ByteOrder::Little).unwrap();
/// assert_eq!(raw, 0x1000_0005);
/// assert!(read_unsigned(&memory, Address::new(0x1000), 2, ByteOrder::Little).is_err());
/// ```
pub fn read_unsigned(memory: &dyn MemoryReader, address: Address, byte_width: u64, order: ByteOrder) -> DecodeResult<u64>
{
    let width = PointerWidth::from_bytes(byte_width)?;
    let bytes = read_exact(memory, address, width.bytes())?;
    decode_unsigned(&bytes, order)
}

/// Read `len` bytes at `address` and tag them with the target byte order.
pub fn read_bytes(memory: &dyn MemoryReader, address: Address, len: usize, order: ByteOrder) -> DecodeResult<RawBytes>
{
    let bytes = read_exact(memory, address, len)?;
    Ok(RawBytes::new(&bytes, order))
}

fn read_exact(memory: &dyn MemoryReader, address: Address, len: usize) -> DecodeResult<Vec<u8>>
{
    let bytes = memory.read_memory(address, len)?;
    if bytes.len() != len {
        return Err(DecodeError::ReadFailed {
            address,
            len,
            reason: format!("short read: got {} bytes", bytes.len()),
        });
    }
    tracing::trace!(%address, len, "read memory");
    Ok(bytes)
}
