//! # Masked Field Decoder
//!
//! Bit-packed fields are described by a `(mask, shift)` pair:
//!
//! ```text
//! field = (raw & mask) >> shift
//! ```
//!
//! Several pairs can apply to the same raw value. A tagged pointer has a
//! pointer pair and a tag pair whose masks are complementary; a bit-field is
//! one pair over the bytes that cover it.
//!
//! The other direction, [`synthesize`], packs a plain integer back into bytes
//! so the host can display it as a typed value (a `bool`, an `int`, an enum).

use std::sync::Arc;

use crate::error::{DecodeError, DecodeResult};
use crate::types::{BitRange, ByteOrder, RawBytes, TypeDescriptor};
use crate::value::Value;

/// A bitmask and the shift that moves the masked bits down to bit 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskShift
{
    pub mask: u64,
    pub shift: u32,
}

impl MaskShift
{
    pub const fn new(mask: u64, shift: u32) -> Self
    {
        Self { mask, shift }
    }

    /// `(raw & mask) >> shift`
    pub const fn extract(self, raw: u64) -> u64
    {
        extract(raw, self.mask, self.shift)
    }

    /// Store `field` into the masked bits of `raw`, leaving the rest alone.
    pub const fn insert(self, raw: u64, field: u64) -> u64
    {
        let shifted = match field.checked_shl(self.shift) {
            Some(shifted) => shifted,
            None => 0,
        };
        (raw & !self.mask) | (shifted & self.mask)
    }

    /// The field mask as it looks after extraction
    pub const fn field_mask(self) -> u64
    {
        match self.mask.checked_shr(self.shift) {
            Some(mask) => mask,
            None => 0,
        }
    }

    /// Mask and shift for a bit-field read as an unsigned integer of
    /// `range.storage_bytes()` bytes in `order`.
    ///
    /// Bit offsets follow DWARF `DW_AT_data_bit_offset`: counted from the least
    /// significant bit on little-endian targets and from the most significant
    /// bit of the first byte on big-endian ones.
    ///
    /// ```rust
    /// use bitview_core::mask::MaskShift;
    /// use bitview_core::types::{BitRange, ByteOrder};
    ///
    /// let packing = MaskShift::for_bit_range(BitRange::new(8, 8), ByteOrder::Little).unwrap();
    /// assert_eq!(packing, MaskShift::new(0xFF00, 8));
    ///
    /// let packing = MaskShift::for_bit_range(BitRange::new(0, 4), ByteOrder::Big).unwrap();
    /// assert_eq!(packing, MaskShift::new(0xF0, 4));
    /// ```
    pub fn for_bit_range(range: BitRange, order: ByteOrder) -> DecodeResult<Self>
    {
        let storage_bits = u32::try_from(range.storage_bytes() * 8).unwrap_or(u32::MAX);
        if range.size == 0 || storage_bits > 64 {
            return Err(DecodeError::UnsupportedLayout(format!(
                "bit-field of {} bits at bit offset {} does not fit in 64 bits",
                range.size, range.offset
            )));
        }
        let shift = match order {
            ByteOrder::Little => range.offset,
            ByteOrder::Big => storage_bits - range.offset - range.size,
        };
        Ok(Self::new(low_bits(range.size) << shift, shift))
    }
}

/// `(raw & mask) >> shift`; shifts of 64 or more yield zero.
///
/// ```rust
/// use bitview_core::mask::extract;
///
/// assert_eq!(extract(0x1000_0005, 0x7, 0), 5);
/// assert_eq!(extract(0xAB00, 0xFF00, 8), 0xAB);
/// assert_eq!(extract(u64::MAX, u64::MAX, 64), 0);
/// ```
pub const fn extract(raw: u64, mask: u64, shift: u32) -> u64
{
    match (raw & mask).checked_shr(shift) {
        Some(field) => field,
        None => 0,
    }
}

/// Pack `value` into `width` bytes and present it as a value of type `target`.
///
/// The result is marked synthesized, so the host never tries to read it back
/// from process memory.
pub fn synthesize(
    name: &str,
    value: u64,
    width: usize,
    target: Arc<TypeDescriptor>,
    order: ByteOrder,
) -> DecodeResult<Value>
{
    let bytes = RawBytes::from_unsigned(value, width, order)?;
    Ok(Value::synthesized(name, target, bytes))
}

const fn low_bits(count: u32) -> u64
{
    if count >= 64 {
        u64::MAX
    } else {
        (1u64 << count) - 1
    }
}
