//! # Tagged Pointer Decoder
//!
//! Splits a pointer-sized raw value into a clean pointer and an integer tag.
//! Two shapes show up in practice:
//!
//! - **pointer-integer packing**: the tag lives in alignment bits the pointer
//!   never uses (`llvm::PointerIntPair`, `clang::DeclarationName`)
//! - **tagged unions with an external tag**: the tag selects which pointer
//!   type the clean pointer has (`llvm::PointerUnion`)
//!
//! Both come down to two [`MaskShift`] pairs over one raw value. The pairs
//! are re-derived from type metadata on every decode; the bit layout depends
//! on the template arguments and the target.
//!
//! All arithmetic is unsigned and truncated to the pointer width, so masks
//! stored as negative enumerators (`PointerBitMask = ~7`) behave.

use crate::error::{DecodeError, DecodeResult};
use crate::mask::MaskShift;
use crate::session::Session;
use crate::types::{PointerWidth, TypeDescriptor};

/// Index of the `PointerIntPairInfo` argument in `llvm::PointerIntPair<...>`
const POINTER_INFO_ARG: usize = 4;

/// Split `raw` into `(pointer, tag)`.
///
/// ```rust
/// use bitview_core::mask::MaskShift;
/// use bitview_core::tagged::split;
///
/// let (pointer, tag) = split(0x1000_0005, MaskShift::new(0xFFFF_FFFF_FFFF_FFF8, 0), MaskShift::new(0x7, 0));
/// assert_eq!(pointer, 0x1000_0000);
/// assert_eq!(tag, 5);
/// ```
pub const fn split(raw: u64, pointer: MaskShift, tag: MaskShift) -> (u64, u64)
{
    (pointer.extract(raw), tag.extract(raw))
}

/// Mask/shift layout of one tagged pointer type on one target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedPointerLayout
{
    pub pointer: MaskShift,
    pub tag: MaskShift,
    pub width: PointerWidth,
}

impl TaggedPointerLayout
{
    /// Build a layout, truncating both masks to `width`.
    pub const fn new(pointer: MaskShift, tag: MaskShift, width: PointerWidth) -> Self
    {
        Self {
            pointer: MaskShift::new(pointer.mask & width.mask(), pointer.shift),
            tag: MaskShift::new(tag.mask & width.mask(), tag.shift),
            width,
        }
    }

    /// Split a raw value into `(pointer, tag)`.
    pub const fn split(&self, raw: u64) -> (u64, u64)
    {
        split(raw & self.width.mask(), self.pointer, self.tag)
    }

    /// Inverse of [`split`](Self::split) for values whose bits are all covered
    /// by one of the two masks.
    pub const fn join(&self, pointer: u64, tag: u64) -> u64
    {
        self.tag.insert(self.pointer.insert(0, pointer), tag)
    }
}

/// Layout of an `llvm::PointerIntPair` specialization.
///
/// The constants come from `MaskAndShiftConstants`, nested in the pair's fifth
/// template argument (`llvm::PointerIntPairInfo<...>`).
pub fn pointer_int_pair_layout(session: &Session, pair: &TypeDescriptor, width: PointerWidth) -> DecodeResult<TaggedPointerLayout>
{
    let info = pair.template_arg(POINTER_INFO_ARG).ok_or_else(|| {
        DecodeError::UnsupportedLayout(format!(
            "{} has no template argument {POINTER_INFO_ARG}",
            pair.name
        ))
    })?;
    let constants = session.nested_type(info.type_name(), "MaskAndShiftConstants")?;

    let pointer_mask = session.enumerator_value(&constants, "PointerBitMask")?;
    let int_mask = session.enumerator_value(&constants, "ShiftedIntMask")?;
    let int_shift = session.enumerator_value(&constants, "IntShift")?;
    let int_shift = u32::try_from(int_shift)
        .map_err(|_| DecodeError::InvariantViolation(format!("IntShift of {} is {int_shift}", pair.name)))?;

    let layout = TaggedPointerLayout::new(
        MaskShift::new(pointer_mask, 0),
        MaskShift::new(int_mask, int_shift),
        width,
    );
    tracing::trace!(pair = %pair.name, ?layout, "derived PointerIntPair layout");
    Ok(layout)
}

/// Layout of `clang::DeclarationName::Ptr`.
///
/// The name kind sits in the bits selected by the `PtrMask` enumerator of
/// the nested `StoredNameKind` enum; the pointer is everything else.
pub fn declaration_name_layout(session: &Session, name: &TypeDescriptor, width: PointerWidth) -> DecodeResult<TaggedPointerLayout>
{
    let kinds = session.nested_type(&name.name, "StoredNameKind")?;
    let kind_mask = session.enumerator_value(&kinds, "PtrMask")?;
    Ok(TaggedPointerLayout::new(
        MaskShift::new(!kind_mask, 0),
        MaskShift::new(kind_mask, 0),
        width,
    ))
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_split_join_round_trip_both_widths()
    {
        let cases = [
            (PointerWidth::Bits64, 0x0000_7FFF_1234_567Fu64, !0x6u64, 0x6u64, 1u32),
            (PointerWidth::Bits64, 0x1000_0005u64, !0x7u64, 0x7u64, 0u32),
            (PointerWidth::Bits32, 0x0804_A00Du64, !0x3u64, 0x3u64, 0u32),
        ];
        for (width, raw, pointer_mask, tag_mask, tag_shift) in cases {
            let layout = TaggedPointerLayout::new(
                MaskShift::new(pointer_mask, 0),
                MaskShift::new(tag_mask, tag_shift),
                width,
            );
            let (pointer, tag) = layout.split(raw);
            assert_eq!(layout.join(pointer, tag), raw);
        }
    }

    #[test]
    fn test_masks_truncate_to_pointer_width()
    {
        let layout = TaggedPointerLayout::new(
            MaskShift::new(!0x7, 0),
            MaskShift::new(0x7, 0),
            PointerWidth::Bits32,
        );
        assert_eq!(layout.pointer.mask, 0xFFFF_FFF8);

        let (pointer, tag) = layout.split(0xFFFF_FFFF_1000_0006);
        assert_eq!(pointer, 0x1000_0000);
        assert_eq!(tag, 6);
    }

    #[test]
    fn test_tag_in_low_bits_without_shift()
    {
        let (pointer, tag) = split(
            0x1000_0005,
            MaskShift::new(0xFFFF_FFFF_FFFF_FFF8, 0),
            MaskShift::new(0x7, 0),
        );
        assert_eq!((pointer, tag), (0x1000_0000, 5));
    }
}
