//! # Types
//!
//! Value-level vocabulary shared by every layer of the decoder: addresses,
//! byte order and pointer width, raw byte buffers, and type descriptors.

pub mod address;
pub mod descriptor;
pub mod raw;

// Re-export all public types
pub use address::Address;
pub use descriptor::{
    unqualified_name, BasicType, BitRange, Enumerator, Member, ScalarKind, TemplateArg, TypeDescriptor, TypeKind,
};
pub use raw::{decode_unsigned, ByteOrder, PointerWidth, RawBytes};
