//! Common module for library exports

pub use crate::config::SessionConfig;
pub use crate::dwarf::DwarfTypeSystem;
pub use crate::error::{DecodeError, DecodeResult, ErrorCategory};
pub use crate::host::{MemoryReader, TypeSystem};
pub use crate::memory::SnapshotMemory;
pub use crate::registry::TypeRegistry;
pub use crate::session::Session;
pub use crate::types::{
    Address, BasicType, BitRange, ByteOrder, Enumerator, Member, PointerWidth, RawBytes, ScalarKind, TemplateArg,
    TypeDescriptor, TypeKind,
};
pub use crate::value::{Value, ValueLocation};
pub use crate::view::{AggregateKind, ChildValue, SyntheticView, ViewState, ViewStatus};
