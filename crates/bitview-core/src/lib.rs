//! # bitview-core
//!
//! Decoding engine for the bit-packed data structures of LLVM and Clang,
//! for debugger pretty-printers.
//!
//! Compilers squeeze flags into the spare low bits of aligned pointers, pick
//! the active member of a union from a tag stored elsewhere, and keep the
//! dynamic class of an AST node in a bit-field of its base. A debugger that
//! only follows declared types shows raw integers and unions of every
//! possible interpretation. This crate decodes those layouts and presents
//! each value as an ordered list of named children:
//!
//! - [`mask`] and [`tagged`]: extracting fields from raw words and splitting
//!   tagged pointers
//! - [`dispatch`] and [`layouts`]: mapping discriminants to concrete classes
//! - [`view`]: the per-value child lists (one provider per aggregate kind)
//! - [`recognize`]: retyping base-class values as their dynamic class
//!
//! ## Hosts
//!
//! The engine reads memory and type metadata only through the traits in
//! [`host`]. [`memory::SnapshotMemory`] and [`registry::TypeRegistry`] are
//! in-memory implementations; [`dwarf::DwarfTypeSystem`] reads types from a
//! binary's debug info.
//!
//! ## Errors
//!
//! Every fallible operation returns [`DecodeResult`]. Views never return
//! errors: a failed decode falls back to the raw fields and an unreadable
//! field becomes a placeholder. See [`error::ErrorCategory`].

pub mod config;
pub mod dispatch;
pub mod dwarf;
pub mod error;
pub mod host;
pub mod layouts;
pub mod mask;
pub mod memory;
pub mod prelude;
pub mod reader;
pub mod recognize;
pub mod registry;
pub mod session;
pub mod tagged;
pub mod types;
pub mod value;
pub mod view;

// Re-export commonly used types
pub use error::{DecodeError, DecodeResult};
pub use session::Session;
pub use view::SyntheticView;
