//! # Providers
//!
//! One module per aggregate kind. Each exposes a `decode` function returning
//! the decoded parts as plain data, and a `build` function that lays those
//! parts out as view children.
//!
//! Providers only ever see the object itself: pointers and references are
//! followed by the view before a provider runs.

pub mod bits;
pub mod declaration_name;
pub mod pointer_int_pair;
pub mod pointer_union;
pub mod punned_pointer;
pub mod qual_type;
pub mod string_map_entry;
pub mod template_type_parm;

/// Name of the hidden child a debugger shows when the aggregate itself is
/// dereferenced
pub const DEREFERENCE: &str = "$$dereference$$";
