//! # DWARF Type System
//!
//! A [`TypeSystem`] read from a binary's debug info, so the engine can run
//! without a debugger attached.
//!
//! Every type in every unit is extracted up front into a [`TypeRegistry`];
//! lookups after that are plain map hits. Qualified names follow the
//! spelling LLDB uses:
//!
//! - Namespaces and enclosing classes are joined with `::`
//! - Anonymous aggregates become `Scope::(anonymous union)` (or `struct`, `enum`)
//! - Typedefs are aliases of their target
//!
//! ## Example
//!
//! ```rust,no_run
//! use bitview_core::dwarf::DwarfTypeSystem;
//! use bitview_core::host::TypeSystem;
//!
//! let types = DwarfTypeSystem::load("/usr/lib/llvm/bin/clang")?;
//! let qual_type = types.find_type("clang::QualType");
//! # Ok::<(), bitview_core::DecodeError>(())
//! ```

mod extractor;
mod image;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gimli::{Dwarf, EndianArcSlice, RunTimeEndian};

pub use image::DebugImage;

use self::extractor::TypeCollector;
use crate::error::{DecodeError, DecodeResult};
use crate::host::TypeSystem;
use crate::registry::TypeRegistry;
use crate::types::{ByteOrder, PointerWidth, TypeDescriptor};

pub type OwnedReader = EndianArcSlice<RunTimeEndian>;
pub type OwnedDwarf = Dwarf<OwnedReader>;

pub(crate) fn map_dwarf_error(context: &str, err: gimli::Error) -> DecodeError
{
    DecodeError::InvalidArgument(format!("{context}: {err}"))
}

/// Types extracted from DWARF debug info
#[derive(Debug)]
pub struct DwarfTypeSystem
{
    path: Option<PathBuf>,
    registry: TypeRegistry,
}

impl DwarfTypeSystem
{
    /// Load every type described by the debug info of the binary at `path`.
    ///
    /// ## Errors
    ///
    /// `Io` if the file cannot be read, `InvalidArgument` if it is not an
    /// object file with `.debug_info` or the DWARF is malformed.
    pub fn load(path: impl AsRef<Path>) -> DecodeResult<Self>
    {
        let image = DebugImage::open(path)?;
        Self::from_image(&image)
    }

    pub fn from_image(image: &DebugImage) -> DecodeResult<Self>
    {
        let mut types = Self::from_dwarf(image.dwarf()?, image.byte_order(), image.pointer_width())?;
        types.path = Some(image.path().to_path_buf());
        tracing::info!(path = %image.path().display(), types = types.registry.len(), "loaded DWARF types");
        Ok(types)
    }

    /// Extract types from already-loaded DWARF sections.
    pub fn from_dwarf(dwarf: &OwnedDwarf, byte_order: ByteOrder, pointer_width: PointerWidth) -> DecodeResult<Self>
    {
        let registry = TypeCollector::new(dwarf, byte_order, pointer_width)?.collect()?;
        Ok(Self { path: None, registry })
    }

    /// Binary the types were read from, if they came from a file
    pub fn path(&self) -> Option<&Path>
    {
        self.path.as_deref()
    }

    pub fn registry(&self) -> &TypeRegistry
    {
        &self.registry
    }
}

impl TypeSystem for DwarfTypeSystem
{
    fn find_type(&self, qualified_name: &str) -> Option<Arc<TypeDescriptor>>
    {
        self.registry.find_type(qualified_name)
    }

    fn byte_order(&self) -> ByteOrder
    {
        self.registry.byte_order()
    }

    fn pointer_width(&self) -> PointerWidth
    {
        self.registry.pointer_width()
    }
}
