//! # Type Registry
//!
//! An in-memory [`TypeSystem`]: descriptors registered by hand (tests,
//! fixtures) or collected from debug info by
//! [`DwarfTypeSystem`](crate::dwarf::DwarfTypeSystem).
//!
//! Derived spellings are synthesized on lookup, so only the named types
//! themselves need registering:
//!
//! - `T *` and `T &` for any known `T`
//! - `T[N]` arrays
//! - `const T` / `volatile T`, which resolve to `T`

use std::collections::HashMap;
use std::sync::Arc;

use crate::host::TypeSystem;
use crate::types::{unqualified_name, ByteOrder, PointerWidth, ScalarKind, TypeDescriptor, TypeKind};

/// Map of qualified names to descriptors for one target
#[derive(Debug, Clone)]
pub struct TypeRegistry
{
    types: HashMap<String, Arc<TypeDescriptor>>,
    byte_order: ByteOrder,
    pointer_width: PointerWidth,
}

impl TypeRegistry
{
    /// Create a registry preloaded with the C basic types for the target.
    pub fn new(byte_order: ByteOrder, pointer_width: PointerWidth) -> Self
    {
        let mut registry = Self {
            types: HashMap::new(),
            byte_order,
            pointer_width,
        };
        let word = pointer_width.bytes() as u64;
        let basics = [
            ("bool", 1, TypeKind::Scalar(ScalarKind::Bool)),
            ("char", 1, TypeKind::Scalar(ScalarKind::Char)),
            ("unsigned char", 1, TypeKind::Scalar(ScalarKind::Unsigned)),
            ("short", 2, TypeKind::Scalar(ScalarKind::Signed)),
            ("unsigned short", 2, TypeKind::Scalar(ScalarKind::Unsigned)),
            ("int", 4, TypeKind::Scalar(ScalarKind::Signed)),
            ("unsigned int", 4, TypeKind::Scalar(ScalarKind::Unsigned)),
            ("long", word, TypeKind::Scalar(ScalarKind::Signed)),
            ("unsigned long", word, TypeKind::Scalar(ScalarKind::Unsigned)),
            ("long long", 8, TypeKind::Scalar(ScalarKind::Signed)),
            ("unsigned long long", 8, TypeKind::Scalar(ScalarKind::Unsigned)),
            ("uintptr_t", word, TypeKind::Scalar(ScalarKind::Unsigned)),
            ("intptr_t", word, TypeKind::Scalar(ScalarKind::Signed)),
            ("void", 0, TypeKind::Opaque),
        ];
        for (name, size, kind) in basics {
            registry.insert(TypeDescriptor::new(name, size, kind));
        }
        registry
    }

    /// Register (or replace) a descriptor.
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> Arc<TypeDescriptor>
    {
        let descriptor = Arc::new(descriptor);
        self.types.insert(descriptor.name.clone(), descriptor.clone());
        descriptor
    }

    /// Register `alias` as another name for an existing type.
    ///
    /// `target` may be a derived spelling such as `T *`. Returns `false` if
    /// it does not resolve.
    pub fn alias(&mut self, alias: &str, target: &str) -> bool
    {
        match self.find_type(target) {
            Some(descriptor) => {
                self.types.insert(alias.to_string(), descriptor);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool
    {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize
    {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.types.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str>
    {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn derive(&self, name: &str) -> Option<Arc<TypeDescriptor>>
    {
        let word = self.pointer_width.bytes() as u64;
        if let Some(pointee) = name.strip_suffix('*') {
            let pointee = pointee.trim_end();
            self.find_type(pointee)?;
            return Some(Arc::new(TypeDescriptor::pointer_to(pointee, word)));
        }
        if let Some(referent) = name.strip_suffix('&') {
            let referent = referent.trim_end().trim_end_matches('&').trim_end();
            self.find_type(referent)?;
            return Some(Arc::new(TypeDescriptor::reference_to(referent, word)));
        }
        if let Some(open) = name.strip_suffix(']').and_then(|rest| rest.rfind('[')) {
            let count = name[open + 1..name.len() - 1].trim().parse::<u64>().ok()?;
            let element = self.find_type(name[..open].trim_end())?;
            return Some(Arc::new(TypeDescriptor::array_of(&element, count)));
        }
        None
    }
}

impl TypeSystem for TypeRegistry
{
    fn find_type(&self, qualified_name: &str) -> Option<Arc<TypeDescriptor>>
    {
        let name = qualified_name.trim();
        if let Some(found) = self.types.get(name) {
            return Some(found.clone());
        }
        let unqualified = unqualified_name(name);
        if unqualified != name {
            if let Some(found) = self.types.get(unqualified) {
                return Some(found.clone());
            }
        }
        self.derive(name)
    }

    fn byte_order(&self) -> ByteOrder
    {
        self.byte_order
    }

    fn pointer_width(&self) -> PointerWidth
    {
        self.pointer_width
    }
}
