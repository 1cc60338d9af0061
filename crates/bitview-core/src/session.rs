//! # Decoding Session
//!
//! A [`Session`] bundles the host collaborators (memory, types, tracer) with
//! the state that outlives a single inspection request:
//!
//! - the memoized type lookup cache
//! - the context generation, bumped whenever the host says the inspected
//!   process changed (new stop, new target), which empties the cache and marks
//!   every view built from this session stale
//!
//! Everything else (values, views, decoded fields) is transient and rebuilt on
//! demand.
//!
//! ## Value navigation
//!
//! Providers never poke at descriptors directly. They walk values through the
//! session: [`Session::member`] looks through base classes and anonymous
//! unions the way a debugger's expression evaluator does, and
//! [`Session::read_unsigned`] handles scalars and bit-fields alike.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use bitview_core::prelude::*;
//!
//! let mut registry = TypeRegistry::new(ByteOrder::Little, PointerWidth::Bits64);
//! registry.insert(
//!     TypeDescriptor::new("Pair", 8, TypeKind::Struct)
//!         .with_members(vec![Member::field("first", "int", 0), Member::field("second", "int", 4)]),
//! );
//!
//! let mut memory = SnapshotMemory::new();
//! memory.add_region(0x1000, vec![1, 0, 0, 0, 2, 0, 0, 0]);
//!
//! let session = Session::new(Arc::new(memory), Arc::new(registry));
//! let pair = session.value_at("pair", "Pair", Address::new(0x1000)).unwrap();
//! let second = session.member(&pair, "second").unwrap();
//! assert_eq!(session.read_unsigned(&second).unwrap(), 2);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::SessionConfig;
use crate::dispatch::Discriminant;
use crate::error::{DecodeError, DecodeResult};
use crate::host::{LogTracer, MemoryReader, NoopTracer, TraceScope, Tracer, TypeSystem};
use crate::layouts::{self, LayoutReport};
use crate::mask::{self, MaskShift};
use crate::reader;
use crate::types::{
    decode_unsigned, unqualified_name, Address, BasicType, BitRange, ByteOrder, Enumerator, Member, PointerWidth, RawBytes, TypeDescriptor,
    TypeKind,
};
use crate::value::{Value, ValueLocation};
use crate::view::SyntheticView;

/// Upper bound on array elements listed as children
const MAX_ARRAY_CHILDREN: u64 = 256;

/// Upper bound on bytes read when checking that a value is readable
const PROBE_LIMIT: u64 = 4096;

/// Decoding context shared by every view built against one inspected process
pub struct Session
{
    memory: Arc<dyn MemoryReader>,
    types: Arc<dyn TypeSystem>,
    tracer: Arc<dyn Tracer>,
    config: SessionConfig,
    cache: Mutex<HashMap<String, Option<Arc<TypeDescriptor>>>>,
    generation: AtomicU64,
}

impl Session
{
    /// Create a session with the default configuration.
    pub fn new(memory: Arc<dyn MemoryReader>, types: Arc<dyn TypeSystem>) -> Self
    {
        Self::with_config(memory, types, SessionConfig::default())
    }

    /// Create a session, running layout validation first if configured.
    pub fn with_config(memory: Arc<dyn MemoryReader>, types: Arc<dyn TypeSystem>, config: SessionConfig) -> Self
    {
        let tracer: Arc<dyn Tracer> = if config.trace_calls {
            Arc::new(LogTracer::new())
        } else {
            Arc::new(NoopTracer)
        };
        let session = Self {
            memory,
            types,
            tracer,
            config,
            cache: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        };
        if config.validate_on_start {
            session.validate_layouts();
        }
        session
    }

    /// Replace the call tracer.
    #[must_use]
    pub fn with_tracer(mut self, tracer: Arc<dyn Tracer>) -> Self
    {
        self.tracer = tracer;
        self
    }

    pub fn config(&self) -> SessionConfig
    {
        self.config
    }

    pub fn memory(&self) -> &dyn MemoryReader
    {
        self.memory.as_ref()
    }

    pub fn types(&self) -> &dyn TypeSystem
    {
        self.types.as_ref()
    }

    pub fn byte_order(&self) -> ByteOrder
    {
        self.types.byte_order()
    }

    pub fn pointer_width(&self) -> PointerWidth
    {
        self.types.pointer_width()
    }

    /// Context generation; changes on every [`set_context`](Self::set_context)
    pub fn generation(&self) -> u64
    {
        self.generation.load(Ordering::Acquire)
    }

    pub(crate) fn trace(&self, operation: &'static str) -> TraceScope<'_>
    {
        TraceScope::new(self.tracer.as_ref(), operation)
    }

    /// The inspected process changed: drop memoized lookups and mark every
    /// view of this session stale.
    pub fn set_context(&self)
    {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).clear();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(generation, "session context changed");
    }

    /// Check every built-in layout table against the type system and log
    /// what does not line up.
    pub fn validate_layouts(&self) -> Vec<LayoutReport>
    {
        let _scope = self.trace("validate_layouts");
        let reports: Vec<LayoutReport> = layouts::BUILTIN_LAYOUTS
            .iter()
            .map(|layout| layouts::validate(self, layout))
            .collect();
        for report in &reports {
            report.log();
        }
        reports
    }

    // ========================================================================
    // Type lookups
    // ========================================================================

    /// Look up a type by qualified name, memoized for the current context.
    ///
    /// Leading cv-qualifiers are ignored if the exact spelling is unknown.
    pub fn find_type(&self, name: &str) -> Option<Arc<TypeDescriptor>>
    {
        let key = name.trim();
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.get(key) {
            return cached.clone();
        }

        let found = self.types.find_type(key).or_else(|| {
            let unqualified = unqualified_name(key);
            if unqualified == key {
                None
            } else {
                self.types.find_type(unqualified)
            }
        });
        if found.is_none() {
            tracing::trace!(name = key, "type not found");
        }
        cache.insert(key.to_string(), found.clone());
        found
    }

    /// Like [`find_type`](Self::find_type), but a missing type is an error.
    pub fn require_type(&self, name: &str) -> DecodeResult<Arc<TypeDescriptor>>
    {
        self.find_type(name)
            .ok_or_else(|| DecodeError::TypeNotFound(name.trim().to_string()))
    }

    /// Look up `Parent::Nested`.
    pub fn nested_type(&self, parent: &str, nested: &str) -> DecodeResult<Arc<TypeDescriptor>>
    {
        self.require_type(&format!("{}::{nested}", unqualified_name(parent)))
    }

    /// Pointer type to `pointee`, built from the target's pointer width if
    /// the type system does not already know it.
    pub fn pointer_to(&self, pointee: &TypeDescriptor) -> Arc<TypeDescriptor>
    {
        let name = format!("{} *", pointee.name);
        self.find_type(&name).unwrap_or_else(|| {
            Arc::new(TypeDescriptor::pointer_to(
                &pointee.name,
                self.pointer_width().bytes() as u64,
            ))
        })
    }

    pub fn reference_to(&self, referent: &TypeDescriptor) -> Arc<TypeDescriptor>
    {
        let name = format!("{} &", referent.name);
        self.find_type(&name).unwrap_or_else(|| {
            Arc::new(TypeDescriptor::reference_to(
                &referent.name,
                self.pointer_width().bytes() as u64,
            ))
        })
    }

    pub fn basic_type(&self, basic: BasicType) -> Arc<TypeDescriptor>
    {
        self.types.basic_type(basic)
    }

    /// Unsigned value of the enumerator `name` of `enum_type`.
    pub fn enumerator_value(&self, enum_type: &TypeDescriptor, name: &str) -> DecodeResult<u64>
    {
        enum_type
            .enumerator_by_name(name)
            .map(Enumerator::unsigned)
            .ok_or_else(|| DecodeError::missing_member(&enum_type.name, name))
    }

    /// Type of template argument `index` of `ty`.
    pub fn template_type(&self, ty: &TypeDescriptor, index: usize) -> DecodeResult<Arc<TypeDescriptor>>
    {
        let arg = ty.template_arg(index).ok_or_else(|| {
            DecodeError::UnsupportedLayout(format!("{} has no template argument {index}", ty.name))
        })?;
        self.require_type(arg.type_name())
    }

    /// Type of member `name` of `ty`, searched through base classes and
    /// anonymous members like [`member`](Self::member).
    pub fn member_type(&self, ty: &TypeDescriptor, name: &str) -> DecodeResult<Arc<TypeDescriptor>>
    {
        self.find_member_type(ty, name)?
            .ok_or_else(|| DecodeError::missing_member(&ty.name, name))
    }

    fn find_member_type(&self, ty: &TypeDescriptor, name: &str) -> DecodeResult<Option<Arc<TypeDescriptor>>>
    {
        if let Some(member) = ty.member(name) {
            return self.require_type(&member.type_name).map(Some);
        }
        for member in ty.members.iter().filter(|member| member.is_base || member.name.is_none()) {
            let nested = self.require_type(&member.type_name)?;
            if let Some(found) = self.find_member_type(&nested, name)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Value of type `type_name` living at `address`.
    pub fn value_at(&self, name: &str, type_name: &str, address: Address) -> DecodeResult<Value>
    {
        Ok(Value::at_address(name, self.require_type(type_name)?, address))
    }

    /// Build a view over `value`.
    pub fn view(&self, value: Value) -> SyntheticView<'_>
    {
        SyntheticView::new(self, value)
    }

    /// Address of a value that lives in process memory.
    pub fn address_of(&self, value: &Value) -> DecodeResult<Address>
    {
        value.address().ok_or_else(|| {
            DecodeError::UnsupportedLayout(format!(
                "{} is synthesized and has no address",
                value.name
            ))
        })
    }

    /// Read a scalar, enum, pointer or bit-field value as an unsigned integer.
    pub fn read_unsigned(&self, value: &Value) -> DecodeResult<u64>
    {
        let _scope = self.trace("read_unsigned");
        let len = value.bits.map_or(value.ty.byte_size, |bits| bits.storage_bytes() as u64);
        if len == 0 || len > 8 {
            return Err(DecodeError::UnsupportedLayout(format!(
                "cannot read {} ({} bytes) as an integer",
                value.ty.name, len
            )));
        }

        let bytes = self.storage(value, len)?;
        let raw = bytes.to_unsigned()?;
        match value.bits {
            Some(bits) => Ok(MaskShift::for_bit_range(bits, bytes.byte_order())?.extract(raw)),
            None => Ok(raw),
        }
    }

    /// Read a value as a raw `byte_width`-sized integer (4 or 8 bytes),
    /// regardless of its declared type.
    pub fn read_raw(&self, value: &Value, byte_width: u64) -> DecodeResult<u64>
    {
        match &value.location {
            ValueLocation::Address(address) => reader::read_unsigned(self.memory(), *address, byte_width, self.byte_order()),
            ValueLocation::Synthesized(bytes) => {
                let width = PointerWidth::from_bytes(byte_width)?.bytes();
                let slice = bytes.as_slice().get(..width).ok_or_else(|| {
                    DecodeError::UnsupportedLayout(format!(
                        "{} holds {} bytes, {width} needed",
                        value.name,
                        bytes.len()
                    ))
                })?;
                decode_unsigned(slice, bytes.byte_order())
            }
        }
    }

    /// Follow a pointer or reference.
    ///
    /// The result keeps the original name and lives at the pointed-to address.
    pub fn dereference(&self, value: &Value) -> DecodeResult<Value>
    {
        let _scope = self.trace("dereference");
        let target = value.ty.target_name().ok_or_else(|| {
            DecodeError::UnsupportedLayout(format!("{} is not a pointer or reference", value.ty.name))
        })?;
        let pointee = self.require_type(target)?;
        let raw = self.read_raw(value, value.ty.byte_size)?;
        Ok(Value::at_address(value.name.clone(), pointee, Address::new(raw)))
    }

    /// The object a value designates: pointers and references are followed,
    /// anything else is returned as is.
    pub fn resolve_target(&self, value: &Value) -> DecodeResult<Value>
    {
        if value.ty.is_pointer() || value.ty.is_reference() {
            self.dereference(value)
        } else {
            Ok(value.clone())
        }
    }

    /// Underlying children in debugger order: base classes, then data
    /// members in declaration order. Arrays list their elements.
    pub fn children(&self, value: &Value) -> DecodeResult<Vec<Value>>
    {
        let _scope = self.trace("children");
        match &value.ty.kind {
            TypeKind::Struct | TypeKind::Union => {
                let bases = value.ty.members.iter().filter(|member| member.is_base);
                let fields = value.ty.members.iter().filter(|member| !member.is_base);
                bases.chain(fields).map(|member| self.locate_member(value, member)).collect()
            }
            TypeKind::Array { element, count } => {
                let element = self.require_type(element)?;
                (0..(*count).min(MAX_ARRAY_CHILDREN))
                    .map(|index| self.slice(value, &format!("[{index}]"), element.clone(), index * element.byte_size, None))
                    .collect()
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Member `name`, searched through base classes and anonymous members.
    pub fn member(&self, value: &Value, name: &str) -> DecodeResult<Value>
    {
        let _scope = self.trace("member");
        self.find_member(value, name)?
            .ok_or_else(|| DecodeError::missing_member(&value.ty.name, name))
    }

    /// Like [`member`](Self::member), but absence is not an error.
    pub fn find_member(&self, value: &Value, name: &str) -> DecodeResult<Option<Value>>
    {
        if let Some(member) = value.ty.member(name) {
            return self.locate_member(value, member).map(Some);
        }
        for member in value.ty.members.iter().filter(|member| member.is_base || member.name.is_none()) {
            let nested = self.locate_member(value, member)?;
            if let Some(found) = self.find_member(&nested, name)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Name of the enumerator an enum value holds, if it holds a named one.
    pub fn enumerator_name(&self, value: &Value) -> DecodeResult<Option<String>>
    {
        if !value.ty.is_enum() {
            return Err(DecodeError::UnsupportedLayout(format!("{} is not an enum", value.ty.name)));
        }
        let raw = self.read_unsigned(value)?;
        Ok(value.ty.enumerator_by_value(raw).map(|enumerator| enumerator.name.clone()))
    }

    /// Read a tag field: symbolic if it is an enum with a matching
    /// enumerator, raw otherwise.
    pub fn discriminant(&self, value: &Value) -> DecodeResult<Discriminant>
    {
        let raw = self.read_unsigned(value)?;
        if value.ty.is_enum() {
            if let Some(enumerator) = value.ty.enumerator_by_value(raw) {
                return Ok(Discriminant::Symbolic(enumerator.name.clone()));
            }
        }
        Ok(Discriminant::Raw(raw))
    }

    /// Check that a value's bytes can be read.
    ///
    /// Synthesized values always can; values in memory are probed over their
    /// size (capped).
    pub fn probe(&self, value: &Value) -> DecodeResult<()>
    {
        let Some(address) = value.address() else {
            return Ok(());
        };
        let len = value
            .bits
            .map_or(value.ty.byte_size, |bits| bits.storage_bytes() as u64)
            .min(PROBE_LIMIT);
        if len == 0 {
            return Ok(());
        }
        reader::read_bytes(self.memory(), address, len as usize, self.byte_order()).map(|_| ())
    }

    /// Synthesize an unsigned integer as a value of type `ty`.
    pub fn synthesize_unsigned(&self, name: &str, raw: u64, ty: Arc<TypeDescriptor>) -> DecodeResult<Value>
    {
        let width = usize::try_from(ty.byte_size)
            .map_err(|_| DecodeError::UnsupportedLayout(format!("{} is too large to synthesize", ty.name)))?;
        mask::synthesize(name, raw, width, ty, self.byte_order())
    }

    pub fn synthesize_bool(&self, name: &str, flag: bool) -> DecodeResult<Value>
    {
        self.synthesize_unsigned(name, u64::from(flag), self.basic_type(BasicType::Bool))
    }

    pub fn synthesize_int(&self, name: &str, raw: u64) -> DecodeResult<Value>
    {
        self.synthesize_unsigned(name, raw, self.basic_type(BasicType::Int))
    }

    /// Value of type `pointee` at `address`, or `None` if `pointer_type` is
    /// not actually a pointer.
    pub(crate) fn pointee(&self, name: &str, pointer_type: &TypeDescriptor, address: u64) -> DecodeResult<Option<Value>>
    {
        match pointer_type.target_name() {
            Some(target) if pointer_type.is_pointer() => {
                let pointee = self.require_type(target)?;
                Ok(Some(Value::at_address(name, pointee, Address::new(address))))
            }
            _ => Ok(None),
        }
    }

    fn locate_member(&self, value: &Value, member: &Member) -> DecodeResult<Value>
    {
        let ty = self.require_type(&member.type_name)?;
        let name = member_display_name(member);
        self.slice(value, &name, ty, member.byte_offset, member.bits)
    }

    fn slice(
        &self,
        value: &Value,
        name: &str,
        ty: Arc<TypeDescriptor>,
        offset: u64,
        bits: Option<BitRange>,
    ) -> DecodeResult<Value>
    {
        match &value.location {
            ValueLocation::Address(address) => {
                let address = address.checked_add(offset).ok_or_else(|| {
                    DecodeError::InvariantViolation(format!("{} + {offset:#x} overflows", value.name))
                })?;
                Ok(Value::at_address(name, ty, address).with_bits(bits))
            }
            ValueLocation::Synthesized(bytes) => {
                let len = bits.map_or(ty.byte_size, |bits| bits.storage_bytes() as u64);
                let start = usize::try_from(offset).unwrap_or(usize::MAX);
                let end = usize::try_from(offset.saturating_add(len)).unwrap_or(usize::MAX);
                let slice = bytes.as_slice().get(start..end).ok_or_else(|| {
                    DecodeError::UnsupportedLayout(format!(
                        "{name} lies outside the {} synthesized bytes of {}",
                        bytes.len(),
                        value.name
                    ))
                })?;
                Ok(Value::synthesized(name, ty, RawBytes::new(slice, bytes.byte_order())).with_bits(bits))
            }
        }
    }

    fn storage(&self, value: &Value, len: u64) -> DecodeResult<RawBytes>
    {
        match &value.location {
            ValueLocation::Address(address) => reader::read_bytes(self.memory(), *address, len as usize, self.byte_order()),
            ValueLocation::Synthesized(bytes) => {
                let slice = bytes.as_slice().get(..len as usize).ok_or_else(|| {
                    DecodeError::UnsupportedLayout(format!("{} holds fewer than {len} bytes", value.name))
                })?;
                Ok(RawBytes::new(slice, bytes.byte_order()))
            }
        }
    }
}

impl std::fmt::Debug for Session
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

/// Debuggers name base-class children after the base type and anonymous
/// members after the kind of aggregate they are.
fn member_display_name(member: &Member) -> String
{
    match &member.name {
        Some(name) => name.clone(),
        None => match member.type_name.rsplit("::").next() {
            Some(last) if last.starts_with('(') => last.to_string(),
            _ => "(anonymous)".to_string(),
        },
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::memory::SnapshotMemory;
    use crate::registry::TypeRegistry;

    fn session_with(registry: TypeRegistry, memory: SnapshotMemory) -> Session
    {
        Session::new(Arc::new(memory), Arc::new(registry))
    }

    #[test]
    fn test_member_lookup_reaches_bases_and_anonymous_unions()
    {
        let mut registry = TypeRegistry::new(ByteOrder::Little, PointerWidth::Bits64);
        registry.insert(
            TypeDescriptor::new("Base::(anonymous union)", 4, TypeKind::Union)
                .with_members(vec![Member::field("Bits", "unsigned int", 0)]),
        );
        registry.insert(
            TypeDescriptor::new("Base", 4, TypeKind::Struct)
                .with_members(vec![Member::anonymous("Base::(anonymous union)", 0)]),
        );
        registry.insert(
            TypeDescriptor::new("Derived", 8, TypeKind::Struct)
                .with_members(vec![Member::base("Base", 0), Member::field("Extra", "int", 4)]),
        );
        let mut memory = SnapshotMemory::new();
        memory.add_region(0x100, vec![0x2A, 0, 0, 0, 7, 0, 0, 0]);
        let session = session_with(registry, memory);

        let derived = session.value_at("d", "Derived", Address::new(0x100)).unwrap();
        let bits = session.member(&derived, "Bits").unwrap();
        assert_eq!(bits.address(), Some(Address::new(0x100)));
        assert_eq!(session.read_unsigned(&bits).unwrap(), 0x2A);

        let children = session.children(&derived).unwrap();
        let names: Vec<&str> = children.iter().map(|child| child.name.as_str()).collect();
        assert_eq!(names, ["Base", "Extra"]);

        let base_children = session.children(&children[0]).unwrap();
        assert_eq!(base_children[0].name, "(anonymous union)");

        assert!(matches!(
            session.member(&derived, "Nope"),
            Err(DecodeError::MissingMember { .. })
        ));
    }

    #[test]
    fn test_bitfield_and_enum_reads()
    {
        let mut registry = TypeRegistry::new(ByteOrder::Little, PointerWidth::Bits64);
        registry.insert(
            TypeDescriptor::new("Color", 1, TypeKind::Enum)
                .with_enumerators(vec![Enumerator::new("Red", 0), Enumerator::new("Green", 3)]),
        );
        registry.insert(TypeDescriptor::new("Flags", 4, TypeKind::Struct).with_members(vec![
            Member::bitfield("Low", "unsigned int", 0, BitRange::new(0, 4)),
            Member::bitfield("Kind", "Color", 0, BitRange::new(4, 2)),
            Member::bitfield("Wide", "unsigned int", 0, BitRange::new(6, 10)),
        ]));
        let mut memory = SnapshotMemory::new();
        // Low = 0x5, Kind = 3, Wide = 0x3FF
        memory.add_region(0x40, vec![0xF5, 0xFF, 0, 0]);
        let session = session_with(registry, memory);

        let flags = session.value_at("f", "Flags", Address::new(0x40)).unwrap();
        assert_eq!(session.read_unsigned(&session.member(&flags, "Low").unwrap()).unwrap(), 0x5);
        assert_eq!(session.read_unsigned(&session.member(&flags, "Wide").unwrap()).unwrap(), 0x3FF);

        let kind = session.member(&flags, "Kind").unwrap();
        assert_eq!(session.enumerator_name(&kind).unwrap().as_deref(), Some("Green"));
        assert_eq!(session.discriminant(&kind).unwrap(), Discriminant::Symbolic("Green".into()));
    }

    #[test]
    fn test_type_cache_is_invalidated_by_context_change()
    {
        let registry = TypeRegistry::new(ByteOrder::Little, PointerWidth::Bits64);
        let session = session_with(registry, SnapshotMemory::new());

        assert!(session.find_type("int").is_some());
        assert!(session.find_type("const int").is_some());
        assert!(session.find_type("Missing").is_none());
        assert_eq!(session.generation(), 0);

        session.set_context();
        assert_eq!(session.generation(), 1);
        assert!(session.find_type("int").is_some());
    }

    #[test]
    fn test_dereference_and_synthesized_members()
    {
        let mut registry = TypeRegistry::new(ByteOrder::Little, PointerWidth::Bits64);
        registry.insert(
            TypeDescriptor::new("Wrapper", 8, TypeKind::Struct)
                .with_members(vec![Member::field("Lo", "int", 0), Member::field("Hi", "int", 4)]),
        );
        let mut memory = SnapshotMemory::new();
        memory.add_region(0x10, 0x20u64.to_le_bytes().to_vec());
        memory.add_region(0x20, vec![9, 0, 0, 0, 1, 0, 0, 0]);
        let session = session_with(registry, memory);

        let pointer = session.value_at("p", "Wrapper *", Address::new(0x10)).unwrap();
        let wrapper = session.dereference(&pointer).unwrap();
        assert_eq!(wrapper.address(), Some(Address::new(0x20)));

        let ty = session.require_type("Wrapper").unwrap();
        let synthesized = session.synthesize_unsigned("w", 0x0000_0001_0000_0009, ty).unwrap();
        let hi = session.member(&synthesized, "Hi").unwrap();
        assert!(hi.is_synthesized());
        assert_eq!(session.read_unsigned(&hi).unwrap(), 1);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_session_is_shareable_across_threads()
    {
        assert_send_sync::<Session>();

        let mut registry = TypeRegistry::new(ByteOrder::Little, PointerWidth::Bits64);
        registry.insert(TypeDescriptor::new("Node", 16, TypeKind::Struct));
        let session = session_with(registry, SnapshotMemory::new());

        std::thread::scope(|scope| {
            let lookups: Vec<_> = (0..8)
                .map(|worker| {
                    let session = &session;
                    scope.spawn(move || {
                        for _ in 0..100 {
                            assert_eq!(session.require_type("Node").unwrap().byte_size, 16);
                            assert_eq!(session.require_type("Node *").unwrap().target_name(), Some("Node"));
                            assert!(session.find_type(&format!("Missing{worker}")).is_none());
                        }
                    })
                })
                .collect();
            for lookup in lookups {
                lookup.join().unwrap();
            }
        });
    }

    #[test]
    fn test_poisoned_cache_keeps_serving_lookups()
    {
        let mut registry = TypeRegistry::new(ByteOrder::Little, PointerWidth::Bits64);
        registry.insert(TypeDescriptor::new("Node", 16, TypeKind::Struct));
        let session = session_with(registry, SnapshotMemory::new());
        assert!(session.find_type("Node").is_some());

        std::thread::scope(|scope| {
            let holder = scope.spawn(|| {
                let _cache = session.cache.lock().unwrap();
                panic!("lookup interrupted while holding the cache");
            });
            assert!(holder.join().is_err());
        });
        assert!(session.cache.is_poisoned());

        assert_eq!(session.require_type("Node").unwrap().byte_size, 16);
        session.set_context();
        assert_eq!(session.generation(), 1);
        assert!(session.find_type("Node").is_some());
    }
}
