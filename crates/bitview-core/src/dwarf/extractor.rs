//! DWARF type extraction.
//!
//! Two passes over every unit:
//!
//! 1. **Naming**: walk the DIE tree keeping the enclosing namespace and class
//!    scope, and give every type DIE its qualified name. Anonymous aggregates
//!    are named the way LLDB shows them, `Scope::(anonymous union)`.
//! 2. **Building**: turn aggregates, enumerations, base types and typedefs
//!    into [`TypeDescriptor`]s, spelling every referenced type through the
//!    names from the first pass. Pointer, reference, cv and array types are
//!    not stored; [`TypeRegistry`] derives them from the spelling.

use std::collections::{HashMap, HashSet};

use gimli::{
    constants, AttributeValue, DebugTypeSignature, DebuggingInformationEntry, EntriesTreeNode, Reader, Unit, UnitOffset,
    UnitSectionOffset, UnitType,
};

use super::{map_dwarf_error, OwnedDwarf, OwnedReader};
use crate::error::{DecodeError, DecodeResult};
use crate::registry::TypeRegistry;
use crate::types::{
    BitRange, ByteOrder, Enumerator, Member, PointerWidth, ScalarKind, TemplateArg, TypeDescriptor, TypeKind,
};

const MAX_TYPE_REF_DEPTH: usize = 32;

/// Spelling of every function type; members of function pointer type
/// resolve to `(function) *`
const FUNCTION_TYPE: &str = "(function)";

/// A DIE: index into the unit list plus the offset inside that unit
type EntryKey = (usize, UnitOffset<usize>);

/// Descriptors gathered by the building pass
struct Collected
{
    registry: TypeRegistry,
    /// Names with a full definition; declarations never replace these
    defined: HashSet<String>,
    /// `(typedef, target)` pairs, applied once every type is known
    aliases: Vec<(String, String)>,
}

impl Collected
{
    fn define(&mut self, descriptor: TypeDescriptor, declaration: bool)
    {
        if declaration {
            if !self.registry.contains(&descriptor.name) {
                self.registry.insert(descriptor);
            }
        } else if self.defined.insert(descriptor.name.clone()) {
            self.registry.insert(descriptor);
        }
    }

    fn apply_aliases(&mut self)
    {
        // Typedefs of typedefs resolve over several rounds
        let mut pending = std::mem::take(&mut self.aliases);
        loop {
            let before = pending.len();
            let registry = &mut self.registry;
            pending.retain(|(alias, target)| !(registry.contains(alias) || registry.alias(alias, target)));
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }
        for (alias, target) in &pending {
            tracing::trace!(alias = %alias, target = %target, "typedef target not found");
        }
    }
}

pub(crate) struct TypeCollector<'a>
{
    dwarf: &'a OwnedDwarf,
    byte_order: ByteOrder,
    pointer_width: PointerWidth,
    units: Vec<Unit<OwnedReader>>,
    names: HashMap<EntryKey, String>,
}

impl<'a> TypeCollector<'a>
{
    pub(crate) fn new(dwarf: &'a OwnedDwarf, byte_order: ByteOrder, pointer_width: PointerWidth) -> DecodeResult<Self>
    {
        let mut units = Vec::new();
        let mut headers = dwarf.units();
        while let Some(header) = headers
            .next()
            .map_err(|err| map_dwarf_error("reading .debug_info unit header", err))?
        {
            units.push(
                dwarf
                    .unit(header)
                    .map_err(|err| map_dwarf_error("parsing compilation unit", err))?,
            );
        }

        let mut type_headers = dwarf.type_units();
        while let Some(header) = type_headers
            .next()
            .map_err(|err| map_dwarf_error("reading .debug_types unit header", err))?
        {
            units.push(dwarf.unit(header).map_err(|err| map_dwarf_error("parsing type unit", err))?);
        }

        Ok(Self {
            dwarf,
            byte_order,
            pointer_width,
            units,
            names: HashMap::new(),
        })
    }

    pub(crate) fn unit_count(&self) -> usize
    {
        self.units.len()
    }

    /// Run both passes and return every type found.
    pub(crate) fn collect(mut self) -> DecodeResult<TypeRegistry>
    {
        self.name_units()?;

        let mut collected = Collected {
            registry: TypeRegistry::new(self.byte_order, self.pointer_width),
            defined: HashSet::new(),
            aliases: Vec::new(),
        };
        collected
            .registry
            .insert(TypeDescriptor::new(FUNCTION_TYPE, 0, TypeKind::Opaque));

        for index in 0..self.units.len() {
            let unit = &self.units[index];
            let mut tree = unit
                .entries_tree(None)
                .map_err(|err| map_dwarf_error("building unit tree", err))?;
            let root = tree.root().map_err(|err| map_dwarf_error("navigating unit root", err))?;
            self.build_node(index, root, &mut collected)?;
        }
        collected.apply_aliases();

        tracing::debug!(
            units = self.unit_count(),
            named = self.names.len(),
            types = collected.registry.len(),
            "extracted DWARF types"
        );
        Ok(collected.registry)
    }

    // ========================================================================
    // Pass 1: qualified names
    // ========================================================================

    fn name_units(&mut self) -> DecodeResult<()>
    {
        let mut names = HashMap::new();
        let mut deferred = Vec::new();
        for index in 0..self.units.len() {
            let unit = &self.units[index];
            let mut tree = unit
                .entries_tree(None)
                .map_err(|err| map_dwarf_error("building unit tree", err))?;
            let root = tree.root().map_err(|err| map_dwarf_error("navigating unit root", err))?;
            self.name_children(index, root, "", &mut names, &mut deferred)?;
        }

        // Out-of-line definitions whose declaration came later in the unit
        for (key, declaration) in deferred {
            if let Some(name) = names.get(&declaration).cloned() {
                names.entry(key).or_insert(name);
            }
        }
        self.names = names;
        Ok(())
    }

    fn name_children(
        &self,
        index: usize,
        node: EntriesTreeNode<'_, '_, '_, OwnedReader>,
        scope: &str,
        names: &mut HashMap<EntryKey, String>,
        deferred: &mut Vec<(EntryKey, EntryKey)>,
    ) -> DecodeResult<()>
    {
        let mut children = node.children();
        while let Some(child) = children
            .next()
            .map_err(|err| map_dwarf_error("iterating DIE children", err))?
        {
            let entry = child.entry().clone();
            let key = (index, entry.offset());
            let tag = entry.tag();
            match tag {
                constants::DW_TAG_namespace => {
                    let name = self
                        .entry_name(index, &entry)?
                        .unwrap_or_else(|| "(anonymous namespace)".to_string());
                    let nested = qualify(scope, &name);
                    self.name_children(index, child, &nested, names, deferred)?;
                }
                constants::DW_TAG_structure_type
                | constants::DW_TAG_class_type
                | constants::DW_TAG_union_type
                | constants::DW_TAG_enumeration_type => {
                    let name = match self.entry_name(index, &entry)? {
                        Some(name) => Some(qualify(scope, &name)),
                        None => match self.specification(index, &entry)? {
                            Some(declaration) => {
                                let known = names.get(&declaration).cloned();
                                if known.is_none() {
                                    deferred.push((key, declaration));
                                }
                                known
                            }
                            None => Some(qualify(scope, anonymous_label(tag))),
                        },
                    };
                    let nested = name.clone().unwrap_or_else(|| scope.to_string());
                    if let Some(name) = name {
                        names.insert(key, name);
                    }
                    if tag != constants::DW_TAG_enumeration_type {
                        self.name_children(index, child, &nested, names, deferred)?;
                    }
                }
                constants::DW_TAG_typedef => {
                    if let Some(name) = self.entry_name(index, &entry)? {
                        names.insert(key, qualify(scope, &name));
                    }
                }
                constants::DW_TAG_base_type | constants::DW_TAG_unspecified_type => {
                    if let Some(name) = self.entry_name(index, &entry)? {
                        names.insert(key, name);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    // ========================================================================
    // Pass 2: descriptors
    // ========================================================================

    fn build_node(
        &self,
        index: usize,
        node: EntriesTreeNode<'_, '_, '_, OwnedReader>,
        collected: &mut Collected,
    ) -> DecodeResult<()>
    {
        let entry = node.entry().clone();
        let key = (index, entry.offset());
        match entry.tag() {
            constants::DW_TAG_compile_unit
            | constants::DW_TAG_partial_unit
            | constants::DW_TAG_type_unit
            | constants::DW_TAG_namespace => {
                let mut children = node.children();
                while let Some(child) = children
                    .next()
                    .map_err(|err| map_dwarf_error("iterating DIE children", err))?
                {
                    self.build_node(index, child, collected)?;
                }
            }
            constants::DW_TAG_structure_type | constants::DW_TAG_class_type | constants::DW_TAG_union_type => {
                let Some(name) = self.names.get(&key).cloned() else {
                    return Ok(());
                };
                let kind = if entry.tag() == constants::DW_TAG_union_type {
                    TypeKind::Union
                } else {
                    TypeKind::Struct
                };
                let declaration = self.flag(&entry, constants::DW_AT_declaration)?;
                let byte_size = self.udata(&entry, constants::DW_AT_byte_size)?.unwrap_or(0);
                let mut descriptor = TypeDescriptor::new(name, byte_size, kind);

                let mut children = node.children();
                while let Some(child) = children
                    .next()
                    .map_err(|err| map_dwarf_error("iterating aggregate children", err))?
                {
                    let child_entry = child.entry().clone();
                    match child_entry.tag() {
                        constants::DW_TAG_member => {
                            if let Some(member) = self.build_member(index, &child_entry)? {
                                descriptor.members.push(member);
                            }
                        }
                        constants::DW_TAG_inheritance => {
                            if let Some(base) = self.type_name_of(index, &child_entry)? {
                                let offset = self
                                    .udata(&child_entry, constants::DW_AT_data_member_location)?
                                    .unwrap_or(0);
                                descriptor.members.push(Member::base(base, offset));
                            }
                        }
                        constants::DW_TAG_template_type_parameter => {
                            let ty = self
                                .type_name_of(index, &child_entry)?
                                .unwrap_or_else(|| "void".to_string());
                            descriptor.template_args.push(TemplateArg::Type(ty));
                        }
                        constants::DW_TAG_template_value_parameter => {
                            let type_name = self
                                .type_name_of(index, &child_entry)?
                                .unwrap_or_else(|| "int".to_string());
                            let value = self.sdata(&child_entry, constants::DW_AT_const_value)?;
                            descriptor.template_args.push(TemplateArg::Value { type_name, value });
                        }
                        constants::DW_TAG_structure_type
                        | constants::DW_TAG_class_type
                        | constants::DW_TAG_union_type
                        | constants::DW_TAG_enumeration_type
                        | constants::DW_TAG_typedef => self.build_node(index, child, collected)?,
                        _ => {}
                    }
                }
                collected.define(descriptor, declaration);
            }
            constants::DW_TAG_enumeration_type => {
                let Some(name) = self.names.get(&key).cloned() else {
                    return Ok(());
                };
                let declaration = self.flag(&entry, constants::DW_AT_declaration)?;
                let byte_size = self.udata(&entry, constants::DW_AT_byte_size)?.unwrap_or(4);
                let mut enumerators = Vec::new();
                let mut children = node.children();
                while let Some(child) = children
                    .next()
                    .map_err(|err| map_dwarf_error("iterating enumerators", err))?
                {
                    let child_entry = child.entry().clone();
                    if child_entry.tag() != constants::DW_TAG_enumerator {
                        continue;
                    }
                    let (Some(name), Some(value)) = (
                        self.entry_name(index, &child_entry)?,
                        self.sdata(&child_entry, constants::DW_AT_const_value)?,
                    ) else {
                        continue;
                    };
                    enumerators.push(Enumerator::new(name, value));
                }
                let descriptor = TypeDescriptor::new(name, byte_size, TypeKind::Enum).with_enumerators(enumerators);
                collected.define(descriptor, declaration);
            }
            constants::DW_TAG_base_type => {
                let Some(name) = self.names.get(&key).cloned() else {
                    return Ok(());
                };
                let byte_size = self.udata(&entry, constants::DW_AT_byte_size)?.unwrap_or(0);
                let kind = self.scalar_kind(&entry, &name)?;
                collected.define(TypeDescriptor::new(name, byte_size, kind), false);
            }
            constants::DW_TAG_unspecified_type => {
                if let Some(name) = self.names.get(&key).cloned() {
                    let byte_size = self.udata(&entry, constants::DW_AT_byte_size)?.unwrap_or(0);
                    collected.define(TypeDescriptor::new(name, byte_size, TypeKind::Opaque), false);
                }
            }
            constants::DW_TAG_typedef => {
                if let (Some(alias), Some(target)) = (self.names.get(&key).cloned(), self.type_name_of(index, &entry)?) {
                    collected.aliases.push((alias, target));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn build_member(
        &self,
        index: usize,
        entry: &DebuggingInformationEntry<'_, '_, OwnedReader>,
    ) -> DecodeResult<Option<Member>>
    {
        // Static data members
        if self.flag(entry, constants::DW_AT_declaration)? {
            return Ok(None);
        }
        let name = self.entry_name(index, entry)?;
        let Some(type_name) = self.type_name_of(index, entry)? else {
            tracing::trace!(member = ?name, "skipping member of unnamed type");
            return Ok(None);
        };

        let member = match self.udata(entry, constants::DW_AT_bit_size)? {
            Some(size) => {
                let width = u32::try_from(size).map_err(|_| {
                    DecodeError::UnsupportedLayout(format!("bit-field {} is {size} bits wide", name.as_deref().unwrap_or("(unnamed)")))
                })?;
                let bit_offset = self.data_bit_offset(entry, size)?;
                let bits = BitRange::new((bit_offset % 8) as u32, width);
                let byte_offset = bit_offset / 8;
                match name {
                    Some(name) => Member::bitfield(name, type_name, byte_offset, bits),
                    // Unnamed bit-fields are padding
                    None => return Ok(None),
                }
            }
            None => {
                let byte_offset = self
                    .udata(entry, constants::DW_AT_data_member_location)?
                    .unwrap_or(0);
                match name {
                    Some(name) => Member::field(name, type_name, byte_offset),
                    None => Member::anonymous(type_name, byte_offset),
                }
            }
        };
        Ok(Some(member))
    }

    /// Offset of a bit-field in bits from the start of the aggregate.
    ///
    /// DWARF 4 producers emit `DW_AT_data_bit_offset`; older ones give the
    /// storage unit's location plus `DW_AT_bit_offset` counted from its most
    /// significant bit.
    fn data_bit_offset(&self, entry: &DebuggingInformationEntry<'_, '_, OwnedReader>, size: u64) -> DecodeResult<u64>
    {
        if let Some(offset) = self.udata(entry, constants::DW_AT_data_bit_offset)? {
            return Ok(offset);
        }

        let location = self
            .udata(entry, constants::DW_AT_data_member_location)?
            .unwrap_or(0)
            .saturating_mul(8);
        let Some(legacy) = self.udata(entry, constants::DW_AT_bit_offset)? else {
            return Ok(location);
        };
        match (self.byte_order, self.udata(entry, constants::DW_AT_byte_size)?) {
            (ByteOrder::Little, Some(storage)) => Ok(location + (storage * 8).saturating_sub(legacy + size)),
            _ => Ok(location + legacy),
        }
    }

    fn scalar_kind(&self, entry: &DebuggingInformationEntry<'_, '_, OwnedReader>, name: &str) -> DecodeResult<TypeKind>
    {
        let encoding = entry
            .attr(constants::DW_AT_encoding)
            .map_err(|err| map_dwarf_error("reading DW_AT_encoding", err))?
            .map(|attr| attr.value());
        let scalar = match encoding {
            Some(AttributeValue::Encoding(constants::DW_ATE_boolean)) => ScalarKind::Bool,
            Some(AttributeValue::Encoding(constants::DW_ATE_float)) => ScalarKind::Float,
            Some(AttributeValue::Encoding(constants::DW_ATE_signed_char | constants::DW_ATE_unsigned_char))
                if name == "char" =>
            {
                ScalarKind::Char
            }
            Some(AttributeValue::Encoding(constants::DW_ATE_signed | constants::DW_ATE_signed_char)) => {
                ScalarKind::Signed
            }
            Some(AttributeValue::Encoding(_)) => ScalarKind::Unsigned,
            _ => return Ok(TypeKind::Opaque),
        };
        Ok(TypeKind::Scalar(scalar))
    }

    // ========================================================================
    // Type references
    // ========================================================================

    fn type_name_of(
        &self,
        index: usize,
        entry: &DebuggingInformationEntry<'_, '_, OwnedReader>,
    ) -> DecodeResult<Option<String>>
    {
        match entry
            .attr(constants::DW_AT_type)
            .map_err(|err| map_dwarf_error("reading DW_AT_type", err))?
        {
            Some(attr) => self.resolve_type_name(index, attr.value(), 0),
            None => Ok(None),
        }
    }

    fn resolve_type_name(&self, index: usize, value: AttributeValue<OwnedReader>, depth: usize) -> DecodeResult<Option<String>>
    {
        if depth >= MAX_TYPE_REF_DEPTH {
            return Ok(None);
        }
        let Some(key) = self.reference_key(index, value) else {
            return Ok(None);
        };
        if let Some(name) = self.names.get(&key) {
            return Ok(Some(name.clone()));
        }

        let (target, offset) = key;
        let die = self.units[target]
            .entry(offset)
            .map_err(|err| map_dwarf_error("resolving type reference", err))?;
        let inner = match die
            .attr(constants::DW_AT_type)
            .map_err(|err| map_dwarf_error("reading nested type", err))?
        {
            Some(attr) => self.resolve_type_name(target, attr.value(), depth + 1)?,
            None => None,
        };

        let name = match die.tag() {
            constants::DW_TAG_pointer_type => Some(format!("{} *", inner.as_deref().unwrap_or("void"))),
            constants::DW_TAG_reference_type | constants::DW_TAG_rvalue_reference_type => {
                inner.map(|referent| format!("{referent} &"))
            }
            constants::DW_TAG_const_type => Some(format!("const {}", inner.as_deref().unwrap_or("void"))),
            constants::DW_TAG_volatile_type => Some(format!("volatile {}", inner.as_deref().unwrap_or("void"))),
            constants::DW_TAG_restrict_type | constants::DW_TAG_atomic_type => inner,
            constants::DW_TAG_array_type => match inner {
                Some(element) => Some(self.array_name(target, offset, element)?),
                None => None,
            },
            constants::DW_TAG_subroutine_type => Some(FUNCTION_TYPE.to_string()),
            _ => self.entry_name(target, &die)?,
        };
        Ok(name)
    }

    /// `element[N]` for each subrange, outermost first.
    fn array_name(&self, index: usize, offset: UnitOffset<usize>, element: String) -> DecodeResult<String>
    {
        let mut name = element;
        let mut tree = self.units[index]
            .entries_tree(Some(offset))
            .map_err(|err| map_dwarf_error("building array tree", err))?;
        let root = tree.root().map_err(|err| map_dwarf_error("navigating array root", err))?;
        let mut children = root.children();
        while let Some(child) = children
            .next()
            .map_err(|err| map_dwarf_error("iterating array subranges", err))?
        {
            let entry = child.entry();
            if entry.tag() != constants::DW_TAG_subrange_type {
                continue;
            }
            let count = match self.udata(entry, constants::DW_AT_count)? {
                Some(count) => Some(count),
                None => self
                    .udata(entry, constants::DW_AT_upper_bound)?
                    .map(|upper| upper.saturating_add(1)),
            };
            match count {
                Some(count) => name.push_str(&format!("[{count}]")),
                None => name.push_str("[]"),
            }
        }
        Ok(name)
    }

    fn reference_key(&self, index: usize, value: AttributeValue<OwnedReader>) -> Option<EntryKey>
    {
        match value {
            AttributeValue::UnitRef(offset) => Some((index, offset)),
            AttributeValue::DebugInfoRef(offset) => self.find_unit_for_offset(UnitSectionOffset::from(offset)),
            AttributeValue::DebugTypesRef(signature) => self.find_type_unit(signature),
            _ => None,
        }
    }

    fn find_unit_for_offset(&self, target: UnitSectionOffset<usize>) -> Option<EntryKey>
    {
        self.units
            .iter()
            .enumerate()
            .find_map(|(index, unit)| target.to_unit_offset(unit).map(|offset| (index, offset)))
    }

    fn find_type_unit(&self, signature: DebugTypeSignature) -> Option<EntryKey>
    {
        self.units.iter().enumerate().find_map(|(index, unit)| match unit.header.type_() {
            UnitType::Type {
                type_signature,
                type_offset,
            }
            | UnitType::SplitType {
                type_signature,
                type_offset,
            } if type_signature == signature => Some((index, type_offset)),
            _ => None,
        })
    }

    fn specification(
        &self,
        index: usize,
        entry: &DebuggingInformationEntry<'_, '_, OwnedReader>,
    ) -> DecodeResult<Option<EntryKey>>
    {
        Ok(entry
            .attr(constants::DW_AT_specification)
            .map_err(|err| map_dwarf_error("reading DW_AT_specification", err))?
            .and_then(|attr| self.reference_key(index, attr.value())))
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    fn entry_name(
        &self,
        index: usize,
        entry: &DebuggingInformationEntry<'_, '_, OwnedReader>,
    ) -> DecodeResult<Option<String>>
    {
        let Some(attr) = entry
            .attr(constants::DW_AT_name)
            .map_err(|err| map_dwarf_error("reading DW_AT_name", err))?
        else {
            return Ok(None);
        };
        let reader = self
            .dwarf
            .attr_string(&self.units[index], attr.value())
            .map_err(|err| map_dwarf_error("resolving DWARF string", err))?;
        let owned = match reader.to_string() {
            Ok(cow) => cow.into_owned(),
            Err(_) => reader
                .to_string_lossy()
                .map_err(|err| map_dwarf_error("decoding DWARF string", err))?
                .into_owned(),
        };
        Ok(Some(owned))
    }

    fn udata(
        &self,
        entry: &DebuggingInformationEntry<'_, '_, OwnedReader>,
        name: constants::DwAt,
    ) -> DecodeResult<Option<u64>>
    {
        Ok(entry
            .attr(name)
            .map_err(|err| map_dwarf_error("reading attribute", err))?
            .and_then(|attr| attr.udata_value()))
    }

    fn sdata(
        &self,
        entry: &DebuggingInformationEntry<'_, '_, OwnedReader>,
        name: constants::DwAt,
    ) -> DecodeResult<Option<i64>>
    {
        Ok(entry
            .attr(name)
            .map_err(|err| map_dwarf_error("reading attribute", err))?
            .and_then(|attr| {
                attr.sdata_value()
                    .or_else(|| attr.udata_value().map(|value| value as i64))
            }))
    }

    fn flag(&self, entry: &DebuggingInformationEntry<'_, '_, OwnedReader>, name: constants::DwAt) -> DecodeResult<bool>
    {
        Ok(matches!(
            entry
                .attr(name)
                .map_err(|err| map_dwarf_error("reading attribute", err))?
                .map(|attr| attr.value()),
            Some(AttributeValue::Flag(true))
        ))
    }
}

fn qualify(scope: &str, name: &str) -> String
{
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}::{name}")
    }
}

fn anonymous_label(tag: constants::DwTag) -> &'static str
{
    match tag {
        constants::DW_TAG_union_type => "(anonymous union)",
        constants::DW_TAG_enumeration_type => "(anonymous enum)",
        constants::DW_TAG_class_type => "(anonymous class)",
        _ => "(anonymous struct)",
    }
}
