//! Shared fixtures: a small clang-like type registry and a memory snapshot
//! to lay objects out in.
//!
//! Layouts follow the shape of the real LLVM/Clang classes (bases, anonymous
//! bits unions, packed pointer words) with only the members the decoders
//! touch.

#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use bitview_core::prelude::*;

/// Start of the mapped region
pub const BASE: u64 = 0x1000;
/// Size of the mapped region
pub const REGION_LEN: usize = 0x2000;
/// An address nothing is mapped at
pub const UNMAPPED: u64 = 0x9000_0000;

pub const DECL_PAIR: &str = "llvm::PointerIntPair<clang::Decl *, 2, unsigned int>";
pub const DECL_PAIR_INFO: &str = "llvm::PointerIntPairInfo<clang::Decl *, 2>";
pub const DECL_PUNNED: &str = "llvm::detail::PunnedPointer<clang::Decl *>";

pub const TYPE_UNION: &str = "llvm::PointerUnion<const clang::Type *, const clang::ExtQuals *>";
pub const TYPE_UNION_PAIR: &str = "llvm::PointerIntPair<void *, 1, unsigned int>";
pub const TYPE_UNION_INFO: &str = "llvm::PointerIntPairInfo<void *, 1>";

pub const QUAL_PAIR: &str =
    "llvm::PointerIntPair<llvm::PointerUnion<const clang::Type *, const clang::ExtQuals *>, 3, unsigned int>";
pub const QUAL_PAIR_INFO: &str =
    "llvm::PointerIntPairInfo<llvm::PointerUnion<const clang::Type *, const clang::ExtQuals *>, 3>";

pub const STRING_MAP_ENTRY: &str = "llvm::StringMapEntry<unsigned int>";

/// `TypeClass` value with no layout entry
pub const TC_UNHANDLED: u64 = 5;

pub fn pair(name: &str, pointer_type: &str, int_bits: i64, info: &str, storage: &str) -> TypeDescriptor
{
    TypeDescriptor::new(name, 8, TypeKind::Struct)
        .with_members(vec![Member::field("Value", storage, 0)])
        .with_template_args(vec![
            TemplateArg::Type(pointer_type.to_string()),
            TemplateArg::Value {
                type_name: "unsigned int".to_string(),
                value: Some(int_bits),
            },
            TemplateArg::Type("unsigned int".to_string()),
            TemplateArg::Type(format!("llvm::PointerLikeTypeTraits<{pointer_type}>")),
            TemplateArg::Type(info.to_string()),
        ])
}

pub fn pair_constants(info: &str, pointer_mask: i64, int_shift: i64, shifted_int_mask: i64) -> TypeDescriptor
{
    TypeDescriptor::new(format!("{info}::MaskAndShiftConstants"), 8, TypeKind::Enum).with_enumerators(vec![
        Enumerator::new("PointerBitMask", pointer_mask),
        Enumerator::new("IntShift", int_shift),
        Enumerator::new("IntMask", shifted_int_mask >> int_shift),
        Enumerator::new("ShiftedIntMask", shifted_int_mask),
    ])
}

pub fn record(name: &str, byte_size: u64, members: Vec<Member>) -> TypeDescriptor
{
    TypeDescriptor::new(name, byte_size, TypeKind::Struct).with_members(members)
}

fn union(name: &str, members: Vec<Member>) -> TypeDescriptor
{
    TypeDescriptor::new(name, 8, TypeKind::Union).with_members(members)
}

fn enumeration(name: &str, enumerators: &[(&str, i64)]) -> TypeDescriptor
{
    TypeDescriptor::new(name, 4, TypeKind::Enum).with_enumerators(
        enumerators
            .iter()
            .map(|(name, value)| Enumerator::new(*name, *value))
            .collect(),
    )
}

fn bits(name: &str, byte_offset: u64, offset: u32, size: u32) -> Member
{
    Member::bitfield(name, "unsigned int", byte_offset, BitRange::new(offset, size))
}

/// The registry every test runs against (little-endian, 64-bit).
pub fn clang_registry() -> TypeRegistry
{
    let mut registry = TypeRegistry::new(ByteOrder::Little, PointerWidth::Bits64);
    let types = vec![
        // PointerIntPair<Decl *, 2> over a PunnedPointer
        record(
            "clang::Decl",
            16,
            vec![
                Member::field("NextInContextAndBits", "unsigned long", 0),
                Member::field("Loc", "unsigned int", 8),
            ],
        ),
        pair(DECL_PAIR, "clang::Decl *", 2, DECL_PAIR_INFO, DECL_PUNNED),
        record(DECL_PAIR_INFO, 1, Vec::new()),
        pair_constants(DECL_PAIR_INFO, -8, 1, 0x6),
        record(DECL_PUNNED, 8, vec![Member::field("Data", "char[8]", 0)])
            .with_template_args(vec![TemplateArg::Type("clang::Decl *".to_string())]),
        // PointerUnion<const Type *, const ExtQuals *>, with the older intptr_t storage
        record(TYPE_UNION, 8, vec![Member::field("Val", TYPE_UNION_PAIR, 0)]).with_template_args(vec![
            TemplateArg::Type("const clang::Type *".to_string()),
            TemplateArg::Type("const clang::ExtQuals *".to_string()),
        ]),
        pair(TYPE_UNION_PAIR, "void *", 1, TYPE_UNION_INFO, "intptr_t"),
        record(TYPE_UNION_INFO, 1, Vec::new()),
        pair_constants(TYPE_UNION_INFO, -16, 3, 0x8),
        // QualType
        record("clang::QualType", 8, vec![Member::field("Value", QUAL_PAIR, 0)]),
        pair(QUAL_PAIR, TYPE_UNION, 3, QUAL_PAIR_INFO, "intptr_t"),
        record(QUAL_PAIR_INFO, 1, Vec::new()),
        pair_constants(QUAL_PAIR_INFO, -8, 0, 0x7),
        enumeration(
            "clang::Qualifiers::TQ",
            &[("Const", 1), ("Restrict", 2), ("Volatile", 4), ("CVRMask", 7)],
        ),
        record("clang::ExtQuals", 16, vec![Member::field("BaseType", "const clang::Type *", 0)]),
        // Type hierarchy
        record(
            "clang::ExtQualsTypeCommonBase",
            16,
            vec![
                Member::field("BaseType", "const clang::Type *", 0),
                Member::field("CanonicalType", "clang::QualType", 8),
            ],
        ),
        record(
            "clang::Type",
            24,
            vec![
                Member::base("clang::ExtQualsTypeCommonBase", 0),
                Member::anonymous("clang::Type::(anonymous union)", 16),
            ],
        ),
        union(
            "clang::Type::(anonymous union)",
            vec![
                Member::field("TypeBits", "clang::Type::TypeBitfields", 0),
                Member::field("BuiltinTypeBits", "clang::Type::BuiltinTypeBitfields", 0),
            ],
        ),
        record(
            "clang::Type::TypeBitfields",
            8,
            vec![bits("TC", 0, 0, 8), bits("Dependence", 1, 0, 5)],
        ),
        record("clang::Type::BuiltinTypeBitfields", 8, vec![bits("Kind", 1, 5, 9)]),
        enumeration(
            "clang::Type::TypeClass",
            &[
                ("Builtin", 0),
                ("Pointer", 1),
                ("Enum", 2),
                ("Record", 3),
                ("TemplateTypeParm", 4),
                ("Unhandled", TC_UNHANDLED as i64),
                ("TypeLast", TC_UNHANDLED as i64),
            ],
        ),
        record("clang::BuiltinType", 24, vec![Member::base("clang::Type", 0)]),
        record(
            "clang::PointerType",
            32,
            vec![Member::base("clang::Type", 0), Member::field("PointeeType", "clang::QualType", 24)],
        ),
        record(
            "clang::TagType",
            32,
            vec![Member::base("clang::Type", 0), Member::field("decl", "clang::Decl *", 24)],
        ),
        record(
            "clang::TemplateTypeParmType",
            32,
            vec![
                Member::base("clang::Type", 0),
                Member::anonymous("clang::TemplateTypeParmType::(anonymous union)", 24),
            ],
        ),
        union(
            "clang::TemplateTypeParmType::(anonymous union)",
            vec![
                Member::field("CanTTPTInfo", "clang::TemplateTypeParmType::CanonicalTTPTInfo", 0),
                Member::field("TTPDecl", "clang::TemplateTypeParmDecl *", 0),
            ],
        ),
        record(
            "clang::TemplateTypeParmType::CanonicalTTPTInfo",
            4,
            vec![bits("Depth", 0, 0, 15), bits("ParameterPack", 1, 7, 1), bits("Index", 2, 0, 16)],
        ),
        record("clang::TemplateTypeParmDecl", 16, Vec::new()),
        // Statements and expressions
        record("clang::Stmt", 8, vec![Member::anonymous("clang::Stmt::(anonymous union)", 0)]),
        union(
            "clang::Stmt::(anonymous union)",
            vec![
                Member::field("StmtBits", "clang::Stmt::StmtBitfields", 0),
                Member::field("IfStmtBits", "clang::Stmt::IfStmtBitfields", 0),
                Member::field("ExprBits", "clang::Stmt::ExprBitfields", 0),
                Member::field("CastExprBits", "clang::Stmt::CastExprBitfields", 0),
            ],
        ),
        record("clang::Stmt::StmtBitfields", 8, vec![bits("sClass", 0, 0, 8)]),
        record(
            "clang::Stmt::IfStmtBitfields",
            8,
            vec![bits("HasElse", 1, 0, 1), bits("HasVar", 1, 1, 1)],
        ),
        record(
            "clang::Stmt::ExprBitfields",
            8,
            vec![bits("ValueKind", 1, 0, 2), bits("ObjectKind", 1, 2, 3)],
        ),
        record("clang::Stmt::CastExprBitfields", 8, vec![bits("Kind", 1, 0, 7)]),
        enumeration(
            "clang::Stmt::StmtClass",
            &[
                ("NoStmtClass", 0),
                ("IfStmtClass", 1),
                ("IntegerLiteralClass", 2),
                ("ImplicitCastExprClass", 3),
                ("firstExprConstant", 2),
                ("lastExprConstant", 3),
            ],
        ),
        record(
            "clang::Expr",
            16,
            vec![Member::base("clang::Stmt", 0), Member::field("TR", "clang::QualType", 8)],
        ),
        record("clang::IfStmt", 8, vec![Member::base("clang::Stmt", 0)]),
        record(
            "clang::IntegerLiteral",
            24,
            vec![Member::base("clang::Expr", 0), Member::field("Value", "unsigned long", 16)],
        ),
        record(
            "clang::ImplicitCastExpr",
            24,
            vec![Member::base("clang::Expr", 0), Member::field("Op", "clang::Stmt *", 16)],
        ),
        // Declaration contexts
        record(
            "clang::DeclContext",
            24,
            vec![
                Member::anonymous("clang::DeclContext::(anonymous union)", 8),
                Member::field("FirstDecl", "clang::Decl *", 16),
            ],
        ),
        union(
            "clang::DeclContext::(anonymous union)",
            vec![
                Member::field("DeclContextBits", "clang::DeclContext::DeclContextBitfields", 0),
                Member::field("RecordDeclBits", "clang::DeclContext::RecordDeclBitfields", 0),
            ],
        ),
        record(
            "clang::DeclContext::DeclContextBitfields",
            8,
            vec![bits("DeclKind", 0, 0, 7), bits("ExternalLexicalStorage", 0, 7, 1)],
        ),
        record(
            "clang::DeclContext::RecordDeclBitfields",
            8,
            vec![bits("HasFlexibleArrayMember", 1, 0, 1)],
        ),
        enumeration(
            "clang::Decl::Kind",
            &[("Namespace", 0), ("Record", 1), ("CXXRecord", 2), ("Var", 3)],
        ),
        // Declaration names
        record("clang::DeclarationName", 8, vec![Member::field("Ptr", "uintptr_t", 0)]),
        enumeration(
            "clang::DeclarationName::StoredNameKind",
            &[
                ("StoredIdentifier", 0),
                ("StoredObjCZeroArgSelector", 1),
                ("StoredObjCOneArgSelector", 2),
                ("StoredCXXConstructorName", 3),
                ("StoredCXXDestructorName", 4),
                ("StoredCXXConversionFunctionName", 5),
                ("StoredCXXOperatorName", 6),
                ("StoredDeclarationNameExtra", 7),
                ("PtrMask", 7),
                ("UncommonNameKindOffset", 8),
            ],
        ),
        record(
            "clang::IdentifierInfo",
            16,
            vec![Member::field("Entry", "llvm::StringMapEntry<clang::IdentifierInfo *> *", 8)],
        ),
        record("clang::detail::CXXOperatorIdName", 16, vec![Member::field("Kind", "unsigned int", 8)]),
        // StringMap entries
        record("llvm::StringMapEntryBase", 8, vec![Member::field("keyLength", "unsigned long", 0)]),
        record(
            STRING_MAP_ENTRY,
            16,
            vec![
                Member::base("llvm::StringMapEntryBase", 0),
                Member::field("second", "unsigned int", 8),
            ],
        ),
        record(
            "llvm::StringMapEntry<clang::IdentifierInfo *>",
            16,
            vec![
                Member::base("llvm::StringMapEntryBase", 0),
                Member::field("second", "clang::IdentifierInfo *", 8),
            ],
        ),
    ];
    for ty in types {
        registry.insert(ty);
    }
    registry
}

/// Memory the test can still change after the session is built
#[derive(Debug, Clone, Default)]
pub struct SharedMemory(Arc<RwLock<SnapshotMemory>>);

impl SharedMemory
{
    pub fn write_u64(&self, address: u64, value: u64)
    {
        self.0
            .write()
            .unwrap()
            .write(Address::new(address), &value.to_le_bytes())
            .unwrap();
    }
}

impl MemoryReader for SharedMemory
{
    fn read_memory(&self, address: Address, len: usize) -> DecodeResult<Vec<u8>>
    {
        self.0.read().unwrap().read_memory(address, len)
    }
}

/// Registry plus one zeroed region at [`BASE`]
pub struct Fixture
{
    pub registry: TypeRegistry,
    pub memory: SnapshotMemory,
}

impl Fixture
{
    pub fn new() -> Self
    {
        let mut memory = SnapshotMemory::new();
        memory.add_region(BASE, vec![0; REGION_LEN]);
        Self {
            registry: clang_registry(),
            memory,
        }
    }

    pub fn write_u64(&mut self, address: u64, value: u64) -> &mut Self
    {
        self.memory.write(Address::new(address), &value.to_le_bytes()).unwrap();
        self
    }

    pub fn write_u32(&mut self, address: u64, value: u32) -> &mut Self
    {
        self.memory.write(Address::new(address), &value.to_le_bytes()).unwrap();
        self
    }

    pub fn write_bytes(&mut self, address: u64, bytes: &[u8]) -> &mut Self
    {
        self.memory.write(Address::new(address), bytes).unwrap();
        self
    }

    pub fn session(self) -> Session
    {
        Session::new(Arc::new(self.memory), Arc::new(self.registry))
    }

    /// Session over memory the test keeps a handle to.
    pub fn shared_session(self) -> (Session, SharedMemory)
    {
        let shared = SharedMemory(Arc::new(RwLock::new(self.memory)));
        let session = Session::new(Arc::new(shared.clone()), Arc::new(self.registry));
        (session, shared)
    }
}

/// Names of every slot of a view, hidden ones included.
pub fn slot_names(view: &mut SyntheticView<'_>) -> Vec<String>
{
    view.slots().iter().map(|slot| slot.name.clone()).collect()
}

/// Names of the visible children of a view.
pub fn child_names(view: &mut SyntheticView<'_>) -> Vec<String>
{
    let count = view.child_count();
    slot_names(view).into_iter().take(count).collect()
}

/// Value of the visible or hidden child called `name`.
pub fn child(view: &mut SyntheticView<'_>, name: &str) -> Value
{
    let index = view.index_of(name).unwrap_or_else(|| panic!("no child {name}"));
    view.child_at(index).and_then(|child| child.value().cloned()).unwrap()
}
