//! # Layout Tables
//!
//! Static discriminant tables for the tagged unions the providers decode,
//! and validation of those tables against a live type system.
//!
//! The tables describe one compiler version's class hierarchy. A target built
//! from a different version may have added, removed or renamed classes, so
//! [`validate`] reports every mismatch instead of letting a decode stumble
//! over it later.
//!
//! ## Tables
//!
//! | Table | Tag | Entries |
//! |-------|-----|---------|
//! | [`TYPE_CLASS_LAYOUT`] | `TypeBits.TC` | derived `clang::*Type` plus its bits |
//! | [`STMT_CLASS_LAYOUT`] | `StmtBits.sClass` | derived statement/expression plus its bits |
//! | [`DECL_KIND_LAYOUT`] | `DeclContextBits.DeclKind` | bits only |
//! | [`NAME_KIND_LAYOUT`] | low bits of `DeclarationName::Ptr` | pointee type |

use std::collections::BTreeSet;

use crate::dispatch::{LayoutEntry, TaggedUnionLayout};
use crate::session::Session;

/// `clang::Type` by type class
pub static TYPE_CLASS_LAYOUT: TaggedUnionLayout = TaggedUnionLayout {
    name: "TypeClass",
    base_type: "clang::Type",
    common_bits: Some("TypeBits"),
    discriminant_field: "TC",
    discriminant_enum: "clang::Type::TypeClass",
    markers: &["TagFirst", "TagLast"],
    exhaustive: true,
    entries: TYPE_CLASS_ENTRIES,
};

const TYPE_CLASS_ENTRIES: &[LayoutEntry] = &[
    LayoutEntry::new("Adjusted", Some("clang::AdjustedType"), None),
    LayoutEntry::new("Decayed", Some("clang::DecayedType"), None),
    LayoutEntry::new("ConstantArray", Some("clang::ConstantArrayType"), Some("ConstantArrayTypeBits")),
    LayoutEntry::new("ArrayParameter", Some("clang::ArrayParameterType"), None),
    LayoutEntry::new("DependentSizedArray", Some("clang::DependentSizedArrayType"), None),
    LayoutEntry::new("IncompleteArray", Some("clang::IncompleteArrayType"), None),
    LayoutEntry::new("VariableArray", Some("clang::VariableArrayType"), None),
    LayoutEntry::new("Atomic", Some("clang::AtomicType"), None),
    LayoutEntry::new("Attributed", Some("clang::AttributedType"), Some("AttributedTypeBits")),
    LayoutEntry::new("BTFTagAttributed", Some("clang::BTFTagAttributedType"), None),
    LayoutEntry::new("BitInt", Some("clang::BitIntType"), None),
    LayoutEntry::new("BlockPointer", Some("clang::BlockPointerType"), None),
    LayoutEntry::new("CountAttributed", Some("clang::CountAttributedType"), Some("CountAttributedTypeBits")),
    LayoutEntry::new("Builtin", Some("clang::BuiltinType"), Some("BuiltinTypeBits")),
    LayoutEntry::new("Complex", Some("clang::ComplexType"), None),
    LayoutEntry::new("Decltype", Some("clang::DecltypeType"), None),
    LayoutEntry::new("Auto", Some("clang::AutoType"), Some("AutoTypeBits")),
    LayoutEntry::new("DeducedTemplateSpecialization", Some("clang::DeducedTemplateSpecializationType"), None),
    LayoutEntry::new("DependentAddressSpace", Some("clang::DependentAddressSpaceType"), None),
    LayoutEntry::new("DependentBitInt", Some("clang::DependentBitIntType"), None),
    LayoutEntry::new("DependentName", Some("clang::DependentNameType"), None),
    LayoutEntry::new("DependentSizedExtVector", Some("clang::DependentSizedExtVectorType"), None),
    LayoutEntry::new("DependentTemplateSpecialization", Some("clang::DependentTemplateSpecializationType"), Some("DependentTemplateSpecializationTypeBits")),
    LayoutEntry::new("DependentVector", Some("clang::DependentVectorType"), Some("VectorTypeBits")),
    LayoutEntry::new("Elaborated", Some("clang::ElaboratedType"), Some("ElaboratedTypeBits")),
    LayoutEntry::new("FunctionNoProto", Some("clang::FunctionNoProtoType"), None),
    LayoutEntry::new("FunctionProto", Some("clang::FunctionProtoType"), Some("FunctionTypeBits")),
    LayoutEntry::new("InjectedClassName", Some("clang::InjectedClassNameType"), None),
    LayoutEntry::new("MacroQualified", Some("clang::MacroQualifiedType"), None),
    LayoutEntry::new("ConstantMatrix", Some("clang::ConstantMatrixType"), None),
    LayoutEntry::new("DependentSizedMatrix", Some("clang::DependentSizedMatrixType"), None),
    LayoutEntry::new("MemberPointer", Some("clang::MemberPointerType"), None),
    LayoutEntry::new("ObjCObjectPointer", Some("clang::ObjCObjectPointerType"), None),
    LayoutEntry::new("ObjCObject", Some("clang::ObjCObjectType"), Some("ObjCObjectTypeBits")),
    LayoutEntry::new("ObjCInterface", Some("clang::ObjCInterfaceType"), None),
    LayoutEntry::new("ObjCTypeParam", Some("clang::ObjCTypeParamType"), None),
    LayoutEntry::new("PackExpansion", Some("clang::PackExpansionType"), Some("PackExpansionTypeBits")),
    LayoutEntry::new("PackIndexing", Some("clang::PackIndexingType"), None),
    LayoutEntry::new("Paren", Some("clang::ParenType"), None),
    LayoutEntry::new("Pipe", Some("clang::PipeType"), None),
    LayoutEntry::new("Pointer", Some("clang::PointerType"), None),
    LayoutEntry::new("LValueReference", Some("clang::LValueReferenceType"), None),
    LayoutEntry::new("RValueReference", Some("clang::RValueReferenceType"), None),
    LayoutEntry::new("SubstTemplateTypeParmPack", Some("clang::SubstTemplateTypeParmPackType"), Some("SubstTemplateTypeParmPackTypeBits")),
    LayoutEntry::new("SubstTemplateTypeParm", Some("clang::SubstTemplateTypeParmType"), Some("SubstTemplateTypeParmTypeBits")),
    LayoutEntry::new("Enum", Some("clang::EnumType"), None),
    LayoutEntry::new("Record", Some("clang::RecordType"), None),
    LayoutEntry::new("TemplateSpecialization", Some("clang::TemplateSpecializationType"), Some("TemplateSpecializationTypeBits")),
    LayoutEntry::new("TemplateTypeParm", Some("clang::TemplateTypeParmType"), None),
    LayoutEntry::new("TypeOfExpr", Some("clang::TypeOfExprType"), Some("TypeOfBits")),
    LayoutEntry::new("TypeOf", Some("clang::TypeOfType"), Some("TypeOfBits")),
    LayoutEntry::new("Typedef", Some("clang::TypedefType"), Some("TypedefBits")),
    LayoutEntry::new("UnaryTransform", Some("clang::UnaryTransformType"), None),
    LayoutEntry::new("UnresolvedUsing", Some("clang::UnresolvedUsingType"), None),
    LayoutEntry::new("Using", Some("clang::UsingType"), Some("UsingBits")),
    LayoutEntry::new("Vector", Some("clang::VectorType"), Some("VectorTypeBits")),
    LayoutEntry::new("ExtVector", Some("clang::ExtVectorType"), None),
    LayoutEntry::new("HLSLAttributedResource", Some("clang::HLSLAttributedResourceType"), None),
];

/// `clang::Stmt` (and every expression) by statement class
pub static STMT_CLASS_LAYOUT: TaggedUnionLayout = TaggedUnionLayout {
    name: "StmtClass",
    base_type: "clang::Stmt",
    common_bits: Some("StmtBits"),
    discriminant_field: "sClass",
    discriminant_enum: "clang::Stmt::StmtClass",
    markers: &["NoStmtClass"],
    exhaustive: true,
    entries: STMT_CLASS_ENTRIES,
};

const STMT_CLASS_ENTRIES: &[LayoutEntry] = &[
    // statements
    LayoutEntry::new("NullStmtClass", Some("clang::NullStmt"), Some("NullStmtBits")),
    LayoutEntry::new("CompoundStmtClass", Some("clang::CompoundStmt"), Some("CompoundStmtBits")),
    LayoutEntry::new("LabelStmtClass", Some("clang::LabelStmt"), Some("LabelStmtBits")),
    LayoutEntry::new("IfStmtClass", Some("clang::IfStmt"), Some("IfStmtBits")),
    LayoutEntry::new("SwitchStmtClass", Some("clang::SwitchStmt"), Some("SwitchStmtBits")),
    LayoutEntry::new("WhileStmtClass", Some("clang::WhileStmt"), Some("WhileStmtBits")),
    LayoutEntry::new("DoStmtClass", Some("clang::DoStmt"), Some("DoStmtBits")),
    LayoutEntry::new("ForStmtClass", Some("clang::ForStmt"), Some("ForStmtBits")),
    LayoutEntry::new("GotoStmtClass", Some("clang::GotoStmt"), Some("GotoStmtBits")),
    LayoutEntry::new("IndirectGotoStmtClass", Some("clang::IndirectGotoStmt"), Some("GotoStmtBits")),
    LayoutEntry::new("ContinueStmtClass", Some("clang::ContinueStmt"), Some("ContinueStmtBits")),
    LayoutEntry::new("BreakStmtClass", Some("clang::BreakStmt"), Some("BreakStmtBits")),
    LayoutEntry::new("ReturnStmtClass", Some("clang::ReturnStmt"), Some("ReturnStmtBits")),
    LayoutEntry::new("DeclStmtClass", Some("clang::DeclStmt"), None),
    LayoutEntry::new("CaseStmtClass", Some("clang::CaseStmt"), Some("SwitchCaseBits")),
    LayoutEntry::new("DefaultStmtClass", Some("clang::DefaultStmt"), Some("SwitchCaseBits")),
    LayoutEntry::new("CapturedStmtClass", Some("clang::CapturedStmt"), None),
    // value statements
    LayoutEntry::new("AttributedStmtClass", Some("clang::AttributedStmt"), Some("AttributedStmtBits")),
    // asm statements
    LayoutEntry::new("GCCAsmStmtClass", Some("clang::GCCAsmStmt"), None),
    LayoutEntry::new("MSAsmStmtClass", Some("clang::MSAsmStmt"), None),
    // Objective-C statements
    LayoutEntry::new("ObjCAtTryStmtClass", Some("clang::ObjCAtTryStmt"), None),
    LayoutEntry::new("ObjCAtCatchStmtClass", Some("clang::ObjCAtCatchStmt"), None),
    LayoutEntry::new("ObjCAtFinallyStmtClass", Some("clang::ObjCAtFinallyStmt"), None),
    LayoutEntry::new("ObjCAtThrowStmtClass", Some("clang::ObjCAtThrowStmt"), None),
    LayoutEntry::new("ObjCAtSynchronizedStmtClass", Some("clang::ObjCAtSynchronizedStmt"), None),
    LayoutEntry::new("ObjCForCollectionStmtClass", Some("clang::ObjCForCollectionStmt"), None),
    LayoutEntry::new("ObjCAutoreleasePoolStmtClass", Some("clang::ObjCAutoreleasePoolStmt"), None),
    // C++ statements
    LayoutEntry::new("CXXCatchStmtClass", Some("clang::CXXCatchStmt"), None),
    LayoutEntry::new("CXXTryStmtClass", Some("clang::CXXTryStmt"), None),
    LayoutEntry::new("CXXForRangeStmtClass", Some("clang::CXXForRangeStmt"), None),
    // coroutine statements
    LayoutEntry::new("CoroutineBodyStmtClass", Some("clang::CoroutineBodyStmt"), None),
    LayoutEntry::new("CoreturnStmtClass", Some("clang::CoreturnStmt"), None),
    LayoutEntry::new("SYCLKernelCallStmtClass", Some("clang::SYCLKernelCallStmt"), None),
    // expressions
    LayoutEntry::new("PredefinedExprClass", Some("clang::PredefinedExpr"), Some("PredefinedExprBits")),
    LayoutEntry::new("SYCLUniqueStableNameExprClass", Some("clang::SYCLUniqueStableNameExpr"), None),
    LayoutEntry::new("DeclRefExprClass", Some("clang::DeclRefExpr"), Some("DeclRefExprBits")),
    LayoutEntry::new("IntegerLiteralClass", Some("clang::IntegerLiteral"), None),
    LayoutEntry::new("FixedPointLiteralClass", Some("clang::FixedPointLiteral"), None),
    LayoutEntry::new("FloatingLiteralClass", Some("clang::FloatingLiteral"), Some("FloatingLiteralBits")),
    LayoutEntry::new("ImaginaryLiteralClass", Some("clang::ImaginaryLiteral"), None),
    LayoutEntry::new("StringLiteralClass", Some("clang::StringLiteral"), Some("StringLiteralBits")),
    LayoutEntry::new("CharacterLiteralClass", Some("clang::CharacterLiteral"), Some("CharacterLiteralBits")),
    LayoutEntry::new("ParenExprClass", Some("clang::ParenExpr"), None),
    LayoutEntry::new("UnaryOperatorClass", Some("clang::UnaryOperator"), Some("UnaryOperatorBits")),
    LayoutEntry::new("OffsetOfExprClass", Some("clang::OffsetOfExpr"), None),
    LayoutEntry::new("UnaryExprOrTypeTraitExprClass", Some("clang::UnaryExprOrTypeTraitExpr"), Some("UnaryExprOrTypeTraitExprBits")),
    LayoutEntry::new("ArraySubscriptExprClass", Some("clang::ArraySubscriptExpr"), Some("ArrayOrMatrixSubscriptExprBits")),
    LayoutEntry::new("MatrixSubscriptExprClass", Some("clang::MatrixSubscriptExpr"), Some("ArrayOrMatrixSubscriptExprBits")),
    LayoutEntry::new("OMPIteratorExprClass", Some("clang::OMPIteratorExpr"), None),
    LayoutEntry::new("CallExprClass", Some("clang::CallExpr"), Some("CallExprBits")),
    LayoutEntry::new("MemberExprClass", Some("clang::MemberExpr"), Some("MemberExprBits")),
    LayoutEntry::new("BinaryOperatorClass", Some("clang::BinaryOperator"), Some("BinaryOperatorBits")),
    LayoutEntry::new("CompoundAssignOperatorClass", Some("clang::CompoundAssignOperator"), Some("BinaryOperatorBits")),
    LayoutEntry::new("ConditionalOperatorClass", Some("clang::ConditionalOperator"), None),
    LayoutEntry::new("BinaryConditionalOperatorClass", Some("clang::BinaryConditionalOperator"), None),
    LayoutEntry::new("ImplicitCastExprClass", Some("clang::ImplicitCastExpr"), Some("CastExprBits")),
    LayoutEntry::new("CStyleCastExprClass", Some("clang::CStyleCastExpr"), Some("CastExprBits")),
    LayoutEntry::new("OMPArrayShapingExprClass", Some("clang::OMPArrayShapingExpr"), None),
    LayoutEntry::new("CompoundLiteralExprClass", Some("clang::CompoundLiteralExpr"), None),
    LayoutEntry::new("ExtVectorElementExprClass", Some("clang::ExtVectorElementExpr"), None),
    LayoutEntry::new("InitListExprClass", Some("clang::InitListExpr"), Some("InitListExprBits")),
    LayoutEntry::new("DesignatedInitExprClass", Some("clang::DesignatedInitExpr"), None),
    LayoutEntry::new("DesignatedInitUpdateExprClass", Some("clang::DesignatedInitUpdateExpr"), None),
    LayoutEntry::new("ImplicitValueInitExprClass", Some("clang::ImplicitValueInitExpr"), None),
    LayoutEntry::new("NoInitExprClass", Some("clang::NoInitExpr"), None),
    LayoutEntry::new("ArrayInitLoopExprClass", Some("clang::ArrayInitLoopExpr"), None),
    LayoutEntry::new("ArrayInitIndexExprClass", Some("clang::ArrayInitIndexExpr"), None),
    LayoutEntry::new("ParenListExprClass", Some("clang::ParenListExpr"), Some("ParenListExprBits")),
    LayoutEntry::new("VAArgExprClass", Some("clang::VAArgExpr"), None),
    LayoutEntry::new("GenericSelectionExprClass", Some("clang::GenericSelectionExpr"), Some("GenericSelectionExprBits")),
    LayoutEntry::new("PseudoObjectExprClass", Some("clang::PseudoObjectExpr"), Some("PseudoObjectExprBits")),
    LayoutEntry::new("SourceLocExprClass", Some("clang::SourceLocExpr"), Some("SourceLocExprBits")),
    LayoutEntry::new("EmbedExprClass", Some("clang::EmbedExpr"), None),
    LayoutEntry::new("ArraySectionExprClass", Some("clang::ArraySectionExpr"), None),
    // wrapper expressions
    LayoutEntry::new("ConstantExprClass", Some("clang::ConstantExpr"), Some("ConstantExprBits")),
    // atomic expressions
    LayoutEntry::new("AtomicExprClass", Some("clang::AtomicExpr"), None),
    // GNU extensions
    LayoutEntry::new("AddrLabelExprClass", Some("clang::AddrLabelExpr"), None),
    LayoutEntry::new("StmtExprClass", Some("clang::StmtExpr"), Some("StmtExprBits")),
    LayoutEntry::new("ChooseExprClass", Some("clang::ChooseExpr"), None),
    LayoutEntry::new("GNUNullExprClass", Some("clang::GNUNullExpr"), None),
    // C++ expressions
    LayoutEntry::new("CXXOperatorCallExprClass", Some("clang::CXXOperatorCallExpr"), Some("CXXOperatorCallExprBits")),
    LayoutEntry::new("CXXMemberCallExprClass", Some("clang::CXXMemberCallExpr"), Some("CallExprBits")),
    LayoutEntry::new("CXXRewrittenBinaryOperatorClass", Some("clang::CXXRewrittenBinaryOperator"), Some("CXXRewrittenBinaryOperatorBits")),
    LayoutEntry::new("CXXStaticCastExprClass", Some("clang::CXXStaticCastExpr"), Some("CastExprBits")),
    LayoutEntry::new("CXXDynamicCastExprClass", Some("clang::CXXDynamicCastExpr"), Some("CastExprBits")),
    LayoutEntry::new("CXXReinterpretCastExprClass", Some("clang::CXXReinterpretCastExpr"), Some("CastExprBits")),
    LayoutEntry::new("CXXConstCastExprClass", Some("clang::CXXConstCastExpr"), Some("CastExprBits")),
    LayoutEntry::new("CXXAddrspaceCastExprClass", Some("clang::CXXAddrspaceCastExpr"), Some("CastExprBits")),
    LayoutEntry::new("CXXFunctionalCastExprClass", Some("clang::CXXFunctionalCastExpr"), Some("CastExprBits")),
    LayoutEntry::new("CXXTypeidExprClass", Some("clang::CXXTypeidExpr"), None),
    LayoutEntry::new("UserDefinedLiteralClass", Some("clang::UserDefinedLiteral"), Some("CallExprBits")),
    LayoutEntry::new("CXXBoolLiteralExprClass", Some("clang::CXXBoolLiteralExpr"), Some("CXXBoolLiteralExprBits")),
    LayoutEntry::new("CXXNullPtrLiteralExprClass", Some("clang::CXXNullPtrLiteralExpr"), Some("CXXNullPtrLiteralExprBits")),
    LayoutEntry::new("CXXThisExprClass", Some("clang::CXXThisExpr"), Some("CXXThisExprBits")),
    LayoutEntry::new("CXXThrowExprClass", Some("clang::CXXThrowExpr"), Some("CXXThrowExprBits")),
    LayoutEntry::new("CXXDefaultArgExprClass", Some("clang::CXXDefaultArgExpr"), Some("CXXDefaultArgExprBits")),
    LayoutEntry::new("CXXDefaultInitExprClass", Some("clang::CXXDefaultInitExpr"), Some("CXXDefaultInitExprBits")),
    LayoutEntry::new("CXXScalarValueInitExprClass", Some("clang::CXXScalarValueInitExpr"), Some("CXXScalarValueInitExprBits")),
    LayoutEntry::new("CXXStdInitializerListExprClass", Some("clang::CXXStdInitializerListExpr"), None),
    LayoutEntry::new("CXXNewExprClass", Some("clang::CXXNewExpr"), Some("CXXNewExprBits")),
    LayoutEntry::new("CXXDeleteExprClass", Some("clang::CXXDeleteExpr"), Some("CXXDeleteExprBits")),
    LayoutEntry::new("CXXPseudoDestructorExprClass", Some("clang::CXXPseudoDestructorExpr"), None),
    LayoutEntry::new("TypeTraitExprClass", Some("clang::TypeTraitExpr"), Some("TypeTraitExprBits")),
    LayoutEntry::new("ArrayTypeTraitExprClass", Some("clang::ArrayTypeTraitExpr"), None),
    LayoutEntry::new("ExpressionTraitExprClass", Some("clang::ExpressionTraitExpr"), None),
    LayoutEntry::new("DependentScopeDeclRefExprClass", Some("clang::DependentScopeDeclRefExpr"), Some("DependentScopeDeclRefExprBits")),
    LayoutEntry::new("CXXConstructExprClass", Some("clang::CXXConstructExpr"), Some("CXXConstructExprBits")),
    LayoutEntry::new("CXXInheritedCtorInitExprClass", Some("clang::CXXInheritedCtorInitExpr"), None),
    LayoutEntry::new("CXXBindTemporaryExprClass", Some("clang::CXXBindTemporaryExpr"), None),
    LayoutEntry::new("ExprWithCleanupsClass", Some("clang::ExprWithCleanups"), Some("ExprWithCleanupsBits")),
    LayoutEntry::new("CXXTemporaryObjectExprClass", Some("clang::CXXTemporaryObjectExpr"), Some("CXXConstructExprBits")),
    LayoutEntry::new("CXXUnresolvedConstructExprClass", Some("clang::CXXUnresolvedConstructExpr"), Some("CXXUnresolvedConstructExprBits")),
    LayoutEntry::new("CXXDependentScopeMemberExprClass", Some("clang::CXXDependentScopeMemberExpr"), Some("CXXDependentScopeMemberExprBits")),
    LayoutEntry::new("UnresolvedLookupExprClass", Some("clang::UnresolvedLookupExpr"), Some("UnresolvedLookupExprBits")),
    LayoutEntry::new("UnresolvedMemberExprClass", Some("clang::UnresolvedMemberExpr"), Some("UnresolvedMemberExprBits")),
    LayoutEntry::new("CXXNoexceptExprClass", Some("clang::CXXNoexceptExpr"), Some("CXXNoexceptExprBits")),
    LayoutEntry::new("PackExpansionExprClass", Some("clang::PackExpansionExpr"), None),
    LayoutEntry::new("SizeOfPackExprClass", Some("clang::SizeOfPackExpr"), None),
    LayoutEntry::new("PackIndexingExprClass", Some("clang::PackIndexingExpr"), None),
    LayoutEntry::new("SubstNonTypeTemplateParmExprClass", Some("clang::SubstNonTypeTemplateParmExpr"), Some("SubstNonTypeTemplateParmExprBits")),
    LayoutEntry::new("SubstNonTypeTemplateParmPackExprClass", Some("clang::SubstNonTypeTemplateParmPackExpr"), None),
    LayoutEntry::new("FunctionParmPackExprClass", Some("clang::FunctionParmPackExpr"), None),
    LayoutEntry::new("MaterializeTemporaryExprClass", Some("clang::MaterializeTemporaryExpr"), None),
    LayoutEntry::new("LambdaExprClass", Some("clang::LambdaExpr"), Some("LambdaExprBits")),
    LayoutEntry::new("CXXFoldExprClass", Some("clang::CXXFoldExpr"), None),
    LayoutEntry::new("CXXParenListInitExprClass", Some("clang::CXXParenListInitExpr"), None),
    // coroutine expressions
    LayoutEntry::new("CoawaitExprClass", Some("clang::CoawaitExpr"), Some("CoawaitBits")),
    LayoutEntry::new("DependentCoawaitExprClass", Some("clang::DependentCoawaitExpr"), None),
    LayoutEntry::new("CoyieldExprClass", Some("clang::CoyieldExpr"), None),
    // concepts
    LayoutEntry::new("ConceptSpecializationExprClass", Some("clang::ConceptSpecializationExpr"), None),
    LayoutEntry::new("RequiresExprClass", Some("clang::RequiresExpr"), Some("RequiresExprBits")),
    // Objective-C expressions
    LayoutEntry::new("ObjCStringLiteralClass", Some("clang::ObjCStringLiteral"), None),
    LayoutEntry::new("ObjCBoxedExprClass", Some("clang::ObjCBoxedExpr"), None),
    LayoutEntry::new("ObjCArrayLiteralClass", Some("clang::ObjCArrayLiteral"), None),
    LayoutEntry::new("ObjCDictionaryLiteralClass", Some("clang::ObjCDictionaryLiteral"), None),
    LayoutEntry::new("ObjCEncodeExprClass", Some("clang::ObjCEncodeExpr"), None),
    LayoutEntry::new("ObjCMessageExprClass", Some("clang::ObjCMessageExpr"), None),
    LayoutEntry::new("ObjCSelectorExprClass", Some("clang::ObjCSelectorExpr"), None),
    LayoutEntry::new("ObjCProtocolExprClass", Some("clang::ObjCProtocolExpr"), None),
    LayoutEntry::new("ObjCIvarRefExprClass", Some("clang::ObjCIvarRefExpr"), None),
    LayoutEntry::new("ObjCPropertyRefExprClass", Some("clang::ObjCPropertyRefExpr"), None),
    LayoutEntry::new("ObjCIsaExprClass", Some("clang::ObjCIsaExpr"), None),
    LayoutEntry::new("ObjCIndirectCopyRestoreExprClass", Some("clang::ObjCIndirectCopyRestoreExpr"), Some("ObjCIndirectCopyRestoreExprBits")),
    LayoutEntry::new("ObjCBoolLiteralExprClass", Some("clang::ObjCBoolLiteralExpr"), None),
    LayoutEntry::new("ObjCSubscriptRefExprClass", Some("clang::ObjCSubscriptRefExpr"), None),
    LayoutEntry::new("ObjCAvailabilityCheckExprClass", Some("clang::ObjCAvailabilityCheckExpr"), None),
    // Objective-C ARC
    LayoutEntry::new("ObjCBridgedCastExprClass", Some("clang::ObjCBridgedCastExpr"), Some("CastExprBits")),
    // CUDA
    LayoutEntry::new("CUDAKernelCallExprClass", Some("clang::CUDAKernelCallExpr"), Some("CallExprBits")),
    // clang extensions
    LayoutEntry::new("ShuffleVectorExprClass", Some("clang::ShuffleVectorExpr"), None),
    LayoutEntry::new("ConvertVectorExprClass", Some("clang::ConvertVectorExpr"), None),
    LayoutEntry::new("BlockExprClass", Some("clang::BlockExpr"), None),
    LayoutEntry::new("OpaqueValueExprClass", Some("clang::OpaqueValueExpr"), Some("OpaqueValueExprBits")),
    LayoutEntry::new("TypoExprClass", Some("clang::TypoExpr"), None),
    LayoutEntry::new("RecoveryExprClass", Some("clang::RecoveryExpr"), None),
    LayoutEntry::new("BuiltinBitCastExprClass", Some("clang::BuiltinBitCastExpr"), Some("CastExprBits")),
    // Microsoft extensions
    LayoutEntry::new("MSPropertyRefExprClass", Some("clang::MSPropertyRefExpr"), None),
    LayoutEntry::new("MSPropertySubscriptExprClass", Some("clang::MSPropertySubscriptExpr"), None),
    LayoutEntry::new("CXXUuidofExprClass", Some("clang::CXXUuidofExpr"), None),
    LayoutEntry::new("SEHTryStmtClass", Some("clang::SEHTryStmt"), None),
    LayoutEntry::new("SEHExceptStmtClass", Some("clang::SEHExceptStmt"), None),
    LayoutEntry::new("SEHFinallyStmtClass", Some("clang::SEHFinallyStmt"), None),
    LayoutEntry::new("SEHLeaveStmtClass", Some("clang::SEHLeaveStmt"), None),
    LayoutEntry::new("MSDependentExistsStmtClass", Some("clang::MSDependentExistsStmt"), None),
    // OpenCL
    LayoutEntry::new("AsTypeExprClass", Some("clang::AsTypeExpr"), None),
    LayoutEntry::new("HLSLOutArgExprClass", Some("clang::HLSLOutArgExpr"), None),
    LayoutEntry::new("OpenACCAsteriskSizeExprClass", Some("clang::OpenACCAsteriskSizeExpr"), None),
    // OpenMP directives
    LayoutEntry::new("OMPCanonicalLoopClass", Some("clang::OMPCanonicalLoop"), None),
    LayoutEntry::new("OMPMetaDirectiveClass", Some("clang::OMPMetaDirective"), None),
    LayoutEntry::new("OMPParallelDirectiveClass", Some("clang::OMPParallelDirective"), None),
    LayoutEntry::new("OMPSimdDirectiveClass", Some("clang::OMPSimdDirective"), None),
    LayoutEntry::new("OMPTileDirectiveClass", Some("clang::OMPTileDirective"), None),
    LayoutEntry::new("OMPUnrollDirectiveClass", Some("clang::OMPUnrollDirective"), None),
    LayoutEntry::new("OMPReverseDirectiveClass", Some("clang::OMPReverseDirective"), None),
    LayoutEntry::new("OMPInterchangeDirectiveClass", Some("clang::OMPInterchangeDirective"), None),
    LayoutEntry::new("OMPForDirectiveClass", Some("clang::OMPForDirective"), None),
    LayoutEntry::new("OMPForSimdDirectiveClass", Some("clang::OMPForSimdDirective"), None),
    LayoutEntry::new("OMPSectionsDirectiveClass", Some("clang::OMPSectionsDirective"), None),
    LayoutEntry::new("OMPSectionDirectiveClass", Some("clang::OMPSectionDirective"), None),
    LayoutEntry::new("OMPSingleDirectiveClass", Some("clang::OMPSingleDirective"), None),
    LayoutEntry::new("OMPMasterDirectiveClass", Some("clang::OMPMasterDirective"), None),
    LayoutEntry::new("OMPCriticalDirectiveClass", Some("clang::OMPCriticalDirective"), None),
    LayoutEntry::new("OMPParallelForDirectiveClass", Some("clang::OMPParallelForDirective"), None),
    LayoutEntry::new("OMPParallelForSimdDirectiveClass", Some("clang::OMPParallelForSimdDirective"), None),
    LayoutEntry::new("OMPParallelMasterDirectiveClass", Some("clang::OMPParallelMasterDirective"), None),
    LayoutEntry::new("OMPParallelSectionsDirectiveClass", Some("clang::OMPParallelSectionsDirective"), None),
    LayoutEntry::new("OMPTaskDirectiveClass", Some("clang::OMPTaskDirective"), None),
    LayoutEntry::new("OMPTaskyieldDirectiveClass", Some("clang::OMPTaskyieldDirective"), None),
    LayoutEntry::new("OMPBarrierDirectiveClass", Some("clang::OMPBarrierDirective"), None),
    LayoutEntry::new("OMPTaskwaitDirectiveClass", Some("clang::OMPTaskwaitDirective"), None),
    LayoutEntry::new("OMPTaskgroupDirectiveClass", Some("clang::OMPTaskgroupDirective"), None),
    LayoutEntry::new("OMPFlushDirectiveClass", Some("clang::OMPFlushDirective"), None),
    LayoutEntry::new("OMPDepobjDirectiveClass", Some("clang::OMPDepobjDirective"), None),
    LayoutEntry::new("OMPScanDirectiveClass", Some("clang::OMPScanDirective"), None),
    LayoutEntry::new("OMPOrderedDirectiveClass", Some("clang::OMPOrderedDirective"), None),
    LayoutEntry::new("OMPAtomicDirectiveClass", Some("clang::OMPAtomicDirective"), None),
    LayoutEntry::new("OMPTargetDirectiveClass", Some("clang::OMPTargetDirective"), None),
    LayoutEntry::new("OMPTargetDataDirectiveClass", Some("clang::OMPTargetDataDirective"), None),
    LayoutEntry::new("OMPTargetEnterDataDirectiveClass", Some("clang::OMPTargetEnterDataDirective"), None),
    LayoutEntry::new("OMPTargetExitDataDirectiveClass", Some("clang::OMPTargetExitDataDirective"), None),
    LayoutEntry::new("OMPTargetParallelDirectiveClass", Some("clang::OMPTargetParallelDirective"), None),
    LayoutEntry::new("OMPTargetParallelForDirectiveClass", Some("clang::OMPTargetParallelForDirective"), None),
    LayoutEntry::new("OMPTargetUpdateDirectiveClass", Some("clang::OMPTargetUpdateDirective"), None),
    LayoutEntry::new("OMPTeamsDirectiveClass", Some("clang::OMPTeamsDirective"), None),
    LayoutEntry::new("OMPCancellationPointDirectiveClass", Some("clang::OMPCancellationPointDirective"), None),
    LayoutEntry::new("OMPCancelDirectiveClass", Some("clang::OMPCancelDirective"), None),
    LayoutEntry::new("OMPScopeDirectiveClass", Some("clang::OMPScopeDirective"), None),
    LayoutEntry::new("OMPTaskLoopDirectiveClass", Some("clang::OMPTaskLoopDirective"), None),
    LayoutEntry::new("OMPTaskLoopSimdDirectiveClass", Some("clang::OMPTaskLoopSimdDirective"), None),
    LayoutEntry::new("OMPMasterTaskLoopDirectiveClass", Some("clang::OMPMasterTaskLoopDirective"), None),
    LayoutEntry::new("OMPMasterTaskLoopSimdDirectiveClass", Some("clang::OMPMasterTaskLoopSimdDirective"), None),
    LayoutEntry::new("OMPParallelMasterTaskLoopDirectiveClass", Some("clang::OMPParallelMasterTaskLoopDirective"), None),
    LayoutEntry::new("OMPParallelMasterTaskLoopSimdDirectiveClass", Some("clang::OMPParallelMasterTaskLoopSimdDirective"), None),
    LayoutEntry::new("OMPMaskedTaskLoopDirectiveClass", Some("clang::OMPMaskedTaskLoopDirective"), None),
    LayoutEntry::new("OMPMaskedTaskLoopSimdDirectiveClass", Some("clang::OMPMaskedTaskLoopSimdDirective"), None),
    LayoutEntry::new("OMPParallelMaskedTaskLoopDirectiveClass", Some("clang::OMPParallelMaskedTaskLoopDirective"), None),
    LayoutEntry::new("OMPParallelMaskedTaskLoopSimdDirectiveClass", Some("clang::OMPParallelMaskedTaskLoopSimdDirective"), None),
    LayoutEntry::new("OMPDistributeDirectiveClass", Some("clang::OMPDistributeDirective"), None),
    LayoutEntry::new("OMPDistributeParallelForDirectiveClass", Some("clang::OMPDistributeParallelForDirective"), None),
    LayoutEntry::new("OMPDistributeParallelForSimdDirectiveClass", Some("clang::OMPDistributeParallelForSimdDirective"), None),
    LayoutEntry::new("OMPDistributeSimdDirectiveClass", Some("clang::OMPDistributeSimdDirective"), None),
    LayoutEntry::new("OMPTargetParallelForSimdDirectiveClass", Some("clang::OMPTargetParallelForSimdDirective"), None),
    LayoutEntry::new("OMPTargetSimdDirectiveClass", Some("clang::OMPTargetSimdDirective"), None),
    LayoutEntry::new("OMPTeamsDistributeDirectiveClass", Some("clang::OMPTeamsDistributeDirective"), None),
    LayoutEntry::new("OMPTeamsDistributeSimdDirectiveClass", Some("clang::OMPTeamsDistributeSimdDirective"), None),
    LayoutEntry::new("OMPTeamsDistributeParallelForSimdDirectiveClass", Some("clang::OMPTeamsDistributeParallelForSimdDirective"), None),
    LayoutEntry::new("OMPTeamsDistributeParallelForDirectiveClass", Some("clang::OMPTeamsDistributeParallelForDirective"), None),
    LayoutEntry::new("OMPTargetTeamsDirectiveClass", Some("clang::OMPTargetTeamsDirective"), None),
    LayoutEntry::new("OMPTargetTeamsDistributeDirectiveClass", Some("clang::OMPTargetTeamsDistributeDirective"), None),
    LayoutEntry::new("OMPTargetTeamsDistributeParallelForDirectiveClass", Some("clang::OMPTargetTeamsDistributeParallelForDirective"), None),
    LayoutEntry::new("OMPTargetTeamsDistributeParallelForSimdDirectiveClass", Some("clang::OMPTargetTeamsDistributeParallelForSimdDirective"), None),
    LayoutEntry::new("OMPTargetTeamsDistributeSimdDirectiveClass", Some("clang::OMPTargetTeamsDistributeSimdDirective"), None),
    LayoutEntry::new("OMPInteropDirectiveClass", Some("clang::OMPInteropDirective"), None),
    LayoutEntry::new("OMPDispatchDirectiveClass", Some("clang::OMPDispatchDirective"), None),
    LayoutEntry::new("OMPMaskedDirectiveClass", Some("clang::OMPMaskedDirective"), None),
    LayoutEntry::new("OMPParallelMaskedDirectiveClass", Some("clang::OMPParallelMaskedDirective"), None),
    LayoutEntry::new("OMPGenericLoopDirectiveClass", Some("clang::OMPGenericLoopDirective"), None),
    LayoutEntry::new("OMPTeamsGenericLoopDirectiveClass", Some("clang::OMPTeamsGenericLoopDirective"), None),
    LayoutEntry::new("OMPTargetTeamsGenericLoopDirectiveClass", Some("clang::OMPTargetTeamsGenericLoopDirective"), None),
    LayoutEntry::new("OMPParallelGenericLoopDirectiveClass", Some("clang::OMPParallelGenericLoopDirective"), None),
    LayoutEntry::new("OMPTargetParallelGenericLoopDirectiveClass", Some("clang::OMPTargetParallelGenericLoopDirective"), None),
    LayoutEntry::new("OMPErrorDirectiveClass", Some("clang::OMPErrorDirective"), None),
    LayoutEntry::new("OMPAssumeDirectiveClass", Some("clang::OMPAssumeDirective"), None),
    // OpenACC constructs
    LayoutEntry::new("OpenACCComputeConstructClass", Some("clang::OpenACCComputeConstruct"), None),
    LayoutEntry::new("OpenACCLoopConstructClass", Some("clang::OpenACCLoopConstruct"), None),
    LayoutEntry::new("OpenACCCombinedConstructClass", Some("clang::OpenACCCombinedConstruct"), None),
    LayoutEntry::new("OpenACCDataConstructClass", Some("clang::OpenACCDataConstruct"), None),
];

/// `clang::DeclContext` by declaration kind.
///
/// Only declarations that are also contexts appear here, so the table is not
/// exhaustive over `clang::Decl::Kind`. `DeclContext` is a secondary base of
/// those classes, so entries name no derived type.
pub static DECL_KIND_LAYOUT: TaggedUnionLayout = TaggedUnionLayout {
    name: "DeclKind",
    base_type: "clang::DeclContext",
    common_bits: Some("DeclContextBits"),
    discriminant_field: "DeclKind",
    discriminant_enum: "clang::Decl::Kind",
    markers: &[],
    exhaustive: false,
    entries: DECL_KIND_ENTRIES,
};

const DECL_KIND_ENTRIES: &[LayoutEntry] = &[
    LayoutEntry::new("TranslationUnit", None, None),
    LayoutEntry::new("ExternCContext", None, None),
    LayoutEntry::new("Namespace", None, None),
    LayoutEntry::new("LinkageSpec", None, Some("LinkageSpecDeclBits")),
    LayoutEntry::new("Export", None, None),
    LayoutEntry::new("Enum", None, Some("EnumDeclBits")),
    LayoutEntry::new("Record", None, Some("RecordDeclBits")),
    LayoutEntry::new("CXXRecord", None, Some("RecordDeclBits")),
    LayoutEntry::new("ClassTemplateSpecialization", None, Some("RecordDeclBits")),
    LayoutEntry::new("ClassTemplatePartialSpecialization", None, Some("RecordDeclBits")),
    LayoutEntry::new("Function", None, Some("FunctionDeclBits")),
    LayoutEntry::new("CXXMethod", None, Some("FunctionDeclBits")),
    LayoutEntry::new("CXXDestructor", None, Some("FunctionDeclBits")),
    LayoutEntry::new("CXXConversion", None, Some("FunctionDeclBits")),
    LayoutEntry::new("CXXDeductionGuide", None, Some("FunctionDeclBits")),
    LayoutEntry::new("CXXConstructor", None, Some("CXXConstructorDeclBits")),
    LayoutEntry::new("ObjCMethod", None, Some("ObjCMethodDeclBits")),
    LayoutEntry::new("ObjCInterface", None, Some("ObjCContainerDeclBits")),
    LayoutEntry::new("ObjCProtocol", None, Some("ObjCContainerDeclBits")),
    LayoutEntry::new("ObjCCategory", None, Some("ObjCContainerDeclBits")),
    LayoutEntry::new("ObjCCategoryImpl", None, Some("ObjCContainerDeclBits")),
    LayoutEntry::new("ObjCImplementation", None, Some("ObjCContainerDeclBits")),
    LayoutEntry::new("Block", None, Some("BlockDeclBits")),
    LayoutEntry::new("Captured", None, None),
    LayoutEntry::new("OMPDeclareReduction", None, Some("OMPDeclareReductionDeclBits")),
    LayoutEntry::new("OMPDeclareMapper", None, None),
    LayoutEntry::new("RequiresExprBody", None, None),
    LayoutEntry::new("HLSLBuffer", None, None),
    LayoutEntry::new("TopLevelStmt", None, None),
    LayoutEntry::new("OutlinedFunction", None, None),
];

/// Pointee type of `clang::DeclarationName::Ptr` by stored name kind
pub static NAME_KIND_LAYOUT: TaggedUnionLayout = TaggedUnionLayout {
    name: "StoredNameKind",
    base_type: "clang::DeclarationName",
    common_bits: None,
    discriminant_field: "Ptr",
    discriminant_enum: "clang::DeclarationName::StoredNameKind",
    markers: &["PtrMask", "UncommonNameKindOffset"],
    exhaustive: true,
    entries: &[
        LayoutEntry::new("StoredIdentifier", Some("clang::IdentifierInfo"), None),
        LayoutEntry::new("StoredObjCZeroArgSelector", Some("clang::Selector"), None),
        LayoutEntry::new("StoredObjCOneArgSelector", Some("clang::Selector"), None),
        LayoutEntry::new("StoredCXXConstructorName", Some("clang::detail::CXXSpecialNameExtra"), None),
        LayoutEntry::new("StoredCXXDestructorName", Some("clang::detail::CXXSpecialNameExtra"), None),
        LayoutEntry::new("StoredCXXConversionFunctionName", Some("clang::detail::CXXSpecialNameExtra"), None),
        LayoutEntry::new("StoredCXXOperatorName", Some("clang::detail::CXXOperatorIdName"), None),
        LayoutEntry::new("StoredDeclarationNameExtra", Some("clang::detail::DeclarationNameExtra"), None),
    ],
};

/// Every table [`Session::validate_layouts`] checks
pub static BUILTIN_LAYOUTS: [&TaggedUnionLayout; 4] = [
    &TYPE_CLASS_LAYOUT,
    &STMT_CLASS_LAYOUT,
    &DECL_KIND_LAYOUT,
    &NAME_KIND_LAYOUT,
];

/// Findings of [`validate`] for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutReport
{
    pub layout: &'static str,
    /// Whether the discriminant enum exists at all
    pub enum_found: bool,
    /// Enumerators with no table entry (exhaustive tables only)
    pub missing_entries: Vec<String>,
    /// Table entries naming no enumerator
    pub unknown_entries: Vec<&'static str>,
    /// Derived types the type system does not know
    pub missing_types: Vec<&'static str>,
    /// Bits members absent from the base's anonymous union
    pub missing_bits: Vec<&'static str>,
}

impl LayoutReport
{
    pub fn is_clean(&self) -> bool
    {
        self.enum_found
            && self.missing_entries.is_empty()
            && self.unknown_entries.is_empty()
            && self.missing_types.is_empty()
            && self.missing_bits.is_empty()
    }

    /// Log the findings: `debug` when clean, `warn` otherwise.
    pub fn log(&self)
    {
        if self.is_clean() {
            tracing::debug!(layout = self.layout, "layout table matches the target");
            return;
        }
        if !self.enum_found {
            tracing::warn!(layout = self.layout, "discriminant enum not found in the target");
        }
        if !self.missing_entries.is_empty() {
            tracing::warn!(
                layout = self.layout,
                missing = ?self.missing_entries,
                "discriminants without a table entry"
            );
        }
        if !self.unknown_entries.is_empty() {
            tracing::warn!(
                layout = self.layout,
                unknown = ?self.unknown_entries,
                "table entries without an enumerator"
            );
        }
        if !self.missing_types.is_empty() {
            tracing::warn!(layout = self.layout, types = ?self.missing_types, "derived types not found");
        }
        if !self.missing_bits.is_empty() {
            tracing::warn!(layout = self.layout, bits = ?self.missing_bits, "bits members not found");
        }
    }
}

/// Check `layout` against the session's type system.
pub fn validate(session: &Session, layout: &TaggedUnionLayout) -> LayoutReport
{
    let mut report = LayoutReport {
        layout: layout.name,
        enum_found: false,
        missing_entries: Vec::new(),
        unknown_entries: Vec::new(),
        missing_types: Vec::new(),
        missing_bits: Vec::new(),
    };

    if let Some(enum_type) = session.find_type(layout.discriminant_enum) {
        report.enum_found = true;
        if layout.exhaustive {
            report.missing_entries = enum_type
                .enumerators
                .iter()
                .filter(|enumerator| !layout.is_marker(&enumerator.name))
                .filter(|enumerator| layout.lookup(&enumerator.name).is_none())
                .map(|enumerator| enumerator.name.clone())
                .collect();
        }
        report.unknown_entries = layout
            .entries
            .iter()
            .filter(|entry| enum_type.enumerator_by_name(entry.discriminant).is_none())
            .map(|entry| entry.discriminant)
            .collect();
    }

    let derived: BTreeSet<&'static str> = layout.entries.iter().filter_map(|entry| entry.derived_type).collect();
    report.missing_types = derived
        .into_iter()
        .filter(|name| session.find_type(name).is_none())
        .collect();

    let bits: BTreeSet<&'static str> = layout.entries.iter().filter_map(|entry| entry.bits_member).collect();
    if !bits.is_empty() {
        let union_type = session.find_type(&layout.bits_union_type());
        report.missing_bits = bits
            .into_iter()
            .filter(|name| !union_type.as_ref().is_some_and(|ty| ty.member(name).is_some()))
            .collect();
    }

    report
}

#[cfg(test)]
mod tests
{
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_tables_have_unique_discriminants()
    {
        for layout in BUILTIN_LAYOUTS {
            let mut seen = HashSet::new();
            for entry in layout.entries {
                assert!(seen.insert(entry.discriminant), "{} repeats {}", layout.name, entry.discriminant);
            }
        }
    }

    #[test]
    fn test_derived_types_are_qualified()
    {
        for layout in [&TYPE_CLASS_LAYOUT, &STMT_CLASS_LAYOUT, &NAME_KIND_LAYOUT] {
            for entry in layout.entries {
                let derived = entry.derived_type.unwrap_or_default();
                assert!(derived.starts_with("clang::"), "{}: {derived}", entry.discriminant);
            }
        }
    }

    #[test]
    fn test_markers()
    {
        assert!(STMT_CLASS_LAYOUT.is_marker("firstExprConstant"));
        assert!(STMT_CLASS_LAYOUT.is_marker("NoStmtClass"));
        assert!(TYPE_CLASS_LAYOUT.is_marker("TypeLast"));
        assert!(NAME_KIND_LAYOUT.is_marker("PtrMask"));
        assert!(!STMT_CLASS_LAYOUT.is_marker("IfStmtClass"));
    }
}
