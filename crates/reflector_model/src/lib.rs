//! Type graph and property model for Reflector.
//!
//! This crate provides:
//! - [`TypeGraph`] - Arena of declared types and their scopes
//! - [`PropertyDescriptor`] - Parsed property types with flags and metadata
//! - [`specifiers`] - Sorted specifier registries and the metadata validator
//! - [`flags`] - Trait flag sets
//! - [`SourceUnit`] - Per-file parse state

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod blueprint;
pub mod flags;
pub mod graph;
pub mod property;
pub mod source_unit;
pub mod specifiers;

pub use blueprint::{is_supported_by_blueprint, is_supported_by_expose_on_spawn};
pub use flags::{
    AccessSpecifier, ClassFlags, EnumFlags, FunctionExportFlags, FunctionFlags, PropertyFlags,
    StructFlags,
};
pub use graph::{
    ClassCategories, ClassData, ConstructorInfo, EnumData, EnumEntry, EnumForm, FunctionData,
    REPLACE_CONVERTED, Scope, ScopeId, ScopeKind, SparseDelegate, StructBody, StructData, TypeGraph, TypeId,
    TypeKind, TypeNode, UnitId, strip_prefix,
};
pub use property::{
    BoolKind, PointerKind, PropertyDescriptor, PropertyType, RefQualifier, ReferenceStrength,
    ScalarKind,
};
pub use source_unit::{PrescannedClass, SourceUnit};
