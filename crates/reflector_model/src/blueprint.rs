//! Which property types the scripting layer can represent.

use crate::graph::TypeGraph;
use crate::property::{PropertyDescriptor, PropertyType, ReferenceStrength, ScalarKind};

/// Returns true if scripting can read and write `prop`.
///
/// Weak references and multicast delegates are only representable as member
/// variables, not as parameters or container elements.
#[must_use]
pub fn is_supported_by_blueprint(
    graph: &TypeGraph,
    prop: &PropertyDescriptor,
    member_variable: bool,
) -> bool {
    match &prop.ty {
        PropertyType::Array(inner) | PropertyType::Set(inner) => {
            is_supported_by_blueprint(graph, inner, false)
        }
        PropertyType::Map { key, value } => {
            is_supported_by_blueprint(graph, key, false)
                && is_supported_by_blueprint(graph, value, false)
        }
        PropertyType::Struct { target } => graph.bool_metadata_hierarchical(*target, "BlueprintType"),
        PropertyType::Scalar(kind) => matches!(
            kind,
            ScalarKind::Int32 | ScalarKind::Int | ScalarKind::Byte | ScalarKind::Float
        ),
        PropertyType::Bool(_)
        | PropertyType::Name
        | PropertyType::String
        | PropertyType::Text
        | PropertyType::Enum { .. }
        | PropertyType::Interface { .. } => true,
        PropertyType::Object { strength, .. } => match strength {
            ReferenceStrength::Strong | ReferenceStrength::Soft => true,
            ReferenceStrength::Weak => member_variable,
            ReferenceStrength::Lazy => false,
        },
        PropertyType::Delegate { multicast, .. } => !multicast || member_variable,
        PropertyType::FieldPath { .. } => false,
    }
}

/// Returns true if `prop` may carry `ExposeOnSpawn`.
#[must_use]
pub fn is_supported_by_expose_on_spawn(graph: &TypeGraph, prop: &PropertyDescriptor) -> bool {
    match &prop.ty {
        PropertyType::Scalar(kind) => matches!(
            kind,
            ScalarKind::Int32 | ScalarKind::Int | ScalarKind::Byte | ScalarKind::Float
        ),
        PropertyType::Enum { underlying, .. } => {
            matches!(underlying, None | Some(ScalarKind::Byte))
        }
        PropertyType::Bool(_)
        | PropertyType::String
        | PropertyType::Text
        | PropertyType::Name
        | PropertyType::Interface { .. } => true,
        PropertyType::Object { strength, .. } => {
            matches!(strength, ReferenceStrength::Strong | ReferenceStrength::Soft)
        }
        PropertyType::Struct { target } => graph.node(*target).metadata.get_bool("BlueprintType"),
        _ => false,
    }
}
