//! Checks run when a class body closes: property markups that name
//! functions, and conformance with implemented interfaces.

use reflector_foundation::{Error, Result};
use reflector_model::{
    FunctionData, FunctionFlags, PropertyDescriptor, PropertyFlags, PropertyType, ScalarKind,
    TypeGraph, TypeId,
};

/// Returns true if two parameter lists have the same length and their
/// types match positionally.
#[must_use]
pub fn parameters_match(a: &[PropertyDescriptor], b: &[PropertyDescriptor]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.ty.matches(&y.ty))
}

/// Compares two function signatures, return values included.
#[must_use]
pub fn signatures_equal(a: &FunctionData, b: &FunctionData) -> bool {
    let returns_match = match (&a.return_value, &b.return_value) {
        (Some(x), Some(y)) => x.ty.matches(&y.ty),
        (None, None) => true,
        _ => false,
    };
    returns_match && parameters_match(&a.params, &b.params)
}

fn function<'g>(graph: &'g TypeGraph, class: TypeId, name: &str) -> Option<(&'g str, &'g FunctionData)> {
    let id = graph.find_function(class, name, true)?;
    let node = graph.node(id);
    node.as_function().map(|data| (node.name.as_str(), data))
}

/// Verifies the functions named by `ReplicatedUsing`, `BlueprintGetter` and
/// `BlueprintSetter` on the properties of `class`. Each returned message is
/// a rule violation that does not stop the parse.
#[must_use]
pub fn verify_property_markups(graph: &TypeGraph, class: TypeId) -> Vec<String> {
    let mut problems = Vec::new();
    let Some(body) = graph.node(class).body() else {
        return problems;
    };
    for prop in &body.properties {
        if prop.flags.contains(PropertyFlags::REP_NOTIFY) {
            if let Some(callback) = &prop.rep_notify {
                match function(graph, class, callback) {
                    Some((name, data)) => verify_rep_notify(prop, name, data, &mut problems),
                    None => problems.push(format!("Replication notification function {callback} not found")),
                }
            }
        }

        if !prop.flags.contains(PropertyFlags::BLUEPRINT_VISIBLE) {
            continue;
        }
        if let Some(getter) = prop.metadata.get("BlueprintGetter").filter(|g| !g.is_empty()) {
            match function(graph, class, getter) {
                Some((name, data)) => verify_getter(prop, name, data, &mut problems),
                None => problems.push(format!("Blueprint Property getter function {getter} not found")),
            }
        }
        if prop.flags.contains(PropertyFlags::BLUEPRINT_READ_ONLY) {
            continue;
        }
        if let Some(setter) = prop.metadata.get("BlueprintSetter").filter(|s| !s.is_empty()) {
            match function(graph, class, setter) {
                Some((name, data)) => verify_setter(prop, name, data, &mut problems),
                None => problems.push(format!("Blueprint Property setter function {setter} not found")),
            }
        }
    }
    problems
}

fn verify_rep_notify(prop: &PropertyDescriptor, name: &str, data: &FunctionData, problems: &mut Vec<String>) {
    if data.return_value.is_some() {
        problems.push(format!("Replication notification function {name} must not have return value."));
    }
    let is_array = prop.is_static_array() || matches!(prop.ty, PropertyType::Array(_));
    let max_params = if is_array { 2 } else { 1 };
    if data.params.len() > max_params {
        problems.push(format!("Replication notification function {name} has too many parameters."));
    }
    if let Some(first) = data.params.first() {
        if !prop.ty.matches(&first.ty) {
            problems.push(format!(
                "Replication notification function {name} has invalid parameter for property {}. First (optional) parameter must be of type {}.",
                prop.name, prop.cpp_type
            ));
        }
    }
    if let Some(second) = data.params.get(1) {
        let byte_array = matches!(
            &second.ty,
            PropertyType::Array(inner) if inner.ty == PropertyType::Scalar(ScalarKind::Byte)
        );
        let const_ref = second
            .flags
            .contains(PropertyFlags::CONST_PARM | PropertyFlags::REFERENCE_PARM);
        if !byte_array || !const_ref {
            problems.push(format!(
                "Replication notification function {name} (optional) second parameter must be of type 'const TArray<uint8>&'"
            ));
        }
    }
}

fn verify_getter(prop: &PropertyDescriptor, name: &str, data: &FunctionData, problems: &mut Vec<String>) {
    if !data.params.is_empty() {
        problems.push(format!("Blueprint Property getter function {name} must not have parameters."));
    }
    if !data.return_value.as_ref().is_some_and(|ret| prop.ty.matches(&ret.ty)) {
        problems.push(format!(
            "Blueprint Property getter function {name} must have return value of type {}.",
            prop.cpp_type
        ));
    }
    if data.flags.contains(FunctionFlags::EVENT) {
        problems.push("Blueprint Property setter function cannot be a blueprint event.".to_string());
    } else if !data.flags.contains(FunctionFlags::BLUEPRINT_PURE) {
        problems.push("Blueprint Property getter function must be pure.".to_string());
    }
}

fn verify_setter(prop: &PropertyDescriptor, name: &str, data: &FunctionData, problems: &mut Vec<String>) {
    if data.return_value.is_some() {
        problems.push(format!("Blueprint Property setter function {name} must not have a return value."));
    } else if data.params.len() != 1 || !prop.ty.matches(&data.params[0].ty) {
        problems.push(format!(
            "Blueprint Property setter function {name} must have exactly one parameter of type {}.",
            prop.cpp_type
        ));
    }
    if data.flags.contains(FunctionFlags::EVENT) {
        problems.push("Blueprint Property setter function cannot be a blueprint event.".to_string());
    } else if !data.flags.contains(FunctionFlags::BLUEPRINT_CALLABLE) {
        problems.push("Blueprint Property setter function must be blueprint callable.".to_string());
    } else if data.flags.contains(FunctionFlags::BLUEPRINT_PURE) {
        problems.push("Blueprint Property setter function must not be pure.".to_string());
    }
}

/// Checks the functions of `class` against every interface it implements,
/// skipping interface ancestors the class itself derives from.
///
/// # Errors
/// Fails on the first mismatched or missing implementation.
pub fn check_interface_conformance(graph: &TypeGraph, class: TypeId) -> Result<()> {
    let Some(data) = graph.node(class).as_class() else {
        return Ok(());
    };
    for &implemented in &data.interfaces {
        for interface in std::iter::once(implemented).chain(graph.ancestors(implemented)) {
            if graph.is_child_of(class, interface) {
                continue;
            }
            check_interface(graph, class, interface)?;
        }
    }
    Ok(())
}

fn check_interface(graph: &TypeGraph, class: TypeId, interface: TypeId) -> Result<()> {
    let interface_node = graph.node(interface);
    let Some(body) = interface_node.body() else {
        return Ok(());
    };
    let class_name = &graph.node(class).name;
    for &declared in &body.functions {
        let declared_node = graph.node(declared);
        let Some(expected) = declared_node.as_function() else {
            continue;
        };
        let name = declared_node.name.as_str();
        let mut implemented = expected.flags.contains(FunctionFlags::DELEGATE);

        if let Some((_, found)) = function(graph, class, name) {
            implemented = true;
            if expected.flags.contains(FunctionFlags::EVENT) && !found.flags.contains(FunctionFlags::EVENT) {
                return Err(Error::semantic(format!(
                    "Implementation of function '{class_name}::{name}' must be declared as 'event' to match declaration in interface '{}'",
                    interface_node.name
                )));
            }
            if expected.flags.contains(FunctionFlags::DELEGATE) && !found.flags.contains(FunctionFlags::DELEGATE) {
                return Err(Error::semantic(format!(
                    "Implementation of function '{class_name}::{name}' must be declared as 'delegate' to match declaration in interface '{}'",
                    interface_node.name
                )));
            }
            let count = |f: &FunctionData| f.params.len() + usize::from(f.return_value.is_some());
            if count(found) != count(expected) {
                return Err(Error::semantic(format!(
                    "Implementation of function '{name}' conflicts with interface '{}' - different number of parameters ({}/{})",
                    interface_node.name,
                    count(found),
                    count(expected)
                )));
            }
            for (index, (a, b)) in expected.params.iter().zip(&found.params).enumerate() {
                if !a.ty.matches(&b.ty) {
                    return Err(Error::semantic(format!(
                        "Implementation of function '{name}' conflicts with interface '{}' - parameter {index} '{}'",
                        interface_node.name, a.name
                    )));
                }
            }
            if let (Some(a), Some(b)) = (&expected.return_value, &found.return_value) {
                if !a.ty.matches(&b.ty) {
                    return Err(Error::semantic(format!(
                        "Implementation of function '{name}' conflicts only by return type with interface '{}'",
                        interface_node.name
                    )));
                }
            }
        }

        let must_implement = expected.flags.contains(FunctionFlags::BLUEPRINT_CALLABLE)
            && !expected.flags.contains(FunctionFlags::BLUEPRINT_EVENT)
            && !interface_node.metadata.contains("CannotImplementInterfaceInBlueprint");
        if !implemented && must_implement {
            return Err(Error::semantic(format!(
                "Missing UFunction implementation of function '{name}' from interface '{}'.  This function needs a UFUNCTION() declaration.",
                interface_node.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflector_model::BoolKind;

    fn param(name: &str, ty: PropertyType) -> PropertyDescriptor {
        PropertyDescriptor::new(name, ty).with_flags(PropertyFlags::PARM)
    }

    #[test]
    fn parameter_lists_compare_positionally() {
        let a = vec![
            param("A", PropertyType::Scalar(ScalarKind::Int32)),
            param("B", PropertyType::Bool(BoolKind::Native)),
        ];
        let b = vec![
            param("X", PropertyType::Scalar(ScalarKind::Int32)),
            param("Y", PropertyType::Bool(BoolKind::Bitfield(8))),
        ];
        assert!(parameters_match(&a, &b));
        assert!(!parameters_match(&a, &b[..1]));

        let c = vec![
            param("X", PropertyType::Scalar(ScalarKind::Float)),
            param("Y", PropertyType::Bool(BoolKind::Native)),
        ];
        assert!(!parameters_match(&a, &c));
    }

    #[test]
    fn return_values_take_part_in_signature_equality() {
        let mut a = FunctionData::default();
        a.params.push(param("A", PropertyType::Name));
        let mut b = a.clone();
        assert!(signatures_equal(&a, &b));

        b.return_value = Some(param("ReturnValue", PropertyType::String));
        assert!(!signatures_equal(&a, &b));
    }

    #[test]
    fn rep_notify_second_parameter_must_be_byte_array() {
        let prop = PropertyDescriptor::new(
            "Items",
            PropertyType::Array(Box::new(PropertyDescriptor::new("Items", PropertyType::Name))),
        );
        let mut data = FunctionData::default();
        data.params.push(param("Old", prop.ty.clone()));
        data.params.push(param("Changed", PropertyType::Scalar(ScalarKind::Int32)));

        let mut problems = Vec::new();
        verify_rep_notify(&prop, "OnRep_Items", &data, &mut problems);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("second parameter"));
    }

    #[test]
    fn getter_rules() {
        let prop = PropertyDescriptor::new("Health", PropertyType::Scalar(ScalarKind::Float));
        let data = FunctionData {
            flags: FunctionFlags::BLUEPRINT_CALLABLE,
            return_value: Some(param("ReturnValue", PropertyType::Scalar(ScalarKind::Float))),
            ..FunctionData::default()
        };
        let mut problems = Vec::new();
        verify_getter(&prop, "GetHealth", &data, &mut problems);
        assert_eq!(problems, vec!["Blueprint Property getter function must be pure.".to_string()]);
    }

    #[test]
    fn setter_rules() {
        let prop = PropertyDescriptor::new("Health", PropertyType::Scalar(ScalarKind::Float));
        let data = FunctionData {
            flags: FunctionFlags::BLUEPRINT_CALLABLE,
            params: vec![param("Value", PropertyType::Scalar(ScalarKind::Int32))],
            ..FunctionData::default()
        };
        let mut problems = Vec::new();
        verify_setter(&prop, "SetHealth", &data, &mut problems);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("exactly one parameter"));
    }
}
