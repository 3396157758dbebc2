//! Integration tests for property types

use reflector_model::{
    BoolKind, PropertyDescriptor, PropertyFlags, PropertyType, ReferenceStrength, ScalarKind,
    TypeId,
};

fn scalar(name: &str, kind: ScalarKind) -> PropertyDescriptor {
    PropertyDescriptor::new(name, PropertyType::Scalar(kind))
}

fn delegate(name: &str, signature: Option<TypeId>) -> PropertyType {
    PropertyType::Delegate {
        name: name.to_string(),
        owner: None,
        signature,
        multicast: true,
    }
}

// =============================================================================
// Structural Matching
// =============================================================================

#[test]
fn bools_match_regardless_of_storage() {
    let native = PropertyType::Bool(BoolKind::Native);
    let bitfield = PropertyType::Bool(BoolKind::Bitfield(8));
    assert!(native.matches(&bitfield));
}

#[test]
fn scalars_must_agree() {
    let int = PropertyType::Scalar(ScalarKind::Int32);
    assert!(int.matches(&PropertyType::Scalar(ScalarKind::Int32)));
    assert!(!int.matches(&PropertyType::Scalar(ScalarKind::Float)));
    assert!(!int.matches(&PropertyType::String));
}

#[test]
fn containers_compare_elements() {
    let ints = PropertyType::array(scalar("A", ScalarKind::Int32)).unwrap();
    let more_ints = PropertyType::array(scalar("B", ScalarKind::Int32)).unwrap();
    let floats = PropertyType::array(scalar("C", ScalarKind::Float)).unwrap();
    assert!(ints.matches(&more_ints));
    assert!(!ints.matches(&floats));

    let map = PropertyType::map(
        PropertyDescriptor::new("Key", PropertyType::Name),
        scalar("Value", ScalarKind::Int32),
    )
    .unwrap();
    assert!(!map.matches(&ints));
}

#[test]
fn delegates_compare_by_signature_once_bound() {
    let bound = TypeId::from_index(4);
    assert!(delegate("FOnHit", Some(bound)).matches(&delegate("FOnStruck", Some(bound))));
    assert!(delegate("FOnHit", None).matches(&delegate("FOnHit", None)));
    assert!(!delegate("FOnHit", None).matches(&delegate("FOnMiss", None)));
}

#[test]
fn object_references_compare_strength() {
    let class = TypeId::from_index(1);
    let strong = PropertyType::Object {
        strength: ReferenceStrength::Strong,
        class,
        meta_class: None,
    };
    let weak = PropertyType::Object {
        strength: ReferenceStrength::Weak,
        class,
        meta_class: None,
    };
    assert!(strong.matches(&strong));
    assert!(!strong.matches(&weak));
}

// =============================================================================
// Container Rules
// =============================================================================

#[test]
fn nested_containers_are_rejected() {
    let inner = PropertyType::array(scalar("X", ScalarKind::Int32)).unwrap();
    let err = PropertyType::array(PropertyDescriptor::new("Inner", inner)).unwrap_err();
    assert_eq!(err.to_string(), "Nested containers are not supported.");
}

#[test]
fn text_is_fine_in_arrays_but_not_sets() {
    assert!(PropertyType::array(PropertyDescriptor::new("T", PropertyType::Text)).is_ok());
    let err = PropertyType::set(PropertyDescriptor::new("T", PropertyType::Text)).unwrap_err();
    assert_eq!(err.to_string(), "FText is not currently supported as an element type.");
}

#[test]
fn interface_keys_are_rejected() {
    let key = PropertyDescriptor::new(
        "Key",
        PropertyType::Interface {
            target: TypeId::from_index(2),
        },
    );
    let err = PropertyType::map(key, scalar("V", ScalarKind::Int32)).unwrap_err();
    assert_eq!(err.to_string(), "UINTERFACEs are not currently supported as key types.");
}

#[test]
fn delegates_cannot_be_elements() {
    let err = PropertyType::array(PropertyDescriptor::new("D", delegate("FOnHit", None))).unwrap_err();
    assert_eq!(err.to_string(), "Delegates are not supported inside containers.");
}

#[test]
fn containers_start_with_propagated_flags() {
    let element = scalar("X", ScalarKind::Int32).with_flags(PropertyFlags::PROPAGATE_FROM_INNER);
    let array = PropertyDescriptor::new("Items", PropertyType::array(element).unwrap());
    assert!(array.flags.contains(PropertyFlags::PROPAGATE_FROM_INNER));
    assert!(array.is_container());
}

#[test]
fn scalar_keywords() {
    assert_eq!(ScalarKind::from_keyword("uint8"), Some(ScalarKind::Byte));
    assert_eq!(ScalarKind::from_keyword("double"), Some(ScalarKind::Double));
    assert_eq!(ScalarKind::from_keyword("Int32"), None);
    assert_eq!(ScalarKind::UInt32.bitfield_bits(), Some(32));
    assert_eq!(ScalarKind::Int32.bitfield_bits(), None);
}
