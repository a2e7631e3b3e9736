//! Property tests: an interface declared from an object's own
//! classification always accepts that object.

use proptest::prelude::*;
use protomix_kernel::{Interface, KernelError, Object, TypeTag, Value, classify};
use serde_json::Value as Json;
use std::collections::BTreeMap;

fn leaf() -> impl Strategy<Value = Json> {
    prop_oneof![
        any::<bool>().prop_map(Json::from),
        (-1000i64..1000).prop_map(Json::from),
        "[a-z]{0,6}".prop_map(Json::from),
        Just(Json::Null),
    ]
}

fn member() -> impl Strategy<Value = Json> {
    leaf().prop_recursive(2, 8, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Json::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..3)
                .prop_map(|map| Json::Object(map.into_iter().collect())),
        ]
    })
}

fn members() -> impl Strategy<Value = BTreeMap<String, Json>> {
    prop::collection::btree_map("[a-z]{1,6}", member(), 0..6)
}

fn build(members: BTreeMap<String, Json>) -> Object {
    Value::from_json(&Json::Object(members.into_iter().collect()))
        .as_object()
        .cloned()
        .expect("json object")
}

fn derive(object: &Object) -> Vec<(String, String)> {
    object
        .own_keys()
        .into_iter()
        .map(|key| {
            let tag = classify(&object.get_own(&key).unwrap_or_default());
            (key, tag.to_string())
        })
        .collect()
}

proptest! {
    #[test]
    fn derived_interface_matches_its_source(members in members()) {
        let object = build(members);
        let interface = Interface::new("derived", derive(&object)).expect("derived interface");
        prop_assert!(interface.matches(&Value::from(object)).is_ok());
    }

    #[test]
    fn derived_interface_matches_through_delegation(members in members()) {
        let base = build(members);
        let interface = Interface::new("derived", derive(&base)).expect("derived interface");
        let composed = Object::create(&base);
        prop_assert!(interface.matches(&Value::from(composed)).is_ok());
    }

    #[test]
    fn undeclared_extra_member_is_reported(members in members(), extra in "[A-Z]{1,4}") {
        let object = build(members);
        let mut declared = derive(&object);
        declared.push((extra.clone(), "string".to_string()));
        let interface = Interface::new("derived", declared).expect("derived interface");

        match interface.matches(&Value::from(object)) {
            Err(KernelError::Validation { property, gotten, .. }) => {
                prop_assert_eq!(property, extra);
                prop_assert_eq!(gotten, TypeTag::Undefined);
            }
            other => prop_assert!(false, "expected a validation error, got {:?}", other),
        }
    }
}
