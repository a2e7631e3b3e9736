//! Structural interfaces.
//!
//! An [`Interface`] names a set of properties and the type tag each must
//! classify as. Checking reads every declared property through the value's
//! delegation chain, in declaration order, and stops at the first mismatch.
//!
//! A property declared `undefined` must still exist: reading an absent
//! property also yields `undefined`, so absence is reported as `missing`.

use crate::classify::{Classifier, TypeTag};
use crate::error::{KernelError, KernelResult};
use crate::value::{Function, Object, Value};
use indexmap::IndexMap;
use serde::Serialize;

/// A named structural contract. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interface {
    name: String,
    properties: IndexMap<String, TypeTag>,
}

impl Interface {
    pub fn new<I, K, V>(name: impl Into<String>, properties: I) -> KernelResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(KernelError::type_error(
                "interface name argument must be a non-empty string",
            ));
        }
        let mut declared = IndexMap::new();
        for (key, tag) in properties {
            let key = key.into();
            if key.is_empty() {
                return Err(KernelError::type_error(format!(
                    "interface \"{name}\" property names must be non-empty strings"
                )));
            }
            declared.insert(key, TypeTag::parse(tag.as_ref()));
        }
        Ok(Self {
            name,
            properties: declared,
        })
    }

    /// Build from dynamic values: a string name and an object mapping
    /// property names to type names.
    pub fn from_values(name: &Value, properties: &Value) -> KernelResult<Self> {
        let name = name
            .as_str()
            .ok_or_else(|| KernelError::type_error("interface name argument must be a string"))?;
        let object = properties.as_object().ok_or_else(|| {
            KernelError::type_error("interface properties argument must be an object")
        })?;

        let mut declared = Vec::new();
        for key in object.own_keys() {
            match object.get_own(&key) {
                Some(Value::String(tag)) => declared.push((key, tag)),
                other => {
                    let given = Classifier::default().classify(&other.unwrap_or_default());
                    return Err(KernelError::type_error(format!(
                        "interface properties argument can only contain strings, {given} given"
                    )));
                }
            }
        }
        Self::new(name, declared)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &TypeTag)> {
        self.properties.iter().map(|(key, tag)| (key.as_str(), tag))
    }

    pub fn expected(&self, property: &str) -> Option<&TypeTag> {
        self.properties.get(property)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Check `value` with the default classifier.
    pub fn matches(&self, value: &Value) -> KernelResult<()> {
        self.matches_with(&Classifier::default(), value)
    }

    pub fn matches_with(&self, classifier: &Classifier, value: &Value) -> KernelResult<()> {
        let object = match value {
            Value::Undefined | Value::Null => {
                return Err(KernelError::type_error(format!(
                    "cannot check the \"{}\" interface against {}",
                    self.name,
                    classifier.classify(value)
                )));
            }
            Value::Object(object) => Some(object),
            _ => None,
        };

        for (property, expected) in &self.properties {
            let read = object
                .and_then(|o| o.get(property))
                .unwrap_or(Value::Undefined);
            let mut gotten = classifier.classify(&read);
            if *expected == TypeTag::Undefined
                && !object.is_some_and(|o| o.has_property(property))
            {
                gotten = TypeTag::Missing;
            }
            if gotten != *expected {
                return Err(KernelError::Validation {
                    interface: self.name.clone(),
                    property: property.clone(),
                    gotten,
                    expected: expected.clone(),
                });
            }
        }

        tracing::trace!(interface = %self.name, "interface matched");
        Ok(())
    }

    fn store_on(&self, receiver: &Object) {
        let properties: Object = self
            .properties
            .iter()
            .map(|(key, tag)| (key.clone(), tag.as_str().to_string()))
            .collect();
        receiver.set("name", self.name.clone());
        receiver.set("properties", properties);
    }

    fn read_from(receiver: &Object) -> KernelResult<Self> {
        let name = receiver.get("name").unwrap_or_default();
        let properties = receiver.get("properties").unwrap_or_default();
        let initialised =
            name.as_str().is_some_and(|n| !n.is_empty()) && properties.as_object().is_some();
        if !initialised {
            return Err(KernelError::Init(
                "matches called on a non-initialised interface".to_string(),
            ));
        }
        Self::from_values(&name, &properties)
    }
}

/// A composable interface template.
///
/// Objects created from it (e.g. through `Namespace::create` with
/// `args: [name, properties]`) get an interface from `init` and check
/// values with `matches`, which returns `true` or fails.
pub fn template() -> Object {
    let template = Object::new();
    template.set(
        "init",
        Function::new("init", |this, args| {
            let name = args.first().cloned().unwrap_or_default();
            let properties = args.get(1).cloned().unwrap_or_default();
            Interface::from_values(&name, &properties)?.store_on(this);
            Ok(Value::Undefined)
        }),
    );
    template.set(
        "matches",
        Function::new("matches", |this, args| {
            let interface = Interface::read_from(this)?;
            interface.matches(args.first().unwrap_or(&Value::Undefined))?;
            Ok(Value::Bool(true))
        }),
    );
    template
}
