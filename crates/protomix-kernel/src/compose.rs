//! The object composer.
//!
//! A [`Namespace`] owns a mixin table and builds new objects that delegate
//! to a base: optionally applying registered mixins directly onto the new
//! object and then running its `init` method. [`Namespace::enhance`] first
//! deep-merges an overlay into a delegating copy of a template.

use crate::classify::{Classifier, TypeTag};
use crate::error::{KernelError, KernelResult};
use crate::mixin::MixinRegistry;
use crate::value::{Object, Value};

/// Key [`Namespace::enhance`] uses to point a result back at its template.
/// Never merged from an overlay.
pub const BACK_REFERENCE: &str = "_parent";

/// Options for [`Namespace::create`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateSettings {
    /// Registered mixin names, applied in order.
    pub mixins: Vec<String>,
    /// Arguments for the new object's `init`. Must be an array, but only
    /// when an `init` exists to receive them.
    pub args: Option<Value>,
}

impl CreateSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mixin(mut self, name: impl Into<String>) -> Self {
        self.mixins.push(name.into());
        self
    }

    pub fn args(mut self, args: Vec<Value>) -> Self {
        self.args = Some(Value::Array(args));
        self
    }

    /// Read settings from a dynamic value: `undefined`, or an object with
    /// optional own `mixins` (array of strings) and `args`. The shape of
    /// `args` is checked by [`Namespace::create`], once it knows whether the
    /// new object has an `init`.
    pub fn from_value(value: &Value) -> KernelResult<Self> {
        let settings = match value {
            Value::Undefined => return Ok(Self::default()),
            Value::Object(o) => o,
            _ => return Err(KernelError::type_error("create settings must be an object")),
        };

        let mixins: Vec<String> = match settings.get_own("mixins") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        KernelError::type_error(
                            "create settings.mixins must be an array of strings",
                        )
                    })
                })
                .collect::<KernelResult<_>>()?,
            Some(_) => return Err(KernelError::type_error("create mixins must be an array")),
        };

        Ok(Self {
            mixins,
            args: settings.get_own("args"),
        })
    }
}

/// A binding target with its mixin table and classifier.
///
/// Namespaces bound to the same object share one mixin table.
#[derive(Debug, Clone)]
pub struct Namespace {
    target: Object,
    classifier: Classifier,
}

impl Namespace {
    pub fn new() -> Self {
        Self::bind(&Object::new())
    }

    pub fn bind(target: &Object) -> Self {
        Self {
            target: target.clone(),
            classifier: Classifier::default(),
        }
    }

    /// Classifier deciding which overlay values count as plain objects.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn target(&self) -> &Object {
        &self.target
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn mixins(&self) -> MixinRegistry {
        MixinRegistry::for_owner(&self.target)
    }

    /// A new object delegating to `base`.
    pub fn create(&self, base: &Object, settings: &CreateSettings) -> KernelResult<Object> {
        self.compose(Object::create(base), settings)
    }

    /// [`Namespace::create`] over dynamic arguments. A `null` base yields a
    /// root object.
    pub fn create_value(&self, base: &Value, settings: &Value) -> KernelResult<Object> {
        let created = match base {
            Value::Object(base) => Object::create(base),
            Value::Null => Object::new(),
            _ => {
                return Err(KernelError::type_error(
                    "create base must be an object or null",
                ));
            }
        };
        self.compose(created, &CreateSettings::from_value(settings)?)
    }

    fn compose(&self, created: Object, settings: &CreateSettings) -> KernelResult<Object> {
        let mixins = self.mixins().resolve(&settings.mixins)?;
        for mixin in &mixins {
            mixin.apply_to(&created, &[])?;
        }

        if let Some(args) = &settings.args {
            match (created.get("init"), args) {
                (Some(Value::Function(init)), Value::Array(items)) => {
                    init.call(&created, items)?;
                }
                (Some(Value::Function(_)), _) => {
                    return Err(KernelError::type_error(
                        "create settings.args must be an array",
                    ));
                }
                _ => tracing::debug!("no callable init, args ignored"),
            }
        }

        tracing::debug!(mixins = ?settings.mixins, "object created");
        Ok(created)
    }

    /// Deep-merge `overlay` into a delegating copy of `base`, point the
    /// result back at `base`, and hand it to [`Namespace::create`] when
    /// settings are supplied. `base` is never mutated.
    pub fn enhance(
        &self,
        base: &Object,
        overlay: &Object,
        settings: Option<&CreateSettings>,
    ) -> KernelResult<Object> {
        let merged = Object::create(base);
        let mut path = Vec::new();
        self.merge(&merged, overlay, true, &mut path);
        merged.set(BACK_REFERENCE, base.clone());
        tracing::debug!(keys = overlay.own_len(), "template enhanced");

        match settings {
            Some(settings) => self.create(&merged, settings),
            None => Ok(merged),
        }
    }

    fn merge(&self, target: &Object, overlay: &Object, top: bool, path: &mut Vec<usize>) {
        path.push(overlay.addr());
        for key in overlay.own_keys() {
            if top && key == BACK_REFERENCE {
                tracing::debug!(key = BACK_REFERENCE, "reserved overlay key dropped");
                continue;
            }
            let Some(incoming) = overlay.get_own(&key) else {
                continue;
            };

            let nested = match (target.get(&key), &incoming) {
                (Some(Value::Object(current)), Value::Object(patch))
                    if self.is_plain(&current)
                        && self.is_plain(patch)
                        && !path.contains(&patch.addr()) =>
                {
                    Some((current, patch.clone()))
                }
                _ => None,
            };

            match nested {
                Some((current, patch)) => {
                    let copy = Object::create(&current);
                    self.merge(&copy, &patch, false, path);
                    target.set(key, copy);
                }
                None => target.set(key, incoming),
            }
        }
        path.pop();
    }

    fn is_plain(&self, object: &Object) -> bool {
        self.classifier.classify(&Value::from(object.clone())) == TypeTag::Object
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}
