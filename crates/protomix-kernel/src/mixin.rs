//! Per-namespace mixin registries.
//!
//! A mixin is a named function that adds properties to whatever receiver it
//! runs on. Each namespace object owns one ordered mixin table; the tables
//! live in a thread-local [`IdentityStore`] keyed on the namespace object, so
//! the namespace itself never carries the table as a property.

use crate::error::{KernelError, KernelResult};
use crate::identity::IdentityStore;
use crate::value::{Function, Object, Value};
use indexmap::IndexMap;
use std::cell::RefCell;

type MixinTable = IndexMap<String, Mixin>;

thread_local! {
    static MIXIN_TABLES: RefCell<IdentityStore<MixinTable>> = RefCell::new(IdentityStore::new());
}

/// Run `f` on the mixin table of `owner`.
///
/// `f` must not call back into any registry; mixins are cloned out before
/// they run.
fn with_table<T>(owner: &Object, f: impl FnOnce(&mut MixinTable) -> T) -> T {
    MIXIN_TABLES.with(|store| store.borrow_mut().with_record(owner, f))
}

/// Number of namespace objects on this thread that still own a mixin table.
#[cfg(test)]
fn live_tables() -> usize {
    MIXIN_TABLES.with(|store| store.borrow().len())
}

/// A registered capability fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Mixin(Function);

impl Mixin {
    pub fn new(function: Function) -> Self {
        Self(function)
    }

    pub fn function(&self) -> &Function {
        &self.0
    }

    /// Run as a plain call on `receiver`. Properties land directly on the
    /// receiver; no delegation parent is introduced.
    pub fn apply_to(&self, receiver: &Object, args: &[Value]) -> KernelResult<()> {
        self.0.call(receiver, args).map(|_| ())
    }

    /// Run as a constructor: a fresh instance delegating to the function's
    /// own template.
    pub fn instantiate(&self, args: &[Value]) -> KernelResult<Object> {
        self.0.construct(args)
    }
}

impl From<Function> for Mixin {
    fn from(function: Function) -> Self {
        Self(function)
    }
}

/// Handle to one namespace's mixin table.
#[derive(Debug, Clone)]
pub struct MixinRegistry {
    owner: Object,
}

impl MixinRegistry {
    pub fn for_owner(owner: &Object) -> Self {
        Self {
            owner: owner.clone(),
        }
    }

    /// Register `ctor` under `name`, replacing any earlier registration.
    ///
    /// The constructor is probed once against an empty object and rejected
    /// if it adds nothing.
    ///
    /// The table holds `ctor` strongly while its owner is held weakly, so a
    /// mixin that captures its own owner strongly keeps both alive for the
    /// life of the thread. Capture a [`WeakObject`](crate::WeakObject) instead.
    pub fn add(&self, name: &str, ctor: impl Into<Mixin>) -> KernelResult<()> {
        if name.is_empty() {
            return Err(KernelError::type_error(
                "mixins.add name argument must be a non-empty string",
            ));
        }
        let mixin = ctor.into();

        let probe = Object::new();
        mixin.apply_to(&probe, &[])?;
        if probe.own_len() == 0 {
            return Err(KernelError::Construction(format!(
                "mixins.add \"{name}\" mixin does not add any new properties to an object"
            )));
        }

        let replaced = with_table(&self.owner, |table| {
            table.insert(name.to_string(), mixin).is_some()
        });
        tracing::debug!(mixin = name, replaced, "mixin registered");
        Ok(())
    }

    /// [`MixinRegistry::add`] over dynamic arguments.
    pub fn add_value(&self, name: &Value, ctor: &Value) -> KernelResult<()> {
        let name = name.as_str().ok_or_else(|| {
            KernelError::type_error("mixins.add name argument must be a string")
        })?;
        let function = ctor.as_function().ok_or_else(|| {
            KernelError::type_error("mixins.add mixin argument must be a function")
        })?;
        self.add(name, function.clone())
    }

    pub fn get(&self, name: &str) -> Option<Mixin> {
        with_table(&self.owner, |table| table.get(name).cloned())
    }

    /// Construct a standalone instance of the named mixin.
    pub fn exec(&self, name: &str, args: Option<&[Value]>) -> KernelResult<Object> {
        let mixin = self.get(name).ok_or_else(|| {
            KernelError::type_error(format!("mixins.exec \"{name}\" mixin does not exist"))
        })?;
        mixin.instantiate(args.unwrap_or(&[]))
    }

    /// [`MixinRegistry::exec`] over dynamic arguments; `args` may be
    /// `undefined` or an array.
    pub fn exec_value(&self, name: &Value, args: &Value) -> KernelResult<Object> {
        let name = name.as_str().ok_or_else(|| {
            KernelError::type_error("mixins.exec name argument must be a string")
        })?;
        let args = match args {
            Value::Undefined => None,
            Value::Array(items) => Some(items.as_slice()),
            _ => {
                return Err(KernelError::type_error(
                    "mixins.exec if provided, args argument must be an array",
                ));
            }
        };
        self.exec(name, args)
    }

    /// Registered names, in registration order.
    pub fn list(&self) -> Vec<String> {
        with_table(&self.owner, |table| table.keys().cloned().collect())
    }

    /// Look up every name before any of them runs.
    pub(crate) fn resolve(&self, names: &[String]) -> KernelResult<Vec<Mixin>> {
        with_table(&self.owner, |table| {
            names
                .iter()
                .map(|name| {
                    table.get(name).cloned().ok_or_else(|| {
                        KernelError::Reference(format!("create \"{name}\" mixin cannot be found"))
                    })
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn setter(key: &'static str, value: i32) -> Function {
        Function::new(key, move |this, _| {
            this.set(key, value);
            Ok(Value::Undefined)
        })
    }

    #[test]
    fn add_then_list_in_registration_order() {
        let registry = MixinRegistry::for_owner(&Object::new());
        registry.add("x", setter("x", 1)).expect("add x");
        registry.add("y", setter("y", 2)).expect("add y");
        assert_eq!(registry.list(), vec!["x", "y"]);
    }

    #[test]
    fn mixin_adding_nothing_is_rejected() {
        let registry = MixinRegistry::for_owner(&Object::new());
        let noop = Function::new("noop", |_, _| Ok(Value::Undefined));

        let err = registry.add("noop", noop).expect_err("no-op mixin");
        assert_eq!(err.kind(), ErrorKind::Construction);
        insta::assert_snapshot!(
            err.to_string(),
            @r#"mixins.add "noop" mixin does not add any new properties to an object"#
        );
        assert!(registry.list().is_empty());
    }

    #[test]
    fn reregistration_replaces_in_place() {
        let registry = MixinRegistry::for_owner(&Object::new());
        registry.add("x", setter("x", 1)).expect("first");
        registry.add("y", setter("y", 2)).expect("other");
        registry.add("x", setter("x", 9)).expect("replacement");

        assert_eq!(registry.list(), vec!["x", "y"]);
        let receiver = Object::new();
        registry
            .get("x")
            .expect("x registered")
            .apply_to(&receiver, &[])
            .expect("apply");
        assert_eq!(receiver.get_own("x"), Some(Value::from(9)));
    }

    #[test]
    fn empty_name_is_a_type_error() {
        let registry = MixinRegistry::for_owner(&Object::new());
        let err = registry.add("", setter("x", 1)).expect_err("empty name");
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn add_value_checks_argument_types() {
        let registry = MixinRegistry::for_owner(&Object::new());
        let ctor = Value::from(setter("x", 1));

        let bad_name = registry.add_value(&Value::from(3), &ctor).expect_err("name");
        assert_eq!(bad_name.kind(), ErrorKind::Type);
        let bad_ctor = registry
            .add_value(&Value::from("x"), &Value::from("not callable"))
            .expect_err("ctor");
        assert_eq!(bad_ctor.kind(), ErrorKind::Type);

        registry.add_value(&Value::from("x"), &ctor).expect("valid add");
        assert_eq!(registry.list(), vec!["x"]);
    }

    #[test]
    fn exec_constructs_with_positional_args() {
        let registry = MixinRegistry::for_owner(&Object::new());
        let pair = Function::new("pair", |this, args| {
            this.set("left", args.first().cloned().unwrap_or_default());
            this.set("right", args.get(1).cloned().unwrap_or_default());
            Ok(Value::Undefined)
        });
        let template = pair.prototype().clone();
        registry.add("pair", pair).expect("add pair");

        let instance = registry
            .exec("pair", Some(&[Value::from(1), Value::from(2)]))
            .expect("exec pair");
        assert_eq!(instance.get_own("left"), Some(Value::from(1)));
        assert_eq!(instance.get_own("right"), Some(Value::from(2)));
        assert!(instance.delegate().expect("delegate").ptr_eq(&template));
    }

    #[test]
    fn exec_rejects_unknown_names_and_bad_args() {
        let registry = MixinRegistry::for_owner(&Object::new());
        registry.add("x", setter("x", 1)).expect("add");

        let unknown = registry.exec("nope", None).expect_err("unknown");
        assert_eq!(unknown.kind(), ErrorKind::Type);
        let bad_args = registry
            .exec_value(&Value::from("x"), &Value::from("1, 2"))
            .expect_err("args");
        assert_eq!(bad_args.kind(), ErrorKind::Type);
        let bad_name = registry
            .exec_value(&Value::Null, &Value::Undefined)
            .expect_err("name");
        assert_eq!(bad_name.kind(), ErrorKind::Type);

        let instance = registry
            .exec_value(&Value::from("x"), &Value::Undefined)
            .expect("no args");
        assert_eq!(instance.get_own("x"), Some(Value::from(1)));
    }

    #[test]
    fn tables_are_scoped_per_owner_identity() {
        let first = Object::new();
        let second = Object::new();
        MixinRegistry::for_owner(&first)
            .add("x", setter("x", 1))
            .expect("add");

        assert_eq!(MixinRegistry::for_owner(&first).list(), vec!["x"]);
        assert!(MixinRegistry::for_owner(&second).list().is_empty());
    }

    #[test]
    fn tables_are_reclaimed_with_their_owner() {
        let before = live_tables();
        {
            let owner = Object::new();
            MixinRegistry::for_owner(&owner)
                .add("x", setter("x", 1))
                .expect("add");
            assert_eq!(live_tables(), before + 1);
        }
        assert_eq!(live_tables(), before);
    }

    #[test]
    fn mixins_holding_a_weak_owner_do_not_pin_it() {
        let before = live_tables();
        {
            let owner = Object::new();
            let weak = owner.downgrade();
            MixinRegistry::for_owner(&owner)
                .add(
                    "owned",
                    Function::new("owned", move |this, _| {
                        this.set("owner_live", weak.is_live());
                        Ok(Value::Undefined)
                    }),
                )
                .expect("add");
            assert_eq!(live_tables(), before + 1);
        }
        assert_eq!(live_tables(), before);
    }

    #[test]
    fn resolve_reports_missing_names() {
        let registry = MixinRegistry::for_owner(&Object::new());
        registry.add("x", setter("x", 1)).expect("add");

        let resolved = registry.resolve(&["x".to_string()]).expect("resolve x");
        assert_eq!(resolved.len(), 1);
        let err = registry
            .resolve(&["x".to_string(), "ghost".to_string()])
            .expect_err("ghost");
        assert_eq!(err.kind(), ErrorKind::Reference);
    }
}
