//! The dynamic value model.
//!
//! Objects are shared, interior-mutable property records with an optional
//! delegate. Reading a property checks the object's own fields first and
//! then recurses to the delegate, so a composed object sees everything its
//! base carries while its own writes shadow the base.
//!
//! ```text
//! composed ──delegate──▶ base ──delegate──▶ root (no delegate)
//!    own: x=1               own: x=0, y=2
//!
//! composed.get("x") == 1   (shadowed)
//! composed.get("y") == 2   (inherited)
//! ```

use crate::error::{KernelError, KernelResult};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value as Json;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Class name carried by plain objects.
pub const PLAIN_CLASS: &str = "Object";

/// A runtime value.
///
/// Primitives and arrays compare structurally; objects and functions compare
/// by reference identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Object),
    Function(Function),
}

impl Value {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Self::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Property read. Only objects carry properties.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.as_object().and_then(|o| o.get(key))
    }

    /// Convert from JSON. Objects become fresh root objects.
    pub fn from_json(json: &Json) -> Self {
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(*b),
            Json::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Self::String(s.clone()),
            Json::Array(items) => Self::Array(items.iter().map(Self::from_json).collect()),
            Json::Object(map) => {
                let object = Object::new();
                for (key, value) in map {
                    object.set(key.clone(), Self::from_json(value));
                }
                Self::Object(object)
            }
        }
    }

    /// Convert to JSON, flattening objects over their delegation chain.
    ///
    /// `undefined` and functions are dropped from objects and render as
    /// `null` inside arrays. An object already being rendered further up the
    /// current path renders as `null`.
    pub fn to_json(&self) -> Json {
        let mut path = Vec::new();
        self.to_json_on(&mut path)
    }

    fn to_json_on(&self, path: &mut Vec<usize>) -> Json {
        match self {
            Self::Undefined | Self::Null | Self::Function(_) => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Number(n) => number_to_json(*n),
            Self::String(s) => Json::String(s.clone()),
            Self::Array(items) => Json::Array(items.iter().map(|v| v.to_json_on(path)).collect()),
            Self::Object(o) => o.to_json_on(path),
        }
    }
}

fn number_to_json(n: f64) -> Json {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Json::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Json::Null, Json::Number)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Self::Object(o)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Self::Function(f)
    }
}

struct ObjectData {
    class: String,
    delegate: Option<Object>,
    properties: IndexMap<String, Value>,
}

/// A shared property record with an optional delegate.
///
/// Cloning an `Object` clones the handle, not the record.
#[derive(Clone)]
pub struct Object(Rc<RefCell<ObjectData>>);

impl Object {
    /// A root object with no delegate.
    pub fn new() -> Self {
        Self::with_parts(PLAIN_CLASS.to_string(), None)
    }

    /// A fresh object delegating to `base`.
    pub fn create(base: &Object) -> Self {
        Self::with_parts(PLAIN_CLASS.to_string(), Some(base.clone()))
    }

    /// A root object carrying a custom class tag (e.g. `"Date"`).
    pub fn with_class(class: impl Into<String>) -> Self {
        Self::with_parts(class.into(), None)
    }

    fn with_parts(class: String, delegate: Option<Object>) -> Self {
        Self(Rc::new(RefCell::new(ObjectData {
            class,
            delegate,
            properties: IndexMap::new(),
        })))
    }

    pub fn class_name(&self) -> String {
        self.0.borrow().class.clone()
    }

    pub fn delegate(&self) -> Option<Object> {
        self.0.borrow().delegate.clone()
    }

    /// Re-point the delegate.
    ///
    /// Fails if the new chain would lead back to this object.
    pub fn set_delegate(&self, delegate: Option<&Object>) -> KernelResult<()> {
        if let Some(start) = delegate {
            let mut current = Some(start.clone());
            while let Some(node) = current {
                if node.ptr_eq(self) {
                    return Err(KernelError::type_error("cyclic delegation chain"));
                }
                current = node.delegate().filter(|next| !next.ptr_eq(&node));
            }
        }
        self.0.borrow_mut().delegate = delegate.cloned();
        Ok(())
    }

    /// Own lookup first, then the delegation chain.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.owner_of(key).and_then(|owner| owner.get_own(key))
    }

    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.0.borrow().properties.get(key).cloned()
    }

    pub fn has_own(&self, key: &str) -> bool {
        self.0.borrow().properties.contains_key(key)
    }

    /// Whether `key` exists anywhere in the delegation chain, whatever its
    /// value (including `undefined`).
    pub fn has_property(&self, key: &str) -> bool {
        self.owner_of(key).is_some()
    }

    /// The nearest object in the chain that owns `key`.
    fn owner_of(&self, key: &str) -> Option<Object> {
        let mut current = self.clone();
        loop {
            let parent = {
                let data = current.0.borrow();
                if data.properties.contains_key(key) {
                    break Some(current.clone());
                }
                data.delegate.clone()
            };
            match parent {
                // A node delegating to itself ends the walk.
                Some(parent) if !parent.ptr_eq(&current) => current = parent,
                _ => break None,
            }
        }
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.0
            .borrow_mut()
            .properties
            .insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().properties.shift_remove(key)
    }

    /// Own keys in insertion order.
    pub fn own_keys(&self) -> Vec<String> {
        self.0.borrow().properties.keys().cloned().collect()
    }

    pub fn own_len(&self) -> usize {
        self.0.borrow().properties.len()
    }

    /// Own keys followed by inherited ones; shadowed keys appear once.
    pub fn keys(&self) -> Vec<String> {
        let mut seen = IndexSet::new();
        let mut current = Some(self.clone());
        while let Some(node) = current {
            seen.extend(node.own_keys());
            current = node.delegate().filter(|next| !next.ptr_eq(&node));
        }
        seen.into_iter().collect()
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakObject {
        WeakObject(Rc::downgrade(&self.0))
    }

    /// Address of the shared record; stable while any handle or weak handle
    /// to the record exists.
    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    fn to_json_on(&self, path: &mut Vec<usize>) -> Json {
        let addr = self.addr();
        if path.contains(&addr) {
            return Json::Null;
        }
        path.push(addr);
        let mut map = serde_json::Map::new();
        for key in self.keys() {
            match self.get(&key) {
                None | Some(Value::Undefined) | Some(Value::Function(_)) => {}
                Some(value) => {
                    map.insert(key, value.to_json_on(path));
                }
            }
        }
        path.pop();
        Json::Object(map)
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Object")
            .field("class", &data.class)
            .field("keys", &data.properties.keys().collect::<Vec<_>>())
            .field("delegates", &data.delegate.is_some())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Object
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let object = Object::new();
        for (key, value) in iter {
            object.set(key, value);
        }
        object
    }
}

/// A weak handle to an object's record.
#[derive(Clone)]
pub struct WeakObject(Weak<RefCell<ObjectData>>);

impl WeakObject {
    pub fn upgrade(&self) -> Option<Object> {
        self.0.upgrade().map(Object)
    }

    pub fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakObject(live: {})", self.is_live())
    }
}

type NativeBody = dyn Fn(&Object, &[Value]) -> KernelResult<Value>;

struct FunctionData {
    name: String,
    body: Box<NativeBody>,
    prototype: Object,
}

/// A named native callable with its own template object.
///
/// The same function can run two ways: [`Function::call`] runs the body on
/// a receiver the caller supplies, while [`Function::construct`] runs it on
/// a fresh receiver delegating to [`Function::prototype`].
#[derive(Clone)]
pub struct Function(Rc<FunctionData>);

impl Function {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> KernelResult<Value> + 'static,
    {
        Self(Rc::new(FunctionData {
            name: name.into(),
            body: Box::new(body),
            prototype: Object::new(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Template that instances built by [`Function::construct`] delegate to.
    pub fn prototype(&self) -> &Object {
        &self.0.prototype
    }

    pub fn call(&self, receiver: &Object, args: &[Value]) -> KernelResult<Value> {
        (self.0.body)(receiver, args)
    }

    pub fn construct(&self, args: &[Value]) -> KernelResult<Object> {
        let instance = Object::create(&self.0.prototype);
        self.call(&instance, args)?;
        Ok(instance)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.0.name)
    }
}
