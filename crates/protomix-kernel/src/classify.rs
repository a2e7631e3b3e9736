//! Runtime type classification.
//!
//! Every value maps to one canonical lowercase [`TypeTag`]. Objects are first
//! offered to the classifier's handle predicates, in table order, so opaque
//! external handles (UI nodes, widgets, ...) are recognized by shape before
//! the generic class-based fallback applies.

use crate::value::{Object, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Canonical type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Function,
    Object,
    Array,
    Undefined,
    Null,
    HtmlElement,
    /// Validator-only: the property exists nowhere in the delegation chain.
    Missing,
    /// Lower-cased custom class or handle tag.
    Other(String),
}

impl TypeTag {
    /// Parse a tag, lower-casing it first.
    pub fn parse(text: &str) -> Self {
        let lower = text.to_lowercase();
        match lower.as_str() {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "function" => Self::Function,
            "object" => Self::Object,
            "array" => Self::Array,
            "undefined" => Self::Undefined,
            "null" => Self::Null,
            "htmlelement" => Self::HtmlElement,
            "missing" => Self::Missing,
            _ => Self::Other(lower),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Function => "function",
            Self::Object => "object",
            Self::Array => "array",
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::HtmlElement => "htmlelement",
            Self::Missing => "missing",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TypeTag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for TypeTag {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.as_str().to_string()
    }
}

/// Recognizes an external handle object by its shape.
pub trait HandlePredicate {
    /// Tag assigned to recognized objects.
    fn tag(&self) -> TypeTag;

    fn recognizes(&self, object: &Object) -> bool;
}

/// Recognizes objects exposing a string-valued field and a number-valued
/// field, own or inherited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldShape {
    pub tag: TypeTag,
    pub string_field: String,
    pub number_field: String,
}

impl FieldShape {
    pub fn new(
        tag: TypeTag,
        string_field: impl Into<String>,
        number_field: impl Into<String>,
    ) -> Self {
        Self {
            tag,
            string_field: string_field.into(),
            number_field: number_field.into(),
        }
    }

    /// UI nodes: a `nodeName` string and a `nodeType` number.
    pub fn html_element() -> Self {
        Self::new(TypeTag::HtmlElement, "nodeName", "nodeType")
    }
}

impl HandlePredicate for FieldShape {
    fn tag(&self) -> TypeTag {
        self.tag.clone()
    }

    fn recognizes(&self, object: &Object) -> bool {
        matches!(object.get(&self.string_field), Some(Value::String(_)))
            && matches!(object.get(&self.number_field), Some(Value::Number(_)))
    }
}

/// A type classifier with an ordered table of handle predicates.
#[derive(Clone)]
pub struct Classifier {
    predicates: Vec<Rc<dyn HandlePredicate>>,
}

impl Classifier {
    /// A classifier that recognizes no handles.
    pub fn bare() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Append a predicate; earlier predicates win.
    pub fn with_predicate(mut self, predicate: impl HandlePredicate + 'static) -> Self {
        self.predicates.push(Rc::new(predicate));
        self
    }

    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }

    pub fn classify(&self, value: &Value) -> TypeTag {
        match value {
            Value::Undefined => TypeTag::Undefined,
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Number(_) => TypeTag::Number,
            Value::String(_) => TypeTag::String,
            Value::Array(_) => TypeTag::Array,
            Value::Function(_) => TypeTag::Function,
            Value::Object(object) => self
                .handle_tag(object)
                .unwrap_or_else(|| TypeTag::parse(&object.class_name())),
        }
    }

    fn handle_tag(&self, object: &Object) -> Option<TypeTag> {
        self.predicates
            .iter()
            .find(|predicate| predicate.recognizes(object))
            .map(|predicate| predicate.tag())
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::bare().with_predicate(FieldShape::html_element())
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<TypeTag> = self.predicates.iter().map(|p| p.tag()).collect();
        f.debug_struct("Classifier").field("handles", &tags).finish()
    }
}

/// Classify with the default classifier.
pub fn classify(value: &Value) -> TypeTag {
    Classifier::default().classify(value)
}
