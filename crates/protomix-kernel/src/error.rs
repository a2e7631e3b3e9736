//! Error types for Protomix kernel operations.

use crate::classify::TypeTag;

/// Errors raised by composition, registration, and interface checks.
///
/// Every failure surfaces at the call that detected it; nothing is retried
/// or recovered inside the kernel.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    /// An argument had the wrong shape or type.
    #[error("TypeError: {0}")]
    Type(String),

    /// A named mixin could not be found.
    #[error("ReferenceError: {0}")]
    Reference(String),

    /// A value does not satisfy an interface.
    #[error(
        "object does not match the \"{interface}\" interface: \"{property}\" property is {gotten}, should be {expected}"
    )]
    Validation {
        interface: String,
        property: String,
        gotten: TypeTag,
        expected: TypeTag,
    },

    /// An interface object was used before being initialised.
    #[error("InitError: {0}")]
    Init(String),

    /// A mixin contributed nothing when probed.
    #[error("{0}")]
    Construction(String),
}

impl KernelError {
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Type(_) => ErrorKind::Type,
            Self::Reference(_) => ErrorKind::Reference,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Init(_) => ErrorKind::Init,
            Self::Construction(_) => ErrorKind::Construction,
        }
    }
}

/// Which class of failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Type,
    Reference,
    Validation,
    Init,
    Construction,
}

pub type KernelResult<T> = Result<T, KernelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(KernelError::type_error("x").kind(), ErrorKind::Type);
        assert_eq!(
            KernelError::Reference("gone".into()).kind(),
            ErrorKind::Reference
        );
        assert_eq!(KernelError::Init("early".into()).kind(), ErrorKind::Init);
    }

    #[test]
    fn validation_message_names_everything() {
        let err = KernelError::Validation {
            interface: "foo".into(),
            property: "resize".into(),
            gotten: TypeTag::Missing,
            expected: TypeTag::Function,
        };
        insta::assert_snapshot!(
            err.to_string(),
            @r#"object does not match the "foo" interface: "resize" property is missing, should be function"#
        );
    }

    #[test]
    fn error_kind_serializes_snake_case() {
        let json = serde_json::to_value(ErrorKind::Construction).expect("serialize kind");
        assert_eq!(json, serde_json::json!("construction"));
    }
}
