//! # Protomix Kernel
//!
//! Objects built from a base prototype plus an ordered set of mixins, and
//! runtime checks that a value satisfies a declared structural interface.
//!
//! ## Architecture
//!
//! ```text
//! Value / Object / Function   ← dynamic values, delegation chains
//!     │
//! Classifier                  ← canonical type tags, handle predicates
//!     │                 IdentityStore  ← weak identity-keyed side table
//!     │                        │
//! Interface                MixinRegistry  ← per-namespace mixin tables
//!                              │
//!                          Namespace      ← create / enhance
//! ```
//!
//! ```
//! use protomix_kernel::{CreateSettings, Function, Interface, Namespace, Object, Value};
//!
//! let ns = Namespace::new();
//! ns.mixins()
//!     .add("sized", Function::new("sized", |this, _| {
//!         this.set("width", 0);
//!         Ok(Value::Undefined)
//!     }))
//!     .unwrap();
//!
//! let base = Object::new();
//! let shape = ns.create(&base, &CreateSettings::new().mixin("sized")).unwrap();
//!
//! let sized = Interface::new("sized", [("width", "number")]).unwrap();
//! assert!(sized.matches(&Value::from(shape)).is_ok());
//! ```

pub mod classify;
pub mod compose;
pub mod error;
pub mod identity;
pub mod interface;
pub mod mixin;
pub mod value;

pub use classify::{Classifier, FieldShape, HandlePredicate, TypeTag, classify};
pub use compose::{BACK_REFERENCE, CreateSettings, Namespace};
pub use error::{ErrorKind, KernelError, KernelResult};
pub use identity::IdentityStore;
pub use interface::Interface;
pub use mixin::{Mixin, MixinRegistry};
pub use value::{Function, Object, Value, WeakObject};

/// Kernel release version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn version_is_the_package_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::VERSION.split('.').count(), 3);
    }
}
