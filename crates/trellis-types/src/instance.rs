//! Shared representation of live bean instances.
//!
//! The metadata graph is plain data, but the instances the runtime
//! creates from it are opaque application objects. They travel
//! through the engine as type-erased shared pointers; generated glue
//! on the rim knows the concrete types and downcasts at the edges.

use std::any::Any;
use std::sync::Arc;

/// A type-erased, shared, thread-safe bean instance.
///
/// Reference equality (`Arc::ptr_eq`) is the identity notion for
/// contextual instances: "the same instance" means the same
/// allocation, never structural equality.
pub type InstanceRef = Arc<dyn Any + Send + Sync>;

/// Erases a concrete value into an [`InstanceRef`].
///
/// # Example
///
/// ```
/// use trellis_types::{instance_of, instance_as};
///
/// let instance = instance_of(String::from("hello"));
/// assert_eq!(instance_as::<String>(&instance).map(String::as_str), Some("hello"));
/// assert!(instance_as::<u64>(&instance).is_none());
/// ```
#[must_use]
pub fn instance_of<T: Any + Send + Sync>(value: T) -> InstanceRef {
    Arc::new(value)
}

/// Downcasts an [`InstanceRef`] to a concrete type.
#[must_use]
pub fn instance_as<T: Any + Send + Sync>(instance: &InstanceRef) -> Option<&T> {
    instance.downcast_ref::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_downcast() {
        let instance = instance_of(42_u32);
        assert_eq!(instance_as::<u32>(&instance), Some(&42));
    }

    #[test]
    fn wrong_type_is_none() {
        let instance = instance_of(42_u32);
        assert!(instance_as::<String>(&instance).is_none());
    }

    #[test]
    fn identity_is_pointer_equality() {
        let a = instance_of(1_u8);
        let b = a.clone();
        let c = instance_of(1_u8);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
