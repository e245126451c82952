//! Name-indexed dynamic callable table
//!
//! Backs `EventFabric::inject`/`call`: lets one component publish a query
//! (e.g. "current account balance") that another can invoke without a
//! compile-time dependency between the two, the same role the source's
//! open `std::type_index` table plays for anything that doesn't fit the
//! closed `EventKind` set.

use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

type Callable = Arc<dyn Fn() -> Box<dyn Any + Send> + Send + Sync>;

pub(super) struct CallableRegistry {
    table: RwLock<HashMap<String, Callable>>,
}

impl CallableRegistry {
    pub(super) fn new() -> Self {
        Self { table: RwLock::new(HashMap::new()) }
    }

    pub(super) fn inject<F>(&self, name: impl Into<String>, f: F) where F: Fn() -> Box<dyn Any + Send> + Send + Sync + 'static {
        self.table.write().insert(name.into(), Arc::new(f));
    }

    pub(super) fn call<R: 'static>(&self, name: &str) -> Option<R> {
        let callable = self.table.read().get(name).cloned()?;
        let result = callable();
        result.downcast::<R>().ok().map(|boxed| *boxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_name_returns_none() {
        let registry = CallableRegistry::new();
        let result: Option<u32> = registry.call("missing");
        assert_eq!(result, None);
    }

    #[test]
    fn test_type_mismatch_returns_none() {
        let registry = CallableRegistry::new();
        registry.inject("x", || Box::new(1u32));
        let result: Option<String> = registry.call("x");
        assert_eq!(result, None);
    }

    #[test]
    fn test_overwrite_replaces_callable() {
        let registry = CallableRegistry::new();
        registry.inject("x", || Box::new(1u32));
        registry.inject("x", || Box::new(2u32));
        assert_eq!(registry.call::<u32>("x"), Some(2));
    }
}
