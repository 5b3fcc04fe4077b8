use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Site-wide registry mapping a capability to its active
/// implementation.
///
/// Capabilities are keyed by type, usually a trait object such as
/// `dyn MailHost`. Registering again replaces the previous utility.
#[derive(Default)]
pub struct Utilities {
    entries: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl Utilities {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `utility` and returns the one it replaced.
    pub fn register<T>(&self, utility: Arc<T>) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        tracing::debug!(utility = std::any::type_name::<T>(), "registering utility");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(TypeId::of::<T>(), Box::new(utility))
            .and_then(|previous| previous.downcast::<Arc<T>>().ok())
            .map(|previous| *previous)
    }

    pub fn unregister<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&TypeId::of::<T>())
            .and_then(|previous| previous.downcast::<Arc<T>>().ok())
            .map(|previous| *previous)
    }

    #[must_use]
    pub fn lookup<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Arc<T>>())
            .cloned()
    }
}

impl std::fmt::Debug for Utilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Utilities")
            .field("registered", &entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;
    struct Dutch;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".into()
        }
    }

    impl Greeter for Dutch {
        fn greet(&self) -> String {
            "hallo".into()
        }
    }

    #[test]
    fn register_replace_and_unregister() {
        let utilities = Utilities::new();
        assert!(utilities.lookup::<dyn Greeter>().is_none());

        assert!(utilities.register::<dyn Greeter>(Arc::new(English)).is_none());
        assert_eq!(utilities.lookup::<dyn Greeter>().unwrap().greet(), "hello");

        let previous = utilities.register::<dyn Greeter>(Arc::new(Dutch)).unwrap();
        assert_eq!(previous.greet(), "hello");
        assert_eq!(utilities.lookup::<dyn Greeter>().unwrap().greet(), "hallo");

        assert!(utilities.unregister::<dyn Greeter>().is_some());
        assert!(utilities.lookup::<dyn Greeter>().is_none());
    }

    #[test]
    fn capabilities_do_not_collide() {
        let utilities = Utilities::new();
        utilities.register::<dyn Greeter>(Arc::new(English));
        utilities.register::<String>(Arc::new("site".to_string()));

        assert_eq!(utilities.lookup::<String>().unwrap().as_str(), "site");
        assert_eq!(utilities.lookup::<dyn Greeter>().unwrap().greet(), "hello");
    }
}
