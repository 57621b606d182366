//! Shared instance cells handed out by the resolver.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::{DiError, DiResult};

/// Type-erased shared instance.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Handle to a resolved (or still-resolving) service instance.
///
/// A `ServiceRef` is a reference-counted handle to a write-once cell. For an
/// already-constructed service the cell is populated before the handle is
/// returned. During circular construction the empty cell is handed out as the
/// placeholder: the in-progress dependent stores the handle, construction
/// finishes, the cell is populated once, and every holder observes the same
/// underlying storage from then on.
///
/// Cloning a `ServiceRef` clones the handle, not the instance.
///
/// # Examples
///
/// ```rust
/// use anvil_di::ServiceCollection;
///
/// struct Greeter {
///     greeting: &'static str,
/// }
///
/// let mut services = ServiceCollection::new();
/// services.register_value(Greeter { greeting: "hello" });
///
/// # tokio_test::block_on(async {
/// let provider = services.build();
/// let reference = provider
///     .get_required_service(anvil_di::Token::of::<Greeter>())
///     .await
///     .unwrap();
///
/// assert!(reference.is_ready());
/// assert_eq!(reference.downcast::<Greeter>().unwrap().greeting, "hello");
/// # });
/// ```
#[derive(Clone)]
pub struct ServiceRef {
    name: &'static str,
    cell: Arc<OnceCell<AnyArc>>,
}

impl ServiceRef {
    /// Creates an empty cell: the placeholder for circular construction.
    pub(crate) fn empty(name: &'static str) -> Self {
        Self {
            name,
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// Creates a cell that is already populated.
    pub(crate) fn ready(name: &'static str, instance: AnyArc) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(instance);
        Self {
            name,
            cell: Arc::new(cell),
        }
    }

    /// Populates the cell. Each cell is filled at most once, by the
    /// construction that created it.
    pub(crate) fn fill(&self, instance: AnyArc) {
        let filled = self.cell.set(instance).is_ok();
        debug_assert!(filled, "service cell for {} filled twice", self.name);
    }

    /// Display name of the token this reference was resolved for.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the underlying instance has finished construction.
    pub fn is_ready(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The type-erased instance, or `None` while construction is in progress.
    pub fn instance(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.cell.get().cloned()
    }

    /// Downcasts the instance to `T`.
    ///
    /// Fails with [`DiError::NotReady`] while the instance is still under
    /// construction (only observable from inside a circular construction) and
    /// with [`DiError::TypeMismatch`] when the cell holds a different type.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let any = self
            .cell
            .get()
            .cloned()
            .ok_or(DiError::NotReady(self.name))?;
        any.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Whether two references share the same underlying cell.
    pub fn ptr_eq(&self, other: &ServiceRef) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for ServiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRef")
            .field("name", &self.name)
            .field("ready", &self.is_ready())
            .finish()
    }
}
