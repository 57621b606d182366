//! Service lifetime definitions.

/// Service lifetimes controlling instance caching behavior.
///
/// The lifetime decides which provider tier owns the cached instance:
/// singletons live at the root of the provider tree and are visible to every
/// descendant scope, scoped instances belong to exactly one scope, and
/// transients are never cached at all.
///
/// # Examples
///
/// ```rust
/// use anvil_di::{Lifetime, ServiceCollection};
///
/// struct Config;
/// struct Probe;
///
/// let mut services = ServiceCollection::new();
/// services.register_implementation::<Config, _>(Lifetime::Singleton, vec![], |_| Ok(Config));
/// services.register_implementation::<Probe, _>(Lifetime::Transient, vec![], |_| Ok(Probe));
///
/// # tokio_test::block_on(async {
/// let provider = services.build();
/// let scope = provider.create_scope().unwrap();
///
/// // Singleton: one instance for the whole provider tree.
/// let a = provider.get::<Config>().await.unwrap();
/// let b = scope.get::<Config>().await.unwrap();
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
///
/// // Transient: fresh instance per top-level resolution.
/// let p1 = provider.get::<Probe>().await.unwrap();
/// let p2 = provider.get::<Probe>().await.unwrap();
/// assert!(!std::sync::Arc::ptr_eq(&p1, &p2));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Single instance per root provider, cached forever
    ///
    /// Created once on first request and cached at the root of the provider
    /// tree, so the same instance is observed from every scope.
    Singleton,
    /// Single instance per scope, cached for the scope lifetime
    ///
    /// Created once per scope on first request within that scope. Different
    /// scopes get different instances. With scope validation enabled, scoped
    /// services cannot be resolved from the root provider.
    Scoped,
    /// New instance per resolution, never cached
    ///
    /// A fresh instance is constructed on every top-level resolution. Within a
    /// single resolution call a cyclic transient chain still resolves to the
    /// one in-progress instance instead of recursing forever.
    Transient,
}
