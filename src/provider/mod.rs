//! Service providers: the resolver tree built from a frozen registry.

use std::sync::Arc;

use crate::collection::BuildOptions;
use crate::error::{DiError, DiResult};
use crate::graph::{self, DependencyTreeNode};
use crate::registry::RegistrySnapshot;
use crate::service_ref::ServiceRef;
use crate::token::Token;

mod context;
mod resolve;
mod tier;

pub use context::ResolverContext;

use tier::TierState;

/// Resolver over a frozen registry snapshot.
///
/// A provider is one node of a provider tree: the root owns the singleton
/// instance cache, and every scope created with [`create_scope`](Self::create_scope)
/// is a child provider sharing the same snapshot and root singleton tier while
/// owning its scoped instances exclusively. Cloning a provider clones the
/// handle, not the tier.
///
/// Resolution is asynchronous and cooperative: a call may suspend while a
/// dependency, a factory future, or an initialize hook is pending, and runs to
/// completion or failure; there is no cancellation and no timeout.
///
/// # Examples
///
/// ```rust
/// use anvil_di::{Lifetime, ServiceCollection, Token};
///
/// struct Logger;
/// struct UserService {
///     logger: anvil_di::ServiceRef,
/// }
///
/// let mut services = ServiceCollection::new();
/// services.register_implementation::<Logger, _>(Lifetime::Singleton, vec![], |_| Ok(Logger));
/// services.register_implementation::<UserService, _>(
///     Lifetime::Scoped,
///     vec![Token::of::<Logger>()],
///     |deps| Ok(UserService { logger: deps[0].clone() }),
/// );
///
/// # tokio_test::block_on(async {
/// let provider = services.build();
/// let scope = provider.create_scope().unwrap();
///
/// let service = scope.get::<UserService>().await.unwrap();
/// let logger = provider.get::<Logger>().await.unwrap();
/// assert!(std::sync::Arc::ptr_eq(
///     &service.logger.downcast::<Logger>().unwrap(),
///     &logger,
/// ));
/// # });
/// ```
#[derive(Clone)]
pub struct ServiceProvider {
    pub(crate) inner: Arc<ProviderInner>,
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider").finish_non_exhaustive()
    }
}

pub(crate) struct ProviderInner {
    pub(crate) registry: Arc<RegistrySnapshot>,
    pub(crate) options: BuildOptions,
    pub(crate) parent: Option<ServiceProvider>,
    pub(crate) tier: Arc<TierState>,
}

impl ServiceProvider {
    pub(crate) fn root(registry: Arc<RegistrySnapshot>, options: BuildOptions) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                registry,
                options,
                parent: None,
                tier: TierState::new(),
            }),
        }
    }

    pub(crate) fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    /// The ancestor with no parent, owner of the singleton tier.
    pub(crate) fn root_provider(&self) -> ServiceProvider {
        let mut current = self.clone();
        while let Some(parent) = current.inner.parent.clone() {
            current = parent;
        }
        current
    }

    // ----- Resolution surface -----

    /// Resolves the last registered descriptor for the token, or `None` when
    /// the token has no registration.
    pub async fn get_service(&self, token: Token) -> DiResult<Option<ServiceRef>> {
        resolve::resolve_optional(self.clone(), token).await
    }

    /// Resolves the last registered descriptor for the token, failing with
    /// [`DiError::NotRegistered`] when the token has no registration.
    pub async fn get_required_service(&self, token: Token) -> DiResult<ServiceRef> {
        resolve::resolve_required(self.clone(), token).await
    }

    /// Resolves every registration under the token, in registration order.
    pub async fn get_services(&self, token: Token) -> DiResult<Vec<ServiceRef>> {
        resolve::resolve_all(self.clone(), token).await
    }

    /// Resolves the keyed descriptor under `(key, token)`, or `None` when the
    /// slot is empty.
    pub async fn get_keyed_service(
        &self,
        key: &'static str,
        token: Token,
    ) -> DiResult<Option<ServiceRef>> {
        resolve::resolve_keyed(self.clone(), key, token).await
    }

    /// Resolves the keyed descriptor under `(key, token)`, failing when the
    /// slot is empty.
    pub async fn get_required_keyed_service(
        &self,
        key: &'static str,
        token: Token,
    ) -> DiResult<ServiceRef> {
        match resolve::resolve_keyed(self.clone(), key, token).await? {
            Some(reference) => Ok(reference),
            None => Err(DiError::NotRegistered(format!("{token} (key \"{key}\")"))),
        }
    }

    /// Resolves `T` under its type token and downcasts the instance.
    pub async fn get<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.get_required_service(Token::of::<T>())
            .await?
            .downcast::<T>()
    }

    /// Presence check only; never constructs.
    pub fn is_service(&self, token: Token) -> bool {
        self.inner.registry.contains(token)
    }

    /// Creates a child resolver sharing the same registry snapshot.
    ///
    /// The scope resolves singletons from the root tier and owns its scoped
    /// instances exclusively.
    pub fn create_scope(&self) -> DiResult<ServiceProvider> {
        if self.inner.tier.is_disposed() {
            return Err(DiError::DisposedProviderUse);
        }
        Ok(Self {
            inner: Arc::new(ProviderInner {
                registry: self.inner.registry.clone(),
                options: self.inner.options,
                parent: Some(self.clone()),
                tier: TierState::new(),
            }),
        })
    }

    /// Disposes this provider's own instance cache and marks it dead.
    ///
    /// Destroy hooks run in reverse insertion order over the instances this
    /// provider cached itself: a root disposes its singleton/value cache, a
    /// scope disposes only its own scoped instances. A destroy-hook failure is
    /// logged and does not stop the remaining instances from being disposed.
    /// Every later resolution call on this provider fails with
    /// [`DiError::DisposedProviderUse`]. Disposing twice is a no-op.
    pub fn dispose(&self) {
        resolve::dispose(self);
    }

    // ----- Diagnostics surface (pure, non-constructing) -----

    /// Expands the dependency tree rooted at the token.
    pub fn get_dependency_tree(&self, token: Token) -> DependencyTreeNode {
        graph::dependency_tree(&self.inner.registry, token)
    }

    /// Finds every dependency cycle in the registry, disconnected ones included.
    pub fn get_circular_dependencies(&self) -> Vec<Vec<Token>> {
        graph::circular_dependencies(&self.inner.registry)
    }

    /// Renders the dependency tree rooted at the token.
    pub fn visualize_dependency_tree(&self, token: Token) -> String {
        graph::render_tree(&self.get_dependency_tree(token))
    }

    /// Renders every dependency cycle in the registry.
    pub fn visualize_circular_dependencies(&self) -> String {
        graph::render_cycles(&self.get_circular_dependencies())
    }
}
