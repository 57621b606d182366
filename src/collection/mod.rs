//! Service collection: the mutable registry populated before a provider is built.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::descriptor::{
    erase_ctor, erase_factory, DescriptorId, ServiceDescriptor, ServiceSource,
};
use crate::error::{DiError, DiResult};
use crate::lifetime::Lifetime;
use crate::provider::{ResolverContext, ServiceProvider};
use crate::registry::RegistrySnapshot;
use crate::service_ref::{AnyArc, ServiceRef};
use crate::token::Token;
use crate::validation;

/// Options applied when a collection is frozen into a provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Reject scoped resolutions from the root provider and scoped
    /// dependencies injected into root-resolved descriptors.
    pub validate_scopes: bool,
    /// Walk every descriptor's dependency list at build time and fail with one
    /// aggregated report of every missing registration.
    pub validate_on_build: bool,
}

/// Mutable registry of service descriptors.
///
/// Holds, per token, an ordered list of descriptors, plus a key-indexed table
/// for keyed services. Registration never overwrites: re-registering a token
/// appends, and single-result lookup sees the last entry while multi-result
/// lookup and graph analysis see all of them. [`build`](Self::build) freezes
/// the collection into an immutable snapshot consumed by the provider tree.
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
///     Lifetime::Transient,
///     vec![Token::of::<Logger>()],
///     |deps| Ok(UserService { logger: deps[0].clone() }),
/// );
///
/// # tokio_test::block_on(async {
/// let provider = services.build();
/// let user_service = provider.get::<UserService>().await.unwrap();
/// assert!(user_service.logger.downcast::<Logger>().is_ok());
/// # });
/// ```
pub struct ServiceCollection {
    by_token: HashMap<Token, Vec<Arc<ServiceDescriptor>>>,
    keyed: HashMap<&'static str, HashMap<Token, Arc<ServiceDescriptor>>>,
    token_order: Vec<Token>,
    next_id: u64,
}

impl ServiceCollection {
    /// Creates a new empty service collection.
    pub fn new() -> Self {
        Self {
            by_token: HashMap::new(),
            keyed: HashMap::new(),
            token_order: Vec::new(),
            next_id: 0,
        }
    }

    // ----- Core registry operations -----

    /// Appends a descriptor to the registry.
    ///
    /// Unkeyed descriptors append to their token's list; prior registrations
    /// stay visible to multi-result lookup and graph analysis. A keyed
    /// descriptor occupies the `(key, token)` slot, replacing any previous
    /// occupant of that slot.
    pub fn register(&mut self, mut descriptor: ServiceDescriptor) -> &mut Self {
        self.next_id += 1;
        descriptor.id = DescriptorId(self.next_id);
        let descriptor = Arc::new(descriptor);
        match descriptor.key {
            Some(key) => {
                self.keyed
                    .entry(key)
                    .or_default()
                    .insert(descriptor.token, descriptor);
            }
            None => {
                if !self.by_token.contains_key(&descriptor.token) {
                    self.token_order.push(descriptor.token);
                }
                self.by_token
                    .entry(descriptor.token)
                    .or_default()
                    .push(descriptor);
            }
        }
        self
    }

    /// Deletes the entire descriptor list for the token.
    ///
    /// The keyed index is untouched. Registering the token again afterwards
    /// behaves like a fresh registration and moves the token to the end of the
    /// iteration order.
    pub fn remove(&mut self, token: Token) -> &mut Self {
        self.by_token.remove(&token);
        self.token_order.retain(|t| *t != token);
        self
    }

    /// Removes every registration for the token, then re-adds one
    /// implementation descriptor preserving the previously most recent
    /// lifetime (Singleton when the token had no registrations).
    pub fn replace_implementation<T, F>(
        &mut self,
        token: Token,
        dependencies: Vec<Token>,
        ctor: F,
    ) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&[ServiceRef]) -> DiResult<T> + Send + Sync + 'static,
    {
        let lifetime = self
            .by_token
            .get(&token)
            .and_then(|list| list.last())
            .map(|d| d.lifetime)
            .unwrap_or(Lifetime::Singleton);
        self.remove(token);
        self.register_implementation_as::<T, F>(token, lifetime, dependencies, ctor)
    }

    // ----- Registration sugar -----
    // Explicit, separately named operations; no argument-shape inspection.

    /// Registers an implementation constructor under its own type token.
    pub fn register_implementation<T, F>(
        &mut self,
        lifetime: Lifetime,
        dependencies: Vec<Token>,
        ctor: F,
    ) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&[ServiceRef]) -> DiResult<T> + Send + Sync + 'static,
    {
        self.register_implementation_as::<T, F>(Token::of::<T>(), lifetime, dependencies, ctor)
    }

    /// Registers an implementation constructor under an explicit token.
    pub fn register_implementation_as<T, F>(
        &mut self,
        token: Token,
        lifetime: Lifetime,
        dependencies: Vec<Token>,
        ctor: F,
    ) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&[ServiceRef]) -> DiResult<T> + Send + Sync + 'static,
    {
        self.register(ServiceDescriptor::from_parts(
            token,
            lifetime,
            ServiceSource::Implementation(erase_ctor(ctor)),
            dependencies,
            None,
            None,
            None,
        ))
    }

    /// Registers an asynchronous factory under the result's type token.
    pub fn register_factory<T, F, Fut>(
        &mut self,
        lifetime: Lifetime,
        dependencies: Vec<Token>,
        factory: F,
    ) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(ResolverContext, Vec<ServiceRef>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DiResult<T>> + Send + 'static,
    {
        self.register_factory_as::<T, F, Fut>(Token::of::<T>(), lifetime, dependencies, factory)
    }

    /// Registers an asynchronous factory under an explicit token.
    pub fn register_factory_as<T, F, Fut>(
        &mut self,
        token: Token,
        lifetime: Lifetime,
        dependencies: Vec<Token>,
        factory: F,
    ) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(ResolverContext, Vec<ServiceRef>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DiResult<T>> + Send + 'static,
    {
        self.register(ServiceDescriptor::from_parts(
            token,
            lifetime,
            ServiceSource::Factory(erase_factory(factory)),
            dependencies,
            None,
            None,
            None,
        ))
    }

    /// Registers a precomputed value under its own type token.
    ///
    /// Values are cached at the root of the provider tree (singleton lifetime).
    pub fn register_value<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        self.register_value_as(Token::of::<T>(), value)
    }

    /// Registers a precomputed value under an explicit token.
    pub fn register_value_as<T: Send + Sync + 'static>(
        &mut self,
        token: Token,
        value: T,
    ) -> &mut Self {
        self.register(ServiceDescriptor::from_parts(
            token,
            Lifetime::Singleton,
            ServiceSource::Value(Arc::new(value) as AnyArc),
            Vec::new(),
            None,
            None,
            None,
        ))
    }

    /// Registers an implementation constructor under `(key, token)`.
    pub fn register_keyed_implementation<T, F>(
        &mut self,
        key: &'static str,
        token: Token,
        lifetime: Lifetime,
        dependencies: Vec<Token>,
        ctor: F,
    ) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&[ServiceRef]) -> DiResult<T> + Send + Sync + 'static,
    {
        self.register(ServiceDescriptor::from_parts(
            token,
            lifetime,
            ServiceSource::Implementation(erase_ctor(ctor)),
            dependencies,
            Some(key),
            None,
            None,
        ))
    }

    /// Registers an asynchronous factory under `(key, token)`.
    pub fn register_keyed_factory<T, F, Fut>(
        &mut self,
        key: &'static str,
        token: Token,
        lifetime: Lifetime,
        dependencies: Vec<Token>,
        factory: F,
    ) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(ResolverContext, Vec<ServiceRef>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DiResult<T>> + Send + 'static,
    {
        self.register(ServiceDescriptor::from_parts(
            token,
            lifetime,
            ServiceSource::Factory(erase_factory(factory)),
            dependencies,
            Some(key),
            None,
            None,
        ))
    }

    /// Registers a precomputed value under `(key, token)`.
    pub fn register_keyed_value<T: Send + Sync + 'static>(
        &mut self,
        key: &'static str,
        token: Token,
        value: T,
    ) -> &mut Self {
        self.register(ServiceDescriptor::from_parts(
            token,
            Lifetime::Singleton,
            ServiceSource::Value(Arc::new(value) as AnyArc),
            Vec::new(),
            Some(key),
            None,
            None,
        ))
    }

    // ----- Introspection -----

    /// Whether the token has any unkeyed registration.
    pub fn contains(&self, token: Token) -> bool {
        self.by_token.contains_key(&token)
    }

    /// Total number of registered descriptors, keyed included.
    pub fn len(&self) -> usize {
        let unkeyed: usize = self.by_token.values().map(Vec::len).sum();
        let keyed: usize = self.keyed.values().map(HashMap::len).sum();
        unkeyed + keyed
    }

    /// Whether the collection has no registrations at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ----- Build -----

    fn freeze(self) -> Arc<RegistrySnapshot> {
        let mut by_id = HashMap::new();
        for list in self.by_token.values() {
            for descriptor in list {
                by_id.insert(descriptor.id, descriptor.clone());
            }
        }
        for by_token in self.keyed.values() {
            for descriptor in by_token.values() {
                by_id.insert(descriptor.id, descriptor.clone());
            }
        }
        Arc::new(RegistrySnapshot {
            by_token: self.by_token,
            keyed: self.keyed,
            by_id,
            token_order: self.token_order,
        })
    }

    /// Freezes the collection into a root provider with default options.
    pub fn build(self) -> ServiceProvider {
        let snapshot = self.freeze();
        ServiceProvider::root(snapshot, BuildOptions::default())
    }

    /// Freezes the collection into a root provider.
    ///
    /// With `validate_on_build`, every descriptor's dependency list (keyed
    /// descriptors included) is walked and all tokens without a corresponding
    /// registration are collected into one aggregated
    /// [`ValidationReport`](crate::ValidationReport) rather than stopping at
    /// the first missing dependency.
    pub fn build_with(self, options: BuildOptions) -> DiResult<ServiceProvider> {
        let snapshot = self.freeze();
        if options.validate_on_build {
            validation::validate_registry(&snapshot).map_err(DiError::Validation)?;
        }
        Ok(ServiceProvider::root(snapshot, options))
    }
}

impl Default for ServiceCollection {
    fn default() -> Self {
        Self::new()
    }
}
