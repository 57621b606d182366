//! Service descriptors: the registered recipes for producing services.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::{DiError, DiResult};
use crate::lifecycle::{Destroy, Initialize};
use crate::lifetime::Lifetime;
use crate::provider::ResolverContext;
use crate::service_ref::{AnyArc, ServiceRef};
use crate::token::Token;

/// Stable identity of one registered descriptor.
///
/// Assigned when the descriptor enters a [`ServiceCollection`](crate::ServiceCollection).
/// Instance caches, resolution stacks, and partial-instance maps are all keyed
/// by this identity, never by the token alone, so multiple descriptors under
/// one token cache independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorId(pub(crate) u64);

/// Synchronous constructor receiving the resolved dependencies in declared order.
pub(crate) type Ctor = Arc<dyn Fn(&[ServiceRef]) -> DiResult<AnyArc> + Send + Sync>;

/// Asynchronous factory receiving a resolver handle and the resolved dependencies.
pub(crate) type FactoryFn =
    Arc<dyn Fn(ResolverContext, Vec<ServiceRef>) -> BoxFuture<'static, DiResult<AnyArc>> + Send + Sync>;

/// Type-erased initialize hook.
pub(crate) type InitHook = Arc<dyn Fn(AnyArc) -> BoxFuture<'static, DiResult<()>> + Send + Sync>;

/// Type-erased destroy hook.
pub(crate) type DestroyHook = Arc<dyn Fn(AnyArc) -> DiResult<()> + Send + Sync>;

/// How a descriptor produces its instance. Exactly one per descriptor.
pub(crate) enum ServiceSource {
    Implementation(Ctor),
    Factory(FactoryFn),
    Value(AnyArc),
}

impl ServiceSource {
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            ServiceSource::Implementation(_) => "implementation",
            ServiceSource::Factory(_) => "factory",
            ServiceSource::Value(_) => "value",
        }
    }
}

/// The registered recipe for producing one service.
///
/// Carries the token, the lifetime, exactly one of implementation / factory /
/// value, the declared dependency-token list, an optional key, and optional
/// lifecycle hooks. Built through [`DescriptorBuilder`] or the registration
/// sugar on [`ServiceCollection`](crate::ServiceCollection).
pub struct ServiceDescriptor {
    pub(crate) id: DescriptorId,
    pub(crate) token: Token,
    pub(crate) lifetime: Lifetime,
    pub(crate) source: ServiceSource,
    pub(crate) dependencies: Vec<Token>,
    pub(crate) key: Option<&'static str>,
    pub(crate) initializer: Option<InitHook>,
    pub(crate) destroyer: Option<DestroyHook>,
}

impl ServiceDescriptor {
    pub(crate) fn from_parts(
        token: Token,
        lifetime: Lifetime,
        source: ServiceSource,
        dependencies: Vec<Token>,
        key: Option<&'static str>,
        initializer: Option<InitHook>,
        destroyer: Option<DestroyHook>,
    ) -> Self {
        Self {
            id: DescriptorId(0), // assigned by the collection at registration
            token,
            lifetime,
            source,
            dependencies,
            key,
            initializer,
            destroyer,
        }
    }

    /// Identity assigned at registration.
    pub fn id(&self) -> DescriptorId {
        self.id
    }

    /// Token this descriptor is registered under.
    pub fn token(&self) -> Token {
        self.token
    }

    /// Declared lifetime.
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Declared dependency tokens, in declaration order.
    pub fn dependencies(&self) -> &[Token] {
        &self.dependencies
    }

    /// Key for keyed registrations.
    pub fn key(&self) -> Option<&'static str> {
        self.key
    }

    /// "implementation", "factory", or "value".
    pub fn kind(&self) -> &'static str {
        self.source.kind_name()
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("token", &self.token)
            .field("lifetime", &self.lifetime)
            .field("kind", &self.kind())
            .field("dependencies", &self.dependencies)
            .field("key", &self.key)
            .finish()
    }
}

pub(crate) fn erase_ctor<T, F>(ctor: F) -> Ctor
where
    T: Send + Sync + 'static,
    F: Fn(&[ServiceRef]) -> DiResult<T> + Send + Sync + 'static,
{
    Arc::new(move |deps: &[ServiceRef]| ctor(deps).map(|value| Arc::new(value) as AnyArc))
}

pub(crate) fn erase_factory<T, F, Fut>(factory: F) -> FactoryFn
where
    T: Send + Sync + 'static,
    F: Fn(ResolverContext, Vec<ServiceRef>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DiResult<T>> + Send + 'static,
{
    Arc::new(
        move |context: ResolverContext, deps: Vec<ServiceRef>| -> BoxFuture<'static, DiResult<AnyArc>> {
            let fut = factory(context, deps);
            Box::pin(async move { fut.await.map(|value| Arc::new(value) as AnyArc) })
        },
    )
}

/// Builder for a single [`ServiceDescriptor`].
///
/// Enforces the exactly-one-source rule at [`build`](Self::build) time and
/// wires the typed lifecycle hooks while the instance type `T` is still known.
/// The registration sugar on `ServiceCollection` covers the common shapes;
/// reach for the builder when a descriptor needs a key or lifecycle hooks.
///
/// # Examples
///
/// ```rust
/// use anvil_di::{DescriptorBuilder, DiError, Lifetime, Token};
///
/// struct Cache;
///
/// // A descriptor that declares no source is invalid.
/// let err = DescriptorBuilder::<Cache>::new(Token::of::<Cache>(), Lifetime::Singleton)
///     .build()
///     .unwrap_err();
/// assert!(matches!(err, DiError::InvalidDescriptor { .. }));
///
/// // Exactly one source builds fine.
/// let descriptor = DescriptorBuilder::<Cache>::new(Token::of::<Cache>(), Lifetime::Singleton)
///     .implementation(|_| Ok(Cache))
///     .build()
///     .unwrap();
/// assert_eq!(descriptor.kind(), "implementation");
/// ```
pub struct DescriptorBuilder<T> {
    token: Token,
    lifetime: Lifetime,
    source: Option<ServiceSource>,
    sources_declared: usize,
    dependencies: Vec<Token>,
    key: Option<&'static str>,
    initializer: Option<InitHook>,
    destroyer: Option<DestroyHook>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> DescriptorBuilder<T> {
    /// Starts a descriptor for `token` with the given lifetime and no source.
    pub fn new(token: Token, lifetime: Lifetime) -> Self {
        Self {
            token,
            lifetime,
            source: None,
            sources_declared: 0,
            dependencies: Vec::new(),
            key: None,
            initializer: None,
            destroyer: None,
            _marker: PhantomData,
        }
    }

    fn set_source(mut self, source: ServiceSource) -> Self {
        self.source = Some(source);
        self.sources_declared += 1;
        self
    }

    /// Declares an implementation constructor.
    ///
    /// The constructor runs synchronously once every declared dependency has
    /// resolved, receiving the resolved references in declaration order.
    pub fn implementation<F>(self, ctor: F) -> Self
    where
        F: Fn(&[ServiceRef]) -> DiResult<T> + Send + Sync + 'static,
    {
        self.set_source(ServiceSource::Implementation(erase_ctor(ctor)))
    }

    /// Declares an asynchronous factory.
    ///
    /// The factory receives a resolver handle (it may re-enter resolution) and
    /// the resolved declared dependencies. Factories do not participate in the
    /// placeholder protocol: a factory that re-enters resolution of its own
    /// token recurses normally.
    pub fn factory<F, Fut>(self, factory: F) -> Self
    where
        F: Fn(ResolverContext, Vec<ServiceRef>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DiResult<T>> + Send + 'static,
    {
        self.set_source(ServiceSource::Factory(erase_factory(factory)))
    }

    /// Declares a precomputed value.
    pub fn value(self, value: T) -> Self {
        self.set_source(ServiceSource::Value(Arc::new(value)))
    }

    /// Declares the dependency-token list.
    pub fn depends_on(mut self, tokens: impl IntoIterator<Item = Token>) -> Self {
        self.dependencies = tokens.into_iter().collect();
        self
    }

    /// Registers the descriptor under a key in addition to its token.
    pub fn keyed(mut self, key: &'static str) -> Self {
        self.key = Some(key);
        self
    }

    /// Wires the [`Initialize`] hook of `T`.
    pub fn with_initializer(mut self) -> Self
    where
        T: Initialize,
    {
        self.initializer = Some(Arc::new(|any: AnyArc| -> BoxFuture<'static, DiResult<()>> {
            Box::pin(async move {
                let service = any
                    .downcast::<T>()
                    .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))?;
                service.initialize().await
            })
        }));
        self
    }

    /// Wires the [`Destroy`] hook of `T`.
    pub fn with_destroyer(mut self) -> Self
    where
        T: Destroy,
    {
        self.destroyer = Some(Arc::new(|any: AnyArc| {
            let service = any
                .downcast::<T>()
                .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))?;
            service.destroy()
        }));
        self
    }

    /// Finishes the descriptor.
    ///
    /// Fails with [`DiError::InvalidDescriptor`] when the builder declared
    /// none of implementation / factory / value, or more than one.
    pub fn build(self) -> DiResult<ServiceDescriptor> {
        match (self.source, self.sources_declared) {
            (Some(source), 1) => Ok(ServiceDescriptor::from_parts(
                self.token,
                self.lifetime,
                source,
                self.dependencies,
                self.key,
                self.initializer,
                self.destroyer,
            )),
            (None, _) => Err(DiError::InvalidDescriptor {
                token: self.token.to_string(),
                reason: "declares none of implementation, factory, or value",
            }),
            (Some(_), _) => Err(DiError::InvalidDescriptor {
                token: self.token.to_string(),
                reason: "declares more than one of implementation, factory, and value",
            }),
        }
    }
}
