//! Lifecycle hooks invoked by the resolver.

use crate::error::DiResult;

/// Asynchronous initialization hook.
///
/// A descriptor registered with `.with_initializer()` has this hook awaited
/// after construction finishes and before the instance is cached or returned.
/// An initialization failure fails the whole resolution and nothing is cached.
///
/// # Examples
///
/// ```rust
/// use anvil_di::{DescriptorBuilder, DiResult, Initialize, Lifetime, ServiceCollection, Token};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// #[derive(Default)]
/// struct ConnectionPool {
///     warmed: AtomicBool,
/// }
///
/// #[async_trait::async_trait]
/// impl Initialize for ConnectionPool {
///     async fn initialize(&self) -> DiResult<()> {
///         self.warmed.store(true, Ordering::SeqCst);
///         Ok(())
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.register(
///     DescriptorBuilder::<ConnectionPool>::new(Token::of::<ConnectionPool>(), Lifetime::Singleton)
///         .implementation(|_| Ok(ConnectionPool::default()))
///         .with_initializer()
///         .build()
///         .unwrap(),
/// );
///
/// # tokio_test::block_on(async {
/// let provider = services.build();
/// let pool = provider.get::<ConnectionPool>().await.unwrap();
/// assert!(pool.warmed.load(Ordering::SeqCst));
/// # });
/// ```
#[async_trait::async_trait]
pub trait Initialize: Send + Sync + 'static {
    /// Performs asynchronous setup of the freshly constructed instance.
    async fn initialize(&self) -> DiResult<()>;
}

/// Synchronous teardown hook.
///
/// A descriptor registered with `.with_destroyer()` has this hook invoked when
/// the provider owning the cached instance is disposed. A destroy failure is
/// logged and does not stop the remaining instances from being disposed.
pub trait Destroy: Send + Sync + 'static {
    /// Releases resources held by the instance.
    fn destroy(&self) -> DiResult<()>;
}
