//! Resolver context handed to factory functions.

use std::sync::Arc;

use crate::error::DiResult;
use crate::service_ref::ServiceRef;
use crate::token::Token;

use super::ServiceProvider;

/// Resolution handle passed to factory functions.
///
/// Wraps the provider the resolution was requested from, so a factory resolves
/// against the same tier as the descriptor that invoked it. A factory may
/// re-enter resolution through this handle, including of its own token, in
/// which case it recurses normally: avoiding that recursion is the
/// registrant's responsibility.
///
/// # Examples
///
/// ```rust
/// use anvil_di::{Lifetime, ServiceCollection, Token};
///
/// struct Endpoint(String);
///
/// let mut services = ServiceCollection::new();
/// services.register_value_as(Token::named("base-url"), "https://api.example.com".to_string());
/// services.register_factory::<Endpoint, _, _>(Lifetime::Transient, vec![], |context, _| async move {
///     let base = context.get::<String>(Token::named("base-url")).await?;
///     Ok(Endpoint(format!("{}/v1/users", base)))
/// });
///
/// # tokio_test::block_on(async {
/// let provider = services.build();
/// let endpoint = provider.get::<Endpoint>().await.unwrap();
/// assert_eq!(endpoint.0, "https://api.example.com/v1/users");
/// # });
/// ```
#[derive(Clone)]
pub struct ResolverContext {
    provider: ServiceProvider,
}

impl ResolverContext {
    pub(crate) fn new(provider: ServiceProvider) -> Self {
        Self { provider }
    }

    /// The provider this factory is resolving against.
    pub fn provider(&self) -> &ServiceProvider {
        &self.provider
    }

    /// Resolves a token, returning `None` when nothing is registered for it.
    pub async fn get_service(&self, token: Token) -> DiResult<Option<ServiceRef>> {
        self.provider.get_service(token).await
    }

    /// Resolves a token, failing when nothing is registered for it.
    pub async fn get_required_service(&self, token: Token) -> DiResult<ServiceRef> {
        self.provider.get_required_service(token).await
    }

    /// Resolves a token and downcasts the instance to `T`.
    pub async fn get<T: Send + Sync + 'static>(&self, token: Token) -> DiResult<Arc<T>> {
        self.provider.get_required_service(token).await?.downcast::<T>()
    }
}
