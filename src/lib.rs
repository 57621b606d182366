//! # anvil-di
//!
//! Descriptor-driven dependency injection for Rust, inspired by
//! Microsoft.Extensions.DependencyInjection.
//!
//! Services are registered as descriptors: a token, a lifetime, exactly one
//! of an implementation constructor, an async factory, or a precomputed
//! value, and an explicit dependency-token list. Building the collection
//! freezes it into an immutable snapshot, and a provider tree resolves
//! fully-constructed object graphs from it on demand.
//!
//! ## Features
//!
//! - **Three lifetimes**: Singleton (root-cached), Scoped (per-scope), and
//!   Transient (never cached)
//! - **Circular dependencies**: resolved under every lifetime through a
//!   shared-cell placeholder protocol, without unbounded recursion
//! - **Keyed services**: multiple implementations under one token, looked up
//!   individually by key
//! - **Scope validation**: reject scoped services and scoped dependencies on
//!   the root provider at resolution time
//! - **Build validation**: one aggregated report of every missing dependency
//! - **Graph diagnostics**: pure dependency-tree expansion, whole-registry
//!   cycle search, and text renderers that never construct anything
//!
//! ## Quick Start
//!
//! ```rust
//! use anvil_di::{Lifetime, ServiceCollection, Token};
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: anvil_di::ServiceRef,
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.register_value(Database {
//!     connection_string: "postgres://localhost".to_string(),
//! });
//! services.register_implementation::<UserService, _>(
//!     Lifetime::Transient,
//!     vec![Token::of::<Database>()],
//!     |deps| Ok(UserService { db: deps[0].clone() }),
//! );
//!
//! # tokio_test::block_on(async {
//! let provider = services.build();
//! let user_service = provider.get::<UserService>().await.unwrap();
//! let db = user_service.db.downcast::<Database>().unwrap();
//! assert_eq!(db.connection_string, "postgres://localhost");
//! # });
//! ```
//!
//! ## Service Lifetimes
//!
//! - **Singleton**: created once, cached at the root, shared by every scope
//! - **Scoped**: created once per scope (ideal for request contexts)
//! - **Transient**: created fresh on every top-level resolution
//!
//! ## Circular Dependencies
//!
//! ```rust
//! use anvil_di::{Lifetime, ServiceCollection, ServiceRef, Token};
//!
//! struct Chicken { egg: ServiceRef }
//! struct Egg { chicken: ServiceRef }
//!
//! let mut services = ServiceCollection::new();
//! services.register_implementation::<Chicken, _>(
//!     Lifetime::Singleton,
//!     vec![Token::of::<Egg>()],
//!     |deps| Ok(Chicken { egg: deps[0].clone() }),
//! );
//! services.register_implementation::<Egg, _>(
//!     Lifetime::Singleton,
//!     vec![Token::of::<Chicken>()],
//!     |deps| Ok(Egg { chicken: deps[0].clone() }),
//! );
//!
//! # tokio_test::block_on(async {
//! let provider = services.build();
//! let chicken = provider.get::<Chicken>().await.unwrap();
//! // Both sides observe fully-initialized peers once resolution finishes.
//! let egg = chicken.egg.downcast::<Egg>().unwrap();
//! assert!(egg.chicken.downcast::<Chicken>().is_ok());
//! # });
//! ```
//!
//! ## Scopes
//!
//! ```rust
//! use anvil_di::{Lifetime, ServiceCollection};
//!
//! struct RequestId(u64);
//!
//! let mut services = ServiceCollection::new();
//! services.register_factory::<RequestId, _, _>(Lifetime::Scoped, vec![], {
//!     let counter = std::sync::Arc::new(std::sync::atomic::AtomicU64::new(0));
//!     move |_, _| {
//!         let counter = counter.clone();
//!         async move {
//!             Ok(RequestId(
//!                 counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst),
//!             ))
//!         }
//!     }
//! });
//!
//! # tokio_test::block_on(async {
//! let provider = services.build();
//! let scope1 = provider.create_scope().unwrap();
//! let scope2 = provider.create_scope().unwrap();
//!
//! let a = scope1.get::<RequestId>().await.unwrap();
//! let b = scope1.get::<RequestId>().await.unwrap();
//! let c = scope2.get::<RequestId>().await.unwrap();
//! assert!(std::sync::Arc::ptr_eq(&a, &b)); // same scope, same instance
//! assert!(!std::sync::Arc::ptr_eq(&a, &c)); // different scope, different instance
//! # });
//! ```

// Module declarations
pub mod collection;
pub mod descriptor;
pub mod error;
pub mod graph;
pub mod lifecycle;
pub mod lifetime;
pub mod provider;
pub mod token;
pub mod validation;

// Internal modules
mod registry;
mod service_ref;

// Re-export core types
pub use collection::{BuildOptions, ServiceCollection};
pub use descriptor::{DescriptorBuilder, DescriptorId, ServiceDescriptor};
pub use error::{DiError, DiResult};
pub use graph::{render_cycles, render_tree, DependencyTreeNode, TreeNodeStatus};
pub use lifecycle::{Destroy, Initialize};
pub use lifetime::Lifetime;
pub use provider::{ResolverContext, ServiceProvider};
pub use service_ref::ServiceRef;
pub use token::Token;
pub use validation::{MissingDependency, ValidationReport};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn singleton_resolution_returns_one_instance() {
        let mut services = ServiceCollection::new();
        services.register_value(42usize);

        let provider = services.build();
        let a = provider.get::<usize>().await.unwrap();
        let b = provider.get::<usize>().await.unwrap();

        assert_eq!(*a, 42);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn transient_resolution_returns_fresh_instances() {
        struct Probe;

        let mut services = ServiceCollection::new();
        services.register_implementation::<Probe, _>(Lifetime::Transient, vec![], |_| Ok(Probe));

        let provider = services.build();
        let a = provider.get::<Probe>().await.unwrap();
        let b = provider.get::<Probe>().await.unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn named_token_resolution() {
        let mut services = ServiceCollection::new();
        services.register_value_as(Token::named("answer"), 41u32);
        services.register_value_as(Token::named("answer"), 42u32);

        let provider = services.build();
        let reference = provider
            .get_required_service(Token::named("answer"))
            .await
            .unwrap();

        // Single-result lookup returns the last registered descriptor.
        assert_eq!(*reference.downcast::<u32>().unwrap(), 42);
    }

    #[tokio::test]
    async fn missing_service_is_none_not_error() {
        let provider = ServiceCollection::new().build();
        let resolved = provider.get_service(Token::named("absent")).await.unwrap();
        assert!(resolved.is_none());
        assert!(!provider.is_service(Token::named("absent")));
    }
}
