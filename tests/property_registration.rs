//! Property-based tests for registration and lookup invariants.

use anvil_di::{Lifetime, ServiceCollection, Token};
use proptest::prelude::*;

#[derive(Debug, Clone, PartialEq)]
struct TestService {
    id: u32,
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("test runtime")
        .block_on(future)
}

proptest! {
    // Any sequence of registrations under one token: single-result lookup
    // returns the last one.
    #[test]
    fn last_registration_wins(ids in prop::collection::vec(0u32..1000, 1..10)) {
        let token = Token::named("service");
        let mut services = ServiceCollection::new();
        for id in &ids {
            let id = *id;
            services.register_implementation_as::<TestService, _>(
                token,
                Lifetime::Transient,
                vec![],
                move |_| Ok(TestService { id }),
            );
        }

        let provider = services.build();
        let resolved = block_on(provider.get_required_service(token)).unwrap();
        prop_assert_eq!(
            resolved.downcast::<TestService>().unwrap().id,
            *ids.last().unwrap()
        );
    }
}

proptest! {
    // Multi-result lookup sees every registration, in registration order.
    #[test]
    fn get_services_preserves_registration_order(ids in prop::collection::vec(0u32..1000, 0..10)) {
        let token = Token::named("service");
        let mut services = ServiceCollection::new();
        for id in &ids {
            let id = *id;
            services.register_implementation_as::<TestService, _>(
                token,
                Lifetime::Transient,
                vec![],
                move |_| Ok(TestService { id }),
            );
        }

        let provider = services.build();
        let resolved = block_on(provider.get_services(token)).unwrap();
        let resolved_ids: Vec<u32> = resolved
            .iter()
            .map(|r| r.downcast::<TestService>().unwrap().id)
            .collect();
        prop_assert_eq!(resolved_ids, ids);
    }
}

proptest! {
    // Singleton resolution is stable across any number of repeat calls.
    #[test]
    fn singleton_identity_is_stable(id in 0u32..1000, calls in 1usize..6) {
        let token = Token::named("service");
        let mut services = ServiceCollection::new();
        services.register_implementation_as::<TestService, _>(
            token,
            Lifetime::Singleton,
            vec![],
            move |_| Ok(TestService { id }),
        );

        let provider = services.build();
        block_on(async {
            let first = provider.get_required_service(token).await.unwrap();
            for _ in 1..calls {
                let next = provider.get_required_service(token).await.unwrap();
                assert!(first.ptr_eq(&next));
            }
        });
    }
}

proptest! {
    // Removing a token always empties its descriptor list, whatever was
    // registered before.
    #[test]
    fn remove_clears_the_token(count in 1usize..8) {
        let token = Token::named("service");
        let mut services = ServiceCollection::new();
        for id in 0..count as u32 {
            services.register_implementation_as::<TestService, _>(
                token,
                Lifetime::Transient,
                vec![],
                move |_| Ok(TestService { id }),
            );
        }
        services.remove(token);

        prop_assert!(!services.contains(token));
        let provider = services.build();
        let resolved = block_on(provider.get_services(token)).unwrap();
        prop_assert!(resolved.is_empty());
    }
}
