use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anvil_di::{DiError, Lifetime, ServiceCollection, Token};

#[tokio::test]
async fn value_resolution() {
    struct Config {
        url: &'static str,
    }

    let mut services = ServiceCollection::new();
    services.register_value(Config {
        url: "postgres://localhost",
    });

    let provider = services.build();
    let config = provider.get::<Config>().await.unwrap();
    assert_eq!(config.url, "postgres://localhost");
}

#[tokio::test]
async fn implementation_receives_dependencies_in_declared_order() {
    struct Left(u32);
    struct Right(u32);
    struct Pair {
        left: anvil_di::ServiceRef,
        right: anvil_di::ServiceRef,
    }

    let mut services = ServiceCollection::new();
    services.register_value(Left(1));
    services.register_value(Right(2));
    services.register_implementation::<Pair, _>(
        Lifetime::Transient,
        vec![Token::of::<Left>(), Token::of::<Right>()],
        |deps| {
            Ok(Pair {
                left: deps[0].clone(),
                right: deps[1].clone(),
            })
        },
    );

    let provider = services.build();
    let pair = provider.get::<Pair>().await.unwrap();
    assert_eq!(pair.left.downcast::<Left>().unwrap().0, 1);
    assert_eq!(pair.right.downcast::<Right>().unwrap().0, 2);
}

#[tokio::test]
async fn factory_resolution_is_awaited() {
    struct Session(String);

    let mut services = ServiceCollection::new();
    services.register_factory::<Session, _, _>(Lifetime::Transient, vec![], |_, _| async {
        Ok(Session("sess-1".to_string()))
    });

    let provider = services.build();
    let session = provider.get::<Session>().await.unwrap();
    assert_eq!(session.0, "sess-1");
}

#[tokio::test]
async fn factory_can_reenter_resolution_through_the_context() {
    struct Endpoint(String);

    let mut services = ServiceCollection::new();
    services.register_value_as(Token::named("base-url"), "https://api.example.com".to_string());
    services.register_factory::<Endpoint, _, _>(Lifetime::Singleton, vec![], |context, _| async move {
        let base = context.get::<String>(Token::named("base-url")).await?;
        Ok(Endpoint(format!("{base}/v1")))
    });

    let provider = services.build();
    let endpoint = provider.get::<Endpoint>().await.unwrap();
    assert_eq!(endpoint.0, "https://api.example.com/v1");
}

#[tokio::test]
async fn factory_receives_resolved_dependencies() {
    struct Database(&'static str);
    struct Repository {
        backend: &'static str,
    }

    let mut services = ServiceCollection::new();
    services.register_value(Database("postgres"));
    services.register_factory::<Repository, _, _>(
        Lifetime::Transient,
        vec![Token::of::<Database>()],
        |_, deps| async move {
            Ok(Repository {
                backend: deps[0].downcast::<Database>()?.0,
            })
        },
    );

    let provider = services.build();
    let repository = provider.get::<Repository>().await.unwrap();
    assert_eq!(repository.backend, "postgres");
}

#[tokio::test]
async fn last_registration_wins_for_single_result_lookup() {
    struct Widget(u32);

    let token = Token::named("widget");
    let mut services = ServiceCollection::new();
    services.register_implementation_as::<Widget, _>(token, Lifetime::Singleton, vec![], |_| {
        Ok(Widget(1))
    });
    services.register_implementation_as::<Widget, _>(token, Lifetime::Singleton, vec![], |_| {
        Ok(Widget(2))
    });

    let provider = services.build();
    let single = provider.get_required_service(token).await.unwrap();
    assert_eq!(single.downcast::<Widget>().unwrap().0, 2);
}

#[tokio::test]
async fn get_services_returns_all_registrations_in_order() {
    struct Widget(u32);

    let token = Token::named("widget");
    let mut services = ServiceCollection::new();
    for id in 1..=3u32 {
        services.register_implementation_as::<Widget, _>(token, Lifetime::Transient, vec![], move |_| {
            Ok(Widget(id))
        });
    }

    let provider = services.build();
    let all = provider.get_services(token).await.unwrap();
    let ids: Vec<u32> = all
        .iter()
        .map(|r| r.downcast::<Widget>().unwrap().0)
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn multiple_descriptors_under_one_token_cache_independently() {
    struct Widget(u32);

    let token = Token::named("widget");
    let mut services = ServiceCollection::new();
    services.register_implementation_as::<Widget, _>(token, Lifetime::Singleton, vec![], |_| {
        Ok(Widget(1))
    });
    services.register_implementation_as::<Widget, _>(token, Lifetime::Singleton, vec![], |_| {
        Ok(Widget(2))
    });

    let provider = services.build();
    let all_first = provider.get_services(token).await.unwrap();
    let all_second = provider.get_services(token).await.unwrap();

    // Cache identity is the descriptor, not the token: both entries survive and
    // each resolves to its own stable singleton.
    assert!(all_first[0].ptr_eq(&all_second[0]));
    assert!(all_first[1].ptr_eq(&all_second[1]));
    assert!(!all_first[0].ptr_eq(&all_first[1]));
}

#[tokio::test]
async fn transient_factory_runs_per_resolution() {
    let calls = Arc::new(AtomicUsize::new(0));

    let mut services = ServiceCollection::new();
    let counter = calls.clone();
    services.register_factory::<String, _, _>(Lifetime::Transient, vec![], move |_, _| {
        let counter = counter.clone();
        async move {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("instance-{n}"))
        }
    });

    let provider = services.build();
    let a = provider.get::<String>().await.unwrap();
    let b = provider.get::<String>().await.unwrap();

    assert_eq!(a.as_str(), "instance-1");
    assert_eq!(b.as_str(), "instance-2");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn required_resolution_of_unknown_token_fails() {
    let provider = ServiceCollection::new().build();
    let err = provider
        .get_required_service(Token::named("absent"))
        .await
        .unwrap_err();
    assert!(matches!(err, DiError::NotRegistered(_)));
}

#[tokio::test]
async fn is_service_checks_presence_without_constructing() {
    struct Exploding;

    let mut services = ServiceCollection::new();
    services.register_implementation::<Exploding, _>(Lifetime::Singleton, vec![], |_| {
        Err(DiError::construction("Exploding", "must never run"))
    });

    let provider = services.build();
    assert!(provider.is_service(Token::of::<Exploding>()));
    assert!(!provider.is_service(Token::named("absent")));
}

#[tokio::test]
async fn type_mismatch_surfaces_on_downcast() {
    let mut services = ServiceCollection::new();
    services.register_value_as(Token::named("answer"), 42u32);

    let provider = services.build();
    let reference = provider
        .get_required_service(Token::named("answer"))
        .await
        .unwrap();
    let err = reference.downcast::<String>().unwrap_err();
    assert!(matches!(err, DiError::TypeMismatch(_)));
}
