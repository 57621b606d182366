use anvil_di::{BuildOptions, DiError, Lifetime, ServiceCollection, Token};

struct Node;

fn validated() -> BuildOptions {
    BuildOptions {
        validate_scopes: false,
        validate_on_build: true,
    }
}

#[test]
fn build_validation_passes_a_complete_registry() {
    let mut services = ServiceCollection::new();
    services.register_implementation_as::<Node, _>(
        Token::named("a"),
        Lifetime::Singleton,
        vec![Token::named("b")],
        |_| Ok(Node),
    );
    services.register_implementation_as::<Node, _>(
        Token::named("b"),
        Lifetime::Singleton,
        vec![],
        |_| Ok(Node),
    );

    assert!(services.build_with(validated()).is_ok());
}

#[test]
fn build_validation_aggregates_every_missing_edge() {
    let mut services = ServiceCollection::new();
    services.register_implementation_as::<Node, _>(
        Token::named("a"),
        Lifetime::Singleton,
        vec![Token::named("ghost1"), Token::named("ghost2")],
        |_| Ok(Node),
    );
    services.register_implementation_as::<Node, _>(
        Token::named("b"),
        Lifetime::Singleton,
        vec![Token::named("ghost3")],
        |_| Ok(Node),
    );

    let err = services.build_with(validated()).unwrap_err();
    let DiError::Validation(report) = err else {
        panic!("expected an aggregated validation report");
    };

    // One report carries all three missing edges, not just the first.
    assert_eq!(report.missing.len(), 3);
    let edges: Vec<(&'static str, &'static str)> = report
        .missing
        .iter()
        .map(|edge| (edge.dependent.display_name(), edge.dependency.display_name()))
        .collect();
    assert_eq!(
        edges,
        vec![("a", "ghost1"), ("a", "ghost2"), ("b", "ghost3")]
    );
}

#[test]
fn build_validation_walks_keyed_descriptors() {
    let mut services = ServiceCollection::new();
    services.register_keyed_implementation::<Node, _>(
        "primary",
        Token::named("database"),
        Lifetime::Singleton,
        vec![Token::named("ghost")],
        |_| Ok(Node),
    );

    let err = services.build_with(validated()).unwrap_err();
    let DiError::Validation(report) = err else {
        panic!("expected an aggregated validation report");
    };
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].key, Some("primary"));
    assert_eq!(report.missing[0].dependency.display_name(), "ghost");
}

#[test]
fn keyed_dependencies_resolve_against_unkeyed_registrations() {
    let mut services = ServiceCollection::new();
    services.register_implementation_as::<Node, _>(
        Token::named("logger"),
        Lifetime::Singleton,
        vec![],
        |_| Ok(Node),
    );
    services.register_keyed_implementation::<Node, _>(
        "primary",
        Token::named("database"),
        Lifetime::Singleton,
        vec![Token::named("logger")],
        |_| Ok(Node),
    );

    assert!(services.build_with(validated()).is_ok());
}

#[test]
fn validation_report_display_names_every_edge() {
    let mut services = ServiceCollection::new();
    services.register_implementation_as::<Node, _>(
        Token::named("a"),
        Lifetime::Singleton,
        vec![Token::named("ghost")],
        |_| Ok(Node),
    );

    let err = services.build_with(validated()).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("1 missing dependencies"));
    assert!(rendered.contains("a requires unregistered ghost"));
}

#[tokio::test]
async fn missing_dependencies_surface_lazily_without_build_validation() {
    let mut services = ServiceCollection::new();
    services.register_implementation_as::<Node, _>(
        Token::named("a"),
        Lifetime::Singleton,
        vec![Token::named("ghost")],
        |_| Ok(Node),
    );

    // Build succeeds; the missing edge is only hit at resolution time.
    let provider = services.build();
    let err = provider
        .get_required_service(Token::named("a"))
        .await
        .unwrap_err();
    assert!(matches!(err, DiError::NotRegistered(_)));
}
