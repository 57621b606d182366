#![no_main]

use anvil_di::{Lifetime, ServiceCollection, Token};
use libfuzzer_sys::fuzz_target;

const TOKEN_NAMES: [&str; 6] = ["n0", "n1", "n2", "n3", "n4", "n5"];

struct Node;

fuzz_target!(|data: &[u8]| {
    let mut services = ServiceCollection::new();

    // Interpret byte pairs as dependency edges between six tokens. Arbitrary
    // graphs, cycles and self-loops included, must analyze without panicking
    // and without an artificial depth limit.
    for chunk in data.chunks_exact(2) {
        let from = Token::named(TOKEN_NAMES[(chunk[0] % 6) as usize]);
        let to = Token::named(TOKEN_NAMES[(chunk[1] % 6) as usize]);
        services.register_implementation_as::<Node, _>(from, Lifetime::Transient, vec![to], |_| {
            Ok(Node)
        });
    }

    let provider = services.build();

    let cycles = provider.get_circular_dependencies();
    for cycle in &cycles {
        // Every recorded cycle runs from a token back to its repeat.
        assert!(cycle.len() >= 2);
        assert_eq!(cycle.first(), cycle.last());
    }
    let rendered = provider.visualize_circular_dependencies();
    assert!(!rendered.is_empty());

    for name in TOKEN_NAMES {
        let tree = provider.get_dependency_tree(Token::named(name));
        assert_eq!(tree.token, Token::named(name));
        let _ = provider.visualize_dependency_tree(Token::named(name));
    }
});
