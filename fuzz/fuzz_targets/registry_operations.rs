#![no_main]

use anvil_di::{Lifetime, ServiceCollection, Token};
use libfuzzer_sys::fuzz_target;

const TOKEN_NAMES: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

#[derive(Debug, Clone)]
struct TestService {
    value: u8,
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let mut services = ServiceCollection::new();
    let mut expected: [Vec<u8>; 4] = Default::default();

    // Interpret byte pairs as (operation, token/value) registry edits.
    for chunk in data.chunks_exact(2) {
        let slot = (chunk[0] % 4) as usize;
        let token = Token::named(TOKEN_NAMES[slot]);
        let value = chunk[1];
        match chunk[0] / 4 % 3 {
            0 => {
                services.register_implementation_as::<TestService, _>(
                    token,
                    Lifetime::Transient,
                    vec![],
                    move |_| Ok(TestService { value }),
                );
                expected[slot].push(value);
            }
            1 => {
                services.remove(token);
                expected[slot].clear();
            }
            2 => {
                services.replace_implementation::<TestService, _>(token, vec![], move |_| {
                    Ok(TestService { value })
                });
                expected[slot].clear();
                expected[slot].push(value);
            }
            _ => unreachable!(),
        }
    }

    let provider = services.build();
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("fuzz runtime");

    for (slot, name) in TOKEN_NAMES.iter().enumerate() {
        let token = Token::named(name);
        let resolved = rt.block_on(provider.get_services(token)).expect("resolve");
        let values: Vec<u8> = resolved
            .iter()
            .map(|r| r.downcast::<TestService>().expect("downcast").value)
            .collect();

        // Registration order is preserved and last-wins holds for the
        // single-result lookup.
        assert_eq!(values, expected[slot]);
        let last = rt.block_on(provider.get_service(token)).expect("resolve");
        match (last, expected[slot].last()) {
            (Some(reference), Some(value)) => {
                assert_eq!(reference.downcast::<TestService>().expect("downcast").value, *value);
            }
            (None, None) => {}
            (got, want) => panic!("lookup mismatch: got {got:?}, want {want:?}"),
        }
    }
});
