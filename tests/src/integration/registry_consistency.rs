//! # Randomized Registry Consistency
//!
//! Drives the callback registry with randomized operation sequences and
//! checks the dual-index invariants after every step, single-threaded and
//! under concurrent load.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use stanza_client::domain::{check_all_invariants, CallbackRegistry};
    use stanza_types::Stanza;

    fn noop() -> Box<dyn FnOnce(&Stanza) + Send> {
        Box::new(|_: &Stanza| {})
    }

    #[test]
    fn test_invariants_hold_across_random_operation_sequences() {
        // Fixed seed keeps failures reproducible
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let registry = CallbackRegistry::new();

        // Small id pool so registers, resolves, overwrites, and purges all
        // actually collide
        let ids: Vec<String> = (0..16).map(|i| format!("op-{i}")).collect();

        for step in 0..2000 {
            let id = &ids[rng.gen_range(0..ids.len())];
            match rng.gen_range(0..4) {
                0 | 1 => registry.register(id, noop(), rng.gen_range(0..50)),
                2 => {
                    let _ = registry.resolve(id);
                }
                _ => {
                    // Jitter the sweep clock into the near future so some
                    // purges hit live entries' deadlines and some don't
                    let now = CallbackRegistry::now_ms() + rng.gen_range(0..100);
                    registry.purge_expired(now);
                }
            }

            assert_eq!(
                check_all_invariants(&registry),
                Ok(()),
                "invariant violated at step {step}"
            );
        }
    }

    #[test]
    fn test_invariants_hold_under_concurrent_mutation() {
        let registry = Arc::new(CallbackRegistry::new());

        let threads: Vec<_> = (0..4)
            .map(|worker| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    let mut rng = StdRng::seed_from_u64(worker);
                    let ids: Vec<String> = (0..8).map(|i| format!("w-{i}")).collect();

                    for _ in 0..500 {
                        let id = &ids[rng.gen_range(0..ids.len())];
                        match rng.gen_range(0..3) {
                            0 => registry.register(
                                id,
                                Box::new(|_: &Stanza| {}),
                                rng.gen_range(1..20),
                            ),
                            1 => {
                                let _ = registry.resolve(id);
                            }
                            _ => {
                                registry.purge_expired(u64::MAX);
                            }
                        }
                    }
                })
            })
            .collect();

        for thread in threads {
            thread.join().unwrap();
        }

        assert_eq!(check_all_invariants(&registry), Ok(()));
    }
}
