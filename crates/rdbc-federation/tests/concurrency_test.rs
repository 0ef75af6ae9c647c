//! Concurrency tests: the registry under parallel mutation and lookup

use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, Barrier};
use std::thread;

use rdbc_federation::prelude::*;

struct StubProvider {
    rdbms: RdbmsKind,
    specificity: Specificity,
    pattern: Regex,
}

impl StubProvider {
    fn new(kind: &str, specificity: u8, pattern: &str) -> Arc<dyn RdbmsProvider> {
        Arc::new(Self {
            rdbms: RdbmsKind::of(kind),
            specificity: Specificity(specificity),
            pattern: Regex::new(pattern).unwrap(),
        })
    }
}

#[async_trait]
impl RdbmsProvider for StubProvider {
    fn rdbms(&self) -> RdbmsKind {
        self.rdbms.clone()
    }

    fn specificity(&self) -> Specificity {
        self.specificity
    }

    fn connection_pattern(&self) -> &Regex {
        &self.pattern
    }

    async fn open_facade(
        &self,
        _connection_string: &str,
        _properties: Option<&ConnectProps>,
        _connections_limit: u32,
    ) -> Result<Box<dyn Facade>> {
        Err(Error::unsupported("stub provider opens nothing"))
    }
}

const KINDS: [&str; 4] = ["PG", "ORACLE", "MYSQL", "MSSQL"];

#[test]
fn test_concurrent_registration_converges_to_minimum() {
    let registry = Arc::new(FederatedRegistry::new());
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                // Thread t contributes specificity t+1 for every kind, so
                // the global minimum per kind is 1.
                let providers: Vec<_> = KINDS
                    .iter()
                    .map(|kind| StubProvider::new(kind, (t + 1) as u8, ".*"))
                    .collect();
                barrier.wait();
                for provider in providers {
                    registry.register(provider);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.supported_rdbms().len(), KINDS.len());
    for kind in KINDS {
        let best = registry
            .get_specific_provider(&RdbmsKind::of(kind))
            .unwrap();
        assert_eq!(best.specificity(), Specificity(1), "kind {kind}");
    }
}

#[test]
fn test_concurrent_register_then_deregister_leaves_survivors() {
    let registry = Arc::new(FederatedRegistry::new());
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    // Every thread registers a keeper and a throwaway for each kind, then
    // deregisters its own throwaway. Survivor minimum per kind is 10.
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for kind in KINDS {
                    let keeper = StubProvider::new(kind, 10 + t as u8, ".*");
                    let throwaway = StubProvider::new(kind, 1, ".*");
                    registry.register(keeper);
                    registry.register(Arc::clone(&throwaway));
                    registry.deregister(&throwaway);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for kind in KINDS {
        let best = registry
            .get_specific_provider(&RdbmsKind::of(kind))
            .unwrap();
        assert_eq!(best.specificity(), Specificity(10), "kind {kind}");
    }
}

#[test]
fn test_lookups_during_mutation_observe_complete_values() {
    let registry = Arc::new(FederatedRegistry::new());
    let kind = RdbmsKind::of("PG");
    // A permanent fallback keeps the kind resolvable throughout.
    registry.register(StubProvider::new("PG", 9, "pg:.*"));

    let writer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for _ in 0..500 {
                let churn = StubProvider::new("PG", 0, "pg:.*");
                registry.register(Arc::clone(&churn));
                registry.deregister(&churn);
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let kind = kind.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let best = registry.get_specific_provider(&kind).unwrap();
                    let specificity = best.specificity();
                    assert!(
                        specificity == Specificity(0) || specificity == Specificity(9),
                        "torn best-provider value: {specificity}"
                    );

                    let resolved = registry.resolve("pg:main").unwrap();
                    assert_eq!(resolved.rdbms(), kind);

                    assert!(registry.supported_rdbms().contains(&kind));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    // After the churn settles only the fallback remains.
    let best = registry.get_specific_provider(&kind).unwrap();
    assert_eq!(best.specificity(), Specificity(9));
}

#[test]
fn test_concurrent_mutation_of_disjoint_kinds() {
    let registry = Arc::new(FederatedRegistry::new());
    let threads = 4;
    let barrier = Arc::new(Barrier::new(threads));

    // Each thread owns one kind outright; cross-kind interference would
    // show up as a missing or foreign best entry.
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let kind = KINDS[t];
                barrier.wait();
                for round in 0..100 {
                    let provider = StubProvider::new(kind, (round % 7 + 1) as u8, ".*");
                    registry.register(Arc::clone(&provider));
                    if round % 2 == 0 {
                        registry.deregister(&provider);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for kind in KINDS {
        let best = registry
            .get_specific_provider(&RdbmsKind::of(kind))
            .unwrap();
        assert_eq!(best.rdbms(), RdbmsKind::of(kind));
        // Odd rounds survive; round 7 contributes the minimum, 7 % 7 + 1.
        assert_eq!(best.specificity(), Specificity(1), "kind {kind}");
    }
}
